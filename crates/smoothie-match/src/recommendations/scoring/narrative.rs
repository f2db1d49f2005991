use serde::{Deserialize, Serialize};

use super::super::domain::{Candidate, Nutrient, Profile};
use super::super::keywords::join_names;
use super::config::{AlignmentBands, ScoringConfig};
use super::rules::{amount, capitalize, ScoreSignals};

/// Banner bucket derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentLevel {
    Excellent,
    Good,
    Moderate,
    Limited,
}

impl AlignmentLevel {
    pub fn from_score(score: u8, bands: &AlignmentBands) -> Self {
        if score >= bands.excellent {
            Self::Excellent
        } else if score >= bands.good {
            Self::Good
        } else if score >= bands.moderate {
            Self::Moderate
        } else {
            Self::Limited
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent match",
            Self::Good => "Good match",
            Self::Moderate => "Moderate match",
            Self::Limited => "Limited match",
        }
    }
}

/// Long-form explanation of a match. Restates facts the rules already scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAlignment {
    pub level: AlignmentLevel,
    pub summary: String,
    pub goals: Vec<String>,
    pub dietary: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<String>,
    pub flavor: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

impl ProfileAlignment {
    /// Renders every section in fixed order as one paragraph per line.
    pub fn render(&self) -> String {
        let mut lines = vec![self.summary.clone()];
        lines.extend(self.goals.iter().cloned());
        lines.extend(self.dietary.iter().cloned());
        lines.extend(self.activity.iter().cloned());
        lines.extend(self.today.iter().cloned());
        lines.extend(self.flavor.iter().cloned());
        lines.extend(self.distance.iter().cloned());
        lines.join("\n")
    }
}

pub(crate) fn compose_alignment(
    score: u8,
    candidate: &Candidate,
    profile: &Profile,
    signals: &ScoreSignals,
    config: &ScoringConfig,
) -> ProfileAlignment {
    let level = AlignmentLevel::from_score(score, &config.alignment);

    ProfileAlignment {
        level,
        summary: format!(
            "{}: {} scores {score}/100 for your profile.",
            level.label(),
            candidate.name
        ),
        goals: goal_lines(signals),
        dietary: dietary_lines(signals),
        activity: activity_line(candidate, profile, config),
        today: today_line(signals, config),
        flavor: flavor_lines(signals),
        distance: signals
            .distance_km
            .map(|km| format!("{} is {km:.1} km from you.", candidate.provider)),
    }
}

fn goal_lines(signals: &ScoreSignals) -> Vec<String> {
    signals
        .goals
        .iter()
        .map(|signal| {
            let label = signal.goal.label();
            if signal.matches.is_empty() {
                format!("{label}: no dedicated ingredients for this goal.")
            } else {
                let names: Vec<&str> = signal.matches.iter().map(String::as_str).collect();
                format!("{label}: {} work toward this goal.", capitalize(&join_names(&names)))
            }
        })
        .collect()
}

fn dietary_lines(signals: &ScoreSignals) -> Vec<String> {
    let restrictions = signals.restrictions.iter().map(|signal| {
        let tag = signal.restriction.tag();
        if !signal.checked {
            format!("{tag}: no ingredient list to check.")
        } else if signal.offenders.is_empty() {
            format!("{tag}: every ingredient complies.")
        } else {
            let names: Vec<&str> = signal.offenders.iter().map(String::as_str).collect();
            format!("{tag}: conflicts with {}.", join_names(&names))
        }
    });
    let allergens = signals.allergens.iter().map(|signal| {
        let label = signal.allergen.replace('-', " ");
        if signal.offenders.is_empty() {
            format!("Free of {label}.")
        } else {
            let names: Vec<&str> = signal.offenders.iter().map(String::as_str).collect();
            format!("Not safe for your {label} allergy: {}.", join_names(&names))
        }
    });
    restrictions.chain(allergens).collect()
}

fn activity_line(candidate: &Candidate, profile: &Profile, config: &ScoringConfig) -> Option<String> {
    let level = profile.activity_level?;
    let targets = config.targets.scaled(Some(level));
    let calories = candidate.nutrient(Nutrient::Calories);
    let protein = candidate.nutrient(Nutrient::Protein);

    let mut parts = Vec::new();
    if let Some(calories) = calories {
        parts.push(format!(
            "{} of your {} kcal target",
            percent(calories, targets.calories),
            amount(targets.calories)
        ));
    }
    if let Some(protein) = protein {
        parts.push(format!(
            "{} of your {}g protein target",
            percent(protein, targets.protein_grams),
            amount(targets.protein_grams)
        ));
    }

    let label = capitalize(level.label());
    if parts.is_empty() {
        Some(format!("{label} lifestyle: no nutrition data to compare."))
    } else {
        Some(format!("{label} lifestyle: covers {}.", parts.join(" and ")))
    }
}

fn percent(value: f32, target: f32) -> String {
    if target <= 0.0 {
        return "n/a".to_string();
    }
    format!("{}%", ((value / target) * 100.0).round() as i64)
}

fn today_line(signals: &ScoreSignals, config: &ScoringConfig) -> Option<String> {
    let checkin = signals.checkin?;
    let low = config.checkin.low_below;

    let mut notes = Vec::new();
    if checkin.energy < low {
        notes.push("energy is low");
    }
    if checkin.mood < low {
        notes.push("mood is low");
    }
    if checkin.appetite < low {
        notes.push("appetite is light");
    } else if checkin.appetite > config.checkin.high_appetite_above {
        notes.push("appetite is strong");
    }

    Some(if notes.is_empty() {
        format!(
            "Today: energy {}/10, mood {}/10, appetite {}/10, nothing to adjust for.",
            checkin.energy, checkin.mood, checkin.appetite
        )
    } else {
        format!("Today your {}.", join_names(&notes))
    })
}

fn flavor_lines(signals: &ScoreSignals) -> Vec<String> {
    signals
        .flavors
        .iter()
        .filter(|signal| signal.known)
        .map(|signal| {
            if signal.matches.is_empty() {
                format!("Not especially {}.", signal.flavor)
            } else {
                let names: Vec<&str> = signal.matches.iter().map(String::as_str).collect();
                format!("{} gives it a {} note.", capitalize(&join_names(&names)), signal.flavor)
            }
        })
        .collect()
}
