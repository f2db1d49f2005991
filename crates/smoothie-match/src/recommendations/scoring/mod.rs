mod config;
mod narrative;
mod rules;

pub use config::{
    AlignmentBands, AllergenConfig, CheckinConfig, CustomRestrictionPoints, MuscleGainConfig,
    ProximityBand, ProximityConfig, ScoringConfig, ScoringConfigError, SugarConfig,
    TargetConfig, WeightLossConfig,
};
pub use narrative::{AlignmentLevel, ProfileAlignment};

use super::domain::{Candidate, Profile, ScoringContext};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound on `benefits_for_today` entries.
pub const MAX_BENEFITS: usize = 3;

/// Stateless evaluator that applies the scoring configuration to a candidate.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores one candidate for one profile. Total and deterministic: missing nutrition or
    /// distance only skips the affected rules.
    pub fn score(
        &self,
        candidate: &Candidate,
        profile: &Profile,
        context: &ScoringContext,
    ) -> MatchResult {
        let rules::RuleOutcome {
            mut components,
            reasons,
            concerns,
            mut benefits,
            signals,
        } = rules::score_candidate(candidate, profile, context, &self.config);

        let base = i32::from(self.config.base_score);
        let mut raw: i32 = base
            + components
                .iter()
                .map(|component| i32::from(component.points))
                .sum::<i32>();

        let ceiling = i32::from(self.config.allergens.score_ceiling);
        if signals.severe && raw > ceiling {
            components.push(ScoreComponent {
                factor: ScoreFactor::AllergenCeiling,
                points: clamp_points(ceiling - raw),
                notes: format!("allergen conflict caps the score at {ceiling}"),
            });
            raw = ceiling;
        }

        let score = raw.clamp(0, 100) as u8;
        benefits.truncate(MAX_BENEFITS);

        let profile_alignment =
            narrative::compose_alignment(score, candidate, profile, &signals, &self.config);

        debug!(
            candidate = %candidate.id,
            score,
            rules_fired = components.len(),
            "scored candidate"
        );

        MatchResult {
            candidate_id: candidate.id.clone(),
            candidate_name: candidate.name.clone(),
            provider: candidate.provider.clone(),
            score,
            match_reasons: reasons,
            concerns,
            benefits_for_today: benefits,
            profile_alignment,
            components,
        }
    }
}

fn clamp_points(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Rule family that produced a score adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Proximity,
    DietaryRestriction,
    Allergen,
    Sugar,
    HealthGoal,
    Flavor,
    Checkin,
    AllergenCeiling,
}

/// Discrete contribution to a match score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: i16,
    pub notes: String,
}

/// Scored, explained outcome of comparing one candidate against one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub candidate_id: String,
    pub candidate_name: String,
    pub provider: String,
    pub score: u8,
    pub match_reasons: Vec<String>,
    pub concerns: Vec<String>,
    pub benefits_for_today: Vec<String>,
    pub profile_alignment: ProfileAlignment,
    pub components: Vec<ScoreComponent>,
}

impl MatchResult {
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {}/100, {}",
            self.candidate_name,
            self.provider,
            self.score,
            self.profile_alignment.level.label()
        )
    }
}
