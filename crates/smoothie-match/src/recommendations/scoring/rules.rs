use super::super::domain::{
    Candidate, DailyCheckin, DietaryRestriction, HealthGoal, Nutrient, Profile, ScoringContext,
    normalize_tag,
};
use super::super::keywords::{join_names, IngredientName};
use super::config::ScoringConfig;
use super::{ScoreComponent, ScoreFactor};

#[derive(Debug, Default)]
pub(crate) struct RuleOutcome {
    pub components: Vec<ScoreComponent>,
    pub reasons: Vec<String>,
    pub concerns: Vec<String>,
    pub benefits: Vec<String>,
    pub signals: ScoreSignals,
}

/// Facts gathered while scoring, replayed by the alignment narrative.
#[derive(Debug, Default)]
pub(crate) struct ScoreSignals {
    pub distance_km: Option<f32>,
    pub restrictions: Vec<RestrictionSignal>,
    pub allergens: Vec<AllergenSignal>,
    pub goals: Vec<GoalSignal>,
    pub flavors: Vec<FlavorSignal>,
    pub checkin: Option<DailyCheckin>,
    pub severe: bool,
}

#[derive(Debug)]
pub(crate) struct RestrictionSignal {
    pub restriction: DietaryRestriction,
    pub offenders: Vec<String>,
    pub checked: bool,
}

#[derive(Debug)]
pub(crate) struct AllergenSignal {
    pub allergen: String,
    pub offenders: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct GoalSignal {
    pub goal: HealthGoal,
    pub matches: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct FlavorSignal {
    pub flavor: String,
    pub matches: Vec<String>,
    pub known: bool,
}

impl RuleOutcome {
    fn award(&mut self, factor: ScoreFactor, points: i16, notes: String) {
        if points != 0 {
            self.components.push(ScoreComponent {
                factor,
                points,
                notes,
            });
        }
    }

    fn reason(&mut self, text: String) {
        push_unique(&mut self.reasons, text);
    }

    fn concern(&mut self, text: String) {
        push_unique(&mut self.concerns, text);
    }

    fn benefit(&mut self, text: String) {
        push_unique(&mut self.benefits, text);
    }
}

fn push_unique(list: &mut Vec<String>, text: String) {
    if !list.iter().any(|existing| existing == &text) {
        list.push(text);
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Formats a nutrient amount without a trailing ".0".
pub(crate) fn amount(value: f32) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if (rounded - rounded.round()).abs() < f32::EPSILON {
        format!("{}", rounded.round() as i64)
    } else {
        format!("{rounded:.1}")
    }
}

pub(crate) fn score_candidate(
    candidate: &Candidate,
    profile: &Profile,
    context: &ScoringContext,
    config: &ScoringConfig,
) -> RuleOutcome {
    let ingredients = IngredientName::list(&candidate.ingredients);
    let mut outcome = RuleOutcome::default();

    apply_proximity(candidate, config, &mut outcome);
    apply_restrictions(&ingredients, profile, config, &mut outcome);
    apply_allergens(&ingredients, profile, config, &mut outcome);
    apply_sugar(candidate, profile, config, &mut outcome);
    apply_goals(candidate, &ingredients, profile, config, &mut outcome);
    apply_flavors(&ingredients, profile, config, &mut outcome);
    apply_checkin(candidate, &ingredients, context, config, &mut outcome);

    outcome
}

fn apply_proximity(candidate: &Candidate, config: &ScoringConfig, outcome: &mut RuleOutcome) {
    let Some(distance) = candidate.known_distance() else {
        return;
    };
    outcome.signals.distance_km = Some(distance);

    let proximity = &config.proximity;
    if let Some(band) = proximity
        .bands
        .iter()
        .find(|band| distance < band.below_km)
    {
        outcome.award(
            ScoreFactor::Proximity,
            band.points,
            format!("{distance:.1} km is within {} km", band.below_km),
        );
        outcome.reason(format!("Only {distance:.1} km away"));
    } else if distance > proximity.far_km {
        outcome.award(
            ScoreFactor::Proximity,
            proximity.far_penalty,
            format!("{distance:.1} km exceeds {} km", proximity.far_km),
        );
        outcome.concern(format!("{distance:.1} km away"));
    }
}

fn apply_restrictions(
    ingredients: &[IngredientName],
    profile: &Profile,
    config: &ScoringConfig,
    outcome: &mut RuleOutcome,
) {
    for restriction in &profile.dietary_restrictions {
        // Sugar limits are judged on nutrition, not ingredient names.
        if *restriction == DietaryRestriction::LowSugar {
            continue;
        }
        let Some(rule) = config.restriction_rule(restriction) else {
            continue;
        };
        if ingredients.is_empty() {
            outcome.signals.restrictions.push(RestrictionSignal {
                restriction: restriction.clone(),
                offenders: Vec::new(),
                checked: false,
            });
            continue;
        }

        let label = restriction.tag();
        let offenders = rule.matcher.matching(ingredients);
        if offenders.is_empty() {
            outcome.award(
                ScoreFactor::DietaryRestriction,
                rule.reward,
                format!("no ingredient conflicts with {label}"),
            );
            outcome.reason(format!("Fits your {label} diet"));
        } else {
            let names = join_names(&offenders);
            outcome.award(
                ScoreFactor::DietaryRestriction,
                rule.penalty,
                format!("{names} conflicts with {label}"),
            );
            if rule.allergen_severity {
                outcome.signals.severe = true;
                outcome.concern(format!("Allergen alert: contains {names} (not {label})"));
            } else {
                outcome.concern(format!("Contains {names}, which is not {label}"));
            }
        }

        outcome.signals.restrictions.push(RestrictionSignal {
            restriction: restriction.clone(),
            offenders: offenders.into_iter().map(str::to_string).collect(),
            checked: true,
        });
    }
}

fn apply_allergens(
    ingredients: &[IngredientName],
    profile: &Profile,
    config: &ScoringConfig,
    outcome: &mut RuleOutcome,
) {
    for allergen in &profile.allergens {
        let tag = normalize_tag(allergen);
        if tag.is_empty() {
            continue;
        }
        let matcher = config.allergens.matcher_for(&tag);
        let offenders = matcher.matching(ingredients);
        if !offenders.is_empty() {
            let names = join_names(&offenders);
            let label = tag.replace('-', " ");
            outcome.signals.severe = true;
            outcome.award(
                ScoreFactor::Allergen,
                config.allergens.penalty,
                format!("{names} matches the {label} allergy"),
            );
            outcome.concern(format!(
                "Allergen alert: {names} matches your {label} allergy"
            ));
        }

        outcome.signals.allergens.push(AllergenSignal {
            allergen: tag,
            offenders: offenders.into_iter().map(str::to_string).collect(),
        });
    }
}

fn apply_sugar(
    candidate: &Candidate,
    profile: &Profile,
    config: &ScoringConfig,
    outcome: &mut RuleOutcome,
) {
    if !profile
        .dietary_restrictions
        .contains(&DietaryRestriction::LowSugar)
    {
        return;
    }
    let Some(sugar) = candidate.nutrient(Nutrient::Sugar) else {
        return;
    };

    let rule = &config.sugar;
    if sugar > rule.high_grams {
        outcome.award(
            ScoreFactor::Sugar,
            rule.high_penalty,
            format!("{}g sugar exceeds {}g", amount(sugar), amount(rule.high_grams)),
        );
        outcome.concern(format!(
            "High in sugar ({}g) for your low-sugar preference",
            amount(sugar)
        ));
    } else if sugar < rule.low_grams {
        outcome.award(
            ScoreFactor::Sugar,
            rule.low_reward,
            format!("{}g sugar is under {}g", amount(sugar), amount(rule.low_grams)),
        );
        outcome.reason(format!("Low in sugar ({}g)", amount(sugar)));
    }
}

fn apply_goals(
    candidate: &Candidate,
    ingredients: &[IngredientName],
    profile: &Profile,
    config: &ScoringConfig,
    outcome: &mut RuleOutcome,
) {
    for goal in &profile.health_goals {
        match goal {
            HealthGoal::WeightLoss => apply_weight_loss(candidate, config, outcome),
            HealthGoal::MuscleGain => apply_muscle_gain(candidate, config, outcome),
            _ => {}
        }

        let mut matches = Vec::new();
        if let Some(rule) = config.goal_keywords.get(goal) {
            matches = rule.matcher.matching(ingredients);
            if !matches.is_empty() {
                let count = i16::try_from(matches.len()).unwrap_or(i16::MAX);
                let names = join_names(&matches);
                let verb = if matches.len() == 1 { "supports" } else { "support" };
                outcome.award(
                    ScoreFactor::HealthGoal,
                    rule.points_per_match.saturating_mul(count),
                    format!("{names} {verb} {}", goal.tag()),
                );
                outcome.reason(format!(
                    "{} {verb} your {} goal",
                    capitalize(&names),
                    goal.label().to_lowercase()
                ));
            }
        }

        outcome.signals.goals.push(GoalSignal {
            goal: goal.clone(),
            matches: matches.into_iter().map(str::to_string).collect(),
        });
    }
}

fn apply_weight_loss(candidate: &Candidate, config: &ScoringConfig, outcome: &mut RuleOutcome) {
    let rule = &config.weight_loss;
    if let Some(calories) = candidate.nutrient(Nutrient::Calories) {
        if calories < rule.low_calorie_kcal {
            outcome.award(
                ScoreFactor::HealthGoal,
                rule.low_calorie_reward,
                format!(
                    "{} kcal under {} kcal",
                    amount(calories),
                    amount(rule.low_calorie_kcal)
                ),
            );
            outcome.reason(format!("Light at {} kcal", amount(calories)));
        } else if calories > rule.high_calorie_kcal {
            outcome.award(
                ScoreFactor::HealthGoal,
                rule.high_calorie_penalty,
                format!(
                    "{} kcal over {} kcal",
                    amount(calories),
                    amount(rule.high_calorie_kcal)
                ),
            );
            outcome.concern(format!(
                "Calorie-dense ({} kcal) for a weight-loss goal",
                amount(calories)
            ));
        }
    }

    if let Some(fiber) = candidate.nutrient(Nutrient::Fiber) {
        if fiber > rule.high_fiber_grams {
            outcome.award(
                ScoreFactor::HealthGoal,
                rule.high_fiber_reward,
                format!(
                    "{}g fiber over {}g",
                    amount(fiber),
                    amount(rule.high_fiber_grams)
                ),
            );
            outcome.reason(format!("High fiber ({}g) keeps you full", amount(fiber)));
        }
    }
}

fn apply_muscle_gain(candidate: &Candidate, config: &ScoringConfig, outcome: &mut RuleOutcome) {
    let rule = &config.muscle_gain;
    let Some(protein) = candidate.nutrient(Nutrient::Protein) else {
        return;
    };

    if protein > rule.high_protein_grams {
        outcome.award(
            ScoreFactor::HealthGoal,
            rule.high_protein_reward,
            format!(
                "{}g protein over {}g",
                amount(protein),
                amount(rule.high_protein_grams)
            ),
        );
        outcome.reason(format!(
            "High protein ({}g) for muscle gain",
            amount(protein)
        ));
    } else if protein < rule.low_protein_grams {
        outcome.award(
            ScoreFactor::HealthGoal,
            rule.low_protein_penalty,
            format!(
                "{}g protein under {}g",
                amount(protein),
                amount(rule.low_protein_grams)
            ),
        );
        outcome.concern(format!(
            "Low protein ({}g) for muscle gain",
            amount(protein)
        ));
    }
}

fn apply_flavors(
    ingredients: &[IngredientName],
    profile: &Profile,
    config: &ScoringConfig,
    outcome: &mut RuleOutcome,
) {
    for flavor in &profile.flavor_preferences {
        let tag = normalize_tag(flavor);
        let rule = config.flavors.get(&tag);
        let matches = rule
            .map(|rule| rule.matcher.matching(ingredients))
            .unwrap_or_default();

        if let (Some(rule), false) = (rule, matches.is_empty()) {
            let count = i16::try_from(matches.len()).unwrap_or(i16::MAX);
            let names = join_names(&matches);
            outcome.award(
                ScoreFactor::Flavor,
                rule.points_per_match.saturating_mul(count),
                format!("{names} match {tag}"),
            );
            outcome.reason(format!("Matches your {tag} taste: {names}"));
        }

        outcome.signals.flavors.push(FlavorSignal {
            flavor: tag,
            matches: matches.into_iter().map(str::to_string).collect(),
            known: rule.is_some(),
        });
    }
}

fn apply_checkin(
    candidate: &Candidate,
    ingredients: &[IngredientName],
    context: &ScoringContext,
    config: &ScoringConfig,
    outcome: &mut RuleOutcome,
) {
    let Some(checkin) = context.checkin.map(DailyCheckin::normalized) else {
        return;
    };
    outcome.signals.checkin = Some(checkin);
    let rule = &config.checkin;

    if checkin.energy < rule.low_below {
        let hits = rule.energy_keywords.matching(ingredients);
        if !hits.is_empty() {
            let names = join_names(&hits);
            outcome.award(
                ScoreFactor::Checkin,
                rule.low_energy_reward,
                format!("low energy ({}/10) met by {names}", checkin.energy),
            );
            outcome.benefit(format!(
                "{} gives a natural energy lift for a low-energy day",
                capitalize(&names)
            ));
        }
    }

    if checkin.mood < rule.low_below {
        let hits = rule.mood_keywords.matching(ingredients);
        if !hits.is_empty() {
            let names = join_names(&hits);
            outcome.award(
                ScoreFactor::Checkin,
                rule.low_mood_reward,
                format!("low mood ({}/10) met by {names}", checkin.mood),
            );
            outcome.benefit(format!(
                "{} can help brighten a low mood",
                capitalize(&names)
            ));
        }
    }

    let Some(calories) = candidate.nutrient(Nutrient::Calories) else {
        return;
    };
    if checkin.appetite < rule.low_below && calories < rule.light_meal_kcal {
        outcome.award(
            ScoreFactor::Checkin,
            rule.appetite_reward,
            format!(
                "low appetite ({}/10) suits {} kcal",
                checkin.appetite,
                amount(calories)
            ),
        );
        outcome.benefit(format!(
            "Light at {} kcal for a low appetite today",
            amount(calories)
        ));
    } else if checkin.appetite > rule.high_appetite_above && calories >= rule.hearty_meal_kcal {
        outcome.award(
            ScoreFactor::Checkin,
            rule.appetite_reward,
            format!(
                "high appetite ({}/10) suits {} kcal",
                checkin.appetite,
                amount(calories)
            ),
        );
        outcome.benefit(format!(
            "Hearty {} kcal to match today's appetite",
            amount(calories)
        ));
    }
}
