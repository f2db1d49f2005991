use super::super::domain::{HealthGoal, NutritionalInfo, Nutrient, Profile};
use super::config::RationaleThresholds;

/// Builds names such as "Mango Green Power Boost" from the shape of a composition.
pub(crate) fn display_name(
    primary: Option<&str>,
    has_vegetable: bool,
    has_protein: bool,
    profile: &Profile,
) -> String {
    let mut words = vec![primary.map_or_else(|| "House".to_string(), title_case)];
    if has_vegetable {
        words.push("Green".to_string());
    }
    if has_protein {
        words.push("Power".to_string());
    }
    let suffix = profile
        .health_goals
        .iter()
        .find_map(goal_suffix)
        .unwrap_or("Smoothie");
    words.push(suffix.to_string());
    words.join(" ")
}

fn goal_suffix(goal: &HealthGoal) -> Option<&'static str> {
    match goal {
        HealthGoal::Energy => Some("Boost"),
        HealthGoal::WeightLoss => Some("Lean"),
        HealthGoal::MuscleGain => Some("Builder"),
        HealthGoal::StressRelief => Some("Calm"),
        HealthGoal::ImmuneSupport => Some("Shield"),
        HealthGoal::HeartHealth => Some("Heart"),
        HealthGoal::DigestiveHealth => Some("Balance"),
        HealthGoal::AntiAging => Some("Glow"),
        HealthGoal::Other(_) => None,
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lists the per-serving thresholds the aggregated nutrition crosses.
pub(crate) fn rationale(nutrition: &NutritionalInfo, thresholds: &RationaleThresholds) -> Vec<String> {
    let checks = [
        (
            Nutrient::Protein,
            thresholds.protein_grams,
            "g protein supports muscle recovery",
        ),
        (
            Nutrient::Iron,
            thresholds.iron_mg,
            "mg iron helps carry oxygen to working muscles",
        ),
        (
            Nutrient::VitaminC,
            thresholds.vitamin_c_mg,
            "mg vitamin C backs the immune system",
        ),
        (
            Nutrient::Fiber,
            thresholds.fiber_grams,
            "g fiber keeps you full and aids digestion",
        ),
        (
            Nutrient::Omega3,
            thresholds.omega3_grams,
            "g omega-3 supports heart and brain health",
        ),
    ];

    checks
        .into_iter()
        .filter_map(|(nutrient, threshold, text)| {
            nutrition
                .get(nutrient)
                .filter(|value| *value > threshold)
                .map(|value| format!("{value:.1}{text}"))
        })
        .collect()
}
