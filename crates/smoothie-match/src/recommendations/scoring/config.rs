use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::super::domain::{normalize_tag, ActivityLevel, DietaryRestriction, HealthGoal};
use super::super::keywords::{KeywordMatcher, KeywordRule, RestrictionRule};

/// Point table and keyword tables driving the scoring rules.
///
/// Every value has a reference default; a JSON file may override any subset of them. The
/// load-bearing contract is the ordering enforced by [`ScoringConfig::validate`]: allergen
/// penalty > dietary restriction penalty > soft preference bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_score: i16,
    pub proximity: ProximityConfig,
    pub restrictions: BTreeMap<DietaryRestriction, RestrictionRule>,
    pub custom_restriction: CustomRestrictionPoints,
    pub allergens: AllergenConfig,
    pub sugar: SugarConfig,
    pub weight_loss: WeightLossConfig,
    pub muscle_gain: MuscleGainConfig,
    pub goal_keywords: BTreeMap<HealthGoal, KeywordRule>,
    pub flavors: BTreeMap<String, KeywordRule>,
    pub checkin: CheckinConfig,
    pub targets: TargetConfig,
    pub alignment: AlignmentBands,
}

/// Distance breakpoints. Bands are checked in ascending order with a strict `<`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub bands: Vec<ProximityBand>,
    pub far_km: f32,
    pub far_penalty: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityBand {
    pub below_km: f32,
    pub points: i16,
}

/// Points for free-form "<ingredient>-free" restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomRestrictionPoints {
    pub penalty: i16,
    pub reward: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllergenConfig {
    pub penalty: i16,
    /// Highest score a candidate may keep once an allergen-severity rule fires.
    pub score_ceiling: u8,
    pub keywords: BTreeMap<String, KeywordMatcher>,
}

impl AllergenConfig {
    /// Matcher for an allergen tag, falling back to the tag itself and its singular form.
    pub fn matcher_for(&self, allergen: &str) -> KeywordMatcher {
        let tag = normalize_tag(allergen);
        if let Some(matcher) = self.keywords.get(&tag) {
            return matcher.clone();
        }

        let keyword = tag.replace('-', " ");
        let mut keywords = vec![keyword.clone()];
        if keyword.len() > 3 {
            if let Some(stem) = keyword.strip_suffix("ies") {
                keywords.push(format!("{stem}y"));
            } else if let Some(stem) = keyword.strip_suffix("oes") {
                keywords.push(format!("{stem}o"));
            } else if let Some(stem) = keyword.strip_suffix('s') {
                keywords.push(stem.to_string());
            }
        }
        KeywordMatcher::new(keywords)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SugarConfig {
    pub high_grams: f32,
    pub high_penalty: i16,
    pub low_grams: f32,
    pub low_reward: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightLossConfig {
    pub low_calorie_kcal: f32,
    pub low_calorie_reward: i16,
    pub high_fiber_grams: f32,
    pub high_fiber_reward: i16,
    pub high_calorie_kcal: f32,
    pub high_calorie_penalty: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuscleGainConfig {
    pub high_protein_grams: f32,
    pub high_protein_reward: i16,
    pub low_protein_grams: f32,
    pub low_protein_penalty: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckinConfig {
    /// Readings strictly below this count as low.
    pub low_below: u8,
    /// Appetite readings strictly above this count as high.
    pub high_appetite_above: u8,
    pub energy_keywords: KeywordMatcher,
    pub mood_keywords: KeywordMatcher,
    pub low_energy_reward: i16,
    pub low_mood_reward: i16,
    pub appetite_reward: i16,
    pub light_meal_kcal: f32,
    pub hearty_meal_kcal: f32,
}

/// Baseline per-serving targets, scaled by activity level for commentary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub calories: f32,
    pub protein_grams: f32,
}

impl TargetConfig {
    /// Targets scaled by activity level; an unknown level keeps the baseline.
    pub fn scaled(&self, activity: Option<ActivityLevel>) -> Self {
        let factor = activity.map_or(1.0, ActivityLevel::target_factor);
        Self {
            calories: (self.calories * factor).round(),
            protein_grams: (self.protein_grams * factor).round(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentBands {
    pub excellent: u8,
    pub good: u8,
    pub moderate: u8,
}

/// Validation failures raised while loading a scoring configuration.
#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("failed to read scoring config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scoring config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("base score {0} must lie within 0..=100")]
    BaseScoreOutOfRange(i16),
    #[error("keyword table '{0}' has no usable keywords")]
    EmptyKeywords(String),
    #[error("{0} must award a positive increment per match")]
    NonPositiveIncrement(String),
    #[error("penalty ordering violated: {0}")]
    PenaltyOrdering(String),
    #[error("proximity bands must use finite, ascending distances")]
    InvalidProximityBands,
    #[error("allergen score ceiling {0} must not exceed 100")]
    CeilingOutOfRange(u8),
}

impl ScoringConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses, normalises, and validates a JSON override; omitted sections keep defaults.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScoringConfigError> {
        let mut config: ScoringConfig = serde_json::from_reader(reader)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Lowercases keyword tables and flavor keys so matching stays case-insensitive.
    pub fn normalize(&mut self) {
        for rule in self.restrictions.values_mut() {
            rule.matcher.normalize();
        }
        for matcher in self.allergens.keywords.values_mut() {
            matcher.normalize();
        }
        for rule in self.goal_keywords.values_mut() {
            rule.matcher.normalize();
        }
        for rule in self.flavors.values_mut() {
            rule.matcher.normalize();
        }
        self.checkin.energy_keywords.normalize();
        self.checkin.mood_keywords.normalize();

        let allergens = std::mem::take(&mut self.allergens.keywords);
        self.allergens.keywords = allergens
            .into_iter()
            .map(|(tag, matcher)| (normalize_tag(&tag), matcher))
            .collect();
        let flavors = std::mem::take(&mut self.flavors);
        self.flavors = flavors
            .into_iter()
            .map(|(tag, rule)| (normalize_tag(&tag), rule))
            .collect();
    }

    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if !(0..=100).contains(&self.base_score) {
            return Err(ScoringConfigError::BaseScoreOutOfRange(self.base_score));
        }
        if self.allergens.score_ceiling > 100 {
            return Err(ScoringConfigError::CeilingOutOfRange(
                self.allergens.score_ceiling,
            ));
        }

        let mut previous = 0.0_f32;
        for band in &self.proximity.bands {
            if !band.below_km.is_finite() || band.below_km <= previous {
                return Err(ScoringConfigError::InvalidProximityBands);
            }
            previous = band.below_km;
        }
        if !self.proximity.far_km.is_finite() || self.proximity.far_km < previous {
            return Err(ScoringConfigError::InvalidProximityBands);
        }

        for (restriction, rule) in &self.restrictions {
            if rule.matcher.is_blank() {
                return Err(ScoringConfigError::EmptyKeywords(format!(
                    "restrictions.{}",
                    restriction.tag()
                )));
            }
        }
        for (tag, matcher) in &self.allergens.keywords {
            if matcher.is_blank() {
                return Err(ScoringConfigError::EmptyKeywords(format!(
                    "allergens.{tag}"
                )));
            }
        }
        for (goal, rule) in &self.goal_keywords {
            let table = format!("goal_keywords.{}", goal.tag());
            if rule.matcher.is_blank() {
                return Err(ScoringConfigError::EmptyKeywords(table));
            }
            if rule.points_per_match <= 0 {
                return Err(ScoringConfigError::NonPositiveIncrement(table));
            }
        }
        for (flavor, rule) in &self.flavors {
            let table = format!("flavors.{flavor}");
            if rule.matcher.is_blank() {
                return Err(ScoringConfigError::EmptyKeywords(table));
            }
            if rule.points_per_match <= 0 {
                return Err(ScoringConfigError::NonPositiveIncrement(table));
            }
        }

        self.validate_ordering()
    }

    fn validate_ordering(&self) -> Result<(), ScoringConfigError> {
        let allergen = i32::from(self.allergens.penalty);
        if allergen >= 0 {
            return Err(ScoringConfigError::PenaltyOrdering(
                "allergen penalty must be negative".to_string(),
            ));
        }

        let restriction_penalties = self
            .restrictions
            .values()
            .map(|rule| i32::from(rule.penalty))
            .chain(std::iter::once(i32::from(self.custom_restriction.penalty)));
        let mut strongest_restriction = 0;
        let mut weakest_restriction = i32::MIN;
        for penalty in restriction_penalties {
            if penalty >= 0 {
                return Err(ScoringConfigError::PenaltyOrdering(
                    "dietary restriction penalties must be negative".to_string(),
                ));
            }
            strongest_restriction = strongest_restriction.min(penalty);
            weakest_restriction = weakest_restriction.max(penalty);
        }

        if allergen.abs() <= strongest_restriction.abs() {
            return Err(ScoringConfigError::PenaltyOrdering(format!(
                "allergen penalty {allergen} must outweigh every restriction penalty (strongest {strongest_restriction})"
            )));
        }

        let strongest_soft = self
            .goal_keywords
            .values()
            .chain(self.flavors.values())
            .map(|rule| i32::from(rule.points_per_match))
            .max()
            .unwrap_or(0);
        if weakest_restriction != i32::MIN && weakest_restriction.abs() <= strongest_soft {
            return Err(ScoringConfigError::PenaltyOrdering(format!(
                "restriction penalty {weakest_restriction} must outweigh soft preference bonus {strongest_soft}"
            )));
        }

        Ok(())
    }

    pub fn restriction_rule(&self, restriction: &DietaryRestriction) -> Option<RestrictionRule> {
        if let Some(rule) = self.restrictions.get(restriction) {
            return Some(rule.clone());
        }
        restriction.custom_keyword().map(|keyword| RestrictionRule {
            matcher: KeywordMatcher::new([keyword]),
            penalty: self.custom_restriction.penalty,
            reward: self.custom_restriction.reward,
            allergen_severity: false,
        })
    }
}

const PLANT_BASED_DAIRY_ALTERNATIVES: [&str; 11] = [
    "almond milk",
    "oat milk",
    "coconut milk",
    "soy milk",
    "rice milk",
    "cashew milk",
    "hemp milk",
    "coconut yogurt",
    "soy yogurt",
    "almond yogurt",
    "oat yogurt",
];

fn dairy_alternatives() -> Vec<&'static str> {
    let mut phrases = PLANT_BASED_DAIRY_ALTERNATIVES.to_vec();
    phrases.push("coconut cream");
    phrases
}

fn vegan_exceptions() -> Vec<&'static str> {
    let mut phrases = dairy_alternatives();
    phrases.push("eggplant");
    phrases
}

fn restriction(
    keywords: &[&str],
    exceptions: &[&str],
    penalty: i16,
    reward: i16,
    allergen_severity: bool,
) -> RestrictionRule {
    RestrictionRule {
        matcher: KeywordMatcher::new(keywords.iter().copied()).except(exceptions.iter().copied()),
        penalty,
        reward,
        allergen_severity,
    }
}

fn default_restrictions() -> BTreeMap<DietaryRestriction, RestrictionRule> {
    let mut rules = BTreeMap::new();
    rules.insert(
        DietaryRestriction::Vegan,
        restriction(
            &[
                "milk", "yogurt", "yoghurt", "whey", "honey", "cheese", "cream", "kefir", "ghee",
                "collagen", "gelatin", "egg",
            ],
            &vegan_exceptions(),
            -35,
            8,
            false,
        ),
    );
    rules.insert(
        DietaryRestriction::Vegetarian,
        restriction(
            &["gelatin", "collagen", "bone broth", "fish oil"],
            &[],
            -30,
            5,
            false,
        ),
    );
    rules.insert(
        DietaryRestriction::GlutenFree,
        restriction(
            &["oat", "granola", "wheat", "barley", "rye", "malt"],
            &["goat", "gluten-free", "gluten free"],
            -25,
            6,
            false,
        ),
    );
    rules.insert(
        DietaryRestriction::DairyFree,
        restriction(
            &[
                "milk", "yogurt", "yoghurt", "whey", "cheese", "cream", "kefir", "ghee",
            ],
            &dairy_alternatives(),
            -25,
            6,
            false,
        ),
    );
    rules.insert(
        DietaryRestriction::NutFree,
        restriction(
            &[
                "almond",
                "peanut",
                "cashew",
                "walnut",
                "pecan",
                "hazelnut",
                "pistachio",
                "macadamia",
                "nut butter",
            ],
            &["coconut butter"],
            -50,
            10,
            true,
        ),
    );
    rules.insert(
        DietaryRestriction::Keto,
        restriction(
            &[
                "banana", "mango", "dates", "medjool", "honey", "agave", "maple", "granola",
                "oat", "pineapple",
            ],
            &["goat"],
            -20,
            5,
            false,
        ),
    );
    rules.insert(
        DietaryRestriction::Paleo,
        restriction(
            &[
                "oat", "granola", "peanut", "soy", "tofu", "yogurt", "milk", "whey", "rice",
            ],
            &[
                "almond milk",
                "coconut milk",
                "cashew milk",
                "coconut yogurt",
                "goat",
            ],
            -20,
            5,
            false,
        ),
    );
    rules
}

fn default_allergens() -> BTreeMap<String, KeywordMatcher> {
    let tree_nuts = [
        "almond",
        "cashew",
        "walnut",
        "pecan",
        "hazelnut",
        "pistachio",
        "macadamia",
        "brazil nut",
    ];
    let mut nuts: Vec<&str> = tree_nuts.to_vec();
    nuts.extend(["peanut", "nut butter"]);

    let mut table = BTreeMap::new();
    table.insert(
        "nuts".to_string(),
        KeywordMatcher::new(nuts).except(["coconut butter"]),
    );
    table.insert(
        "tree-nuts".to_string(),
        KeywordMatcher::new(tree_nuts).except(["coconut butter"]),
    );
    table.insert("peanuts".to_string(), KeywordMatcher::new(["peanut"]));
    table.insert(
        "dairy".to_string(),
        KeywordMatcher::new([
            "milk", "yogurt", "yoghurt", "whey", "cheese", "cream", "kefir", "ghee",
        ])
        .except(dairy_alternatives()),
    );
    table.insert(
        "gluten".to_string(),
        KeywordMatcher::new(["wheat", "barley", "rye", "oat", "granola", "malt"])
            .except(["goat", "gluten-free", "gluten free"]),
    );
    table.insert(
        "soy".to_string(),
        KeywordMatcher::new(["soy", "tofu", "edamame"]),
    );
    table.insert(
        "eggs".to_string(),
        KeywordMatcher::new(["egg"]).except(["eggplant"]),
    );
    table.insert(
        "sesame".to_string(),
        KeywordMatcher::new(["sesame", "tahini"]),
    );
    table.insert(
        "fish".to_string(),
        KeywordMatcher::new(["fish", "salmon", "cod liver", "anchov"]),
    );
    table.insert("coconut".to_string(), KeywordMatcher::new(["coconut"]));
    table
}

fn default_goal_keywords() -> BTreeMap<HealthGoal, KeywordRule> {
    let mut table = BTreeMap::new();
    table.insert(
        HealthGoal::Energy,
        KeywordRule::new(
            [
                "banana", "dates", "mango", "cacao", "maca", "matcha", "espresso", "coffee",
                "guarana", "beet", "chia",
            ],
            5,
        ),
    );
    table.insert(
        HealthGoal::ImmuneSupport,
        KeywordRule::new(
            [
                "orange",
                "lemon",
                "ginger",
                "turmeric",
                "kiwi",
                "acai",
                "elderberry",
                "citrus",
                "grapefruit",
                "camu",
            ],
            4,
        ),
    );
    table.insert(
        HealthGoal::DigestiveHealth,
        KeywordRule::new(
            [
                "ginger", "papaya", "pineapple", "kefir", "flax", "mint", "fennel", "aloe",
                "psyllium",
            ],
            4,
        ),
    );
    table.insert(
        HealthGoal::StressRelief,
        KeywordRule::new(
            [
                "ashwagandha",
                "chamomile",
                "lavender",
                "cacao",
                "blueberry",
                "magnesium",
                "lemon balm",
                "holy basil",
            ],
            3,
        ),
    );
    table.insert(
        HealthGoal::HeartHealth,
        KeywordRule::new(
            [
                "flax",
                "oat",
                "beet",
                "avocado",
                "pomegranate",
                "blueberry",
                "walnut",
                "chia",
            ],
            3,
        ),
    );
    table.insert(
        HealthGoal::AntiAging,
        KeywordRule::new(
            [
                "blueberry",
                "acai",
                "pomegranate",
                "goji",
                "spinach",
                "kale",
                "collagen",
                "green tea",
                "matcha",
            ],
            3,
        ),
    );
    table
}

fn default_flavors() -> BTreeMap<String, KeywordRule> {
    let entries: [(&str, &[&str]); 9] = [
        (
            "sweet",
            &["banana", "mango", "dates", "honey", "vanilla", "maple", "agave"],
        ),
        ("berry", &["berry", "berries", "acai"]),
        (
            "tropical",
            &[
                "mango",
                "pineapple",
                "coconut",
                "passion fruit",
                "papaya",
                "guava",
            ],
        ),
        (
            "green",
            &[
                "spinach",
                "kale",
                "matcha",
                "cucumber",
                "celery",
                "spirulina",
                "wheatgrass",
            ],
        ),
        (
            "nutty",
            &["almond", "peanut", "cashew", "walnut", "hazelnut", "pecan"],
        ),
        ("chocolatey", &["cacao", "cocoa", "chocolate"]),
        ("citrus", &["orange", "lemon", "lime", "grapefruit", "yuzu"]),
        (
            "creamy",
            &["yogurt", "avocado", "coconut cream", "nut butter", "banana"],
        ),
        ("spicy", &["ginger", "cinnamon", "turmeric", "cayenne"]),
    ];

    entries
        .into_iter()
        .map(|(flavor, keywords)| {
            (
                flavor.to_string(),
                KeywordRule::new(keywords.iter().copied(), 3),
            )
        })
        .collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: 40,
            proximity: ProximityConfig::default(),
            restrictions: default_restrictions(),
            custom_restriction: CustomRestrictionPoints::default(),
            allergens: AllergenConfig::default(),
            sugar: SugarConfig::default(),
            weight_loss: WeightLossConfig::default(),
            muscle_gain: MuscleGainConfig::default(),
            goal_keywords: default_goal_keywords(),
            flavors: default_flavors(),
            checkin: CheckinConfig::default(),
            targets: TargetConfig::default(),
            alignment: AlignmentBands::default(),
        }
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            bands: vec![
                ProximityBand {
                    below_km: 0.5,
                    points: 8,
                },
                ProximityBand {
                    below_km: 1.0,
                    points: 5,
                },
                ProximityBand {
                    below_km: 2.0,
                    points: 2,
                },
            ],
            far_km: 5.0,
            far_penalty: -5,
        }
    }
}

impl Default for CustomRestrictionPoints {
    fn default() -> Self {
        Self {
            penalty: -25,
            reward: 5,
        }
    }
}

impl Default for AllergenConfig {
    fn default() -> Self {
        Self {
            penalty: -60,
            score_ceiling: 20,
            keywords: default_allergens(),
        }
    }
}

impl Default for SugarConfig {
    fn default() -> Self {
        Self {
            high_grams: 35.0,
            high_penalty: -20,
            low_grams: 20.0,
            low_reward: 12,
        }
    }
}

impl Default for WeightLossConfig {
    fn default() -> Self {
        Self {
            low_calorie_kcal: 250.0,
            low_calorie_reward: 15,
            high_fiber_grams: 8.0,
            high_fiber_reward: 10,
            high_calorie_kcal: 400.0,
            high_calorie_penalty: -10,
        }
    }
}

impl Default for MuscleGainConfig {
    fn default() -> Self {
        Self {
            high_protein_grams: 15.0,
            high_protein_reward: 18,
            low_protein_grams: 6.0,
            low_protein_penalty: -12,
        }
    }
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            low_below: 4,
            high_appetite_above: 6,
            energy_keywords: KeywordMatcher::new([
                "banana", "dates", "mango", "cacao", "maca", "matcha", "espresso", "coffee",
                "guarana", "beet", "chia",
            ]),
            mood_keywords: KeywordMatcher::new([
                "cacao",
                "chocolate",
                "banana",
                "blueberry",
                "ashwagandha",
                "saffron",
                "dates",
            ]),
            low_energy_reward: 12,
            low_mood_reward: 10,
            appetite_reward: 8,
            light_meal_kcal: 250.0,
            hearty_meal_kcal: 400.0,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            calories: 300.0,
            protein_grams: 15.0,
        }
    }
}

impl Default for AlignmentBands {
    fn default() -> Self {
        Self {
            excellent: 80,
            good: 65,
            moderate: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn defaults_pass_validation() {
        ScoringConfig::default()
            .validate()
            .expect("reference configuration is valid");
    }

    #[test]
    fn json_override_keeps_unspecified_defaults() {
        let json = r#"{
            "base_score": 50,
            "flavors": { "Smoky": { "keywords": ["Chipotle"], "points_per_match": 2 } }
        }"#;

        let config = ScoringConfig::from_reader(Cursor::new(json)).expect("override loads");

        assert_eq!(config.base_score, 50);
        assert_eq!(config.allergens.score_ceiling, 20);
        let smoky = config.flavors.get("smoky").expect("flavor key normalised");
        assert!(smoky.matcher.matches("chipotle"));
        assert!(config
            .restrictions
            .contains_key(&DietaryRestriction::NutFree));
    }

    #[test]
    fn rejects_allergen_penalty_weaker_than_restrictions() {
        let mut config = ScoringConfig::default();
        config.allergens.penalty = -40;

        match config.validate() {
            Err(ScoringConfigError::PenaltyOrdering(message)) => {
                assert!(message.contains("allergen"));
            }
            other => panic!("expected ordering error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_soft_bonus_that_outweighs_restriction_penalty() {
        let mut config = ScoringConfig::default();
        config.flavors.insert(
            "sweet".to_string(),
            KeywordRule::new(["banana"], 30),
        );

        assert!(matches!(
            config.validate(),
            Err(ScoringConfigError::PenaltyOrdering(_))
        ));
    }

    #[test]
    fn rejects_empty_keyword_tables() {
        let mut config = ScoringConfig::default();
        config
            .goal_keywords
            .insert(HealthGoal::Energy, KeywordRule::new(["  "], 5));

        assert!(matches!(
            config.validate(),
            Err(ScoringConfigError::EmptyKeywords(table)) if table.contains("energy")
        ));
    }

    #[test]
    fn unknown_allergen_falls_back_to_tag_keywords() {
        let config = ScoringConfig::default();
        let matcher = config.allergens.matcher_for("Strawberries");

        assert!(matcher.matches("fresh strawberry"));
        assert!(!matcher.matches("banana"));
    }

    #[test]
    fn targets_scale_with_activity() {
        let targets = TargetConfig::default();

        let athlete = targets.scaled(Some(ActivityLevel::Athlete));
        assert_eq!(athlete.calories, 420.0);
        assert_eq!(athlete.protein_grams, 21.0);
        assert_eq!(targets.scaled(None), targets);
    }

    #[test]
    fn custom_restriction_builds_keyword_rule() {
        let config = ScoringConfig::default();
        let rule = config
            .restriction_rule(&DietaryRestriction::from_tag("soy-free"))
            .expect("custom rule");

        assert!(rule.matcher.matches("soy milk"));
        assert_eq!(rule.penalty, config.custom_restriction.penalty);
    }
}
