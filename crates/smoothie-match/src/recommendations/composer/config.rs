use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::super::domain::{HealthGoal, Nutrient};

/// Parameters for slot filling, costing and naming of composed recipes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub target_weight_grams: f32,
    pub cost_ceiling: f32,
    /// Nominal price used for margin reporting.
    pub selling_price: f32,
    pub preferred_liquid: String,
    pub shares: SlotShares,
    /// Supplements stop once the remaining weight drops below this.
    pub supplement_floor_grams: f32,
    /// Size of the cheapest-fruit shortlist handed to the choice strategy.
    pub fruit_choices: usize,
    pub vegetable: VegetableThresholds,
    /// Per-100 g sugar above which an ingredient is dropped for low-sugar profiles.
    pub low_sugar_max_per_100g: f32,
    pub tiers: TierThresholds,
    pub rationale: RationaleThresholds,
    pub goal_properties: BTreeMap<HealthGoal, Vec<GoalProperty>>,
    /// Composition attempts per requested recipe before giving up.
    pub max_attempts: u32,
    /// Upper bound on recipes composed for one request.
    pub max_recipes_per_request: usize,
}

/// Fraction of the remaining weight each slot claims.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotShares {
    /// Share of the full target weight, not of the remainder.
    pub liquid: f32,
    pub primary_fruit: f32,
    pub protein: f32,
    pub vegetable: f32,
    pub supplement: f32,
}

/// Per-100 g levels that qualify a vegetable for the micronutrient slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetableThresholds {
    pub iron_mg: f32,
    pub vitamin_c_mg: f32,
    pub calcium_mg: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub essential_max_cost: f32,
    pub enhanced_max_cost: f32,
}

/// Per-serving levels quoted in the "why this works" rationale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RationaleThresholds {
    pub protein_grams: f32,
    pub iron_mg: f32,
    pub vitamin_c_mg: f32,
    pub fiber_grams: f32,
    pub omega3_grams: f32,
}

/// One nutrient a goal cares about and how strongly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProperty {
    pub nutrient: Nutrient,
    pub factor: f32,
}

impl GoalProperty {
    pub const fn new(nutrient: Nutrient, factor: f32) -> Self {
        Self { nutrient, factor }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComposerConfigError {
    #[error("failed to read composer config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid composer config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} must be a finite, positive number")]
    NonPositive(&'static str),
    #[error("slot share {0} must lie within (0, 1)")]
    InvalidShare(&'static str),
    #[error("goal '{0}' lists no nutrient properties")]
    EmptyGoalProperties(String),
    #[error("goal '{goal}' has a non-positive factor for {nutrient:?}")]
    InvalidFactor { goal: String, nutrient: Nutrient },
    #[error("tier thresholds must be positive and ascending")]
    InvalidTiers,
}

impl ComposerConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ComposerConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ComposerConfigError> {
        let config: ComposerConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ComposerConfigError> {
        positive(self.target_weight_grams, "target_weight_grams")?;
        positive(self.selling_price, "selling_price")?;
        positive(self.supplement_floor_grams, "supplement_floor_grams")?;
        positive(self.low_sugar_max_per_100g, "low_sugar_max_per_100g")?;
        // A zero ceiling is legal; it marks every recipe unprofitable.
        if !self.cost_ceiling.is_finite() || self.cost_ceiling < 0.0 {
            return Err(ComposerConfigError::NonPositive("cost_ceiling"));
        }
        if self.fruit_choices == 0 {
            return Err(ComposerConfigError::NonPositive("fruit_choices"));
        }
        if self.max_attempts == 0 {
            return Err(ComposerConfigError::NonPositive("max_attempts"));
        }
        if self.max_recipes_per_request == 0 {
            return Err(ComposerConfigError::NonPositive("max_recipes_per_request"));
        }

        let shares = [
            (self.shares.liquid, "liquid"),
            (self.shares.primary_fruit, "primary_fruit"),
            (self.shares.protein, "protein"),
            (self.shares.vegetable, "vegetable"),
            (self.shares.supplement, "supplement"),
        ];
        for (share, name) in shares {
            if !share.is_finite() || share <= 0.0 || share >= 1.0 {
                return Err(ComposerConfigError::InvalidShare(name));
            }
        }

        let tiers = &self.tiers;
        if !(tiers.essential_max_cost > 0.0 && tiers.enhanced_max_cost > tiers.essential_max_cost)
        {
            return Err(ComposerConfigError::InvalidTiers);
        }

        for (goal, properties) in &self.goal_properties {
            if properties.is_empty() {
                return Err(ComposerConfigError::EmptyGoalProperties(
                    goal.tag().to_string(),
                ));
            }
            if let Some(bad) = properties
                .iter()
                .find(|property| !property.factor.is_finite() || property.factor <= 0.0)
            {
                return Err(ComposerConfigError::InvalidFactor {
                    goal: goal.tag().to_string(),
                    nutrient: bad.nutrient,
                });
            }
        }

        Ok(())
    }

    pub fn properties_for(&self, goal: &HealthGoal) -> &[GoalProperty] {
        self.goal_properties
            .get(goal)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn positive(value: f32, name: &'static str) -> Result<(), ComposerConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ComposerConfigError::NonPositive(name))
    }
}

fn default_goal_properties() -> BTreeMap<HealthGoal, Vec<GoalProperty>> {
    use Nutrient::*;

    let table = [
        (HealthGoal::Energy, vec![GoalProperty::new(Carbs, 0.5), GoalProperty::new(Iron, 4.0)]),
        (HealthGoal::WeightLoss, vec![GoalProperty::new(Fiber, 2.0)]),
        (HealthGoal::MuscleGain, vec![GoalProperty::new(Protein, 1.0)]),
        (
            HealthGoal::StressRelief,
            vec![GoalProperty::new(Magnesium, 0.1)],
        ),
        (
            HealthGoal::ImmuneSupport,
            vec![GoalProperty::new(VitaminC, 0.2)],
        ),
        (
            HealthGoal::HeartHealth,
            vec![
                GoalProperty::new(Omega3, 8.0),
                GoalProperty::new(Potassium, 0.02),
            ],
        ),
        (
            HealthGoal::DigestiveHealth,
            vec![GoalProperty::new(Fiber, 2.0)],
        ),
        (
            HealthGoal::AntiAging,
            vec![
                GoalProperty::new(VitaminC, 0.1),
                GoalProperty::new(Omega3, 4.0),
            ],
        ),
    ];
    table.into_iter().collect()
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            target_weight_grams: 350.0,
            cost_ceiling: 5.0,
            selling_price: 12.0,
            preferred_liquid: "almond milk".to_string(),
            shares: SlotShares::default(),
            supplement_floor_grams: 10.0,
            fruit_choices: 3,
            vegetable: VegetableThresholds::default(),
            low_sugar_max_per_100g: 15.0,
            tiers: TierThresholds::default(),
            rationale: RationaleThresholds::default(),
            goal_properties: default_goal_properties(),
            max_attempts: 3,
            max_recipes_per_request: 10,
        }
    }
}

impl Default for SlotShares {
    fn default() -> Self {
        Self {
            liquid: 0.40,
            primary_fruit: 0.20,
            protein: 0.10,
            vegetable: 0.08,
            supplement: 0.05,
        }
    }
}

impl Default for VegetableThresholds {
    fn default() -> Self {
        Self {
            iron_mg: 1.0,
            vitamin_c_mg: 20.0,
            calcium_mg: 50.0,
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            essential_max_cost: 3.0,
            enhanced_max_cost: 4.25,
        }
    }
}

impl Default for RationaleThresholds {
    fn default() -> Self {
        Self {
            protein_grams: 20.0,
            iron_mg: 3.0,
            vitamin_c_mg: 80.0,
            fiber_grams: 10.0,
            omega3_grams: 1.5,
        }
    }
}
