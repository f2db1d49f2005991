use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Provider tag attached to recipes synthesized by the composer.
pub const HOME_GENERATED_PROVIDER: &str = "home-generated";

/// Lowercases a profile tag and folds spaces/underscores into dashes.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|ch| if ch == '_' || ch == ' ' { '-' } else { ch })
        .collect()
}

/// Identifier wrapper for profile owners.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Health goals a profile can opt into. Unknown tags are kept so they round-trip, but carry
/// no scoring rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HealthGoal {
    Energy,
    WeightLoss,
    MuscleGain,
    StressRelief,
    ImmuneSupport,
    HeartHealth,
    DigestiveHealth,
    AntiAging,
    Other(String),
}

impl HealthGoal {
    pub fn from_tag(raw: &str) -> Self {
        match normalize_tag(raw).as_str() {
            "energy" | "energy-boost" => Self::Energy,
            "weight-loss" | "weight-management" => Self::WeightLoss,
            "muscle-gain" | "muscle-building" | "muscle-recovery" => Self::MuscleGain,
            "stress-relief" | "stress-reduction" => Self::StressRelief,
            "immune-support" | "immunity-boost" | "immunity" => Self::ImmuneSupport,
            "heart-health" => Self::HeartHealth,
            "digestive-health" | "digestion" | "gut-health" => Self::DigestiveHealth,
            "anti-aging" | "longevity" => Self::AntiAging,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Energy => "energy",
            Self::WeightLoss => "weight-loss",
            Self::MuscleGain => "muscle-gain",
            Self::StressRelief => "stress-relief",
            Self::ImmuneSupport => "immune-support",
            Self::HeartHealth => "heart-health",
            Self::DigestiveHealth => "digestive-health",
            Self::AntiAging => "anti-aging",
            Self::Other(tag) => tag,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Energy => "Energy".to_string(),
            Self::WeightLoss => "Weight loss".to_string(),
            Self::MuscleGain => "Muscle gain".to_string(),
            Self::StressRelief => "Stress relief".to_string(),
            Self::ImmuneSupport => "Immune support".to_string(),
            Self::HeartHealth => "Heart health".to_string(),
            Self::DigestiveHealth => "Digestive health".to_string(),
            Self::AntiAging => "Anti-aging".to_string(),
            Self::Other(tag) => tag.replace('-', " "),
        }
    }
}

impl From<String> for HealthGoal {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<HealthGoal> for String {
    fn from(value: HealthGoal) -> Self {
        value.tag().to_string()
    }
}

/// Dietary restrictions. `Other` carries a free-form "<ingredient>-free" tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DietaryRestriction {
    Vegan,
    Vegetarian,
    GlutenFree,
    DairyFree,
    NutFree,
    LowSugar,
    Keto,
    Paleo,
    Other(String),
}

impl DietaryRestriction {
    pub fn from_tag(raw: &str) -> Self {
        match normalize_tag(raw).as_str() {
            "vegan" | "plant-based" => Self::Vegan,
            "vegetarian" => Self::Vegetarian,
            "gluten-free" | "no-gluten" => Self::GlutenFree,
            "dairy-free" | "lactose-free" | "no-dairy" => Self::DairyFree,
            "nut-free" | "no-nuts" | "tree-nut-free" => Self::NutFree,
            "low-sugar" | "sugar-free" => Self::LowSugar,
            "keto" | "ketogenic" => Self::Keto,
            "paleo" => Self::Paleo,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Vegan => "vegan",
            Self::Vegetarian => "vegetarian",
            Self::GlutenFree => "gluten-free",
            Self::DairyFree => "dairy-free",
            Self::NutFree => "nut-free",
            Self::LowSugar => "low-sugar",
            Self::Keto => "keto",
            Self::Paleo => "paleo",
            Self::Other(tag) => tag,
        }
    }

    /// Ingredient keyword implied by a free-form restriction ("soy-free" -> "soy"). Tags
    /// without a `-free` suffix name no ingredient and carry no rule.
    pub fn custom_keyword(&self) -> Option<String> {
        match self {
            Self::Other(tag) => {
                let stem = tag.strip_suffix("-free")?;
                let keyword = stem.replace('-', " ");
                if keyword.trim().is_empty() {
                    None
                } else {
                    Some(keyword)
                }
            }
            _ => None,
        }
    }
}

impl From<String> for DietaryRestriction {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<DietaryRestriction> for String {
    fn from(value: DietaryRestriction) -> Self {
        value.tag().to_string()
    }
}

/// Ordinal activity level used to scale calorie and protein targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
    Athlete,
}

impl ActivityLevel {
    /// Unrecognised tags fall back to `Moderate`, the unscaled midpoint.
    pub fn from_tag(raw: &str) -> Self {
        match normalize_tag(raw).as_str() {
            "sedentary" => Self::Sedentary,
            "light" | "lightly-active" => Self::Light,
            "active" => Self::Active,
            "very-active" => Self::VeryActive,
            "athlete" | "athletic" => Self::Athlete,
            _ => Self::Moderate,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very-active",
            Self::Athlete => "athlete",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "lightly active",
            Self::Moderate => "moderately active",
            Self::Active => "active",
            Self::VeryActive => "very active",
            Self::Athlete => "athletic",
        }
    }

    pub const fn target_factor(self) -> f32 {
        match self {
            Self::Sedentary => 0.85,
            Self::Light => 0.95,
            Self::Moderate => 1.0,
            Self::Active => 1.1,
            Self::VeryActive => 1.25,
            Self::Athlete => 1.4,
        }
    }
}

impl From<String> for ActivityLevel {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<ActivityLevel> for String {
    fn from(value: ActivityLevel) -> Self {
        value.tag().to_string()
    }
}

/// A user's standing preferences. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub health_goals: BTreeSet<HealthGoal>,
    pub dietary_restrictions: BTreeSet<DietaryRestriction>,
    pub allergens: BTreeSet<String>,
    pub flavor_preferences: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
}

impl Profile {
    pub fn is_neutral(&self) -> bool {
        self.health_goals.is_empty()
            && self.dietary_restrictions.is_empty()
            && self.allergens.is_empty()
    }

    pub fn with_goal(mut self, goal: HealthGoal) -> Self {
        self.health_goals.insert(goal);
        self
    }

    pub fn with_restriction(mut self, restriction: DietaryRestriction) -> Self {
        self.dietary_restrictions.insert(restriction);
        self
    }

    pub fn with_allergen(mut self, allergen: &str) -> Self {
        self.allergens.insert(normalize_tag(allergen));
        self
    }

    pub fn with_flavor(mut self, flavor: &str) -> Self {
        self.flavor_preferences.insert(normalize_tag(flavor));
        self
    }

    pub fn with_activity(mut self, level: ActivityLevel) -> Self {
        self.activity_level = Some(level);
        self
    }

    /// Folds free-form allergen and flavor tags into their canonical spelling.
    pub fn normalized(mut self) -> Self {
        self.allergens = self
            .allergens
            .iter()
            .map(|tag| normalize_tag(tag))
            .filter(|tag| !tag.is_empty())
            .collect();
        self.flavor_preferences = self
            .flavor_preferences
            .iter()
            .map(|tag| normalize_tag(tag))
            .filter(|tag| !tag.is_empty())
            .collect();
        self
    }
}

/// Per-request mood/energy/appetite check-in on 1-10 scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCheckin {
    pub energy: u8,
    pub mood: u8,
    pub appetite: u8,
}

impl DailyCheckin {
    pub fn new(energy: u8, mood: u8, appetite: u8) -> Self {
        Self {
            energy,
            mood,
            appetite,
        }
    }

    /// Clamps every reading into 1..=10.
    pub fn normalized(self) -> Self {
        Self {
            energy: self.energy.clamp(1, 10),
            mood: self.mood.clamp(1, 10),
            appetite: self.appetite.clamp(1, 10),
        }
    }
}

/// Optional request context passed alongside a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkin: Option<DailyCheckin>,
}

impl ScoringContext {
    pub fn with_checkin(checkin: DailyCheckin) -> Self {
        Self {
            checkin: Some(checkin),
        }
    }
}

/// Nutrient axes scored or aggregated by the engine and composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Sugar,
    Iron,
    VitaminC,
    Calcium,
    Magnesium,
    Potassium,
    Omega3,
}

/// Macro and micronutrient values. Absent fields are unknown, not zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NutritionalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iron: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitamin_c: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnesium: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omega3: Option<f32>,
}

impl NutritionalInfo {
    /// Returns the value for an axis, treating non-finite numbers as unknown.
    pub fn get(&self, nutrient: Nutrient) -> Option<f32> {
        let value = match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sugar => self.sugar,
            Nutrient::Iron => self.iron,
            Nutrient::VitaminC => self.vitamin_c,
            Nutrient::Calcium => self.calcium,
            Nutrient::Magnesium => self.magnesium,
            Nutrient::Potassium => self.potassium,
            Nutrient::Omega3 => self.omega3,
        };
        value.filter(|v| v.is_finite())
    }

    /// Sums per-100g values scaled by grams used. A field stays unknown only when no part
    /// reports it.
    pub fn weighted_sum<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = (f32, &'a NutritionalInfo)>,
    {
        let mut total = NutritionalInfo::default();
        for (grams, per_100g) in parts {
            let scale = grams / 100.0;
            macro_rules! add_scaled {
                ($field:ident) => {
                    if let Some(value) = per_100g.$field.filter(|v| v.is_finite()) {
                        total.$field = Some(total.$field.unwrap_or(0.0) + value * scale);
                    }
                };
            }
            add_scaled!(calories);
            add_scaled!(protein);
            add_scaled!(carbs);
            add_scaled!(fat);
            add_scaled!(fiber);
            add_scaled!(sugar);
            add_scaled!(iron);
            add_scaled!(vitamin_c);
            add_scaled!(calcium);
            add_scaled!(magnesium);
            add_scaled!(potassium);
            add_scaled!(omega3);
        }
        total.rounded()
    }

    fn rounded(mut self) -> Self {
        macro_rules! round_field {
            ($field:ident) => {
                self.$field = self.$field.map(|v| (v * 10.0).round() / 10.0);
            };
        }
        round_field!(calories);
        round_field!(protein);
        round_field!(carbs);
        round_field!(fat);
        round_field!(fiber);
        round_field!(sugar);
        round_field!(iron);
        round_field!(vitamin_c);
        round_field!(calcium);
        round_field!(magnesium);
        round_field!(potassium);
        round_field!(omega3);
        self
    }
}

/// Price tier for generated recipes, proportional to ingredient cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeTier {
    Essential,
    Enhanced,
    Premium,
}

impl RecipeTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Essential => "Essential",
            Self::Enhanced => "Enhanced",
            Self::Premium => "Premium",
        }
    }
}

/// A scoreable smoothie: a café menu item or a composed recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionalInfo>,
    #[serde(default, alias = "distance", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f32>,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<RecipeTier>,
}

fn default_provider() -> String {
    HOME_GENERATED_PROVIDER.to_string()
}

impl Candidate {
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            ingredients: dedupe_ingredients(ingredients.into_iter().map(Into::into)),
            nutritional_info: None,
            distance_km: None,
            price: None,
            provider: default_provider(),
            tier: None,
        }
    }

    pub fn with_nutrition(mut self, nutrition: NutritionalInfo) -> Self {
        self.nutritional_info = Some(nutrition);
        self
    }

    pub fn with_distance(mut self, distance_km: f32) -> Self {
        self.distance_km = Some(distance_km);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_price(mut self, price: f32) -> Self {
        self.price = Some(price);
        self
    }

    pub fn nutrient(&self, nutrient: Nutrient) -> Option<f32> {
        self.nutritional_info
            .as_ref()
            .and_then(|info| info.get(nutrient))
    }

    /// Known distance, ignoring negative or non-finite values.
    pub fn known_distance(&self) -> Option<f32> {
        self.distance_km.filter(|d| d.is_finite() && *d >= 0.0)
    }

    pub fn is_home_generated(&self) -> bool {
        self.provider == HOME_GENERATED_PROVIDER
    }

    /// Re-applies ingredient de-duplication after deserialization.
    pub fn normalized(mut self) -> Self {
        self.ingredients = dedupe_ingredients(std::mem::take(&mut self.ingredients));
        self
    }
}

/// Drops blank and case-insensitively repeated ingredient names, keeping first occurrence.
pub fn dedupe_ingredients<I>(ingredients: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = BTreeSet::new();
    ingredients
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect()
}
