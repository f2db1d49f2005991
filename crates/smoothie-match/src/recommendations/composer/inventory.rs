use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::super::domain::{normalize_tag, NutritionalInfo};

/// Slot family an inventory ingredient can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientCategory {
    Liquid,
    Fruit,
    Protein,
    Vegetable,
    Supplement,
}

impl IngredientCategory {
    pub fn from_tag(raw: &str) -> Option<Self> {
        match normalize_tag(raw).as_str() {
            "liquid" | "base" | "liquid-base" => Some(Self::Liquid),
            "fruit" => Some(Self::Fruit),
            "protein" => Some(Self::Protein),
            "vegetable" | "veg" | "greens" => Some(Self::Vegetable),
            "supplement" | "superfood" | "boost" => Some(Self::Supplement),
            _ => None,
        }
    }
}

/// Inventory entry with nutrition and cost quoted per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub category: IngredientCategory,
    #[serde(default)]
    pub per_100g: NutritionalInfo,
    pub cost_per_100g: f32,
    #[serde(default)]
    pub muscle_recovery: bool,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, category: IngredientCategory, cost_per_100g: f32) -> Self {
        Self {
            name: name.into(),
            category,
            per_100g: NutritionalInfo::default(),
            cost_per_100g,
            muscle_recovery: false,
        }
    }

    pub fn with_nutrition(mut self, per_100g: NutritionalInfo) -> Self {
        self.per_100g = per_100g;
        self
    }

    pub fn supports_recovery(mut self) -> Self {
        self.muscle_recovery = true;
        self
    }

    pub fn cost_for(&self, grams: f32) -> f32 {
        self.cost_per_100g * grams / 100.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("failed to read inventory: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid inventory CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown ingredient category '{value}'")]
    UnknownCategory { row: usize, value: String },
    #[error("row {row}: cost for '{name}' must be a finite, non-negative number")]
    InvalidCost { row: usize, name: String },
    #[error("row {row}: ingredient name is empty")]
    MissingName { row: usize },
}

pub fn load_inventory<P: AsRef<Path>>(path: P) -> Result<Vec<Ingredient>, InventoryError> {
    let file = std::fs::File::open(path)?;
    parse_inventory(file)
}

/// Parses an inventory CSV with a header row. Blank nutrient cells stay unknown.
pub fn parse_inventory<R: Read>(reader: R) -> Result<Vec<Ingredient>, InventoryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut ingredients = Vec::new();

    for (index, record) in csv_reader.deserialize::<InventoryRow>().enumerate() {
        let row = record?;
        // Header is line 1.
        let line = index + 2;
        ingredients.push(row.into_ingredient(line)?);
    }

    Ok(ingredients)
}

#[derive(Debug, Deserialize)]
struct InventoryRow {
    name: String,
    category: String,
    cost_per_100g: f32,
    #[serde(default)]
    calories: Option<f32>,
    #[serde(default)]
    protein: Option<f32>,
    #[serde(default)]
    carbs: Option<f32>,
    #[serde(default)]
    fat: Option<f32>,
    #[serde(default)]
    fiber: Option<f32>,
    #[serde(default)]
    sugar: Option<f32>,
    #[serde(default)]
    iron: Option<f32>,
    #[serde(default)]
    vitamin_c: Option<f32>,
    #[serde(default)]
    calcium: Option<f32>,
    #[serde(default)]
    magnesium: Option<f32>,
    #[serde(default)]
    potassium: Option<f32>,
    #[serde(default)]
    omega3: Option<f32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    muscle_recovery: Option<String>,
}

impl InventoryRow {
    fn into_ingredient(self, row: usize) -> Result<Ingredient, InventoryError> {
        if self.name.is_empty() {
            return Err(InventoryError::MissingName { row });
        }
        let category =
            IngredientCategory::from_tag(&self.category).ok_or_else(|| {
                InventoryError::UnknownCategory {
                    row,
                    value: self.category.clone(),
                }
            })?;
        if !self.cost_per_100g.is_finite() || self.cost_per_100g < 0.0 {
            return Err(InventoryError::InvalidCost {
                row,
                name: self.name,
            });
        }

        let muscle_recovery = self
            .muscle_recovery
            .as_deref()
            .map(is_truthy)
            .unwrap_or(false);

        Ok(Ingredient {
            name: self.name,
            category,
            per_100g: NutritionalInfo {
                calories: self.calories,
                protein: self.protein,
                carbs: self.carbs,
                fat: self.fat,
                fiber: self.fiber,
                sugar: self.sugar,
                iron: self.iron,
                vitamin_c: self.vitamin_c,
                calcium: self.calcium,
                magnesium: self.magnesium,
                potassium: self.potassium,
                omega3: self.omega3,
            },
            cost_per_100g: self.cost_per_100g,
            muscle_recovery,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
