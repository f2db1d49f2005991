use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::recommendations::composer::{ComposerConfig, Ingredient, IngredientCategory};
use crate::recommendations::domain::{Candidate, NutritionalInfo, UserId};
use crate::recommendations::scoring::{ScoringConfig, ScoringEngine};
use crate::recommendations::service::RecommendationService;
use crate::recommendations::store::{
    CatalogSource, ProfileRecord, ProfileStore, StoreError,
};

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default())
}

pub(super) fn nutrition(calories: f32) -> NutritionalInfo {
    NutritionalInfo {
        calories: Some(calories),
        ..NutritionalInfo::default()
    }
}

pub(super) fn cafe_item(id: &str, provider: &str, ingredients: &[&str]) -> Candidate {
    Candidate::new(id, format!("{provider} {id}"), ingredients.iter().copied())
        .with_provider(provider)
        .with_price(8.5)
}

pub(super) fn cafe_catalog() -> Vec<Candidate> {
    vec![
        cafe_item("sunrise", "Juice Lab", &["Banana", "Mango", "Oat Milk"])
            .with_nutrition(nutrition(280.0))
            .with_distance(0.4),
        cafe_item("nutty", "Juice Lab", &["Almond Butter", "Banana", "Cacao"])
            .with_nutrition(nutrition(420.0))
            .with_distance(0.4),
        cafe_item("greens", "Leaf & Co", &["Spinach", "Kale", "Pineapple", "Coconut Water"])
            .with_nutrition(nutrition(190.0))
            .with_distance(1.5),
        cafe_item("berry", "Leaf & Co", &["Blueberry", "Strawberry", "Greek Yogurt"])
            .with_nutrition(nutrition(240.0))
            .with_distance(1.5),
        cafe_item("espresso", "Daily Grind", &["Espresso", "Banana", "Dates", "Oat Milk"])
            .with_nutrition(nutrition(350.0))
            .with_distance(6.0),
    ]
}

fn ingredient(
    name: &str,
    category: IngredientCategory,
    cost_per_100g: f32,
    per_100g: NutritionalInfo,
) -> Ingredient {
    Ingredient::new(name, category, cost_per_100g).with_nutrition(per_100g)
}

pub(super) fn inventory() -> Vec<Ingredient> {
    use IngredientCategory::*;

    vec![
        ingredient(
            "Almond Milk",
            Liquid,
            0.30,
            NutritionalInfo {
                calories: Some(17.0),
                protein: Some(0.6),
                calcium: Some(180.0),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Oat Milk",
            Liquid,
            0.25,
            NutritionalInfo {
                calories: Some(45.0),
                fiber: Some(0.8),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Coconut Water",
            Liquid,
            0.35,
            NutritionalInfo {
                calories: Some(19.0),
                potassium: Some(250.0),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Banana",
            Fruit,
            0.25,
            NutritionalInfo {
                calories: Some(89.0),
                carbs: Some(23.0),
                fiber: Some(2.6),
                sugar: Some(12.0),
                potassium: Some(358.0),
                vitamin_c: Some(8.7),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Mango",
            Fruit,
            0.45,
            NutritionalInfo {
                calories: Some(60.0),
                sugar: Some(13.7),
                vitamin_c: Some(36.4),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Blueberry",
            Fruit,
            0.90,
            NutritionalInfo {
                calories: Some(57.0),
                fiber: Some(2.4),
                sugar: Some(10.0),
                vitamin_c: Some(9.7),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Strawberry",
            Fruit,
            0.70,
            NutritionalInfo {
                calories: Some(32.0),
                sugar: Some(4.9),
                vitamin_c: Some(58.8),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Pineapple",
            Fruit,
            0.40,
            NutritionalInfo {
                calories: Some(50.0),
                sugar: Some(9.9),
                vitamin_c: Some(47.8),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Dates",
            Fruit,
            1.50,
            NutritionalInfo {
                calories: Some(277.0),
                sugar: Some(66.0),
                fiber: Some(6.7),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Pea Protein",
            Protein,
            3.00,
            NutritionalInfo {
                calories: Some(380.0),
                protein: Some(80.0),
                iron: Some(5.0),
                ..NutritionalInfo::default()
            },
        )
        .supports_recovery(),
        ingredient(
            "Greek Yogurt",
            Protein,
            0.60,
            NutritionalInfo {
                calories: Some(59.0),
                protein: Some(10.0),
                calcium: Some(110.0),
                ..NutritionalInfo::default()
            },
        )
        .supports_recovery(),
        ingredient(
            "Peanut Butter",
            Protein,
            0.80,
            NutritionalInfo {
                calories: Some(588.0),
                protein: Some(25.0),
                fat: Some(50.0),
                ..NutritionalInfo::default()
            },
        )
        .supports_recovery(),
        ingredient(
            "Cucumber",
            Vegetable,
            0.30,
            NutritionalInfo {
                calories: Some(15.0),
                vitamin_c: Some(2.8),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Spinach",
            Vegetable,
            0.90,
            NutritionalInfo {
                calories: Some(23.0),
                protein: Some(2.9),
                fiber: Some(2.2),
                iron: Some(2.7),
                vitamin_c: Some(28.0),
                calcium: Some(99.0),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Kale",
            Vegetable,
            1.10,
            NutritionalInfo {
                calories: Some(49.0),
                iron: Some(1.5),
                vitamin_c: Some(120.0),
                calcium: Some(150.0),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Chia Seeds",
            Supplement,
            2.50,
            NutritionalInfo {
                calories: Some(486.0),
                protein: Some(17.0),
                fiber: Some(34.0),
                iron: Some(7.7),
                calcium: Some(631.0),
                magnesium: Some(335.0),
                omega3: Some(17.8),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Cacao Nibs",
            Supplement,
            3.00,
            NutritionalInfo {
                calories: Some(228.0),
                fiber: Some(33.0),
                iron: Some(13.9),
                magnesium: Some(499.0),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Flaxseed",
            Supplement,
            1.50,
            NutritionalInfo {
                calories: Some(534.0),
                fiber: Some(27.0),
                magnesium: Some(392.0),
                omega3: Some(22.8),
                ..NutritionalInfo::default()
            },
        ),
        ingredient(
            "Ginger",
            Supplement,
            1.20,
            NutritionalInfo {
                calories: Some(80.0),
                vitamin_c: Some(5.0),
                ..NutritionalInfo::default()
            },
        ),
    ]
}

#[derive(Default, Clone)]
pub(super) struct MemoryProfiles {
    pub(super) records: Arc<Mutex<HashMap<UserId, ProfileRecord>>>,
}

impl ProfileStore for MemoryProfiles {
    fn fetch(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, StoreError> {
        let guard = self.records.lock().expect("profile mutex poisoned");
        Ok(guard.get(user_id).cloned())
    }

    fn save(&self, record: ProfileRecord) -> Result<ProfileRecord, StoreError> {
        let mut guard = self.records.lock().expect("profile mutex poisoned");
        guard.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }
}

pub(super) struct UnavailableProfiles;

impl ProfileStore for UnavailableProfiles {
    fn fetch(&self, _user_id: &UserId) -> Result<Option<ProfileRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn save(&self, _record: ProfileRecord) -> Result<ProfileRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct StaticCatalog {
    pub(super) candidates: Vec<Candidate>,
    pub(super) inventory: Vec<Ingredient>,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self {
            candidates: cafe_catalog(),
            inventory: inventory(),
        }
    }
}

impl CatalogSource for StaticCatalog {
    fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.candidates.clone())
    }

    fn inventory(&self) -> Result<Vec<Ingredient>, StoreError> {
        Ok(self.inventory.clone())
    }
}

pub(super) fn build_service() -> (
    RecommendationService<MemoryProfiles, StaticCatalog>,
    Arc<MemoryProfiles>,
) {
    build_service_with(ComposerConfig::default())
}

pub(super) fn build_service_with(
    composer: ComposerConfig,
) -> (
    RecommendationService<MemoryProfiles, StaticCatalog>,
    Arc<MemoryProfiles>,
) {
    let profiles = Arc::new(MemoryProfiles::default());
    let service = RecommendationService::new(
        profiles.clone(),
        Arc::new(StaticCatalog::default()),
        ScoringConfig::default(),
        composer,
    );
    (service, profiles)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
