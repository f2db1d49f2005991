use metrics_exporter_prometheus::PrometheusHandle;
use smoothie_match::config::RecommendationSettings;
use smoothie_match::error::AppError;
use smoothie_match::recommendations::{
    load_catalog, load_inventory, Candidate, CatalogSource, ComposerConfig, Ingredient, Profile,
    ProfileRecord, ProfileStore, RecommendationService, ScoringConfig, StoreError, UserId,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::seed;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type AppService = RecommendationService<InMemoryProfileStore, StaticCatalog>;

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileStore {
    records: Arc<Mutex<HashMap<UserId, ProfileRecord>>>,
}

impl ProfileStore for InMemoryProfileStore {
    fn fetch(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, StoreError> {
        let guard = self.records.lock().expect("profile store mutex poisoned");
        Ok(guard.get(user_id).cloned())
    }

    fn save(&self, record: ProfileRecord) -> Result<ProfileRecord, StoreError> {
        let mut guard = self.records.lock().expect("profile store mutex poisoned");
        guard.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }
}

/// Catalog and inventory held in memory for the lifetime of the process.
#[derive(Debug, Clone)]
pub(crate) struct StaticCatalog {
    candidates: Vec<Candidate>,
    inventory: Vec<Ingredient>,
}

impl StaticCatalog {
    pub(crate) fn new(candidates: Vec<Candidate>, inventory: Vec<Ingredient>) -> Self {
        Self {
            candidates,
            inventory,
        }
    }

    /// Files named in the settings replace the bundled seed data.
    pub(crate) fn load(settings: &RecommendationSettings) -> Result<Self, AppError> {
        let candidates = match &settings.catalog_path {
            Some(path) => load_catalog(path)?,
            None => seed::catalog()?,
        };
        let inventory = match &settings.inventory_path {
            Some(path) => load_inventory(path)?,
            None => seed::inventory()?,
        };
        info!(
            candidates = candidates.len(),
            ingredients = inventory.len(),
            "loaded catalog"
        );
        Ok(Self::new(candidates, inventory))
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

pub(crate) fn scoring_config(settings: &RecommendationSettings) -> Result<ScoringConfig, AppError> {
    match &settings.scoring_config {
        Some(path) => Ok(ScoringConfig::from_path(path)?),
        None => Ok(ScoringConfig::default()),
    }
}

/// Composer economics from file or defaults, with any environment overrides applied.
pub(crate) fn composer_config(
    settings: &RecommendationSettings,
) -> Result<ComposerConfig, AppError> {
    let mut config = match &settings.composer_config {
        Some(path) => ComposerConfig::from_path(path)?,
        None => ComposerConfig::default(),
    };
    if let Some(ceiling) = settings.cost_ceiling {
        config.cost_ceiling = ceiling;
    }
    if let Some(grams) = settings.target_weight_grams {
        config.target_weight_grams = grams;
    }
    if let Some(price) = settings.selling_price {
        config.selling_price = price;
    }
    config.validate()?;
    Ok(config)
}

pub(crate) fn build_service(settings: &RecommendationSettings) -> Result<AppService, AppError> {
    let catalog = StaticCatalog::load(settings)?;
    Ok(RecommendationService::new(
        Arc::new(InMemoryProfileStore::default()),
        Arc::new(catalog),
        scoring_config(settings)?,
        composer_config(settings)?,
    ))
}

/// Reads a profile given either inline JSON or a path to a JSON file.
pub(crate) fn read_profile(raw: &str) -> Result<Profile, AppError> {
    let trimmed = raw.trim();
    let json = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        std::fs::read_to_string(Path::new(trimmed))?
    };
    serde_json::from_str::<Profile>(&json)
        .map(Profile::normalized)
        .map_err(|err| AppError::Input(format!("profile must be a JSON object ({err})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoothie_match::recommendations::{DietaryRestriction, HealthGoal};

    #[test]
    fn inline_profile_json_is_normalized() {
        let profile = read_profile(
            r#"{"healthGoals":["energy"],"dietaryRestrictions":["Nut Free"],"allergens":["Tree Nuts"]}"#,
        )
        .expect("profile parses");

        assert!(profile.health_goals.contains(&HealthGoal::Energy));
        assert!(profile
            .dietary_restrictions
            .contains(&DietaryRestriction::NutFree));
        assert!(profile.allergens.contains("tree-nuts"));
    }

    #[test]
    fn malformed_profile_is_an_input_error() {
        let error = read_profile("{not json").expect_err("invalid profile");
        assert!(matches!(error, AppError::Input(_)));
    }

    #[test]
    fn settings_override_composer_economics() {
        let settings = RecommendationSettings {
            cost_ceiling: Some(4.0),
            target_weight_grams: Some(400.0),
            ..RecommendationSettings::default()
        };

        let config = composer_config(&settings).expect("config valid");

        assert_eq!(config.cost_ceiling, 4.0);
        assert_eq!(config.target_weight_grams, 400.0);
        assert_eq!(config.selling_price, ComposerConfig::default().selling_price);
    }

    #[test]
    fn zero_target_weight_is_rejected() {
        let settings = RecommendationSettings {
            target_weight_grams: Some(0.0),
            ..RecommendationSettings::default()
        };

        assert!(matches!(
            composer_config(&settings),
            Err(AppError::Composer(_))
        ));
    }

    #[test]
    fn seed_catalog_backs_the_service() {
        let catalog = StaticCatalog::load(&RecommendationSettings::default()).expect("seed loads");

        assert!(!catalog.candidates().expect("candidates").is_empty());
        assert!(!catalog.inventory().expect("inventory").is_empty());
    }
}
