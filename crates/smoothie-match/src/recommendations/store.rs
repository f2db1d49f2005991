use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::composer::Ingredient;
use super::domain::{Candidate, Profile, UserId};

/// Stored profile plus the time it was last written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub user_id: UserId,
    pub profile: Profile,
    pub updated_at: DateTime<Utc>,
}

/// Profile persistence owned by the host application.
pub trait ProfileStore: Send + Sync {
    fn fetch(&self, user_id: &UserId) -> Result<Option<ProfileRecord>, StoreError>;
    fn save(&self, record: ProfileRecord) -> Result<ProfileRecord, StoreError>;
}

/// Source of café menu items and the ingredient inventory used for composition.
pub trait CatalogSource: Send + Sync {
    fn candidates(&self) -> Result<Vec<Candidate>, StoreError>;
    fn inventory(&self) -> Result<Vec<Ingredient>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
