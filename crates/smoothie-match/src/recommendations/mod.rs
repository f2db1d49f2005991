//! Smoothie recommendations: scoring, ranking and recipe composition.
//!
//! The scoring engine, ranking aggregator and recipe composer are pure functions of their
//! inputs. Profiles and catalogs arrive through the [`ProfileStore`] and [`CatalogSource`]
//! traits so hosts decide how they are persisted.

pub mod catalog;
pub mod composer;
pub mod domain;
pub mod keywords;
pub mod ranking;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use catalog::{load_catalog, parse_catalog, CatalogError};
pub use composer::{
    load_inventory, parse_inventory, ChoiceStrategy, ComposedRecipe, ComposerConfig,
    ComposerConfigError, FirstChoice, GoalProperty, Ingredient, IngredientCategory,
    InventoryError, RandomChoice, RecipeComposer, SlotFill, SlotKind,
};
pub use domain::{
    ActivityLevel, Candidate, DailyCheckin, DietaryRestriction, HealthGoal, Nutrient,
    NutritionalInfo, Profile, RecipeTier, ScoringContext, UserId, HOME_GENERATED_PROVIDER,
};
pub use ranking::{group_by_provider, ProviderGroup, ProviderRanking, RankingAggregator};
pub use router::recommendation_router;
pub use scoring::{
    AlignmentLevel, MatchResult, ProfileAlignment, ScoreComponent, ScoreFactor, ScoringConfig,
    ScoringConfigError, ScoringEngine,
};
pub use service::{
    GeneratedRecipe, RecommendationOptions, RecommendationService, RecommendationServiceError,
};
pub use store::{CatalogSource, ProfileRecord, ProfileStore, StoreError};
