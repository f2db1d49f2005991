use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::composer::{ChoiceStrategy, ComposedRecipe, ComposerConfig, RecipeComposer};
use super::domain::{Candidate, Profile, ScoringContext, UserId};
use super::ranking::{group_by_provider, ProviderRanking, RankingAggregator};
use super::scoring::{MatchResult, ScoringConfig, ScoringEngine};
use super::store::{CatalogSource, ProfileRecord, ProfileStore, StoreError};

/// Result count used when a request does not name a limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Per-request knobs for a personalised recommendation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecommendationOptions {
    pub context: ScoringContext,
    pub limit: Option<usize>,
    /// Composed recipes to rank alongside the catalog.
    pub generated: usize,
}

/// A composed recipe together with its score for the requesting profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    pub recipe: ComposedRecipe,
    pub result: MatchResult,
}

/// Service composing the profile store, catalog source, scoring engine and composer.
pub struct RecommendationService<P, C> {
    profiles: Arc<P>,
    catalog: Arc<C>,
    aggregator: Arc<RankingAggregator>,
    composer: Arc<RecipeComposer>,
}

impl<P, C> RecommendationService<P, C>
where
    P: ProfileStore + 'static,
    C: CatalogSource + 'static,
{
    pub fn new(
        profiles: Arc<P>,
        catalog: Arc<C>,
        scoring: ScoringConfig,
        composer: ComposerConfig,
    ) -> Self {
        let composer = Arc::new(RecipeComposer::new(composer, scoring.clone()));
        let aggregator = Arc::new(RankingAggregator::new(Arc::new(ScoringEngine::new(scoring))));

        Self {
            profiles,
            catalog,
            aggregator,
            composer,
        }
    }

    pub fn aggregator(&self) -> &RankingAggregator {
        &self.aggregator
    }

    pub fn composer(&self) -> &RecipeComposer {
        &self.composer
    }

    pub fn save_profile(
        &self,
        user_id: UserId,
        profile: Profile,
    ) -> Result<ProfileRecord, RecommendationServiceError> {
        if user_id.0.trim().is_empty() {
            return Err(RecommendationServiceError::InvalidUserId);
        }

        let record = ProfileRecord {
            user_id,
            profile: profile.normalized(),
            updated_at: Utc::now(),
        };
        let stored = self.profiles.save(record)?;
        info!(user = %stored.user_id.0, "saved profile");
        Ok(stored)
    }

    /// Fetch the stored record, failing with `NotFound` when the user has none.
    pub fn profile_record(
        &self,
        user_id: &UserId,
    ) -> Result<ProfileRecord, RecommendationServiceError> {
        let record = self
            .profiles
            .fetch(user_id)?
            .ok_or(StoreError::NotFound)?;
        Ok(record)
    }

    /// Stored profile, or the empty profile when the user never saved one.
    pub fn profile(&self, user_id: &UserId) -> Result<Profile, RecommendationServiceError> {
        let record = self.profiles.fetch(user_id)?;
        Ok(record.map(|record| record.profile).unwrap_or_default())
    }

    /// Ranks catalog items and freshly composed recipes together for a stored profile.
    pub fn recommend(
        &self,
        user_id: &UserId,
        options: RecommendationOptions,
        chooser: &mut dyn ChoiceStrategy,
    ) -> Result<Vec<MatchResult>, RecommendationServiceError> {
        let profile = self.profile(user_id)?;
        let mut candidates = self.catalog.candidates()?;
        if options.generated > 0 {
            let recipes = self.compose_profitable(&profile, options.generated, chooser)?;
            candidates.extend(recipes.into_iter().map(|recipe| recipe.candidate));
        }

        let limit = options.limit.unwrap_or(DEFAULT_LIMIT);
        let results = self
            .aggregator
            .rank_all(&candidates, &profile, &options.context, limit);
        info!(
            user = %user_id.0,
            candidates = candidates.len(),
            returned = results.len(),
            "ranked recommendations"
        );
        Ok(results)
    }

    /// Ranks cafés by the average score of their whole menu for a stored profile.
    pub fn recommend_cafes(
        &self,
        user_id: &UserId,
        context: &ScoringContext,
    ) -> Result<Vec<ProviderRanking>, RecommendationServiceError> {
        let profile = self.profile(user_id)?;
        let candidates: Vec<Candidate> = self
            .catalog
            .candidates()?
            .into_iter()
            .filter(|candidate| !candidate.is_home_generated())
            .collect();
        Ok(self.match_cafes(&profile, &candidates, context))
    }

    /// Composes up to `count` distinct, profitable recipes and scores each one.
    pub fn generate_recipes(
        &self,
        user_id: &UserId,
        count: usize,
        context: &ScoringContext,
        chooser: &mut dyn ChoiceStrategy,
    ) -> Result<Vec<GeneratedRecipe>, RecommendationServiceError> {
        let profile = self.profile(user_id)?;
        let recipes = self.compose_profitable(&profile, count, chooser)?;

        let engine = self.aggregator.engine();
        let mut generated: Vec<GeneratedRecipe> = recipes
            .into_iter()
            .map(|recipe| {
                let result = engine.score(&recipe.candidate, &profile, context);
                GeneratedRecipe { recipe, result }
            })
            .collect();
        generated.sort_by(|a, b| b.result.score.cmp(&a.result.score));
        Ok(generated)
    }

    /// Stateless ranking of caller-supplied candidates.
    pub fn match_candidates(
        &self,
        profile: &Profile,
        candidates: &[Candidate],
        context: &ScoringContext,
        limit: Option<usize>,
    ) -> Vec<MatchResult> {
        self.aggregator.rank_all(
            candidates,
            profile,
            context,
            limit.unwrap_or(DEFAULT_LIMIT),
        )
    }

    pub fn match_cafes(
        &self,
        profile: &Profile,
        candidates: &[Candidate],
        context: &ScoringContext,
    ) -> Vec<ProviderRanking> {
        let groups = group_by_provider(candidates);
        self.aggregator.rank_by_group(&groups, profile, context)
    }

    /// Composes up to `count` distinct, profitable recipes, capped by the composer's
    /// per-request limit. Stops early once a full round of attempts yields nothing new.
    fn compose_profitable(
        &self,
        profile: &Profile,
        count: usize,
        chooser: &mut dyn ChoiceStrategy,
    ) -> Result<Vec<ComposedRecipe>, RecommendationServiceError> {
        let config = self.composer.config();
        let wanted = count.min(config.max_recipes_per_request);
        if wanted == 0 {
            return Ok(Vec::new());
        }
        if wanted < count {
            debug!(requested = count, cap = wanted, "clamped recipe count");
        }
        let inventory = self.catalog.inventory()?;
        let max_attempts = config.max_attempts.max(1);

        let mut seen = BTreeSet::new();
        let mut recipes = Vec::new();
        while recipes.len() < wanted {
            let mut added = false;
            for _ in 0..max_attempts {
                let recipe = self
                    .composer
                    .compose_with_defaults(&inventory, profile, chooser);
                if recipe.is_profitable && seen.insert(recipe.candidate.id.clone()) {
                    recipes.push(recipe);
                    added = true;
                    break;
                }
            }
            if !added {
                warn!(
                    attempts = max_attempts,
                    composed = recipes.len(),
                    requested = wanted,
                    "no new profitable recipe after a full round of attempts"
                );
                break;
            }
        }
        Ok(recipes)
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationServiceError {
    #[error("user id must not be blank")]
    InvalidUserId,
    #[error(transparent)]
    Store(#[from] StoreError),
}
