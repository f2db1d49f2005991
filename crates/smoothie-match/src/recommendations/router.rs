use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::composer::RandomChoice;
use super::domain::{Candidate, DailyCheckin, Profile, ScoringContext, UserId};
use super::service::{RecommendationOptions, RecommendationService, RecommendationServiceError};
use super::store::{CatalogSource, ProfileStore, StoreError};

/// Recipes composed when a request does not name a count.
pub const DEFAULT_RECIPE_COUNT: usize = 3;

/// Stateless ranking of a caller-supplied catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub checkin: Option<DailyCheckin>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub checkin: Option<DailyCheckin>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub generated: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub checkin: Option<DailyCheckin>,
}

fn context(checkin: Option<DailyCheckin>) -> ScoringContext {
    ScoringContext { checkin }
}

fn normalized(candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.into_iter().map(Candidate::normalized).collect()
}

/// Router builder exposing matching, profile and recipe endpoints.
pub fn recommendation_router<P, C>(service: Arc<RecommendationService<P, C>>) -> Router
where
    P: ProfileStore + 'static,
    C: CatalogSource + 'static,
{
    Router::new()
        .route("/api/v1/match", post(match_handler::<P, C>))
        .route("/api/v1/match/cafes", post(match_cafes_handler::<P, C>))
        .route(
            "/api/v1/profiles/:user_id",
            get(get_profile_handler::<P, C>).put(put_profile_handler::<P, C>),
        )
        .route(
            "/api/v1/profiles/:user_id/recommendations",
            post(recommendations_handler::<P, C>),
        )
        .route(
            "/api/v1/profiles/:user_id/cafes",
            post(cafes_handler::<P, C>),
        )
        .route(
            "/api/v1/profiles/:user_id/recipes",
            post(recipes_handler::<P, C>),
        )
        .with_state(service)
}

pub(crate) async fn match_handler<P, C>(
    State(service): State<Arc<RecommendationService<P, C>>>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response
where
    P: ProfileStore + 'static,
    C: CatalogSource + 'static,
{
    let candidates = normalized(request.candidates);
    let profile = request.profile.normalized();
    let results = service.match_candidates(
        &profile,
        &candidates,
        &context(request.checkin),
        request.limit,
    );
    (StatusCode::OK, axum::Json(results)).into_response()
}

pub(crate) async fn match_cafes_handler<P, C>(
    State(service): State<Arc<RecommendationService<P, C>>>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response
where
    P: ProfileStore + 'static,
    C: CatalogSource + 'static,
{
    let candidates = normalized(request.candidates);
    let profile = request.profile.normalized();
    let rankings = service.match_cafes(&profile, &candidates, &context(request.checkin));
    (StatusCode::OK, axum::Json(rankings)).into_response()
}

pub(crate) async fn put_profile_handler<P, C>(
    State(service): State<Arc<RecommendationService<P, C>>>,
    Path(user_id): Path<String>,
    axum::Json(profile): axum::Json<Profile>,
) -> Response
where
    P: ProfileStore + 'static,
    C: CatalogSource + 'static,
{
    match service.save_profile(UserId(user_id), profile) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_profile_handler<P, C>(
    State(service): State<Arc<RecommendationService<P, C>>>,
    Path(user_id): Path<String>,
) -> Response
where
    P: ProfileStore + 'static,
    C: CatalogSource + 'static,
{
    match service.profile_record(&UserId(user_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recommendations_handler<P, C>(
    State(service): State<Arc<RecommendationService<P, C>>>,
    Path(user_id): Path<String>,
    axum::Json(request): axum::Json<RecommendationRequest>,
) -> Response
where
    P: ProfileStore + 'static,
    C: CatalogSource + 'static,
{
    let options = RecommendationOptions {
        context: context(request.checkin),
        limit: request.limit,
        generated: request.generated.unwrap_or(0),
    };
    let mut chooser = RandomChoice::from_entropy();
    match service.recommend(&UserId(user_id), options, &mut chooser) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cafes_handler<P, C>(
    State(service): State<Arc<RecommendationService<P, C>>>,
    Path(user_id): Path<String>,
    axum::Json(request): axum::Json<RecommendationRequest>,
) -> Response
where
    P: ProfileStore + 'static,
    C: CatalogSource + 'static,
{
    match service.recommend_cafes(&UserId(user_id), &context(request.checkin)) {
        Ok(rankings) => (StatusCode::OK, axum::Json(rankings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recipes_handler<P, C>(
    State(service): State<Arc<RecommendationService<P, C>>>,
    Path(user_id): Path<String>,
    axum::Json(request): axum::Json<RecipeRequest>,
) -> Response
where
    P: ProfileStore + 'static,
    C: CatalogSource + 'static,
{
    let count = request.count.unwrap_or(DEFAULT_RECIPE_COUNT);
    let mut chooser = RandomChoice::from_entropy();
    match service.generate_recipes(
        &UserId(user_id),
        count,
        &context(request.checkin),
        &mut chooser,
    ) {
        Ok(recipes) => (StatusCode::OK, axum::Json(recipes)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: RecommendationServiceError) -> Response {
    let status = match &error {
        RecommendationServiceError::InvalidUserId => StatusCode::UNPROCESSABLE_ENTITY,
        RecommendationServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        RecommendationServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
