use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;

use crate::recommendations::composer::ComposerConfig;
use crate::recommendations::router::{recommendation_router, RecommendationRequest};
use crate::recommendations::scoring::ScoringConfig;
use crate::recommendations::service::RecommendationService;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request")
}

#[tokio::test]
async fn match_route_scores_supplied_candidates() {
    let (service, _) = build_service();
    let router = recommendation_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/match",
            json!({
                "profile": { "dietaryRestrictions": ["nut-free"], "healthGoals": ["energy"] },
                "candidates": [
                    {
                        "id": "nutty",
                        "name": "Nutty Boost",
                        "ingredients": ["banana", "almond butter", "oat milk"],
                        "nutritionalInfo": { "calories": 300 }
                    },
                    { "id": "plain", "name": "Plain", "ingredients": ["banana", "oat milk"] }
                ],
                "limit": 5
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let results = body.as_array().expect("array of results");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["candidateId"], "plain");
    assert_eq!(results[0]["score"], 55);
    assert_eq!(results[1]["score"], 0);
    assert!(results[1]["concerns"][0]
        .as_str()
        .is_some_and(|concern| concern.contains("nut-free")));
    assert!(results[1]["profileAlignment"]["summary"].is_string());
}

#[tokio::test]
async fn cafe_match_route_returns_grouped_rankings() {
    let (service, _) = build_service();
    let router = recommendation_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/match/cafes",
            json!({
                "profile": { "healthGoals": ["energy"] },
                "candidates": [
                    { "id": "a", "name": "A", "provider": "North", "ingredients": ["kale"] },
                    { "id": "b", "name": "B", "provider": "South", "ingredients": ["banana"] }
                ]
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body[0]["provider"], "South");
    assert_eq!(body[0]["averageScore"], 45.0);
    assert_eq!(body[1]["candidateCount"], 1);
}

#[tokio::test]
async fn profile_routes_round_trip() {
    let (service, _) = build_service();
    let router = recommendation_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/profiles/user-7",
            json!({ "healthGoals": ["muscle-gain"], "allergens": ["Peanuts"] }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/profiles/user-7")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["userId"], "user-7");
    assert_eq!(body["profile"]["healthGoals"], json!(["muscle-gain"]));
    assert_eq!(body["profile"]["allergens"], json!(["peanuts"]));
}

#[tokio::test]
async fn missing_profile_returns_not_found() {
    let (service, _) = build_service();
    let router = recommendation_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/profiles/nobody")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "record not found");
}

#[tokio::test]
async fn recipes_route_returns_scored_recipes() {
    let (service, _) = build_service();
    let router = recommendation_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/profiles/user-9/recipes",
            json!({ "count": 2 }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let recipes = body.as_array().expect("recipes array");
    assert!(!recipes.is_empty() && recipes.len() <= 2);
    assert_eq!(recipes[0]["recipe"]["isProfitable"], true);
    assert_eq!(recipes[0]["recipe"]["candidate"]["provider"], "home-generated");
    assert!(recipes[0]["result"]["score"].is_u64());
}

#[tokio::test]
async fn recommendations_route_includes_generated_items() {
    let (service, _) = build_service();
    let router = recommendation_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/profiles/user-3/recommendations",
            json!({ "generated": 1, "limit": 20, "checkin": { "energy": 2, "mood": 7, "appetite": 5 } }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let results = body.as_array().expect("results array");
    assert_eq!(results.len(), 6);
    assert!(results
        .iter()
        .any(|result| result["provider"] == "home-generated"));
}

#[tokio::test]
async fn cafes_handler_maps_store_outage_to_service_unavailable() {
    let service = Arc::new(RecommendationService::new(
        Arc::new(UnavailableProfiles),
        Arc::new(StaticCatalog::default()),
        ScoringConfig::default(),
        ComposerConfig::default(),
    ));

    let response = crate::recommendations::router::cafes_handler::<UnavailableProfiles, StaticCatalog>(
        State(service),
        Path("user-1".to_string()),
        axum::Json(RecommendationRequest::default()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn blank_user_id_is_unprocessable() {
    let (service, _) = build_service();

    let response = crate::recommendations::router::put_profile_handler::<MemoryProfiles, StaticCatalog>(
        State(Arc::new(service)),
        Path(" ".to_string()),
        axum::Json(Default::default()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
