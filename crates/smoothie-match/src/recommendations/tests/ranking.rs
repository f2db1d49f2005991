use std::collections::BTreeSet;
use std::sync::Arc;

use super::common::*;

use crate::recommendations::domain::{
    Candidate, DietaryRestriction, HealthGoal, Profile, ScoringContext,
};
use crate::recommendations::ranking::{group_by_provider, ProviderGroup, RankingAggregator};

fn aggregator() -> RankingAggregator {
    RankingAggregator::new(Arc::new(engine()))
}

fn energy_nut_free() -> Profile {
    Profile::default()
        .with_restriction(DietaryRestriction::NutFree)
        .with_goal(HealthGoal::Energy)
}

#[test]
fn rank_all_returns_sorted_subset_within_limit() {
    let catalog = cafe_catalog();
    let profile = energy_nut_free();

    let results = aggregator().rank_all(&catalog, &profile, &ScoringContext::default(), 3);

    assert_eq!(results.len(), 3);
    assert!(results.windows(2).all(|pair| pair[0].score >= pair[1].score));
    let ids: BTreeSet<_> = results.iter().map(|r| r.candidate_id.as_str()).collect();
    assert_eq!(ids.len(), results.len());
    assert!(results
        .iter()
        .all(|r| catalog.iter().any(|c| c.id == r.candidate_id)));
    assert_ne!(results[0].candidate_id, "nutty");
}

#[test]
fn rank_all_keeps_catalog_order_for_ties() {
    let catalog = vec![
        Candidate::new("first", "First", ["Banana"]),
        Candidate::new("second", "Second", ["Mango"]),
        Candidate::new("third", "Third", ["Kale"]),
    ];

    let results = aggregator().rank_all(
        &catalog,
        &Profile::default(),
        &ScoringContext::default(),
        10,
    );

    let ids: Vec<_> = results.iter().map(|r| r.candidate_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn empty_catalog_ranks_to_nothing() {
    let aggregator = aggregator();

    assert!(aggregator
        .rank_all(&[], &energy_nut_free(), &ScoringContext::default(), 5)
        .is_empty());
    assert!(aggregator
        .rank_by_group(&[], &energy_nut_free(), &ScoringContext::default())
        .is_empty());
}

#[test]
fn zero_limit_returns_nothing() {
    let results = aggregator().rank_all(
        &cafe_catalog(),
        &Profile::default(),
        &ScoringContext::default(),
        0,
    );

    assert!(results.is_empty());
}

#[test]
fn groups_order_by_average_of_every_candidate() {
    let standout = cafe_item(
        "standout",
        "One Hit",
        &["Banana", "Mango", "Dates", "Cacao", "Maca", "Matcha", "Espresso"],
    )
    .with_distance(0.2);
    let mut one_hit = vec![standout];
    for index in 0..4 {
        one_hit.push(cafe_item(
            &format!("miss-{index}"),
            "One Hit",
            &["Almond Butter", "Oat Milk"],
        ));
    }
    let steady: Vec<Candidate> = (0..5)
        .map(|index| cafe_item(&format!("steady-{index}"), "Steady", &["Banana", "Oat Milk"]))
        .collect();

    let mut catalog = one_hit;
    catalog.extend(steady);
    let groups = group_by_provider(&catalog);

    let rankings = aggregator().rank_by_group(&groups, &energy_nut_free(), &ScoringContext::default());

    assert_eq!(rankings.len(), 2);
    assert_eq!(rankings[0].provider, "Steady");
    assert_eq!(rankings[0].average_score, 55.0);
    assert_eq!(rankings[1].provider, "One Hit");
    assert_eq!(rankings[1].candidate_count, 5);
    assert_eq!(rankings[1].top_matches.len(), 3);
    assert_eq!(rankings[1].top_matches[0].score, 93);
    assert!((rankings[1].average_score - 18.6).abs() < 1e-4);
}

#[test]
fn group_by_provider_keeps_first_seen_order() {
    let groups = group_by_provider(&cafe_catalog());

    let providers: Vec<_> = groups.iter().map(|g| g.provider.as_str()).collect();
    assert_eq!(providers, vec!["Juice Lab", "Leaf & Co", "Daily Grind"]);
    assert_eq!(groups[0].candidates.len(), 2);
}

#[test]
fn empty_groups_are_omitted() {
    let groups = vec![
        ProviderGroup {
            provider: "Closed".to_string(),
            candidates: Vec::new(),
        },
        ProviderGroup {
            provider: "Open".to_string(),
            candidates: vec![cafe_item("only", "Open", &["Banana"])],
        },
    ];

    let rankings = aggregator().rank_by_group(&groups, &Profile::default(), &ScoringContext::default());

    assert_eq!(rankings.len(), 1);
    assert_eq!(rankings[0].provider, "Open");
    assert_eq!(rankings[0].average_score, 40.0);
}

#[test]
fn group_top_k_is_configurable() {
    let groups = group_by_provider(&cafe_catalog());

    let rankings = aggregator()
        .with_group_top_k(1)
        .rank_by_group(&groups, &Profile::default(), &ScoringContext::default());

    assert!(rankings.iter().all(|ranking| ranking.top_matches.len() == 1));
}
