use smoothie_match::recommendations::{
    Candidate, DietaryRestriction, HealthGoal, Profile, ScoringConfig, ScoringConfigError,
    ScoringContext, ScoringEngine,
};

fn plain_candidate() -> Candidate {
    Candidate::new("plain", "Plain Banana", ["Banana", "Oat Milk"])
}

#[test]
fn partial_override_keeps_remaining_defaults() {
    let json = r#"{
        "base_score": 50,
        "goal_keywords": {
            "energy": { "keywords": ["Banana", "Oat"], "points_per_match": 4 }
        }
    }"#;

    let config = ScoringConfig::from_reader(json.as_bytes()).expect("override loads");
    assert_eq!(config.base_score, 50);
    assert_eq!(config.allergens.score_ceiling, 20);

    let engine = ScoringEngine::new(config);
    let profile = Profile::default().with_goal(HealthGoal::Energy);
    let result = engine.score(&plain_candidate(), &profile, &ScoringContext::default());

    assert_eq!(result.score, 58);
}

#[test]
fn weak_allergen_penalty_is_rejected() {
    let json = r#"{ "allergens": { "penalty": -10 } }"#;

    let error = ScoringConfig::from_reader(json.as_bytes()).expect_err("ordering enforced");

    assert!(matches!(error, ScoringConfigError::PenaltyOrdering(_)));
}

#[test]
fn out_of_range_base_score_is_rejected() {
    let error = ScoringConfig::from_reader(r#"{ "base_score": 120 }"#.as_bytes())
        .expect_err("base score bounded");

    assert!(matches!(error, ScoringConfigError::BaseScoreOutOfRange(120)));
}

#[test]
fn restriction_penalty_override_changes_scores() {
    let json = r#"{
        "restrictions": {
            "gluten-free": {
                "keywords": ["oat"],
                "exceptions": ["goat"],
                "penalty": -30,
                "reward": 6
            }
        }
    }"#;

    let engine = ScoringEngine::new(ScoringConfig::from_reader(json.as_bytes()).expect("loads"));
    let profile = Profile::default().with_restriction(DietaryRestriction::GlutenFree);
    let result = engine.score(&plain_candidate(), &profile, &ScoringContext::default());

    assert_eq!(result.score, 10);
    assert_eq!(
        result.concerns,
        vec!["Contains Oat Milk, which is not gluten-free".to_string()]
    );
}
