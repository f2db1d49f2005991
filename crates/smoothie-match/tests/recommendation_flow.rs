use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use smoothie_match::recommendations::{
    parse_catalog, parse_inventory, Candidate, CatalogSource, ComposerConfig, DailyCheckin,
    DietaryRestriction, FirstChoice, HealthGoal, Ingredient, Profile, ProfileRecord,
    ProfileStore, RandomChoice, RecommendationOptions, RecommendationService, ScoringConfig,
    ScoringContext, StoreError, UserId,
};

const CATALOG: &str = r#"[
    {
        "id": "green-machine",
        "name": "Green Machine",
        "provider": "Corner Juice",
        "ingredients": ["Spinach", "Kale", "Banana", "Oat Milk"],
        "nutritionalInfo": { "calories": 200 },
        "distanceKm": 0.3
    },
    {
        "id": "pb-blast",
        "name": "PB Blast",
        "provider": "Corner Juice",
        "ingredients": ["Peanut Butter", "Banana", "Almond Milk"],
        "nutritionalInfo": { "calories": 480 },
        "distanceKm": 0.3
    },
    {
        "id": "tropical",
        "name": "Tropical Wave",
        "provider": "Beach Shack",
        "ingredients": ["Mango", "Pineapple", "Coconut Water"],
        "nutritionalInfo": { "calories": 210 },
        "distance": 3.0
    }
]"#;

const INVENTORY: &str = "\
name,category,cost_per_100g,calories,protein,sugar,iron,vitamin_c,calcium,muscle_recovery
Oat Milk,liquid,0.25,45,1.0,3.2,,,120,
Banana,fruit,0.25,89,1.1,12.2,0.3,8.7,5,
Mango,fruit,0.45,60,0.8,13.7,0.2,36.4,11,
Pineapple,fruit,0.40,50,0.5,9.9,0.3,47.8,13,
Pea Protein,protein,3.00,380,80,0,5.0,,60,yes
Kale,vegetable,1.10,49,4.3,2.3,1.5,120,150,
";

#[derive(Default)]
struct MemoryProfiles {
    records: Mutex<HashMap<UserId, ProfileRecord>>,
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

struct FixtureCatalog {
    candidates: Vec<Candidate>,
    inventory: Vec<Ingredient>,
}

impl CatalogSource for FixtureCatalog {
    fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.candidates.clone())
    }

    fn inventory(&self) -> Result<Vec<Ingredient>, StoreError> {
        Ok(self.inventory.clone())
    }
}

fn service() -> RecommendationService<MemoryProfiles, FixtureCatalog> {
    let catalog = FixtureCatalog {
        candidates: parse_catalog(CATALOG.as_bytes()).expect("catalog parses"),
        inventory: parse_inventory(INVENTORY.as_bytes()).expect("inventory parses"),
    };
    RecommendationService::new(
        Arc::new(MemoryProfiles::default()),
        Arc::new(catalog),
        ScoringConfig::default(),
        ComposerConfig::default(),
    )
}

fn user() -> UserId {
    UserId("taylor".to_string())
}

fn lean_energy_nut_free() -> Profile {
    Profile::default()
        .with_restriction(DietaryRestriction::NutFree)
        .with_goal(HealthGoal::WeightLoss)
        .with_goal(HealthGoal::Energy)
}

#[test]
fn stored_profile_drives_catalog_ranking() {
    let service = service();
    service
        .save_profile(user(), lean_energy_nut_free())
        .expect("profile saved");

    let options = RecommendationOptions {
        context: ScoringContext::with_checkin(DailyCheckin::new(3, 6, 5)),
        limit: None,
        generated: 0,
    };
    let results = service
        .recommend(&user(), options, &mut FirstChoice)
        .expect("recommendations");

    let ids: Vec<&str> = results.iter().map(|r| r.candidate_id.as_str()).collect();
    assert_eq!(ids, vec!["green-machine", "tropical", "pb-blast"]);

    let nutty = &results[2];
    assert!(nutty.score <= 20);
    assert!(nutty
        .concerns
        .iter()
        .any(|concern| concern.starts_with("Allergen alert")));
    assert!(results[0]
        .match_reasons
        .iter()
        .any(|reason| reason == "Fits your nut-free diet"));
    assert!(!results[0].benefits_for_today.is_empty());
}

#[test]
fn cafes_rank_by_whole_menu_average() {
    let service = service();
    service
        .save_profile(user(), lean_energy_nut_free())
        .expect("profile saved");

    let rankings = service
        .recommend_cafes(&user(), &ScoringContext::default())
        .expect("cafe rankings");

    assert_eq!(rankings.len(), 2);
    assert_eq!(rankings[0].provider, "Beach Shack");
    assert_eq!(rankings[1].provider, "Corner Juice");
    assert_eq!(rankings[1].candidate_count, 2);
    assert_eq!(rankings[1].top_matches[0].candidate_id, "green-machine");
}

#[test]
fn generated_recipes_join_the_ranking() {
    let service = service();
    service
        .save_profile(user(), lean_energy_nut_free())
        .expect("profile saved");

    let options = RecommendationOptions {
        context: ScoringContext::default(),
        limit: Some(10),
        generated: 2,
    };
    let results = service
        .recommend(&user(), options, &mut RandomChoice::seeded(11))
        .expect("recommendations");

    let generated = results
        .iter()
        .filter(|result| result.provider == "home-generated")
        .count();
    assert!((1..=2).contains(&generated));
    assert_eq!(results.len(), 3 + generated);
    assert!(results.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn composed_recipes_respect_cost_ceiling() {
    let service = service();

    let recipes = service
        .generate_recipes(&user(), 3, &ScoringContext::default(), &mut RandomChoice::seeded(3))
        .expect("recipes");

    assert!(!recipes.is_empty());
    for generated in &recipes {
        assert!(generated.recipe.is_profitable);
        assert!(generated.recipe.total_cost <= generated.recipe.cost_ceiling);
        assert_eq!(generated.result.candidate_id, generated.recipe.candidate.id);
    }
}
