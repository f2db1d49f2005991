use crate::infra::{build_service, read_profile, AppService};
use clap::Args;
use smoothie_match::config::{AppConfig, RecommendationSettings};
use smoothie_match::error::AppError;
use smoothie_match::recommendations::{
    ActivityLevel, DailyCheckin, DietaryRestriction, GeneratedRecipe, HealthGoal,
    MatchResult, Profile, ProviderRanking, RandomChoice, RecommendationOptions, ScoringContext,
    SlotKind, UserId,
};
use std::path::PathBuf;

/// Check-in reading assumed for any value left off the command line.
const NEUTRAL_READING: u8 = 5;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Profile as inline JSON or a path to a JSON file
    #[arg(long)]
    pub(crate) profile: String,
    /// Catalog JSON file (defaults to APP_CATALOG_PATH or the bundled seed catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Today's energy reading (1-10)
    #[arg(long)]
    pub(crate) energy: Option<u8>,
    /// Today's mood reading (1-10)
    #[arg(long)]
    pub(crate) mood: Option<u8>,
    /// Today's appetite reading (1-10)
    #[arg(long)]
    pub(crate) appetite: Option<u8>,
    /// Maximum number of results to print
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct CafesArgs {
    /// Profile as inline JSON or a path to a JSON file
    #[arg(long)]
    pub(crate) profile: String,
    /// Catalog JSON file (defaults to APP_CATALOG_PATH or the bundled seed catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ComposeArgs {
    /// Profile as inline JSON or a path to a JSON file
    #[arg(long)]
    pub(crate) profile: String,
    /// Inventory CSV file (defaults to APP_INVENTORY_PATH or the bundled seed inventory)
    #[arg(long)]
    pub(crate) inventory: Option<PathBuf>,
    /// Number of distinct recipes to compose
    #[arg(long, default_value_t = 3)]
    pub(crate) count: usize,
    /// Seed for reproducible fruit choices
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Maximum ingredient cost per recipe
    #[arg(long)]
    pub(crate) cost_ceiling: Option<f32>,
    /// Target recipe weight in grams
    #[arg(long)]
    pub(crate) target_weight: Option<f32>,
}

fn cli_user() -> UserId {
    UserId("cli".to_string())
}

fn env_settings() -> Result<RecommendationSettings, AppError> {
    Ok(AppConfig::load()?.recommendations)
}

/// Builds a service and stores the profile under a throwaway CLI user.
fn service_for(
    settings: &RecommendationSettings,
    profile: Profile,
) -> Result<AppService, AppError> {
    let service = build_service(settings)?;
    service.save_profile(cli_user(), profile)?;
    Ok(service)
}

fn checkin_context(energy: Option<u8>, mood: Option<u8>, appetite: Option<u8>) -> ScoringContext {
    if energy.is_none() && mood.is_none() && appetite.is_none() {
        return ScoringContext::default();
    }
    let checkin = DailyCheckin::new(
        energy.unwrap_or(NEUTRAL_READING),
        mood.unwrap_or(NEUTRAL_READING),
        appetite.unwrap_or(NEUTRAL_READING),
    )
    .normalized();
    ScoringContext::with_checkin(checkin)
}

fn chooser(seed: Option<u64>) -> RandomChoice {
    match seed {
        Some(seed) => RandomChoice::seeded(seed),
        None => RandomChoice::from_entropy(),
    }
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let MatchArgs {
        profile,
        catalog,
        energy,
        mood,
        appetite,
        limit,
    } = args;

    let mut settings = env_settings()?;
    if catalog.is_some() {
        settings.catalog_path = catalog;
    }
    let service = service_for(&settings, read_profile(&profile)?)?;

    let options = RecommendationOptions {
        context: checkin_context(energy, mood, appetite),
        limit,
        generated: 0,
    };
    let results = service.recommend(&cli_user(), options, &mut chooser(None))?;
    render_matches(&results, true);
    Ok(())
}

pub(crate) fn run_cafes(args: CafesArgs) -> Result<(), AppError> {
    let mut settings = env_settings()?;
    if args.catalog.is_some() {
        settings.catalog_path = args.catalog;
    }
    let service = service_for(&settings, read_profile(&args.profile)?)?;

    let rankings = service.recommend_cafes(&cli_user(), &ScoringContext::default())?;
    render_rankings(&rankings);
    Ok(())
}

pub(crate) fn run_compose(args: ComposeArgs) -> Result<(), AppError> {
    let ComposeArgs {
        profile,
        inventory,
        count,
        seed,
        cost_ceiling,
        target_weight,
    } = args;

    let mut settings = env_settings()?;
    if inventory.is_some() {
        settings.inventory_path = inventory;
    }
    if cost_ceiling.is_some() {
        settings.cost_ceiling = cost_ceiling;
    }
    if target_weight.is_some() {
        settings.target_weight_grams = target_weight;
    }
    let service = service_for(&settings, read_profile(&profile)?)?;

    let recipes = service.generate_recipes(
        &cli_user(),
        count,
        &ScoringContext::default(),
        &mut chooser(seed),
    )?;
    if recipes.is_empty() {
        println!("No profitable recipe could be composed from this inventory.");
    }
    render_recipes(&recipes);
    Ok(())
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let settings = RecommendationSettings::default();
    let profile = demo_profile();
    let service = service_for(&settings, profile.clone())?;
    let user = cli_user();

    println!("Smoothie match demo");
    println!(
        "Profile: goals [{}], restrictions [{}], activity {}",
        profile
            .health_goals
            .iter()
            .map(HealthGoal::tag)
            .collect::<Vec<_>>()
            .join(", "),
        profile
            .dietary_restrictions
            .iter()
            .map(DietaryRestriction::tag)
            .collect::<Vec<_>>()
            .join(", "),
        profile
            .activity_level
            .map(ActivityLevel::label)
            .unwrap_or("unspecified"),
    );

    let checkin = DailyCheckin::new(3, 6, 8);
    println!(
        "Check-in: energy {} | mood {} | appetite {}",
        checkin.energy, checkin.mood, checkin.appetite
    );

    println!("\nTop picks (catalog plus two house recipes)");
    let options = RecommendationOptions {
        context: ScoringContext::with_checkin(checkin),
        limit: Some(4),
        generated: 2,
    };
    let mut rng = RandomChoice::seeded(7);
    let results = service.recommend(&user, options, &mut rng)?;
    render_matches(&results, false);
    if let Some(best) = results.first() {
        println!("\nWhy {} fits", best.candidate_name);
        for line in best.profile_alignment.render().lines() {
            println!("  {line}");
        }
    }

    println!("\nCafés by average menu fit");
    let rankings = service.recommend_cafes(&user, &ScoringContext::default())?;
    render_rankings(&rankings);

    println!("\nHouse recipes");
    let recipes = service.generate_recipes(&user, 2, &ScoringContext::default(), &mut rng)?;
    render_recipes(&recipes);

    Ok(())
}

fn demo_profile() -> Profile {
    Profile::default()
        .with_goal(HealthGoal::Energy)
        .with_goal(HealthGoal::MuscleGain)
        .with_restriction(DietaryRestriction::NutFree)
        .with_flavor("tropical")
        .with_activity(ActivityLevel::Active)
}

fn render_matches(results: &[MatchResult], detailed: bool) {
    if results.is_empty() {
        println!("- no candidates to rank");
        return;
    }
    for (index, result) in results.iter().enumerate() {
        println!("{}. {}", index + 1, result.summary());
        for reason in &result.match_reasons {
            println!("     + {reason}");
        }
        for concern in &result.concerns {
            println!("     ! {concern}");
        }
        for benefit in &result.benefits_for_today {
            println!("     * {benefit}");
        }
        if detailed {
            for component in &result.components {
                println!(
                    "       {:?} {:+} ({})",
                    component.factor, component.points, component.notes
                );
            }
        }
    }
}

fn render_rankings(rankings: &[ProviderRanking]) {
    if rankings.is_empty() {
        println!("- no cafés in the catalog");
        return;
    }
    for ranking in rankings {
        println!(
            "- {}: average {:.1} across {} items",
            ranking.provider, ranking.average_score, ranking.candidate_count
        );
        for result in &ranking.top_matches {
            println!("    {} ({}/100)", result.candidate_name, result.score);
        }
    }
}

fn render_recipes(recipes: &[GeneratedRecipe]) {
    for generated in recipes {
        let recipe = &generated.recipe;
        let tier = recipe
            .candidate
            .tier
            .map(|tier| tier.label())
            .unwrap_or("Untiered");
        println!(
            "- {} [{}] scores {}/100 | cost {:.2} of {:.2} | margin {:.2} ({:.0}%)",
            recipe.candidate.name,
            tier,
            generated.result.score,
            recipe.total_cost,
            recipe.cost_ceiling,
            recipe.margin,
            recipe.margin_percent
        );
        for fill in &recipe.slots {
            println!(
                "    {:<16} {:>6.1} g  {}",
                slot_label(fill.slot),
                fill.grams,
                fill.ingredient
            );
        }
        if recipe.unused_grams > 0.0 {
            println!("    {:<16} {:>6.1} g", "unassigned", recipe.unused_grams);
        }
        for line in &recipe.rationale {
            println!("    - {line}");
        }
    }
}

fn slot_label(slot: SlotKind) -> &'static str {
    match slot {
        SlotKind::Liquid => "liquid",
        SlotKind::PrimaryFruit => "primary fruit",
        SlotKind::Protein => "protein",
        SlotKind::Vegetable => "vegetable",
        SlotKind::Supplement => "supplement",
        SlotKind::SecondaryFruit => "secondary fruit",
    }
}

