//! Recipe composition: slot filling over a filtered ingredient inventory.
//!
//! Slots are claimed in fixed priority order, each taking a share of the weight that is
//! still unassigned. A slot with no eligible ingredient is skipped and its weight stays in
//! the pool for later slots. Composition never fails; infeasibility is reported through
//! `is_profitable`, `unfilled_slots` and `unused_grams`.

mod config;
mod inventory;
mod naming;
mod selection;

pub use config::{
    ComposerConfig, ComposerConfigError, GoalProperty, RationaleThresholds, SlotShares,
    TierThresholds, VegetableThresholds,
};
pub use inventory::{load_inventory, parse_inventory, Ingredient, IngredientCategory, InventoryError};
pub use selection::{ChoiceStrategy, FirstChoice, RandomChoice};

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    Candidate, DietaryRestriction, HealthGoal, Nutrient, NutritionalInfo, Profile, RecipeTier,
};
use super::keywords::KeywordMatcher;
use super::scoring::ScoringConfig;

/// Position an ingredient occupies in a composed recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Liquid,
    PrimaryFruit,
    Protein,
    Vegetable,
    Supplement,
    SecondaryFruit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotFill {
    pub slot: SlotKind,
    pub ingredient: String,
    pub grams: f32,
    pub cost: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<HealthGoal>,
}

/// A synthesized candidate plus the costing facts behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedRecipe {
    pub candidate: Candidate,
    pub slots: Vec<SlotFill>,
    pub target_weight_grams: f32,
    pub unused_grams: f32,
    pub unfilled_slots: Vec<SlotKind>,
    pub total_cost: f32,
    pub cost_ceiling: f32,
    pub is_profitable: bool,
    pub margin: f32,
    pub margin_percent: f32,
    pub rationale: Vec<String>,
}

impl ComposedRecipe {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Builds candidates from an ingredient inventory under restriction and cost constraints.
#[derive(Debug, Clone, Default)]
pub struct RecipeComposer {
    config: ComposerConfig,
    scoring: ScoringConfig,
}

impl RecipeComposer {
    /// The scoring configuration supplies restriction, allergen and goal keyword tables so
    /// composition excludes exactly what scoring would penalise.
    pub fn new(config: ComposerConfig, scoring: ScoringConfig) -> Self {
        Self { config, scoring }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn compose_with_defaults(
        &self,
        inventory: &[Ingredient],
        profile: &Profile,
        chooser: &mut dyn ChoiceStrategy,
    ) -> ComposedRecipe {
        self.compose(
            inventory,
            profile,
            self.config.target_weight_grams,
            self.config.cost_ceiling,
            chooser,
        )
    }

    pub fn compose(
        &self,
        inventory: &[Ingredient],
        profile: &Profile,
        target_weight_grams: f32,
        cost_ceiling: f32,
        chooser: &mut dyn ChoiceStrategy,
    ) -> ComposedRecipe {
        let target = if target_weight_grams.is_finite() && target_weight_grams > 0.0 {
            target_weight_grams
        } else {
            0.0
        };
        let eligible = self.eligible(inventory, profile);
        let shares = self.config.shares;
        let mut plan = SlotPlan::new(target);

        let liquid = self.pick_liquid(&eligible);
        plan.fill(SlotKind::Liquid, liquid, target * shares.liquid, None);

        let primary = self.pick_fruit(&eligible, &plan, chooser);
        plan.fill(
            SlotKind::PrimaryFruit,
            primary,
            plan.remaining * shares.primary_fruit,
            None,
        );

        let protein = pick_protein(&eligible, &plan);
        plan.fill(
            SlotKind::Protein,
            protein,
            plan.remaining * shares.protein,
            None,
        );

        let vegetable = self.pick_vegetable(&eligible, &plan);
        plan.fill(
            SlotKind::Vegetable,
            vegetable,
            plan.remaining * shares.vegetable,
            None,
        );

        for goal in &profile.health_goals {
            if plan.remaining < self.config.supplement_floor_grams {
                break;
            }
            let supplement = self.pick_supplement(&eligible, &plan, goal);
            plan.fill(
                SlotKind::Supplement,
                supplement,
                plan.remaining * shares.supplement,
                Some(goal.clone()),
            );
        }

        if plan.remaining > 0.0 {
            let secondary = self.pick_fruit(&eligible, &plan, chooser);
            plan.fill(SlotKind::SecondaryFruit, secondary, plan.remaining, None);
        }

        self.finish(plan, profile, target, cost_ceiling)
    }

    /// Inventory entries compatible with every restriction and allergen in the profile.
    pub fn eligible<'a>(&self, inventory: &'a [Ingredient], profile: &Profile) -> Vec<&'a Ingredient> {
        let mut exclusions: Vec<KeywordMatcher> = Vec::new();
        let mut low_sugar = false;
        for restriction in &profile.dietary_restrictions {
            if *restriction == DietaryRestriction::LowSugar {
                low_sugar = true;
            } else if let Some(rule) = self.scoring.restriction_rule(restriction) {
                exclusions.push(rule.matcher);
            }
        }
        exclusions.extend(
            profile
                .allergens
                .iter()
                .map(|allergen| self.scoring.allergens.matcher_for(allergen)),
        );

        inventory
            .iter()
            .filter(|ingredient| {
                ingredient.cost_per_100g.is_finite() && ingredient.cost_per_100g >= 0.0
            })
            .filter(|ingredient| {
                let lower = ingredient.name.trim().to_lowercase();
                !lower.is_empty() && !exclusions.iter().any(|matcher| matcher.matches(&lower))
            })
            .filter(|ingredient| {
                !low_sugar
                    || ingredient
                        .per_100g
                        .get(Nutrient::Sugar)
                        .map_or(true, |sugar| sugar <= self.config.low_sugar_max_per_100g)
            })
            .collect()
    }

    fn pick_liquid<'a>(&self, eligible: &[&'a Ingredient]) -> Option<&'a Ingredient> {
        let liquids = cheapest_first(eligible, IngredientCategory::Liquid, &[]);
        let preferred = self.config.preferred_liquid.trim();
        liquids
            .iter()
            .find(|ingredient| ingredient.name.trim().eq_ignore_ascii_case(preferred))
            .or_else(|| liquids.first())
            .copied()
    }

    fn pick_fruit<'a>(
        &self,
        eligible: &[&'a Ingredient],
        plan: &SlotPlan<'a>,
        chooser: &mut dyn ChoiceStrategy,
    ) -> Option<&'a Ingredient> {
        let mut fruits = cheapest_first(eligible, IngredientCategory::Fruit, &plan.used());
        if fruits.is_empty() {
            return None;
        }
        fruits.truncate(self.config.fruit_choices.max(1));
        let index = chooser.choose(fruits.len()).min(fruits.len() - 1);
        Some(fruits[index])
    }

    fn pick_vegetable<'a>(
        &self,
        eligible: &[&'a Ingredient],
        plan: &SlotPlan<'a>,
    ) -> Option<&'a Ingredient> {
        let thresholds = &self.config.vegetable;
        let density = |ingredient: &Ingredient| {
            let per_100g = &ingredient.per_100g;
            [
                (Nutrient::Iron, thresholds.iron_mg),
                (Nutrient::VitaminC, thresholds.vitamin_c_mg),
                (Nutrient::Calcium, thresholds.calcium_mg),
            ]
            .into_iter()
            .filter(|(nutrient, threshold)| {
                per_100g.get(*nutrient).is_some_and(|value| value > *threshold)
            })
            .count()
        };

        let mut vegetables: Vec<(usize, &'a Ingredient)> =
            cheapest_first(eligible, IngredientCategory::Vegetable, &plan.used())
                .into_iter()
                .map(|ingredient| (density(ingredient), ingredient))
                .filter(|(crossed, _)| *crossed > 0)
                .collect();
        vegetables.sort_by(|a, b| b.0.cmp(&a.0));
        vegetables.first().map(|(_, ingredient)| *ingredient)
    }

    fn pick_supplement<'a>(
        &self,
        eligible: &[&'a Ingredient],
        plan: &SlotPlan<'a>,
        goal: &HealthGoal,
    ) -> Option<&'a Ingredient> {
        let properties = self.config.properties_for(goal);
        let keywords = self.scoring.goal_keywords.get(goal).map(|rule| &rule.matcher);

        let mut ranked: Vec<(bool, f32, &'a Ingredient)> =
            cheapest_first(eligible, IngredientCategory::Supplement, &plan.used())
                .into_iter()
                .map(|ingredient| {
                    let lower = ingredient.name.to_lowercase();
                    let keyword_hit = keywords.is_some_and(|matcher| matcher.matches(&lower));
                    let weight: f32 = properties
                        .iter()
                        .filter_map(|property| {
                            ingredient
                                .per_100g
                                .get(property.nutrient)
                                .map(|value| value * property.factor)
                        })
                        .sum();
                    (keyword_hit, weight, ingredient)
                })
                .filter(|(keyword_hit, weight, _)| *keyword_hit || *weight > 0.0)
                .collect();

        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.total_cmp(&a.1)));
        ranked.first().map(|(_, _, ingredient)| *ingredient)
    }

    fn finish(
        &self,
        plan: SlotPlan<'_>,
        profile: &Profile,
        target: f32,
        cost_ceiling: f32,
    ) -> ComposedRecipe {
        let nutrition = NutritionalInfo::weighted_sum(
            plan.fills
                .iter()
                .map(|fill| (fill.grams, &fill.ingredient.per_100g)),
        );
        let raw_cost: f32 = plan
            .fills
            .iter()
            .map(|fill| fill.ingredient.cost_for(fill.grams))
            .sum();
        // Profitability is judged on the unrounded cost; cents are for reporting only.
        let is_profitable =
            !plan.fills.is_empty() && cost_ceiling > 0.0 && raw_cost <= cost_ceiling;
        let total_cost = round_cents(raw_cost);

        let selling_price = self.config.selling_price;
        let margin = round_cents(selling_price - total_cost);
        let margin_percent = if selling_price > 0.0 {
            ((margin / selling_price) * 1000.0).round() / 10.0
        } else {
            0.0
        };

        let tiers = &self.config.tiers;
        let tier = if total_cost <= tiers.essential_max_cost {
            RecipeTier::Essential
        } else if total_cost <= tiers.enhanced_max_cost {
            RecipeTier::Enhanced
        } else {
            RecipeTier::Premium
        };

        let filled = |kind: SlotKind| plan.fills.iter().find(|fill| fill.slot == kind);
        let name = naming::display_name(
            filled(SlotKind::PrimaryFruit).map(|fill| fill.ingredient.name.as_str()),
            filled(SlotKind::Vegetable).is_some(),
            filled(SlotKind::Protein).is_some(),
            profile,
        );
        let rationale = naming::rationale(&nutrition, &self.config.rationale);

        let ingredient_names: Vec<String> = plan
            .fills
            .iter()
            .map(|fill| fill.ingredient.name.trim().to_string())
            .collect();
        let id = format!("generated-{}", slugify(&ingredient_names.join(" ")));

        let mut candidate = Candidate::new(id, name, ingredient_names)
            .with_nutrition(nutrition)
            .with_price(selling_price);
        candidate.tier = Some(tier);

        let slots: Vec<SlotFill> = plan
            .fills
            .iter()
            .map(|fill| SlotFill {
                slot: fill.slot,
                ingredient: fill.ingredient.name.trim().to_string(),
                grams: fill.grams,
                cost: round_cents(fill.ingredient.cost_for(fill.grams)),
                goal: fill.goal.clone(),
            })
            .collect();

        debug!(
            recipe = %candidate.name,
            total_cost,
            cost_ceiling,
            is_profitable,
            unfilled = plan.unfilled.len(),
            "composed recipe"
        );

        ComposedRecipe {
            candidate,
            slots,
            target_weight_grams: target,
            unused_grams: round_grams(plan.remaining.max(0.0)),
            unfilled_slots: plan.unfilled,
            total_cost,
            cost_ceiling,
            is_profitable,
            margin,
            margin_percent,
            rationale,
        }
    }
}

struct PlannedFill<'a> {
    slot: SlotKind,
    ingredient: &'a Ingredient,
    grams: f32,
    goal: Option<HealthGoal>,
}

struct SlotPlan<'a> {
    remaining: f32,
    fills: Vec<PlannedFill<'a>>,
    unfilled: Vec<SlotKind>,
}

impl<'a> SlotPlan<'a> {
    fn new(target: f32) -> Self {
        Self {
            remaining: target,
            fills: Vec::new(),
            unfilled: Vec::new(),
        }
    }

    fn used(&self) -> Vec<&'a Ingredient> {
        self.fills.iter().map(|fill| fill.ingredient).collect()
    }

    fn fill(
        &mut self,
        slot: SlotKind,
        ingredient: Option<&'a Ingredient>,
        grams: f32,
        goal: Option<HealthGoal>,
    ) {
        let grams = round_grams(grams.min(self.remaining));
        match ingredient {
            Some(ingredient) if grams > 0.0 => {
                self.remaining = round_grams(self.remaining - grams);
                self.fills.push(PlannedFill {
                    slot,
                    ingredient,
                    grams,
                    goal,
                });
            }
            _ => {
                if !self.unfilled.contains(&slot) {
                    self.unfilled.push(slot);
                }
            }
        }
    }
}

/// Eligible ingredients of one category, cheapest first; equal costs keep inventory order.
fn cheapest_first<'a>(
    eligible: &[&'a Ingredient],
    category: IngredientCategory,
    used: &[&'a Ingredient],
) -> Vec<&'a Ingredient> {
    let mut matches: Vec<&'a Ingredient> = eligible
        .iter()
        .copied()
        .filter(|ingredient| ingredient.category == category)
        .filter(|ingredient| !used.iter().any(|taken| std::ptr::eq(*taken, *ingredient)))
        .collect();
    matches.sort_by(|a, b| {
        a.cost_per_100g
            .partial_cmp(&b.cost_per_100g)
            .unwrap_or(Ordering::Equal)
    });
    matches
}

fn pick_protein<'a>(eligible: &[&'a Ingredient], plan: &SlotPlan<'a>) -> Option<&'a Ingredient> {
    let mut proteins: Vec<&'a Ingredient> =
        cheapest_first(eligible, IngredientCategory::Protein, &plan.used())
            .into_iter()
            .filter(|ingredient| ingredient.muscle_recovery)
            .collect();
    proteins.sort_by(|a, b| {
        let a = a.per_100g.get(Nutrient::Protein).unwrap_or(0.0);
        let b = b.per_100g.get(Nutrient::Protein).unwrap_or(0.0);
        b.total_cmp(&a)
    });
    proteins.first().copied()
}

fn round_grams(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

fn round_cents(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Almond Milk  Mango / Kale"), "almond-milk-mango-kale");
        assert_eq!(slugify("  "), "");
    }

    #[test]
    fn plan_keeps_weight_of_unfilled_slots() {
        let mango = Ingredient::new("Mango", IngredientCategory::Fruit, 0.8);
        let mut plan = SlotPlan::new(100.0);

        plan.fill(SlotKind::Liquid, None, 40.0, None);
        plan.fill(SlotKind::PrimaryFruit, Some(&mango), 20.0, None);

        assert_eq!(plan.remaining, 80.0);
        assert_eq!(plan.unfilled, vec![SlotKind::Liquid]);
    }
}
