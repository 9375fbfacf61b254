use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::recipe_model::{AdaptedRecipeData, Ingredient, Recipe};

/// Per-ingredient review record. Mutated in place by the review
/// operations; discarded with the proposal.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IngredientChoice {
    pub original_name: String,
    pub adapted_name: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub options: Vec<String>,
    pub accepted: bool,
}

/// The pending adaptation under review: the untouched original, the
/// adapted data, the restrictions that produced it, and one choice per
/// adapted ingredient (index-aligned with `adapted.ingredients`).
#[derive(Debug, Clone)]
pub struct AdaptationProposal {
    pub original: Recipe,
    pub adapted: AdaptedRecipeData,
    pub diets: Vec<String>,
    pub allergies: Vec<String>,
    pub choices: Vec<IngredientChoice>,
}

/// Owns the single pending proposal for a review screen's lifetime.
/// Setting a new proposal while one is pending silently replaces it;
/// there is no merging. All mutation happens through the methods below so
/// the choices/ingredients alignment invariant cannot be broken from
/// outside.
#[derive(Debug, Default)]
pub struct AdaptationSession {
    proposal: Option<AdaptationProposal>,
}

impl AdaptationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proposal(&self) -> Option<&AdaptationProposal> {
        self.proposal.as_ref()
    }

    /// Builds the default choice list and installs the proposal.
    pub fn set_proposal(
        &mut self,
        original: Recipe,
        adapted: AdaptedRecipeData,
        diets: Vec<String>,
        allergies: Vec<String>,
    ) {
        let choices = build_default_choices(&original, &adapted, &diets);
        self.proposal = Some(AdaptationProposal {
            original,
            adapted,
            diets,
            allergies,
            choices,
        });
    }

    /// Discards the pending proposal. Confirmation prompts are the
    /// caller's job.
    pub fn clear(&mut self) {
        self.proposal = None;
    }

    /// Overrides one choice. `next_name` is free-form: the review UI may
    /// let the user type any value, not just a listed option.
    /// Out-of-range indices are ignored.
    pub fn update_choice(&mut self, index: usize, next_name: &str, accepted: bool) {
        if let Some(proposal) = self.proposal.as_mut() {
            if let Some(choice) = proposal.choices.get_mut(index) {
                choice.adapted_name = next_name.to_string();
                choice.accepted = accepted;
            }
        }
    }

    /// Recomputes every accepted flag from the current adapted-vs-original
    /// name diff. Does not touch the names themselves.
    pub fn accept_all(&mut self) {
        if let Some(proposal) = self.proposal.as_mut() {
            for choice in &mut proposal.choices {
                choice.accepted = names_differ(&choice.adapted_name, &choice.original_name);
            }
        }
    }

    /// Full revert: every adapted name back to its original, nothing
    /// accepted.
    pub fn reset_all(&mut self) {
        if let Some(proposal) = self.proposal.as_mut() {
            for choice in &mut proposal.choices {
                choice.adapted_name = choice.original_name.clone();
                choice.accepted = false;
            }
        }
    }
}

fn names_differ(adapted: &str, original: &str) -> bool {
    adapted.trim().to_lowercase() != original.trim().to_lowercase()
}

/// Builds one choice per adapted ingredient. The original name at the same
/// index serves as the diff base; when the original has fewer ingredients
/// the adapted name doubles as its own base (misalignment is tolerated,
/// not reconciled). Keyword triggers on the original name seed the
/// candidate option list; the proposed name is always the first option and
/// duplicates are dropped.
fn build_default_choices(
    original: &Recipe,
    adapted: &AdaptedRecipeData,
    diets: &[String],
) -> Vec<IngredientChoice> {
    let keto_or_low_carb = Regex::new(r"(?i)keto|low[- ]carb").expect("static pattern");
    let wants_keto_bread = diets.iter().any(|d| keto_or_low_carb.is_match(d));

    adapted
        .ingredients
        .iter()
        .enumerate()
        .map(|(idx, ing)| {
            let original_name = original
                .ingredients
                .get(idx)
                .map(|orig| orig.name.clone())
                .unwrap_or_else(|| ing.name.clone());
            let adapted_name = ing.name.clone();

            let mut candidates: Vec<&str> = Vec::new();
            let lower = original_name.to_lowercase();
            if lower.contains("garlic") {
                candidates.extend(["garlic-infused oil", "garlic chives"]);
            }
            if lower.contains("onion") {
                candidates.extend(["green onion tops", "chives", "asafoetida (pinch)"]);
            }
            if lower.contains("bread") {
                candidates.extend(["gluten-free bread", "sourdough spelt (small serve)"]);
                if wants_keto_bread {
                    candidates.extend(["almond flour bread", "cloud bread"]);
                } else {
                    candidates.push("almond flour bread");
                }
            }
            if lower.contains("pasta") {
                candidates.extend(["gluten-free pasta", "rice noodles", "zucchini noodles"]);
            }
            if lower.contains("milk") {
                candidates.extend(["lactose-free milk", "almond milk"]);
            }
            if lower.contains("cream") {
                candidates.extend(["lactose-free cream", "coconut cream"]);
            }
            if lower.contains("yogurt") {
                candidates.extend(["lactose-free yogurt", "coconut yogurt"]);
            }
            if lower.contains("flour") && !lower.contains("almond") {
                candidates.extend(["gluten-free flour blend", "rice flour", "almond flour"]);
            }

            let mut options: Vec<String> = vec![adapted_name.clone()];
            for candidate in candidates {
                if !options.iter().any(|o| o == candidate) {
                    options.push(candidate.to_string());
                }
            }

            let accepted = names_differ(&adapted_name, &original_name);

            IngredientChoice {
                original_name,
                adapted_name,
                amount: ing.amount.clone(),
                unit: ing.unit.clone(),
                options,
                accepted,
            }
        })
        .collect()
}

/// Materializes the reviewed proposal as a new recipe, ready for the
/// store. Accepted choices contribute their adapted name; rejected ones
/// fall back to the original ingredient at the same index (or the adapted
/// name when no such original exists). Ids and timestamps derive from the
/// injected clock so commits are reproducible under test.
pub fn build_committed_recipe(proposal: &AdaptationProposal, now: DateTime<Utc>) -> Recipe {
    let millis = now.timestamp_millis();
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let label = if proposal.diets.is_empty() {
        proposal.allergies.join(" & ")
    } else {
        proposal.diets.join(" & ")
    };

    let ingredients: Vec<Ingredient> = proposal
        .adapted
        .ingredients
        .iter()
        .enumerate()
        .map(|(idx, ing)| {
            let name = match proposal.choices.get(idx) {
                Some(choice) if choice.accepted => choice.adapted_name.clone(),
                _ => proposal
                    .original
                    .ingredients
                    .get(idx)
                    .map(|orig| orig.name.clone())
                    .unwrap_or_else(|| ing.name.clone()),
            };
            Ingredient {
                id: format!("ing-{}-{}", millis, idx),
                name,
                amount: ing.amount.clone(),
                unit: ing.unit.clone(),
                category: None,
                is_optional: None,
            }
        })
        .collect();

    let mut tags = proposal.original.tags.clone();
    tags.extend(proposal.diets.iter().map(|d| d.to_lowercase()));
    tags.push("adapted".to_string());

    Recipe {
        id: format!("{}-adapted-{}", proposal.original.id, millis),
        title: format!("{} ({} Adapted)", proposal.original.title, label),
        description: proposal.original.description.clone(),
        prep_time: proposal.original.prep_time,
        cook_time: proposal.original.cook_time,
        servings: proposal.original.servings,
        ingredients,
        instructions: proposal.adapted.instructions.clone(),
        categories: proposal.original.categories.clone(),
        tags,
        notes: proposal.adapted.notes.clone(),
        created_at: stamp.clone(),
        updated_at: stamp,
        is_favorite: proposal.original.is_favorite,
    }
}
