use std::collections::HashSet;

use regex::Regex;
use tracing::info;

use crate::recipe_model::{AdaptedIngredient, AdaptedRecipeData, Recipe};
use crate::substitutions::{apply_fodmap_heuristics, find_substitution, wants_low_fodmap};

const ADAPTATION_DISCLAIMER: &str = "**Note:** This recipe was adapted using a rule-based \
substitution engine with FODMAP-aware substitutions. Always check ingredient labels and \
portion sizes to ensure they meet your dietary requirements.";

/// Deterministic, offline adaptation of a recipe to the selected diets and
/// allergies. This is both the primary engine when no AI service is
/// reachable and the mandatory fallback when the AI call fails: a
/// proposal must always be constructible with zero connectivity.
///
/// Restrictions are consulted diets-first; the first one that yields a
/// non-identity catalog substitution wins for that ingredient and later
/// restrictions are skipped. When low-FODMAP was requested and the catalog
/// produced nothing, the heuristic pass gets a second look.
pub fn adapt_recipe_with_database(
    recipe: &Recipe,
    diets: &[String],
    allergies: &[String],
) -> AdaptedRecipeData {
    info!(recipe = %recipe.title, "adapting with rule-based substitution database");

    let all_restrictions: Vec<String> = diets.iter().chain(allergies.iter()).cloned().collect();
    let fodmap_requested = wants_low_fodmap(&all_restrictions);
    let mut substitution_notes: Vec<String> = Vec::new();
    let mut substituted: HashSet<String> = HashSet::new();

    let adapted_ingredients: Vec<AdaptedIngredient> = recipe
        .ingredients
        .iter()
        .map(|ingredient| {
            let mut adapted_name = ingredient.name.clone();

            for restriction in &all_restrictions {
                if let Some(substitution) = find_substitution(&ingredient.name, restriction) {
                    if substitution != ingredient.name {
                        substitution_notes.push(format!(
                            "{} → {} (for {})",
                            ingredient.name, substitution, restriction
                        ));
                        adapted_name = substitution.to_string();
                        substituted.insert(ingredient.name.to_lowercase());
                        break;
                    }
                }
            }

            if fodmap_requested && !substituted.contains(&ingredient.name.to_lowercase()) {
                if let Some(heuristic) = apply_fodmap_heuristics(&ingredient.name) {
                    substitution_notes.push(format!(
                        "{} → {} (for Low FODMAP)",
                        ingredient.name, heuristic
                    ));
                    adapted_name = heuristic.to_string();
                    substituted.insert(ingredient.name.to_lowercase());
                }
            }

            AdaptedIngredient {
                amount: ingredient.amount.clone(),
                unit: ingredient.unit.clone(),
                name: adapted_name,
            }
        })
        .collect();

    let diet_label = if diets.is_empty() {
        allergies.join(" & ")
    } else {
        diets.join(" & ")
    };
    let title = format!("{} ({} Adapted)", recipe.title, diet_label);

    let adapted_instructions = rewrite_instructions(&recipe.instructions, diets);

    let mut notes = recipe.notes.clone().unwrap_or_default();
    if !substitution_notes.is_empty() {
        if !notes.is_empty() {
            notes.push_str("\n\n");
        }
        notes.push_str("**Substitutions Made:**\n");
        let bullets: Vec<String> = substitution_notes
            .iter()
            .map(|n| format!("• {}", n))
            .collect();
        notes.push_str(&bullets.join("\n"));
    }
    notes.push_str("\n\n");
    notes.push_str(ADAPTATION_DISCLAIMER);

    AdaptedRecipeData {
        title,
        description: recipe.description.clone(),
        ingredients: adapted_ingredients,
        instructions: adapted_instructions,
        notes: Some(notes),
    }
}

/// Diet-keyed global text replacements on instruction steps.
///
/// The keto/low-carb rewrite keeps the matched "serve with" casing and only
/// swaps the food word. The gluten-free rewrite is a blind case-insensitive
/// replacement of "flour"/"bread" anywhere in the text, including inside
/// unrelated words. Known limitation, kept on purpose.
fn rewrite_instructions(instructions: &[String], diets: &[String]) -> Vec<String> {
    let mut rewritten: Vec<String> = instructions.to_vec();

    if diets.iter().any(|d| d == "Keto" || d == "Low-carb") {
        let rice = Regex::new(r"(?i)(serve with) rice").expect("static pattern");
        let pasta = Regex::new(r"(?i)(serve with) pasta").expect("static pattern");
        rewritten = rewritten
            .iter()
            .map(|inst| {
                let step = rice.replace_all(inst, "$1 cauliflower rice");
                pasta.replace_all(&step, "$1 zucchini noodles").into_owned()
            })
            .collect();
    }

    if diets.iter().any(|d| d == "Gluten-free") {
        let flour = Regex::new(r"(?i)flour").expect("static pattern");
        let bread = Regex::new(r"(?i)bread").expect("static pattern");
        rewritten = rewritten
            .iter()
            .map(|inst| {
                let step = flour.replace_all(inst, "gluten-free flour");
                bread.replace_all(&step, "gluten-free bread").into_owned()
            })
            .collect();
    }

    rewritten
}

/// One-line summary for the review screen toast.
pub fn adaptation_summary(substitutions_made: usize) -> String {
    if substitutions_made == 0 {
        return "No substitutions were needed for this recipe!".to_string();
    }
    format!(
        "Made {} substitution{} to adapt this recipe.",
        substitutions_made,
        if substitutions_made > 1 { "s" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_model::Ingredient;

    fn ingredient(id: &str, name: &str, amount: &str, unit: Option<&str>) -> Ingredient {
        Ingredient {
            id: id.to_string(),
            name: name.to_string(),
            amount: amount.to_string(),
            unit: unit.map(str::to_string),
            category: None,
            is_optional: None,
        }
    }

    fn recipe(ingredients: Vec<Ingredient>, instructions: Vec<&str>) -> Recipe {
        Recipe {
            id: "r1".to_string(),
            title: "Test Dish".to_string(),
            description: None,
            prep_time: None,
            cook_time: None,
            servings: Some(2),
            ingredients,
            instructions: instructions.iter().map(|s| s.to_string()).collect(),
            categories: vec![],
            tags: vec![],
            notes: None,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
            is_favorite: false,
        }
    }

    #[test]
    fn test_garlic_under_low_fodmap() {
        let r = recipe(vec![ingredient("i1", "garlic clove", "2", None)], vec![]);
        let adapted = adapt_recipe_with_database(&r, &["Low FODMAP".to_string()], &[]);
        assert_eq!(adapted.ingredients[0].name, "garlic-infused oil");
        let notes = adapted.notes.unwrap();
        assert!(notes.contains("garlic clove → garlic-infused oil (for Low FODMAP)"));
        assert!(notes.contains("**Substitutions Made:**"));
    }

    #[test]
    fn test_vegan_butter() {
        let r = recipe(vec![ingredient("i1", "butter", "100", Some("g"))], vec![]);
        let adapted = adapt_recipe_with_database(&r, &["Vegan".to_string()], &[]);
        assert_eq!(adapted.ingredients[0].name, "vegan butter or coconut oil");
        assert_eq!(adapted.ingredients[0].amount, "100");
        assert_eq!(adapted.ingredients[0].unit.as_deref(), Some("g"));
    }

    #[test]
    fn test_keto_instruction_rewrite_preserves_case() {
        let r = recipe(vec![], vec!["Serve with rice and vegetables."]);
        let adapted = adapt_recipe_with_database(&r, &["Keto".to_string()], &[]);
        assert_eq!(
            adapted.instructions[0],
            "Serve with cauliflower rice and vegetables."
        );
    }

    #[test]
    fn test_low_carb_pasta_rewrite() {
        let r = recipe(vec![], vec!["serve with pasta on the side"]);
        let adapted = adapt_recipe_with_database(&r, &["Low-carb".to_string()], &[]);
        assert_eq!(
            adapted.instructions[0],
            "serve with zucchini noodles on the side"
        );
    }

    #[test]
    fn test_gluten_free_rewrite_is_blind() {
        let r = recipe(vec![], vec!["Dust with flour before baking the bread."]);
        let adapted = adapt_recipe_with_database(&r, &["Gluten-free".to_string()], &[]);
        assert_eq!(
            adapted.instructions[0],
            "Dust with gluten-free flour before baking the gluten-free bread."
        );
    }

    #[test]
    fn test_no_restrictions_is_identity_plus_disclaimer() {
        let r = recipe(
            vec![
                ingredient("i1", "garlic clove", "2", None),
                ingredient("i2", "butter", "100", Some("g")),
            ],
            vec!["Serve with rice."],
        );
        let adapted = adapt_recipe_with_database(&r, &[], &[]);
        assert_eq!(adapted.ingredients[0].name, "garlic clove");
        assert_eq!(adapted.ingredients[1].name, "butter");
        assert_eq!(adapted.instructions[0], "Serve with rice.");
        let notes = adapted.notes.unwrap();
        assert!(!notes.contains("**Substitutions Made:**"));
        assert!(notes.contains("**Note:**"));
    }

    #[test]
    fn test_first_matching_restriction_wins() {
        // Vegan is listed before Low FODMAP, so milk becomes the vegan
        // replacement and the low-FODMAP catalog entry is never consulted.
        let r = recipe(vec![ingredient("i1", "milk", "1", Some("cup"))], vec![]);
        let adapted = adapt_recipe_with_database(
            &r,
            &["Vegan".to_string(), "Low FODMAP".to_string()],
            &[],
        );
        assert_eq!(adapted.ingredients[0].name, "almond milk or oat milk");
        let notes = adapted.notes.unwrap();
        assert!(notes.contains("milk → almond milk or oat milk (for Vegan)"));
    }

    #[test]
    fn test_heuristic_fallback_when_catalog_has_no_entry() {
        // The flour rule has no low-FODMAP value; the heuristic pass
        // catches "wheat flour" instead.
        let r = recipe(vec![ingredient("i1", "wheat flour", "200", Some("g"))], vec![]);
        let adapted = adapt_recipe_with_database(&r, &["Low FODMAP".to_string()], &[]);
        assert_eq!(adapted.ingredients[0].name, "gluten-free flour blend");
        let notes = adapted.notes.unwrap();
        assert!(notes.contains("wheat flour → gluten-free flour blend (for Low FODMAP)"));
    }

    #[test]
    fn test_title_label_prefers_diets_then_allergies() {
        let r = recipe(vec![], vec![]);
        let with_diets = adapt_recipe_with_database(
            &r,
            &["Keto".to_string(), "Gluten-free".to_string()],
            &["Nuts".to_string()],
        );
        assert_eq!(with_diets.title, "Test Dish (Keto & Gluten-free Adapted)");

        let allergies_only = adapt_recipe_with_database(&r, &[], &["Nuts".to_string()]);
        assert_eq!(allergies_only.title, "Test Dish (Nuts Adapted)");
    }

    #[test]
    fn test_existing_notes_are_appended_not_replaced() {
        let mut r = recipe(vec![ingredient("i1", "onion", "1", None)], vec![]);
        r.notes = Some("Family favourite.".to_string());
        let adapted = adapt_recipe_with_database(&r, &["Low FODMAP".to_string()], &[]);
        let notes = adapted.notes.unwrap();
        assert!(notes.starts_with("Family favourite."));
        assert!(notes.contains("**Substitutions Made:**"));
    }

    #[test]
    fn test_adaptation_summary_wording() {
        assert_eq!(
            adaptation_summary(0),
            "No substitutions were needed for this recipe!"
        );
        assert_eq!(
            adaptation_summary(1),
            "Made 1 substitution to adapt this recipe."
        );
        assert_eq!(
            adaptation_summary(3),
            "Made 3 substitutions to adapt this recipe."
        );
    }
}
