use tracing::{debug, info};

use crate::recipe_model::{AdaptedIngredient, AdaptedRecipeData};
use crate::substitutions::catalog::all_rules;
use crate::substitutions::fodmap::HEURISTIC_REPLACEMENTS;
use crate::substitutions::{apply_fodmap_heuristics, find_substitution, wants_low_fodmap};

/// Trust boundary between the AI collaborator and the app's low-FODMAP
/// guarantee. Callers must run every AI-sourced adaptation through this
/// pass before presenting it as low-FODMAP-safe; the AI does not reliably
/// honor the constraint even when asked.
///
/// Identity pass-through when no restriction mentions FODMAP. Otherwise
/// each adapted ingredient gets the catalog lookup across all restrictions
/// (first non-identity match wins) and, failing that, the heuristic pass.
/// A `**FODMAP Corrections:**` block is appended to the notes only when
/// something was corrected. Idempotent: names that are themselves known
/// replacement strings are left alone, so re-running the pass is a no-op.
pub fn enforce_low_fodmap_on_adapted(
    adapted: &AdaptedRecipeData,
    diets: &[String],
    allergies: &[String],
) -> AdaptedRecipeData {
    let all_restrictions: Vec<String> = diets.iter().chain(allergies.iter()).cloned().collect();
    if !wants_low_fodmap(&all_restrictions) {
        return adapted.clone();
    }

    let mut correction_notes: Vec<String> = Vec::new();

    let next_ingredients: Vec<AdaptedIngredient> = adapted
        .ingredients
        .iter()
        .map(|ing| {
            if is_known_low_fodmap_replacement(&ing.name) {
                debug!(name = %ing.name, "already a known replacement, skipping");
                return ing.clone();
            }

            let mut name = ing.name.clone();
            for restriction in &all_restrictions {
                if let Some(sub) = find_substitution(&name, restriction) {
                    if sub != name {
                        correction_notes.push(format!("{} → {} (for {})", name, sub, restriction));
                        name = sub.to_string();
                        break;
                    }
                }
            }
            if name == ing.name {
                if let Some(heuristic) = apply_fodmap_heuristics(&name) {
                    if heuristic != name {
                        correction_notes
                            .push(format!("{} → {} (for Low FODMAP)", name, heuristic));
                        name = heuristic.to_string();
                    }
                }
            }

            AdaptedIngredient {
                amount: ing.amount.clone(),
                unit: ing.unit.clone(),
                name,
            }
        })
        .collect();

    if !correction_notes.is_empty() {
        info!(
            corrections = correction_notes.len(),
            "applied FODMAP corrections to adapted recipe"
        );
    }

    let notes = if correction_notes.is_empty() {
        adapted.notes.clone()
    } else {
        let mut notes = adapted.notes.clone().unwrap_or_default();
        if !notes.is_empty() {
            notes.push_str("\n\n");
        }
        notes.push_str("**FODMAP Corrections:**\n");
        let bullets: Vec<String> = correction_notes.iter().map(|n| format!("• {}", n)).collect();
        notes.push_str(&bullets.join("\n"));
        Some(notes)
    };

    AdaptedRecipeData {
        title: adapted.title.clone(),
        description: adapted.description.clone(),
        ingredients: next_ingredients,
        instructions: adapted.instructions.clone(),
        notes,
    }
}

/// A name that is already one of the catalog's low-FODMAP values or one of
/// the heuristic replacements is safe by construction. Correcting it again
/// would oscillate (the loose matcher re-matches fragments inside the
/// replacement text, e.g. "milk" inside "lactose-free milk or almond
/// milk") or mangle replacements that mention avoided words ("... without
/// onion/garlic").
fn is_known_low_fodmap_replacement(name: &str) -> bool {
    let normalized = name.trim().to_lowercase();
    all_rules()
        .filter_map(|rule| rule.low_fodmap)
        .any(|value| value.to_lowercase() == normalized)
        || HEURISTIC_REPLACEMENTS
            .iter()
            .any(|value| value.to_lowercase() == normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapted(names: &[&str]) -> AdaptedRecipeData {
        AdaptedRecipeData {
            title: "Adapted Dish".to_string(),
            description: None,
            ingredients: names
                .iter()
                .map(|n| AdaptedIngredient {
                    amount: "1".to_string(),
                    unit: None,
                    name: n.to_string(),
                })
                .collect(),
            instructions: vec!["Cook.".to_string()],
            notes: None,
        }
    }

    fn names(data: &AdaptedRecipeData) -> Vec<String> {
        data.ingredients.iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn test_no_op_without_fodmap_restriction() {
        let input = adapted(&["garlic", "onion", "milk"]);
        let diets = vec!["Vegan".to_string()];
        let out = enforce_low_fodmap_on_adapted(&input, &diets, &[]);
        assert_eq!(out, input);
    }

    #[test]
    fn test_corrects_ai_output_that_kept_garlic() {
        let input = adapted(&["garlic", "chicken breast"]);
        let diets = vec!["Low FODMAP".to_string()];
        let out = enforce_low_fodmap_on_adapted(&input, &diets, &[]);
        assert_eq!(out.ingredients[0].name, "garlic-infused oil");
        assert_eq!(out.ingredients[1].name, "chicken breast");
        let notes = out.notes.unwrap();
        assert!(notes.contains("**FODMAP Corrections:**"));
        assert!(notes.contains("• garlic → garlic-infused oil (for Low FODMAP)"));
    }

    #[test]
    fn test_notes_pass_through_when_nothing_to_correct() {
        let mut input = adapted(&["chicken breast", "carrot"]);
        input.notes = Some("Chef notes.".to_string());
        let diets = vec!["Low FODMAP".to_string()];
        let out = enforce_low_fodmap_on_adapted(&input, &diets, &[]);
        assert_eq!(out, input);
    }

    #[test]
    fn test_idempotent_on_catalog_replacement() {
        let input = adapted(&["milk", "pasta", "bread"]);
        let diets = vec!["Low FODMAP".to_string()];
        let once = enforce_low_fodmap_on_adapted(&input, &diets, &[]);
        let twice = enforce_low_fodmap_on_adapted(&once, &diets, &[]);
        assert_eq!(names(&once), names(&twice));
        assert_eq!(once.ingredients[0].name, "lactose-free milk or almond milk");
    }

    #[test]
    fn test_idempotent_on_heuristic_replacement() {
        let input = adapted(&["wheat flour", "garlic scapes"]);
        let diets = vec!["FODMAP-sensitive".to_string()];
        let once = enforce_low_fodmap_on_adapted(&input, &diets, &[]);
        let twice = enforce_low_fodmap_on_adapted(&once, &diets, &[]);
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn test_guard_keeps_custom_replacements_intact() {
        // The custom tomato-sauce replacement mentions "onion/garlic"; the
        // guard stops the heuristic from rewriting it.
        let input = adapted(&["low FODMAP tomato passata with herbs (no onion/garlic)"]);
        let diets = vec!["Low FODMAP".to_string()];
        let out = enforce_low_fodmap_on_adapted(&input, &diets, &[]);
        assert_eq!(names(&out), names(&input));
        assert!(out.notes.is_none());
    }

    #[test]
    fn test_reconciliation_uses_all_restrictions() {
        // A non-FODMAP restriction can still drive a correction once the
        // pass runs; restriction order decides.
        let input = adapted(&["butter"]);
        let diets = vec!["Vegan".to_string(), "Low FODMAP".to_string()];
        let out = enforce_low_fodmap_on_adapted(&input, &diets, &[]);
        assert_eq!(out.ingredients[0].name, "vegan butter or coconut oil");
        let notes = out.notes.unwrap();
        assert!(notes.contains("• butter → vegan butter or coconut oil (for Vegan)"));
    }

    #[test]
    fn test_fodmap_in_allergies_triggers_pass() {
        let input = adapted(&["onion"]);
        let allergies = vec!["FODMAP-sensitive".to_string()];
        let out = enforce_low_fodmap_on_adapted(&input, &[], &allergies);
        assert_eq!(
            out.ingredients[0].name,
            "green tops of scallions, chives, or a pinch of asafoetida"
        );
    }

    #[test]
    fn test_corrections_append_to_existing_notes() {
        let mut input = adapted(&["garlic"]);
        input.notes = Some("AI chef notes.".to_string());
        let diets = vec!["Low FODMAP".to_string()];
        let out = enforce_low_fodmap_on_adapted(&input, &diets, &[]);
        let notes = out.notes.unwrap();
        assert!(notes.starts_with("AI chef notes."));
        assert!(notes.contains("\n\n**FODMAP Corrections:**\n"));
    }
}
