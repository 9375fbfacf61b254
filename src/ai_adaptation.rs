use std::collections::HashMap;

use tracing::{info, warn};

use crate::adaptation::{adapt_recipe_with_database, enforce_low_fodmap_on_adapted};
use crate::api_connection::connection::ApiConnectionError;
use crate::api_connection::endpoints::{
    ChatCompletionRequest, ChatMessage, JsonSchema, JsonSchemaDefinition, JsonSchemaProperty,
    Provider, ResponseFormat, DEFAULT_ADAPTATION_MODEL,
};
use crate::recipe_model::{AdaptedRecipeData, Recipe};

/// Result of the adaptation flow: the adapted data plus whether the
/// deterministic fallback produced it (surfaced to the user as "using
/// built-in substitutions").
#[derive(Debug, Clone)]
pub struct AdaptationOutcome {
    pub adapted: AdaptedRecipeData,
    pub used_fallback: bool,
}

/// Runs the full adaptation flow: AI attempt, mandatory low-FODMAP
/// reconciliation over the AI output, and the rule-based fallback on any
/// failure. Never fails: a proposal must be constructible with zero
/// connectivity, so every AI error degrades to the offline engine.
pub async fn adapt_recipe(
    provider: &Provider,
    recipe: &Recipe,
    diets: &[String],
    allergies: &[String],
    custom_allergies: Option<&str>,
) -> AdaptationOutcome {
    let mut all_allergies: Vec<String> = allergies.to_vec();
    if let Some(custom) = custom_allergies {
        if !custom.trim().is_empty() {
            all_allergies.push(custom.trim().to_string());
        }
    }

    match adapt_recipe_with_ai(provider, recipe, diets, &all_allergies).await {
        Ok(ai_adapted) => {
            let adapted = enforce_low_fodmap_on_adapted(&ai_adapted, diets, &all_allergies);
            info!(recipe = %recipe.title, "AI adaptation successful (post-processed for FODMAP)");
            AdaptationOutcome {
                adapted,
                used_fallback: false,
            }
        }
        Err(err) => {
            warn!(error = %err, "AI adaptation failed, using rule-based fallback");
            AdaptationOutcome {
                adapted: adapt_recipe_with_database(recipe, diets, &all_allergies),
                used_fallback: true,
            }
        }
    }
}

/// Asks the AI collaborator for an adapted recipe and parses its answer.
/// The response format is schema-constrained, but the reply is still
/// treated as untrusted text: fences are stripped, the first balanced JSON
/// object is extracted, and the result must deserialize into
/// [`AdaptedRecipeData`]. Callers must run the reconciliation pass over
/// anything this returns before showing it as low-FODMAP-safe.
pub async fn adapt_recipe_with_ai(
    provider: &Provider,
    recipe: &Recipe,
    diets: &[String],
    allergies: &[String],
) -> Result<AdaptedRecipeData, ApiConnectionError> {
    let prompt = build_adaptation_prompt(recipe, diets, allergies);

    let request = ChatCompletionRequest {
        model: DEFAULT_ADAPTATION_MODEL.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: "/no_thinking\nYou are a recipe adaptation assistant. \
Respond with a single JSON object and nothing else."
                    .to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: prompt,
            },
        ],
        response_format: Some(ResponseFormat {
            format_type: "json_schema".to_string(),
            json_schema: Some(get_adapted_recipe_json_schema()),
        }),
        temperature: Some(0.2),
        max_tokens: Some(2048),
    };

    let response = provider.call_chat_completion(request).await?;

    let choice = response.choices.first().ok_or_else(|| {
        ApiConnectionError::MalformedResponse("no response choices received".to_string())
    })?;

    let content = strip_markdown_fences(&choice.message.content);
    let json = extract_json_object(content).ok_or_else(|| {
        ApiConnectionError::MalformedResponse(format!(
            "no JSON object found in response: {}",
            content.chars().take(120).collect::<String>()
        ))
    })?;

    let adapted = serde_json::from_str::<AdaptedRecipeData>(json)?;
    Ok(adapted)
}

/// Renders the adaptation request the way the review flow expects the
/// model to see it: the full original recipe, the restrictions, and the
/// JSON response contract.
pub fn build_adaptation_prompt(recipe: &Recipe, diets: &[String], allergies: &[String]) -> String {
    let dietary_reqs = if diets.is_empty() {
        "None".to_string()
    } else {
        diets.join(", ")
    };
    let allergy_list = if allergies.is_empty() {
        "None".to_string()
    } else {
        allergies.join(", ")
    };

    let ingredients_text = recipe
        .ingredients
        .iter()
        .map(|ing| {
            format!(
                "{} {} {}",
                ing.amount,
                ing.unit.as_deref().unwrap_or(""),
                ing.name
            )
            .trim()
            .to_string()
        })
        .collect::<Vec<String>>()
        .join("\n");

    let instructions_text = recipe
        .instructions
        .iter()
        .enumerate()
        .map(|(i, inst)| format!("{}. {}", i + 1, inst))
        .collect::<Vec<String>>()
        .join("\n");

    let mut header = String::new();
    if let Some(description) = &recipe.description {
        header.push_str(&format!("Description: {}\n", description));
    }
    if let Some(servings) = recipe.servings {
        header.push_str(&format!("Servings: {}\n", servings));
    }
    if let Some(prep_time) = recipe.prep_time {
        header.push_str(&format!("Prep Time: {} min\n", prep_time));
    }
    if let Some(cook_time) = recipe.cook_time {
        header.push_str(&format!("Cook Time: {} min\n", cook_time));
    }

    format!(
        "Adapt the following recipe to meet these dietary requirements and allergies while \
maintaining the dish's essence and flavor profile.

**Original Recipe: {}**
{}
**Ingredients:**
{}

**Instructions:**
{}

**Dietary Requirements:** {}
**Allergies/Intolerances:** {}

**Instructions:**
1. Substitute ingredients to meet the requirements
2. Adjust cooking methods if needed
3. Preserve the dish's original character and flavor as much as possible
4. Provide clear explanations for major substitutions
5. Note if the adaptation significantly changes the dish

**Response Format (JSON):**
Return ONLY a valid JSON object with this structure:
{{
  \"title\": \"Adapted recipe name\",
  \"description\": \"Brief description\",
  \"ingredients\": [{{\"amount\": \"1\", \"unit\": \"cup\", \"name\": \"ingredient name\"}}],
  \"instructions\": [\"step 1\", \"step 2\"],
  \"notes\": \"Chef notes on substitutions\"
}}",
        recipe.title, header, ingredients_text, instructions_text, dietary_reqs, allergy_list
    )
}

/// Extracts the first balanced `{...}` object from free text, tracking
/// string and escape state so braces inside string values do not confuse
/// the depth count. Returns nothing when no object closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

fn strip_markdown_fences(content: &str) -> &str {
    let mut trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        trimmed = rest;
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        trimmed = rest;
    }
    if let Some(rest) = trimmed.strip_suffix("```") {
        trimmed = rest;
    }
    trimmed.trim()
}

fn get_adapted_recipe_json_schema() -> JsonSchemaDefinition {
    let mut ingredient_properties = HashMap::new();
    ingredient_properties.insert(
        "amount".to_string(),
        JsonSchemaProperty {
            property_type: "string".to_string(),
            description: Some("Quantity as written, e.g. '2' or '1/2'.".to_string()),
            r#enum: None,
            items: None,
        },
    );
    ingredient_properties.insert(
        "unit".to_string(),
        JsonSchemaProperty {
            property_type: "string".to_string(),
            description: Some("Unit of measurement, empty if unitless.".to_string()),
            r#enum: None,
            items: None,
        },
    );
    ingredient_properties.insert(
        "name".to_string(),
        JsonSchemaProperty {
            property_type: "string".to_string(),
            description: Some("Ingredient name after substitution.".to_string()),
            r#enum: None,
            items: None,
        },
    );

    let ingredient_item_schema = JsonSchema {
        schema_type: "object".to_string(),
        properties: Some(ingredient_properties),
        required: Some(vec!["amount".to_string(), "name".to_string()]),
        additional_properties: Some(false),
    };

    let instruction_item_schema = JsonSchema {
        schema_type: "string".to_string(),
        properties: None,
        required: None,
        additional_properties: None,
    };

    let mut recipe_properties = HashMap::new();
    recipe_properties.insert(
        "title".to_string(),
        JsonSchemaProperty {
            property_type: "string".to_string(),
            description: Some("The adapted recipe title.".to_string()),
            r#enum: None,
            items: None,
        },
    );
    recipe_properties.insert(
        "description".to_string(),
        JsonSchemaProperty {
            property_type: "string".to_string(),
            description: Some("Brief description of the adapted dish.".to_string()),
            r#enum: None,
            items: None,
        },
    );
    recipe_properties.insert(
        "ingredients".to_string(),
        JsonSchemaProperty {
            property_type: "array".to_string(),
            description: Some(
                "Adapted ingredient list. Each item must be an object with string \
properties 'amount', 'unit' and 'name'."
                    .to_string(),
            ),
            r#enum: None,
            items: Some(Box::new(ingredient_item_schema)),
        },
    );
    recipe_properties.insert(
        "instructions".to_string(),
        JsonSchemaProperty {
            property_type: "array".to_string(),
            description: Some("Adapted cooking instructions.".to_string()),
            r#enum: None,
            items: Some(Box::new(instruction_item_schema)),
        },
    );
    recipe_properties.insert(
        "notes".to_string(),
        JsonSchemaProperty {
            property_type: "string".to_string(),
            description: Some("Chef notes on substitutions.".to_string()),
            r#enum: None,
            items: None,
        },
    );

    JsonSchemaDefinition {
        name: "adapted_recipe_schema".to_string(),
        strict: Some(true),
        schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(recipe_properties),
            required: Some(vec![
                "title".to_string(),
                "ingredients".to_string(),
                "instructions".to_string(),
            ]),
            additional_properties: Some(false),
        },
    }
}
