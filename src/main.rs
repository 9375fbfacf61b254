use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use tokio::fs;

use recipe_adapt::adaptation::{adaptation_summary, adapt_recipe_with_database, AdaptationSession};
use recipe_adapt::ai_adaptation::{adapt_recipe, AdaptationOutcome};
use recipe_adapt::api_connection::endpoints::Provider;
use recipe_adapt::cli::{parse_args, Command};
use recipe_adapt::fodmap_index::{fetch_fodmap_dataset, rate_ingredient, FodmapRating};
use recipe_adapt::recipe_model::Recipe;
use recipe_adapt::recipe_store::{commit_adapted_recipe, RecipeStore};

const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("recipe_adapt=info")),
        )
        .init();

    match parse_args().command {
        Command::Adapt {
            recipe_file,
            diets,
            allergies,
            custom_allergies,
            offline,
            accept_all,
            delete_original,
            store,
        } => {
            run_adapt(
                &recipe_file,
                diets,
                allergies,
                custom_allergies,
                offline,
                accept_all,
                delete_original,
                &store,
            )
            .await
        }
        Command::Check {
            recipe_file,
            cache,
            force_refresh,
        } => run_check(&recipe_file, &cache, force_refresh).await,
    }
}

async fn read_recipe(path: &str) -> Result<Recipe> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read recipe file '{}'", path))?;
    serde_json::from_str(&raw).with_context(|| format!("'{}' is not a valid recipe file", path))
}

#[allow(clippy::too_many_arguments)]
async fn run_adapt(
    recipe_file: &str,
    diets: Vec<String>,
    allergies: Vec<String>,
    custom_allergies: Option<String>,
    offline: bool,
    accept_all: bool,
    delete_original: bool,
    store_path: &str,
) -> Result<()> {
    let recipe = read_recipe(recipe_file).await?;
    println!("Adapting '{}'...", recipe.title);

    let outcome = if offline {
        let mut all_allergies = allergies.clone();
        if let Some(custom) = custom_allergies.as_deref() {
            if !custom.trim().is_empty() {
                all_allergies.push(custom.trim().to_string());
            }
        }
        AdaptationOutcome {
            adapted: adapt_recipe_with_database(&recipe, &diets, &all_allergies),
            used_fallback: true,
        }
    } else {
        let provider = Provider::openrouter(API_KEY_ENV_VAR);
        adapt_recipe(
            &provider,
            &recipe,
            &diets,
            &allergies,
            custom_allergies.as_deref(),
        )
        .await
    };

    if outcome.used_fallback && !offline {
        println!("AI unavailable, using built-in substitutions.");
    }

    let mut session = AdaptationSession::new();
    let original_id = recipe.id.clone();
    session.set_proposal(recipe, outcome.adapted, diets, allergies);

    if accept_all {
        session.accept_all();
    }

    let proposal = session
        .proposal()
        .expect("proposal was just set");

    println!("\nProposed substitutions:");
    let mut changed = 0usize;
    for choice in &proposal.choices {
        let marker = if choice.accepted { "*" } else { " " };
        let unit = choice.unit.as_deref().unwrap_or("");
        if choice.accepted {
            changed += 1;
            println!(
                " {} {} {} {} → {}",
                marker, choice.amount, unit, choice.original_name, choice.adapted_name
            );
            if choice.options.len() > 1 {
                println!("     options: {}", choice.options.join(" | "));
            }
        } else {
            println!(
                " {} {} {} {}",
                marker, choice.amount, unit, choice.original_name
            );
        }
    }
    println!("\n{}", adaptation_summary(changed));

    let store = RecipeStore::new(store_path);
    match commit_adapted_recipe(&store, &mut session, Utc::now()) {
        Ok(saved_id) => {
            println!("Saved adapted recipe as '{}' in {}", saved_id, store_path);
            if delete_original {
                if store.delete_recipe(&original_id)? {
                    println!("Deleted original recipe '{}'.", original_id);
                } else {
                    println!("Original recipe '{}' was not in the store.", original_id);
                }
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Could not save the adapted recipe: {}", err);
            eprintln!("Your review is still pending; fix the store path and retry.");
            Err(err)
        }
    }
}

async fn run_check(recipe_file: &str, cache: &str, force_refresh: bool) -> Result<()> {
    let recipe = read_recipe(recipe_file).await?;

    println!("Fetching FODMAP dataset (this may take a moment)...");
    let dataset = fetch_fodmap_dataset(Path::new(cache), force_refresh).await;
    if dataset.entries.is_empty() {
        println!("Dataset unavailable; all ratings will be 'unknown'.");
    } else {
        println!("Dataset loaded: {} entries.", dataset.entries.len());
    }

    println!("\nFODMAP ratings for '{}':", recipe.title);
    let mut flagged = 0usize;
    for ingredient in &recipe.ingredients {
        let (rating, matched) = rate_ingredient(&ingredient.name, &dataset);
        if matches!(rating, FodmapRating::High | FodmapRating::Moderate) {
            flagged += 1;
        }
        match matched {
            Some(entry) => {
                print!("  [{}] {} (matched '{}')", rating, ingredient.name, entry.name);
                if let Some(serving) = &entry.serving_note {
                    print!(" (serving: {})", serving);
                }
                println!();
            }
            None => println!("  [{}] {}", rating, ingredient.name),
        }
    }

    if flagged > 0 {
        println!(
            "\n{} ingredient(s) may be high or moderate FODMAP. Consider adapting this recipe.",
            flagged
        );
    } else {
        println!("\nNo flagged ingredients found.");
    }
    Ok(())
}
