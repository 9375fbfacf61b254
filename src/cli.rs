use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Adapt a recipe to dietary restrictions, review the substitutions
    /// and save the result
    Adapt {
        /// Path to the recipe JSON file
        #[arg(short, long)]
        recipe_file: String,

        /// Dietary preference, e.g. "Low FODMAP", "Vegan" (repeatable)
        #[arg(short, long = "diet")]
        diets: Vec<String>,

        /// Allergy or intolerance, e.g. "Lactose", "Nuts" (repeatable)
        #[arg(short, long = "allergy")]
        allergies: Vec<String>,

        /// Free-text allergies appended to the allergy list
        #[arg(long)]
        custom_allergies: Option<String>,

        /// Skip the AI service and use the rule-based engine directly
        #[arg(long)]
        offline: bool,

        /// Accept every proposed substitution without individual review
        #[arg(long)]
        accept_all: bool,

        /// Delete the original recipe from the store after saving
        #[arg(long)]
        delete_original: bool,

        /// Path to the recipe store JSON file
        #[arg(long, default_value = "recipes.json")]
        store: String,
    },
    /// Rate a recipe's ingredients against the public FODMAP dataset
    Check {
        /// Path to the recipe JSON file
        #[arg(short, long)]
        recipe_file: String,

        /// Cache file for the downloaded dataset
        #[arg(long, default_value = "fodmap_dataset.json")]
        cache: String,

        /// Re-download the dataset even if a cache exists
        #[arg(long)]
        force_refresh: bool,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
