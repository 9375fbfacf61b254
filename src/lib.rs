pub mod adaptation;
pub mod ai_adaptation;
pub mod api_connection;
pub mod cli;
pub mod fodmap_index;
pub mod recipe_model;
pub mod recipe_store;
pub mod substitutions;
