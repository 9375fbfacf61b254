pub mod engine;
pub mod proposal;
pub mod reconcile;

pub use engine::{adapt_recipe_with_database, adaptation_summary};
pub use proposal::{AdaptationProposal, AdaptationSession, IngredientChoice};
pub use reconcile::enforce_low_fodmap_on_adapted;
