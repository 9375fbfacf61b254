pub mod catalog;
pub mod custom;
pub mod fodmap;

pub use catalog::{find_substitution, map_diet_to_key, DietKey, SubstitutionRule};
pub use fodmap::{apply_fodmap_heuristics, wants_low_fodmap};
