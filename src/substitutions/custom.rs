use crate::substitutions::catalog::SubstitutionRule;

/// Low-FODMAP additions layered on top of the base catalog. Appended after
/// the base table, so a custom rule only fires when no base fragment
/// already claims the ingredient name.
pub const CUSTOM_RULES: &[SubstitutionRule] = &[
    SubstitutionRule {
        original: &["shallot", "shallots"],
        vegan: None,
        vegetarian: None,
        keto: None,
        paleo: None,
        gluten_free: None,
        dairy_free: None,
        low_carb: None,
        nut_free: None,
        low_fodmap: Some("green onion tops or chives"),
    },
    SubstitutionRule {
        original: &["stock", "broth", "chicken stock", "vegetable stock"],
        vegan: None,
        vegetarian: None,
        keto: None,
        paleo: None,
        gluten_free: None,
        dairy_free: None,
        low_carb: None,
        nut_free: None,
        low_fodmap: Some("low FODMAP certified stock or homemade stock without onion/garlic"),
    },
    SubstitutionRule {
        original: &["tomato sauce", "pasta sauce", "marinara"],
        vegan: None,
        vegetarian: None,
        keto: None,
        paleo: None,
        gluten_free: None,
        dairy_free: None,
        low_carb: None,
        nut_free: None,
        low_fodmap: Some("low FODMAP tomato passata with herbs (no onion/garlic)"),
    },
    SubstitutionRule {
        original: &["BBQ sauce", "barbecue sauce"],
        vegan: None,
        vegetarian: None,
        keto: None,
        paleo: None,
        gluten_free: None,
        dairy_free: None,
        low_carb: None,
        nut_free: None,
        low_fodmap: Some("low FODMAP BBQ sauce (no onion/garlic), or make your own"),
    },
];
