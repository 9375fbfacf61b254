use crate::substitutions::custom::CUSTOM_RULES;

/// Internal diet keys the catalog is indexed by. Free-form diet and allergy
/// strings from the selection UI are resolved onto these via
/// [`map_diet_to_key`]; anything that does not resolve never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DietKey {
    Vegan,
    Vegetarian,
    Keto,
    Paleo,
    GlutenFree,
    DairyFree,
    LowCarb,
    NutFree,
    LowFodmap,
}

/// One substitution rule: a set of ingredient name fragments mapped to at
/// most one replacement per diet key. Rules are consulted in declaration
/// order, base table first, then the custom table. First match wins, so a
/// custom rule only takes effect when no base rule matches the same name.
#[derive(Debug, Clone, Copy)]
pub struct SubstitutionRule {
    pub original: &'static [&'static str],
    pub vegan: Option<&'static str>,
    pub vegetarian: Option<&'static str>,
    pub keto: Option<&'static str>,
    pub paleo: Option<&'static str>,
    pub gluten_free: Option<&'static str>,
    pub dairy_free: Option<&'static str>,
    pub low_carb: Option<&'static str>,
    pub nut_free: Option<&'static str>,
    pub low_fodmap: Option<&'static str>,
}

impl SubstitutionRule {
    pub fn replacement_for(&self, key: DietKey) -> Option<&'static str> {
        match key {
            DietKey::Vegan => self.vegan,
            DietKey::Vegetarian => self.vegetarian,
            DietKey::Keto => self.keto,
            DietKey::Paleo => self.paleo,
            DietKey::GlutenFree => self.gluten_free,
            DietKey::DairyFree => self.dairy_free,
            DietKey::LowCarb => self.low_carb,
            DietKey::NutFree => self.nut_free,
            DietKey::LowFodmap => self.low_fodmap,
        }
    }
}

pub const BASE_RULES: &[SubstitutionRule] = &[
    SubstitutionRule {
        original: &["butter", "unsalted butter", "salted butter"],
        vegan: Some("vegan butter or coconut oil"),
        vegetarian: Some("butter"),
        keto: Some("butter or ghee"),
        paleo: Some("ghee or coconut oil"),
        gluten_free: Some("butter"),
        dairy_free: Some("coconut oil or vegan butter"),
        low_carb: Some("butter"),
        nut_free: Some("butter or coconut oil"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["milk", "whole milk", "2% milk", "skim milk", "dairy milk"],
        vegan: Some("almond milk or oat milk"),
        vegetarian: Some("milk"),
        keto: Some("heavy cream or unsweetened almond milk"),
        paleo: Some("coconut milk or almond milk"),
        gluten_free: Some("milk"),
        dairy_free: Some("almond milk or oat milk"),
        low_carb: Some("unsweetened almond milk"),
        nut_free: Some("oat milk or soy milk"),
        low_fodmap: Some("lactose-free milk or almond milk"),
    },
    SubstitutionRule {
        original: &["eggs", "egg", "whole eggs", "large eggs"],
        vegan: Some("flax eggs (1 tbsp ground flax + 3 tbsp water per egg)"),
        vegetarian: Some("eggs"),
        keto: Some("eggs"),
        paleo: Some("eggs"),
        gluten_free: Some("eggs"),
        dairy_free: Some("eggs"),
        low_carb: Some("eggs"),
        nut_free: Some("eggs"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["bacon", "pork bacon", "turkey bacon"],
        vegan: Some("tempeh bacon or coconut bacon"),
        vegetarian: Some("veggie bacon or smoked tempeh"),
        keto: Some("bacon"),
        paleo: Some("uncured bacon"),
        gluten_free: Some("bacon (check for gluten-free)"),
        dairy_free: Some("bacon"),
        low_carb: Some("bacon"),
        nut_free: Some("bacon"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["chicken", "chicken breast", "chicken thighs"],
        vegan: Some("tofu or seitan"),
        vegetarian: Some("chickpeas or extra-firm tofu"),
        keto: Some("chicken"),
        paleo: Some("chicken"),
        gluten_free: Some("chicken"),
        dairy_free: Some("chicken"),
        low_carb: Some("chicken"),
        nut_free: Some("chicken"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["beef", "ground beef", "beef steak", "steak"],
        vegan: Some("beyond beef or lentils"),
        vegetarian: Some("portobello mushrooms or black beans"),
        keto: Some("beef"),
        paleo: Some("grass-fed beef"),
        gluten_free: Some("beef"),
        dairy_free: Some("beef"),
        low_carb: Some("beef"),
        nut_free: Some("beef"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["cheese", "cheddar cheese", "mozzarella", "parmesan", "parmesan cheese"],
        vegan: Some("nutritional yeast or vegan cheese"),
        vegetarian: Some("cheese"),
        keto: Some("cheese"),
        paleo: Some("omit or use cashew cheese"),
        gluten_free: Some("cheese"),
        dairy_free: Some("vegan cheese or nutritional yeast"),
        low_carb: Some("cheese"),
        nut_free: Some("cheese (avoid cashew-based alternatives)"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["flour", "all-purpose flour", "wheat flour", "plain flour"],
        vegan: Some("all-purpose flour"),
        vegetarian: Some("all-purpose flour"),
        keto: Some("almond flour or coconut flour"),
        paleo: Some("almond flour or cassava flour"),
        gluten_free: Some("gluten-free flour blend or rice flour"),
        dairy_free: Some("all-purpose flour"),
        low_carb: Some("almond flour"),
        nut_free: Some("rice flour or oat flour"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["sugar", "white sugar", "granulated sugar", "cane sugar"],
        vegan: Some("organic sugar or coconut sugar"),
        vegetarian: Some("sugar"),
        keto: Some("erythritol or stevia"),
        paleo: Some("honey or maple syrup"),
        gluten_free: Some("sugar"),
        dairy_free: Some("sugar"),
        low_carb: Some("erythritol or monk fruit sweetener"),
        nut_free: Some("sugar"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["pasta", "spaghetti", "penne", "noodles", "macaroni"],
        vegan: Some("pasta"),
        vegetarian: Some("pasta"),
        keto: Some("zucchini noodles or shirataki noodles"),
        paleo: Some("zucchini noodles or sweet potato noodles"),
        gluten_free: Some("gluten-free pasta or rice noodles"),
        dairy_free: Some("pasta"),
        low_carb: Some("zucchini noodles"),
        nut_free: Some("pasta"),
        low_fodmap: Some("gluten-free pasta or rice noodles"),
    },
    SubstitutionRule {
        original: &["bread", "white bread", "wheat bread", "bread crumbs", "breadcrumbs"],
        vegan: Some("bread (check for egg/dairy)"),
        vegetarian: Some("bread"),
        keto: Some("almond flour bread or cloud bread"),
        paleo: Some("almond flour bread or omit"),
        gluten_free: Some("gluten-free bread"),
        dairy_free: Some("dairy-free bread"),
        low_carb: Some("almond flour bread"),
        nut_free: Some("rice bread or oat bread"),
        low_fodmap: Some("gluten-free bread or sourdough spelt (in small serves)"),
    },
    SubstitutionRule {
        original: &["rice", "white rice", "brown rice", "jasmine rice"],
        vegan: Some("rice"),
        vegetarian: Some("rice"),
        keto: Some("cauliflower rice"),
        paleo: Some("cauliflower rice"),
        gluten_free: Some("rice"),
        dairy_free: Some("rice"),
        low_carb: Some("cauliflower rice"),
        nut_free: Some("rice"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["honey"],
        vegan: Some("maple syrup or agave nectar"),
        vegetarian: Some("honey"),
        keto: Some("sugar-free syrup or small amount of honey"),
        paleo: Some("honey"),
        gluten_free: Some("honey"),
        dairy_free: Some("honey"),
        low_carb: Some("sugar-free syrup"),
        nut_free: Some("honey"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["cream", "heavy cream", "whipping cream", "double cream"],
        vegan: Some("coconut cream or cashew cream"),
        vegetarian: Some("heavy cream"),
        keto: Some("heavy cream"),
        paleo: Some("coconut cream"),
        gluten_free: Some("heavy cream"),
        dairy_free: Some("coconut cream"),
        low_carb: Some("heavy cream"),
        nut_free: Some("coconut cream or oat cream"),
        low_fodmap: Some("lactose-free cream or coconut cream"),
    },
    SubstitutionRule {
        original: &["yogurt", "greek yogurt", "plain yogurt"],
        vegan: Some("coconut yogurt or almond yogurt"),
        vegetarian: Some("yogurt"),
        keto: Some("full-fat greek yogurt"),
        paleo: Some("coconut yogurt"),
        gluten_free: Some("yogurt"),
        dairy_free: Some("coconut yogurt or almond yogurt"),
        low_carb: Some("full-fat greek yogurt"),
        nut_free: Some("coconut yogurt or soy yogurt"),
        low_fodmap: Some("lactose-free yogurt or coconut yogurt"),
    },
    SubstitutionRule {
        original: &["soy sauce"],
        vegan: Some("soy sauce"),
        vegetarian: Some("soy sauce"),
        keto: Some("soy sauce or coconut aminos"),
        paleo: Some("coconut aminos"),
        gluten_free: Some("tamari or gluten-free soy sauce"),
        dairy_free: Some("soy sauce"),
        low_carb: Some("soy sauce"),
        nut_free: Some("soy sauce"),
        low_fodmap: Some("tamari (gluten-free) or coconut aminos"),
    },
    SubstitutionRule {
        original: &["peanuts", "peanut butter", "peanut oil"],
        vegan: Some("peanuts or peanut butter"),
        vegetarian: Some("peanuts or peanut butter"),
        keto: Some("peanuts or peanut butter"),
        paleo: Some("almond butter or sunflower seed butter"),
        gluten_free: Some("peanuts or peanut butter"),
        dairy_free: Some("peanuts or peanut butter"),
        low_carb: Some("peanuts or peanut butter"),
        nut_free: Some("sunflower seed butter"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["almonds", "almond flour", "almond milk", "sliced almonds"],
        vegan: Some("almonds"),
        vegetarian: Some("almonds"),
        keto: Some("almonds"),
        paleo: Some("almonds"),
        gluten_free: Some("almonds"),
        dairy_free: Some("almonds"),
        low_carb: Some("almonds"),
        nut_free: Some("sunflower seeds or pumpkin seeds"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["fish", "salmon", "tuna", "cod", "tilapia"],
        vegan: Some("hearts of palm or banana blossom"),
        vegetarian: Some("omit or use tofu"),
        keto: Some("fish"),
        paleo: Some("wild-caught fish"),
        gluten_free: Some("fish"),
        dairy_free: Some("fish"),
        low_carb: Some("fish"),
        nut_free: Some("fish"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["shrimp", "prawns", "shellfish", "crab", "lobster"],
        vegan: Some("hearts of palm or king oyster mushrooms"),
        vegetarian: Some("omit or use mushrooms"),
        keto: Some("shrimp"),
        paleo: Some("shrimp"),
        gluten_free: Some("shrimp"),
        dairy_free: Some("shrimp"),
        low_carb: Some("shrimp"),
        nut_free: Some("shrimp"),
        low_fodmap: None,
    },
    SubstitutionRule {
        original: &["garlic", "garlic clove", "minced garlic", "garlic powder", "garlic salt"],
        vegan: Some("garlic"),
        vegetarian: Some("garlic"),
        keto: Some("garlic"),
        paleo: Some("garlic"),
        gluten_free: Some("garlic"),
        dairy_free: Some("garlic"),
        low_carb: Some("garlic"),
        nut_free: Some("garlic"),
        low_fodmap: Some("garlic-infused oil"),
    },
    SubstitutionRule {
        original: &["onion", "white onion", "yellow onion", "red onion", "brown onion", "onion powder"],
        vegan: Some("onion"),
        vegetarian: Some("onion"),
        keto: Some("onion"),
        paleo: Some("onion"),
        gluten_free: Some("onion"),
        dairy_free: Some("onion"),
        low_carb: Some("onion"),
        nut_free: Some("onion"),
        low_fodmap: Some("green tops of scallions, chives, or a pinch of asafoetida"),
    },
];

/// All rules in lookup order: base table first, custom table appended.
pub fn all_rules() -> impl Iterator<Item = &'static SubstitutionRule> {
    BASE_RULES.iter().chain(CUSTOM_RULES.iter())
}

/// Resolves a free-form diet/allergy display string onto a catalog key.
/// Unrecognized strings resolve to nothing and therefore never match.
pub fn map_diet_to_key(diet: &str) -> Option<DietKey> {
    match diet.to_lowercase().as_str() {
        "vegan" => Some(DietKey::Vegan),
        "vegetarian" => Some(DietKey::Vegetarian),
        "keto" => Some(DietKey::Keto),
        "paleo" => Some(DietKey::Paleo),
        "gluten-free" | "gluten" => Some(DietKey::GlutenFree),
        "dairy-free" | "dairy" => Some(DietKey::DairyFree),
        "low-carb" => Some(DietKey::LowCarb),
        "nuts" => Some(DietKey::NutFree),
        "low fodmap" | "fodmap" | "fodmap-sensitive" | "fodmap sensitive" => {
            Some(DietKey::LowFodmap)
        }
        _ => None,
    }
}

/// Loose bidirectional containment match between a normalized ingredient
/// name and a rule fragment. Deliberately heuristic: it over-matches (e.g.
/// "cream" matches "ice cream"). Do not tighten without revisiting every
/// catalog fragment.
pub fn names_overlap(normalized_ingredient: &str, fragment: &str) -> bool {
    normalized_ingredient.contains(fragment) || fragment.contains(normalized_ingredient)
}

/// Looks up a replacement for `ingredient_name` under `diet`.
///
/// The first rule whose fragments overlap the name decides the outcome:
/// its replacement for the resolved diet key is returned, or nothing when
/// the rule carries no value for that key. Later rules are not consulted
/// even then; lookup is strictly first-match-wins over the concatenated
/// base + custom table.
pub fn find_substitution(ingredient_name: &str, diet: &str) -> Option<&'static str> {
    let normalized = ingredient_name.to_lowercase().trim().to_string();

    for rule in all_rules() {
        let found = rule
            .original
            .iter()
            .any(|orig| names_overlap(&normalized, orig));
        if found {
            return map_diet_to_key(diet).and_then(|key| rule.replacement_for(key));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vegan_butter_substitution() {
        assert_eq!(
            find_substitution("butter", "Vegan"),
            Some("vegan butter or coconut oil")
        );
    }

    #[test]
    fn test_first_match_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                find_substitution("garlic clove", "Low FODMAP"),
                Some("garlic-infused oil")
            );
        }
    }

    #[test]
    fn test_diet_alias_resolution() {
        let via_alias = find_substitution("onion", "fodmap-sensitive");
        let via_label = find_substitution("onion", "low fodmap");
        assert!(via_alias.is_some());
        assert_eq!(via_alias, via_label);
    }

    #[test]
    fn test_unrecognized_diet_never_matches() {
        assert_eq!(find_substitution("butter", "low-sodium"), None);
        assert_eq!(find_substitution("butter", "pescatarian"), None);
    }

    #[test]
    fn test_rule_without_value_for_key_returns_none() {
        // Butter has no low-FODMAP entry; the butter rule still decides the
        // lookup, so the result is None rather than a later rule's value.
        assert_eq!(find_substitution("butter", "Low FODMAP"), None);
    }

    #[test]
    fn test_bidirectional_containment_over_matches() {
        // "ice cream" contains the "cream" fragment. Known, intentional
        // looseness of the matcher.
        assert_eq!(
            find_substitution("ice cream", "Vegan"),
            Some("coconut cream or cashew cream")
        );
    }

    #[test]
    fn test_catalog_order_is_part_of_the_contract() {
        // "almond milk" hits the milk rule before the almonds rule, so a
        // nut-free lookup yields the milk rule's replacement. Reordering
        // the table changes user-visible output.
        assert_eq!(
            find_substitution("almond milk", "Nuts"),
            Some("oat milk or soy milk")
        );
    }

    #[test]
    fn test_custom_rules_apply_after_base_rules() {
        // Shallot matches no base rule, so the custom table serves it.
        assert_eq!(
            find_substitution("shallots", "Low FODMAP"),
            Some("green onion tops or chives")
        );
        // "chicken stock" matches the base chicken rule first; the custom
        // stock rule never gets a say. First-match-wins, documented.
        assert_eq!(find_substitution("chicken stock", "Low FODMAP"), None);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(
            find_substitution("Garlic Powder", "LOW FODMAP"),
            Some("garlic-infused oil")
        );
    }
}
