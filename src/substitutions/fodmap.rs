/// Replacement strings the heuristic pass can produce, in trigger order.
/// Also consulted by the reconciliation guard: a name equal to any of
/// these is already low-FODMAP-safe and must not be corrected again.
pub const HEURISTIC_REPLACEMENTS: &[&str] = &[
    "garlic-infused oil",
    "chives or green onion tops",
    "gluten-free flour blend",
    "gluten-free pasta",
    "lactose-free milk",
    "lactose-free cream or coconut cream",
    "lactose-free yogurt",
    "gluten-free bread",
];

/// True when any restriction string asks for low-FODMAP handling.
/// Case-insensitive substring match: "Low FODMAP", "fodmap-sensitive" and
/// friends all qualify.
pub fn wants_low_fodmap(restrictions: &[String]) -> bool {
    restrictions
        .iter()
        .any(|r| r.to_lowercase().contains("fodmap"))
}

/// Pattern-based low-FODMAP corrections. A fixed ordered trigger list,
/// first hit wins. Used as the fallback when the catalog has no diet
/// entry for an ingredient, and as the mandatory correctness pass over
/// AI-sourced adaptations; the AI is not trusted to honor low-FODMAP
/// constraints even when asked.
pub fn apply_fodmap_heuristics(name: &str) -> Option<&'static str> {
    let n = name.to_lowercase();
    if n.contains("garlic") {
        return Some("garlic-infused oil");
    }
    if n.contains("onion") {
        return Some("chives or green onion tops");
    }
    if n.contains("wheat flour") || n == "flour" {
        return Some("gluten-free flour blend");
    }
    if n.contains("pasta") {
        return Some("gluten-free pasta");
    }
    if n.contains("milk") {
        return Some("lactose-free milk");
    }
    if n.contains("cream") {
        return Some("lactose-free cream or coconut cream");
    }
    if n.contains("yogurt") {
        return Some("lactose-free yogurt");
    }
    if n.contains("bread") {
        return Some("gluten-free bread");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garlic_and_onion_triggers() {
        assert_eq!(
            apply_fodmap_heuristics("minced garlic"),
            Some("garlic-infused oil")
        );
        assert_eq!(
            apply_fodmap_heuristics("red onion"),
            Some("chives or green onion tops")
        );
    }

    #[test]
    fn test_flour_trigger_requires_wheat_or_exact() {
        assert_eq!(
            apply_fodmap_heuristics("wheat flour"),
            Some("gluten-free flour blend")
        );
        assert_eq!(
            apply_fodmap_heuristics("flour"),
            Some("gluten-free flour blend")
        );
        // "rice flour" is neither wheat flour nor exactly "flour".
        assert_eq!(apply_fodmap_heuristics("rice flour"), None);
    }

    #[test]
    fn test_trigger_order_garlic_before_bread() {
        // Garlic bread hits the garlic trigger first.
        assert_eq!(
            apply_fodmap_heuristics("garlic bread"),
            Some("garlic-infused oil")
        );
    }

    #[test]
    fn test_no_trigger() {
        assert_eq!(apply_fodmap_heuristics("carrot"), None);
        assert_eq!(apply_fodmap_heuristics("cauliflower rice"), None);
    }

    #[test]
    fn test_wants_low_fodmap_variants() {
        let yes = vec!["Low FODMAP".to_string()];
        let also = vec!["Vegan".to_string(), "FODMAP-sensitive".to_string()];
        let no = vec!["Vegan".to_string(), "Gluten-free".to_string()];
        assert!(wants_low_fodmap(&yes));
        assert!(wants_low_fodmap(&also));
        assert!(!wants_low_fodmap(&no));
        assert!(!wants_low_fodmap(&[]));
    }

    #[test]
    fn test_heuristic_outputs_are_fixed_points() {
        for replacement in HEURISTIC_REPLACEMENTS {
            match apply_fodmap_heuristics(replacement) {
                Some(again) => assert_eq!(again, *replacement),
                None => {}
            }
        }
    }
}
