use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Community-maintained FODMAP food list, fetched once and cached on disk.
pub const FODMAP_DATASET_URL: &str =
    "https://raw.githubusercontent.com/oseparovic/fodmap_list/master/fodmap_repo.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FodmapRating {
    Low,
    Moderate,
    High,
    Unknown,
}

impl fmt::Display for FodmapRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FodmapRating::Low => "low",
            FodmapRating::Moderate => "moderate",
            FodmapRating::High => "high",
            FodmapRating::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FodmapEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub rating: FodmapRating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FodmapDataset {
    pub entries: Vec<FodmapEntry>,
    pub fetched_at: String,
}

impl FodmapDataset {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Returns the cached dataset when present (unless a refresh is forced),
/// otherwise downloads and caches it. Every failure degrades to an empty
/// dataset with a warning; ratings then come back as unknown, which the
/// UI treats as "no data", not as an error.
pub async fn fetch_fodmap_dataset(cache_path: &Path, force_refresh: bool) -> FodmapDataset {
    if !force_refresh {
        match read_cache(cache_path) {
            Ok(Some(dataset)) => return dataset,
            Ok(None) => {}
            Err(err) => warn!(error = %err, "ignoring unreadable FODMAP dataset cache"),
        }
    }

    match download_dataset().await {
        Ok(dataset) => {
            if let Err(err) = write_cache(cache_path, &dataset) {
                warn!(error = %err, "could not cache FODMAP dataset");
            }
            dataset
        }
        Err(err) => {
            warn!(error = %err, "failed to fetch FODMAP dataset");
            FodmapDataset::empty()
        }
    }
}

/// Rates an ingredient against the dataset. An exact normalized match wins
/// immediately; otherwise the bidirectional-containment candidate with the
/// longest overlap (shorter of the two normalized names) is used. No
/// candidate at all means unknown.
pub fn rate_ingredient<'a>(
    name: &str,
    dataset: &'a FodmapDataset,
) -> (FodmapRating, Option<&'a FodmapEntry>) {
    let normalized = normalize_name(name);
    let mut best: Option<(&FodmapEntry, usize)> = None;

    for entry in &dataset.entries {
        let entry_name = normalize_name(&entry.name);
        if normalized == entry_name {
            return (entry.rating, Some(entry));
        }
        if normalized.contains(&entry_name) || entry_name.contains(&normalized) {
            let score = normalized.len().min(entry_name.len());
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((entry, score));
            }
        }
    }

    match best {
        Some((entry, _)) => (entry.rating, Some(entry)),
        None => (FodmapRating::Unknown, None),
    }
}

fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let cleaned: String = lowered
        .trim()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn rating_from_keywords(value: &str) -> FodmapRating {
    let v = value.to_lowercase();
    let low = ["safe", "low", "green", "allowed", "ok", "yes", "low fodmap"];
    let moderate = ["medium", "moderate", "amber", "orange"];
    let high = ["high", "red", "avoid", "no", "not allowed"];
    if low.iter().any(|k| v.contains(k)) {
        return FodmapRating::Low;
    }
    if moderate.iter().any(|k| v.contains(k)) {
        return FodmapRating::Moderate;
    }
    if high.iter().any(|k| v.contains(k)) {
        return FodmapRating::High;
    }
    FodmapRating::Unknown
}

fn string_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn rating_field(item: &Value, keys: &[&str]) -> FodmapRating {
    let value = keys.iter().find_map(|key| {
        item.get(*key).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    });
    match value {
        Some(v) => rating_from_keywords(&v),
        None => FodmapRating::Unknown,
    }
}

/// The upstream repository has changed shape over time; accept both a
/// top-level array and an object wrapping the list, and probe the known
/// field spellings for each attribute.
fn parse_entries(raw: &Value) -> Vec<FodmapEntry> {
    let items: &[Value] = if let Some(array) = raw.as_array() {
        array
    } else if let Some(list) = ["list", "items", "foods"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_array))
    {
        list
    } else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for item in items {
        let name = match string_field(item, &["name", "food", "title"]) {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };
        entries.push(FodmapEntry {
            name,
            group: string_field(item, &["group", "category"]),
            category: string_field(item, &["category", "type"]),
            rating: rating_field(item, &["group", "category", "rating", "rank", "status"]),
            details: string_field(item, &["details", "notes", "comment", "description"]),
            serving_note: string_field(item, &["serving", "portion", "serving_note"]),
        });
    }
    entries
}

async fn download_dataset() -> Result<FodmapDataset> {
    let response = reqwest::Client::new()
        .get(FODMAP_DATASET_URL)
        .header("Accept", "application/json")
        .send()
        .await
        .context("FODMAP dataset request failed")?;
    if !response.status().is_success() {
        bail!("HTTP {}", response.status());
    }
    let raw: Value = response
        .json()
        .await
        .context("FODMAP dataset is not valid JSON")?;

    let entries = parse_entries(&raw);
    info!(entries = entries.len(), "fetched FODMAP dataset");
    Ok(FodmapDataset {
        entries,
        fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

fn read_cache(cache_path: &Path) -> Result<Option<FodmapDataset>> {
    if !cache_path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(cache_path)
        .with_context(|| format!("Failed to read FODMAP cache at {:?}", cache_path))?;
    let dataset = serde_json::from_str(&raw)
        .with_context(|| format!("FODMAP cache at {:?} is not valid JSON", cache_path))?;
    Ok(Some(dataset))
}

fn write_cache(cache_path: &Path, dataset: &FodmapDataset) -> Result<()> {
    let raw = serde_json::to_string(dataset).context("Failed to serialize FODMAP dataset")?;
    fs::write(cache_path, raw)
        .with_context(|| format!("Failed to write FODMAP cache at {:?}", cache_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, rating: FodmapRating) -> FodmapEntry {
        FodmapEntry {
            name: name.to_string(),
            group: None,
            category: None,
            rating,
            details: None,
            serving_note: None,
        }
    }

    fn dataset(entries: Vec<FodmapEntry>) -> FodmapDataset {
        FodmapDataset {
            entries,
            fetched_at: "2025-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_normalize_name_strips_punctuation_and_whitespace() {
        assert_eq!(normalize_name("  Garlic (raw)!  "), "garlic raw");
        assert_eq!(normalize_name("Lactose-Free   Milk"), "lactose-free milk");
    }

    #[test]
    fn test_rating_keywords() {
        assert_eq!(rating_from_keywords("Low FODMAP"), FodmapRating::Low);
        assert_eq!(rating_from_keywords("green"), FodmapRating::Low);
        assert_eq!(rating_from_keywords("Moderate"), FodmapRating::Moderate);
        assert_eq!(rating_from_keywords("amber"), FodmapRating::Moderate);
        assert_eq!(rating_from_keywords("avoid"), FodmapRating::High);
        assert_eq!(rating_from_keywords("red"), FodmapRating::High);
        assert_eq!(rating_from_keywords("???"), FodmapRating::Unknown);
    }

    #[test]
    fn test_exact_match_beats_containment() {
        let ds = dataset(vec![
            entry("onion powder", FodmapRating::High),
            entry("onion", FodmapRating::High),
        ]);
        let (rating, matched) = rate_ingredient("Onion", &ds);
        assert_eq!(rating, FodmapRating::High);
        assert_eq!(matched.unwrap().name, "onion");
    }

    #[test]
    fn test_containment_picks_longest_overlap() {
        let ds = dataset(vec![
            entry("rice", FodmapRating::Low),
            entry("rice noodles", FodmapRating::Low),
            entry("onion", FodmapRating::High),
        ]);
        let (_, matched) = rate_ingredient("rice noodles (fresh)", &ds);
        assert_eq!(matched.unwrap().name, "rice noodles");
    }

    #[test]
    fn test_unknown_when_nothing_matches() {
        let ds = dataset(vec![entry("onion", FodmapRating::High)]);
        let (rating, matched) = rate_ingredient("dragonfruit", &ds);
        assert_eq!(rating, FodmapRating::Unknown);
        assert!(matched.is_none());
    }

    #[test]
    fn test_parse_entries_from_array() {
        let raw: Value = serde_json::from_str(
            r#"[
                {"name": "Garlic", "group": "avoid", "notes": "High in fructans"},
                {"food": "Rice", "status": "safe"},
                {"comment": "no name, skipped"}
            ]"#,
        )
        .unwrap();
        let entries = parse_entries(&raw);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Garlic");
        assert_eq!(entries[0].rating, FodmapRating::High);
        assert_eq!(entries[0].details.as_deref(), Some("High in fructans"));
        assert_eq!(entries[1].name, "Rice");
        assert_eq!(entries[1].rating, FodmapRating::Low);
    }

    #[test]
    fn test_parse_entries_from_wrapped_object() {
        let raw: Value = serde_json::from_str(
            r#"{"list": [{"name": "Onion", "rating": "red", "portion": "none"}]}"#,
        )
        .unwrap();
        let entries = parse_entries(&raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].rating, FodmapRating::High);
        assert_eq!(entries[0].serving_note.as_deref(), Some("none"));
    }

    #[test]
    fn test_parse_entries_unrecognized_shape() {
        let raw: Value = serde_json::from_str(r#"{"version": 2}"#).unwrap();
        assert!(parse_entries(&raw).is_empty());
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fodmap.json");
        let ds = dataset(vec![entry("onion", FodmapRating::High)]);
        write_cache(&path, &ds).unwrap();
        let loaded = read_cache(&path).unwrap().unwrap();
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].name, "onion");
    }
}
