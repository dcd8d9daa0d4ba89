//! Shelfscore Status Tool
//!
//! Runtime status of the service and the usage guide for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Scoring guide for AI assistants
pub const SCORING_INSTRUCTIONS: &str = r#"
# Shelfscore: Packaged Food Health Scoring

Shelfscore rates a packaged food product from 0 to 100 and explains why.
Every score is deterministic: the same product record always yields the
same result.

## Tools at a glance

| Tool | Use it to |
|------|-----------|
| `analyze_product` | Score a product record you already have (nothing is stored) |
| `score_barcode` | Look a product up by barcode, score it and cache the result |
| `get_cached_score` | Read a cached result and see how old it is |
| `list_cached_scores` | Page through cached results, optionally by grade |
| `delete_cached_score` | Remove one cached result |
| `purge_stale_scores` | Remove every cached result older than the freshness window |
| `lookup_additive` | Explain one additive code (E-number) |
| `assess_additives` | Risk report for a list of additive codes, including known combinations |
| `list_additive_categories` | Browse the additive database by category |
| `additive_statistics` | Counts of additives by concern level and category |
| `clear_view_cache` | Drop the memoized additive views |
| `shelfscore_status` | Build, database and process information |

## Product record format

All fields are optional. Nutrient values are per 100 g (or 100 ml).

```json
{
  "nutrition": {
    "energy_kcal": 250,
    "sugars": 12.5,
    "salt": 0.8,
    "saturated_fat": 3.1,
    "fiber": 2.4,
    "proteins": 6.0
  },
  "additives": [{"code": "E330"}, {"code": "E621"}],
  "processing_level": 3,
  "nutri_score": "C"
}
```

- A missing nutrient is not evaluated. It is never treated as zero.
- `processing_level` is the NOVA group: 1 minimally processed, 2 culinary
  ingredient, 3 processed, 4 ultra-processed.
- `nutri_score` is optional. When absent (or not a letter A-E) it is computed
  from the nutrition values.
- camelCase keys (`processingLevel`, `nutriScore`, `saturatedFat`) are accepted.

## How the score is built

Start at 100, then:

| Factor | Effect |
|--------|--------|
| Sugars | 5 g or less: +5, above 15 g: -10, above 22.5 g: -15 |
| Salt | 0.3 g or less: +5, above 1.2 g: -10, above 2.4 g: -15 |
| Saturated fat | above 5 g: -8, above 10 g: -12 |
| Fiber | 3 g or more: +8, below 3 g: -5 |
| Protein | above 10 g: +5 |
| Each additive | low -1, moderate -3, high -5, very high -8, unknown -2 |
| Processing | level 1: +10, 2: +5, 3: -10, 4: -20 |

The total is clamped to 0-100 and graded:

| Score | Grade |
|-------|-------|
| 80-100 | excellent |
| 65-79 | good |
| 50-64 | moderate |
| 35-49 | poor |
| 0-34 | avoid |

Each rule that fires adds a reason with its signed impact. High and very high
concern additives and ultra-processing also add warnings.

## Barcodes and caching

- Barcodes are 8 to 14 digits (EAN-8, UPC-A, EAN-13, GTIN-14).
- `score_barcode` serves a cached result while it is fresh (24 hours by
  default) and otherwise fetches the product from the catalog. Pass
  `force_refresh: true` to always fetch.
- A product missing from the catalog is reported as an error. Score it with
  `analyze_product` instead if you have the label values.

## Additive risk reports

`assess_additives` goes further than the composite score:

- `overall_risk` is the weighted concern (low 1, moderate 2, high 3,
  very high 4) divided by the maximum possible, from 0.0 to 1.0.
- `risk_level` buckets it: 0.75 and above very high, 0.5 high, 0.25 moderate.
- `combinations` lists known problematic pairings (for example sodium
  benzoate with ascorbic acid). Their penalty is reported separately and
  does not change the composite score.
- Unknown codes are listed in `unknown_codes` and excluded from the weights.

## Presenting results

- Lead with the score and grade, then the two or three largest impacts.
- Quote warnings verbatim.
- Recommendations are ordered: a general sentence first, then specific
  follow-ups.
"#;

/// Runtime status of the shelfscore service
#[derive(Debug, Clone, Serialize)]
pub struct ShelfscoreStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub cached_scores: Option<i64>,

    /// Engine information
    pub additive_entries: usize,
    pub view_cache_entries: usize,
    pub catalog_url: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Values the tracker cannot see on its own
#[derive(Debug, Clone, Default)]
pub struct StatusInputs {
    pub cached_scores: Option<i64>,
    pub additive_entries: usize,
    pub view_cache_entries: usize,
    pub catalog_url: String,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self, inputs: StatusInputs) -> ShelfscoreStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ShelfscoreStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            cached_scores: inputs.cached_scores,
            additive_entries: inputs.additive_entries,
            view_cache_entries: inputs.view_cache_entries,
            catalog_url: inputs.catalog_url,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_inputs() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/shelfscore.db"));
        let status = tracker.get_status(StatusInputs {
            cached_scores: Some(3),
            additive_entries: 49,
            view_cache_entries: 2,
            catalog_url: "http://localhost".to_string(),
        });
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.cached_scores, Some(3));
        assert_eq!(status.additive_entries, 49);
        assert_eq!(status.process_id, std::process::id());
    }

    #[test]
    fn test_instructions_cover_every_tool() {
        for tool in [
            "analyze_product",
            "score_barcode",
            "get_cached_score",
            "list_cached_scores",
            "delete_cached_score",
            "purge_stale_scores",
            "lookup_additive",
            "assess_additives",
            "list_additive_categories",
            "additive_statistics",
            "clear_view_cache",
            "shelfscore_status",
        ] {
            assert!(SCORING_INSTRUCTIONS.contains(tool), "missing {}", tool);
        }
    }
}
