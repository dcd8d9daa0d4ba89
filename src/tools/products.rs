//! Product scoring tools
//!
//! Inline analysis, barcode scoring through the catalog, and the cached
//! score store.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::catalog::{CatalogClient, CatalogProduct};
use crate::db::Database;
use crate::models::{
    format_timestamp, Grade, HealthScoreResult, ProductRecord, StoredScore, StoredScoreCreate,
};
use crate::scoring::{NutriScoreBreakdown, ScoreAggregator};

/// Response for analyze_product
#[derive(Debug, Serialize)]
pub struct AnalyzeProductResponse {
    pub result: HealthScoreResult,
    /// Point breakdown when nutrition was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutri_score_points: Option<NutriScoreBreakdown>,
}

/// Where a score_barcode result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Cache,
    Catalog,
}

/// Response for score_barcode and get_cached_score
#[derive(Debug, Serialize)]
pub struct CachedScoreDetail {
    pub barcode: String,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub source: ScoreSource,
    pub computed_at: String,
    pub age_seconds: Option<i64>,
    pub fresh: bool,
    pub result: HealthScoreResult,
}

impl CachedScoreDetail {
    fn from_stored(stored: StoredScore, source: ScoreSource, now: DateTime<Utc>, max_age: Duration) -> Self {
        let age_seconds = stored
            .computed_at_utc()
            .ok()
            .map(|at| (now - at).num_seconds());
        let fresh = stored.is_fresh(now, max_age);
        Self {
            barcode: stored.barcode,
            product_name: stored.product_name,
            brand: stored.brand,
            source,
            computed_at: stored.computed_at,
            age_seconds,
            fresh,
            result: stored.result,
        }
    }
}

/// Summary of a cached score for list results
#[derive(Debug, Serialize)]
pub struct CachedScoreSummary {
    pub barcode: String,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub score: u8,
    pub grade: Grade,
    pub computed_at: String,
}

impl From<&StoredScore> for CachedScoreSummary {
    fn from(stored: &StoredScore) -> Self {
        Self {
            barcode: stored.barcode.clone(),
            product_name: stored.product_name.clone(),
            brand: stored.brand.clone(),
            score: stored.score,
            grade: stored.grade,
            computed_at: stored.computed_at.clone(),
        }
    }
}

/// Response for list_cached_scores
#[derive(Debug, Serialize)]
pub struct ListCachedScoresResponse {
    pub items: Vec<CachedScoreSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for delete_cached_score
#[derive(Debug, Serialize)]
pub struct DeleteCachedScoreResponse {
    pub success: bool,
    pub barcode: String,
}

/// Response for purge_stale_scores
#[derive(Debug, Serialize)]
pub struct PurgeStaleScoresResponse {
    pub deleted: usize,
    pub cutoff: String,
    pub remaining: i64,
}

/// Score an inline product record. Nothing is stored.
pub fn analyze_product(scorer: &ScoreAggregator, product: &ProductRecord) -> AnalyzeProductResponse {
    let result = scorer.analyze(product);
    let nutri_score_points = product
        .nutrition
        .as_ref()
        .map(|profile| scorer.nutri_score_calculator().breakdown(profile));

    AnalyzeProductResponse {
        result,
        nutri_score_points,
    }
}

/// Cached result if fresh, otherwise fetch from the catalog, score and store
pub async fn score_barcode(
    db: &Database,
    scorer: &ScoreAggregator,
    catalog: &CatalogClient,
    barcode: &str,
    force_refresh: bool,
    max_age: Duration,
) -> Result<CachedScoreDetail, String> {
    let barcode = crate::catalog::validate_barcode(barcode).map_err(|e| e.to_string())?;
    let now = Utc::now();

    if !force_refresh {
        if let Some(cached) = fresh_cached(db, &barcode, now, max_age)? {
            tracing::debug!("Serving cached score for {}", barcode);
            return Ok(CachedScoreDetail::from_stored(cached, ScoreSource::Cache, now, max_age));
        }
    }

    let product = catalog.fetch(&barcode).await.map_err(|e| e.to_string())?;
    let stored = score_and_store(db, scorer, product, now)?;
    Ok(CachedScoreDetail::from_stored(stored, ScoreSource::Catalog, now, max_age))
}

/// Stored score for `barcode` when it is still within `max_age`
pub fn fresh_cached(
    db: &Database,
    barcode: &str,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Result<Option<StoredScore>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let cached = StoredScore::get(&conn, barcode)
        .map_err(|e| format!("Failed to read cached score: {}", e))?;
    Ok(cached.filter(|stored| stored.is_fresh(now, max_age)))
}

/// Score a catalog product and persist the result
pub fn score_and_store(
    db: &Database,
    scorer: &ScoreAggregator,
    product: CatalogProduct,
    now: DateTime<Utc>,
) -> Result<StoredScore, String> {
    let result = scorer.analyze(&product.record);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let stored = StoredScore::upsert(
        &conn,
        &StoredScoreCreate {
            barcode: product.barcode,
            product_name: product.name,
            brand: product.brand,
            input: product.record,
            result,
            computed_at: now,
        },
    )
    .map_err(|e| format!("Failed to store score: {}", e))?;

    tracing::info!(
        "Stored score {} ({}) for {}",
        stored.score,
        stored.grade.as_str(),
        stored.barcode
    );
    Ok(stored)
}

/// Stored result by barcode, fresh or not
pub fn get_cached_score(
    db: &Database,
    barcode: &str,
    max_age: Duration,
) -> Result<Option<CachedScoreDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let stored = StoredScore::get(&conn, barcode.trim())
        .map_err(|e| format!("Failed to read cached score: {}", e))?;

    let now = Utc::now();
    Ok(stored.map(|s| CachedScoreDetail::from_stored(s, ScoreSource::Cache, now, max_age)))
}

/// List cached scores with optional grade filter and pagination
pub fn list_cached_scores(
    db: &Database,
    grade: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListCachedScoresResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);
    let grade = match grade {
        Some(raw) => Some(Grade::from_str(raw).ok_or_else(|| {
            format!(
                "Unknown grade '{}'. Use one of: excellent, good, moderate, poor, avoid",
                raw
            )
        })?),
        None => None,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = StoredScore::list(&conn, grade, limit, offset)
        .map_err(|e| format!("Failed to list cached scores: {}", e))?;
    let total = StoredScore::count(&conn, grade)
        .map_err(|e| format!("Failed to count cached scores: {}", e))?;

    Ok(ListCachedScoresResponse {
        items: items.iter().map(CachedScoreSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

pub fn delete_cached_score(db: &Database, barcode: &str) -> Result<DeleteCachedScoreResponse, String> {
    let barcode = barcode.trim();
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = StoredScore::delete(&conn, barcode)
        .map_err(|e| format!("Failed to delete cached score: {}", e))?;

    if !deleted {
        return Err(format!("No cached score for barcode {}", barcode));
    }

    Ok(DeleteCachedScoreResponse {
        success: true,
        barcode: barcode.to_string(),
    })
}

/// Remove every result older than the freshness window
pub fn purge_stale_scores(
    db: &Database,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Result<PurgeStaleScoresResponse, String> {
    let cutoff = now - max_age;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = StoredScore::delete_older_than(&conn, cutoff)
        .map_err(|e| format!("Failed to purge cached scores: {}", e))?;
    let remaining = StoredScore::count(&conn, None)
        .map_err(|e| format!("Failed to count cached scores: {}", e))?;

    if deleted > 0 {
        tracing::info!("Purged {} stale cached scores", deleted);
    }

    Ok(PurgeStaleScoresResponse {
        deleted,
        cutoff: format_timestamp(cutoff),
        remaining,
    })
}

/// One stored result whose score changed under the current rules
#[derive(Debug, Clone, Serialize)]
pub struct RescoredEntry {
    pub barcode: String,
    pub old_score: u8,
    pub old_grade: Grade,
    pub new_score: u8,
    pub new_grade: Grade,
}

#[derive(Debug, Serialize)]
pub struct RescoreSummary {
    pub examined: usize,
    pub changed: Vec<RescoredEntry>,
    pub dry_run: bool,
}

/// Re-run the engine over every stored input. Rows keep their original
/// `computed_at`, since the catalog data itself was not refreshed.
pub fn rescore_cached(
    db: &Database,
    scorer: &ScoreAggregator,
    dry_run: bool,
) -> Result<RescoreSummary, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let barcodes = StoredScore::barcodes(&conn)
        .map_err(|e| format!("Failed to list cached scores: {}", e))?;

    let mut changed = Vec::new();
    for barcode in &barcodes {
        let Some(stored) = StoredScore::get(&conn, barcode)
            .map_err(|e| format!("Failed to read cached score: {}", e))?
        else {
            continue;
        };

        let result = scorer.analyze(&stored.input);
        if result == stored.result {
            continue;
        }

        changed.push(RescoredEntry {
            barcode: stored.barcode.clone(),
            old_score: stored.score,
            old_grade: stored.grade,
            new_score: result.score,
            new_grade: result.grade,
        });

        if dry_run {
            continue;
        }

        let computed_at = stored.computed_at_utc().unwrap_or_else(|e| {
            tracing::warn!("Unreadable timestamp on {}, keeping it stale: {}", barcode, e);
            DateTime::<Utc>::default()
        });
        StoredScore::upsert(
            &conn,
            &StoredScoreCreate {
                barcode: stored.barcode,
                product_name: stored.product_name,
                brand: stored.brand,
                input: stored.input,
                result,
                computed_at,
            },
        )
        .map_err(|e| format!("Failed to store score: {}", e))?;
    }

    tracing::info!(
        "Rescored {} cached products, {} changed{}",
        barcodes.len(),
        changed.len(),
        if dry_run { " (dry run)" } else { "" }
    );

    Ok(RescoreSummary {
        examined: barcodes.len(),
        changed,
        dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{AdditiveRef, NutritionProfile};
    use crate::scoring::AdditiveKnowledgeBase;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("scores.db")).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        (dir, db)
    }

    fn catalog_product(barcode: &str) -> CatalogProduct {
        CatalogProduct {
            barcode: barcode.to_string(),
            name: Some("Cola".to_string()),
            brand: Some("Fizz".to_string()),
            record: ProductRecord {
                nutrition: Some(NutritionProfile {
                    sugars: Some(10.6),
                    ..Default::default()
                }),
                additives: Some(vec![AdditiveRef::new("E150d"), AdditiveRef::new("E338")]),
                processing_level: Some(4),
                nutri_score: Some("e".to_string()),
            },
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_analyze_product_includes_breakdown() {
        let scorer = ScoreAggregator::default();
        let response = analyze_product(&scorer, &catalog_product("12345678").record);
        assert!(response.nutri_score_points.is_some());

        let bare = analyze_product(&scorer, &ProductRecord::default());
        assert!(bare.nutri_score_points.is_none());
        assert_eq!(bare.result.score, 100);
    }

    #[test]
    fn test_store_then_serve_fresh() {
        let (_dir, db) = setup();
        let scorer = ScoreAggregator::default();

        let stored = score_and_store(&db, &scorer, catalog_product("5449000000996"), at(8)).unwrap();
        assert_eq!(stored.input.processing_level, Some(4));
        assert_eq!(stored.result, scorer.analyze(&stored.input));

        let hit = fresh_cached(&db, "5449000000996", at(10), Duration::hours(24)).unwrap();
        assert_eq!(hit, Some(stored));

        let stale = fresh_cached(&db, "5449000000996", at(10), Duration::hours(1)).unwrap();
        assert!(stale.is_none());
    }

    #[test]
    fn test_list_and_delete() {
        let (_dir, db) = setup();
        let scorer = ScoreAggregator::default();
        score_and_store(&db, &scorer, catalog_product("11111111"), at(8)).unwrap();
        score_and_store(&db, &scorer, catalog_product("22222222"), at(9)).unwrap();

        let listed = list_cached_scores(&db, None, 10, 0).unwrap();
        assert_eq!(listed.total, 2);
        assert_eq!(listed.items[0].barcode, "22222222");

        assert!(list_cached_scores(&db, Some("great"), 10, 0).is_err());

        delete_cached_score(&db, "11111111").unwrap();
        assert!(delete_cached_score(&db, "11111111").is_err());
        assert_eq!(list_cached_scores(&db, None, 10, 0).unwrap().total, 1);
    }

    #[test]
    fn test_purge_stale_scores() {
        let (_dir, db) = setup();
        let scorer = ScoreAggregator::default();
        score_and_store(&db, &scorer, catalog_product("11111111"), at(1)).unwrap();
        score_and_store(&db, &scorer, catalog_product("22222222"), at(20)).unwrap();

        let purged = purge_stale_scores(&db, at(22), Duration::hours(6)).unwrap();
        assert_eq!(purged.deleted, 1);
        assert_eq!(purged.remaining, 1);
        assert_eq!(purged.cutoff, "2026-03-02T16:00:00Z");
    }

    #[test]
    fn test_rescore_keeps_computed_at() {
        let (_dir, db) = setup();
        let empty_kb = Arc::new(AdditiveKnowledgeBase::new(Vec::new(), Vec::new()));
        let old_rules = ScoreAggregator::new(empty_kb);
        let stored = score_and_store(&db, &old_rules, catalog_product("5449000000996"), at(8)).unwrap();

        let scorer = ScoreAggregator::default();
        let preview = rescore_cached(&db, &scorer, true).unwrap();
        assert_eq!(preview.examined, 1);
        assert_eq!(preview.changed.len(), 1);
        let conn = db.get_conn().unwrap();
        let unchanged = StoredScore::get(&conn, "5449000000996").unwrap().unwrap();
        assert_eq!(unchanged.result, stored.result);
        drop(conn);

        let summary = rescore_cached(&db, &scorer, false).unwrap();
        assert_eq!(summary.changed.len(), 1);

        let conn = db.get_conn().unwrap();
        let rescored = StoredScore::get(&conn, "5449000000996").unwrap().unwrap();
        assert_eq!(rescored.computed_at, stored.computed_at);
        assert_eq!(rescored.score, summary.changed[0].new_score);
        assert!(!rescored.is_fresh(at(8) + Duration::hours(25), Duration::hours(24)));

        let again = rescore_cached(&db, &scorer, false).unwrap();
        assert!(again.changed.is_empty());
    }
}
