//! Stored score model
//!
//! One cached engine result per barcode, together with the product record
//! it was computed from so it can be re-scored later.

use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{Grade, HealthScoreResult, ProductRecord};
use crate::db::{DbError, DbResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a UTC instant the way `computed_at` is stored
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// A cached score row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScore {
    pub barcode: String,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub score: u8,
    pub grade: Grade,
    pub input: ProductRecord,
    pub result: HealthScoreResult,
    pub computed_at: String,
}

/// Data for inserting or replacing a cached score
#[derive(Debug, Clone)]
pub struct StoredScoreCreate {
    pub barcode: String,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub input: ProductRecord,
    pub result: HealthScoreResult,
    pub computed_at: DateTime<Utc>,
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row, idx: &str) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        let pos = row.as_ref().column_index(idx).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(pos, Type::Text, Box::new(e))
    })
}

impl StoredScore {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let grade_raw: String = row.get("grade")?;
        let grade = Grade::from_str(&grade_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                row.as_ref().column_index("grade").unwrap_or(0),
                Type::Text,
                format!("unknown grade '{}'", grade_raw).into(),
            )
        })?;

        Ok(Self {
            barcode: row.get("barcode")?,
            product_name: row.get("product_name")?,
            brand: row.get("brand")?,
            score: row.get("score")?,
            grade,
            input: json_column(row, "input_json")?,
            result: json_column(row, "result_json")?,
            computed_at: row.get("computed_at")?,
        })
    }

    /// Insert or replace the cached score for a barcode
    pub fn upsert(conn: &Connection, data: &StoredScoreCreate) -> DbResult<Self> {
        let input_json = serde_json::to_string(&data.input)?;
        let result_json = serde_json::to_string(&data.result)?;

        conn.execute(
            r#"
            INSERT INTO product_scores (
                barcode, product_name, brand, score, grade, input_json, result_json, computed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(barcode) DO UPDATE SET
                product_name = excluded.product_name,
                brand = excluded.brand,
                score = excluded.score,
                grade = excluded.grade,
                input_json = excluded.input_json,
                result_json = excluded.result_json,
                computed_at = excluded.computed_at
            "#,
            params![
                data.barcode,
                data.product_name,
                data.brand,
                data.result.score,
                data.result.grade.as_str(),
                input_json,
                result_json,
                format_timestamp(data.computed_at),
            ],
        )?;

        Self::get(conn, &data.barcode)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get(conn: &Connection, barcode: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM product_scores WHERE barcode = ?1")?;

        match stmt.query_row([barcode], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List cached scores, newest first, optionally filtered by grade
    pub fn list(
        conn: &Connection,
        grade: Option<Grade>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let items = if let Some(grade) = grade {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM product_scores
                WHERE grade = ?1
                ORDER BY computed_at DESC, barcode ASC
                LIMIT ?2 OFFSET ?3
                "#,
            )?;
            let rows = stmt
                .query_map(params![grade.as_str(), limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        } else {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM product_scores
                ORDER BY computed_at DESC, barcode ASC
                LIMIT ?1 OFFSET ?2
                "#,
            )?;
            let rows = stmt
                .query_map(params![limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        Ok(items)
    }

    pub fn count(conn: &Connection, grade: Option<Grade>) -> DbResult<i64> {
        let count: i64 = if let Some(grade) = grade {
            conn.query_row(
                "SELECT COUNT(*) FROM product_scores WHERE grade = ?1",
                [grade.as_str()],
                |row| row.get(0),
            )?
        } else {
            conn.query_row("SELECT COUNT(*) FROM product_scores", [], |row| row.get(0))?
        };
        Ok(count)
    }

    /// Every cached barcode, in key order
    pub fn barcodes(conn: &Connection) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare("SELECT barcode FROM product_scores ORDER BY barcode")?;
        let codes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(codes)
    }

    /// Returns Ok(true) if a row was deleted
    pub fn delete(conn: &Connection, barcode: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM product_scores WHERE barcode = ?1", [barcode])?;
        Ok(rows > 0)
    }

    /// Delete rows computed strictly before `cutoff`; returns how many went
    pub fn delete_older_than(conn: &Connection, cutoff: DateTime<Utc>) -> DbResult<usize> {
        let rows = conn.execute(
            "DELETE FROM product_scores WHERE computed_at < ?1",
            [format_timestamp(cutoff)],
        )?;
        Ok(rows)
    }

    pub fn computed_at_utc(&self) -> DbResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.computed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DbError::Timestamp(format!("{}: {}", self.computed_at, e)))
    }

    /// Whether the row is at most `max_age` old at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match self.computed_at_utc() {
            Ok(at) => now - at <= max_age,
            Err(e) => {
                tracing::warn!("Treating cached score for {} as stale: {}", self.barcode, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{NutritionProfile, ProductRecord};
    use crate::scoring::ScoreAggregator;
    use chrono::TimeZone;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn create(barcode: &str, sugars: f64, at: DateTime<Utc>) -> StoredScoreCreate {
        let input = ProductRecord {
            nutrition: Some(NutritionProfile {
                sugars: Some(sugars),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = ScoreAggregator::default().analyze(&input);
        StoredScoreCreate {
            barcode: barcode.to_string(),
            product_name: Some("Test bar".to_string()),
            brand: None,
            input,
            result,
            computed_at: at,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 13, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_upsert_and_get() {
        let conn = setup();
        let stored = StoredScore::upsert(&conn, &create("3017620422003", 2.0, at(8))).unwrap();
        assert_eq!(stored.score, 100);
        assert_eq!(stored.grade, Grade::Excellent);
        assert_eq!(stored.computed_at, "2026-01-13T08:00:00Z");

        let fetched = StoredScore::get(&conn, "3017620422003").unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert!(StoredScore::get(&conn, "0000000000000").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces() {
        let conn = setup();
        StoredScore::upsert(&conn, &create("12345678", 2.0, at(8))).unwrap();
        let replaced = StoredScore::upsert(&conn, &create("12345678", 30.0, at(9))).unwrap();
        assert_eq!(replaced.score, 85);
        assert_eq!(StoredScore::count(&conn, None).unwrap(), 1);
    }

    #[test]
    fn test_list_filters_by_grade() {
        let conn = setup();
        StoredScore::upsert(&conn, &create("11111111", 2.0, at(8))).unwrap();
        StoredScore::upsert(&conn, &create("22222222", 30.0, at(9))).unwrap();

        let all = StoredScore::list(&conn, None, 10, 0).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].barcode, "22222222");

        let good = StoredScore::list(&conn, Some(Grade::Good), 10, 0).unwrap();
        assert_eq!(good.len(), 1);
        assert_eq!(StoredScore::count(&conn, Some(Grade::Excellent)).unwrap(), 1);
    }

    #[test]
    fn test_delete_and_purge() {
        let conn = setup();
        StoredScore::upsert(&conn, &create("11111111", 2.0, at(8))).unwrap();
        StoredScore::upsert(&conn, &create("22222222", 2.0, at(12))).unwrap();

        assert_eq!(StoredScore::delete_older_than(&conn, at(10)).unwrap(), 1);
        assert_eq!(StoredScore::barcodes(&conn).unwrap(), vec!["22222222"]);

        assert!(StoredScore::delete(&conn, "22222222").unwrap());
        assert!(!StoredScore::delete(&conn, "22222222").unwrap());
    }

    #[test]
    fn test_freshness() {
        let conn = setup();
        let stored = StoredScore::upsert(&conn, &create("11111111", 2.0, at(8))).unwrap();
        assert!(stored.is_fresh(at(9), Duration::hours(24)));
        assert!(!stored.is_fresh(at(9), Duration::minutes(30)));
    }
}
