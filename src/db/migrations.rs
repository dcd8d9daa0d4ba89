//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Highest applied migration, 0 for a fresh database
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migration v1: score cache
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PRODUCT SCORES
        -- Last engine result per barcode, with the input it was computed from
        -- ============================================
        CREATE TABLE product_scores (
            barcode TEXT PRIMARY KEY,
            product_name TEXT,
            brand TEXT,

            -- Denormalized for listing and filtering
            score INTEGER NOT NULL CHECK(score BETWEEN 0 AND 100),
            grade TEXT NOT NULL CHECK(grade IN ('excellent', 'good', 'moderate', 'poor', 'avoid')),

            input_json TEXT NOT NULL,            -- ProductRecord
            result_json TEXT NOT NULL,           -- HealthScoreResult
            computed_at TEXT NOT NULL            -- RFC 3339 UTC, e.g. 2026-01-13T08:30:00Z
        );

        CREATE INDEX idx_product_scores_grade ON product_scores(grade);
        CREATE INDEX idx_product_scores_computed_at ON product_scores(computed_at);
        "#,
    )?;
    Ok(())
}
