//! Re-run the scoring engine over every cached product
//! Usage: cargo run --bin rescore_cached -- [--dry-run]
//!
//! Stored inputs are re-scored in place. Timestamps are left alone, so rows
//! still expire on the schedule of their last catalog fetch.

use shelfscore::config::ServerConfig;
use shelfscore::db::{migrations, Database};
use shelfscore::scoring::ScoreAggregator;
use shelfscore::tools::products::rescore_cached;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dry_run = std::env::args().any(|a| a == "--dry-run");

    let config = ServerConfig::from_env();
    println!("Database: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| migrations::run_migrations(conn))?;

    let summary = rescore_cached(&database, &ScoreAggregator::default(), dry_run)?;

    println!("Found {} cached products", summary.examined);
    for entry in &summary.changed {
        println!(
            "  {}: {} ({}) -> {} ({})",
            entry.barcode,
            entry.old_score,
            entry.old_grade.as_str(),
            entry.new_score,
            entry.new_grade.as_str()
        );
    }

    if dry_run {
        println!("{} of {} results would change (dry run)", summary.changed.len(), summary.examined);
    } else {
        println!("Updated {} of {} results", summary.changed.len(), summary.examined);
    }
    Ok(())
}
