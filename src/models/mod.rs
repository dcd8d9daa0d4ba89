//! Data models
//!
//! Product inputs, additive reference data, score results and cached rows.

mod additive;
mod nutrition;
mod product;
mod product_score;
mod score;

pub use additive::{normalize_code, AdditiveInfo, AdditiveRef, ConcernLevel};
pub use nutrition::{NutritionProfile, SALT_PER_SODIUM};
pub use product::{ProcessingLevel, ProductRecord};
pub use product_score::{format_timestamp, StoredScore, StoredScoreCreate};
pub use score::{Grade, HealthScoreResult, NutriScoreGrade, Reason, ReasonType};
