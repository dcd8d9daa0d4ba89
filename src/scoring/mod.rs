//! Product health scoring engine
//!
//! Pure, synchronous rule evaluation over a [`ProductRecord`]. The leaf
//! evaluators each return a [`ScoreContribution`]; [`ScoreAggregator`] folds
//! them into a [`HealthScoreResult`]. Nothing in here performs I/O or keeps
//! state between calls, so a single aggregator can be shared across tasks.
//!
//! [`ProductRecord`]: crate::models::ProductRecord
//! [`HealthScoreResult`]: crate::models::HealthScoreResult

pub mod additives;
pub mod aggregator;
pub mod knowledge_base;
pub mod nutrients;
pub mod nutriscore;
pub mod processing;
pub mod views;

use crate::models::Reason;

pub use additives::{
    AdditiveRiskAssessor, AdditiveRiskReport, AssessedAdditive, CombinationWarning, ConcernCounts,
};
pub use aggregator::ScoreAggregator;
pub use knowledge_base::{numeric_part, AdditiveKey, AdditiveKnowledgeBase, CombinationRule};
pub use nutrients::{Direction, Nutrient, NutrientEvaluator, NutrientThresholds, TierBounds};
pub use nutriscore::{NutriScoreBreakdown, NutriScoreCalculator, NutriScoreTables};
pub use processing::{ProcessingClassifier, ProcessingOutcome};
pub use views::{KnowledgeBaseStats, KnowledgeBaseViews, ViewCacheStats, ViewKey};

/// Score delta plus the reasons and warnings that explain it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreContribution {
    pub delta: i32,
    pub reasons: Vec<Reason>,
    pub warnings: Vec<String>,
}

impl ScoreContribution {
    /// Record a reason and add its impact to the delta
    pub fn push(&mut self, reason: Reason) {
        self.delta += reason.impact;
        self.reasons.push(reason);
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn is_empty(&self) -> bool {
        self.delta == 0 && self.reasons.is_empty() && self.warnings.is_empty()
    }
}

/// Format a gram value for reason text ("30g", "2.5g")
pub(crate) fn grams(value: f64) -> String {
    format!("{}g", (value * 100.0).round() / 100.0)
}
