//! Processing level classification

use serde::Serialize;

use crate::models::{ProcessingLevel, Reason};

pub const PROCESSING_CATEGORY: &str = "processing";

/// Warning attached to ultra-processed products
pub const ULTRA_PROCESSED_WARNING: &str =
    "This product is ultra-processed. Diets high in ultra-processed foods are linked to obesity, heart disease and type 2 diabetes";

/// Outcome of classifying one processing level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingOutcome {
    pub level: u8,
    pub delta: i32,
    pub reason: Reason,
    pub warning: Option<String>,
}

/// Maps a 1-4 processing code to a score delta and descriptive text
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessingClassifier;

impl ProcessingClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Fixed description for each level
    pub fn describe(level: ProcessingLevel) -> &'static str {
        match level {
            ProcessingLevel::Unprocessed => {
                "Unprocessed or minimally processed food, close to its natural state"
            }
            ProcessingLevel::CulinaryIngredient => {
                "Processed culinary ingredient such as oil, butter, sugar or salt"
            }
            ProcessingLevel::Processed => {
                "Processed food made by adding salt, sugar or fat to natural foods"
            }
            ProcessingLevel::UltraProcessed => {
                "Ultra-processed product made mostly from industrial ingredients and additives"
            }
        }
    }

    /// Evaluate a raw processing code. Codes outside 1-4 fire nothing.
    pub fn evaluate(&self, code: u8) -> Option<ProcessingOutcome> {
        let level = ProcessingLevel::from_code(code)?;
        let description = Self::describe(level);

        let (reason, warning) = match level {
            ProcessingLevel::Unprocessed => {
                (Reason::positive(PROCESSING_CATEGORY, description, 10), None)
            }
            ProcessingLevel::CulinaryIngredient => {
                (Reason::positive(PROCESSING_CATEGORY, description, 5), None)
            }
            ProcessingLevel::Processed => {
                (Reason::warning(PROCESSING_CATEGORY, description, -10), None)
            }
            ProcessingLevel::UltraProcessed => (
                Reason::negative(PROCESSING_CATEGORY, description, -20),
                Some(ULTRA_PROCESSED_WARNING.to_string()),
            ),
        };

        Some(ProcessingOutcome {
            level: code,
            delta: reason.impact,
            reason,
            warning,
        })
    }
}
