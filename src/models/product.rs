//! Product record supplied to the scoring engine

use serde::{Deserialize, Serialize};

use super::{AdditiveRef, NutritionProfile};

/// Processing classification (NOVA-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingLevel {
    Unprocessed,
    CulinaryIngredient,
    Processed,
    UltraProcessed,
}

impl ProcessingLevel {
    /// Map a 1-4 code; anything else is not a processing level
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ProcessingLevel::Unprocessed),
            2 => Some(ProcessingLevel::CulinaryIngredient),
            3 => Some(ProcessingLevel::Processed),
            4 => Some(ProcessingLevel::UltraProcessed),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ProcessingLevel::Unprocessed => 1,
            ProcessingLevel::CulinaryIngredient => 2,
            ProcessingLevel::Processed => 3,
            ProcessingLevel::UltraProcessed => 4,
        }
    }
}

/// A packaged-food record as handed over by the fetch/cache layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additives: Option<Vec<AdditiveRef>>,
    /// Raw processing code; values outside 1-4 are ignored by the engine
    #[serde(alias = "processingLevel", skip_serializing_if = "Option::is_none")]
    pub processing_level: Option<u8>,
    /// Externally supplied Nutri-Score letter
    #[serde(alias = "nutriScore", skip_serializing_if = "Option::is_none")]
    pub nutri_score: Option<String>,
}

impl ProductRecord {
    pub fn additives(&self) -> &[AdditiveRef] {
        self.additives.as_deref().unwrap_or(&[])
    }

    pub fn processing(&self) -> Option<ProcessingLevel> {
        self.processing_level.and_then(ProcessingLevel::from_code)
    }
}
