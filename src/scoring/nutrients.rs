//! Nutrient concern classification
//!
//! Classifies individual nutrient values into concern tiers using an
//! injectable threshold table and turns the tiers into score deltas.

use serde::{Deserialize, Serialize};

use super::{grams, ScoreContribution};
use crate::models::{ConcernLevel, NutritionProfile, Reason};

/// Nutrients that have a tier table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Sugars,
    Salt,
    SaturatedFat,
    Fiber,
}

impl Nutrient {
    /// Reason category tag
    pub fn category(&self) -> &'static str {
        match self {
            Nutrient::Sugars => "sugar",
            Nutrient::Salt => "salt",
            Nutrient::SaturatedFat => "saturated_fat",
            Nutrient::Fiber => "fiber",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Nutrient::Fiber => Direction::HigherIsBetter,
            _ => Direction::LowerIsBetter,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Nutrient::Sugars => "sugar",
            Nutrient::Salt => "salt",
            Nutrient::SaturatedFat => "saturated fat",
            Nutrient::Fiber => "fiber",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

/// One row of the threshold table (grams per 100 g)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBounds {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
}

impl TierBounds {
    pub const fn new(low: f64, moderate: f64, high: f64) -> Self {
        Self { low, moderate, high }
    }

    /// Classify a value.
    ///
    /// Lower-is-better: `<= low` is low concern, `<= moderate` moderate,
    /// `<= high` high, anything above very high.
    ///
    /// Higher-is-better reads the columns in reverse: `>= high` is low
    /// concern, `>= moderate` moderate, `>= low` high, anything below very
    /// high. With the default fiber row (10/6/3) that collapses to two tiers:
    /// at least 3 g is low concern, less is very high.
    pub fn classify(&self, value: f64, direction: Direction) -> ConcernLevel {
        match direction {
            Direction::LowerIsBetter => {
                if value <= self.low {
                    ConcernLevel::Low
                } else if value <= self.moderate {
                    ConcernLevel::Moderate
                } else if value <= self.high {
                    ConcernLevel::High
                } else {
                    ConcernLevel::VeryHigh
                }
            }
            Direction::HigherIsBetter => {
                if value >= self.high {
                    ConcernLevel::Low
                } else if value >= self.moderate {
                    ConcernLevel::Moderate
                } else if value >= self.low {
                    ConcernLevel::High
                } else {
                    ConcernLevel::VeryHigh
                }
            }
        }
    }
}

/// Threshold table for every tiered nutrient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientThresholds {
    pub sugars: TierBounds,
    pub salt: TierBounds,
    pub saturated_fat: TierBounds,
    pub fiber: TierBounds,
    /// Protein above this many grams earns a bonus
    pub protein_bonus_above: f64,
}

impl Default for NutrientThresholds {
    fn default() -> Self {
        Self {
            sugars: TierBounds::new(5.0, 15.0, 22.5),
            salt: TierBounds::new(0.3, 1.2, 2.4),
            saturated_fat: TierBounds::new(1.5, 5.0, 10.0),
            fiber: TierBounds::new(10.0, 6.0, 3.0),
            protein_bonus_above: 10.0,
        }
    }
}

impl NutrientThresholds {
    pub fn bounds(&self, nutrient: Nutrient) -> &TierBounds {
        match nutrient {
            Nutrient::Sugars => &self.sugars,
            Nutrient::Salt => &self.salt,
            Nutrient::SaturatedFat => &self.saturated_fat,
            Nutrient::Fiber => &self.fiber,
        }
    }
}

const SUGAR_SALT_LOW_BONUS: i32 = 5;
const SUGAR_SALT_HIGH_PENALTY: i32 = -10;
const SUGAR_SALT_VERY_HIGH_PENALTY: i32 = -15;
const SATURATED_FAT_HIGH_PENALTY: i32 = -8;
const SATURATED_FAT_VERY_HIGH_PENALTY: i32 = -12;
const FIBER_RICH_BONUS: i32 = 8;
const FIBER_POOR_PENALTY: i32 = -5;
const PROTEIN_BONUS: i32 = 5;

/// Evaluates a nutrition profile against the threshold table
#[derive(Debug, Clone, Default)]
pub struct NutrientEvaluator {
    thresholds: NutrientThresholds,
}

impl NutrientEvaluator {
    pub fn new(thresholds: NutrientThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &NutrientThresholds {
        &self.thresholds
    }

    pub fn classify(&self, nutrient: Nutrient, value: f64) -> ConcernLevel {
        self.thresholds
            .bounds(nutrient)
            .classify(value, nutrient.direction())
    }

    /// Evaluate every declared nutrient. Absent values fire nothing.
    pub fn evaluate_all(&self, profile: &NutritionProfile) -> ScoreContribution {
        let mut out = ScoreContribution::default();

        if let Some(sugars) = profile.sugars {
            self.evaluate_sugar_or_salt(Nutrient::Sugars, sugars, &mut out);
        }
        if let Some(salt) = profile.salt {
            self.evaluate_sugar_or_salt(Nutrient::Salt, salt, &mut out);
        }
        if let Some(saturated_fat) = profile.saturated_fat {
            let nutrient = Nutrient::SaturatedFat;
            match self.classify(nutrient, saturated_fat) {
                ConcernLevel::High => out.push(Reason::negative(
                    nutrient.category(),
                    format!("High saturated fat content ({} per 100g)", grams(saturated_fat)),
                    SATURATED_FAT_HIGH_PENALTY,
                )),
                ConcernLevel::VeryHigh => out.push(Reason::negative(
                    nutrient.category(),
                    format!("Very high saturated fat content ({} per 100g)", grams(saturated_fat)),
                    SATURATED_FAT_VERY_HIGH_PENALTY,
                )),
                ConcernLevel::Low | ConcernLevel::Moderate => {}
            }
        }
        if let Some(fiber) = profile.fiber {
            let nutrient = Nutrient::Fiber;
            match self.classify(nutrient, fiber) {
                ConcernLevel::Low => out.push(Reason::positive(
                    nutrient.category(),
                    format!("Good source of fiber ({} per 100g)", grams(fiber)),
                    FIBER_RICH_BONUS,
                )),
                ConcernLevel::VeryHigh => out.push(Reason::negative(
                    nutrient.category(),
                    format!("Low fiber content ({} per 100g)", grams(fiber)),
                    FIBER_POOR_PENALTY,
                )),
                ConcernLevel::Moderate | ConcernLevel::High => {}
            }
        }
        if let Some(proteins) = profile.proteins {
            if proteins > self.thresholds.protein_bonus_above {
                out.push(Reason::positive(
                    "protein",
                    format!("High protein content ({} per 100g)", grams(proteins)),
                    PROTEIN_BONUS,
                ));
            }
        }

        tracing::debug!(delta = out.delta, reasons = out.reasons.len(), "Evaluated nutrients");
        out
    }

    fn evaluate_sugar_or_salt(&self, nutrient: Nutrient, value: f64, out: &mut ScoreContribution) {
        let label = nutrient.label();
        match self.classify(nutrient, value) {
            ConcernLevel::Low => out.push(Reason::positive(
                nutrient.category(),
                format!("Low {} content ({} per 100g)", label, grams(value)),
                SUGAR_SALT_LOW_BONUS,
            )),
            ConcernLevel::Moderate => {}
            ConcernLevel::High => out.push(Reason::negative(
                nutrient.category(),
                format!("High {} content ({} per 100g)", label, grams(value)),
                SUGAR_SALT_HIGH_PENALTY,
            )),
            ConcernLevel::VeryHigh => out.push(Reason::negative(
                nutrient.category(),
                format!("Very high {} content ({} per 100g)", label, grams(value)),
                SUGAR_SALT_VERY_HIGH_PENALTY,
            )),
        }
    }
}
