//! Nutrition profile of a packaged product
//!
//! Values are per 100 g (or 100 ml for drinks). Every field is independently
//! optional: `None` means the value was not declared, which is different from
//! a measured zero.

use serde::{Deserialize, Serialize};

/// Nutrient values per 100 g/100 ml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionProfile {
    #[serde(alias = "energy", alias = "energyKcal", skip_serializing_if = "Option::is_none")]
    pub energy_kcal: Option<f64>, // kcal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>, // grams
    #[serde(alias = "saturatedFat", skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>, // grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<f64>, // grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugars: Option<f64>, // grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>, // grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proteins: Option<f64>, // grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<f64>, // grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>, // grams
}

/// Grams of salt per gram of sodium
pub const SALT_PER_SODIUM: f64 = 2.5;

impl NutritionProfile {
    /// True when no nutrient is declared at all
    pub fn is_empty(&self) -> bool {
        self.energy_kcal.is_none()
            && self.fat.is_none()
            && self.saturated_fat.is_none()
            && self.carbohydrates.is_none()
            && self.sugars.is_none()
            && self.fiber.is_none()
            && self.proteins.is_none()
            && self.salt.is_none()
            && self.sodium.is_none()
    }

    /// Declared salt, or salt derived from declared sodium
    pub fn salt_or_from_sodium(&self) -> Option<f64> {
        self.salt.or_else(|| self.sodium.map(|na| na * SALT_PER_SODIUM))
    }
}
