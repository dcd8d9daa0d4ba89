//! Nutri-Score calculation
//!
//! Negative points come from ascending tables (energy, saturated fat, sugars,
//! salt): the first step whose upper bound holds the value gives the points,
//! and anything above the last step gets the table maximum. Positive points
//! (fiber, protein) come from descending `value >= min` tables and are
//! subtracted from the total.

use serde::Serialize;

use crate::models::{NutriScoreGrade, NutritionProfile};

/// Upper bounds for 0, 1, 2, ... points; over the last bound scores `len()`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscendingTable(pub &'static [f64]);

impl AscendingTable {
    pub fn points(&self, value: f64) -> i32 {
        self.0
            .iter()
            .position(|max| value <= *max)
            .unwrap_or(self.0.len()) as i32
    }
}

/// `(minimum, points)` rows, highest minimum first; below every row scores 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescendingTable(pub &'static [(f64, i32)]);

impl DescendingTable {
    pub fn points(&self, value: f64) -> i32 {
        self.0
            .iter()
            .find(|(min, _)| value >= *min)
            .map(|(_, points)| *points)
            .unwrap_or(0)
    }
}

/// Point tables for every nutrient
#[derive(Debug, Clone, PartialEq)]
pub struct NutriScoreTables {
    pub energy_kcal: AscendingTable,
    pub saturated_fat: AscendingTable,
    pub sugars: AscendingTable,
    pub salt: AscendingTable,
    pub fiber: DescendingTable,
    pub proteins: DescendingTable,
}

impl Default for NutriScoreTables {
    fn default() -> Self {
        Self {
            energy_kcal: AscendingTable(&[80.0, 160.0, 240.0, 320.0, 400.0, 480.0, 560.0, 640.0, 720.0, 800.0]),
            saturated_fat: AscendingTable(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]),
            sugars: AscendingTable(&[4.5, 9.0, 13.5, 18.0, 22.5, 27.0, 31.0, 36.0, 40.0, 45.0]),
            salt: AscendingTable(&[0.225, 0.45, 0.675, 0.9, 1.125, 1.35, 1.575, 1.8, 2.025, 2.25]),
            fiber: DescendingTable(&[(4.7, 5), (3.7, 4), (2.8, 3), (1.9, 2), (0.9, 1)]),
            proteins: DescendingTable(&[(8.0, 5), (6.4, 4), (4.8, 3), (3.2, 2), (1.6, 1)]),
        }
    }
}

/// Per-nutrient points behind a Nutri-Score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NutriScoreBreakdown {
    pub energy: i32,
    pub saturated_fat: i32,
    pub sugars: i32,
    pub salt: i32,
    pub fiber: i32,
    pub proteins: i32,
    pub total: i32,
    pub grade: NutriScoreGrade,
}

#[derive(Debug, Clone, Default)]
pub struct NutriScoreCalculator {
    tables: NutriScoreTables,
}

impl NutriScoreCalculator {
    pub fn new(tables: NutriScoreTables) -> Self {
        Self { tables }
    }

    /// Point breakdown. Missing nutrients contribute nothing; salt falls
    /// back to declared sodium.
    pub fn breakdown(&self, profile: &NutritionProfile) -> NutriScoreBreakdown {
        let t = &self.tables;
        let energy = profile.energy_kcal.map_or(0, |v| t.energy_kcal.points(v));
        let saturated_fat = profile.saturated_fat.map_or(0, |v| t.saturated_fat.points(v));
        let sugars = profile.sugars.map_or(0, |v| t.sugars.points(v));
        let salt = profile.salt_or_from_sodium().map_or(0, |v| t.salt.points(v));
        let fiber = profile.fiber.map_or(0, |v| t.fiber.points(v));
        let proteins = profile.proteins.map_or(0, |v| t.proteins.points(v));

        let total = energy + saturated_fat + sugars + salt - fiber - proteins;
        NutriScoreBreakdown {
            energy,
            saturated_fat,
            sugars,
            salt,
            fiber,
            proteins,
            total,
            grade: Self::grade(total),
        }
    }

    pub fn points(&self, profile: &NutritionProfile) -> i32 {
        self.breakdown(profile).total
    }

    /// Map a point total to a letter; totals outside every range are E
    pub fn grade(points: i32) -> NutriScoreGrade {
        match points {
            -15..=-1 => NutriScoreGrade::A,
            0..=2 => NutriScoreGrade::B,
            3..=10 => NutriScoreGrade::C,
            11..=18 => NutriScoreGrade::D,
            _ => NutriScoreGrade::E,
        }
    }

    pub fn calculate(&self, profile: &NutritionProfile) -> NutriScoreGrade {
        Self::grade(self.points(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc() -> NutriScoreCalculator {
        NutriScoreCalculator::default()
    }

    #[test]
    fn test_ascending_table() {
        let t = NutriScoreTables::default();
        assert_eq!(t.sugars.points(0.0), 0);
        assert_eq!(t.sugars.points(4.5), 0);
        assert_eq!(t.sugars.points(4.6), 1);
        assert_eq!(t.sugars.points(45.0), 9);
        assert_eq!(t.sugars.points(90.0), 10);
    }

    #[test]
    fn test_descending_table() {
        let t = NutriScoreTables::default();
        assert_eq!(t.fiber.points(0.5), 0);
        assert_eq!(t.fiber.points(0.9), 1);
        assert_eq!(t.fiber.points(4.7), 5);
        assert_eq!(t.fiber.points(20.0), 5);
        assert_eq!(t.proteins.points(7.0), 4);
    }

    #[test]
    fn test_grade_ranges() {
        assert_eq!(NutriScoreCalculator::grade(-15), NutriScoreGrade::A);
        assert_eq!(NutriScoreCalculator::grade(-1), NutriScoreGrade::A);
        assert_eq!(NutriScoreCalculator::grade(0), NutriScoreGrade::B);
        assert_eq!(NutriScoreCalculator::grade(2), NutriScoreGrade::B);
        assert_eq!(NutriScoreCalculator::grade(3), NutriScoreGrade::C);
        assert_eq!(NutriScoreCalculator::grade(10), NutriScoreGrade::C);
        assert_eq!(NutriScoreCalculator::grade(11), NutriScoreGrade::D);
        assert_eq!(NutriScoreCalculator::grade(18), NutriScoreGrade::D);
        assert_eq!(NutriScoreCalculator::grade(19), NutriScoreGrade::E);
        assert_eq!(NutriScoreCalculator::grade(40), NutriScoreGrade::E);
        assert_eq!(NutriScoreCalculator::grade(-16), NutriScoreGrade::E);
        assert_eq!(NutriScoreCalculator::grade(41), NutriScoreGrade::E);
    }

    #[test]
    fn test_wholesome_product_is_a() {
        let oats = NutritionProfile {
            energy_kcal: Some(370.0),
            saturated_fat: Some(1.2),
            sugars: Some(1.0),
            salt: Some(0.01),
            fiber: Some(10.0),
            proteins: Some(13.0),
            ..Default::default()
        };
        let b = calc().breakdown(&oats);
        // 4 + 1 + 0 + 0 - 5 - 5
        assert_eq!(b.total, -5);
        assert_eq!(b.grade, NutriScoreGrade::A);
    }

    #[test]
    fn test_junk_product_is_e() {
        let candy = NutritionProfile {
            energy_kcal: Some(540.0),
            saturated_fat: Some(18.0),
            sugars: Some(56.0),
            salt: Some(0.2),
            fiber: Some(1.0),
            proteins: Some(5.0),
            ..Default::default()
        };
        // 6 + 10 + 10 + 0 - 1 - 3
        assert_eq!(calc().points(&candy), 22);
        assert_eq!(calc().calculate(&candy), NutriScoreGrade::E);
    }

    #[test]
    fn test_salt_from_sodium() {
        let profile = NutritionProfile {
            sodium: Some(0.8), // 2g salt
            ..Default::default()
        };
        assert_eq!(calc().breakdown(&profile).salt, 8);
    }

    #[test]
    fn test_empty_profile() {
        let b = calc().breakdown(&NutritionProfile::default());
        assert_eq!(b.total, 0);
        assert_eq!(b.grade, NutriScoreGrade::B);
    }
}
