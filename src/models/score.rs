//! Health score result model
//!
//! The value produced by the scoring engine. It is plain data: serializable,
//! comparable, and never mutated once built.

use serde::{Deserialize, Serialize};

/// Kind of contribution a reason makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonType {
    Positive,
    Negative,
    Warning,
}

/// One scoring rule's contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    #[serde(rename = "type")]
    pub reason_type: ReasonType,
    pub category: String,
    pub message: String,
    pub impact: i32,
}

impl Reason {
    pub fn positive(category: &str, message: impl Into<String>, impact: i32) -> Self {
        Self::new(ReasonType::Positive, category, message, impact)
    }

    pub fn negative(category: &str, message: impl Into<String>, impact: i32) -> Self {
        Self::new(ReasonType::Negative, category, message, impact)
    }

    pub fn warning(category: &str, message: impl Into<String>, impact: i32) -> Self {
        Self::new(ReasonType::Warning, category, message, impact)
    }

    fn new(reason_type: ReasonType, category: &str, message: impl Into<String>, impact: i32) -> Self {
        Self {
            reason_type,
            category: category.to_string(),
            message: message.into(),
            impact,
        }
    }
}

/// Coarse grade derived from the clamped score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Avoid,
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl Grade {
    pub const ALL: [Grade; 5] = [
        Grade::Excellent,
        Grade::Good,
        Grade::Moderate,
        Grade::Poor,
        Grade::Avoid,
    ];

    /// Grade breakpoints: >=80 excellent, >=65 good, >=50 moderate, >=35 poor
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Grade::Excellent,
            65..=79 => Grade::Good,
            50..=64 => Grade::Moderate,
            35..=49 => Grade::Poor,
            _ => Grade::Avoid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Excellent => "excellent",
            Grade::Good => "good",
            Grade::Moderate => "moderate",
            Grade::Poor => "poor",
            Grade::Avoid => "avoid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "excellent" => Some(Grade::Excellent),
            "good" => Some(Grade::Good),
            "moderate" => Some(Grade::Moderate),
            "poor" => Some(Grade::Poor),
            "avoid" => Some(Grade::Avoid),
            _ => None,
        }
    }
}

/// Nutri-Score letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NutriScoreGrade {
    A,
    B,
    C,
    D,
    E,
}

impl NutriScoreGrade {
    /// Parse an externally supplied letter; "unknown", "not-applicable" and
    /// anything that is not a single A-E letter yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(NutriScoreGrade::A),
            "B" => Some(NutriScoreGrade::B),
            "C" => Some(NutriScoreGrade::C),
            "D" => Some(NutriScoreGrade::D),
            "E" => Some(NutriScoreGrade::E),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NutriScoreGrade::A => "A",
            NutriScoreGrade::B => "B",
            NutriScoreGrade::C => "C",
            NutriScoreGrade::D => "D",
            NutriScoreGrade::E => "E",
        }
    }
}

/// Composite health assessment of one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScoreResult {
    pub score: u8,
    pub grade: Grade,
    pub nutri_score: Option<NutriScoreGrade>,
    pub processing_level: Option<u8>,
    pub reasons: Vec<Reason>,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
}

impl HealthScoreResult {
    /// Sum of all reason impacts (before clamping)
    pub fn total_impact(&self) -> i32 {
        self.reasons.iter().map(|r| r.impact).sum()
    }

    pub fn reasons_in(&self, category: &str) -> impl Iterator<Item = &Reason> {
        let category = category.to_string();
        self.reasons.iter().filter(move |r| r.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_breakpoints() {
        assert_eq!(Grade::from_score(100), Grade::Excellent);
        assert_eq!(Grade::from_score(80), Grade::Excellent);
        assert_eq!(Grade::from_score(79), Grade::Good);
        assert_eq!(Grade::from_score(65), Grade::Good);
        assert_eq!(Grade::from_score(64), Grade::Moderate);
        assert_eq!(Grade::from_score(50), Grade::Moderate);
        assert_eq!(Grade::from_score(49), Grade::Poor);
        assert_eq!(Grade::from_score(35), Grade::Poor);
        assert_eq!(Grade::from_score(34), Grade::Avoid);
        assert_eq!(Grade::from_score(0), Grade::Avoid);
    }

    #[test]
    fn test_grade_is_monotonic() {
        let mut previous = Grade::from_score(0);
        for score in 1..=100u8 {
            let grade = Grade::from_score(score);
            assert!(grade >= previous, "grade dropped at score {}", score);
            previous = grade;
        }
    }

    #[test]
    fn test_reason_serializes_type_field() {
        let reason = Reason::warning("additives", "Unknown additive E999", -2);
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["impact"], -2);
    }

    #[test]
    fn test_nutri_score_parse() {
        assert_eq!(NutriScoreGrade::parse(" b "), Some(NutriScoreGrade::B));
        assert_eq!(NutriScoreGrade::parse("unknown"), None);
        assert_eq!(NutriScoreGrade::parse("not-applicable"), None);
        assert_eq!(serde_json::to_string(&NutriScoreGrade::C).unwrap(), r#""C""#);
    }
}
