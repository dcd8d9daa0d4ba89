//! Food additive model
//!
//! Additive references as printed on a product and the knowledge-base record
//! they resolve to.

use serde::{Deserialize, Serialize};

/// Ordinal concern classification shared by nutrients and additives
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ConcernLevel {
    pub const ALL: [ConcernLevel; 4] = [
        ConcernLevel::Low,
        ConcernLevel::Moderate,
        ConcernLevel::High,
        ConcernLevel::VeryHigh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConcernLevel::Low => "low",
            ConcernLevel::Moderate => "moderate",
            ConcernLevel::High => "high",
            ConcernLevel::VeryHigh => "very_high",
        }
    }

    /// Human-readable label ("very high" rather than "very_high")
    pub fn label(&self) -> &'static str {
        match self {
            ConcernLevel::Low => "low",
            ConcernLevel::Moderate => "moderate",
            ConcernLevel::High => "high",
            ConcernLevel::VeryHigh => "very high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "low" => Some(ConcernLevel::Low),
            "moderate" => Some(ConcernLevel::Moderate),
            "high" => Some(ConcernLevel::High),
            "very_high" => Some(ConcernLevel::VeryHigh),
            _ => None,
        }
    }
}

/// An additive code as it appears on a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditiveRef {
    pub code: String,
}

impl AdditiveRef {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Knowledge-base record for a resolved additive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveInfo {
    pub code: String,
    pub name: String,
    pub category: String,
    pub concern_level: ConcernLevel,
    pub description: String,
    pub health_effects: Vec<String>,
    #[serde(default)]
    pub why_avoid: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<String>,
}

/// Normalize an additive code for lookup: trimmed and upper-cased
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concern_level_ordering() {
        assert!(ConcernLevel::Low < ConcernLevel::Moderate);
        assert!(ConcernLevel::High < ConcernLevel::VeryHigh);
    }

    #[test]
    fn test_concern_level_serde() {
        let json = serde_json::to_string(&ConcernLevel::VeryHigh).unwrap();
        assert_eq!(json, r#""very_high""#);
        assert_eq!(ConcernLevel::from_str("Very High"), Some(ConcernLevel::VeryHigh));
        assert_eq!(ConcernLevel::from_str("extreme"), None);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  e621 "), "E621");
        assert_eq!(normalize_code("E150d"), "E150D");
    }
}
