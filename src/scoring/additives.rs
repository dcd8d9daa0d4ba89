//! Additive risk assessment
//!
//! Base mode turns each additive on a product into a score delta. Extended
//! mode ([`AdditiveRiskAssessor::assess_risk`]) builds a weighted risk summary
//! and flags known problematic combinations; it does not feed the base score.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::knowledge_base::AdditiveKnowledgeBase;
use super::ScoreContribution;
use crate::models::{normalize_code, AdditiveInfo, AdditiveRef, ConcernLevel, Reason};

/// Reason category for every additive rule
pub const ADDITIVES_CATEGORY: &str = "additives";

/// Flat penalty for a code missing from the knowledge base
const UNKNOWN_ADDITIVE_PENALTY: i32 = -2;

/// Score delta for a resolved additive
pub fn additive_impact(level: ConcernLevel) -> i32 {
    match level {
        ConcernLevel::VeryHigh => -8,
        ConcernLevel::High => -5,
        ConcernLevel::Moderate => -3,
        ConcernLevel::Low => -1,
    }
}

/// Weight of a concern level in the aggregate risk score
pub fn risk_weight(level: ConcernLevel) -> u32 {
    match level {
        ConcernLevel::VeryHigh => 4,
        ConcernLevel::High => 3,
        ConcernLevel::Moderate => 2,
        ConcernLevel::Low => 1,
    }
}

const MAX_RISK_WEIGHT: u32 = 4;

/// Bucket a normalized 0..=1 risk into a concern level
pub fn risk_level(normalized: f64) -> ConcernLevel {
    if normalized >= 0.75 {
        ConcernLevel::VeryHigh
    } else if normalized >= 0.5 {
        ConcernLevel::High
    } else if normalized >= 0.25 {
        ConcernLevel::Moderate
    } else {
        ConcernLevel::Low
    }
}

/// One additive as seen by the extended assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessedAdditive {
    pub code: String,
    pub known: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<AdditiveInfo>,
    pub impact: i32,
}

/// A combination rule that fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationWarning {
    pub id: String,
    pub codes: Vec<String>,
    pub message: String,
    pub impact: i32,
}

/// Count of resolved additives per concern level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConcernCounts {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub very_high: usize,
}

impl ConcernCounts {
    pub fn add(&mut self, level: ConcernLevel) {
        match level {
            ConcernLevel::Low => self.low += 1,
            ConcernLevel::Moderate => self.moderate += 1,
            ConcernLevel::High => self.high += 1,
            ConcernLevel::VeryHigh => self.very_high += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.moderate + self.high + self.very_high
    }
}

/// Extended risk summary for a list of additives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditiveRiskReport {
    pub additives: Vec<AssessedAdditive>,
    pub unknown_codes: Vec<String>,
    pub counts: ConcernCounts,
    pub weighted_score: u32,
    pub max_weight: u32,
    /// `weighted_score / max_weight`, 0 when nothing resolved
    pub overall_risk: f64,
    pub risk_level: ConcernLevel,
    pub combinations: Vec<CombinationWarning>,
    pub combination_penalty: i32,
    /// Per-additive deltas plus combination penalties
    pub score_delta: i32,
}

/// Resolves and scores additives against an injected knowledge base
#[derive(Debug, Clone)]
pub struct AdditiveRiskAssessor {
    knowledge_base: Arc<AdditiveKnowledgeBase>,
}

impl AdditiveRiskAssessor {
    pub fn new(knowledge_base: Arc<AdditiveKnowledgeBase>) -> Self {
        Self { knowledge_base }
    }

    pub fn knowledge_base(&self) -> &AdditiveKnowledgeBase {
        &self.knowledge_base
    }

    pub fn resolve(&self, code: &str) -> Option<AdditiveInfo> {
        self.knowledge_base.resolve(code)
    }

    /// Number of distinct, non-blank codes; what [`Self::evaluate_all`] scores
    pub fn distinct_count(&self, additives: &[AdditiveRef]) -> usize {
        unique_codes(additives).len()
    }

    /// Score every additive once, in the order given. Repeated codes and
    /// blank codes are skipped.
    pub fn evaluate_all(&self, additives: &[AdditiveRef]) -> ScoreContribution {
        let mut out = ScoreContribution::default();

        for code in unique_codes(additives) {
            match self.resolve(&code) {
                Some(info) => {
                    let level = info.concern_level;
                    out.push(Reason::negative(
                        ADDITIVES_CATEGORY,
                        format!(
                            "Contains {} ({}), an additive of {} concern",
                            code,
                            info.name,
                            level.label()
                        ),
                        additive_impact(level),
                    ));
                    if matches!(level, ConcernLevel::High | ConcernLevel::VeryHigh) {
                        out.warn(format!(
                            "{} ({}) is an additive of {} concern",
                            code,
                            info.name,
                            level.label()
                        ));
                    }
                }
                None => {
                    tracing::debug!("Additive '{}' not found in knowledge base", code);
                    out.push(Reason::warning(
                        ADDITIVES_CATEGORY,
                        format!("Unknown additive {}: not in the additive database", code),
                        UNKNOWN_ADDITIVE_PENALTY,
                    ));
                }
            }
        }

        tracing::debug!(delta = out.delta, reasons = out.reasons.len(), "Evaluated additives");
        out
    }

    /// Weighted risk summary plus combination warnings.
    ///
    /// Unknown codes keep their flat penalty in `score_delta` but are left out
    /// of the weighted aggregate, whose maximum is `4 x resolved additives`.
    pub fn assess_risk(&self, additives: &[AdditiveRef]) -> AdditiveRiskReport {
        let codes = unique_codes(additives);

        let mut assessed = Vec::with_capacity(codes.len());
        let mut unknown_codes = Vec::new();
        let mut counts = ConcernCounts::default();
        let mut weighted_score = 0;
        let mut score_delta = 0;

        for code in &codes {
            match self.resolve(code) {
                Some(info) => {
                    let impact = additive_impact(info.concern_level);
                    counts.add(info.concern_level);
                    weighted_score += risk_weight(info.concern_level);
                    score_delta += impact;
                    assessed.push(AssessedAdditive {
                        code: code.clone(),
                        known: true,
                        info: Some(info),
                        impact,
                    });
                }
                None => {
                    score_delta += UNKNOWN_ADDITIVE_PENALTY;
                    unknown_codes.push(code.clone());
                    assessed.push(AssessedAdditive {
                        code: code.clone(),
                        known: false,
                        info: None,
                        impact: UNKNOWN_ADDITIVE_PENALTY,
                    });
                }
            }
        }

        let max_weight = MAX_RISK_WEIGHT * counts.total() as u32;
        let overall_risk = if max_weight == 0 {
            0.0
        } else {
            f64::from(weighted_score) / f64::from(max_weight)
        };

        let combinations = self.find_combinations(&codes);
        let combination_penalty: i32 = combinations.iter().map(|c| c.impact).sum();
        score_delta += combination_penalty;

        AdditiveRiskReport {
            additives: assessed,
            unknown_codes,
            counts,
            weighted_score,
            max_weight,
            overall_risk,
            risk_level: risk_level(overall_risk),
            combinations,
            combination_penalty,
            score_delta,
        }
    }

    /// Every combination rule with at least two of its codes present
    pub fn find_combinations(&self, codes: &[String]) -> Vec<CombinationWarning> {
        let present: HashSet<&str> = codes.iter().map(String::as_str).collect();
        self.knowledge_base
            .combinations()
            .iter()
            .filter_map(|rule| {
                let matched: Vec<String> = rule
                    .codes
                    .iter()
                    .filter(|code| present.contains(code.as_str()))
                    .cloned()
                    .collect();
                (matched.len() >= 2).then(|| CombinationWarning {
                    id: rule.id.clone(),
                    codes: matched,
                    message: rule.message.clone(),
                    impact: rule.penalty,
                })
            })
            .collect()
    }
}

/// Normalized codes in first-seen order, without blanks or repeats
fn unique_codes(additives: &[AdditiveRef]) -> Vec<String> {
    let mut seen = HashSet::new();
    additives
        .iter()
        .map(|a| normalize_code(&a.code))
        .filter(|code| !code.is_empty())
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReasonType;
    use crate::scoring::knowledge_base::CombinationRule;

    fn assessor() -> AdditiveRiskAssessor {
        AdditiveRiskAssessor::new(Arc::new(AdditiveKnowledgeBase::builtin()))
    }

    fn refs(codes: &[&str]) -> Vec<AdditiveRef> {
        codes.iter().map(|c| AdditiveRef::new(*c)).collect()
    }

    #[test]
    fn test_empty_list() {
        let a = assessor();
        assert!(a.evaluate_all(&[]).is_empty());

        let report = a.assess_risk(&[]);
        assert_eq!(report.risk_level, ConcernLevel::Low);
        assert_eq!(report.overall_risk, 0.0);
        assert_eq!(report.score_delta, 0);
        assert!(report.combinations.is_empty());
    }

    #[test]
    fn test_per_level_deltas() {
        let a = assessor();
        // E330 low, E621 moderate, E250 high, E951 very high
        let out = a.evaluate_all(&refs(&["E330", "E621", "E250", "E951"]));
        let impacts: Vec<i32> = out.reasons.iter().map(|r| r.impact).collect();
        assert_eq!(impacts, vec![-1, -3, -5, -8]);
        assert_eq!(out.delta, -17);
        assert!(out.reasons.iter().all(|r| r.reason_type == ReasonType::Negative));
        assert!(out.reasons.iter().all(|r| r.category == ADDITIVES_CATEGORY));
    }

    #[test]
    fn test_warnings_only_for_high_concern() {
        let out = assessor().evaluate_all(&refs(&["E621", "E951", "E250"]));
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings[0].contains("E951"));
        assert!(out.warnings[1].contains("E250"));
    }

    #[test]
    fn test_unknown_additive_is_warning() {
        let out = assessor().evaluate_all(&refs(&["E999"]));
        assert_eq!(out.delta, -2);
        assert_eq!(out.reasons.len(), 1);
        assert_eq!(out.reasons[0].reason_type, ReasonType::Warning);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_duplicates_and_blanks_counted_once() {
        let codes = refs(&["E621", " e621", "", "E621 "]);
        let out = assessor().evaluate_all(&codes);
        assert_eq!(out.delta, -3);
        assert_eq!(out.reasons.len(), 1);
        assert_eq!(assessor().distinct_count(&codes), 1);
    }

    #[test]
    fn test_risk_report_weights() {
        // very high (4) + moderate (2) = 6 of 8
        let report = assessor().assess_risk(&refs(&["E951", "E621"]));
        assert_eq!(report.weighted_score, 6);
        assert_eq!(report.max_weight, 8);
        assert!((report.overall_risk - 0.75).abs() < 1e-9);
        assert_eq!(report.risk_level, ConcernLevel::VeryHigh);
        assert_eq!(report.counts.very_high, 1);
        assert_eq!(report.counts.moderate, 1);
    }

    #[test]
    fn test_risk_level_cut_points() {
        assert_eq!(risk_level(0.0), ConcernLevel::Low);
        assert_eq!(risk_level(0.2499), ConcernLevel::Low);
        assert_eq!(risk_level(0.25), ConcernLevel::Moderate);
        assert_eq!(risk_level(0.5), ConcernLevel::High);
        assert_eq!(risk_level(0.75), ConcernLevel::VeryHigh);
        assert_eq!(risk_level(1.0), ConcernLevel::VeryHigh);
    }

    #[test]
    fn test_unknown_codes_excluded_from_weights() {
        let report = assessor().assess_risk(&refs(&["E999", "E330"]));
        assert_eq!(report.unknown_codes, vec!["E999".to_string()]);
        assert_eq!(report.max_weight, 4);
        assert_eq!(report.weighted_score, 1);
        assert_eq!(report.risk_level, ConcernLevel::Moderate);
        assert_eq!(report.score_delta, -3);
    }

    #[test]
    fn test_flavour_enhancer_combination() {
        let report = assessor().assess_risk(&refs(&["E621", "E627", "E330"]));
        assert_eq!(report.combinations.len(), 1);
        let combo = &report.combinations[0];
        assert_eq!(combo.id, "flavour_enhancer_stack");
        assert_eq!(combo.codes, vec!["E621".to_string(), "E627".to_string()]);
        assert_eq!(report.combination_penalty, -3);
        assert_eq!(report.score_delta, -3 - 3 - 1 - 3);
    }

    #[test]
    fn test_single_code_does_not_fire_combination() {
        let report = assessor().assess_risk(&refs(&["E211"]));
        assert!(report.combinations.is_empty());

        let both = assessor().assess_risk(&refs(&["e211", "E300"]));
        let ids: Vec<&str> = both.combinations.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["benzoate_ascorbate"]);
    }

    #[test]
    fn test_combinations_do_not_touch_base_score() {
        let out = assessor().evaluate_all(&refs(&["E621", "E627"]));
        assert_eq!(out.delta, -6);
    }

    #[test]
    fn test_injected_combination_table() {
        let kb = AdditiveKnowledgeBase::new(
            Vec::new(),
            vec![CombinationRule {
                id: "pair".to_string(),
                codes: vec!["x1".to_string(), "X2".to_string()],
                message: "test pair".to_string(),
                penalty: -7,
            }],
        );
        let a = AdditiveRiskAssessor::new(Arc::new(kb));
        let report = a.assess_risk(&refs(&["X1", "x2"]));
        assert_eq!(report.combination_penalty, -7);
        assert_eq!(report.unknown_codes.len(), 2);
        assert_eq!(report.risk_level, ConcernLevel::Low);
    }
}
