//! Additive knowledge-base tools

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{AdditiveInfo, AdditiveRef, ConcernLevel};
use crate::scoring::{
    AdditiveKnowledgeBase, AdditiveRiskAssessor, AdditiveRiskReport, KnowledgeBaseStats,
    KnowledgeBaseViews, ViewCacheStats,
};

/// Response for lookup_additive
#[derive(Debug, Serialize)]
pub struct LookupAdditiveResponse {
    pub query: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additive: Option<AdditiveInfo>,
}

/// Response for list_additive_categories
#[derive(Debug, Serialize)]
pub struct AdditiveCategoriesResponse {
    pub categories: BTreeMap<String, Vec<String>>,
    pub total_categories: usize,
    /// Present when filtered to one concern level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concern_level: Option<ConcernLevel>,
}

/// Response for additive_statistics
#[derive(Debug, Serialize)]
pub struct AdditiveStatisticsResponse {
    pub statistics: KnowledgeBaseStats,
    pub view_cache: ViewCacheStats,
}

/// Response for clear_view_cache
#[derive(Debug, Serialize)]
pub struct ClearViewCacheResponse {
    pub success: bool,
    pub cleared: usize,
}

pub fn lookup_additive(kb: &AdditiveKnowledgeBase, code: &str) -> Result<LookupAdditiveResponse, String> {
    let query = code.trim();
    if query.is_empty() {
        return Err("Additive code cannot be empty".to_string());
    }

    let additive = kb.resolve(query);
    if additive.is_none() {
        tracing::debug!("No knowledge base entry for {}", query);
    }

    Ok(LookupAdditiveResponse {
        query: query.to_string(),
        found: additive.is_some(),
        additive,
    })
}

/// Extended risk report for a list of codes
pub fn assess_additives(assessor: &AdditiveRiskAssessor, codes: &[String]) -> AdditiveRiskReport {
    let refs: Vec<AdditiveRef> = codes.iter().map(|c| AdditiveRef::new(c.as_str())).collect();
    assessor.assess_risk(&refs)
}

/// Category -> codes, optionally limited to one concern level
pub fn list_additive_categories(
    views: &KnowledgeBaseViews,
    concern_level: Option<&str>,
) -> Result<AdditiveCategoriesResponse, String> {
    let level = match concern_level {
        Some(raw) => Some(ConcernLevel::from_str(raw).ok_or_else(|| {
            format!(
                "Unknown concern level '{}'. Use one of: low, moderate, high, very_high",
                raw
            )
        })?),
        None => None,
    };

    let mut categories = views.category_groups();
    if let Some(level) = level {
        let allowed = views.codes_by_concern(level);
        for codes in categories.values_mut() {
            codes.retain(|c| allowed.binary_search(c).is_ok());
        }
        categories.retain(|_, codes| !codes.is_empty());
    }

    Ok(AdditiveCategoriesResponse {
        total_categories: categories.len(),
        categories,
        concern_level: level,
    })
}

pub fn additive_statistics(views: &KnowledgeBaseViews) -> AdditiveStatisticsResponse {
    let statistics = views.statistics();
    AdditiveStatisticsResponse {
        statistics,
        view_cache: views.stats(),
    }
}

pub fn clear_view_cache(views: &KnowledgeBaseViews) -> ClearViewCacheResponse {
    ClearViewCacheResponse {
        success: true,
        cleared: views.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lookup_additive() {
        let kb = AdditiveKnowledgeBase::builtin();
        let hit = lookup_additive(&kb, " e621 ").unwrap();
        assert!(hit.found);
        assert_eq!(hit.additive.unwrap().code, "E621");

        let miss = lookup_additive(&kb, "E999").unwrap();
        assert!(!miss.found);
        assert!(lookup_additive(&kb, "  ").is_err());
    }

    #[test]
    fn test_assess_additives() {
        let assessor = AdditiveRiskAssessor::new(Arc::new(AdditiveKnowledgeBase::builtin()));
        let report = assess_additives(&assessor, &["E211".to_string(), "E300".to_string()]);
        assert_eq!(report.combinations.len(), 1);
        assert_eq!(report.combinations[0].id, "benzoate_ascorbate");

        let empty = assess_additives(&assessor, &[]);
        assert_eq!(empty.overall_risk, 0.0);
        assert_eq!(empty.risk_level, ConcernLevel::Low);
    }

    #[test]
    fn test_categories_filtered_by_concern() {
        let views = KnowledgeBaseViews::new(Arc::new(AdditiveKnowledgeBase::builtin()));

        let all = list_additive_categories(&views, None).unwrap();
        let very_high = list_additive_categories(&views, Some("very_high")).unwrap();
        assert!(very_high.total_categories <= all.total_categories);
        assert!(very_high
            .categories
            .values()
            .flatten()
            .any(|code| code == "E951"));
        assert!(list_additive_categories(&views, Some("severe")).is_err());
    }

    #[test]
    fn test_statistics_then_clear() {
        let kb = Arc::new(AdditiveKnowledgeBase::builtin());
        let views = KnowledgeBaseViews::new(Arc::clone(&kb));
        let stats = additive_statistics(&views);
        assert_eq!(stats.statistics.total_entries, kb.len());
        assert_eq!(stats.view_cache.entries, 1);

        let cleared = clear_view_cache(&views);
        assert_eq!(cleared.cleared, 1);
        assert_eq!(views.stats().entries, 0);
    }
}
