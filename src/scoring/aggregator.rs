//! Composite health score
//!
//! Starts from a baseline of 100 and folds in nutrients, additives and
//! processing, in that order. The result is clamped, graded, and completed
//! with recommendations derived from the grade that was just computed.

use std::sync::Arc;

use super::additives::AdditiveRiskAssessor;
use super::knowledge_base::AdditiveKnowledgeBase;
use super::nutrients::NutrientEvaluator;
use super::nutriscore::NutriScoreCalculator;
use super::processing::ProcessingClassifier;
use crate::models::{
    Grade, HealthScoreResult, NutriScoreGrade, ProcessingLevel, ProductRecord, Reason,
};

const BASELINE_SCORE: i32 = 100;

const HIGH_SUGAR_FOLLOW_UP: f64 = 15.0;
const HIGH_SALT_FOLLOW_UP: f64 = 1.5;
const HIGH_SATURATED_FAT_FOLLOW_UP: f64 = 10.0;
const MANY_ADDITIVES_FOLLOW_UP: usize = 5;

/// Orchestrates the leaf evaluators into a [`HealthScoreResult`]
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    nutrients: NutrientEvaluator,
    additives: AdditiveRiskAssessor,
    processing: ProcessingClassifier,
    nutri_score: NutriScoreCalculator,
}

impl ScoreAggregator {
    /// Aggregator with default thresholds and the given knowledge base
    pub fn new(knowledge_base: Arc<AdditiveKnowledgeBase>) -> Self {
        Self::with_components(
            NutrientEvaluator::default(),
            AdditiveRiskAssessor::new(knowledge_base),
            ProcessingClassifier::new(),
            NutriScoreCalculator::default(),
        )
    }

    pub fn with_components(
        nutrients: NutrientEvaluator,
        additives: AdditiveRiskAssessor,
        processing: ProcessingClassifier,
        nutri_score: NutriScoreCalculator,
    ) -> Self {
        Self {
            nutrients,
            additives,
            processing,
            nutri_score,
        }
    }

    pub fn additives(&self) -> &AdditiveRiskAssessor {
        &self.additives
    }

    pub fn nutri_score_calculator(&self) -> &NutriScoreCalculator {
        &self.nutri_score
    }

    /// Score one product record
    pub fn analyze(&self, product: &ProductRecord) -> HealthScoreResult {
        let mut total = BASELINE_SCORE;
        let mut reasons: Vec<Reason> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        if let Some(profile) = &product.nutrition {
            let c = self.nutrients.evaluate_all(profile);
            total += c.delta;
            reasons.extend(c.reasons);
            warnings.extend(c.warnings);
        }

        let additives = self.additives.evaluate_all(product.additives());
        total += additives.delta;
        reasons.extend(additives.reasons);
        warnings.extend(additives.warnings);

        if let Some(outcome) = product
            .processing_level
            .and_then(|code| self.processing.evaluate(code))
        {
            total += outcome.delta;
            reasons.push(outcome.reason);
            warnings.extend(outcome.warning);
        }

        let score = total.clamp(0, 100) as u8;
        let grade = Grade::from_score(score);
        let nutri_score = self.resolve_nutri_score(product);
        let additive_count = self.additives.distinct_count(product.additives());
        let recommendations = recommendations(grade, product, additive_count);

        tracing::debug!(
            raw = total,
            score,
            grade = grade.as_str(),
            reasons = reasons.len(),
            "Scored product"
        );

        HealthScoreResult {
            score,
            grade,
            nutri_score,
            processing_level: product.processing_level,
            reasons,
            recommendations,
            warnings,
        }
    }

    /// External grade when it parses, otherwise computed from nutrition
    fn resolve_nutri_score(&self, product: &ProductRecord) -> Option<NutriScoreGrade> {
        if let Some(external) = product.nutri_score.as_deref() {
            match NutriScoreGrade::parse(external) {
                Some(grade) => return Some(grade),
                None => tracing::debug!("Ignoring unusable Nutri-Score '{}'", external),
            }
        }
        product
            .nutrition
            .as_ref()
            .map(|profile| self.nutri_score.calculate(profile))
    }
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new(Arc::new(AdditiveKnowledgeBase::builtin()))
    }
}

/// One tiered sentence for the grade, then targeted follow-ups
fn recommendations(grade: Grade, product: &ProductRecord, additive_count: usize) -> Vec<String> {
    let mut out = Vec::new();

    out.push(
        match grade {
            Grade::Excellent | Grade::Good => {
                "This product is a healthy choice that fits well into a balanced diet."
            }
            Grade::Moderate => "Consume in moderation as part of a varied diet.",
            Grade::Poor | Grade::Avoid => {
                "Consider limiting consumption of this product and look for healthier alternatives."
            }
        }
        .to_string(),
    );

    if let Some(profile) = &product.nutrition {
        if profile.sugars.is_some_and(|v| v > HIGH_SUGAR_FOLLOW_UP) {
            out.push("Look for lower-sugar alternatives or reduce portion size.".to_string());
        }
        if profile.salt.is_some_and(|v| v > HIGH_SALT_FOLLOW_UP) {
            out.push("Choose reduced-salt versions to help keep blood pressure in check.".to_string());
        }
        if profile
            .saturated_fat
            .is_some_and(|v| v > HIGH_SATURATED_FAT_FOLLOW_UP)
        {
            out.push("Limit foods high in saturated fat and prefer unsaturated fat sources.".to_string());
        }
    }

    if product.processing() == Some(ProcessingLevel::UltraProcessed) {
        out.push("Choose minimally processed foods made from whole ingredients when possible.".to_string());
    }

    if additive_count > MANY_ADDITIVES_FOLLOW_UP {
        out.push("This product contains many additives; prefer products with shorter ingredient lists.".to_string());
    }

    out
}
