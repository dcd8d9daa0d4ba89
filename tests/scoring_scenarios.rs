//! End-to-end scoring scenarios and engine properties

use std::sync::Arc;

use shelfscore::models::{
    AdditiveRef, ConcernLevel, Grade, NutriScoreGrade, NutritionProfile, ProductRecord, ReasonType,
};
use shelfscore::scoring::{AdditiveKnowledgeBase, NutriScoreCalculator, ScoreAggregator};

fn record(json: serde_json::Value) -> ProductRecord {
    serde_json::from_value(json).unwrap()
}

#[test]
fn scenario_wholesome_product_clamps_to_excellent() {
    let product = record(serde_json::json!({
        "nutrition": { "sugars": 2, "salt": 0.1, "saturatedFat": 0.5, "fiber": 5, "proteins": 12 },
        "additives": [],
        "processingLevel": 1
    }));
    let result = ScoreAggregator::default().analyze(&product);

    assert_eq!(result.total_impact(), 33);
    assert_eq!(result.score, 100);
    assert_eq!(result.grade, Grade::Excellent);
    assert_eq!(result.nutri_score, Some(NutriScoreGrade::A));
    assert_eq!(result.processing_level, Some(1));
    assert!(result.warnings.is_empty());
    assert!(result
        .reasons
        .iter()
        .all(|r| r.reason_type == ReasonType::Positive));
}

#[test]
fn scenario_ultra_processed_snack_is_avoid() {
    let product = record(serde_json::json!({
        "nutrition": { "sugars": 30, "salt": 3, "saturatedFat": 15, "fiber": 1 },
        "additives": [{ "code": "E621" }, { "code": "E951" }],
        "processingLevel": 4
    }));
    let result = ScoreAggregator::default().analyze(&product);

    assert_eq!(result.total_impact(), -78);
    assert_eq!(result.score, 22);
    assert_eq!(result.grade, Grade::Avoid);
    assert_eq!(result.nutri_score, Some(NutriScoreGrade::E));

    assert_eq!(result.warnings.len(), 2);
    assert!(result.warnings.iter().any(|w| w.contains("E951")));
    assert!(result.warnings.iter().any(|w| w.contains("ultra-processed")));

    let additive_impacts: Vec<i32> = result.reasons_in("additives").map(|r| r.impact).collect();
    assert_eq!(additive_impacts, vec![-3, -8]);

    assert!(result.recommendations[0].contains("limiting"));
}

#[test]
fn scenario_unknown_additive_is_a_warning_reason() {
    let product = ProductRecord {
        additives: Some(vec![AdditiveRef::new("E999")]),
        ..Default::default()
    };
    let result = ScoreAggregator::default().analyze(&product);

    assert_eq!(result.reasons.len(), 1);
    assert_eq!(result.reasons[0].reason_type, ReasonType::Warning);
    assert_eq!(result.reasons[0].impact, -2);
    assert!(result.reasons[0].message.contains("E999"));
    assert_eq!(result.score, 98);
}

#[test]
fn identical_input_serializes_identically() {
    let product = record(serde_json::json!({
        "nutrition": { "energy_kcal": 480, "sugars": 18, "salt": 1.3, "saturated_fat": 6, "fiber": 2 },
        "additives": [{ "code": "E330" }, { "code": "E202" }, { "code": "E102" }],
        "processing_level": 3,
        "nutri_score": "d"
    }));

    let first = serde_json::to_string(&ScoreAggregator::default().analyze(&product)).unwrap();
    let second = serde_json::to_string(&ScoreAggregator::default().analyze(&product)).unwrap();
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["nutri_score"], "D");
    assert!(value["grade"].as_str().unwrap().chars().all(|c| c.is_ascii_lowercase()));
}

#[test]
fn score_stays_within_bounds() {
    let scorer = ScoreAggregator::default();
    let extremes = [
        (0.0, 0.0, 0.0, 30.0, 40.0, Some(1)),
        (100.0, 50.0, 80.0, 0.0, 0.0, Some(4)),
        (15.0, 1.2, 5.0, 3.0, 10.0, Some(3)),
    ];

    for (sugars, salt, saturated_fat, fiber, proteins, level) in extremes {
        let product = ProductRecord {
            nutrition: Some(NutritionProfile {
                sugars: Some(sugars),
                salt: Some(salt),
                saturated_fat: Some(saturated_fat),
                fiber: Some(fiber),
                proteins: Some(proteins),
                ..Default::default()
            }),
            additives: Some(vec![AdditiveRef::new("E951"), AdditiveRef::new("E171")]),
            processing_level: level,
            nutri_score: None,
        };
        let result = scorer.analyze(&product);
        assert!(result.score <= 100);
        assert_eq!(result.grade, Grade::from_score(result.score));
    }
}

#[test]
fn grade_is_monotonic_in_score() {
    let mut previous = Grade::from_score(0);
    for score in 0..=100u8 {
        let grade = Grade::from_score(score);
        assert!(grade >= previous, "grade dropped at {}", score);
        previous = grade;
    }
    assert_eq!(Grade::from_score(100), Grade::Excellent);
}

type Setter = fn(&mut NutritionProfile, f64);

fn set_sugars(p: &mut NutritionProfile, v: f64) {
    p.sugars = Some(v);
}

fn set_saturated_fat(p: &mut NutritionProfile, v: f64) {
    p.saturated_fat = Some(v);
}

fn set_salt(p: &mut NutritionProfile, v: f64) {
    p.salt = Some(v / 10.0);
}

fn set_energy(p: &mut NutritionProfile, v: f64) {
    p.energy_kcal = Some(v * 20.0);
}

fn set_fiber(p: &mut NutritionProfile, v: f64) {
    p.fiber = Some(v / 5.0);
}

fn set_proteins(p: &mut NutritionProfile, v: f64) {
    p.proteins = Some(v / 5.0);
}

fn points_for(calc: &NutriScoreCalculator, set: Setter, v: f64) -> i32 {
    let mut profile = NutritionProfile::default();
    set(&mut profile, v);
    calc.points(&profile)
}

#[test]
fn nutri_score_points_are_monotonic() {
    let calc = NutriScoreCalculator::default();
    let steps: Vec<f64> = (0..=120).map(|i| i as f64 * 0.5).collect();

    let worse_when_higher: [Setter; 4] = [set_sugars, set_saturated_fat, set_salt, set_energy];
    for set in worse_when_higher {
        for pair in steps.windows(2) {
            assert!(points_for(&calc, set, pair[1]) >= points_for(&calc, set, pair[0]));
        }
    }

    let better_when_higher: [Setter; 2] = [set_fiber, set_proteins];
    for set in better_when_higher {
        for pair in steps.windows(2) {
            assert!(points_for(&calc, set, pair[1]) <= points_for(&calc, set, pair[0]));
        }
    }
}

#[test]
fn empty_additive_list_contributes_nothing() {
    let kb = Arc::new(AdditiveKnowledgeBase::builtin());
    let scorer = ScoreAggregator::new(Arc::clone(&kb));

    let with_empty = ProductRecord {
        additives: Some(Vec::new()),
        processing_level: Some(2),
        ..Default::default()
    };
    let without = ProductRecord {
        processing_level: Some(2),
        ..Default::default()
    };
    assert_eq!(scorer.analyze(&with_empty), scorer.analyze(&without));
    assert_eq!(scorer.analyze(&with_empty).reasons_in("additives").count(), 0);

    let report = scorer.additives().assess_risk(&[]);
    assert_eq!(report.overall_risk, 0.0);
    assert_eq!(report.risk_level, ConcernLevel::Low);
    assert!(report.combinations.is_empty());
    assert_eq!(report.score_delta, 0);
}

#[test]
fn range_entries_resolve_but_exact_entries_win() {
    let kb = AdditiveKnowledgeBase::builtin();

    let exact = kb.resolve("E211").unwrap();
    let ranged = kb.resolve("E212").unwrap();
    assert_eq!(exact.code, "E211");
    assert_eq!(ranged.code, "E212");
    assert_ne!(exact.name, ranged.name);

    assert!(kb.resolve("E999").is_none());
}
