//! Catalog payload -> product record
//!
//! The response body is deserialized into typed records first. Values the
//! engine cannot use (negative amounts, NOVA groups outside 1..=4, unknown
//! Nutri-Score letters) are dropped afterwards.

use std::collections::HashSet;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CatalogError, CatalogResult};
use crate::models::{normalize_code, AdditiveRef, NutriScoreGrade, NutritionProfile, ProductRecord};
use crate::scoring::numeric_part;

/// `/api/v2/product/{barcode}.json` response
#[derive(Debug, Deserialize)]
struct OffResponse {
    #[serde(default)]
    status: Option<Loose>,
    #[serde(default)]
    product: Option<OffProduct>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OffProduct {
    product_name: Option<String>,
    brands: Option<String>,
    nutriments: Option<OffNutriments>,
    additives_tags: Vec<String>,
    nova_group: Option<Loose>,
    nutriscore_grade: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OffNutriments {
    #[serde(rename = "energy-kcal_100g")]
    energy_kcal: Option<Loose>,
    #[serde(rename = "fat_100g")]
    fat: Option<Loose>,
    #[serde(rename = "saturated-fat_100g")]
    saturated_fat: Option<Loose>,
    #[serde(rename = "carbohydrates_100g")]
    carbohydrates: Option<Loose>,
    #[serde(rename = "sugars_100g")]
    sugars: Option<Loose>,
    #[serde(rename = "fiber_100g")]
    fiber: Option<Loose>,
    #[serde(rename = "proteins_100g")]
    proteins: Option<Loose>,
    #[serde(rename = "salt_100g")]
    salt: Option<Loose>,
    #[serde(rename = "sodium_100g")]
    sodium: Option<Loose>,
}

/// Upstream numbers arrive as JSON numbers, numeric strings or junk
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Loose {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Loose::Number(n) => Some(*n),
            Loose::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
            Loose::Other(_) => None,
        }
    }
}

/// A product as returned by the catalog, ready for scoring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogProduct {
    pub barcode: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub record: ProductRecord,
}

/// Map an `/api/v2/product/{barcode}.json` body
pub fn map_product(barcode: &str, body: &Value) -> CatalogResult<CatalogProduct> {
    if !body.is_object() {
        return Err(CatalogError::Malformed("response is not a JSON object".to_string()));
    }
    let response = OffResponse::deserialize(body)
        .map_err(|e| CatalogError::Malformed(e.to_string()))?;

    let not_found = response.status.as_ref().and_then(Loose::as_f64) == Some(0.0);
    let product = match response.product {
        Some(product) if !not_found => product,
        _ => return Err(CatalogError::NotFound(barcode.to_string())),
    };

    let nutrition = product
        .nutriments
        .as_ref()
        .map(map_nutriments)
        .filter(|n| !n.is_empty());

    let additives = (!product.additives_tags.is_empty())
        .then(|| additive_codes(&product.additives_tags))
        .map(|codes| codes.into_iter().map(AdditiveRef::new).collect::<Vec<_>>());

    let processing_level = product.nova_group.as_ref().and_then(nova_group);
    let nutri_score = product
        .nutriscore_grade
        .as_deref()
        .and_then(NutriScoreGrade::parse)
        .map(|g| g.as_str().to_string());

    let name = text_field(product.product_name.as_deref());
    let brand = text_field(product.brands.as_deref())
        .and_then(|b| b.split(',').next().map(|s| s.trim().to_string()))
        .filter(|b| !b.is_empty());

    tracing::debug!(
        barcode,
        additives = additives.as_ref().map_or(0, Vec::len),
        ?processing_level,
        "Mapped catalog product"
    );

    Ok(CatalogProduct {
        barcode: barcode.to_string(),
        name,
        brand,
        record: ProductRecord {
            nutrition,
            additives,
            processing_level,
            nutri_score,
        },
    })
}

fn map_nutriments(n: &OffNutriments) -> NutritionProfile {
    NutritionProfile {
        energy_kcal: amount("energy-kcal_100g", &n.energy_kcal),
        fat: amount("fat_100g", &n.fat),
        saturated_fat: amount("saturated-fat_100g", &n.saturated_fat),
        carbohydrates: amount("carbohydrates_100g", &n.carbohydrates),
        sugars: amount("sugars_100g", &n.sugars),
        fiber: amount("fiber_100g", &n.fiber),
        proteins: amount("proteins_100g", &n.proteins),
        salt: amount("salt_100g", &n.salt),
        sodium: amount("sodium_100g", &n.sodium),
    }
}

/// A per-100g value: finite and non-negative
fn amount(key: &str, value: &Option<Loose>) -> Option<f64> {
    let value = value.as_ref()?;
    match value.as_f64() {
        Some(v) if v.is_finite() && v >= 0.0 => Some(v),
        Some(v) => {
            tracing::warn!("Dropping {} = {}: not a finite non-negative amount", key, v);
            None
        }
        None => {
            tracing::warn!("Dropping {}: not numeric", key);
            None
        }
    }
}

/// E-number codes from additive tags. A sub-variant (`E322I`) is dropped
/// when its base code (`E322`) is listed too.
fn additive_codes(tags: &[String]) -> Vec<String> {
    let codes: Vec<String> = tags.iter().filter_map(|t| additive_from_tag(t)).collect();
    let listed: HashSet<&str> = codes.iter().map(String::as_str).collect();

    codes
        .iter()
        .filter(|code| match base_code(code) {
            Some(base) => base == **code || !listed.contains(base.as_str()),
            None => true,
        })
        .cloned()
        .collect()
}

/// `E322I` -> `E322`
fn base_code(code: &str) -> Option<String> {
    numeric_part(code).map(|n| format!("E{}", n))
}

/// `en:e330` -> `E330`; tags without an E-number are skipped
fn additive_from_tag(tag: &str) -> Option<String> {
    let code = tag.rsplit(':').next().unwrap_or(tag);
    let code = normalize_code(code);
    let is_e_number = code.starts_with('E')
        && code.len() > 1
        && code[1..].chars().next().is_some_and(|c| c.is_ascii_digit());
    is_e_number.then_some(code)
}

fn nova_group(value: &Loose) -> Option<u8> {
    let level = value.as_f64()?;
    if level.fract() == 0.0 && (1.0..=4.0).contains(&level) {
        Some(level as u8)
    } else {
        tracing::warn!("Dropping nova_group {}: outside 1..=4", level);
        None
    }
}

fn text_field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
