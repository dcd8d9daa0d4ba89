//! Product catalog
//!
//! Fetches packaged-food records from an Open Food Facts compatible API and
//! maps them onto [`ProductRecord`](crate::models::ProductRecord). All
//! sanitization of upstream values happens here, before the engine sees them.

mod client;
mod mapping;

pub use client::CatalogClient;
pub use mapping::{map_product, CatalogProduct};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid barcode '{0}': expected 8 to 14 digits")]
    InvalidBarcode(String),

    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Product {0} not found in catalog")]
    NotFound(String),

    #[error("Malformed catalog response: {0}")]
    Malformed(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Trimmed barcode if it is 8 to 14 ASCII digits
pub fn validate_barcode(raw: &str) -> CatalogResult<String> {
    let code = raw.trim();
    let digits_only = code.chars().all(|c| c.is_ascii_digit());
    if digits_only && (8..=14).contains(&code.len()) {
        Ok(code.to_string())
    } else {
        Err(CatalogError::InvalidBarcode(raw.to_string()))
    }
}
