//! HTTP client for the product catalog

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::{map_product, validate_barcode, CatalogError, CatalogProduct, CatalogResult};

const USER_AGENT: &str = concat!("shelfscore/", env!("CARGO_PKG_VERSION"));

/// Open Food Facts compatible catalog client. No retries.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v2/product/{}.json", self.base_url, barcode)
    }

    /// Fetch and map one product
    pub async fn fetch(&self, barcode: &str) -> CatalogResult<CatalogProduct> {
        let barcode = validate_barcode(barcode)?;
        let url = self.product_url(&barcode);
        tracing::info!("Fetching product {} from catalog", barcode);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        tracing::debug!("Catalog responded {} for {}", status, barcode);

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(barcode));
        }
        let response = response.error_for_status()?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;

        map_product(&barcode, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_url() {
        let client =
            CatalogClient::new("https://world.openfoodfacts.org/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://world.openfoodfacts.org");
        assert_eq!(
            client.product_url("3017620422003"),
            "https://world.openfoodfacts.org/api/v2/product/3017620422003.json"
        );
    }

    #[tokio::test]
    async fn test_rejects_invalid_barcode_before_request() {
        let client = CatalogClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            client.fetch("abc").await,
            Err(CatalogError::InvalidBarcode(_))
        ));
    }
}
