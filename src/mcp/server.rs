//! Shelfscore MCP Server Implementation
//!
//! Implements the MCP server with all scoring, cache and additive tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogClient, CatalogResult};
use crate::config::ServerConfig;
use crate::db::Database;
use crate::models::{AdditiveRef, NutritionProfile, ProductRecord, StoredScore};
use crate::scoring::{AdditiveKnowledgeBase, KnowledgeBaseViews, ScoreAggregator};
use crate::tools::additives;
use crate::tools::products;
use crate::tools::status::{StatusInputs, StatusTracker};

/// Shelfscore MCP Service
#[derive(Clone)]
pub struct ShelfscoreService {
    status_tracker: Arc<StatusTracker>,
    config: Arc<ServerConfig>,
    database: Database,
    knowledge_base: Arc<AdditiveKnowledgeBase>,
    scorer: Arc<ScoreAggregator>,
    views: Arc<KnowledgeBaseViews>,
    catalog: CatalogClient,
    tool_router: ToolRouter<ShelfscoreService>,
}

impl ShelfscoreService {
    pub fn new(config: ServerConfig, database: Database) -> CatalogResult<Self> {
        let knowledge_base = Arc::new(AdditiveKnowledgeBase::builtin());
        let catalog = CatalogClient::new(config.catalog_url.clone(), config.catalog_timeout)?;
        tracing::info!(
            "Loaded {} additive entries, catalog at {}",
            knowledge_base.len(),
            catalog.base_url()
        );

        Ok(Self {
            status_tracker: Arc::new(StatusTracker::new(config.database_path.clone())),
            scorer: Arc::new(ScoreAggregator::new(Arc::clone(&knowledge_base))),
            views: Arc::new(KnowledgeBaseViews::new(Arc::clone(&knowledge_base))),
            config: Arc::new(config),
            database,
            knowledge_base,
            catalog,
            tool_router: Self::tool_router(),
        })
    }
}

fn missing_score(barcode: &str) -> serde_json::Value {
    serde_json::json!({ "error": "No cached score", "barcode": barcode.trim() })
}

fn to_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Product Parameter Structs
// ============================================================================

/// Per-100g nutrient values; omit what the label does not state
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct NutritionParams {
    #[serde(alias = "energyKcal", alias = "energy")]
    pub energy_kcal: Option<f64>,
    pub fat: Option<f64>,
    #[serde(alias = "saturatedFat")]
    pub saturated_fat: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub sugars: Option<f64>,
    pub fiber: Option<f64>,
    pub proteins: Option<f64>,
    pub salt: Option<f64>,
    pub sodium: Option<f64>,
}

impl From<NutritionParams> for NutritionProfile {
    fn from(p: NutritionParams) -> Self {
        Self {
            energy_kcal: p.energy_kcal,
            fat: p.fat,
            saturated_fat: p.saturated_fat,
            carbohydrates: p.carbohydrates,
            sugars: p.sugars,
            fiber: p.fiber,
            proteins: p.proteins,
            salt: p.salt,
            sodium: p.sodium,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeProductParams {
    pub nutrition: Option<NutritionParams>,
    /// Additive codes as printed, e.g. ["E330", "E621"]
    pub additives: Option<Vec<String>>,
    /// NOVA group 1-4
    #[serde(alias = "processingLevel")]
    pub processing_level: Option<u8>,
    /// Nutri-Score letter A-E if already known
    #[serde(alias = "nutriScore")]
    pub nutri_score: Option<String>,
}

impl From<AnalyzeProductParams> for ProductRecord {
    fn from(p: AnalyzeProductParams) -> Self {
        Self {
            nutrition: p.nutrition.map(NutritionProfile::from),
            additives: p
                .additives
                .map(|codes| codes.into_iter().map(AdditiveRef::new).collect()),
            processing_level: p.processing_level,
            nutri_score: p.nutri_score,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScoreBarcodeParams {
    pub barcode: String,
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BarcodeParams {
    pub barcode: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCachedScoresParams {
    /// excellent, good, moderate, poor or avoid
    pub grade: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

// ============================================================================
// Additive Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupAdditiveParams {
    pub code: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AssessAdditivesParams {
    pub codes: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListAdditiveCategoriesParams {
    /// low, moderate, high or very_high
    pub concern_level: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl ShelfscoreService {
    // --- Status ---

    #[tool(description = "Get the current status of the shelfscore service including build info, database status, cache size and process information")]
    async fn shelfscore_status(&self) -> Result<CallToolResult, McpError> {
        let cached_scores = match self.database.with_conn(|conn| StoredScore::count(conn, None)) {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!("Could not count cached scores: {}", e);
                None
            }
        };
        let status = self.status_tracker.get_status(StatusInputs {
            cached_scores,
            additive_entries: self.knowledge_base.len(),
            view_cache_entries: self.views.stats().entries,
            catalog_url: self.catalog.base_url().to_string(),
        });
        to_result(&status)
    }

    #[tool(description = "Get the guide to scoring products and reading results. Call this first when unsure how to use the scoring tools.")]
    fn scoring_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::SCORING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(SCORING_INSTRUCTIONS)]))
    }

    // --- Products ---

    #[tool(description = "Score a product record (nutrition per 100g, additive codes, NOVA processing level, optional Nutri-Score). Nothing is stored.")]
    fn analyze_product(&self, Parameters(p): Parameters<AnalyzeProductParams>) -> Result<CallToolResult, McpError> {
        let product = ProductRecord::from(p);
        let result = products::analyze_product(&self.scorer, &product);
        to_result(&result)
    }

    #[tool(description = "Score a product by barcode. Serves the cached result while fresh, otherwise fetches from the product catalog, scores and caches it. Set force_refresh to always fetch.")]
    async fn score_barcode(&self, Parameters(p): Parameters<ScoreBarcodeParams>) -> Result<CallToolResult, McpError> {
        let result = products::score_barcode(
            &self.database,
            &self.scorer,
            &self.catalog,
            &p.barcode,
            p.force_refresh,
            self.config.cache_max_age(),
        )
        .await
        .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&result)
    }

    #[tool(description = "Get the cached score for a barcode with its age and freshness")]
    fn get_cached_score(&self, Parameters(p): Parameters<BarcodeParams>) -> Result<CallToolResult, McpError> {
        let result = products::get_cached_score(&self.database, &p.barcode, self.config.cache_max_age())
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => to_result(&detail),
            None => to_result(&missing_score(&p.barcode)),
        }
    }

    #[tool(description = "List cached scores, newest first, with optional grade filter and pagination")]
    fn list_cached_scores(&self, Parameters(p): Parameters<ListCachedScoresParams>) -> Result<CallToolResult, McpError> {
        let result = products::list_cached_scores(&self.database, p.grade.as_deref(), p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&result)
    }

    #[tool(description = "Delete the cached score for a barcode")]
    fn delete_cached_score(&self, Parameters(p): Parameters<BarcodeParams>) -> Result<CallToolResult, McpError> {
        let result = products::delete_cached_score(&self.database, &p.barcode)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&result)
    }

    #[tool(description = "Delete every cached score older than the freshness window")]
    fn purge_stale_scores(&self) -> Result<CallToolResult, McpError> {
        let result = products::purge_stale_scores(&self.database, chrono::Utc::now(), self.config.cache_max_age())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&result)
    }

    // --- Additives ---

    #[tool(description = "Look up an additive code (e.g. E621) and return its name, category, concern level and health notes")]
    fn lookup_additive(&self, Parameters(p): Parameters<LookupAdditiveParams>) -> Result<CallToolResult, McpError> {
        let result = additives::lookup_additive(&self.knowledge_base, &p.code)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&result)
    }

    #[tool(description = "Risk report for a list of additive codes: weighted concern, risk level and known problematic combinations")]
    fn assess_additives(&self, Parameters(p): Parameters<AssessAdditivesParams>) -> Result<CallToolResult, McpError> {
        let report = additives::assess_additives(self.scorer.additives(), &p.codes);
        to_result(&report)
    }

    #[tool(description = "List additive categories with their codes, optionally limited to one concern level")]
    fn list_additive_categories(&self, Parameters(p): Parameters<ListAdditiveCategoriesParams>) -> Result<CallToolResult, McpError> {
        let result = additives::list_additive_categories(&self.views, p.concern_level.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&result)
    }

    #[tool(description = "Counts of additives by concern level and category, plus view cache hit statistics")]
    fn additive_statistics(&self) -> Result<CallToolResult, McpError> {
        let result = additives::additive_statistics(&self.views);
        to_result(&result)
    }

    #[tool(description = "Clear the memoized additive category and statistics views")]
    fn clear_view_cache(&self) -> Result<CallToolResult, McpError> {
        let result = additives::clear_view_cache(&self.views);
        to_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for ShelfscoreService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "shelfscore".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Shelfscore".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Shelfscore - deterministic health scoring for packaged food. \
                 IMPORTANT: Call scoring_instructions for the record format and scoring rules. \
                 Scoring: analyze_product (inline record), score_barcode (catalog lookup, cached). \
                 Cache: get_cached_score, list_cached_scores, delete_cached_score, purge_stale_scores. \
                 Additives: lookup_additive, assess_additives, list_additive_categories, additive_statistics, clear_view_cache. \
                 Status: shelfscore_status."
                    .into(),
            ),
        }
    }
}
