//! Shelfscore Library
//!
//! Deterministic health scoring for packaged food products, plus the
//! catalog client, result cache and MCP tools around it.

pub mod build_info;
pub mod catalog;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod scoring;
pub mod tools;
