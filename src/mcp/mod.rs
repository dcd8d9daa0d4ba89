//! MCP server
//!
//! rmcp stdio service exposing the scoring engine as tools.

mod server;

pub use server::ShelfscoreService;
