//! Shelfscore Tools module
//!
//! MCP tool implementations. Each function returns `Result<T, String>` or a
//! plain response; the server turns them into pretty-printed JSON.

pub mod additives;
pub mod products;
pub mod status;
