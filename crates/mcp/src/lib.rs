// MCP (Model Context Protocol) server exposing FRED observations as a tool

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
pub use tools::{SeriesObservationsTool, ToolRegistry};
