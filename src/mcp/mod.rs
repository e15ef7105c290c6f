// file: src/mcp/mod.rs
// description: MCP (Model Context Protocol) server exposing the synchronizer as agent tools
// reference: https://docs.rs/rmcp

pub mod server;

pub use server::DocsSyncMcp;
