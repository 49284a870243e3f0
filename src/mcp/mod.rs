/// MCP (Model Context Protocol) server implementation
///
/// This module contains the JSON-RPC protocol types and the stdio server
/// loop that exposes the habit tools to MCP clients.

pub mod protocol;
pub mod server;

pub use server::McpServer;
