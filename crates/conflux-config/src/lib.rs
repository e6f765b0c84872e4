//! Declarative MCP server configuration.
//!
//! Parses the conventional `mcpServers` JSON block into typed descriptors
//! and resolves each one to a concrete transport: stdio for local
//! subprocess servers, SSE or streamable HTTP for remote ones, with the
//! remote transport inferred from the URL when not stated explicitly.

pub mod descriptor;
pub mod transport;

pub use descriptor::{McpConfig, ResolvedTransport, ServerDescriptor};
pub use transport::{infer_transport, TransportKind};
