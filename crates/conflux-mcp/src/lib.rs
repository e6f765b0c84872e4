//! Composable MCP servers.
//!
//! This crate provides the composition layer of Conflux: servers that hold
//! tools, resources, and prompts, and that can be combined by mounting
//! (live delegation under a prefix) or importing (one-time snapshot copy).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      conflux-mcp                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Tool / Resource / ResourceTemplate / Prompt — item kinds   │
//! │  Context — explicit per-request context handle              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ItemManager<T> — registry + mount links for one item kind  │
//! │  Server — four managers + mount table, cycle-checked        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  McpService — Arc<Server> adapter (implements ServerHandler)│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use conflux_mcp::{McpService, Server, Tool};
//!
//! let child = Arc::new(Server::new("weather"));
//! child.add_tool(forecast_tool)?;
//!
//! let parent = Arc::new(Server::new("app"));
//! parent.mount("weather", &child)?;
//!
//! // "weather/forecast" now resolves through the parent.
//! McpService::new(parent).serve(stdio()).await?;
//! ```

pub mod context;
pub mod handler;
pub mod manager;
pub mod prompt;
pub mod resource;
pub mod server;
pub mod template;
pub mod tool;

// Re-exports — items
pub use prompt::{Prompt, PromptArgument, PromptMessage, PromptRenderer, Role};
pub use resource::{Resource, ResourceBody, ResourceReader};
pub use template::{ResourceTemplate, TemplateReader};
pub use tool::{HandlerFuture, Tool, ToolHandler};

// Re-exports — composition
pub use conflux_core::{DuplicateBehavior, ResourcePrefixFormat};
pub use context::Context;
pub use manager::{
    ItemManager, ManagedItem, PromptManager, ResourceManager, TemplateManager, ToolManager,
};
pub use server::{Server, ServerBuilder};

// Re-exports — serving
pub use handler::McpService;
