//! Tool items: named invocables with a declared parameter schema.
//!
//! A [`Tool`] is a plain descriptor (name, description, schema) around an
//! `Arc`'d [`ToolHandler`]. Schema inference from function signatures is an
//! external concern: callers hand the finished JSON schema in.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use conflux_core::{Error, Result};
use serde_json::{Map, Value};

use crate::context::Context;

/// Type alias for boxed handler futures.
pub type HandlerFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// An invocable accepting a mapping from parameter name to value plus a
/// request context, returning a JSON value or failing.
///
/// Implemented for free by any matching async closure:
///
/// ```rust,ignore
/// let tool = Tool::new("greet", schema, |args, _ctx| async move {
///     Ok(json!("hello"))
/// });
/// ```
pub trait ToolHandler: Send + Sync {
    /// Invoke the tool with validated keyword arguments.
    fn call(&self, args: Map<String, Value>, ctx: Context) -> HandlerFuture<Value>;
}

impl<F, Fut> ToolHandler for F
where
    F: Fn(Map<String, Value>, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    fn call(&self, args: Map<String, Value>, ctx: Context) -> HandlerFuture<Value> {
        Box::pin((self)(args, ctx))
    }
}

/// A named, invocable unit with a declared parameter schema.
///
/// Cheap to clone; the handler is shared, so an imported (renamed) copy
/// dispatches to the same underlying callable.
#[derive(Clone)]
pub struct Tool {
    /// Unique name within one manager's registry.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// JSON schema for the tool's parameters.
    pub input_schema: Arc<Map<String, Value>>,
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    /// Create a tool from a name, a JSON parameter schema, and a handler.
    ///
    /// A non-object `input_schema` is treated as the empty schema.
    pub fn new(
        name: impl Into<String>,
        input_schema: Value,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        let schema = match input_schema {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            description: None,
            input_schema: Arc::new(schema),
            handler: Arc::new(handler),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A copy of this tool registered under a different name. The handler,
    /// schema, and description are shared/preserved.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run the tool, wrapping any failure in [`Error::Execution`] annotated
    /// with the tool's name.
    pub async fn run(&self, args: Map<String, Value>, ctx: Context) -> Result<Value> {
        self.handler
            .call(args, ctx)
            .await
            .map_err(|e| Error::execution("tool", &self.name, e))
    }

    /// Convert to the wire-facing rmcp tool description.
    pub fn to_mcp_tool(&self) -> rmcp::model::Tool {
        rmcp::model::Tool::new_with_raw(
            self.name.clone(),
            self.description.clone().map(Into::into),
            Arc::clone(&self.input_schema),
        )
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
