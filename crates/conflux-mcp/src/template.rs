//! Resource templates: parameterized URI patterns.
//!
//! A template is keyed by a URI pattern with `{param}` placeholders, e.g.
//! `resource://weather/{city}`. Reading a concrete URI that no registered
//! resource matches falls through to template matching: each placeholder
//! captures exactly one path segment, and the captured values are handed
//! to the template's reader. Templates participate in mounting and
//! importing like any other item kind; the prefix embeds into the pattern
//! the same way it embeds into a concrete resource URI.

use std::future::Future;
use std::sync::Arc;

use conflux_core::{Error, Result};
use rmcp::model::AnnotateAble;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::resource::ResourceBody;
use crate::tool::HandlerFuture;

/// Produces content for one concrete instantiation of a template.
///
/// Implemented for free by any matching async closure; `params` maps each
/// placeholder name to the segment captured from the requested URI.
pub trait TemplateReader: Send + Sync {
    /// Read the content for the captured parameters.
    fn read(&self, params: Map<String, Value>, ctx: Context) -> HandlerFuture<ResourceBody>;
}

impl<F, Fut> TemplateReader for F
where
    F: Fn(Map<String, Value>, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ResourceBody>> + Send + 'static,
{
    fn read(&self, params: Map<String, Value>, ctx: Context) -> HandlerFuture<ResourceBody> {
        Box::pin((self)(params, ctx))
    }
}

/// A parameterized resource pattern.
///
/// Cheap to clone; the reader is shared, so an imported (re-keyed) copy
/// instantiates through the same underlying source.
#[derive(Clone)]
pub struct ResourceTemplate {
    /// URI pattern with `{param}` placeholders, unique within one
    /// manager's registry.
    pub uri_template: String,
    /// Short display name.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// MIME type of instantiated content.
    pub mime_type: Option<String>,
    reader: Arc<dyn TemplateReader>,
}

impl ResourceTemplate {
    /// Create a template from a URI pattern, a display name, and a reader.
    pub fn new(
        uri_template: impl Into<String>,
        name: impl Into<String>,
        reader: impl TemplateReader + 'static,
    ) -> Self {
        Self {
            uri_template: uri_template.into(),
            name: name.into(),
            description: None,
            mime_type: None,
            reader: Arc::new(reader),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// A copy of this template keyed by a different pattern. The reader
    /// and metadata are shared/preserved.
    pub fn with_uri_template(mut self, uri_template: impl Into<String>) -> Self {
        self.uri_template = uri_template.into();
        self
    }

    /// The placeholder names, in pattern order.
    pub fn params(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut rest = self.uri_template.as_str();
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    names.push(after[..close].to_string());
                    rest = &after[close + 1..];
                }
                None => break,
            }
        }
        names
    }

    /// Match a concrete URI against this pattern.
    ///
    /// Every placeholder captures exactly one non-empty path segment (no
    /// `/`); literal parts must match exactly. Returns the captured
    /// parameters on a full match.
    pub fn matches(&self, uri: &str) -> Option<Map<String, Value>> {
        let mut params = Map::new();
        let mut pattern = self.uri_template.as_str();
        let mut rest = uri;
        while let Some(open) = pattern.find('{') {
            let (literal, after_open) = pattern.split_at(open);
            rest = rest.strip_prefix(literal)?;
            let close = after_open.find('}')?;
            let name = &after_open[1..close];
            pattern = &after_open[close + 1..];
            let value = match pattern.chars().next() {
                // The capture runs up to the next literal character.
                Some(delimiter) => {
                    let end = rest.find(delimiter)?;
                    let (value, remainder) = rest.split_at(end);
                    rest = remainder;
                    value
                }
                // Trailing placeholder captures the remainder.
                None => {
                    let value = rest;
                    rest = "";
                    value
                }
            };
            if value.is_empty() || value.contains('/') {
                return None;
            }
            params.insert(name.to_string(), Value::String(value.to_string()));
        }
        if rest == pattern { Some(params) } else { None }
    }

    /// Read one instantiation, wrapping any failure in
    /// [`Error::Execution`] annotated with the template's pattern.
    pub async fn read(&self, params: Map<String, Value>, ctx: Context) -> Result<ResourceBody> {
        self.reader
            .read(params, ctx)
            .await
            .map_err(|e| Error::execution("resource template", &self.uri_template, e))
    }

    /// Convert to the wire-facing rmcp template description.
    pub fn to_mcp_template(&self) -> rmcp::model::ResourceTemplate {
        let mut raw =
            rmcp::model::RawResourceTemplate::new(self.uri_template.clone(), self.name.clone());
        raw.description = self.description.clone();
        raw.mime_type = self.mime_type.clone();
        raw.no_annotation()
    }
}

impl std::fmt::Debug for ResourceTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTemplate")
            .field("uri_template", &self.uri_template)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
