//! Resource items: URI-addressed readable content units.

use std::future::Future;
use std::sync::Arc;

use conflux_core::{Error, Result};
use rmcp::model::{AnnotateAble, RawResource};

use crate::context::Context;
use crate::tool::HandlerFuture;

/// Content produced by reading a resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceBody {
    /// UTF-8 text content.
    Text(String),
    /// Raw binary content.
    Blob(Vec<u8>),
}

impl ResourceBody {
    /// The text content, when this body is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Blob(_) => None,
        }
    }
}

/// Produces a resource's content on demand.
///
/// Implemented for free by any matching async closure.
pub trait ResourceReader: Send + Sync {
    /// Read the resource's current content.
    fn read(&self, ctx: Context) -> HandlerFuture<ResourceBody>;
}

impl<F, Fut> ResourceReader for F
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ResourceBody>> + Send + 'static,
{
    fn read(&self, ctx: Context) -> HandlerFuture<ResourceBody> {
        Box::pin((self)(ctx))
    }
}

/// A URI-addressed readable content unit.
///
/// Cheap to clone; the reader is shared, so an imported (re-keyed) copy
/// reads from the same underlying source.
#[derive(Clone)]
pub struct Resource {
    /// Unique URI within one manager's registry, e.g. `resource://config`.
    pub uri: String,
    /// Short display name.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// MIME type of the content.
    pub mime_type: Option<String>,
    reader: Arc<dyn ResourceReader>,
}

impl Resource {
    /// Create a resource from a URI, a display name, and a reader.
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        reader: impl ResourceReader + 'static,
    ) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: None,
            mime_type: None,
            reader: Arc::new(reader),
        }
    }

    /// A resource serving fixed text content.
    pub fn from_text(
        uri: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self::new(uri, name, move |_ctx: Context| {
            let text = text.clone();
            async move { Ok(ResourceBody::Text(text)) }
        })
        .with_mime_type("text/plain")
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

    /// A copy of this resource addressed by a different URI. The reader and
    /// metadata are shared/preserved.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Read the resource, wrapping any failure in [`Error::Execution`]
    /// annotated with the resource's URI.
    pub async fn read(&self, ctx: Context) -> Result<ResourceBody> {
        self.reader
            .read(ctx)
            .await
            .map_err(|e| Error::execution("resource", &self.uri, e))
    }

    /// Convert to the wire-facing rmcp resource description.
    pub fn to_mcp_resource(&self) -> rmcp::model::Resource {
        let mut raw = RawResource::new(self.uri.clone(), self.name.clone());
        raw.description = self.description.clone();
        raw.mime_type = self.mime_type.clone();
        raw.no_annotation()
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("uri", &self.uri)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
