//! Request-scoped context handle.
//!
//! Every tool call, resource read, and prompt render receives a [`Context`]
//! as an explicit parameter. There is no ambient/global lookup: the serving
//! server creates one per request and threads it through the call.

use std::sync::Arc;

use uuid::Uuid;

/// Explicit per-request context passed to registered callables.
///
/// Cheap to clone.
#[derive(Clone, Debug)]
pub struct Context {
    request_id: Uuid,
    server_name: Arc<str>,
}

impl Context {
    /// Create a fresh context for one inbound request on `server_name`.
    pub fn new(server_name: impl AsRef<str>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            server_name: Arc::from(server_name.as_ref()),
        }
    }

    /// Unique id of the request being served.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Name of the server the request entered through.
    ///
    /// For a mounted child's item this is the outermost (serving) server,
    /// not the item's origin server.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}
