//! Transport kinds and URL-based transport inference.

use conflux_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Network transport for a remote MCP server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    /// Streamable HTTP, the default for remote servers.
    #[serde(alias = "http")]
    StreamableHttp,
    /// Server-sent events.
    Sse,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StreamableHttp => write!(f, "streamable-http"),
            Self::Sse => write!(f, "sse"),
        }
    }
}

/// Infer the transport from a remote server URL.
///
/// Only `http`/`https` URLs are accepted. A URL whose path contains an
/// `sse` segment (`/sse/` anywhere, or a trailing `/sse` modulo trailing
/// slashes) selects [`TransportKind::Sse`]; everything else selects
/// [`TransportKind::StreamableHttp`]. The query string is ignored.
pub fn infer_transport(url: &str) -> Result<TransportKind> {
    let parsed = Url::parse(url).map_err(|e| Error::invalid_url(url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::invalid_url(
                url,
                format!("unsupported scheme '{scheme}', expected http or https"),
            ));
        }
    }
    let path = parsed.path();
    if path.contains("/sse/") || path.trim_end_matches('/').ends_with("/sse") {
        Ok(TransportKind::Sse)
    } else {
        Ok(TransportKind::StreamableHttp)
    }
}

// ============================================================================
// Tests
// ============================================================================
