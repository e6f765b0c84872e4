//! Declarative server descriptors.
//!
//! Mirrors the conventional `mcpServers` JSON configuration block: each
//! named entry is either a local server launched as a subprocess or a
//! remote server reached over HTTP. Descriptors are pure data; resolving
//! one yields the concrete transport a client should use, inferring the
//! remote transport from the URL when it is not stated explicitly.

use std::collections::HashMap;

use conflux_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::{infer_transport, TransportKind};

/// One configured server: local subprocess or remote endpoint.
///
/// The variant is recognized structurally: an entry with a `url` field is
/// remote, an entry with a `command` field is local.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerDescriptor {
    /// A remote server reached over HTTP.
    Remote {
        /// Endpoint URL.
        url: String,
        /// Explicit transport; inferred from the URL when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transport: Option<TransportKind>,
        /// Extra HTTP headers to send.
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        headers: HashMap<String, String>,
    },
    /// A local server launched as a subprocess speaking stdio.
    Local {
        /// Executable to launch.
        command: String,
        /// Arguments to pass.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        /// Extra environment variables for the subprocess.
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        env: HashMap<String, String>,
        /// Working directory for the subprocess.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
    },
}

/// A fully resolved way to reach one server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedTransport {
    /// Launch a subprocess and speak stdio.
    Stdio {
        /// Executable to launch.
        command: String,
        /// Arguments to pass.
        args: Vec<String>,
        /// Extra environment variables.
        env: HashMap<String, String>,
        /// Working directory.
        cwd: Option<String>,
    },
    /// Connect over server-sent events.
    Sse {
        /// Endpoint URL.
        url: String,
        /// Extra HTTP headers.
        headers: HashMap<String, String>,
    },
    /// Connect over streamable HTTP.
    StreamableHttp {
        /// Endpoint URL.
        url: String,
        /// Extra HTTP headers.
        headers: HashMap<String, String>,
    },
}

impl ServerDescriptor {
    /// Resolve this descriptor to a concrete transport.
    ///
    /// Local descriptors always resolve to stdio. Remote descriptors use
    /// the explicit transport when present, otherwise
    /// [`infer_transport`]; inference failures (non-HTTP scheme,
    /// unparseable URL) surface as [`Error::InvalidUrl`].
    pub fn resolve(&self) -> Result<ResolvedTransport> {
        match self {
            Self::Local {
                command,
                args,
                env,
                cwd,
            } => Ok(ResolvedTransport::Stdio {
                command: command.clone(),
                args: args.clone(),
                env: env.clone(),
                cwd: cwd.clone(),
            }),
            Self::Remote {
                url,
                transport,
                headers,
            } => {
                let kind = match transport {
                    Some(kind) => *kind,
                    None => infer_transport(url)?,
                };
                Ok(match kind {
                    TransportKind::Sse => ResolvedTransport::Sse {
                        url: url.clone(),
                        headers: headers.clone(),
                    },
                    TransportKind::StreamableHttp => ResolvedTransport::StreamableHttp {
                        url: url.clone(),
                        headers: headers.clone(),
                    },
                })
            }
        }
    }
}

/// The `mcpServers` configuration block: a name-to-descriptor mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpConfig {
    /// Configured servers by name.
    #[serde(rename = "mcpServers", default)]
    pub servers: HashMap<String, ServerDescriptor>,
}

impl McpConfig {
    /// Parse from an already-deserialized JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve every configured server, failing on the first descriptor
    /// that cannot be resolved.
    pub fn resolve_all(&self) -> Result<HashMap<String, ResolvedTransport>> {
        let mut resolved = HashMap::with_capacity(self.servers.len());
        for (name, descriptor) in &self.servers {
            let transport = descriptor.resolve().map_err(|e| {
                Error::config(format!("server '{name}': {e}"))
            })?;
            tracing::debug!(server = %name, ?transport, "resolved server transport");
            resolved.insert(name.clone(), transport);
        }
        Ok(resolved)
    }
}

// ============================================================================
// Tests
// ============================================================================
