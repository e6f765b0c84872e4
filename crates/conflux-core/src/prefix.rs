//! Namespace prefixing for composed server objects.
//!
//! Pure, stateless functions that embed a mount prefix into an item key and
//! strip it back out when routing an incoming request. Resource URIs support
//! two mutually exclusive conventions:
//!
//! - `path`: the prefix becomes the first path segment after the scheme —
//!   `resource://test` mounted under `sub` reads as `resource://sub/test`.
//! - `protocol`: the prefix is concatenated onto the scheme with a `+` —
//!   `resource://test` mounted under `sub` reads as `sub+resource://test`.
//!
//! Tool and prompt names have no scheme to manipulate and always use the
//! uniform `{prefix}/{name}` format.
//!
//! For every format, `strip` is the exact left inverse of `apply` for the
//! same `(prefix, format)` pair; see the property tests in `proptests.rs`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// ResourcePrefixFormat
// ============================================================================

/// Convention for embedding a namespace prefix into a resource URI.
///
/// A server's format is fixed at construction and applies to every mount
/// and import it participates in as the receiving side; the two formats
/// are never mixed within one resolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourcePrefixFormat {
    /// `{scheme}://{prefix}/{rest}`
    #[default]
    Path,
    /// `{prefix}+{scheme}://{rest}`
    Protocol,
}

impl ResourcePrefixFormat {
    /// The character that must not appear inside a prefix for this format.
    pub fn separator(&self) -> char {
        match self {
            Self::Path => '/',
            Self::Protocol => '+',
        }
    }
}

impl std::fmt::Display for ResourcePrefixFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Protocol => write!(f, "protocol"),
        }
    }
}

// ============================================================================
// Prefix validation
// ============================================================================

/// Reject a prefix that is empty or contains `separator`.
///
/// Called at mount/import time, never deferred to resolution time.
pub fn validate_prefix(prefix: &str, separator: char) -> Result<()> {
    if prefix.is_empty() {
        return Err(Error::invalid_prefix(prefix, "prefix must not be empty"));
    }
    if prefix.contains(separator) {
        return Err(Error::invalid_prefix(
            prefix,
            format!("prefix must not contain separator {separator:?}"),
        ));
    }
    Ok(())
}

// ============================================================================
// Resource URIs
// ============================================================================

/// Prefix a resource URI under the given format.
///
/// Fails with [`Error::InvalidUrl`] when `uri` has no `://` scheme
/// separator.
pub fn apply_resource_prefix(
    uri: &str,
    prefix: &str,
    format: ResourcePrefixFormat,
) -> Result<String> {
    let (scheme, rest) = split_scheme(uri)?;
    Ok(match format {
        ResourcePrefixFormat::Path => format!("{scheme}://{prefix}/{rest}"),
        ResourcePrefixFormat::Protocol => format!("{prefix}+{scheme}://{rest}"),
    })
}

/// Strip a prefix from a resource URI, returning the base URI.
///
/// Exact left inverse of [`apply_resource_prefix`]: returns `None` unless
/// the URI carries `prefix` under `format` on a full segment/token
/// boundary (never a substring match).
pub fn strip_resource_prefix(
    uri: &str,
    prefix: &str,
    format: ResourcePrefixFormat,
) -> Option<String> {
    match format {
        ResourcePrefixFormat::Path => {
            let (scheme, rest) = split_scheme(uri).ok()?;
            if rest == prefix {
                // Prefixed form of a bare "{scheme}://".
                return Some(format!("{scheme}://"));
            }
            let remainder = rest.strip_prefix(prefix)?.strip_prefix('/')?;
            Some(format!("{scheme}://{remainder}"))
        }
        ResourcePrefixFormat::Protocol => {
            let remainder = uri.strip_prefix(prefix)?.strip_prefix('+')?;
            // The stripped token must still leave a well-formed scheme.
            let (scheme, _) = split_scheme(remainder).ok()?;
            if scheme.is_empty() {
                return None;
            }
            Some(remainder.to_string())
        }
    }
}

/// Whether `uri` carries `prefix` under `format`.
pub fn has_resource_prefix(uri: &str, prefix: &str, format: ResourcePrefixFormat) -> bool {
    strip_resource_prefix(uri, prefix, format).is_some()
}

fn split_scheme(uri: &str) -> Result<(&str, &str)> {
    uri.split_once("://")
        .filter(|(scheme, _)| !scheme.is_empty())
        .ok_or_else(|| Error::invalid_url(uri, "missing '://' scheme separator"))
}

// ============================================================================
// Tool and prompt names
// ============================================================================

/// Prefix a tool/prompt name: `{prefix}/{name}`.
pub fn apply_name_prefix(name: &str, prefix: &str) -> String {
    format!("{prefix}/{name}")
}

/// Strip a `{prefix}/` namespace from a tool/prompt name.
///
/// Returns `None` unless `prefix` matches a full leading segment.
pub fn strip_name_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix)?.strip_prefix('/')
}

// ============================================================================
// KeyFormat
// ============================================================================

/// The prefixing rule a single item manager applies to its keys.
///
/// Tool and prompt managers use [`KeyFormat::Name`]; resource managers use
/// [`KeyFormat::Resource`] with the owning server's configured format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFormat {
    /// Uniform `{prefix}/{name}` naming.
    Name,
    /// Resource-URI prefixing under the given format.
    Resource(ResourcePrefixFormat),
}

impl KeyFormat {
    /// The separator character forbidden inside prefixes for this format.
    pub fn separator(&self) -> char {
        match self {
            Self::Name => '/',
            Self::Resource(format) => format.separator(),
        }
    }

    /// Validate a prefix for this format.
    pub fn validate(&self, prefix: &str) -> Result<()> {
        validate_prefix(prefix, self.separator())
    }

    /// Compute the outward-facing key for an item mounted under `prefix`.
    pub fn apply(&self, key: &str, prefix: &str) -> Result<String> {
        match self {
            Self::Name => Ok(apply_name_prefix(key, prefix)),
            Self::Resource(format) => apply_resource_prefix(key, prefix, *format),
        }
    }

    /// Match and remove `prefix` from an incoming key.
    pub fn strip(&self, key: &str, prefix: &str) -> Option<String> {
        match self {
            Self::Name => strip_name_prefix(key, prefix).map(str::to_string),
            Self::Resource(format) => strip_resource_prefix(key, prefix, *format),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
