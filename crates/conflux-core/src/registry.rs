//! Generic keyed item registry with a duplicate-handling policy.
//!
//! A [`Registry`] maps unique string keys to registered items and preserves
//! insertion order for listing. What happens on a key collision is a policy
//! decision fixed at construction time, never a silent overwrite.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// DuplicateBehavior
// ============================================================================

/// Policy applied when a key is registered twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateBehavior {
    /// Log a warning and keep the original registration.
    #[default]
    Warn,
    /// Fail with [`Error::Duplicate`].
    Error,
    /// Overwrite the original registration.
    Replace,
    /// Keep the original registration silently.
    Ignore,
}

impl std::fmt::Display for DuplicateBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::Replace => write!(f, "replace"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Insertion-ordered mapping from unique name/URI to registered item.
///
/// `kind` is a human-readable item kind ("tool", "resource", "prompt") used
/// in log and error messages.
#[derive(Clone, Debug)]
pub struct Registry<T> {
    kind: &'static str,
    on_duplicate: DuplicateBehavior,
    entries: HashMap<String, T>,
    order: Vec<String>,
}

impl<T: Clone> Registry<T> {
    /// Create an empty registry with the given duplicate policy.
    pub fn new(kind: &'static str, on_duplicate: DuplicateBehavior) -> Self {
        Self {
            kind,
            on_duplicate,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The item kind this registry holds.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The configured duplicate policy.
    pub fn on_duplicate(&self) -> DuplicateBehavior {
        self.on_duplicate
    }

    /// Insert an item under `key`, applying the duplicate policy on
    /// collision.
    ///
    /// Returns the item registered under the key after the call: the
    /// original for `Warn`/`Ignore`, the new item otherwise.
    pub fn add(&mut self, key: impl Into<String>, item: T) -> Result<T> {
        let key = key.into();
        if let Some(existing) = self.entries.get(&key) {
            return match self.on_duplicate {
                DuplicateBehavior::Warn => {
                    tracing::warn!(kind = self.kind, key = %key, "item already exists, keeping original");
                    Ok(existing.clone())
                }
                DuplicateBehavior::Ignore => Ok(existing.clone()),
                DuplicateBehavior::Replace => {
                    self.entries.insert(key, item.clone());
                    Ok(item)
                }
                DuplicateBehavior::Error => Err(Error::duplicate(self.kind, key)),
            };
        }
        self.entries.insert(key.clone(), item.clone());
        self.order.push(key);
        Ok(item)
    }

    /// Get an item by key.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    /// Whether a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All items in insertion order.
    pub fn list(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).cloned())
            .collect()
    }

    /// All keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Remove an item by key, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        removed
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
