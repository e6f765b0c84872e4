//! Item managers: one registry per item kind, plus live mount links.
//!
//! The four managers (tools, resources, resource templates, prompts) are
//! structurally parallel, so they share one generic [`ItemManager`]. Each
//! manager owns
//! exactly one [`Registry`] and an ordered list of mount links to child
//! managers. Lookup order is fixed: the manager's own registry first (a
//! locally registered name always shadows a mounted child), then mount
//! links in mount order, first match wins.
//!
//! Two composition operations exist:
//!
//! - [`ItemManager::import_from`] — eager snapshot copy: renamed copies of
//!   the source's own entries are registered into self; later changes to
//!   the source are not reflected.
//! - [`ItemManager::mount_child`] — live delegation: nothing is copied;
//!   `list`/`get` merge the child's entries on the fly, re-keyed under the
//!   mount prefix, so the child's later changes stay visible.
//!
//! Registrations and mount-table changes are expected during setup, before
//! request serving; they are nevertheless serialized behind per-manager
//! locks so a late registration cannot corrupt the tables.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use conflux_core::{DuplicateBehavior, Error, KeyFormat, Registry, Result};

use crate::prompt::Prompt;
use crate::resource::Resource;
use crate::template::ResourceTemplate;
use crate::tool::Tool;

/// Manager over [`Tool`] items, keyed by name.
pub type ToolManager = ItemManager<Tool>;
/// Manager over [`Resource`] items, keyed by URI.
pub type ResourceManager = ItemManager<Resource>;
/// Manager over [`ResourceTemplate`] items, keyed by URI pattern.
pub type TemplateManager = ItemManager<ResourceTemplate>;
/// Manager over [`Prompt`] items, keyed by name.
pub type PromptManager = ItemManager<Prompt>;

// ============================================================================
// ManagedItem
// ============================================================================

/// An item kind a manager can hold: keyed, cloneable, and re-keyable for
/// prefixed exposure.
pub trait ManagedItem: Clone + Send + Sync + 'static {
    /// Human-readable kind for logs and errors.
    const KIND: &'static str;

    /// The registration key (name for tools/prompts, URI for resources).
    fn key(&self) -> &str;

    /// A copy of this item under a new key; callable body and description
    /// are preserved.
    fn rekeyed(&self, key: String) -> Self;
}

impl ManagedItem for Tool {
    const KIND: &'static str = "tool";

    fn key(&self) -> &str {
        &self.name
    }

    fn rekeyed(&self, key: String) -> Self {
        self.clone().with_name(key)
    }
}

impl ManagedItem for Resource {
    const KIND: &'static str = "resource";

    fn key(&self) -> &str {
        &self.uri
    }

    fn rekeyed(&self, key: String) -> Self {
        self.clone().with_uri(key)
    }
}

impl ManagedItem for ResourceTemplate {
    const KIND: &'static str = "resource template";

    fn key(&self) -> &str {
        &self.uri_template
    }

    fn rekeyed(&self, key: String) -> Self {
        self.clone().with_uri_template(key)
    }
}

impl ManagedItem for Prompt {
    const KIND: &'static str = "prompt";

    fn key(&self) -> &str {
        &self.name
    }

    fn rekeyed(&self, key: String) -> Self {
        self.clone().with_name(key)
    }
}

// ============================================================================
// ItemManager
// ============================================================================

struct MountLink<T: ManagedItem> {
    prefix: String,
    child: Arc<ItemManager<T>>,
}

/// Staged import: re-keyed copies checked against the destination registry,
/// not yet inserted. Lets the composite server validate every manager
/// before mutating any of them.
pub(crate) struct ImportPlan<T> {
    staged: Vec<(String, T)>,
}

/// A registry of one item kind plus live mount links to child managers.
pub struct ItemManager<T: ManagedItem> {
    format: KeyFormat,
    registry: RwLock<Registry<T>>,
    mounts: RwLock<Vec<MountLink<T>>>,
}

impl<T: ManagedItem> ItemManager<T> {
    /// Create an empty manager.
    ///
    /// `format` fixes how mount prefixes embed into this manager's keys and
    /// never changes afterwards.
    pub fn new(format: KeyFormat, on_duplicate: DuplicateBehavior) -> Self {
        Self {
            format,
            registry: RwLock::new(Registry::new(T::KIND, on_duplicate)),
            mounts: RwLock::new(Vec::new()),
        }
    }

    /// The key format this manager resolves prefixes under.
    pub fn format(&self) -> KeyFormat {
        self.format
    }

    // Handlers run outside these locks, so a poisoning panic cannot leave
    // a guarded section half-done; recover the guard instead of cascading.
    fn read_registry(&self) -> RwLockReadGuard<'_, Registry<T>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, Registry<T>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_mounts(&self) -> RwLockReadGuard<'_, Vec<MountLink<T>>> {
        self.mounts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_mounts(&self) -> RwLockWriteGuard<'_, Vec<MountLink<T>>> {
        self.mounts.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Own registry
    // ------------------------------------------------------------------

    /// Register an item under its own key, applying the duplicate policy.
    ///
    /// The item becomes visible to `list`/`get` here and through any parent
    /// that has mounted this manager.
    pub fn register(&self, item: T) -> Result<T> {
        let key = item.key().to_string();
        tracing::debug!(kind = T::KIND, key = %key, "registering item");
        self.write_registry().add(key, item)
    }

    /// Remove an item from the own registry, returning it if present.
    ///
    /// Removal is immediately visible through every parent's merged view;
    /// already-imported copies elsewhere are unaffected.
    pub fn remove(&self, key: &str) -> Option<T> {
        self.write_registry().remove(key)
    }

    /// Number of items in the own registry (mounted children excluded).
    pub fn own_len(&self) -> usize {
        self.read_registry().len()
    }

    // ------------------------------------------------------------------
    // Merged view
    // ------------------------------------------------------------------

    /// Resolve a key: own registry first, then mount links in mount order.
    ///
    /// For each link the incoming key is matched against the link's prefix
    /// under this manager's format; on a match the stripped key is resolved
    /// recursively in the child. First match wins.
    pub fn get(&self, key: &str) -> Option<T> {
        if let Some(item) = self.read_registry().get(key) {
            return Some(item.clone());
        }
        for link in self.read_mounts().iter() {
            if let Some(stripped) = self.format.strip(key, &link.prefix) {
                if let Some(item) = link.child.get(&stripped) {
                    return Some(item);
                }
            }
        }
        None
    }

    /// Whether `key` resolves through the merged view.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All visible items: own entries in insertion order, then each mounted
    /// child's entries re-keyed on the fly under its prefix. The child is
    /// never mutated. A key already produced earlier in the merge shadows
    /// later occurrences.
    pub fn list(&self) -> Vec<T> {
        let mut items = self.read_registry().list();
        let mut seen: HashSet<String> = items.iter().map(|i| i.key().to_string()).collect();
        for link in self.read_mounts().iter() {
            for item in link.child.list() {
                match self.format.apply(item.key(), &link.prefix) {
                    Ok(key) => {
                        if seen.insert(key.clone()) {
                            items.push(item.rekeyed(key));
                        }
                    }
                    Err(error) => {
                        tracing::warn!(
                            kind = T::KIND,
                            key = item.key(),
                            prefix = %link.prefix,
                            %error,
                            "skipping item that cannot be prefixed"
                        );
                    }
                }
            }
        }
        items
    }

    /// Number of visible items, mounted children included.
    pub fn count(&self) -> usize {
        self.list().len()
    }

    // ------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------

    /// Attach a live mount link. Nothing is copied; the child's entries
    /// appear in this manager's merged view under `prefix` until
    /// [`unmount_child`](Self::unmount_child).
    pub fn mount_child(&self, prefix: &str, child: Arc<ItemManager<T>>) -> Result<()> {
        self.format.validate(prefix)?;
        self.check_format_compatible(prefix, &child)?;
        tracing::debug!(kind = T::KIND, prefix = %prefix, "mounting child manager");
        self.write_mounts().push(MountLink {
            prefix: prefix.to_string(),
            child,
        });
        Ok(())
    }

    /// Remove every mount link to `child`. Returns whether any link was
    /// removed. The child's own state is untouched.
    pub fn unmount_child(&self, child: &Arc<ItemManager<T>>) -> bool {
        let mut mounts = self.write_mounts();
        let before = mounts.len();
        mounts.retain(|link| !Arc::ptr_eq(&link.child, child));
        mounts.len() != before
    }

    /// Copy every entry of `source`'s own registry (its mounted children
    /// are not traversed — import is shallow) into self as a re-keyed
    /// snapshot under `prefix`. Later changes to `source` are not
    /// reflected.
    ///
    /// All-or-nothing: on any error nothing is registered.
    pub fn import_from(&self, source: &ItemManager<T>, prefix: &str) -> Result<usize> {
        let plan = self.plan_import(source, prefix)?;
        self.commit_import(plan)
    }

    /// Validate an import and stage the re-keyed copies without mutating
    /// anything. The duplicate check here is an early rejection; commit
    /// re-checks under the write lock before inserting.
    pub(crate) fn plan_import(&self, source: &ItemManager<T>, prefix: &str) -> Result<ImportPlan<T>> {
        self.format.validate(prefix)?;
        self.check_format_compatible(prefix, source)?;

        // Shallow snapshot: the source's own registry only.
        let snapshot = source.read_registry().list();

        let registry = self.read_registry();
        let mut staged = Vec::with_capacity(snapshot.len());
        for item in snapshot {
            let key = self.format.apply(item.key(), prefix)?;
            if registry.on_duplicate() == DuplicateBehavior::Error && registry.contains(&key) {
                return Err(Error::duplicate(T::KIND, key));
            }
            staged.push((key, item));
        }
        Ok(ImportPlan { staged })
    }

    /// Register a staged import, atomically for this manager.
    ///
    /// Under the `Error` policy, every staged key is re-checked against
    /// the registry while holding the write lock, so a registration that
    /// landed between planning and committing fails the whole commit with
    /// nothing inserted. Returns the number of items registered
    /// (collisions resolved by a keep-original policy still count as
    /// processed).
    pub(crate) fn commit_import(&self, plan: ImportPlan<T>) -> Result<usize> {
        let mut registry = self.write_registry();
        if registry.on_duplicate() == DuplicateBehavior::Error {
            if let Some((key, _)) = plan.staged.iter().find(|(key, _)| registry.contains(key)) {
                return Err(Error::duplicate(T::KIND, key.clone()));
            }
        }
        let count = plan.staged.len();
        for (key, item) in plan.staged {
            let rekeyed = item.rekeyed(key.clone());
            registry.add(key, rekeyed)?;
        }
        Ok(count)
    }

    fn check_format_compatible(&self, prefix: &str, other: &ItemManager<T>) -> Result<()> {
        if let (KeyFormat::Resource(ours), KeyFormat::Resource(theirs)) =
            (self.format, other.format)
        {
            if ours != theirs {
                return Err(Error::invalid_prefix(
                    prefix,
                    format!(
                        "resource prefix format mismatch: this server uses '{ours}', \
                         the other uses '{theirs}'"
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl<T: ManagedItem> std::fmt::Debug for ItemManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemManager")
            .field("kind", &T::KIND)
            .field("format", &self.format)
            .field("own_len", &self.own_len())
            .field("mounts", &self.read_mounts().len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
