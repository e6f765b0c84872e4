//! The composite server: four item managers plus a mount table.
//!
//! A [`Server`] is an in-process composition unit, not a network listener.
//! It owns one manager per item kind and a table of mounted child servers.
//! Serving happens elsewhere: `McpService` wraps an `Arc<Server>` and
//! adapts it to the wire protocol.
//!
//! Composition is all-or-nothing: `mount` and `import_server` validate the
//! prefix, the resource-prefix-format pairing, and (for mounts) graph
//! acyclicity before touching any manager, so a rejected call leaves the
//! server exactly as it was.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use conflux_core::{DuplicateBehavior, Error, KeyFormat, ResourcePrefixFormat, Result};
use serde_json::{Map, Value};

use crate::context::Context;
use crate::manager::{ItemManager, PromptManager, ResourceManager, TemplateManager, ToolManager};
use crate::prompt::{Prompt, PromptMessage};
use crate::resource::{Resource, ResourceBody};
use crate::template::ResourceTemplate;
use crate::tool::Tool;

// ============================================================================
// Builder
// ============================================================================

/// Configures a [`Server`] before construction.
///
/// The resource prefix format and duplicate policy are baked into the
/// managers at build time and cannot change afterwards.
#[derive(Clone, Debug)]
pub struct ServerBuilder {
    name: String,
    instructions: Option<String>,
    resource_prefix_format: ResourcePrefixFormat,
    on_duplicate: DuplicateBehavior,
}

impl ServerBuilder {
    /// Set the instructions advertised to connecting clients.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set how mount/import prefixes embed into resource URIs.
    pub fn resource_prefix_format(mut self, format: ResourcePrefixFormat) -> Self {
        self.resource_prefix_format = format;
        self
    }

    /// Set the duplicate-registration policy for every registry.
    pub fn on_duplicate(mut self, behavior: DuplicateBehavior) -> Self {
        self.on_duplicate = behavior;
        self
    }

    /// Build the server.
    pub fn build(self) -> Server {
        Server {
            tools: Arc::new(ItemManager::new(KeyFormat::Name, self.on_duplicate)),
            resources: Arc::new(ItemManager::new(
                KeyFormat::Resource(self.resource_prefix_format),
                self.on_duplicate,
            )),
            templates: Arc::new(ItemManager::new(
                KeyFormat::Resource(self.resource_prefix_format),
                self.on_duplicate,
            )),
            prompts: Arc::new(ItemManager::new(KeyFormat::Name, self.on_duplicate)),
            name: self.name,
            instructions: self.instructions,
            resource_prefix_format: self.resource_prefix_format,
            mounted: RwLock::new(Vec::new()),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

struct MountRecord {
    prefix: String,
    server: Arc<Server>,
}

/// A named collection of tools, resources, resource templates, and prompts
/// that other servers can be mounted into or imported from.
pub struct Server {
    name: String,
    instructions: Option<String>,
    resource_prefix_format: ResourcePrefixFormat,
    tools: Arc<ToolManager>,
    resources: Arc<ResourceManager>,
    templates: Arc<TemplateManager>,
    prompts: Arc<PromptManager>,
    mounted: RwLock<Vec<MountRecord>>,
}

impl Server {
    /// Create a server with default options (path resource prefixes,
    /// warn-on-duplicate).
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Start configuring a server.
    pub fn builder(name: impl Into<String>) -> ServerBuilder {
        ServerBuilder {
            name: name.into(),
            instructions: None,
            resource_prefix_format: ResourcePrefixFormat::default(),
            on_duplicate: DuplicateBehavior::default(),
        }
    }

    /// The server's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instructions advertised to connecting clients, if any.
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// How mount/import prefixes embed into resource URIs on this server.
    pub fn resource_prefix_format(&self) -> ResourcePrefixFormat {
        self.resource_prefix_format
    }

    // Recover from poisoning rather than cascading the panic; no guarded
    // section runs user code, so a recovered table is still consistent.
    fn read_mounted(&self) -> RwLockReadGuard<'_, Vec<MountRecord>> {
        self.mounted.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_mounted(&self) -> RwLockWriteGuard<'_, Vec<MountRecord>> {
        self.mounted.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Tools
    // ------------------------------------------------------------------

    /// Register a tool under its name.
    pub fn add_tool(&self, tool: Tool) -> Result<Tool> {
        self.tools.register(tool)
    }

    /// Resolve a tool through the merged view (own registry first, then
    /// mounts in mount order).
    pub fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools.get(name)
    }

    /// All visible tools, mounted children included.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.list()
    }

    /// Remove a locally registered tool.
    pub fn remove_tool(&self, name: &str) -> Option<Tool> {
        self.tools.remove(name)
    }

    /// Resolve and run a tool with a fresh request context.
    pub async fn call_tool(&self, name: &str, args: Map<String, Value>) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::not_found("tool", name))?;
        let ctx = Context::new(&self.name);
        tracing::debug!(tool = name, request_id = %ctx.request_id(), "calling tool");
        tool.run(args, ctx).await
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Register a resource under its URI.
    pub fn add_resource(&self, resource: Resource) -> Result<Resource> {
        self.resources.register(resource)
    }

    /// Resolve a resource through the merged view.
    pub fn get_resource(&self, uri: &str) -> Option<Resource> {
        self.resources.get(uri)
    }

    /// All visible resources, mounted children included.
    pub fn list_resources(&self) -> Vec<Resource> {
        self.resources.list()
    }

    /// Remove a locally registered resource.
    pub fn remove_resource(&self, uri: &str) -> Option<Resource> {
        self.resources.remove(uri)
    }

    /// Resolve and read a resource with a fresh request context.
    ///
    /// An exact registration wins; a URI no resource matches falls through
    /// to template matching over the merged template view.
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceBody> {
        let ctx = Context::new(&self.name);
        if let Some(resource) = self.resources.get(uri) {
            tracing::debug!(resource = uri, request_id = %ctx.request_id(), "reading resource");
            return resource.read(ctx).await;
        }
        if let Some((template, params)) = self.match_template(uri) {
            tracing::debug!(
                resource = uri,
                template = %template.uri_template,
                request_id = %ctx.request_id(),
                "reading resource via template"
            );
            return template.read(params, ctx).await;
        }
        Err(Error::not_found("resource", uri))
    }

    // ------------------------------------------------------------------
    // Resource templates
    // ------------------------------------------------------------------

    /// Register a template under its URI pattern.
    pub fn add_template(&self, template: ResourceTemplate) -> Result<ResourceTemplate> {
        self.templates.register(template)
    }

    /// Resolve a template by exact pattern through the merged view.
    pub fn get_template(&self, uri_template: &str) -> Option<ResourceTemplate> {
        self.templates.get(uri_template)
    }

    /// All visible templates, mounted children included.
    pub fn list_templates(&self) -> Vec<ResourceTemplate> {
        self.templates.list()
    }

    /// Remove a locally registered template.
    pub fn remove_template(&self, uri_template: &str) -> Option<ResourceTemplate> {
        self.templates.remove(uri_template)
    }

    /// Match a concrete URI against the merged template view, in listing
    /// order (mounted templates are matched against their re-keyed
    /// patterns). First match wins.
    fn match_template(&self, uri: &str) -> Option<(ResourceTemplate, Map<String, Value>)> {
        self.templates
            .list()
            .into_iter()
            .find_map(|template| template.matches(uri).map(|params| (template, params)))
    }

    // ------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------

    /// Register a prompt under its name.
    pub fn add_prompt(&self, prompt: Prompt) -> Result<Prompt> {
        self.prompts.register(prompt)
    }

    /// Resolve a prompt through the merged view.
    pub fn get_prompt(&self, name: &str) -> Option<Prompt> {
        self.prompts.get(name)
    }

    /// All visible prompts, mounted children included.
    pub fn list_prompts(&self) -> Vec<Prompt> {
        self.prompts.list()
    }

    /// Remove a locally registered prompt.
    pub fn remove_prompt(&self, name: &str) -> Option<Prompt> {
        self.prompts.remove(name)
    }

    /// Resolve and render a prompt with a fresh request context.
    pub async fn render_prompt(
        &self,
        name: &str,
        args: Map<String, Value>,
    ) -> Result<Vec<PromptMessage>> {
        let prompt = self
            .prompts
            .get(name)
            .ok_or_else(|| Error::not_found("prompt", name))?;
        let ctx = Context::new(&self.name);
        tracing::debug!(prompt = name, request_id = %ctx.request_id(), "rendering prompt");
        prompt.render(args, ctx).await
    }

    // ------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------

    /// Mount `child` under `prefix`: live delegation, nothing copied.
    ///
    /// The child's items appear in this server's merged views re-keyed
    /// under the prefix, and later changes to the child stay visible.
    /// Mounting the same child again (by identity) replaces its previous
    /// mount.
    ///
    /// Rejected, with no state change, when the prefix is invalid for any
    /// item kind, when the resource prefix formats differ, or when the
    /// mount would create a cycle (including mounting a server into
    /// itself).
    pub fn mount(&self, prefix: &str, child: &Arc<Server>) -> Result<()> {
        KeyFormat::Name.validate(prefix)?;
        KeyFormat::Resource(self.resource_prefix_format).validate(prefix)?;
        self.check_format_compatible(prefix, child)?;
        if child.reaches(std::ptr::from_ref(self)) {
            return Err(Error::MountCycle {
                server: self.name.clone(),
            });
        }

        // Re-mounting the same child replaces its previous mount.
        if self.read_mounted().iter().any(|r| Arc::ptr_eq(&r.server, child)) {
            self.detach(child);
        }

        self.tools.mount_child(prefix, Arc::clone(&child.tools))?;
        self.resources
            .mount_child(prefix, Arc::clone(&child.resources))?;
        self.templates
            .mount_child(prefix, Arc::clone(&child.templates))?;
        self.prompts.mount_child(prefix, Arc::clone(&child.prompts))?;
        self.write_mounted().push(MountRecord {
            prefix: prefix.to_string(),
            server: Arc::clone(child),
        });
        tracing::info!(parent = %self.name, child = %child.name, prefix, "mounted server");
        Ok(())
    }

    /// Unmount a previously mounted child (matched by identity).
    ///
    /// The child itself is untouched and can be remounted later. Fails
    /// with [`Error::NotFound`] when `child` is not currently mounted.
    pub fn unmount(&self, child: &Arc<Server>) -> Result<()> {
        if !self.detach(child) {
            return Err(Error::not_found("mounted server", child.name()));
        }
        tracing::info!(parent = %self.name, child = %child.name, "unmounted server");
        Ok(())
    }

    /// Copy `child`'s own registrations into this server as a one-time
    /// re-keyed snapshot under `prefix`. Shallow: the child's mounted
    /// grandchildren are not traversed. Later changes to `child` are not
    /// reflected here.
    ///
    /// All-or-nothing across all item kinds: a prefix, format, or
    /// duplicate error leaves this server unchanged.
    pub fn import_server(&self, prefix: &str, child: &Server) -> Result<()> {
        KeyFormat::Name.validate(prefix)?;
        KeyFormat::Resource(self.resource_prefix_format).validate(prefix)?;
        self.check_format_compatible(prefix, child)?;

        // Plan every kind before committing any, so a duplicate in one
        // registry cannot leave another partially imported. Each commit
        // re-checks under its write lock and fails atomically for its own
        // manager.
        let tools = self.tools.plan_import(&child.tools, prefix)?;
        let resources = self.resources.plan_import(&child.resources, prefix)?;
        let templates = self.templates.plan_import(&child.templates, prefix)?;
        let prompts = self.prompts.plan_import(&child.prompts, prefix)?;

        let tool_count = self.tools.commit_import(tools)?;
        let resource_count = self.resources.commit_import(resources)?;
        let template_count = self.templates.commit_import(templates)?;
        let prompt_count = self.prompts.commit_import(prompts)?;
        tracing::info!(
            parent = %self.name,
            child = %child.name,
            prefix,
            tools = tool_count,
            resources = resource_count,
            templates = template_count,
            prompts = prompt_count,
            "imported server"
        );
        Ok(())
    }

    /// The currently mounted children as `(prefix, server)` pairs, in
    /// mount order.
    pub fn mounted_servers(&self) -> Vec<(String, Arc<Server>)> {
        self.read_mounted()
            .iter()
            .map(|r| (r.prefix.clone(), Arc::clone(&r.server)))
            .collect()
    }

    fn check_format_compatible(&self, prefix: &str, other: &Server) -> Result<()> {
        if self.resource_prefix_format != other.resource_prefix_format {
            return Err(Error::invalid_prefix(
                prefix,
                format!(
                    "resource prefix format mismatch: '{}' uses '{}', '{}' uses '{}'",
                    self.name,
                    self.resource_prefix_format,
                    other.name,
                    other.resource_prefix_format
                ),
            ));
        }
        Ok(())
    }

    /// Whether `target` is reachable from this server through mount edges
    /// (including this server itself).
    fn reaches(&self, target: *const Server) -> bool {
        if std::ptr::eq(std::ptr::from_ref(self), target) {
            return true;
        }
        self.read_mounted()
            .iter()
            .any(|r| r.server.reaches(target))
    }

    /// Remove `child` from the mount table and every manager.
    fn detach(&self, child: &Arc<Server>) -> bool {
        let mut mounted = self.write_mounted();
        let before = mounted.len();
        mounted.retain(|r| !Arc::ptr_eq(&r.server, child));
        if mounted.len() == before {
            return false;
        }
        drop(mounted);
        self.tools.unmount_child(&child.tools);
        self.resources.unmount_child(&child.resources);
        self.templates.unmount_child(&child.templates);
        self.prompts.unmount_child(&child.prompts);
        true
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("name", &self.name)
            .field("resource_prefix_format", &self.resource_prefix_format)
            .field("tools", &self.tools.count())
            .field("resources", &self.resources.count())
            .field("templates", &self.templates.count())
            .field("prompts", &self.prompts.count())
            .field("mounted", &self.read_mounted().len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
