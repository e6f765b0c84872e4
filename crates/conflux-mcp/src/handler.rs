//! Wire adapter: exposes a composed [`Server`] over the MCP protocol.
//!
//! [`McpService`] wraps an `Arc<Server>` and implements rmcp's
//! `ServerHandler`, translating between the server's merged views and the
//! protocol's list/call/read/get requests. All composition semantics live
//! in [`Server`]; this layer only converts types and maps errors.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use conflux_core::Error;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData, GetPromptRequestParams,
    GetPromptResult, ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult,
    ListToolsResult, PaginatedRequestParams, PromptMessageRole, ReadResourceRequestParams,
    ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};

use crate::prompt::{PromptMessage, Role};
use crate::resource::ResourceBody;
use crate::server::Server;

/// Protocol-facing handle over a composed server.
///
/// Cheap to clone; clones share the underlying server.
#[derive(Clone)]
pub struct McpService {
    server: Arc<Server>,
}

impl McpService {
    /// Wrap a server for serving.
    pub fn new(server: Arc<Server>) -> Self {
        Self { server }
    }

    /// The wrapped server.
    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }
}

/// Map a composition error onto the protocol error space: lookup misses
/// become client errors, everything else is an internal error.
fn to_error_data(error: Error) -> ErrorData {
    match &error {
        Error::NotFound { kind, .. } if *kind == "resource" => {
            ErrorData::resource_not_found(error.to_string(), None)
        }
        Error::NotFound { .. } => ErrorData::invalid_params(error.to_string(), None),
        _ => ErrorData::internal_error(error.to_string(), None),
    }
}

fn to_mcp_message(message: PromptMessage) -> rmcp::model::PromptMessage {
    let role = match message.role {
        Role::User => PromptMessageRole::User,
        Role::Assistant => PromptMessageRole::Assistant,
    };
    rmcp::model::PromptMessage::new_text(role, message.content)
}

impl ServerHandler for McpService {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
        );
        info.instructions = self.server.instructions().map(str::to_string);
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self.server.list_tools().iter().map(|t| t.to_mcp_tool()).collect();
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let args = request.arguments.unwrap_or_default();
        let value = self
            .server
            .call_tool(&request.name, args)
            .await
            .map_err(to_error_data)?;
        let rendered = match &value {
            serde_json::Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other)
                .map_err(|e| ErrorData::internal_error(e.to_string(), None))?,
        };
        Ok(CallToolResult::success(vec![Content::text(rendered)]))
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let resources = self
            .server
            .list_resources()
            .iter()
            .map(|r| r.to_mcp_resource())
            .collect();
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        let resource_templates = self
            .server
            .list_templates()
            .iter()
            .map(|t| t.to_mcp_template())
            .collect();
        Ok(ListResourceTemplatesResult {
            resource_templates,
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let uri = request.uri.to_string();
        let mime_type = self
            .server
            .get_resource(&uri)
            .and_then(|r| r.mime_type.clone());
        let body = self
            .server
            .read_resource(&uri)
            .await
            .map_err(to_error_data)?;
        let contents = match body {
            ResourceBody::Text(text) => ResourceContents::TextResourceContents {
                uri,
                mime_type,
                text,
                meta: None,
            },
            ResourceBody::Blob(bytes) => ResourceContents::BlobResourceContents {
                uri,
                mime_type,
                blob: BASE64.encode(bytes),
                meta: None,
            },
        };
        Ok(ReadResourceResult::new(vec![contents]))
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        let prompts = self
            .server
            .list_prompts()
            .iter()
            .map(|p| p.to_mcp_prompt())
            .collect();
        Ok(ListPromptsResult {
            prompts,
            next_cursor: None,
            meta: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        let description = self
            .server
            .get_prompt(&request.name)
            .and_then(|p| p.description.clone());
        let args = request.arguments.unwrap_or_default();
        let messages = self
            .server
            .render_prompt(&request.name, args)
            .await
            .map_err(to_error_data)?
            .into_iter()
            .map(to_mcp_message)
            .collect();
        let mut result = GetPromptResult::new(messages);
        result.description = description;
        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================
