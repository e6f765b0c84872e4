//! Common builders for composition integration tests.

use std::sync::Arc;

use conflux_core::{DuplicateBehavior, ResourcePrefixFormat};
use conflux_mcp::{
    Context, Prompt, PromptMessage, Resource, ResourceBody, ResourceTemplate, Server, Tool,
};
use serde_json::{json, Map, Value};

/// A tool that reports its own registration-time name and echoes its
/// arguments, so tests can tell which handler a routed call reached.
pub fn tagged_tool(name: &str) -> Tool {
    let tag = name.to_string();
    Tool::new(
        name,
        json!({"type": "object", "properties": {}}),
        move |args: Map<String, Value>, ctx: Context| {
            let tag = tag.clone();
            let served_by = ctx.server_name().to_string();
            async move {
                Ok(json!({
                    "tool": tag,
                    "served_by": served_by,
                    "args": Value::Object(args),
                }))
            }
        },
    )
}

/// A prompt producing a single user message naming the prompt.
pub fn tagged_prompt(name: &str) -> Prompt {
    let tag = name.to_string();
    Prompt::new(name, move |_args: Map<String, Value>, _ctx: Context| {
        let tag = tag.clone();
        async move { Ok(vec![PromptMessage::user(format!("prompt {tag}"))]) }
    })
}

/// A server preloaded with one tool, one resource, one resource template,
/// and one prompt.
pub fn populated_server(name: &str, format: ResourcePrefixFormat) -> Arc<Server> {
    let server = Server::builder(name).resource_prefix_format(format).build();
    server.add_tool(tagged_tool("greet")).unwrap();
    server
        .add_resource(Resource::from_text("resource://test", "test", "payload"))
        .unwrap();
    server
        .add_template(ResourceTemplate::new(
            "resource://greet/{name}",
            "greeting",
            |params: Map<String, Value>, _ctx: Context| async move {
                let who = params
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("world")
                    .to_string();
                Ok(ResourceBody::Text(format!("hello {who}")))
            },
        ))
        .unwrap();
    server.add_prompt(tagged_prompt("review")).unwrap();
    Arc::new(server)
}

/// An empty server with the given duplicate policy.
pub fn server_with_policy(name: &str, policy: DuplicateBehavior) -> Arc<Server> {
    Arc::new(Server::builder(name).on_duplicate(policy).build())
}
