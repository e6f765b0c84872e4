//! Conflux demo server.
//!
//! A small composed server over stdio: a parent with its own tool plus a
//! mounted child, so a connected client sees both the parent's items and
//! the child's items under the `greetings/` prefix.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Result;
use conflux_mcp::{
    Context, McpService, Prompt, PromptArgument, PromptMessage, Resource, ResourceBody,
    ResourceTemplate, Server, Tool,
};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use serde_json::{json, Map, Value};

fn greetings_server() -> Result<Arc<Server>> {
    let server = Server::new("greetings");
    server.add_tool(
        Tool::new(
            "greet",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Who to greet" }
                },
                "required": ["name"]
            }),
            |args: Map<String, Value>, _ctx: Context| async move {
                let name = args
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("world")
                    .to_string();
                Ok(json!(format!("Hello, {name}!")))
            },
        )
        .with_description("Greet someone by name"),
    )?;
    server.add_resource(
        Resource::from_text("resource://motd", "motd", "Welcome to the greetings server.")
            .with_description("Message of the day"),
    )?;
    server.add_template(
        ResourceTemplate::new(
            "resource://card/{name}",
            "greeting-card",
            |params: Map<String, Value>, _ctx: Context| async move {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("world")
                    .to_string();
                Ok(ResourceBody::Text(format!("Dear {name}, have a great day!")))
            },
        )
        .with_description("A personalized greeting card")
        .with_mime_type("text/plain"),
    )?;
    server.add_prompt(
        Prompt::new(
            "introduce",
            |args: Map<String, Value>, _ctx: Context| async move {
                let topic = args
                    .get("topic")
                    .and_then(Value::as_str)
                    .unwrap_or("yourself")
                    .to_string();
                Ok(vec![PromptMessage::user(format!(
                    "Please introduce {topic} in one short paragraph."
                ))])
            },
        )
        .with_description("Ask for a short introduction")
        .with_argument(PromptArgument::optional("topic").with_description("What to introduce")),
    )?;
    Ok(Arc::new(server))
}

fn demo_server() -> Result<Arc<Server>> {
    let server = Server::builder("conflux-demo")
        .instructions(
            "A demo of server composition: local tools plus a child server \
             mounted under the 'greetings' prefix.",
        )
        .build();
    server.add_tool(
        Tool::new(
            "echo",
            json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" }
                },
                "required": ["message"]
            }),
            |args: Map<String, Value>, _ctx: Context| async move {
                Ok(args.get("message").cloned().unwrap_or(Value::Null))
            },
        )
        .with_description("Echo a message back"),
    )?;

    let server = Arc::new(server);
    server.mount("greetings", &greetings_server()?)?;
    Ok(server)
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol stream; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let server = demo_server()?;
    tracing::info!(server = server.name(), "starting stdio transport");

    let service = McpService::new(server).serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
