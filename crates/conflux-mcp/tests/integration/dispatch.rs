//! Request dispatch through composed servers.

use std::sync::Arc;

use conflux_core::{Error, ResourcePrefixFormat};
use conflux_mcp::{Context, Server, Tool};
use serde_json::{json, Map, Value};

use crate::common::{populated_server, tagged_tool};

#[tokio::test]
async fn call_routes_through_prefix_to_child_handler() {
    let parent = Arc::new(Server::new("parent"));
    let child = populated_server("a", ResourcePrefixFormat::Path);
    parent.mount("a", &child).unwrap();

    let mut args = Map::new();
    args.insert("who".to_string(), json!("tester"));
    let result = parent.call_tool("a/greet", args).await.unwrap();

    assert_eq!(result["tool"], json!("greet"));
    assert_eq!(result["args"]["who"], json!("tester"));
    // The context names the serving (outermost) server, not the origin.
    assert_eq!(result["served_by"], json!("parent"));
}

#[tokio::test]
async fn imported_copy_dispatches_to_original_handler() {
    let parent = Arc::new(Server::new("parent"));
    let child = populated_server("child", ResourcePrefixFormat::Path);
    parent.import_server("ns", &child).unwrap();

    let result = parent.call_tool("ns/greet", Map::new()).await.unwrap();
    assert_eq!(result["tool"], json!("greet"));
}

#[tokio::test]
async fn read_and_render_through_nested_mounts() {
    let root = Arc::new(Server::new("root"));
    let middle = Arc::new(Server::new("middle"));
    let leaf = populated_server("leaf", ResourcePrefixFormat::Path);
    middle.mount("m", &leaf).unwrap();
    root.mount("r", &middle).unwrap();

    let body = root.read_resource("resource://r/m/test").await.unwrap();
    assert_eq!(body.as_text(), Some("payload"));

    let messages = root.render_prompt("r/m/review", Map::new()).await.unwrap();
    assert_eq!(messages[0].content, "prompt review");

    // Template instantiation resolves through the same composed prefixes.
    let body = root.read_resource("resource://r/m/greet/paris").await.unwrap();
    assert_eq!(body.as_text(), Some("hello paris"));
}

#[tokio::test]
async fn missing_items_fail_with_not_found() {
    let server = Arc::new(Server::new("lonely"));
    assert!(server
        .call_tool("ghost", Map::new())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(server
        .read_resource("resource://ghost")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(server
        .render_prompt("ghost", Map::new())
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn handler_failure_surfaces_as_execution_error() {
    let server = Arc::new(Server::new("s"));
    server
        .add_tool(Tool::new(
            "fails",
            json!({}),
            |_args: Map<String, Value>, _ctx: Context| async {
                Err::<Value, _>(Error::config("backend unavailable"))
            },
        ))
        .unwrap();

    let err = server.call_tool("fails", Map::new()).await.unwrap_err();
    assert!(matches!(err, Error::Execution { .. }));
    assert!(err.to_string().contains("tool 'fails' failed"));
    // The manager state is untouched by a failed call.
    assert!(server.get_tool("fails").is_some());
}

#[tokio::test]
async fn unmounted_child_no_longer_serves() {
    let parent = Arc::new(Server::new("parent"));
    let child = populated_server("c", ResourcePrefixFormat::Path);
    parent.mount("c", &child).unwrap();
    assert!(parent.call_tool("c/greet", Map::new()).await.is_ok());

    parent.unmount(&child).unwrap();
    assert!(parent
        .call_tool("c/greet", Map::new())
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn shadowing_routes_to_the_local_tool() {
    let parent = Arc::new(Server::new("parent"));
    let child = populated_server("a", ResourcePrefixFormat::Path);
    parent.mount("a", &child).unwrap();
    parent.add_tool(tagged_tool("a/greet")).unwrap();

    let result = parent.call_tool("a/greet", Map::new()).await.unwrap();
    // The locally registered tool carries its full key as its tag.
    assert_eq!(result["tool"], json!("a/greet"));
}
