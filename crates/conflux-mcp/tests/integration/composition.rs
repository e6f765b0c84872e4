//! Composition behavior: mounting, importing, prefixes, and policies.

use std::sync::Arc;

use conflux_core::{DuplicateBehavior, Error, ResourcePrefixFormat};
use conflux_mcp::{Resource, Server};

use crate::common::{populated_server, server_with_policy, tagged_tool};

#[test]
fn mounted_child_items_appear_under_prefix() {
    let parent = Arc::new(Server::new("parent"));
    let child = populated_server("child", ResourcePrefixFormat::Path);
    parent.mount("sub", &child).unwrap();

    let tool_names: Vec<String> = parent.list_tools().iter().map(|t| t.name.clone()).collect();
    let resource_uris: Vec<String> = parent
        .list_resources()
        .iter()
        .map(|r| r.uri.clone())
        .collect();
    let prompt_names: Vec<String> = parent
        .list_prompts()
        .iter()
        .map(|p| p.name.clone())
        .collect();

    let template_patterns: Vec<String> = parent
        .list_templates()
        .iter()
        .map(|t| t.uri_template.clone())
        .collect();

    assert_eq!(tool_names, vec!["sub/greet"]);
    assert_eq!(resource_uris, vec!["resource://sub/test"]);
    assert_eq!(prompt_names, vec!["sub/review"]);
    assert_eq!(template_patterns, vec!["resource://sub/greet/{name}"]);
}

#[test]
fn imported_templates_are_rekeyed_copies() {
    let parent = Arc::new(Server::new("parent"));
    let child = populated_server("child", ResourcePrefixFormat::Path);
    parent.import_server("ns", &child).unwrap();

    assert!(parent.get_template("resource://ns/greet/{name}").is_some());

    // Removing the source template does not affect the copy.
    child.remove_template("resource://greet/{name}");
    assert!(parent.get_template("resource://ns/greet/{name}").is_some());
    assert!(child.list_templates().is_empty());
}

#[test]
fn protocol_format_produces_scheme_prefixed_uris() {
    let parent = Arc::new(
        Server::builder("parent")
            .resource_prefix_format(ResourcePrefixFormat::Protocol)
            .build(),
    );
    let child = populated_server("child", ResourcePrefixFormat::Protocol);
    parent.mount("sub", &child).unwrap();

    let uris: Vec<String> = parent
        .list_resources()
        .iter()
        .map(|r| r.uri.clone())
        .collect();
    assert_eq!(uris, vec!["sub+resource://test"]);
    assert!(parent.get_resource("sub+resource://test").is_some());
    // The path-format spelling does not resolve on a protocol server.
    assert!(parent.get_resource("resource://sub/test").is_none());
}

#[test]
fn mount_is_live_import_is_snapshot() {
    let mounted_parent = Arc::new(Server::new("mounting"));
    let imported_parent = Arc::new(Server::new("importing"));
    let child = populated_server("child", ResourcePrefixFormat::Path);

    mounted_parent.mount("c", &child).unwrap();
    imported_parent.import_server("c", &child).unwrap();

    // Both see the child's current items.
    assert!(mounted_parent.get_tool("c/greet").is_some());
    assert!(imported_parent.get_tool("c/greet").is_some());

    // A registration after composition is visible through the mount only.
    child.add_tool(tagged_tool("late")).unwrap();
    assert!(mounted_parent.get_tool("c/late").is_some());
    assert!(imported_parent.get_tool("c/late").is_none());

    // A removal after composition affects the mount only.
    child.remove_tool("greet");
    assert!(mounted_parent.get_tool("c/greet").is_none());
    assert!(imported_parent.get_tool("c/greet").is_some());
}

#[test]
fn nested_mounts_compose_prefixes() {
    let root = Arc::new(Server::new("root"));
    let middle = Arc::new(Server::new("middle"));
    let leaf = populated_server("leaf", ResourcePrefixFormat::Path);

    middle.mount("inner", &leaf).unwrap();
    root.mount("outer", &middle).unwrap();

    assert!(root.get_tool("outer/inner/greet").is_some());
    assert!(root.get_resource("resource://outer/inner/test").is_some());
    assert!(root.get_prompt("outer/inner/review").is_some());
}

#[test]
fn unmount_detaches_without_touching_child() {
    let parent = Arc::new(Server::new("parent"));
    let child = populated_server("child", ResourcePrefixFormat::Path);
    parent.mount("sub", &child).unwrap();
    assert_eq!(parent.list_tools().len(), 1);

    parent.unmount(&child).unwrap();
    assert!(parent.list_tools().is_empty());
    assert!(parent.list_resources().is_empty());
    assert!(parent.mounted_servers().is_empty());
    assert!(child.get_tool("greet").is_some());

    // Remount works after an unmount.
    parent.mount("again", &child).unwrap();
    assert!(parent.get_tool("again/greet").is_some());
}

#[test]
fn unmounting_a_never_mounted_server_fails() {
    let parent = Arc::new(Server::new("parent"));
    let stranger = populated_server("stranger", ResourcePrefixFormat::Path);
    let err = parent.unmount(&stranger).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn cycle_rejection_leaves_graph_unchanged() {
    let a = Arc::new(Server::new("a"));
    let b = Arc::new(Server::new("b"));
    let c = populated_server("c", ResourcePrefixFormat::Path);

    a.mount("b", &b).unwrap();
    b.mount("c", &c).unwrap();

    // Closing the loop in either direction is rejected.
    assert!(matches!(
        c.mount("a", &a).unwrap_err(),
        Error::MountCycle { .. }
    ));
    assert!(matches!(
        b.mount("a", &a).unwrap_err(),
        Error::MountCycle { .. }
    ));

    // The accepted mounts still resolve.
    assert!(a.get_tool("b/c/greet").is_some());
    assert!(c.mounted_servers().is_empty());
}

#[test]
fn mounting_same_child_twice_replaces_the_mount() {
    let parent = Arc::new(Server::new("parent"));
    let child = populated_server("child", ResourcePrefixFormat::Path);

    parent.mount("first", &child).unwrap();
    parent.mount("second", &child).unwrap();

    assert_eq!(parent.mounted_servers().len(), 1);
    assert!(parent.get_tool("second/greet").is_some());
    assert!(parent.get_tool("first/greet").is_none());
}

#[test]
fn separator_in_prefix_is_rejected_for_each_format() {
    let path_parent = Arc::new(Server::new("path-parent"));
    let child = populated_server("child", ResourcePrefixFormat::Path);
    assert!(path_parent.mount("a/b", &child).is_err());

    let proto_parent = Arc::new(
        Server::builder("proto-parent")
            .resource_prefix_format(ResourcePrefixFormat::Protocol)
            .build(),
    );
    let proto_child = populated_server("proto-child", ResourcePrefixFormat::Protocol);
    assert!(proto_parent.mount("a+b", &proto_child).is_err());
    // '/' is only reserved for names, which every mount also prefixes.
    assert!(proto_parent.mount("a/b", &proto_child).is_err());
}

#[test]
fn duplicate_policies_on_registration() {
    // Default policy keeps the first registration and only warns.
    let warn = server_with_policy("warn", DuplicateBehavior::Warn);
    warn.add_tool(tagged_tool("t")).unwrap();
    warn.add_tool(tagged_tool("t").with_description("second")).unwrap();
    assert!(warn.get_tool("t").unwrap().description.is_none());

    let error = server_with_policy("error", DuplicateBehavior::Error);
    error.add_tool(tagged_tool("t")).unwrap();
    assert!(matches!(
        error.add_tool(tagged_tool("t")).unwrap_err(),
        Error::Duplicate { .. }
    ));

    let replace = server_with_policy("replace", DuplicateBehavior::Replace);
    replace.add_tool(tagged_tool("t")).unwrap();
    replace
        .add_tool(tagged_tool("t").with_description("second"))
        .unwrap();
    assert_eq!(
        replace.get_tool("t").unwrap().description.as_deref(),
        Some("second")
    );

    let ignore = server_with_policy("ignore", DuplicateBehavior::Ignore);
    ignore.add_tool(tagged_tool("t")).unwrap();
    ignore
        .add_tool(tagged_tool("t").with_description("second"))
        .unwrap();
    assert!(ignore.get_tool("t").unwrap().description.is_none());
}

#[test]
fn import_duplicate_under_error_policy_aborts_everything() {
    let parent = server_with_policy("parent", DuplicateBehavior::Error);
    let child = populated_server("child", ResourcePrefixFormat::Path);
    parent
        .add_resource(Resource::from_text(
            "resource://ns/test",
            "occupied",
            "already here",
        ))
        .unwrap();

    let err = parent.import_server("ns", &child).unwrap_err();
    assert!(matches!(err, Error::Duplicate { .. }));
    assert!(parent.get_tool("ns/greet").is_none());
    assert!(parent.get_prompt("ns/review").is_none());
    assert_eq!(parent.list_resources().len(), 1);
}

#[test]
fn local_items_shadow_mounted_items() {
    let parent = Arc::new(Server::new("parent"));
    let child = populated_server("sub", ResourcePrefixFormat::Path);
    parent.mount("sub", &child).unwrap();
    parent
        .add_tool(tagged_tool("sub/greet").with_description("local override"))
        .unwrap();

    let resolved = parent.get_tool("sub/greet").unwrap();
    assert_eq!(resolved.description.as_deref(), Some("local override"));

    let occurrences = parent
        .list_tools()
        .iter()
        .filter(|t| t.name == "sub/greet")
        .count();
    assert_eq!(occurrences, 1);
}

#[test]
fn earlier_mounts_shadow_later_ones() {
    let parent = Arc::new(Server::new("parent"));
    let first = populated_server("first", ResourcePrefixFormat::Path);
    let second = populated_server("second", ResourcePrefixFormat::Path);

    parent.mount("ns", &first).unwrap();
    parent.mount("ns", &second).unwrap();

    // Same effective key from both mounts; the earlier mount wins.
    assert_eq!(parent.list_tools().len(), 1);
    let record = parent.mounted_servers();
    assert_eq!(record.len(), 2);
    assert_eq!(record[0].1.name(), "first");
}
