//! Prompt items: named templates producing structured message sequences.

use std::future::Future;
use std::sync::Arc;

use conflux_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::Context;
use crate::tool::HandlerFuture;

/// Who a rendered message speaks as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The user side of the conversation.
    User,
    /// The assistant side of the conversation.
    Assistant,
}

/// One message in a rendered prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Speaker role.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl PromptMessage {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A declared prompt argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptArgument {
    /// Argument name.
    pub name: String,
    /// What the argument is for.
    pub description: Option<String>,
    /// Whether the argument must be supplied.
    pub required: bool,
}

impl PromptArgument {
    /// A required argument.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: true,
        }
    }

    /// An optional argument.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Renders a prompt template into a message sequence.
///
/// Implemented for free by any matching async closure.
pub trait PromptRenderer: Send + Sync {
    /// Render with the supplied arguments.
    fn render(&self, args: Map<String, Value>, ctx: Context) -> HandlerFuture<Vec<PromptMessage>>;
}

impl<F, Fut> PromptRenderer for F
where
    F: Fn(Map<String, Value>, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<PromptMessage>>> + Send + 'static,
{
    fn render(&self, args: Map<String, Value>, ctx: Context) -> HandlerFuture<Vec<PromptMessage>> {
        Box::pin((self)(args, ctx))
    }
}

/// A named template producing a structured message sequence.
///
/// Cheap to clone; the renderer is shared, so an imported (renamed) copy
/// renders through the same template body.
#[derive(Clone)]
pub struct Prompt {
    /// Unique name within one manager's registry.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Declared arguments.
    pub arguments: Vec<PromptArgument>,
    renderer: Arc<dyn PromptRenderer>,
}

impl Prompt {
    /// Create a prompt from a name and a renderer.
    pub fn new(name: impl Into<String>, renderer: impl PromptRenderer + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            renderer: Arc::new(renderer),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare an argument.
    pub fn with_argument(mut self, argument: PromptArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// A copy of this prompt registered under a different name. The
    /// renderer and metadata are shared/preserved.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Render the prompt, wrapping any failure in [`Error::Execution`]
    /// annotated with the prompt's name.
    pub async fn render(&self, args: Map<String, Value>, ctx: Context) -> Result<Vec<PromptMessage>> {
        self.renderer
            .render(args, ctx)
            .await
            .map_err(|e| Error::execution("prompt", &self.name, e))
    }

    /// Convert to the wire-facing rmcp prompt description.
    pub fn to_mcp_prompt(&self) -> rmcp::model::Prompt {
        let arguments = if self.arguments.is_empty() {
            None
        } else {
            Some(
                self.arguments
                    .iter()
                    .map(|a| {
                        let mut arg = rmcp::model::PromptArgument::new(a.name.clone());
                        arg.description = a.description.clone();
                        arg.required = Some(a.required);
                        arg
                    })
                    .collect(),
            )
        };
        rmcp::model::Prompt::new(&self.name, self.description.as_deref(), arguments)
    }
}

impl std::fmt::Debug for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompt")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review_prompt() -> Prompt {
        Prompt::new("review", |args: Map<String, Value>, _ctx: Context| async move {
            let topic = args
                .get("topic")
                .and_then(Value::as_str)
                .unwrap_or("the code")
                .to_string();
            Ok(vec![
                PromptMessage::user(format!("Please review {topic}.")),
                PromptMessage::assistant("Certainly. Share the details."),
            ])
        })
        .with_description("Ask for a review")
        .with_argument(PromptArgument::required("topic").with_description("What to review"))
    }

    #[tokio::test]
    async fn test_prompt_render() {
        let prompt = review_prompt();
        let mut args = Map::new();
        args.insert("topic".to_string(), json!("the parser"));
        let messages = prompt.render(args, Context::new("test")).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Please review the parser.");
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_render_failure_is_wrapped() {
        let prompt = Prompt::new("broken", |_args: Map<String, Value>, _ctx: Context| async {
            Err::<Vec<PromptMessage>, _>(Error::config("template missing"))
        });
        let err = prompt
            .render(Map::new(), Context::new("test"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("prompt 'broken' failed"));
    }

    #[tokio::test]
    async fn test_renamed_copy_shares_renderer() {
        let prompt = review_prompt();
        let renamed = prompt.clone().with_name("sub/review");
        assert_eq!(renamed.name, "sub/review");
        assert_eq!(renamed.arguments.len(), 1);
        let messages = renamed
            .render(Map::new(), Context::new("test"))
            .await
            .unwrap();
        assert_eq!(messages[0].content, "Please review the code.");
    }

    #[test]
    fn test_to_mcp_prompt() {
        let mcp = review_prompt().to_mcp_prompt();
        assert_eq!(mcp.name, "review");
        assert!(mcp.description.is_some());
        let args = mcp.arguments.unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name, "topic");
        assert_eq!(args[0].required, Some(true));
    }

    #[test]
    fn test_message_serde() {
        let msg = PromptMessage::user("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }
}
