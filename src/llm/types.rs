//! Conversation types shared by the agent loop and model providers
//!
//! These follow the Gemini content model: a conversation is an ordered list
//! of `Content` values, each with a role and a list of parts. Providers with a
//! different wire format translate at their boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Conversation
// ============================================================================

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::Tool => "tool",
        }
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Opaque signature some models attach to calls; must be echoed back unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
            thought_signature: None,
        }
    }
}

/// The response to a single tool call
///
/// `response` is always an object holding either a `result` or an `error` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

impl FunctionResponse {
    /// The success payload, if this is a result envelope
    pub fn result(&self) -> Option<&Value> {
        self.response.get("result")
    }

    /// The error message, if this is an error envelope
    pub fn error(&self) -> Option<&str> {
        self.response.get("error").and_then(|v| v.as_str())
    }
}

/// One fragment of a conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user turn with a single text part
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Create a model turn from parts
    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }

    /// Create a tool turn carrying exactly one function response
    pub fn tool_response(name: impl Into<String>, response: Value) -> Self {
        Self {
            role: Role::Tool,
            parts: vec![Part::FunctionResponse(FunctionResponse {
                name: name.into(),
                response,
            })],
        }
    }

    /// All function calls in this turn, in the order the model produced them
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// The function response in the first part, if any
    pub fn function_response(&self) -> Option<&FunctionResponse> {
        match self.parts.first() {
            Some(Part::FunctionResponse(resp)) => Some(resp),
            _ => None,
        }
    }

    /// Concatenated text parts, or `None` when there is no text
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ============================================================================
// Model turns
// ============================================================================

/// Token accounting for a single model call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub response_tokens: u32,
}

/// What the provider returned for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    /// Content of the first candidate, if the provider returned one
    pub content: Option<Content>,
    pub usage: Option<Usage>,
}

impl ModelTurn {
    /// Create a turn from model parts
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            content: Some(Content::model(parts)),
            usage: None,
        }
    }

    /// Tool calls requested in this turn (cloned, in order)
    pub fn function_calls(&self) -> Vec<FunctionCall> {
        self.content
            .as_ref()
            .map(|c| c.function_calls().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Final text of this turn, if any
    pub fn text(&self) -> Option<String> {
        self.content.as_ref().and_then(|c| c.text())
    }
}

// ============================================================================
// Tool declarations
// ============================================================================

/// Static description of a tool, sent to the provider with every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the parameters object
    pub parameters: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_text_concatenates_parts() {
        let content = Content::model(vec![
            Part::Text("Hello, ".into()),
            Part::FunctionCall(FunctionCall::new("get_files_info", Map::new())),
            Part::Text("world".into()),
        ]);
        assert_eq!(content.text().as_deref(), Some("Hello, world"));
        assert_eq!(content.function_calls().len(), 1);
    }

    #[test]
    fn test_empty_turn_has_no_text_or_calls() {
        let turn = ModelTurn::default();
        assert!(turn.text().is_none());
        assert!(turn.function_calls().is_empty());

        let turn = ModelTurn::from_parts(vec![Part::Text(String::new())]);
        assert!(turn.text().is_none());
    }

    #[test]
    fn test_tool_response_accessors() {
        let ok = Content::tool_response("write_file", json!({ "result": "done" }));
        assert_eq!(ok.role, Role::Tool);
        let resp = ok.function_response().unwrap();
        assert_eq!(resp.result(), Some(&json!("done")));
        assert!(resp.error().is_none());

        let err = Content::tool_response("nope", json!({ "error": "Unknown function: nope" }));
        assert_eq!(
            err.function_response().unwrap().error(),
            Some("Unknown function: nope")
        );
    }

    #[test]
    fn test_function_response_must_be_first_part() {
        let content = Content {
            role: Role::Tool,
            parts: vec![Part::Text("stray".into())],
        };
        assert!(content.function_response().is_none());
    }
}
