//! Gemini API client
//!
//! Direct HTTP client for the Google Gemini `generateContent` endpoint,
//! translating between the crate's conversation types and the Gemini wire
//! format.
//!
//! # Authentication
//!
//! Uses a Gemini API key passed in by the caller (see `config::Settings`).
//!
//! ```ignore
//! let llm = GeminiProvider::new("AIza...").with_model("gemini-2.0-flash-001");
//! ```

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::provider::LlmProvider;
use super::types::{
    Content, FunctionCall, FunctionDeclaration, FunctionResponse, ModelTurn, Part, Role, Usage,
};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

// ============================================================================
// Gemini-specific request/response types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<GeminiToolConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolConfig {
    function_calling_config: GeminiFunctionCallingConfig,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionCallingConfig {
    mode: String,
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

// ============================================================================
// GeminiProvider
// ============================================================================

/// Google Gemini model provider
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider with a specific API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    // ========================================================================
    // Format conversion: internal -> Gemini
    // ========================================================================

    /// Convert conversation contents to Gemini format
    fn convert_contents(contents: &[Content]) -> Vec<GeminiContent> {
        let converted = contents
            .iter()
            .filter(|c| !c.parts.is_empty())
            .map(|c| GeminiContent {
                // Gemini only knows "user" and "model"; tool responses travel as user turns
                role: match c.role {
                    Role::Model => "model".to_string(),
                    Role::User | Role::Tool => "user".to_string(),
                },
                parts: c.parts.iter().map(Self::convert_part).collect(),
            })
            .collect();

        Self::merge_consecutive_roles(converted)
    }

    /// Merge consecutive messages with the same role (Gemini requires alternation)
    fn merge_consecutive_roles(contents: Vec<GeminiContent>) -> Vec<GeminiContent> {
        let mut merged: Vec<GeminiContent> = Vec::new();

        for content in contents {
            if let Some(last) = merged.last_mut() {
                if last.role == content.role {
                    last.parts.extend(content.parts);
                    continue;
                }
            }
            merged.push(content);
        }

        merged
    }

    fn convert_part(part: &Part) -> GeminiPart {
        match part {
            Part::Text(text) => GeminiPart {
                text: Some(text.clone()),
                ..Default::default()
            },
            Part::FunctionCall(call) => GeminiPart {
                function_call: Some(GeminiFunctionCall {
                    name: call.name.clone(),
                    args: Value::Object(call.args.clone()),
                }),
                thought_signature: call.thought_signature.clone(),
                ..Default::default()
            },
            Part::FunctionResponse(resp) => GeminiPart {
                function_response: Some(GeminiFunctionResponse {
                    name: resp.name.clone(),
                    response: resp.response.clone(),
                }),
                ..Default::default()
            },
        }
    }

    /// Convert tool declarations to a Gemini tools list
    fn convert_tools(tools: &[FunctionDeclaration]) -> Option<Vec<GeminiTool>> {
        if tools.is_empty() {
            return None;
        }

        let declarations = tools
            .iter()
            .map(|tool| GeminiFunctionDeclaration {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: if tool.parameters.is_null() {
                    None
                } else {
                    Some(Self::clean_schema_for_gemini(&tool.parameters))
                },
            })
            .collect();

        Some(vec![GeminiTool {
            function_declarations: declarations,
        }])
    }

    /// Strip JSON Schema fields that Gemini function declarations reject
    fn clean_schema_for_gemini(value: &Value) -> Value {
        const UNSUPPORTED_FIELDS: &[&str] = &[
            "additionalProperties",
            "$schema",
            "definitions",
            "$ref",
            "patternProperties",
            "default",
        ];

        match value {
            Value::Object(map) => {
                let mut cleaned = Map::new();
                for (key, val) in map {
                    if UNSUPPORTED_FIELDS.contains(&key.as_str()) {
                        continue;
                    }
                    cleaned.insert(key.clone(), Self::clean_schema_for_gemini(val));
                }
                Value::Object(cleaned)
            }
            Value::Array(arr) => Value::Array(arr.iter().map(Self::clean_schema_for_gemini).collect()),
            other => other.clone(),
        }
    }

    fn build_request(
        contents: &[Content],
        system_instruction: Option<&str>,
        tools: &[FunctionDeclaration],
    ) -> GeminiRequest {
        let gemini_tools = Self::convert_tools(tools);
        let tool_config = gemini_tools.as_ref().map(|_| GeminiToolConfig {
            function_calling_config: GeminiFunctionCallingConfig {
                mode: "AUTO".to_string(),
            },
        });

        GeminiRequest {
            contents: Self::convert_contents(contents),
            system_instruction: system_instruction.map(|text| GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: Some(text.to_string()),
                    ..Default::default()
                }],
            }),
            tools: gemini_tools,
            tool_config,
        }
    }

    // ========================================================================
    // Format conversion: Gemini -> internal
    // ========================================================================

    /// Convert a Gemini response to a model turn (first candidate only)
    fn convert_response(gemini_resp: GeminiResponse) -> ModelTurn {
        let usage = gemini_resp.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            response_tokens: u.candidates_token_count,
        });

        let candidate = gemini_resp.candidates.and_then(|c| c.into_iter().next());

        let content = candidate.and_then(|candidate| {
            if let Some(reason) = candidate.finish_reason.as_deref() {
                tracing::debug!("[Gemini] Finish reason: {}", reason);
            }
            candidate.content.map(|c| Content {
                role: Role::Model,
                parts: Self::convert_gemini_parts(c.parts),
            })
        });

        ModelTurn { content, usage }
    }

    fn convert_gemini_parts(parts: Vec<GeminiPart>) -> Vec<Part> {
        let mut converted = Vec::new();

        for part in parts {
            if let Some(text) = part.text {
                // Thought summaries are not part of the answer
                if part.thought != Some(true) && !text.is_empty() {
                    converted.push(Part::Text(text));
                }
            }
            if let Some(fc) = part.function_call {
                let args = match fc.args {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                converted.push(Part::FunctionCall(FunctionCall {
                    name: fc.name,
                    args,
                    thought_signature: part.thought_signature.clone(),
                }));
            }
            if let Some(fr) = part.function_response {
                converted.push(Part::FunctionResponse(FunctionResponse {
                    name: fr.name,
                    response: fr.response,
                }));
            }
        }

        converted
    }

    // ========================================================================
    // API methods
    // ========================================================================

    fn api_url(&self, operation: &str) -> String {
        format!("{}/models/{}:{}", API_BASE, self.model, operation)
    }

    /// Send a non-streaming request to the Gemini API
    async fn send_gemini_request(&self, request: &GeminiRequest) -> Result<GeminiResponse> {
        let url = self.api_url("generateContent");

        let request_json =
            serde_json::to_string(request).context("Failed to serialize Gemini request")?;
        tracing::debug!("[Gemini] Request JSON: {}", request_json);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .body(request_json)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read Gemini response body")?;

        tracing::debug!("[Gemini] Response status: {}", status);
        tracing::debug!("[Gemini] Response body: {}", response_text);

        if !status.is_success() {
            tracing::error!("[Gemini] API error: {} - {}", status, response_text);
            anyhow::bail!("Gemini API error ({}): {}", status, response_text);
        }

        serde_json::from_str(&response_text).context("Failed to parse Gemini API response")
    }
}

// ============================================================================
// LlmProvider implementation
// ============================================================================

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(
        &self,
        contents: &[Content],
        system_instruction: Option<&str>,
        tools: &[FunctionDeclaration],
    ) -> Result<ModelTurn> {
        tracing::info!("[Gemini] Sending {} contents with {} tools", contents.len(), tools.len());

        let request = Self::build_request(contents, system_instruction, tools);
        let gemini_response = self.send_gemini_request(&request).await?;
        Ok(Self::convert_response(gemini_response))
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
