use agentflow_core::{Capability, CapabilityError, ParamMap, SystemContext};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// One chat message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request handed to a model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Provider-specific model name (e.g., "qwen-plus"); empty means the
    /// provider's default.
    pub model: String,
    pub messages: Vec<Message>,
}

/// Response returned by a model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    pub text: String,
}

/// Opaque completion capability: takes a request, yields a response. The
/// orchestrator knows nothing about the protocol behind it.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider identifier (e.g., "dashscope")
    fn id(&self) -> &str;

    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, CapabilityError>;
}

/// Adapts a [`ModelProvider`] to the capability contract so model nodes can
/// invoke it by name.
///
/// Arguments: either `prompt` (string, turned into a single user message) or
/// `messages` (array of `{role, content}`), plus an optional `model` name.
/// Output: `{"text": <completion>}`.
pub struct ModelCapability {
    name: String,
    provider: Arc<dyn ModelProvider>,
}

impl ModelCapability {
    pub fn new(name: impl Into<String>, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }
}

#[async_trait]
impl Capability for ModelCapability {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        args: ParamMap,
        _ctx: &SystemContext,
    ) -> Result<ParamMap, CapabilityError> {
        let model = args
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let messages = if let Some(prompt) = args.get("prompt").and_then(|v| v.as_str()) {
            vec![Message::user(prompt)]
        } else if let Some(raw) = args.get("messages") {
            serde_json::from_value(raw.clone()).map_err(|e| CapabilityError::InvalidArg {
                name: "messages".to_string(),
                expected: format!("array of {{role, content}} ({})", e),
            })?
        } else {
            return Err(CapabilityError::MissingArg("prompt".to_string()));
        };

        tracing::debug!(
            "invoking model provider {} with {} message(s)",
            self.provider.id(),
            messages.len()
        );

        let response = self
            .provider
            .complete(ModelRequest { model, messages })
            .await?;

        let mut outputs = ParamMap::new();
        outputs.insert("text".to_string(), json!(response.text));
        Ok(outputs)
    }
}
