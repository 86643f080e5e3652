use crate::{errors::PromptError, providers::ai::AiProvider};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    stream: bool,
    /// Per-config request parameters (temperature, max_tokens, ...) merged
    /// into the payload top level.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

// --- Local Provider implementation ---

/// A provider for a local or OpenAI-compatible chat completions API.
#[derive(Clone, Debug)]
pub struct LocalAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: Option<String>,
    default_parameters: Map<String, Value>,
}

impl LocalAiProvider {
    /// Creates a new `LocalAiProvider`.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: Option<String>,
        default_parameters: Option<Value>,
    ) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        let default_parameters = match default_parameters {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            default_parameters,
        })
    }
}

#[async_trait]
impl AiProvider for LocalAiProvider {
    /// Sends the prompt as a single user message and returns the first
    /// choice's content.
    async fn generate(&self, prompt: &str) -> Result<String, PromptError> {
        let request_body = ChatRequest {
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            model: self.model.as_deref(),
            stream: false,
            extra: self.default_parameters.clone(),
        };

        let mut request_builder = self.client.post(&self.api_url);

        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(error_text));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        let raw_response = chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(raw_response)
    }
}
