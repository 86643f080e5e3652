use crate::{errors::PromptError, providers::ai::AiProvider};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    /// Per-config request parameters merged into the payload top level.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    text: String,
}

// --- Gemini Provider implementation ---

/// A provider for the Google Gemini `generateContent` API.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
    default_parameters: Map<String, Value>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider`.
    ///
    /// `default_parameters` must be a JSON object when present; its entries
    /// are merged into every request payload (e.g. a `generationConfig`).
    /// Non-object values are ignored.
    pub fn new(
        api_url: String,
        api_key: String,
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
            default_parameters,
        })
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    /// Sends the prompt as a single content part and returns the first
    /// candidate's text.
    async fn generate(&self, prompt: &str) -> Result<String, PromptError> {
        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            extra: self.default_parameters.clone(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(error_text));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        let raw_response = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();

        Ok(raw_response)
    }
}
