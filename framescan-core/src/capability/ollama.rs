// ============================================================================
// framescan-core/src/capability/ollama.rs
// ============================================================================
//
// OLLAMA CLIENT: Analysis Capability Backed by an Ollama Server
//
// Sends one non-streaming chat request per frame to `<host>/api/chat`, with
// the instruction as the user message and the frame attached as a base64
// image, and returns the assistant message text as the classification.
//
// KEY COMPONENTS:
// - OllamaClient: Blocking HTTP client implementing AnalysisCapability
// - Wire types for the chat and tags endpoints

// ---- Internal crate imports ----
use super::{AnalysisCapability, CapabilityError, Classification};
use crate::config::OllamaConfig;
use crate::error::{CoreError, CoreResult};

// ---- External crate imports ----
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};

/// Longest error body kept in a `CapabilityError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 512;

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

// ============================================================================
// CLIENT
// ============================================================================

/// Ollama chat API client.
///
/// # Examples
///
/// ```rust,no_run
/// use framescan_core::capability::{AnalysisCapability, OllamaClient};
/// use framescan_core::config::OllamaConfig;
///
/// let client = OllamaClient::new(OllamaConfig::default()).unwrap();
/// let image = std::fs::read("frame_0001.png").unwrap();
/// let classification = client.infer(&image, "Answer OK or Found.").unwrap();
/// println!("{}", classification.text);
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

impl OllamaClient {
    /// Creates a client for the configured server and model.
    pub fn new(config: OllamaConfig) -> CoreResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CoreError::Capability(CapabilityError::Transport(e.to_string())))?;
        Ok(Self { config, client })
    }

    #[must_use]
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.host.trim_end_matches('/'), path)
    }

    /// Lists the models available on the server.
    pub fn list_models(&self) -> Result<Vec<String>, CapabilityError> {
        let response = self
            .client
            .get(self.endpoint("api/tags"))
            .send()
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;
        let tags: TagsResponse = check_status(response)?
            .json()
            .map_err(|e| CapabilityError::Decode(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Checks that the server answers and offers the configured model.
    pub fn has_model(&self) -> Result<bool, CapabilityError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|name| model_matches(name, &self.config.model)))
    }
}

impl AnalysisCapability for OllamaClient {
    fn infer(&self, content: &[u8], instruction: &str) -> Result<Classification, CapabilityError> {
        let request = build_chat_request(&self.config.model, instruction, content);
        let response = self
            .client
            .post(self.endpoint("api/chat"))
            .json(&request)
            .send()
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;

        let chat: ChatResponse = check_status(response)?
            .json()
            .map_err(|e| CapabilityError::Decode(e.to_string()))?;
        Ok(Classification::new(chat.message.content))
    }
}

fn build_chat_request<'a>(model: &'a str, instruction: &'a str, image: &[u8]) -> ChatRequest<'a> {
    ChatRequest {
        model,
        stream: false,
        messages: vec![ChatMessage {
            role: "user",
            content: instruction,
            images: vec![STANDARD.encode(image)],
        }],
    }
}

fn check_status(response: Response) -> Result<Response, CapabilityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: String = response
        .text()
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect();
    Err(CapabilityError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Ollama reports tagged names ("llama3.2-vision:latest"); an untagged model
/// name matches any tag of that model.
fn model_matches(available: &str, wanted: &str) -> bool {
    available == wanted
        || (!wanted.contains(':')
            && available
                .strip_prefix(wanted)
                .is_some_and(|rest| rest.starts_with(':')))
}
