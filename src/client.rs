//! Completion provider abstraction and implementations.
//!
//! Defines the [`CompletionProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]**: returns errors; used when no model is configured.
//! - **[`AnthropicProvider`]**: calls the Anthropic Messages API.
//!
//! # Provider Selection
//!
//! Use [`create_provider`] to instantiate the appropriate provider based
//! on the configuration:
//!
//! ```rust
//! # use style_extract::config::ModelConfig;
//! # use style_extract::client::{create_provider, CompletionProvider};
//! let config = ModelConfig {
//!     provider: "disabled".to_string(),
//!     ..ModelConfig::default()
//! };
//! let provider = create_provider(&config).unwrap();
//! assert_eq!(provider.model_name(), "disabled");
//! ```
//!
//! # Failure Policy
//!
//! Each call makes exactly one HTTP request. Network errors, non-2xx
//! statuses (401/403, 429, 5xx) and malformed bodies all surface as an
//! error; nothing is retried. The request is bounded by
//! `model.timeout_secs` (`0` disables the timeout).

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ModelConfig;
use crate::models::PromptTurn;

/// Version header required by the Anthropic API.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One request to a completion endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<PromptTurn>,
}

/// Reply text and usage accounting returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A model endpoint that answers a message list with one reply.
///
/// Calls are synchronous: `complete` blocks until the endpoint responds or
/// the request fails.
pub trait CompletionProvider {
    /// Returns the model identifier sent with each request.
    fn model_name(&self) -> &str;
    /// Returns the maximum number of output tokens requested.
    fn max_tokens(&self) -> u32;
    /// Send `request` and wait for the reply.
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

// ============ Disabled Provider ============

/// A provider that always fails.
///
/// Used when `model.provider = "disabled"`; handy for `scan`/`prompt` runs
/// that must never reach the network.
pub struct DisabledProvider;

impl CompletionProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn max_tokens(&self) -> u32 {
        0
    }
    fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
        bail!("Model provider is disabled")
    }
}

// ============ Anthropic Provider ============

/// Provider for the Anthropic Messages API (`POST /v1/messages`).
pub struct AnthropicProvider {
    model: String,
    max_tokens: u32,
    base_url: String,
    api_key: String,
    client: Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AnthropicProvider {
    /// Create a provider with an explicit API key.
    pub fn new(config: &ModelConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            bail!("API key for the Anthropic provider is empty");
        }

        let timeout = match config.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            model: config.name.clone(),
            max_tokens: config.max_tokens,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Create a provider reading the API key from `config.api_key_env`.
    pub fn from_env(config: &ModelConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| anyhow!("{} environment variable not set", config.api_key_env))?;
        Self::new(config, api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl CompletionProvider for AnthropicProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .context("HTTP request to the Anthropic API failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().unwrap_or_default();
            match status.as_u16() {
                401 | 403 => bail!(
                    "Anthropic API rejected the credentials ({}): {}",
                    status,
                    body_text
                ),
                429 => bail!(
                    "Anthropic API rate limited the request ({}): {}",
                    status,
                    body_text
                ),
                _ => bail!("Anthropic API error {}: {}", status, body_text),
            }
        }

        let body_text = response
            .text()
            .context("Failed to read Anthropic API response")?;
        parse_messages_response(&body_text)
    }
}

/// Parse a Messages API response body.
///
/// The reply is the concatenation of all `text` content blocks; a response
/// without text blocks yields an empty reply.
fn parse_messages_response(body: &str) -> Result<CompletionResponse> {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .context("Invalid Anthropic response: unexpected JSON shape")?;

    let content = parsed
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text.as_deref())
        .collect::<String>();

    Ok(CompletionResponse {
        content,
        input_tokens: parsed.usage.input_tokens,
        output_tokens: parsed.usage.output_tokens,
    })
}

/// Create the appropriate [`CompletionProvider`] based on configuration.
///
/// # Supported Providers
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"anthropic"` | [`AnthropicProvider`] |
///
/// # Errors
///
/// Returns an error for unknown provider names or if the API key variable
/// is not set.
pub fn create_provider(config: &ModelConfig) -> Result<Box<dyn CompletionProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "anthropic" => Ok(Box::new(AnthropicProvider::from_env(config)?)),
        other => bail!("Unknown model provider: {}", other),
    }
}
