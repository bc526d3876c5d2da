//! Summarization providers: hosted language-model APIs that turn document
//! text into a summary.

pub mod cohere;
pub mod huggingface;
pub mod mock;
pub mod openai;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Config;

pub use cohere::Cohere;
pub use huggingface::HuggingFace;
pub use openai::OpenAi;

/// Fixed prompt prefix; the document text follows after a blank line.
pub const PROMPT_TEMPLATE: &str = "Resuma este documento em português de forma clara e detalhada:";

pub fn build_prompt(text: &str) -> String {
    format!("{PROMPT_TEMPLATE}\n\n{text}")
}

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: String },
    #[error("request to {provider} failed: {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} rejected the API key (HTTP {status})")]
    Unauthorized { provider: String, status: u16 },
    #[error("{provider} returned HTTP {status}: {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },
    #[error("unexpected response from {provider}: {message}")]
    MalformedResponse { provider: String, message: String },
}

impl SummarizeError {
    pub fn malformed(provider: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

/// A provider that can summarize text.
pub trait Summarizer: Send + Sync {
    /// Display name of this provider (e.g., "OpenAI").
    fn name(&self) -> &str;

    /// Produce a summary of `text` with one request to the provider.
    fn summarize<'a>(
        &'a self,
        text: &'a str,
        api_key: &'a str,
        client: &'a reqwest::Client,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>>;
}

/// The supported providers.
///
/// Serialized with the display names used in form values and URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "HuggingFace")]
    HuggingFace,
    #[serde(rename = "OpenAI")]
    OpenAi,
    #[serde(rename = "Cohere")]
    Cohere,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::HuggingFace, Self::OpenAi, Self::Cohere];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HuggingFace => "HuggingFace",
            Self::OpenAi => "OpenAI",
            Self::Cohere => "Cohere",
        }
    }

    /// Step-by-step instructions for obtaining an API key.
    pub fn guide(&self) -> &'static [&'static str] {
        match self {
            Self::HuggingFace => &[
                "1. Acesse https://huggingface.co/settings/tokens",
                "2. Crie um token com acesso \"Read\"",
                "3. Cole o token abaixo",
            ],
            Self::OpenAi => &[
                "1. Acesse https://platform.openai.com/account/api-keys",
                "2. Crie uma nova chave secreta",
                "3. Cole a chave abaixo",
            ],
            Self::Cohere => &[
                "1. Acesse https://dashboard.cohere.ai/api-keys",
                "2. Crie uma nova chave API",
                "3. Cole a chave abaixo",
            ],
        }
    }

    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::HuggingFace => Duration::from_secs(30),
            Self::Cohere => Duration::from_secs(60),
            Self::OpenAi => Duration::from_secs(120),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown AI service: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "openai" => Ok(Self::OpenAi),
            "cohere" => Ok(Self::Cohere),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// One summarizer per [`ProviderKind`].
#[derive(Clone)]
pub struct ProviderRegistry {
    openai: Arc<dyn Summarizer>,
    cohere: Arc<dyn Summarizer>,
    huggingface: Arc<dyn Summarizer>,
}

impl ProviderRegistry {
    /// Build the real HTTP providers, honoring base URL and timeout overrides.
    pub fn from_config(config: &Config) -> Self {
        let timeout = |kind: ProviderKind| config.provider_timeout().unwrap_or(kind.default_timeout());

        let mut openai = OpenAi::new(timeout(ProviderKind::OpenAi));
        if let Some(url) = &config.openai_base_url {
            openai.base_url = url.clone();
        }
        let mut cohere = Cohere::new(timeout(ProviderKind::Cohere));
        if let Some(url) = &config.cohere_base_url {
            cohere.base_url = url.clone();
        }
        let mut huggingface = HuggingFace::new(timeout(ProviderKind::HuggingFace));
        if let Some(url) = &config.huggingface_base_url {
            huggingface.base_url = url.clone();
        }

        Self {
            openai: Arc::new(openai),
            cohere: Arc::new(cohere),
            huggingface: Arc::new(huggingface),
        }
    }

    /// Replace the summarizer for one provider.
    pub fn with(mut self, kind: ProviderKind, summarizer: Arc<dyn Summarizer>) -> Self {
        match kind {
            ProviderKind::OpenAi => self.openai = summarizer,
            ProviderKind::Cohere => self.cohere = summarizer,
            ProviderKind::HuggingFace => self.huggingface = summarizer,
        }
        self
    }

    pub fn get(&self, kind: ProviderKind) -> &dyn Summarizer {
        match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::Cohere => self.cohere.as_ref(),
            ProviderKind::HuggingFace => self.huggingface.as_ref(),
        }
    }

    /// Summarize `text` with the chosen provider.
    pub async fn summarize(
        &self,
        kind: ProviderKind,
        text: &str,
        api_key: &str,
        client: &reqwest::Client,
    ) -> Result<String, SummarizeError> {
        let summarizer = self.get(kind);
        if api_key.trim().is_empty() {
            return Err(SummarizeError::MissingApiKey {
                provider: summarizer.name().to_string(),
            });
        }

        let start = Instant::now();
        let result = summarizer.summarize(text, api_key.trim(), client).await;
        match &result {
            Ok(summary) => tracing::info!(
                provider = summarizer.name(),
                chars = summary.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "summary generated"
            ),
            Err(e) => tracing::warn!(
                provider = summarizer.name(),
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "summarization failed"
            ),
        }
        result
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("openai", &self.openai.name())
            .field("cohere", &self.cohere.name())
            .field("huggingface", &self.huggingface.name())
            .finish()
    }
}

/// POST a JSON body with bearer auth and decode the JSON reply.
///
/// 401/403 map to [`SummarizeError::Unauthorized`], any other non-2xx to
/// [`SummarizeError::Http`].
pub(crate) async fn post_json(
    provider: &str,
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &serde_json::Value,
    timeout: Duration,
) -> Result<serde_json::Value, SummarizeError> {
    tracing::debug!(provider, url, "sending summarization request");

    let resp = client
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| SummarizeError::Network {
            provider: provider.to_string(),
            source,
        })?;

    let status = resp.status();
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(SummarizeError::Unauthorized {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SummarizeError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: truncate(&body, 300),
        });
    }

    resp.json()
        .await
        .map_err(|e| SummarizeError::malformed(provider, format!("invalid JSON: {}", e)))
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Pull a string out of a JSON value or explain which field was missing.
pub(crate) fn required_str<'v>(
    provider: &str,
    value: &'v serde_json::Value,
    field: &str,
) -> Result<&'v str, SummarizeError> {
    value
        .as_str()
        .ok_or_else(|| SummarizeError::malformed(provider, format!("missing field `{}`", field)))
}
