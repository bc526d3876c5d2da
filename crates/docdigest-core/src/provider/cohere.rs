use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{SummarizeError, Summarizer, build_prompt, post_json, required_str};

pub const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
pub const DEFAULT_MODEL: &str = "command";
pub const MAX_TOKENS: u32 = 500;

/// Cohere text generation.
pub struct Cohere {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Cohere {
    pub fn new(timeout: Duration) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            timeout,
        }
    }
}

impl Summarizer for Cohere {
    fn name(&self) -> &str {
        "Cohere"
    }

    fn summarize<'a>(
        &'a self,
        text: &'a str,
        api_key: &'a str,
        client: &'a reqwest::Client,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}/v1/generate", self.base_url.trim_end_matches('/'));
            let body = serde_json::json!({
                "prompt": build_prompt(text),
                "model": self.model,
                "max_tokens": self.max_tokens,
            });

            let data = post_json(self.name(), client, &url, api_key, &body, self.timeout).await?;
            required_str(
                self.name(),
                &data["generations"][0]["text"],
                "generations[0].text",
            )
            .map(str::to_string)
        })
    }
}
