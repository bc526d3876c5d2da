use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{SummarizeError, Summarizer, build_prompt, post_json, required_str};

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";

/// HuggingFace hosted inference with a summarization model.
pub struct HuggingFace {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl HuggingFace {
    pub fn new(timeout: Duration) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout,
        }
    }
}

impl Summarizer for HuggingFace {
    fn name(&self) -> &str {
        "HuggingFace"
    }

    fn summarize<'a>(
        &'a self,
        text: &'a str,
        api_key: &'a str,
        client: &'a reqwest::Client,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}/models/{}",
                self.base_url.trim_end_matches('/'),
                self.model
            );
            let body = serde_json::json!({ "inputs": build_prompt(text) });

            let data = post_json(self.name(), client, &url, api_key, &body, self.timeout).await?;
            // The inference API reports model errors (e.g. still loading) as
            // a 200 with an `error` object instead of a list.
            if let Some(message) = data["error"].as_str() {
                return Err(SummarizeError::malformed(self.name(), message));
            }
            required_str(self.name(), &data[0]["summary_text"], "[0].summary_text")
                .map(str::to_string)
        })
    }
}
