use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{SummarizeError, Summarizer, build_prompt, post_json, required_str};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// OpenAI chat completions.
pub struct OpenAi {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAi {
    pub fn new(timeout: Duration) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout,
        }
    }
}

impl Summarizer for OpenAi {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn summarize<'a>(
        &'a self,
        text: &'a str,
        api_key: &'a str,
        client: &'a reqwest::Client,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}/v1/chat/completions",
                self.base_url.trim_end_matches('/')
            );
            let body = serde_json::json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": build_prompt(text) }],
            });

            let data = post_json(self.name(), client, &url, api_key, &body, self.timeout).await?;
            required_str(
                self.name(),
                &data["choices"][0]["message"]["content"],
                "choices[0].message.content",
            )
            .map(str::to_string)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> OpenAi {
        let mut openai = OpenAi::new(Duration::from_secs(5));
        openai.base_url = server.uri();
        openai
    }

    #[tokio::test]
    async fn extracts_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({ "model": "gpt-3.5-turbo" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "Resumo curto." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let summary = backend(&server)
            .summarize("Um texto longo.", "sk-test", &client)
            .await
            .unwrap();
        assert_eq!(summary, "Resumo curto.");
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = backend(&server)
            .summarize("texto", "sk-test", &client)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::MalformedResponse { .. }), "{err:?}");
    }
}
