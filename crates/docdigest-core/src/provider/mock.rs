//! Mock summarizer for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{SummarizeError, Summarizer};

/// A configurable mock response for [`MockSummarizer`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this summary.
    Summary(String),
    /// Echo the input text back, prefixed with `"resumo: "`.
    Echo,
    /// Simulate a response without the expected summary field.
    Malformed(String),
    /// Simulate a rejected API key.
    Unauthorized,
}

/// A hand-rolled mock implementing [`Summarizer`] for tests.
///
/// Records every `(text, api_key)` pair it is called with.
pub struct MockSummarizer {
    name: &'static str,
    response: MockResponse,
    calls: Mutex<Vec<(String, String)>>,
    call_count: AtomicUsize,
}

impl MockSummarizer {
    pub fn new(name: &'static str, response: MockResponse) -> Self {
        Self {
            name,
            response,
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `summarize()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The `(text, api_key)` pairs seen so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Summarizer for MockSummarizer {
    fn name(&self) -> &str {
        self.name
    }

    fn summarize<'a>(
        &'a self,
        text: &'a str,
        api_key: &'a str,
        _client: &'a reqwest::Client,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((text.to_string(), api_key.to_string()));
        }
        let response = self.response.clone();

        Box::pin(async move {
            match response {
                MockResponse::Summary(summary) => Ok(summary),
                MockResponse::Echo => Ok(format!("resumo: {}", text)),
                MockResponse::Malformed(message) => {
                    Err(SummarizeError::malformed(self.name, message))
                }
                MockResponse::Unauthorized => Err(SummarizeError::Unauthorized {
                    provider: self.name.to_string(),
                    status: 401,
                }),
            }
        })
    }
}
