use docdigest_core::{Config, ProviderRegistry};
use docdigest_ingest::Extractor;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub extractor: Extractor,
    pub providers: ProviderRegistry,
    pub client: reqwest::Client,
    pub config: Config,
}

impl AppState {
    /// Build production state: MuPDF + Tesseract extraction and the real
    /// HTTP providers.
    pub fn from_config(config: Config) -> Self {
        Self {
            extractor: Extractor::from_config(&config),
            providers: ProviderRegistry::from_config(&config),
            client: reqwest::Client::new(),
            config,
        }
    }
}
