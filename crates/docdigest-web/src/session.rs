//! Per-browser state, stored as one value in the session store.

use std::fmt;

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use docdigest_core::ProviderKind;

use crate::error::PageError;

const SESSION_KEY: &str = "docdigest";

/// Everything the app remembers about one browser.
///
/// Loaded at the start of a handler, passed down explicitly and saved back
/// when changed. A new upload replaces the previous text.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub provider: Option<ProviderKind>,
    pub api_key: Option<String>,
    pub extracted_text: Option<String>,
    pub filename: Option<String>,
}

impl SessionContext {
    pub async fn load(session: &Session) -> Result<Self, PageError> {
        let ctx = session
            .get::<SessionContext>(SESSION_KEY)
            .await
            .map_err(|e| PageError::internal(format!("failed to read session: {}", e)))?;
        Ok(ctx.unwrap_or_default())
    }

    pub async fn save(&self, session: &Session) -> Result<(), PageError> {
        session
            .insert(SESSION_KEY, self)
            .await
            .map_err(|e| PageError::internal(format!("failed to write session: {}", e)))
    }

    /// The provider and key, when both are configured.
    pub fn credentials(&self) -> Option<(ProviderKind, &str)> {
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        Some((self.provider?, key))
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("extracted_text", &self.extracted_text.as_ref().map(String::len))
            .field("filename", &self.filename)
            .finish()
    }
}
