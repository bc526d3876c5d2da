use axum::Form;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_sessions::Session;

use docdigest_core::ProviderKind;

use crate::error::PageError;
use crate::session::SessionContext;
use crate::template;

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub ai_service: String,
}

pub async fn show(session: Session) -> Result<Response, PageError> {
    let ctx = SessionContext::load(&session).await?;
    Ok(template::render_settings(ctx.provider, None).into_response())
}

/// Store the chosen provider and continue to its key form.
pub async fn choose(
    session: Session,
    Form(form): Form<SettingsForm>,
) -> Result<Response, PageError> {
    let kind: ProviderKind = match form.ai_service.parse() {
        Ok(kind) => kind,
        Err(e) => {
            tracing::debug!(service = %form.ai_service, "rejected unknown AI service");
            let page = template::render_settings(None, Some(&format!("{}", e)));
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    let mut ctx = SessionContext::load(&session).await?;
    if ctx.provider != Some(kind) {
        // A key belongs to one provider.
        ctx.api_key = None;
    }
    ctx.provider = Some(kind);
    ctx.save(&session).await?;

    tracing::info!(provider = %kind, "provider selected");
    Ok(Redirect::to(&format!("/configure/{}", kind.as_str())).into_response())
}
