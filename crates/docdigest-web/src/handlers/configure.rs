use axum::Form;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_sessions::Session;

use docdigest_core::ProviderKind;

use crate::error::PageError;
use crate::session::SessionContext;
use crate::template;

#[derive(Debug, Deserialize)]
pub struct KeyForm {
    #[serde(default)]
    pub api_key: String,
}

fn provider(service: &str) -> Result<ProviderKind, PageError> {
    service.parse().map_err(|e| {
        PageError::new(
            StatusCode::NOT_FOUND,
            "Serviço não encontrado",
            format!("{}", e),
        )
    })
}

pub async fn show(Path(service): Path<String>) -> Result<Response, PageError> {
    let kind = provider(&service)?;
    Ok(template::render_configure(kind, None).into_response())
}

/// Store the API key for `service` and return to the menu.
pub async fn save_key(
    Path(service): Path<String>,
    session: Session,
    Form(form): Form<KeyForm>,
) -> Result<Response, PageError> {
    let kind = provider(&service)?;
    let key = form.api_key.trim();
    if key.is_empty() {
        let page = template::render_configure(kind, Some("Informe a chave API"));
        return Ok((StatusCode::BAD_REQUEST, page).into_response());
    }

    let mut ctx = SessionContext::load(&session).await?;
    ctx.provider = Some(kind);
    ctx.api_key = Some(key.to_string());
    ctx.save(&session).await?;

    tracing::info!(provider = %kind, "API key stored");
    Ok(Redirect::to("/").into_response())
}
