//! `/process`: upload a document, edit its text, summarize it.
//!
//! Both steps POST to the same route. A multipart body is an upload; a
//! url-encoded body carries the edited text to summarize.

use std::sync::Arc;

use axum::Form;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_sessions::Session;

use docdigest_core::{Document, Error, ProviderKind};

use crate::error::PageError;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::template;
use crate::upload;

#[derive(Debug, Deserialize)]
pub struct SummarizeForm {
    #[serde(default)]
    pub text: String,
}

pub async fn show(session: Session) -> Result<Response, PageError> {
    let ctx = SessionContext::load(&session).await?;
    let Some((kind, _)) = ctx.credentials() else {
        return Ok(Redirect::to("/settings").into_response());
    };
    Ok(template::render_upload(kind).into_response())
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    session: Session,
    request: Request,
) -> Result<Response, PageError> {
    let mut ctx = SessionContext::load(&session).await?;
    let Some((kind, api_key)) = ctx.credentials() else {
        return Ok(Redirect::to("/settings").into_response());
    };
    let api_key = api_key.to_string();

    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    // Rejections keep axum's status so an oversized body is a 413.
    if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| PageError::new(e.status(), "Requisição inválida", e.body_text()))?;
        let document = upload::parse_multipart(multipart).await?;
        upload_document(&state, &session, &mut ctx, document).await
    } else {
        let Form(form) = Form::<SummarizeForm>::from_request(request, &state)
            .await
            .map_err(|e| PageError::new(e.status(), "Requisição inválida", e.body_text()))?;
        summarize_text(&state, &session, &mut ctx, kind, &api_key, form.text).await
    }
}

async fn upload_document(
    state: &AppState,
    session: &Session,
    ctx: &mut SessionContext,
    document: Document,
) -> Result<Response, PageError> {
    let filename = document.filename.clone();
    let extractor = state.extractor.clone();

    // MuPDF and tesseract block.
    let extraction = tokio::task::spawn_blocking(move || extractor.extract(&document))
        .await
        .map_err(|e| PageError::internal(format!("extraction task failed: {}", e)))?
        .map_err(|e| {
            tracing::warn!(filename = %filename, error = %e, "extraction failed");
            PageError::from(e)
        })?;

    ctx.extracted_text = Some(extraction.text.clone());
    ctx.filename = Some(filename.clone());
    ctx.save(session).await?;

    Ok(template::render_edit(&filename, &extraction.text, &extraction.page_failures).into_response())
}

async fn summarize_text(
    state: &AppState,
    session: &Session,
    ctx: &mut SessionContext,
    kind: ProviderKind,
    api_key: &str,
    text: String,
) -> Result<Response, PageError> {
    // The edited text replaces what was extracted.
    ctx.extracted_text = Some(text.clone());
    ctx.save(session).await?;

    tracing::debug!(
        provider = %kind,
        chars = text.len(),
        filename = ctx.filename.as_deref().unwrap_or("<none>"),
        "summarizing"
    );
    let summary = state
        .providers
        .summarize(kind, &text, api_key, &state.client)
        .await
        .map_err(Error::from)?;

    Ok(template::render_summary(kind, &summary).into_response())
}
