use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use docdigest_core::{Error, SummarizeError};

use crate::template;

/// A failed request, rendered as an error page with a matching status.
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub title: &'static str,
    pub message: String,
}

impl PageError {
    pub fn new(status: StatusCode, title: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            title,
            message: message.into(),
        }
    }

    pub fn internal(message: impl fmt::Display) -> Self {
        tracing::error!(error = %message, "internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Erro interno",
            message.to_string(),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Requisição inválida", message)
    }
}

impl From<Error> for PageError {
    fn from(err: Error) -> Self {
        match &err {
            Error::UnsupportedFormat { .. } => Self::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Formato não suportado",
                format!("{}. Envie um arquivo .pdf, .docx, .xlsx ou .xls.", err),
            ),
            Error::ExtractionFailed { .. } | Error::OcrPageFailed(_) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Erro na extração",
                err.to_string(),
            ),
            Error::SummarizationFailed(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "Erro na geração", err.to_string())
            }
        }
    }
}

impl From<SummarizeError> for PageError {
    fn from(err: SummarizeError) -> Self {
        Error::from(err).into()
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (self.status, template::render_error(self.title, &self.message)).into_response()
    }
}
