use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use docdigest_core::Document;

use crate::error::PageError;

/// Read the `file` field of an upload form into a [`Document`].
///
/// Other fields are drained and ignored. The format is not checked here;
/// the extractor rejects unsupported extensions.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<Document, PageError> {
    let mut document: Option<Document> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(multipart_error)?
                    .to_vec();

                if filename.is_empty() {
                    return Err(PageError::bad_request("Nenhum arquivo selecionado"));
                }
                document = Some(Document::new(filename, data));
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    document.ok_or_else(|| PageError::bad_request("Nenhum arquivo enviado"))
}

/// Keeps the status axum picked, so an oversized body stays a 413.
fn multipart_error(err: MultipartError) -> PageError {
    PageError::new(err.status(), "Falha no envio", err.body_text())
}
