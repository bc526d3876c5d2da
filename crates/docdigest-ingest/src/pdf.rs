//! PDF text extraction with an OCR fallback for scanned documents.
//!
//! The embedded text layer is always tried first. Only when the joined text
//! of every page is empty or whitespace does the pipeline rasterize the pages
//! and run OCR on each one. OCR degrades page by page: a page that fails to
//! render or recognize is logged, recorded in
//! [`Extraction::page_failures`], and left out of the text.

use docdigest_core::{
    Error, Extraction, FileFormat, OcrEngine, OcrPageError, OcrSettings, PdfBackend, TextSource,
};

pub fn extract_pdf(
    data: &[u8],
    backend: &dyn PdfBackend,
    ocr: &dyn OcrEngine,
    settings: &OcrSettings,
) -> Result<Extraction, Error> {
    let pages = backend
        .page_texts(data)
        .map_err(|e| Error::extraction(FileFormat::Pdf, e))?;
    let text = pages.join("\n");

    if !needs_ocr(&text) {
        tracing::debug!(pages = pages.len(), chars = text.len(), "using embedded text layer");
        return Ok(Extraction::new(text, TextSource::TextLayer));
    }

    tracing::info!(
        pages = pages.len(),
        dpi = settings.dpi,
        languages = settings.languages.as_deref().unwrap_or("<default>"),
        "no text layer found, falling back to OCR"
    );
    ocr_pages(data, backend, ocr, settings)
}

/// The fallback trigger: a blank text layer, nothing smarter.
pub fn needs_ocr(text_layer: &str) -> bool {
    text_layer.trim().is_empty()
}

fn ocr_pages(
    data: &[u8],
    backend: &dyn PdfBackend,
    ocr: &dyn OcrEngine,
    settings: &OcrSettings,
) -> Result<Extraction, Error> {
    let mut texts = Vec::new();
    let mut failures = Vec::new();
    let mut page = 0;

    backend
        .render_pages(data, settings.dpi, &mut |image| {
            page += 1;
            let recognized =
                image.and_then(|img| ocr.recognize(&img, settings.languages.as_deref()));
            match recognized {
                Ok(text) => {
                    tracing::debug!(page, chars = text.len(), "OCR page complete");
                    texts.push(text);
                }
                Err(e) => {
                    tracing::warn!(page, error = %e, "OCR failed, skipping page");
                    failures.push(OcrPageError {
                        page,
                        message: e.to_string(),
                    });
                }
            }
        })
        .map_err(|e| Error::extraction(FileFormat::Pdf, e))?;

    tracing::debug!(pages = page, failed = failures.len(), "OCR finished");
    Ok(Extraction {
        text: texts.join("\n"),
        source: TextSource::Ocr,
        page_failures: failures,
    })
}
