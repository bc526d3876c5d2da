use std::sync::Arc;

use docdigest_core::{
    Config, Document, Error, Extraction, FileFormat, OcrEngine, OcrSettings, PdfBackend,
    TextSource,
};

pub mod docx;
pub mod ocr;
pub mod pdf;
pub mod spreadsheet;

// Re-export domain types for convenience
pub use docdigest_core::{OcrPageError, PageImage};
pub use ocr::TesseractCli;

/// Picks an extraction strategy from the file extension and runs it.
///
/// Holds the PDF backend and OCR engine so callers (and tests) can swap
/// them out.
#[derive(Clone)]
pub struct Extractor {
    pdf: Option<Arc<dyn PdfBackend>>,
    ocr: Arc<dyn OcrEngine>,
    ocr_settings: OcrSettings,
}

impl Extractor {
    pub fn new(
        pdf: Option<Arc<dyn PdfBackend>>,
        ocr: Arc<dyn OcrEngine>,
        ocr_settings: OcrSettings,
    ) -> Self {
        Self {
            pdf,
            ocr,
            ocr_settings,
        }
    }

    /// Build the production extractor: MuPDF (when the `pdf` feature is on)
    /// and the Tesseract command-line engine.
    pub fn from_config(config: &Config) -> Self {
        let ocr = TesseractCli::new(config.tesseract_path.clone());
        if !ocr.is_available() {
            tracing::warn!(
                tesseract = %config.tesseract_path.display(),
                "tesseract not found; scanned PDFs will extract as empty text"
            );
        }
        Self::new(default_pdf_backend(), Arc::new(ocr), config.ocr.clone())
    }

    /// Extract plain text from `document`.
    ///
    /// Dispatches on the lower-cased extension:
    /// - `.pdf` → text layer, OCR fallback when the layer is blank
    /// - `.docx` → body paragraphs
    /// - `.xlsx` / `.xls` → every row of every sheet
    ///
    /// Anything else is [`Error::UnsupportedFormat`] and is rejected before
    /// any parser sees the bytes.
    pub fn extract(&self, document: &Document) -> Result<Extraction, Error> {
        let extension = document.extension();
        let format = FileFormat::from_extension(&extension)
            .ok_or(Error::UnsupportedFormat { extension })?;

        tracing::info!(
            filename = %document.filename,
            bytes = document.data.len(),
            %format,
            "extracting text"
        );

        let extraction = match format {
            FileFormat::Pdf => {
                let backend = self.pdf.as_deref().ok_or_else(|| {
                    Error::extraction(
                        FileFormat::Pdf,
                        "PDF support not compiled in (enable the `pdf` feature of docdigest-ingest)",
                    )
                })?;
                pdf::extract_pdf(&document.data, backend, self.ocr.as_ref(), &self.ocr_settings)?
            }
            FileFormat::Docx => docx::extract_docx(&document.data)
                .map(|text| Extraction::new(text, TextSource::Docx))
                .map_err(|e| Error::extraction(format, e))?,
            FileFormat::Spreadsheet => spreadsheet::extract_spreadsheet(&document.data)
                .map(|text| Extraction::new(text, TextSource::Spreadsheet))
                .map_err(|e| Error::extraction(format, e))?,
        };

        tracing::info!(
            filename = %document.filename,
            chars = extraction.text.len(),
            source = ?extraction.source,
            failed_pages = extraction.page_failures.len(),
            "extraction complete"
        );
        Ok(extraction)
    }
}

#[cfg(feature = "pdf")]
fn default_pdf_backend() -> Option<Arc<dyn PdfBackend>> {
    Some(Arc::new(docdigest_pdf_mupdf::MupdfBackend::new()))
}

#[cfg(not(feature = "pdf"))]
fn default_pdf_backend() -> Option<Arc<dyn PdfBackend>> {
    None
}
