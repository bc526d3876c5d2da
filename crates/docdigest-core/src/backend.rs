use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("failed to render page: {0}")]
    RenderError(String),
    #[error("OCR engine error: {0}")]
    OcrError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rendered page, encoded as PNG.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number.
    pub page: usize,
    pub dpi: u32,
    pub png: Vec<u8>,
}

/// Trait for PDF backends.
///
/// Implementors provide the two low-level steps the extraction pipeline
/// needs: reading the embedded text layer and rasterizing pages for OCR.
/// The fallback policy between the two lives in `docdigest_ingest::pdf`.
pub trait PdfBackend: Send + Sync {
    /// Text layer of every page, in page order.
    fn page_texts(&self, data: &[u8]) -> Result<Vec<String>, BackendError>;

    /// Render every page at `dpi`, handing each result to `visit` in page
    /// order before the next page is rendered.
    ///
    /// The returned error means the document could not be opened at all; an
    /// inner error is a single page that failed to render. Returns the
    /// number of pages visited.
    fn render_pages(
        &self,
        data: &[u8],
        dpi: u32,
        visit: &mut dyn FnMut(Result<PageImage, BackendError>),
    ) -> Result<usize, BackendError>;
}

/// Trait for optical character recognition engines.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text on one page image.
    ///
    /// `languages` is an engine language hint such as `"por+eng"`; `None`
    /// lets the engine use its default.
    fn recognize(&self, image: &PageImage, languages: Option<&str>)
    -> Result<String, BackendError>;
}
