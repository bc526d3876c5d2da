use mupdf::{Colorspace, Document, ImageFormat, Matrix, Page, TextPageFlags};

use docdigest_core::{BackendError, PageImage, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that non-PDF code paths do not transitively
/// depend on it.
#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }

    fn open(data: &[u8]) -> Result<Document, BackendError> {
        Document::from_bytes(data, "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))
    }
}

/// Text of one page, one output line per structured-text line.
fn page_text(page: &Page) -> Result<String, BackendError> {
    let text_page = page
        .to_text_page(TextPageFlags::empty())
        .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

    let mut text = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            let line_text: String = line
                .chars()
                .map(|c| c.char().unwrap_or('\u{FFFD}'))
                .collect();
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&line_text);
        }
    }
    Ok(text)
}

fn render_page(page: &Page, number: usize, dpi: u32) -> Result<PageImage, BackendError> {
    // PDF user space is 72 units per inch.
    let scale = dpi as f32 / 72.0;
    let matrix = Matrix::new_scale(scale, scale);
    let pixmap = page
        .to_pixmap(&matrix, &Colorspace::device_rgb(), false, false)
        .map_err(|e| BackendError::RenderError(e.to_string()))?;

    let mut png = Vec::new();
    pixmap
        .write_to(&mut png, ImageFormat::PNG)
        .map_err(|e| BackendError::RenderError(e.to_string()))?;

    Ok(PageImage {
        page: number,
        dpi,
        png,
    })
}

impl PdfBackend for MupdfBackend {
    fn page_texts(&self, data: &[u8]) -> Result<Vec<String>, BackendError> {
        let document = Self::open(data)?;

        let mut pages_text = Vec::new();
        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            pages_text.push(page_text(&page)?);
        }

        Ok(pages_text)
    }

    fn render_pages(
        &self,
        data: &[u8],
        dpi: u32,
        visit: &mut dyn FnMut(Result<PageImage, BackendError>),
    ) -> Result<usize, BackendError> {
        let document = Self::open(data)?;

        let mut visited = 0;
        for (i, page_result) in document
            .pages()
            .map_err(|e| BackendError::RenderError(e.to_string()))?
            .enumerate()
        {
            let number = i + 1;
            let image = page_result
                .map_err(|e| BackendError::RenderError(e.to_string()))
                .and_then(|page| render_page(&page, number, dpi));
            if let Err(e) = &image {
                tracing::debug!(page = number, error = %e, "page render failed");
            }
            // Only one rendered page is alive at a time.
            visit(image);
            visited += 1;
        }

        Ok(visited)
    }
}
