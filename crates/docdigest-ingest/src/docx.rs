//! DOCX text extraction.
//!
//! Reads `word/document.xml` from the ZIP container and walks it with a
//! SAX-style reader. Each paragraph directly under `<w:body>` becomes one
//! line. Paragraphs nested in tables or text boxes are not emitted.

use std::io::{BufRead, BufReader, Cursor};

use quick_xml::Reader;
use quick_xml::events::Event;

use docdigest_core::BackendError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the body paragraphs of a DOCX file, joined with `\n`.
pub fn extract_docx(data: &[u8]) -> Result<String, BackendError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| BackendError::OpenError(format!("not a DOCX container: {}", e)))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| BackendError::OpenError(format!("missing {}: {}", DOCUMENT_PART, e)))?;

    let paragraphs = parse_paragraphs(BufReader::new(part))?;
    Ok(paragraphs.join("\n"))
}

/// Parse the paragraphs of a WordprocessingML document part.
///
/// Within a paragraph, `<w:t>` text is concatenated, `<w:tab/>` becomes a
/// tab and `<w:br/>`/`<w:cr/>` become newlines. Only elements inside runs
/// count, so tab-stop definitions in paragraph properties are ignored.
pub fn parse_paragraphs<R: BufRead>(reader: R) -> Result<Vec<String>, BackendError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(4096);
    let mut paragraphs = Vec::new();

    // State
    let mut depth = 0usize;
    let mut body_depth: Option<usize> = None;
    // Open <w:tbl> / <w:txbxContent> elements inside the body.
    let mut nested = 0usize;
    let mut current: Option<String> = None;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"body" if body_depth.is_none() => body_depth = Some(depth),
                    b"p" if nested == 0
                        && current.is_none()
                        && body_depth.is_some_and(|d| depth == d + 1) =>
                    {
                        current = Some(String::new());
                    }
                    b"tbl" | b"txbxContent" if body_depth.is_some() => nested += 1,
                    // Runs inside a nested text box must not touch the
                    // state of the run that contains the drawing.
                    b"r" if nested == 0 => in_run = true,
                    b"t" if nested == 0 => in_text = in_run,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.local_name();
                if nested == 0 {
                    if let Some(text) = current.as_mut().filter(|_| in_run) {
                        match name.as_ref() {
                            b"tab" => text.push('\t'),
                            b"br" | b"cr" => text.push('\n'),
                            _ => {}
                        }
                    } else if name.as_ref() == b"p" && body_depth == Some(depth) {
                        paragraphs.push(String::new());
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text && nested == 0 {
                    if let Some(text) = current.as_mut() {
                        let unescaped = e.unescape().map_err(|err| {
                            BackendError::ExtractionError(format!("bad text in {}: {}", DOCUMENT_PART, err))
                        })?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                match e.local_name().as_ref() {
                    b"p" if nested == 0 && body_depth.is_some_and(|d| depth == d + 1) => {
                        if let Some(text) = current.take() {
                            paragraphs.push(text);
                        }
                    }
                    b"tbl" | b"txbxContent" if nested > 0 => nested -= 1,
                    b"r" if nested == 0 => in_run = false,
                    b"t" if nested == 0 => in_text = false,
                    b"body" => body_depth = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BackendError::ExtractionError(format!(
                    "invalid {} at byte {}: {}",
                    DOCUMENT_PART,
                    xml.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}
