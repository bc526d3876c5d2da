use std::io::Write;

use docdigest_core::{Extraction, ProviderKind, TextSource};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn source_label(source: TextSource) -> &'static str {
    match source {
        TextSource::TextLayer => "PDF text layer",
        TextSource::Ocr => "OCR",
        TextSource::Docx => "DOCX paragraphs",
        TextSource::Spreadsheet => "spreadsheet rows",
    }
}

/// Report how the text was obtained and any pages OCR dropped.
pub fn print_extraction_report(
    w: &mut dyn Write,
    filename: &str,
    extraction: &Extraction,
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!(
        "Extracted {} characters from {} ({})",
        extraction.text.chars().count(),
        filename,
        source_label(extraction.source)
    );
    if color.enabled() {
        writeln!(w, "{}", line.dimmed())?;
    } else {
        writeln!(w, "{}", line)?;
    }

    for failure in &extraction.page_failures {
        if color.enabled() {
            writeln!(w, "{} {}", "warning:".yellow().bold(), failure)?;
        } else {
            writeln!(w, "warning: {}", failure)?;
        }
    }
    if extraction.text.trim().is_empty() {
        if color.enabled() {
            writeln!(w, "{}", "No text could be extracted.".yellow())?;
        } else {
            writeln!(w, "No text could be extracted.")?;
        }
    }
    Ok(())
}

pub fn print_summary(
    w: &mut dyn Write,
    provider: ProviderKind,
    summary: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    let header = format!("Resumo ({}):", provider);
    if color.enabled() {
        writeln!(w, "{}", header.green().bold())?;
    } else {
        writeln!(w, "{}", header)?;
    }
    writeln!(w)?;
    writeln!(w, "{}", summary.trim())?;
    Ok(())
}
