use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod provider;

// Re-export for convenience
pub use backend::{BackendError, OcrEngine, PageImage, PdfBackend};
pub use provider::{
    PROMPT_TEMPLATE, ProviderKind, ProviderRegistry, SummarizeError, Summarizer, UnknownProvider,
    build_prompt,
};

/// An uploaded document: raw bytes plus the name it was uploaded under.
///
/// Lives only for the duration of one request.
#[derive(Clone)]
pub struct Document {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Read a document from disk, keeping only the file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, data })
    }

    /// Lower-cased extension of the declared file name, without the dot.
    pub fn extension(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("filename", &self.filename)
            .field("len", &self.data.len())
            .finish()
    }
}

/// The supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Docx,
    /// `.xlsx` and `.xls` workbooks.
    Spreadsheet,
}

impl FileFormat {
    /// Pick a format from a lower-cased extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Spreadsheet => "spreadsheet",
        };
        f.write_str(name)
    }
}

/// Where the extracted text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// Embedded PDF text layer.
    TextLayer,
    /// Rendered PDF pages run through OCR.
    Ocr,
    Docx,
    Spreadsheet,
}

/// A page whose OCR contribution was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("OCR failed on page {page}: {message}")]
pub struct OcrPageError {
    /// 1-based page number.
    pub page: usize,
    pub message: String,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub source: TextSource,
    /// Non-fatal per-page OCR failures, in page order.
    pub page_failures: Vec<OcrPageError>,
}

impl Extraction {
    pub fn new(text: String, source: TextSource) -> Self {
        Self {
            text,
            source,
            page_failures: Vec::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported format: .{extension}")]
    UnsupportedFormat { extension: String },
    #[error("failed to extract {format} text: {message}")]
    ExtractionFailed { format: FileFormat, message: String },
    /// A single OCR page failure raised as an error. The extractor only
    /// records these in [`Extraction::page_failures`]; callers lift one with
    /// `Error::from` when an empty result must fail.
    #[error(transparent)]
    OcrPageFailed(#[from] OcrPageError),
    #[error("summarization failed: {0}")]
    SummarizationFailed(#[from] SummarizeError),
}

impl Error {
    pub fn extraction(format: FileFormat, err: impl fmt::Display) -> Self {
        Self::ExtractionFailed {
            format,
            message: err.to_string(),
        }
    }
}

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_OCR_DPI: u32 = 300;
pub const DEFAULT_OCR_LANGUAGES: &str = "por+eng";
pub const MIN_OCR_DPI: u32 = 72;
pub const MAX_OCR_DPI: u32 = 600;

/// Settings for the OCR fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub dpi: u32,
    /// Tesseract-style language hint; `None` passes no hint.
    pub languages: Option<String>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_OCR_DPI,
            languages: Some(DEFAULT_OCR_LANGUAGES.to_string()),
        }
    }
}

/// Resolved application configuration.
#[derive(Clone)]
pub struct Config {
    pub bind: String,
    pub max_upload_mb: usize,
    pub ocr: OcrSettings,
    pub tesseract_path: PathBuf,
    /// Overrides every provider's default request timeout when set.
    pub provider_timeout_secs: Option<u64>,
    pub openai_base_url: Option<String>,
    pub cohere_base_url: Option<String>,
    pub huggingface_base_url: Option<String>,
    /// Session cookie signing key (at least 64 bytes).
    pub secret_key: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field("max_upload_mb", &self.max_upload_mb)
            .field("ocr", &self.ocr)
            .field("tesseract_path", &self.tesseract_path)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("openai_base_url", &self.openai_base_url)
            .field("cohere_base_url", &self.cohere_base_url)
            .field("huggingface_base_url", &self.huggingface_base_url)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            ocr: OcrSettings::default(),
            tesseract_path: PathBuf::from("tesseract"),
            provider_timeout_secs: None,
            openai_base_url: None,
            cohere_base_url: None,
            huggingface_base_url: None,
            secret_key: None,
        }
    }
}

impl Config {
    /// Layer `DOCDIGEST_*` environment variables over the current values.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = var("DOCDIGEST_BIND") {
            self.bind = bind;
        }
        if let Some(mb) = var("DOCDIGEST_MAX_UPLOAD_MB").and_then(|v| v.parse().ok()) {
            self.max_upload_mb = mb;
        }
        if let Some(dpi) = var("DOCDIGEST_OCR_DPI").and_then(|v| v.parse().ok()) {
            self.ocr.dpi = clamp_dpi(dpi);
        }
        if let Some(langs) = var("DOCDIGEST_OCR_LANGUAGES") {
            self.ocr.languages = normalize_languages(&langs);
        }
        if let Some(path) = var("DOCDIGEST_TESSERACT") {
            self.tesseract_path = PathBuf::from(path);
        }
        if let Some(secs) = var("DOCDIGEST_PROVIDER_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.provider_timeout_secs = Some(secs);
        }
        if let Some(key) = var("DOCDIGEST_SECRET_KEY") {
            self.secret_key = Some(key);
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_secs.map(Duration::from_secs)
    }
}

/// Keep the render DPI inside the range Tesseract handles well.
pub fn clamp_dpi(dpi: u32) -> u32 {
    let clamped = dpi.clamp(MIN_OCR_DPI, MAX_OCR_DPI);
    if clamped != dpi {
        tracing::warn!(requested = dpi, used = clamped, "OCR DPI out of range, clamping");
    }
    clamped
}

/// An empty or whitespace-only language list means "no hint".
pub fn normalize_languages(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn extension_is_lowercased() {
        let doc = Document::new("Report.PDF", vec![]);
        assert_eq!(doc.extension(), "pdf");
        assert_eq!(FileFormat::from_extension(&doc.extension()), Some(FileFormat::Pdf));
    }

    #[test]
    fn extension_missing() {
        let doc = Document::new("README", vec![]);
        assert_eq!(doc.extension(), "");
        assert_eq!(FileFormat::from_extension(""), None);
    }

    #[test]
    fn both_workbook_extensions_map_to_spreadsheet() {
        assert_eq!(FileFormat::from_extension("xlsx"), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::from_extension("xls"), Some(FileFormat::Spreadsheet));
        assert_eq!(FileFormat::from_extension("csv"), None);
    }

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("DOCDIGEST_BIND", "127.0.0.1:8080"),
            ("DOCDIGEST_OCR_DPI", "200"),
            ("DOCDIGEST_OCR_LANGUAGES", "  "),
            ("DOCDIGEST_PROVIDER_TIMEOUT", "45"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_vars(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.ocr.dpi, 200);
        assert_eq!(config.ocr.languages, None);
        assert_eq!(config.provider_timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.max_upload_mb, DEFAULT_MAX_UPLOAD_MB);
    }

    #[test]
    fn dpi_is_clamped() {
        assert_eq!(clamp_dpi(10), MIN_OCR_DPI);
        assert_eq!(clamp_dpi(5000), MAX_OCR_DPI);
        assert_eq!(clamp_dpi(250), 250);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = Config {
            secret_key: Some("hunter2".into()),
            ..Config::default()
        };
        let dbg = format!("{:?}", config);
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("***"));
    }
}
