use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use docdigest_core::{
    Config, Document, Extraction, ProviderKind, ProviderRegistry, clamp_dpi, config_file,
    normalize_languages,
};
use docdigest_ingest::Extractor;

mod output;

use output::ColorMode;

/// Log filter when `RUST_LOG` is unset; stderr carries only warnings.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Document summarizer - extract text from PDF, DOCX and spreadsheets and
/// summarize it with a hosted language model
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// OCR render resolution for scanned PDFs (72-600)
    #[arg(long, global = true)]
    dpi: Option<u32>,

    /// Tesseract language list, e.g. "por+eng"; empty for no hint
    #[arg(long, global = true)]
    ocr_languages: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the text of a document
    Extract {
        /// Path to the .pdf, .docx, .xlsx or .xls file
        file_path: PathBuf,

        /// Write the text here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract a document and summarize it
    Summarize {
        /// Path to the .pdf, .docx, .xlsx or .xls file
        file_path: PathBuf,

        /// AI service: openai, cohere or huggingface
        #[arg(short, long)]
        provider: ProviderKind,

        /// API key (falls back to DOCDIGEST_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr so extracted text on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Resolve configuration: CLI flags > env vars > config files > defaults
    let mut config = config_file::resolve(&config_file::load_config());
    config.apply_env();
    if let Some(dpi) = cli.dpi {
        config.ocr.dpi = clamp_dpi(dpi);
    }
    if let Some(ref langs) = cli.ocr_languages {
        config.ocr.languages = normalize_languages(langs);
    }

    let color = ColorMode(!cli.no_color);

    match cli.command {
        Command::Extract { file_path, output } => {
            extract(&config, &file_path, output.as_deref(), color).await
        }
        Command::Summarize {
            file_path,
            provider,
            api_key,
        } => {
            let api_key = api_key
                .or_else(|| std::env::var("DOCDIGEST_API_KEY").ok())
                .filter(|k| !k.trim().is_empty())
                .context("no API key: pass --api-key or set DOCDIGEST_API_KEY")?;
            summarize(&config, &file_path, provider, &api_key, color).await
        }
    }
}

async fn run_extraction(
    config: &Config,
    file_path: &Path,
) -> anyhow::Result<(String, Extraction)> {
    let document = Document::from_path(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    let filename = document.filename.clone();
    let extractor = Extractor::from_config(config);

    let extraction = tokio::task::spawn_blocking(move || extractor.extract(&document))
        .await
        .context("extraction task panicked")??;
    Ok((filename, extraction))
}

async fn extract(
    config: &Config,
    file_path: &Path,
    output: Option<&Path>,
    color: ColorMode,
) -> anyhow::Result<()> {
    let (filename, extraction) = run_extraction(config, file_path).await?;
    output::print_extraction_report(&mut std::io::stderr(), &filename, &extraction, color)?;

    match output {
        Some(path) => {
            std::fs::write(path, &extraction.text)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout();
            writeln!(stdout, "{}", extraction.text)?;
        }
    }
    Ok(())
}

async fn summarize(
    config: &Config,
    file_path: &Path,
    provider: ProviderKind,
    api_key: &str,
    color: ColorMode,
) -> anyhow::Result<()> {
    let (filename, extraction) = run_extraction(config, file_path).await?;
    output::print_extraction_report(&mut std::io::stderr(), &filename, &extraction, color)?;
    ensure_summarizable(&filename, &extraction)?;

    let registry = ProviderRegistry::from_config(config);
    let client = reqwest::Client::new();
    let summary = registry
        .summarize(provider, &extraction.text, api_key, &client)
        .await?;

    output::print_summary(&mut std::io::stdout(), provider, &summary, color)?;
    Ok(())
}

/// Refuse blank text. When OCR dropped pages, the first failure is the reason.
fn ensure_summarizable(filename: &str, extraction: &Extraction) -> anyhow::Result<()> {
    if !extraction.text.trim().is_empty() {
        return Ok(());
    }
    if let Some(failure) = extraction.page_failures.first() {
        return Err(anyhow::Error::new(docdigest_core::Error::from(failure.clone()))
            .context(format!("nothing to summarize in {}", filename)));
    }
    anyhow::bail!("nothing to summarize in {}", filename)
}
