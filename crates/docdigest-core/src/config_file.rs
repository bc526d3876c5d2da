use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Config, clamp_dpi, normalize_languages};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub ocr: Option<OcrConfig>,
    pub providers: Option<ProvidersConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub max_upload_mb: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    pub dpi: Option<u32>,
    pub languages: Option<String>,
    pub tesseract_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub timeout_secs: Option<u64>,
    pub openai_base_url: Option<String>,
    pub cohere_base_url: Option<String>,
    pub huggingface_base_url: Option<String>,
}

/// Platform config directory path: `<config_dir>/docdigest/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docdigest").join("config.toml"))
}

/// Load config by cascading CWD `.docdigest.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".docdigest.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

fn pick<S, T>(
    overlay: &Option<S>,
    base: &Option<S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        server: Some(ServerConfig {
            bind: pick(&overlay.server, &base.server, |s| s.bind.clone()),
            max_upload_mb: pick(&overlay.server, &base.server, |s| s.max_upload_mb),
        }),
        ocr: Some(OcrConfig {
            dpi: pick(&overlay.ocr, &base.ocr, |o| o.dpi),
            languages: pick(&overlay.ocr, &base.ocr, |o| o.languages.clone()),
            tesseract_path: pick(&overlay.ocr, &base.ocr, |o| o.tesseract_path.clone()),
        }),
        providers: Some(ProvidersConfig {
            timeout_secs: pick(&overlay.providers, &base.providers, |p| p.timeout_secs),
            openai_base_url: pick(&overlay.providers, &base.providers, |p| {
                p.openai_base_url.clone()
            }),
            cohere_base_url: pick(&overlay.providers, &base.providers, |p| {
                p.cohere_base_url.clone()
            }),
            huggingface_base_url: pick(&overlay.providers, &base.providers, |p| {
                p.huggingface_base_url.clone()
            }),
        }),
    }
}

/// Resolve a (possibly partial) config file into a full [`Config`],
/// filling gaps with defaults.
pub fn resolve(file: &ConfigFile) -> Config {
    let mut config = Config::default();

    if let Some(server) = &file.server {
        if let Some(bind) = &server.bind {
            config.bind = bind.clone();
        }
        if let Some(mb) = server.max_upload_mb {
            config.max_upload_mb = mb;
        }
    }
    if let Some(ocr) = &file.ocr {
        if let Some(dpi) = ocr.dpi {
            config.ocr.dpi = clamp_dpi(dpi);
        }
        if let Some(langs) = &ocr.languages {
            config.ocr.languages = normalize_languages(langs);
        }
        if let Some(path) = &ocr.tesseract_path {
            config.tesseract_path = PathBuf::from(path);
        }
    }
    if let Some(providers) = &file.providers {
        config.provider_timeout_secs = providers.timeout_secs;
        config.openai_base_url = providers.openai_base_url.clone();
        config.cohere_base_url = providers.cohere_base_url.clone();
        config.huggingface_base_url = providers.huggingface_base_url.clone();
    }

    config
}
