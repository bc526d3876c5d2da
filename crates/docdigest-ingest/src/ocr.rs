//! OCR through the `tesseract` command-line program.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use docdigest_core::{BackendError, OcrEngine, PageImage};

/// Runs `tesseract <image> stdout [-l <languages>]` once per page.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(PathBuf::from("tesseract"))
    }
}

impl TesseractCli {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Check whether the tesseract binary can be launched.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .is_ok_and(|out| out.status.success())
    }

    fn command(&self, image: &std::path::Path, languages: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(image).arg("stdout");
        if let Some(langs) = languages {
            cmd.arg("-l").arg(langs);
        }
        cmd
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(
        &self,
        image: &PageImage,
        languages: Option<&str>,
    ) -> Result<String, BackendError> {
        let mut file = tempfile::Builder::new()
            .prefix("docdigest-page-")
            .suffix(".png")
            .tempfile()?;
        file.write_all(&image.png)?;
        file.flush()?;

        let output = self
            .command(file.path(), languages)
            .output()
            .map_err(|e| {
                BackendError::OcrError(format!(
                    "failed to run {} on page {}: {}",
                    self.program.display(),
                    image.page,
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::OcrError(format!(
                "tesseract exited with {} on page {}: {}",
                output.status,
                image.page,
                stderr.trim()
            )));
        }

        // Tesseract terminates each page with a form feed.
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text.trim_end_matches(['\u{000C}', '\n', '\r', ' ']).to_string())
    }
}
