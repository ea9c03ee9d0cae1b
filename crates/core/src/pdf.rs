//! HTML to PDF conversion through a headless Chromium binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::RngCore;

/// Error type for PDF rendering.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("PDF renderer binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("PDF renderer failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("PDF renderer timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Invokes `<binary> --headless --print-to-pdf=<out> <in.html>`.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    pub binary: String,
    pub timeout: Duration,
}

impl PdfRenderer {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Render `html` and return the PDF bytes. Scratch files are removed
    /// whether or not rendering succeeds.
    pub async fn render(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        let (input, output) = scratch_paths();
        tokio::fs::write(&input, html).await?;

        let result = self.run(&input, &output).await;

        let _ = tokio::fs::remove_file(&input).await;
        let bytes = match result {
            Ok(()) => tokio::fs::read(&output).await.map_err(PdfError::from),
            Err(e) => Err(e),
        };
        let _ = tokio::fs::remove_file(&output).await;
        bytes
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<(), PdfError> {
        let mut command = tokio::process::Command::new(&self.binary);
        command
            .args([
                "--headless",
                "--disable-gpu",
                "--no-sandbox",
                "--no-pdf-header-footer",
            ])
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(input)
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| PdfError::Timeout(self.timeout))?
            .map_err(PdfError::NotFound)?;

        if !output.status.success() {
            return Err(PdfError::ExecutionFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(())
    }
}

fn scratch_paths() -> (PathBuf, PathBuf) {
    let mut bytes = [0u8; 8];
    rand::rng().fill_bytes(&mut bytes);
    let stem: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let dir = std::env::temp_dir();
    (
        dir.join(format!("healthvitals-report-{stem}.html")),
        dir.join(format!("healthvitals-report-{stem}.pdf")),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn scratch_paths_are_unique_and_paired() {
        let (a_in, a_out) = scratch_paths();
        let (b_in, _) = scratch_paths();
        assert_ne!(a_in, b_in);
        assert_eq!(a_in.with_extension("pdf"), a_out);
    }

    #[tokio::test]
    async fn missing_binary_is_not_found() {
        let renderer = PdfRenderer::new("/nonexistent/healthvitals-chromium", Duration::from_secs(5));
        let result = renderer.render("<p>hi</p>").await;
        assert_matches!(result, Err(PdfError::NotFound(_)));
    }

    #[tokio::test]
    async fn failing_binary_reports_exit_code() {
        let renderer = PdfRenderer::new("false", Duration::from_secs(5));
        let result = renderer.render("<p>hi</p>").await;
        assert_matches!(result, Err(PdfError::ExecutionFailed { .. }));
    }
}
