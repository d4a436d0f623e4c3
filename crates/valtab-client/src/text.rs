//! Byte-to-text adapters.
//!
//! - [`Utf8Passthrough`]: documents already published as UTF-8 text.
//! - [`PdfToText`]: pipes PDF bytes through an external `pdftotext`
//!   (poppler) process with `-layout`, so table rows stay on one line.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use valtab_update::{PortError, TextExtractor};

/// Decodes bytes as UTF-8, dropping a leading byte-order mark.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Passthrough;

#[async_trait]
impl TextExtractor for Utf8Passthrough {
    async fn to_text(&self, bytes: &[u8]) -> Result<String, PortError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        String::from_utf8(bytes.to_vec())
            .map_err(|e| PortError::TextExtraction(format!("document is not UTF-8: {e}")))
    }
}

/// Runs `pdftotext -layout -enc UTF-8 - -` on the document bytes.
#[derive(Debug, Clone)]
pub struct PdfToText {
    program: String,
}

impl Default for PdfToText {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl PdfToText {
    /// Use `program` as the converter executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl TextExtractor for PdfToText {
    async fn to_text(&self, bytes: &[u8]) -> Result<String, PortError> {
        let mut child = Command::new(&self.program)
            .args(["-layout", "-enc", "UTF-8", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PortError::TextExtraction(format!("failed to start {}: {e}", self.program))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PortError::TextExtraction("converter stdin unavailable".into()))?;
        let input = bytes.to_vec();
        // Feed stdin concurrently so a full stdout pipe cannot stall the child.
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PortError::TextExtraction(format!("{} failed: {e}", self.program)))?;
        if let Ok(Err(e)) = writer.await {
            if output.status.success() {
                return Err(PortError::TextExtraction(format!(
                    "failed to write document to {}: {e}",
                    self.program
                )));
            }
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PortError::TextExtraction(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| PortError::TextExtraction(format!("converter output is not UTF-8: {e}")))
    }
}
