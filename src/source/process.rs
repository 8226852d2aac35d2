//! External command output as content (`fastfetch`, `neofetch`, `fortune`).
//!
//! The child's stdout is captured up to a byte ceiling. There is no timeout:
//! a hung command blocks the calling job until it exits.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::ContentProvider;
use crate::error::ProviderError;

/// Capture ceiling for command output.
pub const DEFAULT_MAX_BYTES: usize = 2000;

pub struct CommandProvider {
    label: String,
    program: String,
    args: Vec<String>,
    max_bytes: usize,
}

impl CommandProvider {
    pub fn new(label: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// Drop a UTF-8 sequence cut in half by the byte ceiling.
fn decode_prefix(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[async_trait]
impl ContentProvider for CommandProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn produce(&self) -> Result<String, ProviderError> {
        let exec_error = |source| ProviderError::Exec {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(exec_error)?;

        let mut captured = Vec::with_capacity(self.max_bytes.min(8192));
        if let Some(stdout) = child.stdout.take() {
            stdout
                .take(self.max_bytes as u64)
                .read_to_end(&mut captured)
                .await
                .map_err(exec_error)?;
        }

        if captured.len() >= self.max_bytes {
            // Output hit the ceiling; the rest is not wanted.
            let _ = child.start_kill();
        }
        if let Err(e) = child.wait().await {
            tracing::debug!(provider = %self.label, error = %e, "failed to reap child");
        }

        Ok(decode_prefix(&captured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_trims_split_sequence() {
        let bytes = "ab🛸".as_bytes();
        assert_eq!(decode_prefix(&bytes[..4]), "ab");
        assert_eq!(decode_prefix(bytes), "ab🛸");
    }

    #[tokio::test]
    async fn missing_program_is_exec_error() {
        let provider = CommandProvider::new("ghost", "relaybot-no-such-program", vec![]);
        let err = provider.produce().await.unwrap_err();
        assert!(matches!(err, ProviderError::Exec { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout() {
        let provider = CommandProvider::new("echo", "echo", vec!["hello".into()]);
        assert_eq!(provider.produce().await.unwrap(), "hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_is_capped() {
        let provider = CommandProvider::new("yes", "yes", vec![]).with_max_bytes(100);
        let text = provider.produce().await.unwrap();
        assert_eq!(text.len(), 100);
        assert!(text.starts_with("y\ny\n"));
    }
}
