//! HEIC/HEIF conversion behind a trait seam.
//!
//! The `image` crate cannot decode HEIC, so those files are handed to an
//! external converter first. Any failure is recoverable: the loader falls
//! back to the original bytes and lets the decoder report what it can.

use anyhow::{Context, Result, bail};
use tokio::process::Command;

/// Placeholder replaced with the input file path in converter arguments.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced with the output file path in converter arguments.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Converts HEIC bytes into something `image` can decode.
///
/// # Example
///
/// ```rust,no_run
/// use exif_frame::transcode::{CommandTranscoder, Transcoder};
///
/// # async fn example() -> anyhow::Result<()> {
/// let heic = std::fs::read("IMG_0001.HEIC")?;
/// let png = CommandTranscoder::default().transcode(&heic).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait Transcoder: Send + Sync {
    /// Display name used in log lines.
    fn name(&self) -> &str;
    /// Convert the whole file, returning encoded PNG/JPEG bytes.
    async fn transcode(&self, bytes: &[u8]) -> Result<Vec<u8>>;
}

/// Runs a converter program on a temporary copy of the file.
///
/// The default is `heif-convert {input} {output}` from libheif, writing PNG.
#[derive(Debug, Clone)]
pub struct CommandTranscoder {
    program: String,
    args: Vec<String>,
}

impl CommandTranscoder {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn expand_args(&self, input: &str, output: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, input)
                    .replace(OUTPUT_PLACEHOLDER, output)
            })
            .collect()
    }
}

impl Default for CommandTranscoder {
    fn default() -> Self {
        Self::new(
            "heif-convert",
            vec![INPUT_PLACEHOLDER.to_string(), OUTPUT_PLACEHOLDER.to_string()],
        )
    }
}

#[async_trait::async_trait]
impl Transcoder for CommandTranscoder {
    fn name(&self) -> &str {
        &self.program
    }

    async fn transcode(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let dir = tempfile::TempDir::new().context("Failed to create temp directory")?;
        let input = dir.path().join("input.heic");
        let output = dir.path().join("output.png");
        tokio::fs::write(&input, bytes)
            .await
            .context("Failed to stage HEIC input")?;

        let args = self.expand_args(&input.to_string_lossy(), &output.to_string_lossy());
        log::debug!("Running {} {}", self.program, args.join(" "));

        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            );
        }

        tokio::fs::read(&output)
            .await
            .with_context(|| format!("{} produced no output", self.program))
    }
}

/// A transcoder that always fails, forcing the original-bytes fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranscoder;

#[async_trait::async_trait]
impl Transcoder for NoTranscoder {
    fn name(&self) -> &str {
        "none"
    }

    async fn transcode(&self, _bytes: &[u8]) -> Result<Vec<u8>> {
        bail!("HEIC conversion is disabled")
    }
}
