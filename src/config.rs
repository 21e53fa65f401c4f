use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::frame::{Alignment, BorderColor, FrameStyle, Typeface};
use crate::pipeline::{DEFAULT_JPEG_QUALITY, ExportOptions, OutputFormat};
use crate::transcode::{
    CommandTranscoder, INPUT_PLACEHOLDER, NoTranscoder, OUTPUT_PLACEHOLDER, Transcoder,
};

/// Top-level configuration for exif-frame.
///
/// Controls the frame style, how the result is encoded and where it goes,
/// which fonts are used, and how HEIC files are converted.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_frame::config::Config;
/// use exif_frame::frame::Alignment;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.frame.border_color = "#000".parse().unwrap();
/// config.frame.layout = Alignment::Center;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Border colour, text alignment and brand mark.
    pub frame: FrameConfig,
    /// Output format and destination.
    pub output: OutputConfig,
    /// Optional TTF/OTF files replacing the embedded faces.
    pub fonts: FontConfig,
    /// External HEIC converter.
    pub heic: HeicConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub border_color: BorderColor,
    pub layout: Alignment,
    /// Brand whose mark is drawn, overriding the photo's `Make`.
    pub brand: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// 1–100, only used for JPEG.
    pub jpeg_quality: u8,
    /// Output directory; the input's directory when unset.
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Face for the lens and date lines.
    pub regular: Option<String>,
    /// Face for the camera name and exposure settings.
    pub bold: Option<String>,
}

/// HEIC conversion settings.
///
/// `args` may contain `{input}` and `{output}`, replaced with temp file paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeicConfig {
    pub enabled: bool,
    pub program: String,
    pub args: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            directory: None,
        }
    }
}

impl Default for HeicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "heif-convert".to_string(),
            args: vec![INPUT_PLACEHOLDER.to_string(), OUTPUT_PLACEHOLDER.to_string()],
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    pub fn frame_style(&self) -> FrameStyle {
        FrameStyle {
            border_color: self.frame.border_color,
            alignment: self.frame.layout,
            brand: self.frame.brand.clone(),
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            format: self.output.format,
            jpeg_quality: self.output.jpeg_quality,
        }
    }

    /// The configured faces, or the embedded ones.
    pub fn typeface(&self) -> Result<Typeface> {
        let regular = self.fonts.regular.as_deref().map(Path::new);
        let bold = self.fonts.bold.as_deref().map(Path::new);
        Typeface::load(regular, bold).context("Failed to load fonts")
    }

    /// The HEIC converter, or one that always fails when conversion is disabled.
    pub fn transcoder(&self) -> Box<dyn Transcoder> {
        if self.heic.enabled && !self.heic.program.trim().is_empty() {
            Box::new(CommandTranscoder::new(
                self.heic.program.clone(),
                self.heic.args.clone(),
            ))
        } else {
            Box::new(NoTranscoder)
        }
    }
}
