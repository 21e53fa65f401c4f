use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use exif_frame::exif::{ExifData, ExifField};
use exif_frame::frame::{Alignment, BorderColor};
use exif_frame::pipeline::{self, OutputFormat};
use exif_frame::{config, session::Session};

#[derive(Parser, Debug)]
#[command(
    name = "exif-frame",
    version,
    about = "Frame a photo with its camera metadata — border, camera, lens, exposure settings and date"
)]
struct Cli {
    /// Photo to frame (JPEG, PNG, WebP or HEIC)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Border colour as #rgb or #rrggbb
    #[arg(long = "border-color", value_name = "HEX")]
    border_color: Option<BorderColor>,

    /// Text layout: left, center or right
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<Alignment>,

    /// Output format: png or jpeg
    #[arg(long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Brand mark to draw instead of the one matching the camera make
    #[arg(long, value_name = "NAME")]
    brand: Option<String>,

    /// Override a metadata field, e.g. --set lens="XF 23mm F1.4" (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    set: Vec<(ExifField, String)>,

    /// Directory for the framed image (default: next to the input)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Display the normalized EXIF metadata and exit
    #[arg(long = "show-exif")]
    show_exif: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_assignment(s: &str) -> std::result::Result<(ExifField, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{s}`"))?;
    Ok((field.trim().parse()?, value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    let Some(input) = cli.path.as_deref() else {
        anyhow::bail!("No input photo specified. Use --help for usage.");
    };

    // Load config and apply CLI overrides
    let mut config = config::Config::load(cli.config.as_deref())?;
    if let Some(color) = cli.border_color {
        config.frame.border_color = color;
    }
    if let Some(layout) = cli.layout {
        config.frame.layout = layout;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(ref brand) = cli.brand {
        config.frame.brand = Some(brand.clone());
    }

    let transcoder = config.transcoder();
    let photo = pipeline::load_photo(input, transcoder.as_ref())
        .await
        .with_context(|| format!("Failed to load {}", input.display()))?;
    log::info!(
        "Loaded {} ({}x{})",
        input.display(),
        photo.image.width(),
        photo.image.height()
    );

    let mut session = Session::new(config.frame_style());
    session.load(photo);
    for (field, value) in &cli.set {
        session.edit(*field, value)?;
        log::debug!("Set {field} = {:?}", session.exif().get(*field));
    }

    // Handle --show-exif
    if cli.show_exif {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(session.exif())?);
        } else {
            print_exif(input, session.exif());
        }
        return Ok(());
    }

    let typeface = config.typeface()?;
    let ticket = session.begin_export()?;
    log::debug!("Rendering export for generation {}", ticket.generation());
    let bytes = pipeline::render(
        &ticket.photo.image,
        &ticket.exif,
        &ticket.style,
        &typeface,
        config.export_options(),
    )
    .await
    .context("Failed to render frame. Try exporting again.")?;
    let bytes = session.finish_export(&ticket, bytes)?;

    let out_dir = output_dir(&cli, &config, input);
    let written = pipeline::write_export(&out_dir, &ticket.exif.model, config.output.format, &bytes)
        .await
        .with_context(|| format!("Failed to write into {}", out_dir.display()))?;

    if cli.json {
        let result = serde_json::json!({
            "input": input.display().to_string(),
            "output": written.display().to_string(),
            "format": config.output.format,
            "border_color": ticket.style.border_color,
            "layout": ticket.style.alignment,
            "exif": ticket.exif,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    log::info!("Done: {}", written.display());
    Ok(())
}

/// `--output`, then the configured directory, then the input's directory.
fn output_dir(cli: &Cli, config: &config::Config, input: &Path) -> PathBuf {
    cli.output
        .clone()
        .or_else(|| config.output.directory.as_ref().map(PathBuf::from))
        .or_else(|| {
            input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;
/// Indent for continuation lines (tag column width + " : " = 25 chars + 2 leading spaces).
const INDENT: &str = "                           ";

/// Print the normalized metadata for a file, organized by section.
fn print_exif(path: &Path, data: &ExifData) {
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    if data.is_empty() {
        println!("  {DIM}(no EXIF metadata found){RESET}");
        println!();
        return;
    }

    let sections: [(&str, &[ExifField]); 2] = [
        ("Camera", &[ExifField::Make, ExifField::Model, ExifField::Lens]),
        (
            "Capture Settings",
            &[
                ExifField::FocalLength,
                ExifField::FNumber,
                ExifField::ExposureTime,
                ExifField::Iso,
                ExifField::DateTime,
            ],
        ),
    ];

    for (title, fields) in sections {
        if fields.iter().all(|f| data.get(*f).is_empty()) {
            continue;
        }
        println!("  {BOLD}{title}{RESET}");
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        for field in fields {
            let value = data.get(*field);
            if !value.is_empty() {
                print_row(field.name(), value);
            }
        }
        println!();
    }

    if !data.camera_label().is_empty() {
        println!("  {DIM}Frame caption: {}{RESET}", data.camera_label());
        println!();
    }
}

/// Print a single row in the EXIF display table.
fn print_row(tag: &str, val: &str) {
    let tag_col = format!("{:<22}", tag);
    let lines = wrap_text(val, VAL_WIDTH);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("  {tag_col} : {line}");
        } else {
            println!("  {INDENT}{line}");
        }
    }
}

/// Wrap text at word boundaries to fit within max_width.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(s.to_string());
    }

    lines
}
