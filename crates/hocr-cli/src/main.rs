//! hOCR CLI - converts an hOCR file into a positioned HTML view.
//!
//! Writes the rendered document next to the input: `scan.hocr` becomes
//! `scan_converted.html`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use hocr_core::HocrDocument;
use hocr_render::{Converter, RenderSettings};

#[derive(Parser, Debug)]
#[command(
    name = "hocr",
    version,
    about = "Convert an hOCR document into a positioned HTML view"
)]
struct Cli {
    /// Input hOCR file
    input: PathBuf,

    /// Scaling factor applied to every position and dimension
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Declared character encoding of the input file
    #[arg(long, default_value = "utf-8")]
    encoding: String,
}

/// Generate the output path from the input file.
///
/// The output file is created in the same directory as the input file,
/// with `_converted.html` appended to the stem.
fn converted_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    input.with_file_name(format!("{}_converted.html", stem.to_string_lossy()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let document = HocrDocument::from_file(&cli.input, &cli.encoding)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    for diagnostic in document.metadata_diagnostics() {
        eprintln!("warning: {}", diagnostic.message);
    }

    let converter = Converter::new(
        &document,
        RenderSettings {
            scaling_factor: cli.scale,
        },
    );
    let html = converter.render().context("failed to render document")?;

    let output = converted_path(&cli.input);
    fs::write(&output, html).with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converted_path() {
        assert_eq!(
            converted_path(Path::new("/tmp/scan.hocr")),
            PathBuf::from("/tmp/scan_converted.html")
        );
        assert_eq!(
            converted_path(Path::new("page.html")),
            PathBuf::from("page_converted.html")
        );
        // no extension
        assert_eq!(
            converted_path(Path::new("scan")),
            PathBuf::from("scan_converted.html")
        );
    }
}
