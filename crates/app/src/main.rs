//! `invox` — extract vendor, date, and total from a scanned invoice.
//!
//! Prints the UI field projection (or the raw field map with `--raw`) as
//! JSON on stdout; logs go to stderr. OCR and model inference are opt-in
//! build features (`tesseract`, `onnx`); without them the binary falls back
//! to inert mocks, which still exercise loading and the sample overrides.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use invox_ocr::DocumentLoader;
use invox_pipeline::{InvoicePipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "invox", version, about = "Invoice field extraction")]
struct Cli {
    /// Document to process (PDF or raster image)
    file: PathBuf,

    /// Original filename, when it differs from the path on disk
    #[arg(long)]
    filename: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the raw field map instead of the UI projection
    #[arg(long)]
    raw: bool,

    /// Fail when the page contains no recognizable text
    #[arg(long)]
    require_text: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if cli.require_text {
        config.require_text = true;
    }

    let declared = match &cli.filename {
        Some(name) => name.clone(),
        None => cli
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let pipeline = InvoicePipeline::new(
        DocumentLoader::new(),
        build_recognizer(&config),
        build_tagger(&config)?,
    )
    .with_labels(config.labels.clone())
    .with_options(config.options());

    let json = if cli.raw {
        let fields = pipeline
            .extract_fields(&cli.file, &declared)
            .with_context(|| format!("extracting fields from {}", cli.file.display()))?;
        serde_json::to_string_pretty(&fields)?
    } else {
        let ui = pipeline
            .extract_ui(&cli.file, &declared)
            .with_context(|| format!("extracting fields from {}", cli.file.display()))?;
        serde_json::to_string_pretty(&ui)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(feature = "tesseract")]
fn build_recognizer(config: &PipelineConfig) -> invox_ocr::TesseractBackend {
    let data_path = config
        .tessdata_dir
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());
    invox_ocr::TesseractBackend::new(data_path, &config.ocr_language)
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer(_config: &PipelineConfig) -> invox_ocr::MockBackend {
    tracing::warn!("built without the `tesseract` feature; OCR returns no words");
    invox_ocr::MockBackend::empty()
}

#[cfg(feature = "onnx")]
fn build_tagger(config: &PipelineConfig) -> anyhow::Result<invox_model::OnnxTagger> {
    let model_dir = config
        .model_dir
        .as_deref()
        .context("`model_dir` must be set in the config when built with the `onnx` feature")?;
    Ok(invox_model::OnnxTagger::load(model_dir)?)
}

#[cfg(not(feature = "onnx"))]
fn build_tagger(_config: &PipelineConfig) -> anyhow::Result<invox_model::MockTagger> {
    tracing::warn!("built without the `onnx` feature; every word is tagged outside");
    Ok(invox_model::MockTagger::all_outside())
}
