//! CropSight CLI - vegetation-health classification for GeoTIFF imagery

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cropsight_core::io::TiffStack;
use cropsight_core::RasterSource;
use cropsight_pipeline::{
    run_analysis, AnalysisReport, Classifier, LinearClassifier, OperatingMode, PipelineConfig,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cropsight")]
#[command(author, version, about = "Vegetation-health classification from multi-band GeoTIFFs", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-band information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Classify the imaged area as healthy or unhealthy vegetation
    Classify {
        /// Input raster file (.tif)
        input: PathBuf,
        /// Model weights file (JSON); required in full mode
        #[arg(short, long)]
        model: Option<PathBuf>,
        /// Operating mode: full (5+ bands) or ndvi (2+ bands)
        #[arg(long, default_value = "full")]
        mode: String,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn check_extension(path: &Path) -> Result<()> {
    let ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            e == "tif" || e == "tiff"
        })
        .unwrap_or(false);
    if !ok {
        anyhow::bail!("{} is not a .tif image", path.display());
    }
    Ok(())
}

fn read_stack(path: &PathBuf) -> Result<TiffStack> {
    check_extension(path)?;
    let pb = spinner("Reading raster...");
    let stack = TiffStack::open(path).context("Failed to read raster")?;
    pb.finish_and_clear();
    let (rows, cols) = stack.shape();
    info!("Input: {} x {}, {} band(s)", cols, rows, stack.band_count());
    Ok(stack)
}

fn parse_mode(s: &str) -> Result<OperatingMode> {
    match s.to_lowercase().as_str() {
        "full" | "full-feature" => Ok(OperatingMode::FullFeature),
        "ndvi" | "ndvi-only" => Ok(OperatingMode::NdviOnly),
        _ => anyhow::bail!("Unknown mode: {}. Use full or ndvi.", s),
    }
}

fn print_report(report: &AnalysisReport, elapsed: std::time::Duration) {
    match report {
        AnalysisReport::Classified(c) => {
            println!("Status: {}", c.status);
            println!("NDVI mean: {:.4}", c.ndvi_value);
            println!("Confidence: {}", c.confidence);
            if let Some(label) = c.raw_label {
                println!("Raw label: {}", label);
            }
            if !c.diagnostics.is_empty() {
                println!("\nDiagnostics:");
                for note in &c.diagnostics {
                    println!("  {}", note);
                }
            }
        }
        AnalysisReport::Failed { error } => {
            println!("Classification failed: {}", error);
        }
    }
    println!("\nProcessing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let stack = read_stack(&input)?;
            let (rows, cols) = stack.shape();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, rows * cols);
            println!("Bands: {}", stack.band_count());

            println!("\nPer-band statistics:");
            for band in 1..=stack.band_count() {
                match stack.summarize_band(band) {
                    Ok(summary) => {
                        let fmt_stat = |v: Option<f64>| match v {
                            Some(v) => format!("{:.4}", v),
                            None => "n/a".to_string(),
                        };
                        println!(
                            "  band {} ({}): min={}, max={}, mean={}",
                            summary.index,
                            summary.dtype,
                            fmt_stat(summary.min),
                            fmt_stat(summary.max),
                            fmt_stat(summary.mean),
                        );
                    }
                    Err(e) => println!("  band {}: unreadable ({})", band, e),
                }
            }
        }

        // ── Classify ─────────────────────────────────────────────────
        Commands::Classify {
            input,
            model,
            mode,
            json,
        } => {
            let mode = parse_mode(&mode)?;

            // The model is loaded once, before the raster; it is shared
            // read-only state for the lifetime of the process.
            let classifier: Option<LinearClassifier> = match mode {
                OperatingMode::FullFeature => {
                    let path = model.ok_or_else(|| {
                        anyhow::anyhow!("full mode requires --model <weights.json>")
                    })?;
                    let pb = spinner("Loading model...");
                    let model = LinearClassifier::from_path(&path)
                        .with_context(|| format!("Failed to load model {}", path.display()))?;
                    pb.finish_and_clear();
                    Some(model)
                }
                OperatingMode::NdviOnly => None,
            };

            let stack = read_stack(&input)?;
            let config = PipelineConfig {
                mode,
                ..PipelineConfig::default()
            };

            let start = Instant::now();
            let report = run_analysis(
                &stack,
                classifier.as_ref().map(|m| m as &dyn Classifier),
                &config,
            );
            let elapsed = start.elapsed();

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, elapsed);
            }
        }
    }

    Ok(())
}
