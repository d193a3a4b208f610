use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

use isat2labelme::logging;
use isat2labelme::{BatchSummary, Config, OutputLayout, Pipeline, RunOptions};

#[derive(Parser)]
#[command(name = "isat2labelme")]
#[command(about = "Convert iSAT JSON annotations to LabelMe format")]
#[command(version)]
struct Cli {
    /// Directory containing the iSAT JSON files (and optionally their .jpg images)
    input_dir: PathBuf,

    /// Root directory for converted files [default: results]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where to put converted files
    #[arg(long, value_enum)]
    layout: Option<OutputLayout>,

    /// Copy `<name>.jpg` from the input directory next to each converted file
    #[arg(long)]
    copy_images: bool,

    /// Read missing image dimensions from the image file instead of assuming 1920x1080
    #[arg(long)]
    probe_image_size: bool,

    /// TOML config file [default: isat2labelme.toml if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the run summary as JSON to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Exit with status 1 when any file fails to convert
    #[arg(long)]
    fail_on_error: bool,
}

impl Cli {
    /// Flags override the config file; boolean flags can only switch features on
    fn apply_to(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output_root = output.clone();
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        config.copy_images |= self.copy_images;
        config.probe_image_size |= self.probe_image_size;
        config.fail_on_error |= self.fail_on_error;
    }
}

fn print_summary(summary: &BatchSummary) {
    if summary.total == 0 {
        println!("❌ No JSON files found in the specified directory.");
        return;
    }

    println!("\n📊 Conversion results:");
    println!("   Files found: {}", summary.total);
    println!("   Converted: {}", summary.converted);
    println!("   Failed: {}", summary.failed());
    if summary.skipped > 0 {
        println!("   Skipped: {}", summary.skipped);
    }
    if summary.images_copied > 0 || !summary.missing_images.is_empty() {
        println!("   Images copied: {}", summary.images_copied);
        println!("   Images missing: {}", summary.missing_images.len());
    }

    if !summary.failures.is_empty() {
        println!("\n⚠️  Errors encountered:");
        for failure in &summary.failures {
            println!("   - {}: {}", failure.file_name, failure.error);
        }
    }

    println!("\nData conversion completed.");
    println!("files LabelMe → {}", summary.output_dir.display());
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    let _guard = logging::init_logging(&config.logging);

    let options = RunOptions::from_config(&cli.input_dir, &config);
    let summary = Pipeline::run(&options)
        .with_context(|| format!("Conversion of {} failed", cli.input_dir.display()))?;

    print_summary(&summary);

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        if let Err(e) = std::fs::write(path, json) {
            warn!("Failed to write summary to {}: {}", path.display(), e);
        }
    }

    if config.fail_on_error && !summary.is_success() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("❌ {:#}", e);
            ExitCode::from(2)
        }
    }
}
