//! Process command - extract identity fields from a single remote document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docid_core::{JobRequest, Pipeline};

use super::{format_record, load_config, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Document URL (http or https)
    #[arg(required = true)]
    url: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report CPF and birth date validation issues
    #[arg(long)]
    validate: bool,

    /// Show run statistics
    #[arg(long)]
    stats: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let pipeline = Pipeline::from_config(&config)?;

    info!("Processing document: {}", args.url);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Fetching {}", args.url));

    let outcome = pipeline.run_with_report(&JobRequest::new(args.url.clone())).await;
    let report = match outcome {
        Ok(report) => {
            pb.finish_with_message("Done");
            report
        }
        Err(e) => {
            pb.finish_and_clear();
            anyhow::bail!("[{}] {}", e.kind().code(), e);
        }
    };

    let extraction = &report.extraction;

    if args.validate && !extraction.warnings.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for issue in &extraction.warnings {
            eprintln!("  - {}", issue);
        }
    }

    let output = format_record(&extraction.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.stats {
        println!();
        println!(
            "{} Matched fields: {}/7 (layout {})",
            style("ℹ").blue(),
            extraction.matched_fields,
            extraction.layout
        );
        println!(
            "{} Document size: {} bytes",
            style("ℹ").blue(),
            report.document_bytes
        );
        println!("{} Run time: {:?}", style("ℹ").blue(), report.elapsed);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
