//! Batch processing command for multiple document URLs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use docid_core::{IdentityField, IdentityRecord, JobRequest, Pipeline};

use super::{format_record, load_config, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// File with one document URL per line ('#' starts a comment)
    #[arg(required = true)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each document
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of concurrent runs
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single URL.
struct BatchResult {
    index: usize,
    url: String,
    record: Option<IdentityRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// Read job URLs, skipping blank lines and comments.
fn read_urls(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_urls(&content))
}

fn parse_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let urls = read_urls(&args.input)?;
    if urls.is_empty() {
        anyhow::bail!("No URLs found in {}", args.input.display());
    }

    println!(
        "{} Found {} documents to process",
        style("ℹ").blue(),
        urls.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pipeline = Arc::new(Pipeline::from_config(&config)?);

    let overall_pb = ProgressBar::new(urls.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")?
            .progress_chars("=>-"),
    );

    let mut runs = stream::iter(urls.into_iter().enumerate())
        .map(|(index, url)| {
            let pipeline = Arc::clone(&pipeline);
            async move {
                let run_start = Instant::now();
                let outcome = pipeline.run(&JobRequest::new(url.clone())).await;
                let processing_time_ms = run_start.elapsed().as_millis() as u64;
                match outcome {
                    Ok(record) => BatchResult {
                        index,
                        url,
                        record: Some(record),
                        error: None,
                        processing_time_ms,
                    },
                    Err(e) => BatchResult {
                        index,
                        url,
                        record: None,
                        error: Some(format!("[{}] {}", e.kind().code(), e)),
                        processing_time_ms,
                    },
                }
            }
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(result) = runs.next().await {
        overall_pb.inc(1);

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.url, error_msg);
            } else {
                overall_pb.abandon();
                error!("Failed to process {}: {}", result.url, error_msg);
                anyhow::bail!("Processing failed for {}: {}", result.url, error_msg);
            }
        }
        results.push(result);
    }

    overall_pb.finish_with_message("Complete");
    results.sort_by_key(|r| r.index);

    let successful: Vec<_> = results.iter().filter(|r| r.record.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(record) = &result.record {
                let output_path = output_dir.join(format!(
                    "document-{:04}.{}",
                    result.index + 1,
                    args.format.extension()
                ));
                fs::write(&output_path, format_record(record, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed documents:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.url,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["url", "status"];
    header.extend(IdentityField::ALL.iter().map(|f| f.key()));
    header.extend(["matched_fields", "processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let mut row = vec![result.url.clone()];
        match &result.record {
            Some(record) => {
                row.push("success".to_string());
                row.extend(
                    IdentityField::ALL
                        .iter()
                        .map(|f| record.get(*f).unwrap_or_default().to_string()),
                );
                row.push(record.matched_count().to_string());
            }
            None => {
                row.push("error".to_string());
                row.extend(std::iter::repeat_n(String::new(), IdentityField::ALL.len() + 1));
            }
        }
        row.push(result.processing_time_ms.to_string());
        row.push(result.error.clone().unwrap_or_default());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_urls_skips_comments_and_blanks() {
        let urls = parse_urls(
            "# scanned batch\nhttps://a.test/1.pdf\n\n   https://a.test/2.pdf  \n#https://a.test/3.pdf\n",
        );
        assert_eq!(urls, vec!["https://a.test/1.pdf", "https://a.test/2.pdf"]);
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let results = vec![
            BatchResult {
                index: 0,
                url: "https://a.test/1.pdf".to_string(),
                record: Some(IdentityRecord {
                    cpf: Some("529.982.247-25".to_string()),
                    ..Default::default()
                }),
                error: None,
                processing_time_ms: 12,
            },
            BatchResult {
                index: 1,
                url: "https://a.test/2.pdf".to_string(),
                record: None,
                error: Some("[FETCH] upstream returned 404".to_string()),
                processing_time_ms: 3,
            },
        ];

        write_summary(&path, &results).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "url,status,nome,cpf,nomeMae,dataNascimento,nacionalidade,sexo,estadoCivil,matched_fields,processing_time_ms,error"
        );
        assert_eq!(lines[1], "https://a.test/1.pdf,success,,529.982.247-25,,,,,,1,12,");
        assert_eq!(
            lines[2],
            "https://a.test/2.pdf,error,,,,,,,,,3,[FETCH] upstream returned 404"
        );
    }
}
