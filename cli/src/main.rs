//! docsect CLI - split DOCX and PDF documents into titled JSON sections

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docsect::{
    convert_path_with_progress, BatchReport, ConvertOptions, ErrorMode, FileOutcome,
    HeadingThresholds, JsonFormat, OutcomeStatus, ParseOptions, SegmentOptions,
};

#[derive(Parser, Debug)]
#[command(name = "docsect")]
#[command(version)]
#[command(about = "Split DOCX and PDF documents into titled sections as JSON", long_about = None)]
struct Cli {
    /// Input document or directory of documents
    #[arg(long = "input_path", env = "DOCSECT_INPUT_PATH", value_name = "PATH")]
    input_path: PathBuf,

    /// Output JSON file, or directory for directory input
    #[arg(long = "output_path", env = "DOCSECT_OUTPUT_PATH", value_name = "PATH")]
    output_path: PathBuf,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Fail on unreadable PDF pages instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Convert the files of a directory in parallel
    #[arg(long)]
    parallel: bool,

    /// Drop sections without content
    #[arg(long)]
    drop_empty: bool,

    /// Leave DOCX tables out of the output
    #[arg(long)]
    no_tables: bool,

    /// Points above body size for a left-aligned PDF line to be a heading
    #[arg(long, value_name = "PT", default_value_t = 2.0)]
    size_delta: f32,

    /// Longest PDF line (in characters) that can still be a heading
    #[arg(long, value_name = "N", default_value_t = 120)]
    max_heading_chars: usize,

    /// Do not treat bold PDF lines as headings
    #[arg(long)]
    no_bold_headings: bool,

    /// Keep PDF lines that start right of the page center (headers, page numbers)
    #[arg(long)]
    keep_right_aligned: bool,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn convert_options(&self) -> ConvertOptions {
        let thresholds = HeadingThresholds::new()
            .with_size_delta(self.size_delta)
            .with_max_heading_chars(self.max_heading_chars)
            .with_bold_headings(!self.no_bold_headings);

        let error_mode = if self.strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        };

        let parse = ParseOptions::new()
            .with_error_mode(error_mode)
            .with_thresholds(thresholds)
            .with_tables(!self.no_tables)
            .with_skip_right_aligned(!self.keep_right_aligned);

        let format = if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };

        ConvertOptions::new()
            .with_parse_options(parse)
            .with_segment_options(SegmentOptions::new().with_drop_empty(self.drop_empty))
            .with_format(format)
            .with_parallel(self.parallel)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = run(&cli);

    match &result {
        Ok(report) if !report.is_success() => {
            eprintln!(
                "{}: {} of {} files failed",
                "Error".red().bold(),
                report.failed(),
                report.outcomes.len()
            );
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
        }
    }

    std::process::exit(exit_code(&result));
}

/// Process exit code: 0 when every file converted or was skipped, 1 otherwise.
fn exit_code(result: &Result<BatchReport, Box<dyn std::error::Error>>) -> i32 {
    match result {
        Ok(report) if report.is_success() => 0,
        _ => 1,
    }
}

fn run(cli: &Cli) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let options = cli.convert_options();
    let input = cli.input_path.as_path();
    log::debug!("Converting {} with {:?}", input.display(), options);

    let pb = progress_bar(input, cli.quiet)?;
    let report = convert_path_with_progress(input, &cli.output_path, &options, |outcome| {
        if let Some(pb) = &pb {
            pb.set_message(file_name(&outcome.input));
            pb.inc(1);
        }
    });
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let report = report?;

    for outcome in &report.outcomes {
        print_outcome(outcome, cli.quiet);
    }
    if !cli.quiet && report.outcomes.len() > 1 {
        println!(
            "\n{} {} converted, {} skipped, {} failed",
            "Done!".green().bold(),
            report.converted(),
            report.skipped(),
            report.failed()
        );
    }

    Ok(report)
}

/// Progress bar over the files of a directory input.
fn progress_bar(input: &Path, quiet: bool) -> Result<Option<ProgressBar>, Box<dyn std::error::Error>> {
    if quiet || !input.is_dir() {
        return Ok(None);
    }

    let count = std::fs::read_dir(input)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .count();

    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(Some(pb))
}

fn print_outcome(outcome: &FileOutcome, quiet: bool) {
    let name = file_name(&outcome.input);
    match &outcome.status {
        OutcomeStatus::Converted { sections } => {
            if !quiet {
                let output = outcome
                    .output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!(
                    "{} {} {} {} ({} sections)",
                    "Converted".green(),
                    name,
                    "→".dimmed(),
                    output,
                    sections
                );
            }
        }
        OutcomeStatus::Skipped { reason } => {
            if !quiet {
                println!("{} {} ({})", "Skipped".yellow(), name, reason);
            }
        }
        OutcomeStatus::Failed { error } => {
            eprintln!("{} {}: {}", "Failed".red().bold(), name, error);
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
