use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use simcore::clean::{advanced_clean, clean_text};
use simcore::detector::{DuplicateDetector, DEFAULT_THRESHOLD};
use simcore::record::{load_records, save_records, to_documents, validate_dataset, Record};
use simcore::report::{render_line, save_json_report, save_text_report, DuplicateReport};
use simcore::search::{keyword_statistics, multi_keyword_search, KeywordMatches, KeywordStats};
use simcore::stats::{summarize_readability, ReadabilitySummary, RecordStats, TextAnalyzer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "dedup")]
#[command(about = "Near-duplicate detection and text utilities for scraped policy pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report all record pairs whose cosine similarity meets the threshold
    Detect {
        /// Input path (JSON/JSONL file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Minimum similarity for a pair to be reported
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
        /// Write the human-readable report here
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write the full-precision JSON report here
        #[arg(long)]
        json: Option<PathBuf>,
        /// Compare pairs on the rayon thread pool
        #[arg(long, default_value_t = false)]
        parallel: bool,
        /// Clean scraped text before comparing
        #[arg(long, default_value_t = false)]
        clean: bool,
        /// Treat text as raw HTML: strip markup and decode entities before cleaning
        #[arg(long, default_value_t = false, requires = "clean")]
        html: bool,
    },
    /// Count records missing a title, url or text
    Validate {
        #[arg(long)]
        input: PathBuf,
    },
    /// Write records with cleaned text
    Clean {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Treat text as raw HTML: strip markup and decode entities first
        #[arg(long, default_value_t = false)]
        html: bool,
    },
    /// Readability, lexical diversity and complexity per record
    Stats {
        #[arg(long)]
        input: PathBuf,
    },
    /// Keyword statistics across records
    Search {
        #[arg(long)]
        input: PathBuf,
        /// Keyword to look for; repeat for several
        #[arg(long = "keyword", required = true)]
        keywords: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect { input, threshold, report, json, parallel, clean, html } => {
            let cleaning = clean.then_some(Cleaning { html });
            detect(&input, threshold, report.as_deref(), json.as_deref(), parallel, cleaning)
        }
        Commands::Validate { input } => validate(&input),
        Commands::Clean { input, output, html } => clean_records(&input, &output, Cleaning { html }),
        Commands::Stats { input } => stats(&input),
        Commands::Search { input, keywords } => search(&input, &keywords),
    }
}

fn detect(input: &Path, threshold: f64, report: Option<&Path>, json: Option<&Path>, parallel: bool, cleaning: Option<Cleaning>) -> Result<()> {
    let mut records = load_records(input)?;
    if let Some(cleaning) = cleaning {
        cleaning.apply(&mut records);
    }
    let docs = to_documents(&records);
    let detector = DuplicateDetector::new(threshold);
    let pairs = if parallel { detector.detect_parallel(&docs) } else { detector.detect(&docs) };
    tracing::info!(num_docs = docs.len(), pairs = pairs.len(), threshold, "detection finished");

    for pair in &pairs {
        println!("{}", render_line(pair));
    }
    if let Some(path) = report {
        save_text_report(path, &pairs)?;
        tracing::info!(path = %path.display(), "duplicate report saved");
    }
    if let Some(path) = json {
        let generated_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into());
        let out = DuplicateReport { generated_at, threshold, num_docs: docs.len(), pairs };
        save_json_report(path, &out)?;
        tracing::info!(path = %path.display(), "json report saved");
    }
    Ok(())
}

fn validate(input: &Path) -> Result<()> {
    let records = load_records(input)?;
    let summary = validate_dataset(&records);
    println!("Total records: {}", summary.total);
    println!("Valid records: {}", summary.valid);
    println!("Invalid records: {}", summary.invalid);
    if summary.has_invalid() {
        tracing::warn!(invalid = summary.invalid, "some records are missing fields");
    }
    Ok(())
}

fn clean_records(input: &Path, output: &Path, cleaning: Cleaning) -> Result<()> {
    let mut records = load_records(input)?;
    cleaning.apply(&mut records);
    save_records(output, &records)?;
    tracing::info!(num_records = records.len(), output = %output.display(), "cleaned records written");
    Ok(())
}

#[derive(Clone, Copy)]
struct Cleaning {
    html: bool,
}

impl Cleaning {
    fn apply(self, records: &mut [Record]) {
        for record in records.iter_mut() {
            if self.html {
                record.text = advanced_clean(&record.text);
            }
            record.text = clean_text(&record.text);
        }
    }
}

#[derive(Serialize)]
struct SearchOutput {
    statistics: Vec<KeywordStats>,
    matches: BTreeMap<String, KeywordMatches>,
}

fn search(input: &Path, keywords: &[String]) -> Result<()> {
    let records = load_records(input)?;
    let out = SearchOutput {
        statistics: keywords.iter().map(|k| keyword_statistics(&records, k)).collect(),
        matches: multi_keyword_search(&records, keywords),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[derive(Serialize)]
struct StatsOutput {
    records: Vec<RecordStats>,
    summary: Option<ReadabilitySummary>,
}

fn stats(input: &Path) -> Result<()> {
    let records = load_records(input)?;
    let analyzer = TextAnalyzer::new()?;
    let per_record = analyzer.analyze_batch(&records);
    let scores: Vec<_> = per_record.iter().map(|s| s.readability.clone()).collect();
    let out = StatsOutput { summary: summarize_readability(&scores), records: per_record };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
