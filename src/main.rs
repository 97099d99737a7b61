use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use receipt_scanner::{evaluate_manifest, logging::init_logging, ScannerConfig, TotalExtractor};

const USAGE: &str = "\
Usage: receipt-scanner [--config PATH] [--locale NAME] <command>

Commands:
  extract [FILE|-]    print the total amount (0 = unresolved)
  explain [FILE|-]    print per-line diagnostics as JSON
  eval MANIFEST.csv   score the extractor against labeled receipts
  table               print the active keyword table as JSON";

struct Args {
    config: Option<PathBuf>,
    locale: Option<String>,
    command: Vec<String>,
}

fn parse_args(raw: Vec<String>) -> Result<Args> {
    let mut args = Args {
        config: None,
        locale: None,
        command: Vec::new(),
    };

    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(iter.next().context("--config needs a path")?.into()),
            "--locale" => args.locale = Some(iter.next().context("--locale needs a name")?),
            "-h" | "--help" => args.command.push("help".to_string()),
            _ => args.command.push(arg),
        }
    }

    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args(env::args().skip(1).collect())?;

    let mut config = ScannerConfig::load(args.config.as_deref())?;
    if let Some(locale) = args.locale {
        config.locale = locale;
        config.keyword_file = None;
    }
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    let command: Vec<&str> = args.command.iter().map(String::as_str).collect();
    match command.as_slice() {
        ["extract"] => run_extract(&config, None)?,
        ["extract", input] => run_extract(&config, Some(*input))?,
        ["explain"] => run_explain(&config, None)?,
        ["explain", input] => run_explain(&config, Some(*input))?,
        ["eval", manifest] => run_eval(&config, Path::new(manifest))?,
        ["table"] => run_table(&config)?,
        [] | ["help"] => println!("{}", USAGE),
        other => bail!("unknown command: {}\n\n{}", other.join(" "), USAGE),
    }

    Ok(())
}

fn build_extractor(config: &ScannerConfig) -> Result<TotalExtractor> {
    let table = config
        .keyword_table()
        .with_context(|| format!("Failed to load keyword table for locale {}", config.locale))?;
    tracing::debug!(table = table.name(), keywords = table.len(), "keyword table loaded");
    Ok(TotalExtractor::new(table))
}

/// Read OCR text from a file, or stdin for `-` / no argument
fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read OCR text from stdin")?;
            Ok(text)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read OCR text: {}", path)),
    }
}

fn run_extract(config: &ScannerConfig, input: Option<&str>) -> Result<()> {
    let extractor = build_extractor(config)?;
    let text = read_input(input)?;

    let extraction = extractor.extract(&text);
    tracing::info!(amount = extraction.amount, rule = extraction.resolution.rule(), "total extracted");
    println!("{}", extraction.amount);

    Ok(())
}

fn run_explain(config: &ScannerConfig, input: Option<&str>) -> Result<()> {
    let extractor = build_extractor(config)?;
    let text = read_input(input)?;

    let trace = extractor.explain(&text);
    println!("{}", serde_json::to_string_pretty(&trace)?);

    Ok(())
}

fn run_eval(config: &ScannerConfig, manifest: &Path) -> Result<()> {
    let extractor = build_extractor(config)?;

    println!("📊 Evaluating {}", manifest.display());
    let report = evaluate_manifest(manifest, &extractor)?;

    for case in report.failures() {
        println!(
            "✗ {}: expected {}, got {} ({})",
            case.source, case.expected, case.actual, case.rule
        );
    }
    println!("✓ {}", report.summary());
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn run_table(config: &ScannerConfig) -> Result<()> {
    let extractor = build_extractor(config)?;
    println!("{}", serde_json::to_string_pretty(&extractor.table().to_spec())?);
    Ok(())
}
