// 📊 Evaluation - how often does the heuristic get the total right?
//
// Manifest CSV (header required):
//   text_path,expected_amount
//   receipts/0001.txt,1125
//
// Each text_path holds the OCR output of one receipt. Relative paths are
// resolved against the manifest's directory.

use crate::extractor::TotalExtractor;
use crate::tokenizer::Amount;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// MANIFEST
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub text_path: PathBuf,
    pub expected_amount: Amount,
}

/// Read all manifest rows
pub fn load_manifest(manifest_path: &Path) -> Result<Vec<ManifestEntry>> {
    let mut rdr = csv::Reader::from_path(manifest_path)
        .with_context(|| format!("Failed to open manifest: {}", manifest_path.display()))?;

    let mut entries = Vec::new();
    for (row, result) in rdr.deserialize().enumerate() {
        let entry: ManifestEntry = result.with_context(|| {
            format!("Failed to parse manifest line {} in {}", row + 2, manifest_path.display())
        })?;
        entries.push(entry);
    }

    Ok(entries)
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    /// Path or label of the receipt
    pub source: String,
    /// SHA-256 of the OCR text, to spot duplicate receipts in a manifest
    pub fingerprint: String,
    pub expected: Amount,
    pub actual: Amount,
    pub rule: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    pub table: String,
    pub cases: Vec<CaseResult>,
    pub total: usize,
    pub correct: usize,
    pub unresolved: usize,
    /// Cases decided by each rule
    pub by_rule: BTreeMap<String, usize>,
}

impl EvaluationReport {
    /// Share of correct cases, 0.0 for an empty run
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.cases.iter().filter(|c| !c.correct)
    }

    pub fn summary(&self) -> String {
        format!(
            "Table {}: {}/{} correct ({:.1}%), {} unresolved",
            self.table,
            self.correct,
            self.total,
            self.accuracy() * 100.0,
            self.unresolved
        )
    }
}

/// SHA-256 hex digest of the receipt text
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Run the extractor over in-memory `(source, text, expected)` cases
pub fn evaluate_cases<'a, I>(cases: I, extractor: &TotalExtractor) -> EvaluationReport
where
    I: IntoIterator<Item = (String, &'a str, Amount)>,
{
    let mut results = Vec::new();
    let mut by_rule: BTreeMap<String, usize> = BTreeMap::new();
    let mut unresolved = 0;

    for (source, text, expected) in cases {
        let extraction = extractor.extract(text);
        let rule = extraction.resolution.rule().to_string();

        if !extraction.resolution.is_resolved() {
            unresolved += 1;
        }
        *by_rule.entry(rule.clone()).or_insert(0) += 1;

        // an unresolved result never counts as a correct zero
        let correct = extraction.resolution.amount() == Some(expected);
        if !correct {
            tracing::info!(source = %source, expected, actual = extraction.amount, rule = %rule, "mismatch");
        }

        results.push(CaseResult {
            source,
            fingerprint: fingerprint(text),
            expected,
            actual: extraction.amount,
            rule,
            correct,
        });
    }

    let correct = results.iter().filter(|c| c.correct).count();
    EvaluationReport {
        generated_at: Utc::now(),
        table: extractor.table().name().to_string(),
        total: results.len(),
        correct,
        unresolved,
        by_rule,
        cases: results,
    }
}

/// Evaluate every receipt listed in a manifest.
///
/// Unreadable text files are skipped with a warning; a malformed manifest is an error.
pub fn evaluate_manifest(manifest_path: &Path, extractor: &TotalExtractor) -> Result<EvaluationReport> {
    let entries = load_manifest(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let mut loaded = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = if entry.text_path.is_absolute() {
            entry.text_path.clone()
        } else {
            base_dir.join(&entry.text_path)
        };

        match fs::read_to_string(&path) {
            Ok(text) => loaded.push((entry.text_path.display().to_string(), text, entry.expected_amount)),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable receipt text");
            }
        }
    }

    let report = evaluate_cases(
        loaded
            .iter()
            .map(|(source, text, expected)| (source.clone(), text.as_str(), *expected)),
        extractor,
    );
    tracing::info!(summary = %report.summary(), "evaluation finished");
    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================
