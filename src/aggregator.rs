// 🧺 Candidate Aggregator
// Walks the receipt line by line and collects every amount found on a
// qualifying line, both per keyword and as a global frequency count.

use crate::classifier::classify;
use crate::keywords::{KeywordId, KeywordTable};
use crate::normalize::{normalize_line, split_lines};
use crate::tokenizer::{extract_amount, Amount};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// CANDIDATE POOL
// ============================================================================

/// Candidates of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidatePool {
    /// One list per table keyword, indexed by [`KeywordId`], in line order
    keyword_amounts: Vec<Vec<Amount>>,
    /// Qualifying lines per amount (one per line, not per keyword hit)
    amount_frequency: BTreeMap<Amount, u32>,
}

impl CandidatePool {
    /// Empty pool sized for `table`
    pub fn new(table: &KeywordTable) -> Self {
        CandidatePool {
            keyword_amounts: vec![Vec::new(); table.len()],
            amount_frequency: BTreeMap::new(),
        }
    }

    /// Record the amount of one qualifying line.
    ///
    /// A keyword id past the end of the pool grows it, so a pool built for a
    /// smaller table still accepts the amount.
    pub fn record(&mut self, amount: Amount, keywords: &[KeywordId]) {
        *self.amount_frequency.entry(amount).or_insert(0) += 1;
        for &id in keywords {
            if id >= self.keyword_amounts.len() {
                self.keyword_amounts.resize_with(id + 1, Vec::new);
            }
            self.keyword_amounts[id].push(amount);
        }
    }

    /// Amounts recorded for a keyword; empty for ids the pool never saw
    pub fn amounts_for(&self, id: KeywordId) -> &[Amount] {
        self.keyword_amounts.get(id).map_or(&[][..], Vec::as_slice)
    }

    pub fn keyword_amounts(&self) -> &[Vec<Amount>] {
        &self.keyword_amounts
    }

    pub fn amount_frequency(&self) -> &BTreeMap<Amount, u32> {
        &self.amount_frequency
    }

    /// Every distinct amount attached to any keyword
    pub fn distinct_amounts(&self) -> BTreeSet<Amount> {
        self.keyword_amounts.iter().flatten().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.amount_frequency.is_empty()
    }

    /// Build a pool directly, e.g. from another extraction stage
    pub fn from_parts(keyword_amounts: Vec<Vec<Amount>>, amount_frequency: BTreeMap<Amount, u32>) -> Self {
        CandidatePool {
            keyword_amounts,
            amount_frequency,
        }
    }
}

// ============================================================================
// LINE TRACE
// ============================================================================

/// What happened to one non-empty line, for `explain` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineTrace {
    /// 1-based line number in the OCR text
    pub line_number: usize,
    pub normalized: String,
    /// Keywords found (table text)
    pub keywords: Vec<String>,
    /// Disqualifying keywords found
    pub disqualifiers: Vec<String>,
    /// Amount recorded for this line, if it qualified and had one
    pub amount: Option<Amount>,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Aggregate all candidates of `text`.
pub fn aggregate(text: &str, table: &KeywordTable) -> CandidatePool {
    let (pool, _) = run(text, table, false);
    pool
}

/// Same as [`aggregate`], also returning a trace of every non-empty line.
pub fn aggregate_traced(text: &str, table: &KeywordTable) -> (CandidatePool, Vec<LineTrace>) {
    run(text, table, true)
}

fn run(text: &str, table: &KeywordTable, trace: bool) -> (CandidatePool, Vec<LineTrace>) {
    let mut pool = CandidatePool::new(table);
    let mut traces = Vec::new();

    for (index, raw) in split_lines(text).enumerate() {
        let line = normalize_line(raw);
        if line.is_empty() {
            continue;
        }

        let class = classify(&line, table);
        let amount = if class.qualifies() {
            extract_amount(&line)
        } else {
            None
        };

        if let Some(amount) = amount {
            tracing::debug!(
                line = index + 1,
                amount,
                keywords = ?class.keywords.iter().map(|&id| table.keyword(id)).collect::<Vec<_>>(),
                "candidate"
            );
            pool.record(amount, &class.keywords);
        }

        if trace {
            traces.push(LineTrace {
                line_number: index + 1,
                keywords: class.keywords.iter().map(|&id| table.keyword(id).to_string()).collect(),
                disqualifiers: class
                    .disqualifiers
                    .iter()
                    .map(|&id| table.disqualifiers()[id].clone())
                    .collect(),
                normalized: line,
                amount,
            });
        }
    }

    (pool, traces)
}

// ============================================================================
// TESTS
// ============================================================================
