// Receipt Scanner - Core Library
// Turns the OCR text of a receipt into its most plausible total amount.
// Exposes all modules for use in the CLI and tests

pub mod normalize;
pub mod tokenizer;
pub mod keywords;
pub mod classifier;
pub mod aggregator;
pub mod resolver;
pub mod extractor;
pub mod error;
pub mod config;
pub mod logging;
pub mod evaluation;

// Re-export commonly used types
pub use normalize::{normalize_line, split_lines};
pub use tokenizer::{amount_tokens, extract_amount, Amount};
pub use keywords::{Keyword, KeywordId, KeywordTable, KeywordTableSpec};
pub use classifier::{classify, LineClass};
pub use aggregator::{aggregate, aggregate_traced, CandidatePool, LineTrace};
pub use resolver::{resolve, Resolution, UNRESOLVED_AMOUNT};
pub use extractor::{
    extract_total_amount,
    Extraction, ExtractionTrace, ReceiptAnalysis, TotalExtractor,
};
pub use error::{ConfigError, TableError};
pub use config::ScannerConfig;
pub use evaluation::{evaluate_cases, evaluate_manifest, CaseResult, EvaluationReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
