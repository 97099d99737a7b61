// 🏷️ Keyword Tables - Keywords as Data
// Which words label a total, which words disqualify a line, and which
// keywords are trusted enough to override raw frequency.
//
// Tables are immutable once built. Swapping locale = swapping the table,
// the algorithm never changes.

use crate::error::{ConfigError, TableError};
use crate::normalize::normalize_line;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Position of a keyword inside its [`KeywordTable`].
pub type KeywordId = usize;

// ============================================================================
// BUILT-IN JAPANESE KEYWORDS
// ============================================================================

/// Keywords of the built-in Japanese table, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// 合計 - grand total
    Total,
    /// 小計 - subtotal
    Subtotal,
    /// 計 - "sum", also matches inside 合計 and 小計
    Sum,
    /// 言十 - 計 as Tesseract often splits it
    SumMisread,
    /// paypay - QR payment line
    PayPay,
    /// クレジット - credit card payment line
    Credit,
    /// キャッシュレス - cashless payment line
    Cashless,
}

impl Keyword {
    pub const ALL: [Keyword; 7] = [
        Keyword::Total,
        Keyword::Subtotal,
        Keyword::Sum,
        Keyword::SumMisread,
        Keyword::PayPay,
        Keyword::Credit,
        Keyword::Cashless,
    ];

    /// Keywords that outrank frequency, highest priority first
    pub const PRIORITY: [Keyword; 3] = [Keyword::Total, Keyword::PayPay, Keyword::Credit];

    /// Text as it appears on a normalized line
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Total => "合計",
            Keyword::Subtotal => "小計",
            Keyword::Sum => "計",
            Keyword::SumMisread => "言十",
            Keyword::PayPay => "paypay",
            Keyword::Credit => "クレジット",
            Keyword::Cashless => "キャッシュレス",
        }
    }

    /// Index of this keyword in [`KeywordTable::japanese`]
    pub fn id(&self) -> KeywordId {
        *self as KeywordId
    }
}

/// Disqualifying keywords of the Japanese table: 点数 (item count), お釣り (change due)
pub const JAPANESE_DISQUALIFIERS: [&str; 2] = ["点数", "お釣り"];

// ============================================================================
// TABLE DEFINITION (serialized form)
// ============================================================================

/// On-disk shape of a keyword table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTableSpec {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub disqualifiers: Vec<String>,
    #[serde(default)]
    pub priority: Vec<String>,
}

// ============================================================================
// KEYWORD TABLE
// ============================================================================

/// Validated, normalized keyword table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    name: String,
    keywords: Vec<String>,
    disqualifiers: Vec<String>,
    priority: Vec<KeywordId>,
}

impl KeywordTable {
    /// Build a table, normalizing every entry the same way receipt lines are.
    ///
    /// Fails if there are no keywords, an entry is blank, an entry repeats,
    /// a priority entry is not a keyword, or a keyword is also a disqualifier.
    pub fn new<S: AsRef<str>>(
        name: &str,
        keywords: &[S],
        disqualifiers: &[S],
        priority: &[S],
    ) -> Result<Self, TableError> {
        let keywords = normalize_entries(name, keywords)?;
        let disqualifiers = normalize_entries(name, disqualifiers)?;

        if keywords.is_empty() {
            return Err(TableError::Empty(name.to_string()));
        }

        if let Some(entry) = disqualifiers.iter().find(|d| keywords.contains(*d)) {
            return Err(TableError::Overlap {
                table: name.to_string(),
                entry: entry.clone(),
            });
        }

        let mut priority_ids = Vec::with_capacity(priority.len());
        for entry in normalize_entries(name, priority)? {
            let id = keywords.iter().position(|k| *k == entry).ok_or_else(|| {
                TableError::UnknownPriority {
                    table: name.to_string(),
                    entry: entry.clone(),
                }
            })?;
            priority_ids.push(id);
        }

        Ok(KeywordTable {
            name: name.to_string(),
            keywords,
            disqualifiers,
            priority: priority_ids,
        })
    }

    /// Japanese receipts (default)
    pub fn japanese() -> Self {
        KeywordTable {
            name: "japanese".to_string(),
            keywords: Keyword::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            disqualifiers: JAPANESE_DISQUALIFIERS.iter().map(|d| d.to_string()).collect(),
            priority: Keyword::PRIORITY.iter().map(Keyword::id).collect(),
        }
    }

    /// English receipts
    pub fn english() -> Self {
        KeywordTable {
            name: "english".to_string(),
            keywords: [
                "total",
                "subtotal",
                "amountdue",
                "sum",
                "visa",
                "mastercard",
                "cash",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            disqualifiers: ["itemcount", "numberofitems", "change"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            // total, amountdue, visa, mastercard
            priority: vec![0, 2, 4, 5],
        }
    }

    /// Look up a built-in table
    pub fn by_name(name: &str) -> Result<Self, TableError> {
        match name.trim().to_lowercase().as_str() {
            "japanese" | "ja" | "jp" => Ok(KeywordTable::japanese()),
            "english" | "en" => Ok(KeywordTable::english()),
            other => Err(TableError::UnknownLocale(other.to_string())),
        }
    }

    /// Build from the serialized form
    pub fn from_spec(spec: &KeywordTableSpec) -> Result<Self, TableError> {
        KeywordTable::new(
            &spec.name,
            spec.keywords.as_slice(),
            spec.disqualifiers.as_slice(),
            spec.priority.as_slice(),
        )
    }

    /// Parse a JSON table definition
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let spec: KeywordTableSpec =
            serde_json::from_str(json).map_err(|source| ConfigError::Json {
                path: "<inline>".to_string(),
                source,
            })?;
        Ok(KeywordTable::from_spec(&spec)?)
    }

    /// Load a JSON table definition from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let spec: KeywordTableSpec =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.display().to_string(),
                source,
            })?;
        Ok(KeywordTable::from_spec(&spec)?)
    }

    /// Serialized form, e.g. to dump a built-in table as a starting point
    pub fn to_spec(&self) -> KeywordTableSpec {
        KeywordTableSpec {
            name: self.name.clone(),
            keywords: self.keywords.clone(),
            disqualifiers: self.disqualifiers.clone(),
            priority: self.priority.iter().map(|&id| self.keywords[id].clone()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of keywords
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn keyword(&self, id: KeywordId) -> &str {
        &self.keywords[id]
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn disqualifiers(&self) -> &[String] {
        &self.disqualifiers
    }

    /// Priority keywords, highest first
    pub fn priority_ids(&self) -> &[KeywordId] {
        &self.priority
    }

    /// Position of a keyword (given in any spacing/case)
    pub fn position(&self, keyword: &str) -> Option<KeywordId> {
        let keyword = normalize_line(keyword);
        self.keywords.iter().position(|k| *k == keyword)
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        KeywordTable::japanese()
    }
}

fn normalize_entries<S: AsRef<str>>(table: &str, entries: &[S]) -> Result<Vec<String>, TableError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(entries.len());

    for entry in entries {
        let entry = normalize_line(entry.as_ref());
        if entry.is_empty() {
            return Err(TableError::EmptyEntry {
                table: table.to_string(),
            });
        }
        if !seen.insert(entry.clone()) {
            return Err(TableError::Duplicate {
                table: table.to_string(),
                entry,
            });
        }
        normalized.push(entry);
    }

    Ok(normalized)
}

// ============================================================================
// TESTS
// ============================================================================
