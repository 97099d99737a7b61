// 🔍 Keyword Classifier
// Decides whether a normalized line may carry the receipt total.
//
// Matching is plain substring containment: 計 matches inside 合計 and 小計,
// and a keyword hidden inside a disqualifying phrase still counts as found.

use crate::keywords::{KeywordId, KeywordTable};
use serde::Serialize;

/// Keyword hits on one normalized line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineClass {
    /// Keywords found, in table order
    pub keywords: Vec<KeywordId>,
    /// Disqualifying keywords found, in table order
    pub disqualifiers: Vec<usize>,
}

impl LineClass {
    /// At least one keyword and no disqualifier
    pub fn qualifies(&self) -> bool {
        !self.keywords.is_empty() && self.disqualifiers.is_empty()
    }

    pub fn is_disqualified(&self) -> bool {
        !self.disqualifiers.is_empty()
    }
}

/// Classify an already normalized line against `table`.
pub fn classify(line: &str, table: &KeywordTable) -> LineClass {
    let keywords = table
        .keywords()
        .iter()
        .enumerate()
        .filter(|(_, keyword)| line.contains(keyword.as_str()))
        .map(|(id, _)| id)
        .collect();

    let disqualifiers = table
        .disqualifiers()
        .iter()
        .enumerate()
        .filter(|(_, word)| line.contains(word.as_str()))
        .map(|(id, _)| id)
        .collect();

    LineClass {
        keywords,
        disqualifiers,
    }
}

// ============================================================================
// TESTS
// ============================================================================
