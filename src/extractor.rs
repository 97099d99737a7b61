// 🧾 Total Extractor - OCR text in, one total out
//
// normalize -> classify -> tokenize -> aggregate -> resolve
// No state between calls; one extractor can be shared across threads.

use crate::aggregator::{aggregate, aggregate_traced, CandidatePool, LineTrace};
use crate::keywords::KeywordTable;
use crate::resolver::{resolve, Resolution};
use crate::tokenizer::Amount;
use serde::Serialize;
use std::collections::BTreeMap;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Amount plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Resolved total, 0 when unresolved
    pub amount: Amount,
    pub resolution: Resolution,
    pub candidates: CandidatePool,
}

/// Per-line diagnostics for a single receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionTrace {
    pub table: String,
    pub amount: Amount,
    pub resolution: Resolution,
    /// Keyword text -> amounts, only keywords that collected something
    pub keyword_amounts: BTreeMap<String, Vec<Amount>>,
    pub amount_frequency: BTreeMap<Amount, u32>,
    pub lines: Vec<LineTrace>,
}

/// What the API layer receives: the total and the OCR text it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptAnalysis {
    pub amount: Amount,
    pub text: String,
}

// ============================================================================
// EXTRACTOR
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct TotalExtractor {
    table: KeywordTable,
}

impl TotalExtractor {
    pub fn new(table: KeywordTable) -> Self {
        TotalExtractor { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Resolved total, 0 when nothing could be resolved
    pub fn extract_total_amount(&self, text: &str) -> Amount {
        self.extract(text).amount
    }

    pub fn extract(&self, text: &str) -> Extraction {
        let candidates = aggregate(text, &self.table);
        let resolution = resolve(&candidates, &self.table);
        Extraction {
            amount: resolution.amount_or_sentinel(),
            resolution,
            candidates,
        }
    }

    /// Extraction with a record of what every line contributed
    pub fn explain(&self, text: &str) -> ExtractionTrace {
        let (candidates, lines) = aggregate_traced(text, &self.table);
        let resolution = resolve(&candidates, &self.table);

        let keyword_amounts = candidates
            .keyword_amounts()
            .iter()
            .enumerate()
            .filter(|(_, amounts)| !amounts.is_empty())
            .map(|(id, amounts)| (self.table.keyword(id).to_string(), amounts.clone()))
            .collect();

        ExtractionTrace {
            table: self.table.name().to_string(),
            amount: resolution.amount_or_sentinel(),
            resolution,
            keyword_amounts,
            amount_frequency: candidates.amount_frequency().clone(),
            lines,
        }
    }

    /// Package the total together with its source text
    pub fn analyze(&self, text: String) -> ReceiptAnalysis {
        let amount = self.extract_total_amount(&text);
        ReceiptAnalysis { amount, text }
    }
}

/// Extract the total with the built-in Japanese keyword table.
///
/// Returns 0 when no total could be determined.
pub fn extract_total_amount(text: &str) -> Amount {
    TotalExtractor::default().extract_total_amount(text)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIPT: &str = "\
セブンイレブン 新宿店
2024年 3月 20日 12:41
おにぎり 2 ¥300
お茶 1 ¥150
小計 ¥1,042
計 ¥1
合計 ¥1
点数 3点
クレジット ¥1,125
お釣り ¥0
";

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(extract_total_amount(""), 0);
        assert_eq!(extract_total_amount("\n\n  \r\n"), 0);
    }

    #[test]
    fn test_garbage_is_zero() {
        assert_eq!(extract_total_amount("\u{0}\u{1}@@##~~ ÿþ"), 0);
        assert_eq!(extract_total_amount(&"x".repeat(100_000)), 0);
    }

    #[test]
    fn test_single_total_line_english() {
        let extractor = TotalExtractor::new(KeywordTable::english());
        assert_eq!(extractor.extract_total_amount("total 1,125"), 1125);
    }

    #[test]
    fn test_rightmost_number_on_line() {
        let extractor = TotalExtractor::new(KeywordTable::english());
        assert_eq!(extractor.extract_total_amount("items 3 total 1,250"), 1250);
    }

    #[test]
    fn test_receipt_credit_line_wins() {
        // 合計 was misread as ¥1; the credit line carries the real total
        let extraction = TotalExtractor::default().extract(RECEIPT);
        assert_eq!(extraction.amount, 1125);
        assert_eq!(
            extraction.resolution,
            Resolution::PriorityKeyword {
                amount: 1125,
                keyword: "クレジット".to_string()
            }
        );
        assert_eq!(extraction.candidates.amount_frequency().get(&1), Some(&2));
    }

    #[test]
    fn test_unanimous_receipt() {
        let text = "小計 ¥640\nキャッシュレス ¥640\n合計 ¥640";
        let extraction = TotalExtractor::default().extract(text);
        assert_eq!(extraction.resolution, Resolution::Unanimous { amount: 640 });
    }

    #[test]
    fn test_disqualified_line_contributes_nothing() {
        let extractor = TotalExtractor::new(KeywordTable::english());
        let extraction = extractor.extract("total 900\nchange total 100");
        assert_eq!(extraction.amount, 900);
        assert_eq!(extraction.candidates.amount_frequency().len(), 1);
    }

    #[test]
    fn test_frequency_fallback_without_priority_keywords() {
        let extractor = TotalExtractor::new(KeywordTable::english());
        let text = "sum 120\nsubtotal 480\nsum 480\ncash 500";
        // "subtotal" also contains "total", a priority keyword
        assert_eq!(extractor.extract_total_amount(text), 480);

        let text = "sum 120\nsum 480\nsum 480\ncash 500\ncash 120";
        let extraction = extractor.extract(text);
        assert_eq!(extraction.resolution, Resolution::Frequency { amount: 480, count: 2 });
    }

    #[test]
    fn test_frequency_tie_goes_to_largest() {
        let extractor = TotalExtractor::new(KeywordTable::english());
        let extraction = extractor.extract("sum 120\ncash 500\nsum 500\ncash 120");
        assert_eq!(extraction.resolution, Resolution::Frequency { amount: 500, count: 2 });
    }

    #[test]
    fn test_explain() {
        let trace = TotalExtractor::default().explain(RECEIPT);

        assert_eq!(trace.table, "japanese");
        assert_eq!(trace.amount, 1125);
        assert_eq!(trace.keyword_amounts.get("クレジット"), Some(&vec![1125]));
        assert_eq!(trace.keyword_amounts.get("計"), Some(&vec![1042, 1, 1]));
        assert!(!trace.keyword_amounts.contains_key("paypay"));

        let change = trace.lines.iter().find(|l| l.normalized.starts_with("お釣り")).unwrap();
        assert_eq!(change.amount, None);
        assert_eq!(change.disqualifiers, vec!["お釣り".to_string()]);
    }

    #[test]
    fn test_explain_serializes() {
        let trace = TotalExtractor::default().explain("合計 ¥1,125");
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["amount"], 1125);
        assert_eq!(json["resolution"]["rule"], "unanimous");
        assert_eq!(json["amount_frequency"]["1125"], 1);
    }

    #[test]
    fn test_analyze_keeps_text() {
        let analysis = TotalExtractor::default().analyze("合計 ¥980".to_string());
        assert_eq!(analysis.amount, 980);
        assert_eq!(analysis.text, "合計 ¥980");
    }

    #[test]
    fn test_extractor_is_shareable_across_threads() {
        let extractor = std::sync::Arc::new(TotalExtractor::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let extractor = extractor.clone();
                std::thread::spawn(move || extractor.extract_total_amount(&format!("合計 ¥{}", 100 * (i + 1))))
            })
            .collect();

        let totals: Vec<Amount> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(totals, vec![100, 200, 300, 400]);
    }
}
