// ⚖️ Resolver - picks the single most plausible total
//
// Policy, first exit wins:
//   1. Unanimity   - every keyword amount is the same value
//   2. Priority    - max over the priority keywords that have data
//                    (each contributes its single value or its maximum)
//   3. Frequency   - most frequent amount, ties go to the largest
// Nothing found -> Unresolved (reported as 0)

use crate::aggregator::CandidatePool;
use crate::keywords::{KeywordId, KeywordTable};
use crate::tokenizer::Amount;
use serde::Serialize;

/// Returned in place of an amount when nothing could be resolved.
pub const UNRESOLVED_AMOUNT: Amount = 0;

// ============================================================================
// RESOLUTION
// ============================================================================

/// Outcome of [`resolve`], including which rule decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Resolution {
    /// All keyword amounts agree
    Unanimous { amount: Amount },

    /// Decided by a priority keyword
    PriorityKeyword { amount: Amount, keyword: String },

    /// Decided by how many qualifying lines carried the amount
    Frequency { amount: Amount, count: u32 },

    /// No qualifying line had an amount
    Unresolved,
}

impl Resolution {
    /// Resolved amount, `None` when unresolved. A parsed zero stays `Some(0)`.
    pub fn amount(&self) -> Option<Amount> {
        match self {
            Resolution::Unanimous { amount } => Some(*amount),
            Resolution::PriorityKeyword { amount, .. } => Some(*amount),
            Resolution::Frequency { amount, .. } => Some(*amount),
            Resolution::Unresolved => None,
        }
    }

    /// Amount with [`UNRESOLVED_AMOUNT`] standing in for "unresolved"
    pub fn amount_or_sentinel(&self) -> Amount {
        self.amount().unwrap_or(UNRESOLVED_AMOUNT)
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }

    /// Short rule name for logs and reports
    pub fn rule(&self) -> &'static str {
        match self {
            Resolution::Unanimous { .. } => "unanimous",
            Resolution::PriorityKeyword { .. } => "priority_keyword",
            Resolution::Frequency { .. } => "frequency",
            Resolution::Unresolved => "unresolved",
        }
    }
}

// ============================================================================
// POLICY
// ============================================================================

/// Pick the total from the aggregated candidates.
pub fn resolve(pool: &CandidatePool, table: &KeywordTable) -> Resolution {
    let resolution = unanimous(pool)
        .or_else(|| priority_keyword(pool, table))
        .unwrap_or_else(|| most_frequent(pool));

    tracing::debug!(rule = resolution.rule(), amount = ?resolution.amount(), "resolved total");
    resolution
}

fn unanimous(pool: &CandidatePool) -> Option<Resolution> {
    let distinct = pool.distinct_amounts();
    if distinct.len() != 1 {
        return None;
    }
    distinct
        .into_iter()
        .next()
        .map(|amount| Resolution::Unanimous { amount })
}

fn priority_keyword(pool: &CandidatePool, table: &KeywordTable) -> Option<Resolution> {
    let mut best: Option<(Amount, KeywordId)> = None;

    for &id in table.priority_ids() {
        // a single distinct value is its own maximum
        let Some(&amount) = pool.amounts_for(id).iter().max() else {
            continue;
        };
        match best {
            Some((current, _)) if current >= amount => {}
            _ => best = Some((amount, id)),
        }
    }

    best.map(|(amount, id)| Resolution::PriorityKeyword {
        amount,
        keyword: table.keyword(id).to_string(),
    })
}

fn most_frequent(pool: &CandidatePool) -> Resolution {
    let frequency = pool.amount_frequency();
    let Some(&max_count) = frequency.values().max() else {
        return Resolution::Unresolved;
    };

    // BTreeMap iterates ascending, so the last tied amount is the largest
    frequency
        .iter()
        .filter(|(_, &count)| count == max_count)
        .map(|(&amount, _)| amount)
        .last()
        .map_or(Resolution::Unresolved, |amount| Resolution::Frequency {
            amount,
            count: max_count,
        })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use crate::keywords::Keyword;
    use std::collections::BTreeMap;

    fn japanese_pool(entries: &[(Keyword, Vec<Amount>)], frequency: &[(Amount, u32)]) -> CandidatePool {
        let mut keyword_amounts = vec![Vec::new(); Keyword::ALL.len()];
        for (keyword, amounts) in entries {
            keyword_amounts[keyword.id()] = amounts.clone();
        }
        let amount_frequency: BTreeMap<Amount, u32> = frequency.iter().copied().collect();
        CandidatePool::from_parts(keyword_amounts, amount_frequency)
    }

    #[test]
    fn test_priority_keyword_overrides_frequency() {
        let table = KeywordTable::japanese();
        let pool = japanese_pool(
            &[
                (Keyword::Total, vec![1]),
                (Keyword::Subtotal, vec![1042]),
                (Keyword::Sum, vec![1042, 1]),
                (Keyword::Credit, vec![1125]),
            ],
            &[(1042, 2), (1, 2), (1125, 1)],
        );

        let resolution = resolve(&pool, &table);
        assert_eq!(
            resolution,
            Resolution::PriorityKeyword {
                amount: 1125,
                keyword: "クレジット".to_string()
            }
        );
        assert_eq!(resolution.amount_or_sentinel(), 1125);
    }

    #[test]
    fn test_priority_takes_max_across_keywords_not_first_hit() {
        let table = KeywordTable::japanese();
        // 合計 has data but a lower value than paypay
        let pool = japanese_pool(
            &[(Keyword::Total, vec![900]), (Keyword::PayPay, vec![1200]), (Keyword::Sum, vec![900, 50])],
            &[(900, 1), (1200, 1), (50, 1)],
        );
        assert_eq!(resolve(&pool, &table).amount(), Some(1200));
    }

    #[test]
    fn test_priority_keyword_with_several_values_uses_max() {
        let table = KeywordTable::japanese();
        let pool = japanese_pool(
            &[(Keyword::Total, vec![980, 1080, 980]), (Keyword::Sum, vec![980, 1080, 980])],
            &[(980, 2), (1080, 1)],
        );
        assert_eq!(
            resolve(&pool, &table),
            Resolution::PriorityKeyword {
                amount: 1080,
                keyword: "合計".to_string()
            }
        );
    }

    #[test]
    fn test_priority_tie_reports_highest_priority_keyword() {
        let table = KeywordTable::japanese();
        let pool = japanese_pool(
            &[(Keyword::Total, vec![500, 700]), (Keyword::Credit, vec![700]), (Keyword::Sum, vec![500])],
            &[(500, 1), (700, 1)],
        );
        assert_eq!(
            resolve(&pool, &table),
            Resolution::PriorityKeyword {
                amount: 700,
                keyword: "合計".to_string()
            }
        );
    }

    #[test]
    fn test_unanimity_short_circuits() {
        let table = KeywordTable::japanese();
        let pool = japanese_pool(
            &[(Keyword::Subtotal, vec![640, 640]), (Keyword::Sum, vec![640, 640]), (Keyword::Cashless, vec![640])],
            &[(640, 3)],
        );
        assert_eq!(resolve(&pool, &table), Resolution::Unanimous { amount: 640 });
    }

    #[test]
    fn test_frequency_fallback() {
        let table = KeywordTable::japanese();
        let pool = japanese_pool(
            &[(Keyword::Subtotal, vec![300, 120]), (Keyword::Sum, vec![300, 120, 300])],
            &[(300, 2), (120, 1)],
        );
        assert_eq!(
            resolve(&pool, &table),
            Resolution::Frequency {
                amount: 300,
                count: 2
            }
        );
    }

    #[test]
    fn test_frequency_tie_goes_to_largest() {
        let table = KeywordTable::japanese();
        let pool = japanese_pool(
            &[(Keyword::Subtotal, vec![1042, 1]), (Keyword::Sum, vec![1042, 1, 1125])],
            &[(1042, 1), (1, 1), (1125, 1)],
        );
        assert_eq!(resolve(&pool, &table).amount(), Some(1125));
    }

    #[test]
    fn test_frequency_highest_count_beats_larger_amount() {
        let table = KeywordTable::japanese();
        let pool = japanese_pool(
            &[(Keyword::Sum, vec![1042, 1, 1125, 1125])],
            &[(1042, 1), (1, 1), (1125, 2)],
        );
        assert_eq!(resolve(&pool, &table).amount(), Some(1125));
    }

    #[test]
    fn test_empty_pool_is_unresolved() {
        let table = KeywordTable::japanese();
        let pool = CandidatePool::new(&table);
        let resolution = resolve(&pool, &table);

        assert_eq!(resolution, Resolution::Unresolved);
        assert!(!resolution.is_resolved());
        assert_eq!(resolution.amount(), None);
        assert_eq!(resolution.amount_or_sentinel(), UNRESOLVED_AMOUNT);
    }

    #[test]
    fn test_resolved_zero_is_not_unresolved() {
        let table = KeywordTable::japanese();
        let pool = aggregate("合計 0", &table);
        let resolution = resolve(&pool, &table);

        assert_eq!(resolution, Resolution::Unanimous { amount: 0 });
        assert!(resolution.is_resolved());
        assert_eq!(resolution.amount(), Some(0));
    }

    #[test]
    fn test_pool_from_another_table_does_not_panic() {
        let pool = aggregate("合計 100\n小計 90", &KeywordTable::japanese());
        let wider = KeywordTable::new(
            "wider",
            &["a", "b", "c", "d", "e", "f", "g", "h"],
            &[],
            &["h"],
        )
        .unwrap();

        // keyword 7 has no list in a 7-keyword pool
        assert_eq!(
            resolve(&pool, &wider),
            Resolution::Frequency {
                amount: 100,
                count: 1
            }
        );
    }

    #[test]
    fn test_resolution_serializes_with_rule_tag() {
        let json = serde_json::to_value(Resolution::Frequency { amount: 300, count: 2 }).unwrap();
        assert_eq!(json["rule"], "frequency");
        assert_eq!(json["amount"], 300);
    }
}
