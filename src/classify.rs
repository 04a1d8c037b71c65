//! Classification and aggregation of parsed records
//!
//! Three derivations, one per stage:
//!
//! 1. **Effect** (weights): each weight lands in exactly one band:
//!    `w >= 1` favors the transition, `w <= -1` opposes it, anything strictly
//!    between is neutral. Consecutive ranges sharing a band merge into spans.
//! 2. **Association** (correlation): Cramer's V buckets into five bands with
//!    0.25-wide steps; exactly 1.0 is its own "complete" band.
//! 3. **General distribution** (transition): each area's share of the total
//!    outgoing rate as a percentage, rounded so the set sums to exactly 100.

use crate::parser::correlation::CorrelationRecord;
use crate::parser::transition::AreaChangeSet;
use crate::parser::weights::WeightRow;
use serde::Serialize;

// ==========================================================================
// Effect classification (weights stage)
// ==========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EffectCategory {
    Favors,
    Neutral,
    Opposes,
}

impl EffectCategory {
    /// Narrative phrase, also the grouping key of the summary templates.
    pub fn phrase(&self) -> &'static str {
        match self {
            EffectCategory::Favors => "favorece el cambio",
            EffectCategory::Neutral => "no afecta el cambio",
            EffectCategory::Opposes => "repele el cambio",
        }
    }

    /// Legend label in the weights chart.
    pub fn legend(&self) -> &'static str {
        match self {
            EffectCategory::Favors => "Favorece",
            EffectCategory::Neutral => "Neutro",
            EffectCategory::Opposes => "Repele",
        }
    }
}

/// Total over all floats: the three bands partition the line with no gap or
/// overlap at the +/-1 boundaries.
pub fn classify_effect(weight: f64) -> EffectCategory {
    if weight >= 1.0 {
        EffectCategory::Favors
    } else if weight <= -1.0 {
        EffectCategory::Opposes
    } else {
        EffectCategory::Neutral
    }
}

/// A maximal run of consecutive ranges sharing one effect. Boundaries are the
/// raw strings from the range column, `start` from the first merged row and
/// `end` from the last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSpan {
    pub start: String,
    pub end: String,
    pub category: EffectCategory,
}

impl RangeSpan {
    /// `"<start> hasta <end>"`, the narrative form.
    pub fn phrase(&self) -> String {
        format!("{} hasta {}", self.start, self.end)
    }
}

fn range_bounds(range: &str) -> (String, String) {
    match range.split_once(':') {
        Some((start, end)) => (start.to_string(), end.to_string()),
        None => (range.to_string(), range.to_string()),
    }
}

/// Scan rows in range order, merging consecutive rows that classify alike.
pub fn merge_spans(rows: &[WeightRow]) -> Vec<RangeSpan> {
    let mut spans = Vec::new();
    let mut rows = rows.iter();
    let Some(first) = rows.next() else {
        return spans;
    };

    let (mut start, mut end) = range_bounds(&first.range);
    let mut category = classify_effect(first.weight);

    for row in rows {
        let next = classify_effect(row.weight);
        let (row_start, row_end) = range_bounds(&row.range);
        if next == category {
            end = row_end;
        } else {
            spans.push(RangeSpan {
                start,
                end,
                category,
            });
            start = row_start;
            end = row_end;
            category = next;
        }
    }
    spans.push(RangeSpan {
        start,
        end,
        category,
    });
    spans
}

// ==========================================================================
// Association classification (correlation stage)
// ==========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssociationCategory {
    None,
    Weak,
    Moderate,
    Strong,
    Complete,
}

impl AssociationCategory {
    pub const ALL: [AssociationCategory; 5] = [
        AssociationCategory::None,
        AssociationCategory::Weak,
        AssociationCategory::Moderate,
        AssociationCategory::Strong,
        AssociationCategory::Complete,
    ];
}

pub fn classify_association(cramer_v: f64) -> AssociationCategory {
    if cramer_v == 1.0 {
        AssociationCategory::Complete
    } else if cramer_v >= 0.75 {
        AssociationCategory::Strong
    } else if cramer_v >= 0.5 {
        AssociationCategory::Moderate
    } else if cramer_v >= 0.25 {
        AssociationCategory::Weak
    } else {
        AssociationCategory::None
    }
}

/// Records bucketed per category, input order preserved within each bucket.
pub fn group_by_association(
    records: &[CorrelationRecord],
) -> Vec<(AssociationCategory, Vec<&CorrelationRecord>)> {
    AssociationCategory::ALL
        .iter()
        .map(|&category| {
            let members: Vec<&CorrelationRecord> = records
                .iter()
                .filter(|r| classify_association(r.cramer_v) == category)
                .collect();
            (category, members)
        })
        .collect()
}

// ==========================================================================
// General distribution (transition stage)
// ==========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub area_label: String,
    /// Share of the grand total, in percent. The set sums to exactly 100.00.
    pub share_percent: f64,
}

/// Each area's total outgoing rate as a share of the grand total, sorted
/// descending, rounded to 2 decimals with the last entry absorbing the
/// rounding drift so the sum is always exactly 100.
pub fn general_distribution(areas: &[AreaChangeSet]) -> Vec<DistributionEntry> {
    let grand_total: f64 = areas
        .iter()
        .flat_map(|a| a.changes.iter())
        .map(|c| c.rate)
        .sum();
    if grand_total <= 0.0 {
        return Vec::new();
    }

    let mut entries: Vec<DistributionEntry> = areas
        .iter()
        .map(|area| {
            let area_total: f64 = area.changes.iter().map(|c| c.rate).sum();
            DistributionEntry {
                area_label: area.area_label.clone(),
                share_percent: area_total / grand_total * 100.0,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.share_percent
            .partial_cmp(&a.share_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut rounded_sum = 0.0;
    let last = entries.len() - 1;
    for (index, entry) in entries.iter_mut().enumerate() {
        if index == last {
            entry.share_percent = 100.0 - rounded_sum;
        } else {
            entry.share_percent = (entry.share_percent * 100.0).round() / 100.0;
            rounded_sum += entry.share_percent;
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::transition::AreaChange;

    fn row(range: &str, weight: f64) -> WeightRow {
        WeightRow {
            range: range.to_string(),
            weight,
        }
    }

    // ==========================================================================
    // EFFECT BOUNDARY TESTS
    // ==========================================================================

    #[test]
    fn test_effect_boundaries_partition_the_line() {
        assert_eq!(classify_effect(1.0), EffectCategory::Favors);
        assert_eq!(classify_effect(0.999999), EffectCategory::Neutral);
        assert_eq!(classify_effect(-1.0), EffectCategory::Opposes);
        assert_eq!(classify_effect(-0.999999), EffectCategory::Neutral);
        assert_eq!(classify_effect(0.0), EffectCategory::Neutral);
        assert_eq!(classify_effect(12.5), EffectCategory::Favors);
        assert_eq!(classify_effect(-3.0), EffectCategory::Opposes);
    }

    // ==========================================================================
    // SPAN MERGE TESTS
    // ==========================================================================

    #[test]
    fn test_merge_consecutive_same_category() {
        let rows = vec![
            row("0:10", 2.0),
            row("10:20", 1.5),
            row("20:30", 0.0),
            row("30:40", -2.0),
        ];
        let spans = merge_spans(&rows);
        assert_eq!(
            spans,
            vec![
                RangeSpan {
                    start: "0".into(),
                    end: "20".into(),
                    category: EffectCategory::Favors
                },
                RangeSpan {
                    start: "20".into(),
                    end: "30".into(),
                    category: EffectCategory::Neutral
                },
                RangeSpan {
                    start: "30".into(),
                    end: "40".into(),
                    category: EffectCategory::Opposes
                },
            ]
        );
    }

    #[test]
    fn test_merge_single_row() {
        let spans = merge_spans(&[row("0:10", 0.5)]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].phrase(), "0 hasta 10");
        assert_eq!(spans[0].category, EffectCategory::Neutral);
    }

    #[test]
    fn test_merge_empty_rows() {
        assert!(merge_spans(&[]).is_empty());
    }

    #[test]
    fn test_merge_alternating_categories() {
        let rows = vec![row("0:1", 1.0), row("1:2", 0.0), row("2:3", 1.0)];
        let spans = merge_spans(&rows);
        assert_eq!(spans.len(), 3);
    }

    // ==========================================================================
    // ASSOCIATION BOUNDARY TESTS
    // ==========================================================================

    #[test]
    fn test_association_boundaries() {
        assert_eq!(classify_association(0.0), AssociationCategory::None);
        assert_eq!(classify_association(0.25), AssociationCategory::Weak);
        assert_eq!(classify_association(0.49), AssociationCategory::Weak);
        assert_eq!(classify_association(0.5), AssociationCategory::Moderate);
        assert_eq!(classify_association(0.75), AssociationCategory::Strong);
        assert_eq!(classify_association(1.0), AssociationCategory::Complete);
    }

    #[test]
    fn test_grouping_preserves_input_order() {
        let make = |a: &str, v: f64| CorrelationRecord {
            var_a: a.to_string(),
            var_b: "x".to_string(),
            chi_square: 0.0,
            cramer_v: v,
            contingency: 0.0,
            joint_entropy: 0.0,
            joint_uncertainty: 0.0,
        };
        let records = vec![make("c", 0.3), make("a", 0.1), make("b", 0.3)];
        let groups = group_by_association(&records);
        let weak: Vec<&str> = groups[1].1.iter().map(|r| r.var_a.as_str()).collect();
        assert_eq!(groups[1].0, AssociationCategory::Weak);
        assert_eq!(weak, vec!["c", "b"]);
        assert_eq!(groups[0].1.len(), 1);
        assert!(groups[4].1.is_empty());
    }

    // ==========================================================================
    // DISTRIBUTION TESTS
    // ==========================================================================

    fn area(label: &str, rates: &[f64]) -> AreaChangeSet {
        AreaChangeSet {
            area_label: label.to_string(),
            changes: rates
                .iter()
                .map(|&rate| AreaChange {
                    to_label: "x".to_string(),
                    rate,
                })
                .collect(),
        }
    }

    #[test]
    fn test_distribution_sums_to_exactly_100() {
        // Thirds produce rounding drift: 33.33 + 33.33 + adjusted last.
        let areas = vec![area("a", &[0.1]), area("b", &[0.1]), area("c", &[0.1])];
        let dist = general_distribution(&areas);
        let total: f64 = dist.iter().map(|d| d.share_percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(dist[0].share_percent, 33.33);
        assert!((dist[2].share_percent - 33.34).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_sorted_descending() {
        let areas = vec![area("small", &[0.1]), area("big", &[0.7, 0.2])];
        let dist = general_distribution(&areas);
        assert_eq!(dist[0].area_label, "big");
        assert_eq!(dist[0].share_percent, 90.0);
        assert_eq!(dist[1].share_percent, 10.0);
    }

    #[test]
    fn test_distribution_single_area_is_100() {
        let dist = general_distribution(&[area("only", &[0.42])]);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist[0].share_percent, 100.0);
    }

    #[test]
    fn test_distribution_zero_total_is_empty() {
        assert!(general_distribution(&[area("a", &[0.0])]).is_empty());
        assert!(general_distribution(&[]).is_empty());
    }

    #[test]
    fn test_effect_phrases() {
        assert_eq!(EffectCategory::Favors.phrase(), "favorece el cambio");
        assert_eq!(EffectCategory::Opposes.legend(), "Repele");
    }
}
