//! Transition matrix CSV parser
//!
//! Input rows are `fromCode,toCode,rate[,...]` where `rate` is a fraction in
//! 0-1. The first line is a header. Both codes must resolve through the
//! dictionary; a row with any unresolvable code is dropped with a warning so
//! one bad class id cannot abort an otherwise valid matrix.

use crate::dictionary::Dictionary;
use crate::parser::csv_rows;
use serde::Serialize;

/// All recorded transitions out of one area, in input order. The set itself
/// is keyed by the resolved `from` label and ordered by first appearance.
#[derive(Debug, Clone, Serialize)]
pub struct AreaChangeSet {
    pub area_label: String,
    pub changes: Vec<AreaChange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaChange {
    pub to_label: String,
    /// Fraction in 0-1. Rendered as a percentage with 4 decimals.
    pub rate: f64,
}

impl AreaChange {
    pub fn rate_percent(&self) -> String {
        format!("{:.4}", self.rate * 100.0)
    }
}

#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub areas: Vec<AreaChangeSet>,
    /// Count of dropped rows / unresolved codes, for the run log.
    pub warnings: usize,
}

pub fn parse(text: &str, dictionary: &Dictionary) -> ParseOutcome {
    let rows = csv_rows(text);
    let mut outcome = ParseOutcome::default();

    for row in rows.iter().skip(1) {
        if row.len() < 3 {
            continue;
        }
        let (from, to, rate) = (&row[0], &row[1], &row[2]);

        let from_label = dictionary.get(from);
        if from_label.is_none() {
            log::warn!("advertencia: '{from}' no está en el diccionario");
            outcome.warnings += 1;
        }
        let to_label = dictionary.get(to);
        if to_label.is_none() {
            log::warn!("advertencia: '{to}' no está en el diccionario");
            outcome.warnings += 1;
        }
        let (Some(from_label), Some(to_label)) = (from_label, to_label) else {
            continue;
        };

        let Ok(rate) = rate.parse::<f64>() else {
            log::warn!("advertencia: tasa ilegible '{rate}' en la fila {from},{to}");
            outcome.warnings += 1;
            continue;
        };

        let change = AreaChange {
            to_label: to_label.to_string(),
            rate,
        };
        match outcome
            .areas
            .iter_mut()
            .find(|set| set.area_label == from_label)
        {
            Some(set) => set.changes.push(change),
            None => outcome.areas.push(AreaChangeSet {
                area_label: from_label.to_string(),
                changes: vec![change],
            }),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> Dictionary {
        let mut d = Dictionary::new();
        d.insert("1", "Forest");
        d.insert("2", "Urban");
        d.insert("3", "Water");
        d
    }

    #[test]
    fn test_header_row_is_discarded() {
        let out = parse("from,to,rate\n1,2,0.1\n", &dict());
        assert_eq!(out.areas.len(), 1);
        assert_eq!(out.areas[0].area_label, "Forest");
        assert_eq!(out.areas[0].changes[0].to_label, "Urban");
        assert_eq!(out.areas[0].changes[0].rate_percent(), "10.0000");
        assert_eq!(out.warnings, 0);
    }

    #[test]
    fn test_grouping_preserves_first_appearance_order() {
        let out = parse("from,to,rate\n2,1,0.5\n1,3,0.25\n2,3,0.1\n", &dict());
        let labels: Vec<_> = out.areas.iter().map(|a| a.area_label.as_str()).collect();
        assert_eq!(labels, vec!["Urban", "Forest"]);
        assert_eq!(out.areas[0].changes.len(), 2);
    }

    #[test]
    fn test_unresolved_row_dropped_without_aborting() {
        // same output as if the bad row were absent, plus warnings
        let with_bad = parse("from,to,rate\n1,2,0.1\n9,2,0.3\n3,1,0.2\n", &dict());
        let without = parse("from,to,rate\n1,2,0.1\n3,1,0.2\n", &dict());
        assert_eq!(with_bad.areas.len(), without.areas.len());
        for (a, b) in with_bad.areas.iter().zip(&without.areas) {
            assert_eq!(a.area_label, b.area_label);
            assert_eq!(a.changes.len(), b.changes.len());
        }
        assert_eq!(with_bad.warnings, 1);
        assert_eq!(without.warnings, 0);
    }

    #[test]
    fn test_both_codes_unresolved_counts_two_warnings() {
        let out = parse("from,to,rate\n8,9,0.1\n", &dict());
        assert!(out.areas.is_empty());
        assert_eq!(out.warnings, 2);
    }

    #[test]
    fn test_unparsable_rate_drops_row() {
        let out = parse("from,to,rate\n1,2,n/a\n1,2,0.5\n", &dict());
        assert_eq!(out.areas[0].changes.len(), 1);
        assert_eq!(out.warnings, 1);
    }

    #[test]
    fn test_trailing_columns_ignored() {
        let out = parse("from,to,rate,extra\n1,2,0.1,ignored\n", &dict());
        assert_eq!(out.areas[0].changes[0].rate, 0.1);
    }

    #[test]
    fn test_short_rows_skipped() {
        let out = parse("from,to,rate\n1,2\n", &dict());
        assert!(out.areas.is_empty());
        assert_eq!(out.warnings, 0);
    }

    #[test]
    fn test_percent_formatting_rounds_to_four_decimals() {
        let change = AreaChange {
            to_label: "Urban".into(),
            rate: 0.123456789,
        };
        assert_eq!(change.rate_percent(), "12.3457");
    }
}
