//! `.dcf` weights-of-evidence parser
//!
//! The `.dcf` export is a line-oriented block format:
//!
//! ```text
//! :static_var/slope 0:10 10:20 20:50
//! 1,2 0.53 1.71 -2.02
//! 1,3 0.10 0.20 0.30
//! ```
//!
//! A line starting with `:` is a *range header*: the parameter token before
//! the first `/` (leading `:` stripped) is recombined with the token after it
//! as `"<left>/<right>"`, and the remaining whitespace-separated tokens are
//! the ordered range boundaries. The header applies to every data line until
//! the next header.
//!
//! A *data line* is `fromCode,toCode` followed by one weight per range. Each
//! data line yields its own [`WeightTable`]; a weight cell that does not
//! parse as a number drops only that (range, weight) pair.

use crate::dictionary::Dictionary;
use serde::Serialize;

/// One parsed `.dcf` block: a transition title, the analyzed parameter, and
/// ordered (range, weight) rows.
#[derive(Debug, Clone, Serialize)]
pub struct WeightTable {
    pub title: String,
    /// e.g. `"static_var/slope"`
    pub parameter: String,
    pub rows: Vec<WeightRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightRow {
    /// Raw range string as exported, `"<start>:<end>"`.
    pub range: String,
    pub weight: f64,
}

impl WeightRow {
    /// `(start, end)` boundaries, when the range string is well formed.
    pub fn boundaries(&self) -> Option<(f64, f64)> {
        let (start, end) = self.range.split_once(':')?;
        Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
    }
}

pub fn parse(text: &str, dictionary: &Dictionary) -> Vec<WeightTable> {
    let mut tables = Vec::new();
    let mut header: Option<(String, Vec<String>)> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(stripped) = line.strip_prefix(':') {
            let mut tokens = stripped.split_whitespace();
            let Some(first) = tokens.next() else { continue };
            let parameter = match first.split_once('/') {
                Some((left, right)) => format!("{left}/{right}"),
                None => first.to_string(),
            };
            let ranges: Vec<String> = tokens.map(str::to_string).collect();
            header = Some((parameter, ranges));
            continue;
        }

        let Some((parameter, ranges)) = header.as_ref() else {
            // Tolerant variant: data before any range header is skipped.
            log::warn!("línea de datos sin encabezado de rangos: '{line}'");
            continue;
        };

        let mut tokens = line.split_whitespace();
        let Some(pair) = tokens.next() else { continue };
        let Some((from, to)) = pair.split_once(',') else {
            log::warn!("par de transición ilegible: '{pair}'");
            continue;
        };

        let weights: Vec<&str> = tokens.collect();
        let rows: Vec<WeightRow> = ranges
            .iter()
            .zip(weights.iter())
            .filter_map(|(range, weight)| {
                let weight: f64 = weight.parse().ok()?;
                Some(WeightRow {
                    range: range.clone(),
                    weight,
                })
            })
            .collect();

        let from_label = dictionary.resolve(from);
        let to_label = dictionary.resolve(to);
        tables.push(WeightTable {
            title: format!("Transición de {from_label} a {to_label} ({from} -> {to})"),
            parameter: parameter.clone(),
            rows,
        });
    }
    tables
}
