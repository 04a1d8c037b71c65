//! Parsers for the three stage-specific export formats
//!
//! Each parser turns one raw text export into typed records validated at the
//! boundary. The shared policy: a malformed *row* is dropped with a warning
//! and processing continues; a missing *file* or an empty *result* is fatal
//! and surfaces as a [`crate::ReportError`].

pub mod correlation;
pub mod transition;
pub mod weights;

/// Split CSV-ish text into trimmed cell rows, dropping blank lines. The
/// exports carry no quoting or escapes, so a plain comma split is the whole
/// grammar.
pub(crate) fn csv_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| {
            line.split(',')
                .map(|cell| cell.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rows_trims_and_drops_blank_lines() {
        let rows = csv_rows("a, b ,c\n\n  \n1,2,3\n,,\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "b", "c"]);
        assert_eq!(rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_csv_rows_keeps_partial_rows() {
        let rows = csv_rows("x,,z");
        assert_eq!(rows, vec![vec!["x", "", "z"]]);
    }
}
