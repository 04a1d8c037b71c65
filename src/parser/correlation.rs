//! Correlation statistics CSV parser
//!
//! One row per variable pair with five association statistics. Rows need at
//! least 9 columns; the first two carry the transition pair the whole file
//! describes, columns 2-3 the variable names, columns 4-8 the numbers:
//!
//! | Column | Content |
//! |--------|---------------------|
//! | 0, 1   | transition from/to |
//! | 2, 3   | variable names |
//! | 4      | Chi² |
//! | 5      | Cramer's V (0-1) |
//! | 6      | contingency |
//! | 7      | joint entropy |
//! | 8      | joint uncertainty |
//!
//! A record is retained only when all five numeric fields parse. Variable
//! names are cleaned of the exporter's `static_var/` and `distance/` path
//! prefixes.

use crate::parser::csv_rows;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CorrelationRecord {
    pub var_a: String,
    pub var_b: String,
    pub chi_square: f64,
    pub cramer_v: f64,
    pub contingency: f64,
    pub joint_entropy: f64,
    pub joint_uncertainty: f64,
}

impl CorrelationRecord {
    /// `"varA - varB"`, the display form used in lists and graph data.
    pub fn pair(&self) -> String {
        format!("{} - {}", self.var_a, self.var_b)
    }
}

/// Transition pair the correlation file belongs to, read from the first data
/// row. Falls back to `"Desconocido"` when absent.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionHeader {
    pub from: String,
    pub to: String,
}

#[derive(Debug)]
pub struct CorrelationFile {
    pub header: TransitionHeader,
    pub records: Vec<CorrelationRecord>,
}

pub fn clean_variable_name(name: &str) -> String {
    name.replace("static_var/", "").replace("distance/", "")
}

pub fn parse(text: &str) -> CorrelationFile {
    let rows = csv_rows(text);

    let header = match rows.get(1) {
        Some(row) if row.len() >= 2 && !row[0].is_empty() && !row[1].is_empty() => {
            TransitionHeader {
                from: row[0].clone(),
                to: row[1].clone(),
            }
        }
        _ => TransitionHeader {
            from: "Desconocido".to_string(),
            to: "Desconocido".to_string(),
        },
    };

    let mut records = Vec::new();
    for row in rows.iter().skip(1) {
        if row.len() < 9 {
            log::warn!("fila de correlación con {} columnas, se omite", row.len());
            continue;
        }
        let numbers: Option<Vec<f64>> = row[4..9].iter().map(|c| c.parse().ok()).collect();
        let Some(numbers) = numbers else {
            log::warn!("estadísticas ilegibles para el par {},{}", row[2], row[3]);
            continue;
        };
        records.push(CorrelationRecord {
            var_a: clean_variable_name(&row[2]),
            var_b: clean_variable_name(&row[3]),
            chi_square: numbers[0],
            cramer_v: numbers[1],
            contingency: numbers[2],
            joint_entropy: numbers[3],
            joint_uncertainty: numbers[4],
        });
    }

    CorrelationFile { header, records }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "from,to,var1,var2,chi2,cramer,cont,entropy,uncert\n";

    #[test]
    fn test_valid_row_parses() {
        let text = format!("{HEADER}1,2,static_var/slope,distance/roads,1.5,0.42,0.3,0.9,0.1\n");
        let file = parse(&text);
        assert_eq!(file.records.len(), 1);
        let rec = &file.records[0];
        assert_eq!(rec.var_a, "slope");
        assert_eq!(rec.var_b, "roads");
        assert_eq!(rec.chi_square, 1.5);
        assert_eq!(rec.cramer_v, 0.42);
        assert_eq!(rec.joint_uncertainty, 0.1);
        assert_eq!(rec.pair(), "slope - roads");
    }

    #[test]
    fn test_header_pair_from_first_data_row() {
        let text = format!("{HEADER}3,5,a,b,1,0.2,0.3,0.4,0.5\n");
        let file = parse(&text);
        assert_eq!(file.header.from, "3");
        assert_eq!(file.header.to, "5");
    }

    #[test]
    fn test_header_pair_unknown_when_no_data() {
        let file = parse(HEADER);
        assert_eq!(file.header.from, "Desconocido");
        assert_eq!(file.header.to, "Desconocido");
        assert!(file.records.is_empty());
    }

    #[test]
    fn test_short_rows_dropped() {
        // E2E scenario C precondition: every row lacks the 9th column.
        let text = format!("{HEADER}1,2,a,b,1.0,0.5,0.3,0.4\n1,2,c,d,1.0,0.5,0.3,0.4\n");
        assert!(parse(&text).records.is_empty());
    }

    #[test]
    fn test_any_unparsable_statistic_drops_row() {
        let text = format!("{HEADER}1,2,a,b,1.0,oops,0.3,0.4,0.5\n1,2,c,d,1,0.5,0.3,0.4,0.5\n");
        let file = parse(&text);
        assert_eq!(file.records.len(), 1);
        assert_eq!(file.records[0].var_a, "c");
    }

    #[test]
    fn test_clean_variable_name_strips_known_prefixes() {
        assert_eq!(clean_variable_name("static_var/soil"), "soil");
        assert_eq!(clean_variable_name("distance/rivers"), "rivers");
        assert_eq!(clean_variable_name("elevation"), "elevation");
    }
}
