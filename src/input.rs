//! In-memory input files and stage selection
//!
//! The pipeline never touches the filesystem: callers hand it fully buffered
//! [`InputFile`]s and the stage they want. Which file feeds which parser is
//! decided purely by extension:
//!
//! | Extension        | Consumer          |
//! |------------------|-------------------|
//! | `.csv`           | transition / correlation parser |
//! | `.dcf`           | weights-of-evidence parser |
//! | `.xlsx`, `.xlsm` | dictionary loader |

use clap::ValueEnum;
use serde::Serialize;
use std::borrow::Cow;

/// One of the three supported report types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Area-transition rate matrix
    Transition,
    /// Weights of evidence (`.dcf`)
    Weights,
    /// Variable correlation statistics
    Correlation,
}

impl Stage {
    pub fn title(&self, stage_name: &str) -> String {
        match self {
            Stage::Transition => format!("Informe de Matriz de Transición - {stage_name}"),
            Stage::Weights => format!("Informe de Pesos de Evidencia - {stage_name}"),
            Stage::Correlation => {
                format!("Informe de Correlación de Variables - {stage_name}")
            }
        }
    }
}

/// A fully buffered input file. Only the name (for extension dispatch) and
/// the bytes matter; there is no path and nothing is re-read.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, text.as_bytes().to_vec())
    }

    /// Lowercased extension, without the dot.
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }

    /// Contents as text. Inputs are expected to be UTF-8; stray bytes are
    /// replaced rather than failing the whole file.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// First file whose extension matches any of `exts` (no dots, lowercase).
pub fn find_by_extension<'a>(files: &'a [InputFile], exts: &[&str]) -> Option<&'a InputFile> {
    files.iter().find(|f| {
        let ext = f.extension();
        exts.iter().any(|e| *e == ext)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        let f = InputFile::new("Matriz.CSV", vec![]);
        assert_eq!(f.extension(), "csv");
    }

    #[test]
    fn test_extension_missing() {
        let f = InputFile::new("README", vec![]);
        assert_eq!(f.extension(), "");
    }

    #[test]
    fn test_find_by_extension_picks_first_match() {
        let files = vec![
            InputFile::new("dict.xlsx", vec![]),
            InputFile::new("a.csv", vec![]),
            InputFile::new("b.csv", vec![]),
        ];
        let found = find_by_extension(&files, &["csv"]).unwrap();
        assert_eq!(found.name, "a.csv");
    }

    #[test]
    fn test_find_by_extension_multiple_candidates() {
        let files = vec![InputFile::new("macro.xlsm", vec![])];
        assert!(find_by_extension(&files, &["xlsx", "xlsm"]).is_some());
        assert!(find_by_extension(&files, &["dcf"]).is_none());
    }

    #[test]
    fn test_stage_titles() {
        assert_eq!(
            Stage::Transition.title("Etapa 1"),
            "Informe de Matriz de Transición - Etapa 1"
        );
        assert_eq!(
            Stage::Weights.title("E2"),
            "Informe de Pesos de Evidencia - E2"
        );
        assert_eq!(
            Stage::Correlation.title("E3"),
            "Informe de Correlación de Variables - E3"
        );
    }

    #[test]
    fn test_text_replaces_invalid_utf8() {
        let f = InputFile::new("x.csv", vec![b'a', 0xFF, b'b']);
        assert_eq!(f.text(), "a\u{FFFD}b");
    }
}
