//! Error taxonomy for report generation
//!
//! Two tiers, mirroring how the pipeline recovers:
//!
//! - **Fatal** ([`ReportError`]): a required input file is missing, or nothing
//!   usable survived filtering. The run aborts before an artifact exists and
//!   the progress sink never reaches 100.
//! - **Row-level**: a single malformed line or an unresolvable code. These are
//!   logged with `log::warn!`, counted, and the row is dropped. They never
//!   surface as `Err`.
//!
//! Chart-level draw failures are wrapped in [`ReportError::Render`] by the
//! chart module, but the pipelines catch them per chart: the failing chart is
//! skipped and the document continues.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// No input file of the required type/extension was supplied.
    #[error("no se encontró un archivo {expected} entre los archivos de entrada")]
    MissingInput { expected: &'static str },

    /// Inputs were present but zero usable records survived filtering.
    #[error("{0}")]
    EmptyResult(String),

    /// A single chart failed to draw. Recoverable at the document level.
    #[error("error al generar el gráfico: {0}")]
    Render(String),

    #[error("error al componer el PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_message_names_extension() {
        let err = ReportError::MissingInput { expected: ".dcf" };
        assert!(err.to_string().contains(".dcf"));
    }

    #[test]
    fn test_empty_result_passes_message_through() {
        let err = ReportError::EmptyResult("sin datos válidos".to_string());
        assert_eq!(err.to_string(), "sin datos válidos");
    }
}
