//! Informe - Reportes PDF de cambio de uso de suelo
//!
//! Informe turns the raw exports of a land-use-change modelling run into
//! self-contained Spanish PDF reports. It covers three stages of the
//! workflow, each fed by its own file formats:
//!
//! | Stage | Inputs | Report |
//! |-------|--------|--------|
//! | `transition` | transition matrix `.csv` + dictionary `.xlsx` | narrative of area changes, bar charts, general pie chart |
//! | `weights` | weights-of-evidence `.dcf` + dictionary `.xlsx` | per-transition range tables, step charts, written summaries |
//! | `correlation` | correlation statistics `.csv` | statistics table, grouped association analysis, correlation graphs |
//!
//! # Quick Start
//!
//! ```no_run
//! use informe::{generate, InputFile, NullSink, Stage};
//!
//! let files = vec![InputFile::new(
//!     "matriz.csv",
//!     std::fs::read("matriz.csv").unwrap(),
//! )];
//! let pdf = generate(Stage::Transition, &files, "Etapa 1", &mut NullSink).unwrap();
//! std::fs::write("informe.pdf", pdf).unwrap();
//! ```
//!
//! # Determinism
//!
//! The same inputs always produce the same narrative text, the same chart
//! geometry and the same page breaks. Charts render in parallel but the
//! document consumes them in source order.
//!
//! # Modules
//!
//! - [`parser`]: CSV matrix, `.dcf` weights and correlation CSV readers
//! - [`classify`]: semantic bands for weights and Cramer's V
//! - [`narrative`]: deterministic Spanish summary text
//! - [`chart`]: raster chart rendering (bar, pie, step, graph)
//! - [`pdf`]: paginated A4 document builder
//! - [`report`]: the per-stage pipelines tying it all together

pub mod chart;
pub mod classify;
pub mod dictionary;
pub mod error;
pub mod input;
pub mod narrative;
pub mod parser;
pub mod pdf;
pub mod progress;
pub mod report;

pub use dictionary::Dictionary;
pub use error::{ReportError, Result};
pub use input::{InputFile, Stage};
pub use progress::{NullSink, ProgressSink};
pub use report::{generate, records_json};

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is correct and documented.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        // Core types are re-exported from the crate root
        let _: Stage = Stage::Transition;
        let _dict = Dictionary::new();
        let _file = InputFile::new("a.csv", vec![]);
    }

    #[test]
    fn test_stage_variants() {
        let _ = Stage::Transition;
        let _ = Stage::Weights;
        let _ = Stage::Correlation;
    }

    #[test]
    fn test_null_sink_usable_as_dyn() {
        let sink: &mut dyn ProgressSink = &mut NullSink;
        sink.report(50);
    }
}
