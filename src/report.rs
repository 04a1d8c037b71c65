//! Per-stage report pipelines
//!
//! One entry point, [`generate`], that dispatches on the selected stage:
//! find the stage's input files by extension, parse, classify, render charts
//! (in parallel, consumed in source order), and lay the document out page by
//! page. Progress checkpoints mirror the historical reports; the sink sees a
//! monotone sequence ending in exactly one 100 on success.
//!
//! Chart failures are contained here: a chart that cannot render is logged
//! and skipped (the correlation layout even prints a small error note in its
//! place), the document always completes.

use crate::chart::{self, ChartImage};
use crate::classify::{general_distribution, group_by_association};
use crate::dictionary::Dictionary;
use crate::error::{ReportError, Result};
use crate::input::{find_by_extension, InputFile, Stage};
use crate::narrative;
use crate::parser::{correlation, transition, weights};
use crate::pdf::table::{HeaderCell, Table, TableStyle};
use crate::pdf::{Align, DocumentBuilder, FontStyle, BLACK, PAGE_HEIGHT, PAGE_WIDTH, TITLE_GREY};
use crate::progress::{Monotone, ProgressSink};
use rayon::prelude::*;

/// Generate the selected stage's report over in-memory input files, writing
/// progress to `sink`. Returns the finished PDF bytes.
pub fn generate(
    stage: Stage,
    files: &[InputFile],
    stage_name: &str,
    sink: &mut dyn ProgressSink,
) -> Result<Vec<u8>> {
    let mut progress = Monotone::new(sink);
    progress.report(5);

    let bytes = match stage {
        Stage::Transition => {
            let dictionary = load_dictionary(files, &mut progress, 15);
            let csv = find_by_extension(files, &["csv"])
                .ok_or(ReportError::MissingInput { expected: ".csv" })?;
            transition_report(&dictionary, &csv.text(), stage_name, &mut progress)?
        }
        Stage::Weights => {
            let dictionary = load_dictionary(files, &mut progress, 20);
            let dcf = find_by_extension(files, &["dcf"])
                .ok_or(ReportError::MissingInput { expected: ".dcf" })?;
            weights_report(&dictionary, &dcf.text(), stage_name, &mut progress)?
        }
        Stage::Correlation => {
            let csv = find_by_extension(files, &["csv"])
                .ok_or(ReportError::MissingInput { expected: ".csv" })?;
            correlation_report(&csv.text(), stage_name, &mut progress)?
        }
    };

    progress.report(100);
    Ok(bytes)
}

/// Parsed records as JSON, for machine-readable dumps next to the PDF.
pub fn records_json(stage: Stage, files: &[InputFile]) -> Result<String> {
    let json = match stage {
        Stage::Transition => {
            let dictionary = dictionary_from_files(files);
            let csv = find_by_extension(files, &["csv"])
                .ok_or(ReportError::MissingInput { expected: ".csv" })?;
            let outcome = transition::parse(&csv.text(), &dictionary);
            serde_json::to_string_pretty(&outcome.areas)
        }
        Stage::Weights => {
            let dictionary = dictionary_from_files(files);
            let dcf = find_by_extension(files, &["dcf"])
                .ok_or(ReportError::MissingInput { expected: ".dcf" })?;
            serde_json::to_string_pretty(&weights::parse(&dcf.text(), &dictionary))
        }
        Stage::Correlation => {
            let csv = find_by_extension(files, &["csv"])
                .ok_or(ReportError::MissingInput { expected: ".csv" })?;
            let file = correlation::parse(&csv.text());
            serde_json::to_string_pretty(&file.records)
        }
    };
    json.map_err(|err| ReportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

fn dictionary_from_files(files: &[InputFile]) -> Dictionary {
    match find_by_extension(files, &["xlsx", "xlsm"]) {
        Some(file) => Dictionary::from_xlsx(&file.bytes),
        None => Dictionary::new(),
    }
}

fn load_dictionary(files: &[InputFile], progress: &mut Monotone, checkpoint: u8) -> Dictionary {
    let dictionary = dictionary_from_files(files);
    if dictionary.is_empty() {
        log::warn!("sin diccionario: los códigos se mostrarán como 'ID <código>'");
    }
    progress.report(checkpoint);
    dictionary
}

// ==========================================================================
// Transition matrix stage
// ==========================================================================

pub fn transition_report(
    dictionary: &Dictionary,
    csv_text: &str,
    stage_name: &str,
    progress: &mut Monotone,
) -> Result<Vec<u8>> {
    let outcome = transition::parse(csv_text, dictionary);
    if outcome.warnings > 0 {
        log::warn!("{} filas descartadas en la matriz de transición", outcome.warnings);
    }
    progress.report(35);

    let mut doc = DocumentBuilder::new();
    doc.centered(
        20.0,
        16.0,
        FontStyle::Regular,
        TITLE_GREY,
        &Stage::Transition.title(stage_name),
    );
    doc.set_cursor(40.0);

    // Narrative section: one block per area, reserved as a unit.
    let line_height = 10.0;
    let wrap_width = 180.0;
    let total_areas = outcome.areas.len();
    for (index, area) in outcome.areas.iter().enumerate() {
        let mut needed = line_height * 3.0;
        for change in &area.changes {
            let line = narrative::change_line(&change.to_label, change.rate);
            needed += doc.paragraph_height(&line, 12.0, wrap_width, line_height) + line_height / 8.0;
        }
        if doc.cursor() + needed > PAGE_HEIGHT - 20.0 {
            doc.new_page(20.0)?;
        }

        doc.text_at(
            20.0,
            doc.cursor(),
            14.0,
            FontStyle::Regular,
            BLACK,
            Align::Left,
            &narrative::area_heading(area),
        );
        doc.advance(line_height * 1.5);
        for change in &area.changes {
            let line = narrative::change_line(&change.to_label, change.rate);
            doc.paragraph(&line, 30.0, wrap_width, 12.0, line_height)?;
            doc.advance(line_height / 8.0);
        }
        doc.advance(line_height * 1.5);
        progress.report_span(35, 50, index + 1, total_areas);
    }

    doc.new_page(40.0)?;
    progress.report(50);

    // Charts render in parallel; the document consumes them in area order.
    let bar_charts: Vec<Option<ChartImage>> = outcome
        .areas
        .par_iter()
        .map(|area| skip_failed(chart::transition::bar_chart(area)))
        .collect();
    let distribution = general_distribution(&outcome.areas);
    let pie = skip_failed(chart::transition::pie_chart(&distribution));
    let chart_total = bar_charts.len() + 1;

    doc.centered(
        30.0,
        16.0,
        FontStyle::Regular,
        TITLE_GREY,
        "Gráficos individuales de  Matriz de Transición",
    );
    for (index, bar) in bar_charts.iter().enumerate() {
        if index > 0 {
            doc.new_page(40.0)?;
        }
        doc.set_cursor(40.0);
        if let Some(image) = bar {
            doc.image_centered(image, PAGE_WIDTH - 20.0, PAGE_HEIGHT - 60.0);
        }
        progress.report_span(50, 90, index + 1, chart_total);
    }

    doc.new_page(40.0)?;
    doc.centered(
        30.0,
        16.0,
        FontStyle::Regular,
        TITLE_GREY,
        "Gráfico General de Matriz de Transición",
    );
    if let Some(image) = &pie {
        doc.image_centered(image, PAGE_WIDTH - 40.0, PAGE_HEIGHT - 60.0);
    }

    progress.report(95);
    doc.finish()
}

// ==========================================================================
// Weights of evidence stage
// ==========================================================================

pub fn weights_report(
    dictionary: &Dictionary,
    dcf_text: &str,
    stage_name: &str,
    progress: &mut Monotone,
) -> Result<Vec<u8>> {
    progress.report(40);
    let tables = weights::parse(dcf_text, dictionary);
    progress.report(60);

    let step_charts: Vec<Option<ChartImage>> = tables
        .par_iter()
        .map(|table| skip_failed(chart::weights::step_chart(table)))
        .collect();

    let mut doc = DocumentBuilder::new();
    doc.centered(
        15.0,
        16.0,
        FontStyle::Regular,
        BLACK,
        &Stage::Weights.title(stage_name),
    );

    let total = tables.len();
    for (index, (table, step)) in tables.iter().zip(&step_charts).enumerate() {
        if index > 0 {
            doc.new_page(30.0)?;
        } else {
            doc.set_cursor(30.0);
        }

        doc.text_at(
            14.0,
            doc.cursor(),
            14.0,
            FontStyle::Regular,
            BLACK,
            Align::Left,
            &table.title,
        );
        doc.advance(10.0);
        doc.text_at(
            14.0,
            doc.cursor(),
            12.0,
            FontStyle::Regular,
            BLACK,
            Align::Left,
            &table.parameter,
        );
        doc.advance(10.0);

        Table {
            headers: vec![vec![HeaderCell::new("Rangos"), HeaderCell::new("Pesos")]],
            body: table
                .rows
                .iter()
                .map(|row| vec![row.range.clone(), row.weight.to_string()])
                .collect(),
            column_widths: vec![40.0, 40.0],
            style: TableStyle::default(),
        }
        .draw(&mut doc)?;

        // The chart block is 100mm tall plus a gap; break first if it cannot fit.
        if PAGE_HEIGHT - doc.cursor() < 110.0 {
            doc.new_page(30.0)?;
        }
        if let Some(image) = step {
            doc.image_at(image, 14.0, doc.cursor(), 180.0, 100.0);
        }
        doc.advance(110.0);

        let summary = narrative::weights_summary(table);
        let summary_height = doc.paragraph_height(&summary, 9.0, 180.0, 5.0);
        if PAGE_HEIGHT - doc.cursor() < summary_height + 20.0 {
            doc.new_page(30.0)?;
        }
        doc.text_at(
            14.0,
            doc.cursor(),
            14.0,
            FontStyle::Regular,
            BLACK,
            Align::Left,
            "Resumen",
        );
        doc.advance(10.0);
        doc.paragraph(&summary, 14.0, 180.0, 9.0, 5.0)?;

        progress.report_span(60, 95, index + 1, total);
    }

    progress.report(95);
    doc.finish()
}

// ==========================================================================
// Correlation stage
// ==========================================================================

pub fn correlation_report(
    csv_text: &str,
    stage_name: &str,
    progress: &mut Monotone,
) -> Result<Vec<u8>> {
    let file = correlation::parse(csv_text);
    if file.records.is_empty() {
        return Err(ReportError::EmptyResult(
            "No se pudieron procesar datos válidos del CSV".to_string(),
        ));
    }
    progress.report(30);

    let mut doc = DocumentBuilder::new();
    doc.centered(
        20.0,
        18.0,
        FontStyle::Regular,
        BLACK,
        &Stage::Correlation.title(stage_name),
    );
    doc.text_at(
        14.0,
        35.0,
        14.0,
        FontStyle::Regular,
        BLACK,
        Align::Left,
        &format!("Transición {} -> {}", file.header.from, file.header.to),
    );
    doc.set_cursor(40.0);

    Table {
        headers: vec![
            vec![
                HeaderCell::spanning("Variables", 2),
                HeaderCell::spanning("Cramer", 3),
                HeaderCell::spanning("Entropía", 2),
            ],
            vec![
                HeaderCell::new("Primera Variable"),
                HeaderCell::new("Segunda Variable"),
                HeaderCell::new("Chi²"),
                HeaderCell::new("Cramer"),
                HeaderCell::new("Contingencia"),
                HeaderCell::new("Entropía Conjunta"),
                HeaderCell::new("Incertidumbre Conjunta"),
            ],
        ],
        body: file
            .records
            .iter()
            .map(|r| {
                vec![
                    r.var_a.clone(),
                    r.var_b.clone(),
                    format!("{:.6}", r.chi_square),
                    format!("{:.6}", r.cramer_v),
                    format!("{:.6}", r.contingency),
                    format!("{:.6}", r.joint_entropy),
                    format!("{:.6}", r.joint_uncertainty),
                ]
            })
            .collect(),
        column_widths: vec![35.0, 35.0, 23.0, 23.0, 23.0, 23.0, 23.0],
        style: TableStyle {
            left: 15.0,
            font_size: 7.0,
            ..TableStyle::default()
        },
    }
    .draw(&mut doc)?;
    progress.report(50);

    let groups = group_by_association(&file.records);
    let non_empty: Vec<_> = groups
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .collect();

    let graphs: Vec<Option<ChartImage>> = non_empty
        .par_iter()
        .map(|(_, members)| skip_failed(chart::graph::correlation_graph(members)))
        .collect();

    doc.new_page(20.0)?;
    doc.centered(
        20.0,
        16.0,
        FontStyle::Bold,
        BLACK,
        "Análisis de Correlación",
    );
    doc.set_cursor(35.0);

    let line_height = 5.0;
    let total = non_empty.len();
    for (index, ((category, members), graph)) in non_empty.iter().zip(&graphs).enumerate() {
        if index > 0 {
            doc.new_page(20.0)?;
        }

        doc.text_at(
            14.0,
            doc.cursor(),
            12.0,
            FontStyle::Bold,
            BLACK,
            Align::Left,
            narrative::association_title(*category),
        );
        doc.advance(line_height * 1.2);

        for member in members {
            doc.ensure_space(line_height)?;
            doc.text_at(
                20.0,
                doc.cursor(),
                9.0,
                FontStyle::Regular,
                BLACK,
                Align::Left,
                &format!("• {}", member.pair()),
            );
            doc.text_at(
                PAGE_WIDTH - 24.0,
                doc.cursor(),
                9.0,
                FontStyle::Regular,
                BLACK,
                Align::Right,
                &format!("Índice de Cramer: {:.4}", member.cramer_v),
            );
            doc.advance(line_height);
        }
        doc.advance(line_height);

        doc.paragraph(
            narrative::association_description(*category),
            20.0,
            164.0,
            10.0,
            line_height,
        )?;
        doc.advance(line_height * 2.0);

        doc.ensure_space(280.0)?;
        doc.centered(
            doc.cursor(),
            11.0,
            FontStyle::Bold,
            BLACK,
            &narrative::graph_title(*category),
        );
        doc.advance(10.0);
        match graph {
            Some(image) => {
                doc.image_at(image, 14.0, doc.cursor(), PAGE_WIDTH - 28.0, 250.0);
                doc.advance(260.0);
            }
            None => {
                doc.text_at(
                    14.0,
                    doc.cursor() + 10.0,
                    8.0,
                    FontStyle::Regular,
                    (255, 0, 0),
                    Align::Left,
                    "Error al generar el gráfico para esta categoría.",
                );
                doc.advance(20.0);
            }
        }
        progress.report_span(50, 95, index + 1, total);
    }

    progress.report(95);
    doc.finish()
}

fn skip_failed(result: Result<ChartImage>) -> Option<ChartImage> {
    match result {
        Ok(image) => Some(image),
        Err(err) => {
            log::warn!("gráfico omitido: {err}");
            None
        }
    }
}
