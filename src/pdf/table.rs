//! Striped data tables
//!
//! Covers what the reports need from a table: fixed column widths, one or
//! two header rows with column spans, a filled header band with light text,
//! alternating row fills, and page breaks that repeat the header on the next
//! page.

use crate::error::Result;
use crate::pdf::{font, Align, Color, DocumentBuilder, FontStyle, BLACK, BOTTOM_MARGIN, PAGE_HEIGHT, TOP_MARGIN};

const MM_PER_PT: f64 = 25.4 / 72.0;

/// A header cell spanning one or more body columns.
#[derive(Debug, Clone)]
pub struct HeaderCell {
    pub text: String,
    pub span: usize,
}

impl HeaderCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            span: 1,
        }
    }

    pub fn spanning(text: impl Into<String>, span: usize) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableStyle {
    pub left: f64,
    pub font_size: f64,
    pub cell_padding: f64,
    pub header_fill: Color,
    pub header_text: Color,
    pub stripe_fill: Color,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            left: 14.0,
            font_size: 8.0,
            cell_padding: 1.5,
            header_fill: (41, 128, 185),
            header_text: (255, 255, 255),
            stripe_fill: (240, 240, 240),
        }
    }
}

impl TableStyle {
    fn row_height(&self, lines: usize) -> f64 {
        let line = self.font_size * MM_PER_PT * 1.15;
        lines as f64 * line + 2.0 * self.cell_padding
    }

    fn line_height(&self) -> f64 {
        self.font_size * MM_PER_PT * 1.15
    }
}

pub struct Table {
    pub headers: Vec<Vec<HeaderCell>>,
    pub body: Vec<Vec<String>>,
    pub column_widths: Vec<f64>,
    pub style: TableStyle,
}

impl Table {
    /// Lines each cell of `row` needs at the table's font size.
    fn body_row_lines(&self, row: &[String]) -> usize {
        row.iter()
            .zip(&self.column_widths)
            .map(|(cell, width)| {
                font::wrap(cell, self.style.font_size, width - 2.0 * self.style.cell_padding).len()
            })
            .max()
            .unwrap_or(1)
    }

    fn draw_header(&self, builder: &mut DocumentBuilder) {
        let style = &self.style;
        for header_row in &self.headers {
            let height = style.row_height(1);
            let mut x = style.left;
            let mut column = 0usize;
            for cell in header_row {
                let span_width: f64 = self
                    .column_widths
                    .iter()
                    .skip(column)
                    .take(cell.span)
                    .sum();
                builder.rect(x, builder.cursor(), span_width, height, style.header_fill);
                builder.text_at(
                    x + span_width / 2.0,
                    builder.cursor() + style.cell_padding + style.line_height() * 0.85,
                    style.font_size,
                    FontStyle::Bold,
                    style.header_text,
                    Align::Center,
                    &cell.text,
                );
                x += span_width;
                column += cell.span;
            }
            builder.advance(height);
        }
    }

    /// Draw the full table from the builder's cursor, breaking pages between
    /// rows and repeating the header band after each break.
    pub fn draw(&self, builder: &mut DocumentBuilder) -> Result<()> {
        let style = &self.style;
        let header_height = self.headers.len() as f64 * style.row_height(1);

        if builder.cursor() + header_height + style.row_height(1) > PAGE_HEIGHT - BOTTOM_MARGIN {
            builder.new_page(TOP_MARGIN)?;
        }
        self.draw_header(builder);

        for (index, row) in self.body.iter().enumerate() {
            let lines = self.body_row_lines(row);
            let height = style.row_height(lines);
            if builder.cursor() + height > PAGE_HEIGHT - BOTTOM_MARGIN {
                builder.new_page(TOP_MARGIN)?;
                self.draw_header(builder);
            }

            let total_width: f64 = self.column_widths.iter().sum();
            if index % 2 == 1 {
                builder.rect(
                    style.left,
                    builder.cursor(),
                    total_width,
                    height,
                    style.stripe_fill,
                );
            }

            let mut x = style.left;
            for (cell, width) in row.iter().zip(&self.column_widths) {
                let wrapped =
                    font::wrap(cell, style.font_size, width - 2.0 * style.cell_padding);
                for (line_index, line) in wrapped.iter().enumerate() {
                    builder.text_at(
                        x + style.cell_padding,
                        builder.cursor()
                            + style.cell_padding
                            + style.line_height() * (0.85 + line_index as f64),
                        style.font_size,
                        FontStyle::Regular,
                        BLACK,
                        Align::Left,
                        line,
                    );
                }
                x += width;
            }
            builder.advance(height);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_table(rows: usize) -> Table {
        Table {
            headers: vec![vec![HeaderCell::new("Rangos"), HeaderCell::new("Pesos")]],
            body: (0..rows)
                .map(|i| vec![format!("{i}:{}", i + 10), format!("{}.5", i)])
                .collect(),
            column_widths: vec![40.0, 40.0],
            style: TableStyle::default(),
        }
    }

    #[test]
    fn test_table_draws_without_breaking_on_short_body() {
        let mut builder = DocumentBuilder::new();
        two_column_table(5).draw(&mut builder).unwrap();
        assert_eq!(builder.page_count(), 1);
        assert!(builder.cursor() > TOP_MARGIN);
    }

    #[test]
    fn test_long_table_breaks_pages() {
        let mut builder = DocumentBuilder::new();
        two_column_table(200).draw(&mut builder).unwrap();
        assert!(builder.page_count() > 1);
    }

    #[test]
    fn test_row_height_includes_padding() {
        let style = TableStyle::default();
        let one = style.row_height(1);
        let two = style.row_height(2);
        assert!(two > one);
        assert!((two - one - style.line_height()).abs() < 1e-9);
    }
}
