//! Chart rendering to in-memory bitmaps
//!
//! Every chart draws with plotters into an RGB8 buffer that the document
//! builder later embeds as a PDF image XObject. Charts are independent units
//! of work: the pipelines render them in parallel with rayon and consume them
//! in source order.
//!
//! A failure inside one chart (missing fonts, malformed data point) surfaces
//! as [`ReportError::Render`] and is handled per chart by the caller: the
//! chart is skipped with a warning, never aborting the document.

pub mod graph;
pub mod transition;
pub mod weights;

use crate::error::{ReportError, Result};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::error::Error;

/// A rendered chart: tightly packed RGB8 pixels, row-major.
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl ChartImage {
    /// Width/height ratio, for aspect-preserving placement.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Run `draw` against a fresh white canvas of the given size and hand back
/// the finished pixels.
pub(crate) fn render<F>(width: u32, height: u32, draw: F) -> Result<ChartImage>
where
    F: FnOnce(&DrawingArea<BitMapBackend, plotters::coord::Shift>) -> Result<()>,
{
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        draw(&root)?;
        root.present().map_err(draw_error)?;
    }
    Ok(ChartImage {
        width,
        height,
        rgb: buffer,
    })
}

pub(crate) fn draw_error<E: Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> ReportError {
    ReportError::Render(err.to_string())
}

/// Evenly hue-stepped palette, `hsl(i * 360/n, 70%, 60%)`, used by the pie
/// chart so adjacent slices stay distinguishable.
pub fn distinct_colors(count: usize) -> Vec<RGBColor> {
    (0..count)
        .map(|i| hsl_to_rgb(i as f64 * 360.0 / count.max(1) as f64, 0.7, 0.6))
        .collect()
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> RGBColor {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = (hue % 360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    RGBColor(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Draw a dashed straight line as alternating 6px-on / 6px-off segments.
/// Plotters has no dashed stroke on plain paths, so the gaps are explicit.
pub(crate) fn dashed_line(
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    from: (i32, i32),
    to: (i32, i32),
    style: ShapeStyle,
) -> Result<()> {
    let (dx, dy) = ((to.0 - from.0) as f64, (to.1 - from.1) as f64);
    let length = (dx * dx + dy * dy).sqrt();
    if length < 1.0 {
        return Ok(());
    }
    let dash = 6.0;
    let steps = (length / dash) as i32;
    let (ux, uy) = (dx / length, dy / length);
    for i in (0..=steps).step_by(2) {
        let d0 = dash * i as f64;
        let d1 = (dash * (i + 1) as f64).min(length);
        let start = (from.0 + (ux * d0) as i32, from.1 + (uy * d0) as i32);
        let stop = (from.0 + (ux * d1) as i32, from.1 + (uy * d1) as i32);
        root.draw(&PathElement::new(vec![start, stop], style))
            .map_err(draw_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_colors_length_and_spread() {
        let colors = distinct_colors(4);
        assert_eq!(colors.len(), 4);
        // 0° and 180° hues must differ clearly
        assert_ne!(colors[0], colors[2]);
    }

    #[test]
    fn test_hsl_primary_hues() {
        // hsl(0, 70%, 60%) is a red-dominant tone
        let red = hsl_to_rgb(0.0, 0.7, 0.6);
        assert!(red.0 > red.1 && red.0 > red.2);
        let green = hsl_to_rgb(120.0, 0.7, 0.6);
        assert!(green.1 > green.0 && green.1 > green.2);
    }

    #[test]
    fn test_render_produces_white_canvas() {
        let img = render(8, 4, |_| Ok(())).unwrap();
        assert_eq!(img.rgb.len(), 8 * 4 * 3);
        assert!(img.rgb.iter().all(|&b| b == 255));
        assert_eq!(img.aspect(), 2.0);
    }
}
