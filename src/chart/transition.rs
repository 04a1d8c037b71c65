//! Transition stage charts: per-area bars and the general pie
//!
//! The bar chart plots the destinations of one area against their percentage
//! rates; its width grows with the number of bars so labels stay readable.
//! The pie chart shows the general distribution across areas with an evenly
//! hue-stepped palette and a right-hand legend.

use crate::chart::{distinct_colors, draw_error, render, ChartImage};
use crate::classify::DistributionEntry;
use crate::error::{ReportError, Result};
use crate::parser::transition::AreaChangeSet;
use plotters::prelude::*;
use std::f64::consts::PI;

/// Bar fill matching the original report's palette.
const BAR_COLOR: RGBColor = RGBColor(54, 162, 235);

/// Base canvas 400x300, widened by 60 per destination, rendered at 2x.
pub fn bar_chart(area: &AreaChangeSet) -> Result<ChartImage> {
    if area.changes.is_empty() {
        return Err(ReportError::Render(format!(
            "área '{}' sin cambios que graficar",
            area.area_label
        )));
    }
    let n = area.changes.len();
    let width = (400.max(n * 60) * 2) as u32;
    let height = 600u32;

    let labels: Vec<String> = area.changes.iter().map(|c| c.to_label.clone()).collect();
    let values: Vec<f64> = area.changes.iter().map(|c| c.rate * 100.0).collect();
    let y_max = values.iter().cloned().fold(f64::MIN, f64::max) * 1.1;

    render(width, height, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(
                format!("Cambios desde {}", area.area_label),
                ("sans-serif", 32),
            )
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(90)
            .build_cartesian_2d((0..n).into_segmented(), 0.0..y_max.max(1e-9))
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|segment| match segment {
                SegmentValue::CenterOf(i) if *i < labels.len() => labels[*i].clone(),
                _ => String::new(),
            })
            .y_label_formatter(&|v| format!("{v:.0}%"))
            .label_style(("sans-serif", 18))
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series(values.iter().enumerate().map(|(i, &value)| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), value),
                    ],
                    BAR_COLOR.mix(0.8).filled(),
                )
            }))
            .map_err(draw_error)?;
        Ok(())
    })
}

/// General distribution pie, 800x800, with the legend listing each slice as
/// `"<area> (<share>%)"`.
pub fn pie_chart(distribution: &[DistributionEntry]) -> Result<ChartImage> {
    if distribution.is_empty() {
        return Err(ReportError::Render(
            "distribución general vacía".to_string(),
        ));
    }
    let colors = distinct_colors(distribution.len());
    let (width, height) = (800u32, 800u32);
    let center = (300i32, 400i32);
    let radius = 240.0f64;

    render(width, height, |root| {
        let mut angle = -PI / 2.0;
        for (entry, color) in distribution.iter().zip(&colors) {
            let sweep = entry.share_percent / 100.0 * 2.0 * PI;
            let mut points = vec![center];
            let steps = ((sweep / (2.0 * PI) * 64.0).ceil() as usize).max(2);
            for step in 0..=steps {
                let a = angle + sweep * step as f64 / steps as f64;
                points.push((
                    center.0 + (radius * a.cos()) as i32,
                    center.1 + (radius * a.sin()) as i32,
                ));
            }
            root.draw(&Polygon::new(points.clone(), color.filled()))
                .map_err(draw_error)?;
            points.push(center);
            root.draw(&PathElement::new(points, WHITE.stroke_width(2)))
                .map_err(draw_error)?;
            angle += sweep;
        }

        // Legend, right of the pie.
        let legend_x = 570i32;
        let mut legend_y = 400 - (distribution.len() as i32 * 26) / 2;
        for (entry, color) in distribution.iter().zip(&colors) {
            root.draw(&Rectangle::new(
                [(legend_x, legend_y), (legend_x + 16, legend_y + 16)],
                color.filled(),
            ))
            .map_err(draw_error)?;
            root.draw(&Text::new(
                format!("{} ({:.2}%)", entry.area_label, entry.share_percent),
                (legend_x + 24, legend_y + 2),
                ("sans-serif", 18),
            ))
            .map_err(draw_error)?;
            legend_y += 26;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::transition::AreaChange;

    #[test]
    fn test_bar_chart_rejects_empty_area() {
        let area = AreaChangeSet {
            area_label: "Bosque".into(),
            changes: vec![],
        };
        assert!(matches!(bar_chart(&area), Err(ReportError::Render(_))));
    }

    #[test]
    fn test_pie_chart_rejects_empty_distribution() {
        assert!(matches!(pie_chart(&[]), Err(ReportError::Render(_))));
    }

    #[test]
    fn test_bar_chart_width_grows_with_destinations() {
        // 10 destinations -> 600 base -> 1200px; 2 destinations stay at 800px.
        let wide = AreaChangeSet {
            area_label: "A".into(),
            changes: (0..10)
                .map(|i| AreaChange {
                    to_label: format!("d{i}"),
                    rate: 0.1,
                })
                .collect(),
        };
        if let Ok(img) = bar_chart(&wide) {
            assert_eq!(img.width, 1200);
            assert_eq!(img.height, 600);
        }
    }
}
