//! Circular correlation graph
//!
//! One graph per non-empty association category. Variables become nodes
//! placed evenly around a circle; each correlated pair becomes a curved edge
//! colored and weighted by its Cramer's V tier, labeled with the numeric
//! value at the curve's midpoint.

use crate::chart::{draw_error, render, ChartImage};
use crate::error::{ReportError, Result};
use crate::parser::correlation::CorrelationRecord;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;

const SIZE: u32 = 1200;
const NODE_RADIUS: i32 = 30;

/// Edge color tiers match the association thresholds.
pub fn edge_color(cramer_v: f64) -> RGBColor {
    if cramer_v >= 0.75 {
        RGBColor(0xE7, 0x4C, 0x3C)
    } else if cramer_v >= 0.5 {
        RGBColor(0xF3, 0x9C, 0x12)
    } else if cramer_v >= 0.25 {
        RGBColor(0x34, 0x98, 0xDB)
    } else {
        RGBColor(0xC2, 0xC2, 0xC2)
    }
}

pub fn edge_width(cramer_v: f64) -> u32 {
    if cramer_v >= 0.75 {
        4
    } else if cramer_v >= 0.5 {
        3
    } else if cramer_v >= 0.25 {
        2
    } else {
        1
    }
}

/// Quadratic Bézier from `a` to `b`, bowed 15% of the chord length along the
/// normal, sampled into a polyline.
fn curved_edge(a: (f64, f64), b: (f64, f64)) -> Vec<(i32, i32)> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let dist = (dx * dx + dy * dy).sqrt().max(1.0);
    let (mid_x, mid_y) = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    let offset = dist * 0.15;
    let control = (mid_x - dy / dist * offset, mid_y + dx / dist * offset);

    (0..=32)
        .map(|i| {
            let t = i as f64 / 32.0;
            let u = 1.0 - t;
            let x = u * u * a.0 + 2.0 * u * t * control.0 + t * t * b.0;
            let y = u * u * a.1 + 2.0 * u * t * control.1 + t * t * b.1;
            (x as i32, y as i32)
        })
        .collect()
}

pub fn correlation_graph(records: &[&CorrelationRecord]) -> Result<ChartImage> {
    if records.is_empty() {
        return Err(ReportError::Render("categoría sin pares".to_string()));
    }

    // Distinct variables in first-appearance order.
    let mut nodes: Vec<&str> = Vec::new();
    for record in records {
        for name in [record.var_a.as_str(), record.var_b.as_str()] {
            if !nodes.contains(&name) {
                nodes.push(name);
            }
        }
    }

    let center = (SIZE as f64 / 2.0, SIZE as f64 / 2.0);
    let radius = SIZE as f64 * 0.35;
    let angle_step = 2.0 * PI / nodes.len() as f64;
    let position = |name: &str| -> Option<(f64, f64)> {
        let index = nodes.iter().position(|n| *n == name)?;
        let angle = index as f64 * angle_step;
        Some((
            center.0 + radius * angle.cos(),
            center.1 + radius * angle.sin(),
        ))
    };

    render(SIZE, SIZE, |root| {
        let label_centered = TextStyle::from(("sans-serif", 22).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));

        // Edges first so nodes draw on top of them.
        for record in records {
            let (Some(start), Some(end)) =
                (position(&record.var_a), position(&record.var_b))
            else {
                continue;
            };
            let color = edge_color(record.cramer_v);
            let path = curved_edge(start, end);
            let peak = path[path.len() / 2];
            root.draw(&PathElement::new(
                path,
                color.mix(0.6).stroke_width(edge_width(record.cramer_v)),
            ))
            .map_err(draw_error)?;
            root.draw(&Text::new(
                format!("{:.2}", record.cramer_v),
                (peak.0, peak.1 - 26),
                TextStyle::from(("sans-serif", 20).into_font())
                    .color(&color)
                    .pos(Pos::new(HPos::Center, VPos::Bottom)),
            ))
            .map_err(draw_error)?;
        }

        for name in &nodes {
            let Some((x, y)) = position(name) else { continue };
            let (x, y) = (x as i32, y as i32);
            root.draw(&Circle::new((x, y), NODE_RADIUS + 5, WHITE.filled()))
                .map_err(draw_error)?;
            root.draw(&Circle::new(
                (x, y),
                NODE_RADIUS,
                RGBColor(0x4A, 0x90, 0xE2).filled(),
            ))
            .map_err(draw_error)?;
            root.draw(&Circle::new(
                (x, y),
                NODE_RADIUS,
                RGBColor(0x2C, 0x3E, 0x50).stroke_width(2),
            ))
            .map_err(draw_error)?;
            root.draw(&Text::new(
                name.to_string(),
                (x, y + NODE_RADIUS + 12),
                label_centered.clone(),
            ))
            .map_err(draw_error)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // EDGE TIER TESTS
    // ==========================================================================

    #[test]
    fn test_edge_tiers_match_association_thresholds() {
        assert_eq!(edge_color(0.8), RGBColor(0xE7, 0x4C, 0x3C));
        assert_eq!(edge_color(0.6), RGBColor(0xF3, 0x9C, 0x12));
        assert_eq!(edge_color(0.3), RGBColor(0x34, 0x98, 0xDB));
        assert_eq!(edge_color(0.1), RGBColor(0xC2, 0xC2, 0xC2));
        assert_eq!(edge_width(0.8), 4);
        assert_eq!(edge_width(0.6), 3);
        assert_eq!(edge_width(0.3), 2);
        assert_eq!(edge_width(0.1), 1);
    }

    #[test]
    fn test_curved_edge_endpoints() {
        let path = curved_edge((0.0, 0.0), (100.0, 0.0));
        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(100, 0)));
        // the bow pushes the midpoint off the chord
        assert!(path[16].1.abs() > 3);
    }

    #[test]
    fn test_empty_category_is_render_error() {
        assert!(matches!(
            correlation_graph(&[]),
            Err(ReportError::Render(_))
        ));
    }
}
