//! Weights-of-evidence step chart
//!
//! One chart per weight table: each (range, weight) row becomes a horizontal
//! segment from range start to range end at the weight's height, with a point
//! at the segment start and a dashed connector down/up to the next segment.
//! Colors follow the effect classification (green favors, orange neutral,
//! red opposes), with dashed grey reference lines at y = ±1.
//!
//! The x axis is log10-scaled above a data-dependent threshold; values at or
//! below the threshold are pinned to the axis origin. The threshold tiers and
//! the tick choices are deliberate visual-scaling constants carried over from
//! the historical reports - do not re-derive them.

use crate::chart::{dashed_line, draw_error, render, ChartImage};
use crate::classify::{classify_effect, EffectCategory};
use crate::error::{ReportError, Result};
use crate::parser::weights::WeightTable;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const WIDTH: u32 = 1080; // 180mm at 6 px/mm
const HEIGHT: u32 = 600; // 100mm
const MARGIN_LEFT: i32 = 240;
const MARGIN_RIGHT: i32 = 60;
const MARGIN_TOP: i32 = 60;
const MARGIN_BOTTOM: i32 = 120;

/// Threshold below which x values collapse to the axis origin. Tiered by the
/// data's value range; very large ranges derive it from the range magnitude.
pub fn min_x_threshold(min: f64, max: f64) -> f64 {
    let range = max - min;
    if range > 100.0 && range <= 200.0 && min == 0.0 {
        return 1.0;
    }
    if max <= 20.0 {
        return 0.7;
    }
    if max <= 100.0 {
        return 5.0;
    }
    if max <= 10000.0 {
        return 50.0;
    }
    10f64.powi((range / 100.0).log10().floor() as i32)
}

/// Tick positions along the x axis, tiered by range width. Negative ticks are
/// dropped (ranges are distances or class areas, never negative).
pub fn x_ticks(min: f64, max: f64) -> Vec<f64> {
    let range = max - min;
    let ticks = if range > 10000.0 {
        vec![min, 1000.0, 10000.0, max]
    } else if range > 1000.0 {
        vec![min, (range / 4.0).round(), (range / 2.0).round(), max]
    } else if range > 100.0 {
        vec![min, (range / 2.0).round(), max]
    } else {
        vec![min, max]
    };
    ticks.into_iter().filter(|t| *t >= 0.0).collect()
}

fn effect_color(category: EffectCategory) -> RGBColor {
    match category {
        EffectCategory::Favors => RGBColor(0, 255, 0),
        EffectCategory::Neutral => RGBColor(255, 165, 0),
        EffectCategory::Opposes => RGBColor(255, 0, 0),
    }
}

struct Segment {
    x_start: f64,
    x_end: f64,
    weight: f64,
}

pub fn step_chart(table: &WeightTable) -> Result<ChartImage> {
    // Malformed range strings drop their segment, never the chart.
    let segments: Vec<Segment> = table
        .rows
        .iter()
        .filter_map(|row| match row.boundaries() {
            Some((x_start, x_end)) => Some(Segment {
                x_start,
                x_end,
                weight: row.weight,
            }),
            None => {
                log::warn!("rango ilegible '{}' en {}", row.range, table.title);
                None
            }
        })
        .collect();
    if segments.is_empty() {
        return Err(ReportError::Render(format!(
            "sin puntos dibujables en {}",
            table.title
        )));
    }

    let x_min = segments.iter().map(|s| s.x_start).fold(f64::MAX, f64::min);
    let x_max = segments.iter().map(|s| s.x_end).fold(f64::MIN, f64::max);
    let y_min = segments
        .iter()
        .map(|s| s.weight)
        .fold(-1.0f64, f64::min);
    let y_max = segments.iter().map(|s| s.weight).fold(1.0f64, f64::max);

    let threshold = min_x_threshold(x_min, x_max);
    let log_min = x_min.max(threshold).log10();
    let log_max = x_max.max(threshold).log10();

    let to_x = move |value: f64| -> i32 {
        if value <= threshold || log_max <= log_min {
            return MARGIN_LEFT;
        }
        let t = (value.log10() - log_min) / (log_max - log_min);
        MARGIN_LEFT + (t * (WIDTH as i32 - MARGIN_LEFT - MARGIN_RIGHT) as f64) as i32
    };
    let to_y = move |value: f64| -> i32 {
        let clamped = value.clamp(y_min, y_max);
        let t = (clamped - y_min) / (y_max - y_min);
        MARGIN_TOP + ((1.0 - t) * (HEIGHT as i32 - MARGIN_TOP - MARGIN_BOTTOM) as f64) as i32
    };

    render(WIDTH, HEIGHT, |root| {
        let grid = RGBColor(200, 200, 200);
        let label_font = ("sans-serif", 16).into_font();
        let right_aligned = TextStyle::from(label_font.clone())
            .pos(Pos::new(HPos::Right, VPos::Center));
        let centered = TextStyle::from(label_font.clone()).pos(Pos::new(HPos::Center, VPos::Top));

        // Horizontal grid with y labels.
        for i in 0..=5 {
            let value = y_min + i as f64 / 5.0 * (y_max - y_min);
            let y = to_y(value);
            root.draw(&PathElement::new(
                vec![(MARGIN_LEFT, y), (WIDTH as i32 - MARGIN_RIGHT, y)],
                grid.stroke_width(1),
            ))
            .map_err(draw_error)?;
            root.draw(&Text::new(
                format!("{value:.1}"),
                (MARGIN_LEFT - 10, y),
                right_aligned.clone(),
            ))
            .map_err(draw_error)?;
        }

        // X ticks below the axis.
        let axis_y = HEIGHT as i32 - MARGIN_BOTTOM;
        for tick in x_ticks(x_min, x_max) {
            let x = to_x(tick);
            if x < MARGIN_LEFT || x > WIDTH as i32 - MARGIN_RIGHT {
                continue;
            }
            root.draw(&PathElement::new(
                vec![(x, axis_y), (x, axis_y + 10)],
                grid.stroke_width(1),
            ))
            .map_err(draw_error)?;
            root.draw(&Text::new(format!("{tick}"), (x, axis_y + 14), centered.clone()))
                .map_err(draw_error)?;
        }

        // Dashed reference lines at the classification boundaries.
        let reference = RGBColor(150, 150, 150);
        for boundary in [1.0, -1.0] {
            let y = to_y(boundary);
            dashed_line(
                root,
                (MARGIN_LEFT, y),
                (WIDTH as i32 - MARGIN_RIGHT, y),
                reference.stroke_width(1),
            )?;
        }

        // One horizontal segment per row, dashed connector to the next.
        for (index, segment) in segments.iter().enumerate() {
            let color = effect_color(classify_effect(segment.weight));
            let x1 = to_x(segment.x_start.max(threshold));
            let x2 = to_x(segment.x_end.max(threshold));
            let y = to_y(segment.weight);

            root.draw(&PathElement::new(
                vec![(x1, y), (x2, y)],
                color.stroke_width(3),
            ))
            .map_err(draw_error)?;
            root.draw(&Circle::new((x1, y), 6, color.filled()))
                .map_err(draw_error)?;

            if let Some(next) = segments.get(index + 1) {
                let next_y = to_y(next.weight);
                dashed_line(root, (x2, y), (x2, next_y), color.stroke_width(2))?;
            }
        }

        // Axis titles.
        root.draw(&Text::new(
            "Rangos",
            (WIDTH as i32 / 2 + 90, HEIGHT as i32 - 30),
            centered.clone(),
        ))
        .map_err(draw_error)?;
        let rotated = TextStyle::from(("sans-serif", 18).into_font())
            .transform(FontTransform::Rotate270);
        root.draw(&Text::new("Pesos", (60, HEIGHT as i32 / 2 + 30), rotated))
            .map_err(draw_error)?;

        // Fixed three-item legend.
        let legend_x = WIDTH as i32 - MARGIN_RIGHT + 8;
        let legend_items = [
            EffectCategory::Favors,
            EffectCategory::Neutral,
            EffectCategory::Opposes,
        ];
        for (i, category) in legend_items.iter().enumerate() {
            let y = MARGIN_TOP + 120 + i as i32 * 45;
            root.draw(&Circle::new(
                (legend_x, y),
                6,
                effect_color(*category).filled(),
            ))
            .map_err(draw_error)?;
            root.draw(&Text::new(
                category.legend(),
                (legend_x + 12, y - 8),
                ("sans-serif", 16),
            ))
            .map_err(draw_error)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::weights::WeightRow;

    // ==========================================================================
    // THRESHOLD FORMULA TESTS
    // ==========================================================================
    //
    // These tiers are fixed visual-scaling constants; the tests pin them.
    // ==========================================================================

    #[test]
    fn test_threshold_small_max() {
        assert_eq!(min_x_threshold(0.0, 15.0), 0.7);
        assert_eq!(min_x_threshold(0.0, 20.0), 0.7);
    }

    #[test]
    fn test_threshold_mid_max() {
        assert_eq!(min_x_threshold(0.0, 100.0), 5.0);
        assert_eq!(min_x_threshold(30.0, 90.0), 5.0);
    }

    #[test]
    fn test_threshold_special_case_zero_based_range() {
        // range in (100, 200] starting at zero gets threshold 1
        assert_eq!(min_x_threshold(0.0, 150.0), 1.0);
        assert_eq!(min_x_threshold(0.0, 200.0), 1.0);
        // same width not starting at zero falls through to the max tiers
        assert_eq!(min_x_threshold(50.0, 200.0), 50.0);
    }

    #[test]
    fn test_threshold_large_max() {
        assert_eq!(min_x_threshold(0.0, 5000.0), 50.0);
        assert_eq!(min_x_threshold(0.0, 10000.0), 50.0);
    }

    #[test]
    fn test_threshold_huge_range_uses_log_formula() {
        // range 100000 -> 10^floor(log10(1000)) = 1000
        assert_eq!(min_x_threshold(0.0, 100000.0), 1000.0);
        // range 30000 -> 10^floor(log10(300)) = 100
        assert_eq!(min_x_threshold(0.0, 30000.0), 100.0);
    }

    // ==========================================================================
    // TICK TESTS
    // ==========================================================================

    #[test]
    fn test_ticks_small_range() {
        assert_eq!(x_ticks(0.0, 50.0), vec![0.0, 50.0]);
    }

    #[test]
    fn test_ticks_mid_range() {
        assert_eq!(x_ticks(0.0, 500.0), vec![0.0, 250.0, 500.0]);
    }

    #[test]
    fn test_ticks_large_range() {
        assert_eq!(x_ticks(0.0, 5000.0), vec![0.0, 1250.0, 2500.0, 5000.0]);
    }

    #[test]
    fn test_ticks_huge_range() {
        assert_eq!(
            x_ticks(0.0, 50000.0),
            vec![0.0, 1000.0, 10000.0, 50000.0]
        );
    }

    #[test]
    fn test_ticks_drop_negative() {
        let ticks = x_ticks(-10.0, 5.0);
        assert!(ticks.iter().all(|t| *t >= 0.0));
    }

    // ==========================================================================
    // CHART INPUT TESTS
    // ==========================================================================

    fn table(rows: Vec<(&str, f64)>) -> WeightTable {
        WeightTable {
            title: "t".into(),
            parameter: "p".into(),
            rows: rows
                .into_iter()
                .map(|(range, weight)| WeightRow {
                    range: range.into(),
                    weight,
                })
                .collect(),
        }
    }

    #[test]
    fn test_chart_with_only_malformed_ranges_is_render_error() {
        let result = step_chart(&table(vec![("bad", 1.0), ("also:bad:x", 2.0)]));
        assert!(matches!(result, Err(ReportError::Render(_))));
    }

    #[test]
    fn test_chart_empty_table_is_render_error() {
        assert!(matches!(
            step_chart(&table(vec![])),
            Err(ReportError::Render(_))
        ));
    }
}
