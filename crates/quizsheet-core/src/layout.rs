//! Option width measurement and layout mode selection.
//!
//! Measurement builds an off-screen scaffold of the two candidate
//! arrangements from already-typeset fragments and reads their widths. The
//! visible surface is never touched and the typesetter is never re-invoked.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::model::{AnswerOption, LayoutMode};
use crate::surface::{Fragment, RenderedContent};

/// Width of rendered text in layout units.
pub trait TextMeasurer: Send + Sync {
    /// Measure the rendered width of `text`.
    fn measure_text(&self, text: &str) -> f32;
}

/// Measures display columns, scaled by a fixed cell width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Width of one terminal column in layout units.
    pub cell_width: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { cell_width: 1.0 }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure_text(&self, text: &str) -> f32 {
        UnicodeWidthStr::width(text) as f32 * self.cell_width
    }
}

/// Fixed spacing used by every arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    /// Gap between neighbouring options.
    pub option_gap: f32,
    /// Gap between an option's label and its body.
    pub label_gap: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            option_gap: 4.0,
            label_gap: 1.0,
        }
    }
}

/// Widths of the two candidate arrangements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Every option inline in one row.
    pub single_line_width: f32,
    /// The widest of the paired rows.
    pub max_double_width: f32,
}

/// Split options into consecutive pairs; an odd final option is alone.
pub fn pair_rows<T>(items: &[T]) -> Vec<&[T]> {
    items.chunks(2).collect()
}

/// Off-screen copy of the content, cell widths in display order.
struct Scaffold {
    cells: Vec<f32>,
}

impl Scaffold {
    fn build(
        options: &[AnswerOption],
        content: &dyn RenderedContent,
        measurer: &dyn TextMeasurer,
        metrics: &LayoutMetrics,
    ) -> Self {
        let cells = options
            .iter()
            .map(|option| match content.fragment(&option.id) {
                Some(fragment) => cell_width(&fragment, measurer, metrics),
                None => 0.0,
            })
            .collect();
        Self { cells }
    }

    fn single_line_width(&self, gap: f32) -> f32 {
        row_width(&self.cells, gap)
    }

    fn max_double_width(&self, gap: f32) -> f32 {
        pair_rows(&self.cells)
            .into_iter()
            .map(|row| match row {
                // Both cells take an equal share of the row.
                [a, b] => 2.0 * a.max(*b) + gap,
                _ => row_width(row, gap),
            })
            .fold(0.0, f32::max)
    }
}

fn row_width(cells: &[f32], gap: f32) -> f32 {
    if cells.is_empty() {
        return 0.0;
    }
    cells.iter().sum::<f32>() + gap * (cells.len() - 1) as f32
}

/// Width of one rendered option: label, label gap, body.
pub fn cell_width(
    fragment: &Fragment,
    measurer: &dyn TextMeasurer,
    metrics: &LayoutMetrics,
) -> f32 {
    measurer.measure_text(&fragment.label)
        + metrics.label_gap
        + measurer.measure_text(&fragment.body)
}

/// Measure both candidate arrangements for one question.
pub fn measure(
    options: &[AnswerOption],
    content: &dyn RenderedContent,
    measurer: &dyn TextMeasurer,
    metrics: &LayoutMetrics,
) -> Measurement {
    let scaffold = Scaffold::build(options, content, measurer, metrics);
    Measurement {
        single_line_width: scaffold.single_line_width(metrics.option_gap),
        max_double_width: scaffold.max_double_width(metrics.option_gap),
    }
}

/// Pick the narrowest-fitting mode, in strict priority order.
pub fn choose_mode(measurement: &Measurement, container_width: f32) -> LayoutMode {
    if measurement.single_line_width <= container_width {
        LayoutMode::Single
    } else if measurement.max_double_width <= container_width {
        LayoutMode::Double
    } else {
        LayoutMode::Stacked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::TypesetSurface;

    fn m(single: f32, double: f32) -> Measurement {
        Measurement {
            single_line_width: single,
            max_double_width: double,
        }
    }

    fn surface_for(options: &[AnswerOption]) -> TypesetSurface {
        let surface = TypesetSurface::new();
        for o in options {
            surface.insert(Fragment::new(&o.id, o.label(), &o.text));
        }
        surface
    }

    fn options(texts: &[&str]) -> Vec<AnswerOption> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| AnswerOption::new(((b'A' + i as u8) as char).to_string(), *t))
            .collect()
    }

    #[test]
    fn single_when_one_row_fits() {
        assert_eq!(choose_mode(&m(300.0, 150.0), 600.0), LayoutMode::Single);
        assert_eq!(choose_mode(&m(600.0, 300.0), 600.0), LayoutMode::Single);
    }

    #[test]
    fn double_when_only_pairs_fit() {
        assert_eq!(choose_mode(&m(650.0, 380.0), 600.0), LayoutMode::Double);
    }

    #[test]
    fn stacked_when_nothing_fits() {
        assert_eq!(choose_mode(&m(900.0, 650.0), 600.0), LayoutMode::Stacked);
    }

    #[test]
    fn pairing_is_sequential() {
        let items = ["A", "B", "C", "D", "E"];
        let rows = pair_rows(&items);
        assert_eq!(rows, vec![&["A", "B"][..], &["C", "D"][..], &["E"][..]]);
        assert!(pair_rows::<u8>(&[]).is_empty());
    }

    #[test]
    fn measure_single_and_double_widths() {
        // Cells: "A." + 1 + body.
        let opts = options(&["aaaa", "bb", "cccccc", "d"]);
        let surface = surface_for(&opts);
        let got = measure(
            &opts,
            &surface,
            &MonospaceMeasurer::default(),
            &LayoutMetrics::default(),
        );
        // Cells are 7, 5, 9, 4: single = 25 + 3 * 4.
        assert_eq!(got.single_line_width, 37.0);
        // Rows: 2 * 7 + 4 = 18, 2 * 9 + 4 = 22.
        assert_eq!(got.max_double_width, 22.0);
    }

    #[test]
    fn odd_option_measures_alone() {
        let opts = options(&["x", "y", "a much longer option"]);
        let surface = surface_for(&opts);
        let got = measure(
            &opts,
            &surface,
            &MonospaceMeasurer::default(),
            &LayoutMetrics::default(),
        );
        assert_eq!(got.max_double_width, 23.0);
    }

    #[test]
    fn missing_marker_measures_empty() {
        let opts = options(&["abc", "def"]);
        let surface = TypesetSurface::new();
        surface.insert(Fragment::new("A", "A.", "abc"));
        let got = measure(
            &opts,
            &surface,
            &MonospaceMeasurer::default(),
            &LayoutMetrics::default(),
        );
        assert_eq!(got.single_line_width, 6.0 + 0.0 + 4.0);
    }

    #[test]
    fn empty_option_list_is_single() {
        let got = measure(
            &[],
            &TypesetSurface::new(),
            &MonospaceMeasurer::default(),
            &LayoutMetrics::default(),
        );
        assert_eq!(got, Measurement::default());
        assert_eq!(choose_mode(&got, 0.0), LayoutMode::Single);
    }

    #[test]
    fn shrinking_width_is_monotonic() {
        let opts = options(&[
            "30 m towards West",
            "10 m towards East",
            "10 m towards West",
            "30 m towards East",
        ]);
        let surface = surface_for(&opts);
        let got = measure(
            &opts,
            &surface,
            &MonospaceMeasurer::default(),
            &LayoutMetrics::default(),
        );

        let mut seen = Vec::new();
        for width in (0..=100).rev() {
            let mode = choose_mode(&got, width as f32);
            if seen.last() != Some(&mode) {
                seen.push(mode);
            }
        }
        assert_eq!(
            seen,
            vec![LayoutMode::Single, LayoutMode::Double, LayoutMode::Stacked]
        );
    }

    #[test]
    fn wide_characters_count_double() {
        let measurer = MonospaceMeasurer { cell_width: 8.0 };
        assert_eq!(measurer.measure_text("ab"), 16.0);
        assert_eq!(measurer.measure_text("漢字"), 32.0);
    }
}
