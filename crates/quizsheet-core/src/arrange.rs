//! Per-mode arrangement of a question's options.
//!
//! A pure function of mode and options. Renderers walk the rows this
//! produces, so every mode preserves display order by construction.

use crate::layout::pair_rows;
use crate::model::{AnswerOption, LayoutMode};

/// One visual row of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub options: Vec<&'a AnswerOption>,
    /// Whether each option takes an equal share of the row.
    pub equal_share: bool,
}

/// Arrange options into rows for `mode`.
///
/// - single: one wrapping row holding every option
/// - double: consecutive pairs, an odd final option alone
/// - stacked: one option per row
pub fn arrange(mode: LayoutMode, options: &[AnswerOption]) -> Vec<Row<'_>> {
    if options.is_empty() {
        return Vec::new();
    }
    match mode {
        LayoutMode::Single => vec![Row {
            options: options.iter().collect(),
            equal_share: false,
        }],
        LayoutMode::Double => pair_rows(options)
            .into_iter()
            .map(|pair| Row {
                options: pair.iter().collect(),
                equal_share: true,
            })
            .collect(),
        LayoutMode::Stacked => options
            .iter()
            .map(|option| Row {
                options: vec![option],
                equal_share: false,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five() -> Vec<AnswerOption> {
        ["A", "B", "C", "D", "E"]
            .into_iter()
            .map(|id| AnswerOption::new(id, format!("option {id}")))
            .collect()
    }

    fn ids<'a>(rows: &[Row<'a>]) -> Vec<Vec<&'a str>> {
        rows.iter()
            .map(|r| r.options.iter().map(|o| o.id.as_str()).collect())
            .collect()
    }

    #[test]
    fn single_is_one_row() {
        let options = five();
        assert_eq!(
            ids(&arrange(LayoutMode::Single, &options)),
            vec![vec!["A", "B", "C", "D", "E"]]
        );
    }

    #[test]
    fn double_pairs_sequentially() {
        let options = five();
        let rows = arrange(LayoutMode::Double, &options);
        assert_eq!(ids(&rows), vec![vec!["A", "B"], vec!["C", "D"], vec!["E"]]);
        assert!(rows.iter().all(|r| r.equal_share));
    }

    #[test]
    fn stacked_is_one_per_row() {
        let options = five();
        assert_eq!(
            ids(&arrange(LayoutMode::Stacked, &options)),
            vec![vec!["A"], vec!["B"], vec!["C"], vec!["D"], vec!["E"]]
        );
    }

    #[test]
    fn order_is_identical_across_modes() {
        let options = five();
        for mode in [LayoutMode::Single, LayoutMode::Double, LayoutMode::Stacked] {
            let flat: Vec<&str> = ids(&arrange(mode, &options))
                .into_iter()
                .flatten()
                .collect();
            assert_eq!(flat, vec!["A", "B", "C", "D", "E"], "mode {mode}");
        }
    }

    #[test]
    fn no_options_no_rows() {
        assert!(arrange(LayoutMode::Single, &[]).is_empty());
    }
}
