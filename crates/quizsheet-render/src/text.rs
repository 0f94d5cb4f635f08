//! Plain-text page renderer.
//!
//! Lays the page out in two panes: the questions on the left, each in its
//! resolved mode, and a blank "Answer Space" on the right.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use quizsheet_core::arrange::{arrange, Row};
use quizsheet_core::config::QuizsheetConfig;
use quizsheet_core::model::LayoutMode;
use quizsheet_core::sheet::{ResolvedQuestion, ResolvedSheet};
use quizsheet_core::surface::Fragment;

const ANSWER_HEADING: &str = "Answer Space";

/// Column geometry for a text page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPageOptions {
    /// Width of the question pane.
    pub question_width: usize,
    /// Width of the answer pane.
    pub answer_width: usize,
    /// Columns between the panes, rule included.
    pub gutter: usize,
    pub option_gap: usize,
    pub label_gap: usize,
}

impl TextPageOptions {
    pub fn from_config(config: &QuizsheetConfig) -> Self {
        Self {
            question_width: config.question_pane_width(),
            answer_width: config.answer_pane_width(),
            gutter: config.pane_gutter,
            option_gap: config.option_gap,
            label_gap: config.label_gap,
        }
    }
}

impl Default for TextPageOptions {
    fn default() -> Self {
        Self::from_config(&QuizsheetConfig::default())
    }
}

/// Render a resolved sheet as a printable text page.
pub fn render_text(sheet: &ResolvedSheet, options: &TextPageOptions) -> String {
    let width = options.question_width.max(1);
    let mut left = Vec::new();

    for line in wrap(&sheet.title, width) {
        left.push(line);
    }
    left.push("=".repeat(UnicodeWidthStr::width(sheet.title.as_str()).clamp(1, width)));

    for question in &sheet.questions {
        left.push(String::new());
        left.push(question.heading());
        left.extend(render_question(question, width, options));
    }

    let right = vec![
        ANSWER_HEADING.to_string(),
        "-".repeat(ANSWER_HEADING.len().min(options.answer_width.max(1))),
    ];

    join_panes(&left, &right, options)
}

fn render_question(
    question: &ResolvedQuestion,
    width: usize,
    options: &TextPageOptions,
) -> Vec<String> {
    let rows = arrange(question.mode(), &question.question.options);
    let cells = |row: &Row<'_>| -> Vec<Fragment> {
        row.options
            .iter()
            .map(|option| {
                question
                    .fragment(&option.id)
                    .cloned()
                    .unwrap_or_else(|| Fragment::new(&option.id, option.label(), &option.text))
            })
            .collect()
    };

    let mut lines = Vec::new();
    match question.mode() {
        LayoutMode::Single => {
            for row in &rows {
                lines.extend(flow(&cells(row), width, options));
            }
        }
        LayoutMode::Double => {
            let half = width.saturating_sub(options.option_gap).max(2) / 2;
            for row in &rows {
                let columns: Vec<Vec<String>> = cells(row)
                    .iter()
                    .map(|cell| cell_lines(cell, half, options.label_gap))
                    .collect();
                let height = columns.iter().map(Vec::len).max().unwrap_or(0);
                for i in 0..height {
                    let mut line = String::new();
                    for (c, column) in columns.iter().enumerate() {
                        let text = column.get(i).map(String::as_str).unwrap_or("");
                        if c + 1 < columns.len() {
                            line.push_str(&pad(text, half + options.option_gap));
                        } else {
                            line.push_str(text);
                        }
                    }
                    lines.push(line.trim_end().to_string());
                }
            }
        }
        LayoutMode::Stacked => {
            for row in &rows {
                for cell in cells(row) {
                    lines.extend(cell_lines(&cell, width, options.label_gap));
                }
            }
        }
    }
    lines
}

/// Lay cells out left to right, breaking to a new line when the next cell
/// would overflow.
fn flow(cells: &[Fragment], width: usize, options: &TextPageOptions) -> Vec<String> {
    let gap = " ".repeat(options.option_gap);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for cell in cells {
        let text = cell_text(cell, options.label_gap);
        let text_width = UnicodeWidthStr::width(text.as_str());
        let current_width = UnicodeWidthStr::width(current.as_str());

        if current.is_empty() {
            if text_width <= width {
                current = text;
            } else {
                lines.extend(cell_lines(cell, width, options.label_gap));
            }
        } else if current_width + options.option_gap + text_width <= width {
            current.push_str(&gap);
            current.push_str(&text);
        } else {
            lines.push(std::mem::take(&mut current));
            if text_width <= width {
                current = text;
            } else {
                lines.extend(cell_lines(cell, width, options.label_gap));
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn cell_text(cell: &Fragment, label_gap: usize) -> String {
    format!("{}{}{}", cell.label, " ".repeat(label_gap), cell.body)
}

/// One option wrapped to `width` with a hanging indent under its label.
fn cell_lines(cell: &Fragment, width: usize, label_gap: usize) -> Vec<String> {
    let indent = UnicodeWidthStr::width(cell.label.as_str()) + label_gap;
    let body_width = width.saturating_sub(indent).max(1);
    let mut lines = Vec::new();
    for (i, line) in wrap(&cell.body, body_width).into_iter().enumerate() {
        if i == 0 {
            lines.push(format!("{}{}{}", cell.label, " ".repeat(label_gap), line));
        } else {
            lines.push(format!("{}{}", " ".repeat(indent), line));
        }
    }
    if lines.is_empty() {
        lines.push(cell.label.clone());
    }
    lines
}

/// Greedy word wrap by display width. Words wider than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);
        if current_width > 0 && current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
            continue;
        }
        if current_width > 0 {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }
        for ch in word.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if current_width + ch_width > width && current_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += ch_width;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Pad `text` with spaces to `width` display columns.
fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

fn join_panes(left: &[String], right: &[String], options: &TextPageOptions) -> String {
    let before = options.gutter.saturating_sub(1) / 2;
    let after = options.gutter.saturating_sub(1 + before);
    let rule = if options.gutter == 0 {
        String::new()
    } else {
        format!("{}|{}", " ".repeat(before), " ".repeat(after))
    };

    let height = left.len().max(right.len());
    let mut out = String::new();
    for i in 0..height {
        let l = left.get(i).map(String::as_str).unwrap_or("");
        let r = right.get(i).map(String::as_str).unwrap_or("");
        let line = format!("{}{}{}", pad(l, options.question_width), rule, r);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
