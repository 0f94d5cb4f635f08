//! Core data model types for quizsheet.
//!
//! These are the fundamental types the rest of the workspace uses to
//! represent questions, their answer options, and the derived layout mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One labeled answer choice within a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Short label (e.g. "A").
    pub id: String,
    /// Option text, possibly containing `$...$` or `$$...$$` math.
    pub text: String,
}

impl AnswerOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// The rendered label, e.g. `"A."`.
    pub fn label(&self) -> String {
        format!("{}.", self.id)
    }
}

/// An ordered set of options presented together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Options in display order.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn new(options: Vec<AnswerOption>) -> Self {
        Self { options }
    }
}

/// A fixed, ordered collection of questions rendered as one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSheet {
    /// Heading shown above the question column.
    #[serde(default = "default_title")]
    pub title: String,
    /// The questions, numbered from 1 when rendered.
    #[serde(default)]
    pub questions: Vec<Question>,
}

pub(crate) fn default_title() -> String {
    "Question Options".to_string()
}

impl QuestionSheet {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            title: default_title(),
            questions,
        }
    }
}

/// How one question's options are arranged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Every option in one horizontally wrapping flow.
    #[default]
    Single,
    /// Two options per row, each taking half the row.
    Double,
    /// One option per line.
    Stacked,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Single => write!(f, "single"),
            LayoutMode::Double => write!(f, "double"),
            LayoutMode::Stacked => write!(f, "stacked"),
        }
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(LayoutMode::Single),
            "double" => Ok(LayoutMode::Double),
            "stacked" => Ok(LayoutMode::Stacked),
            other => Err(format!("unknown layout mode: {other}")),
        }
    }
}
