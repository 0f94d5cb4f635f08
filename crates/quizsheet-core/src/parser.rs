//! TOML question sheet parser.
//!
//! Loads question sheets from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{default_title, AnswerOption, Question, QuestionSheet};
use crate::typeset::{has_unclosed_delimiter, TypesetConfig};

/// Longest option id that still reads as a short label.
const MAX_ID_LEN: usize = 3;

/// Intermediate TOML structure for parsing sheet files.
#[derive(Debug, Deserialize)]
struct TomlSheetFile {
    #[serde(default)]
    sheet: TomlSheetHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlSheetHeader {
    #[serde(default = "default_title")]
    title: String,
}

impl Default for TomlSheetHeader {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    text: String,
}

/// Parse a single TOML file into a `QuestionSheet`.
pub fn parse_sheet(path: &Path) -> Result<QuestionSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read sheet file: {}", path.display()))?;

    parse_sheet_str(&content, path)
}

/// Parse a TOML string into a `QuestionSheet` (useful for testing).
pub fn parse_sheet_str(content: &str, source_path: &Path) -> Result<QuestionSheet> {
    let parsed: TomlSheetFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            Question::new(
                q.options
                    .into_iter()
                    .map(|o| AnswerOption::new(o.id, o.text))
                    .collect(),
            )
        })
        .collect();

    Ok(QuestionSheet {
        title: parsed.sheet.title,
        questions,
    })
}

/// Recursively load all `.toml` sheet files from a directory.
pub fn load_sheet_directory(dir: &Path) -> Result<Vec<QuestionSheet>> {
    let mut sheets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sheets.extend(load_sheet_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_sheet(&path) {
                Ok(sheet) => sheets.push(sheet),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sheets)
}

/// A warning from sheet validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// 1-based question number.
    pub question: usize,
    /// The option concerned, if any.
    pub option_id: Option<String>,
    pub message: String,
}

/// Validate a sheet, returning any warnings. Never fails: the renderer
/// accepts whatever it is given.
pub fn validate_sheet(sheet: &QuestionSheet, typeset: &TypesetConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (index, question) in sheet.questions.iter().enumerate() {
        let number = index + 1;
        let warn = |option_id: Option<&str>, message: String| ValidationWarning {
            question: number,
            option_id: option_id.map(String::from),
            message,
        };

        if question.options.is_empty() {
            warnings.push(warn(None, "question has no options".into()));
            continue;
        }

        let mut seen = HashSet::new();
        for option in &question.options {
            let id = option.id.as_str();
            if id.trim().is_empty() {
                warnings.push(warn(None, "option has an empty id".into()));
            } else if id.chars().count() > MAX_ID_LEN {
                warnings.push(warn(
                    Some(id),
                    format!("option id is longer than {MAX_ID_LEN} characters"),
                ));
            }
            if !seen.insert(id) {
                warnings.push(warn(Some(id), "duplicate option id".into()));
            }
            if option.text.trim().is_empty() {
                warnings.push(warn(Some(id), "option text is empty".into()));
            } else if has_unclosed_delimiter(&option.text, typeset) {
                warnings.push(warn(Some(id), "unclosed math delimiter".into()));
            }
        }
    }

    warnings
}
