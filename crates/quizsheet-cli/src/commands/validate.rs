//! The `quizsheet validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizsheet_core::config::load_config_from;
use quizsheet_core::parser;

pub fn execute(sheet_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let sheets = if sheet_path.is_dir() {
        parser::load_sheet_directory(&sheet_path)?
    } else {
        vec![parser::parse_sheet(&sheet_path)?]
    };

    let mut total_warnings = 0;

    for sheet in &sheets {
        println!("Sheet: {} ({} questions)", sheet.title, sheet.questions.len());

        let warnings = parser::validate_sheet(sheet, &config.typeset);
        for w in &warnings {
            let prefix = match &w.option_id {
                Some(id) => format!("  [Q{} {id}]", w.question),
                None => format!("  [Q{}]", w.question),
            };
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All sheets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
