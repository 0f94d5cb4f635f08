//! The `quizsheet render` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizsheet_core::config::load_config_from;
use quizsheet_core::parser;
use quizsheet_render::html::{render_html, write_html, HtmlPageOptions};
use quizsheet_render::text::{render_text, TextPageOptions};

pub async fn execute(
    sheet_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
    width: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "html"),
        "unknown format: {format} (expected text or html)"
    );

    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(width) = width {
        anyhow::ensure!(width > 0, "width must be positive");
        config.page_width = width;
    }

    let sheet = parser::parse_sheet(&sheet_path)?;
    for w in parser::validate_sheet(&sheet, &config.typeset) {
        tracing::warn!(question = w.question, option = ?w.option_id, "{}", w.message);
    }

    let container_width = config.question_pane_width();
    tracing::debug!(container_width, "resolving {} question(s)", sheet.questions.len());
    let resolved = super::sheet_layout(&config)
        .resolve(&sheet, container_width as f32)
        .await;

    let html_options = HtmlPageOptions::from_config(&config);
    match (format.as_str(), output) {
        ("html", Some(path)) => {
            write_html(&resolved, &html_options, &path)?;
            eprintln!("HTML page: {}", path.display());
        }
        ("html", None) => println!("{}", render_html(&resolved, &html_options)),
        (_, Some(path)) => {
            let page = render_text(&resolved, &TextPageOptions::from_config(&config));
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, page)
                .with_context(|| format!("failed to write: {}", path.display()))?;
            eprintln!("Text page: {}", path.display());
        }
        (_, None) => print!(
            "{}",
            render_text(&resolved, &TextPageOptions::from_config(&config))
        ),
    }

    Ok(())
}
