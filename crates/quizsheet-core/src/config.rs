//! quizsheet configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adaptive::{AdaptiveConfig, DEFAULT_MAX_POLL_ATTEMPTS};
use crate::layout::LayoutMetrics;
use crate::typeset::TypesetConfig;

/// Top-level quizsheet configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizsheetConfig {
    /// Total page width in text columns.
    #[serde(default = "default_page_width")]
    pub page_width: usize,
    /// Relative widths of the question pane and the answer pane.
    #[serde(default = "default_pane_ratio")]
    pub pane_ratio: [u32; 2],
    /// Columns between the two panes, rule included.
    #[serde(default = "default_pane_gutter")]
    pub pane_gutter: usize,
    /// Delay between typeset marker probes in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Marker probes before a layout gives up.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Columns between neighbouring options.
    #[serde(default = "default_option_gap")]
    pub option_gap: usize,
    /// Columns between an option label and its text.
    #[serde(default = "default_label_gap")]
    pub label_gap: usize,
    /// Typesetter configuration.
    #[serde(default)]
    pub typeset: TypesetConfig,
}

fn default_page_width() -> usize {
    96
}
fn default_pane_ratio() -> [u32; 2] {
    [2, 1]
}
fn default_pane_gutter() -> usize {
    3
}
fn default_poll_interval() -> u64 {
    100
}
fn default_max_poll_attempts() -> u32 {
    DEFAULT_MAX_POLL_ATTEMPTS
}
fn default_option_gap() -> usize {
    4
}
fn default_label_gap() -> usize {
    1
}

impl Default for QuizsheetConfig {
    fn default() -> Self {
        Self {
            page_width: default_page_width(),
            pane_ratio: default_pane_ratio(),
            pane_gutter: default_pane_gutter(),
            poll_interval_ms: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            option_gap: default_option_gap(),
            label_gap: default_label_gap(),
            typeset: TypesetConfig::default(),
        }
    }
}

impl QuizsheetConfig {
    /// Width of the question pane (the option container) in columns.
    pub fn question_pane_width(&self) -> usize {
        let [left, right] = self.pane_ratio.map(u128::from);
        let total = (left + right).max(1);
        let usable = self.page_width.saturating_sub(self.pane_gutter) as u128;
        (usable * left / total) as usize
    }

    /// Width of the answer pane in columns.
    pub fn answer_pane_width(&self) -> usize {
        self.page_width
            .saturating_sub(self.pane_gutter)
            .saturating_sub(self.question_pane_width())
    }

    pub fn metrics(&self) -> LayoutMetrics {
        LayoutMetrics {
            option_gap: self.option_gap as f32,
            label_gap: self.label_gap as f32,
        }
    }

    pub fn adaptive(&self) -> AdaptiveConfig {
        AdaptiveConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_poll_attempts: self.max_poll_attempts,
            metrics: self.metrics(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `quizsheet.toml` in the current directory
/// 2. `~/.config/quizsheet/config.toml`
///
/// Environment variable override: `QUIZSHEET_PAGE_WIDTH`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizsheetConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizsheet.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizsheetConfig::default(),
    };

    if let Ok(width) = std::env::var("QUIZSHEET_PAGE_WIDTH") {
        config.page_width = width
            .trim()
            .parse()
            .with_context(|| format!("QUIZSHEET_PAGE_WIDTH is not a column count: {width}"))?;
    }

    Ok(config)
}

/// Parse a config from TOML text.
pub fn parse_config(content: &str) -> Result<QuizsheetConfig> {
    let config: QuizsheetConfig = toml::from_str(content)?;
    anyhow::ensure!(config.page_width > 0, "page_width must be positive");
    anyhow::ensure!(
        config.pane_ratio[0] > 0,
        "pane_ratio must give the question pane a share"
    );
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizsheet"))
}
