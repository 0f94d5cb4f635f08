//! HTML page generator.
//!
//! Produces a self-contained HTML file with the CSS inlined. Option text is
//! left as raw markup for the in-browser typesetter, whose configuration is
//! embedded next to its loader.
//!
//! The mode resolved on the command line is only the initial arrangement.
//! An embedded script waits for the typesetter, measures the typeset options
//! in a hidden scaffold, and re-arranges every question on each window
//! resize.

use anyhow::{Context, Result};
use std::path::Path;

use quizsheet_core::arrange::arrange;
use quizsheet_core::config::QuizsheetConfig;
use quizsheet_core::sheet::{ResolvedQuestion, ResolvedSheet};
use quizsheet_core::typeset::TypesetConfig;

const MATHJAX_URL: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js";

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Settings for the HTML page and its layout script.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlPageOptions {
    pub typeset: TypesetConfig,
    /// Delay between checks for typeset output in the browser.
    pub poll_interval_ms: u64,
    /// Checks before the script gives up and keeps the initial mode.
    pub max_poll_attempts: u32,
    /// Gap between neighbouring options, in `ch` units.
    pub option_gap: usize,
}

impl HtmlPageOptions {
    pub fn from_config(config: &QuizsheetConfig) -> Self {
        Self {
            typeset: config.typeset.clone(),
            poll_interval_ms: config.poll_interval_ms,
            max_poll_attempts: config.max_poll_attempts,
            option_gap: config.option_gap,
        }
    }

    /// Settings object read by the layout script.
    fn layout_settings(&self) -> serde_json::Value {
        serde_json::json!({
            "pollInterval": self.poll_interval_ms,
            "maxPollAttempts": self.max_poll_attempts,
        })
    }
}

impl Default for HtmlPageOptions {
    fn default() -> Self {
        Self::from_config(&QuizsheetConfig::default())
    }
}

/// Serialize a value for embedding inside a `<script>` element.
fn script_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/")
}

/// Generate an HTML page from a resolved sheet.
pub fn render_html(sheet: &ResolvedSheet, options: &HtmlPageOptions) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(&sheet.title)));
    html.push_str("<style>\n");
    html.push_str(&format!(":root {{ --option-gap: {}ch; }}\n", options.option_gap));
    html.push_str(CSS);
    html.push_str("</style>\n");

    // The typesetter reads its configuration before the loader runs.
    html.push_str("<script>\nwindow.MathJax = ");
    html.push_str(&script_json(&options.typeset.to_browser_config()));
    html.push_str(";\n");
    html.push_str(TYPESET_DONE_JS);
    html.push_str("window.QUIZSHEET_LAYOUT = ");
    html.push_str(&script_json(&options.layout_settings()));
    html.push_str(";\n</script>\n");
    html.push_str(&format!(
        "<script id=\"MathJax-script\" async src=\"{MATHJAX_URL}\"></script>\n"
    ));
    html.push_str("</head>\n<body>\n");

    html.push_str("<main class=\"page\">\n");

    // Question pane
    html.push_str("<section class=\"questions\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&sheet.title)));
    for question in &sheet.questions {
        render_question(&mut html, question);
    }
    html.push_str("</section>\n");

    // Answer pane
    html.push_str("<section class=\"answers\">\n");
    html.push_str("<h2>Answer Space</h2>\n");
    html.push_str("</section>\n");

    html.push_str("</main>\n");

    html.push_str(&format!(
        "<footer class=\"meta\">Generated {}</footer>\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    // Runs once the option markup above exists.
    html.push_str("<script>\n");
    html.push_str(LAYOUT_JS);
    html.push_str("</script>\n");
    html.push_str("</body>\n</html>");
    html
}

fn render_question(html: &mut String, question: &ResolvedQuestion) {
    let mode = question.mode();
    html.push_str(&format!(
        "<article class=\"question\" data-question=\"{}\">\n",
        question.number
    ));
    html.push_str(&format!("<h3>{}</h3>\n", html_escape(&question.heading())));
    html.push_str(&format!("<div class=\"options mode-{mode}\">\n"));

    for row in arrange(mode, &question.question.options) {
        let row_class = if row.equal_share {
            "row equal"
        } else {
            "row"
        };
        html.push_str(&format!("<div class=\"{row_class}\">\n"));
        for option in row.options {
            html.push_str(&format!(
                "<span class=\"option\" data-option-id=\"{}\"><span class=\"label\">{}</span> <span class=\"body\">{}</span></span>\n",
                html_escape(&option.id),
                html_escape(&option.label()),
                html_escape(&option.text)
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n</article>\n");
}

/// Write an HTML page to a file.
pub fn write_html(sheet: &ResolvedSheet, options: &HtmlPageOptions, path: &Path) -> Result<()> {
    let html = render_html(sheet, options);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("failed to write: {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #d1d5db; }
body { font-family: 'Times New Roman', serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
.page { display: grid; grid-template-columns: 2fr 1fr; column-gap: 2rem; }
.answers { border-left: 1px solid var(--border); padding-left: 2rem; }
.question { margin-bottom: 1.5rem; }
.options .row { display: flex; flex-wrap: wrap; column-gap: var(--option-gap); margin: 0.25rem 0; }
.options .row.equal > .option { flex: 1 1 0; }
.mode-stacked .row { display: block; }
.scaffold { position: absolute; left: -9999px; top: 0; visibility: hidden; }
.scaffold .row { flex-wrap: nowrap; }
.scaffold .option { flex: none; white-space: nowrap; }
.label { font-weight: bold; }
.meta { color: #6b7280; margin-top: 2rem; font-size: 0.8rem; }
@media print { .meta { display: none; } }
"#;

const TYPESET_DONE_JS: &str = r#"window.MathJax.startup = {
  pageReady: function () {
    return MathJax.startup.defaultPageReady().then(function () {
      document.documentElement.dataset.typeset = 'done';
    });
  }
};
"#;

const LAYOUT_JS: &str = r#"
(function () {
  const settings = window.QUIZSHEET_LAYOUT;
  const MODES = ['single', 'double', 'stacked'];
  let attempts = 0;
  let timer = null;

  function optionsOf(container) {
    return Array.from(container.querySelectorAll('[data-option-id]'));
  }

  // Natural width of every option, measured off-screen.
  function measure(options) {
    const scaffold = document.createElement('div');
    scaffold.className = 'options scaffold';
    scaffold.setAttribute('aria-hidden', 'true');
    const row = document.createElement('div');
    row.className = 'row';
    scaffold.appendChild(row);
    document.body.appendChild(scaffold);

    const cells = options.map(function (option) {
      const clone = option.cloneNode(true);
      clone.removeAttribute('data-option-id');
      row.appendChild(clone);
      return clone.getBoundingClientRect().width;
    });
    const gap = parseFloat(getComputedStyle(row).columnGap) || 0;
    document.body.removeChild(scaffold);

    let single = 0;
    cells.forEach(function (width, i) {
      single += width + (i > 0 ? gap : 0);
    });
    let double = 0;
    for (let i = 0; i < cells.length; i += 2) {
      const width = i + 1 < cells.length
        ? 2 * Math.max(cells[i], cells[i + 1]) + gap
        : cells[i];
      double = Math.max(double, width);
    }
    return { single: single, double: double };
  }

  function chooseMode(measurement, containerWidth) {
    if (measurement.single <= containerWidth) return 'single';
    if (measurement.double <= containerWidth) return 'double';
    return 'stacked';
  }

  function arrange(container, options, mode) {
    const size = Math.max(1, mode === 'single' ? options.length : mode === 'double' ? 2 : 1);
    container.innerHTML = '';
    for (let i = 0; i < options.length; i += size) {
      const row = document.createElement('div');
      row.className = mode === 'double' ? 'row equal' : 'row';
      options.slice(i, i + size).forEach(function (option) {
        row.appendChild(option);
      });
      container.appendChild(row);
    }
    MODES.forEach(function (m) {
      container.classList.toggle('mode-' + m, m === mode);
    });
  }

  function relayout() {
    document.querySelectorAll('.question .options').forEach(function (container) {
      const options = optionsOf(container);
      if (options.length === 0) return;
      const mode = chooseMode(measure(options), container.clientWidth);
      if (!container.classList.contains('mode-' + mode)) {
        arrange(container, options, mode);
      }
    });
  }

  function poll() {
    timer = null;
    attempts += 1;
    if (document.documentElement.dataset.typeset === 'done') {
      relayout();
      window.addEventListener('resize', relayout);
      return;
    }
    if (attempts >= settings.maxPollAttempts) {
      console.warn('typeset output not found after ' + attempts + ' attempts');
      return;
    }
    timer = setTimeout(poll, settings.pollInterval);
  }

  window.addEventListener('pagehide', function () {
    if (timer !== null) clearTimeout(timer);
    window.removeEventListener('resize', relayout);
  });

  poll();
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quizsheet_core::adaptive::LayoutState;
    use quizsheet_core::layout::Measurement;
    use quizsheet_core::model::{AnswerOption, LayoutMode, Question};
    use quizsheet_core::surface::Fragment;

    fn page(mode: LayoutMode) -> String {
        render_html(&make_sheet(mode), &HtmlPageOptions::default())
    }

    fn make_sheet(mode: LayoutMode) -> ResolvedSheet {
        let options = vec![
            AnswerOption::new("A", "$n \\propto {u^2}$"),
            AnswerOption::new("B", "a < b & c"),
            AnswerOption::new("C", "$n \\propto u$"),
        ];
        let fragments = options
            .iter()
            .map(|o| Fragment::new(&o.id, o.label(), &o.text))
            .collect();
        ResolvedSheet {
            title: "Physics <set>".into(),
            container_width: 62.0,
            questions: vec![ResolvedQuestion {
                number: 1,
                question: Question::new(options),
                state: LayoutState::Settled {
                    mode,
                    container_width: 62.0,
                    measurement: Measurement::default(),
                },
                fragments,
            }],
        }
    }

    #[test]
    fn html_page_contains_required_elements() {
        let html = page(LayoutMode::Double);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("<title>Physics &lt;set&gt;</title>"));
        assert!(html.contains("Question 1"));
        assert!(html.contains("Answer Space"));
        assert!(html.contains("class=\"options mode-double\""));
        assert_eq!(html.matches("class=\"row equal\"").count(), 2);
        assert!(html.contains("data-option-id=\"B\""));
        assert!(html.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn raw_math_is_left_for_the_browser() {
        let html = page(LayoutMode::Single);
        assert!(html.contains("$n \\propto {u^2}$"));
        assert!(html.contains("\"inlineMath\""));
        assert!(html.contains("\"messageStyle\": \"none\""));
        assert!(html.contains("MathJax-script"));
    }

    #[test]
    fn layout_script_tracks_resizes() {
        let html = page(LayoutMode::Stacked);
        let script_start = html.rfind("<script>").unwrap();
        let markup = &html[..script_start];
        let script = &html[script_start..];

        // Initial arrangement from the resolved mode, hooks for the script.
        assert!(markup.contains("class=\"options mode-stacked\""));
        assert_eq!(markup.matches("data-option-id=").count(), 3);

        assert!(script.contains("querySelectorAll('[data-option-id]')"));
        assert!(script.contains("addEventListener('resize', relayout)"));
        assert!(script.contains("removeEventListener('resize', relayout)"));
        assert!(script.contains("clearTimeout(timer)"));
        assert!(script.contains("measurement.single <= containerWidth"));
        assert!(script.contains("measurement.double <= containerWidth"));
        assert!(html.contains("dataset.typeset = 'done'"));
    }

    #[test]
    fn layout_settings_come_from_config() {
        let config = QuizsheetConfig {
            poll_interval_ms: 250,
            max_poll_attempts: 4,
            option_gap: 6,
            ..Default::default()
        };
        let html = render_html(
            &make_sheet(LayoutMode::Single),
            &HtmlPageOptions::from_config(&config),
        );
        assert!(html.contains("\"pollInterval\": 250"));
        assert!(html.contains("\"maxPollAttempts\": 4"));
        assert!(html.contains("--option-gap: 6ch;"));

        let defaults = page(LayoutMode::Single);
        assert!(defaults.contains("\"pollInterval\": 100"));
        assert!(defaults.contains("\"maxPollAttempts\": 10"));
    }

    #[test]
    fn stacked_rows_hold_one_option_each() {
        let html = page(LayoutMode::Stacked);
        assert_eq!(html.matches("<div class=\"row\">").count(), 3);
    }

    #[test]
    fn html_page_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("sheet.html");

        write_html(
            &make_sheet(LayoutMode::Single),
            &HtmlPageOptions::default(),
            &path,
        )
        .unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
