//! The typesetting collaborator seam.
//!
//! A [`Typesetter`] turns option text with delimited math into rendered
//! output. It runs asynchronously and writes into a [`TypesetSurface`]; the
//! adaptive layout never awaits it and instead polls the surface for the
//! per-option markers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::error::TypesetError;
use crate::model::AnswerOption;
use crate::surface::{Fragment, TypesetSurface};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration handed to the typesetter at construction.
///
/// Each typesetter instance owns its copy; nothing here is global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypesetConfig {
    /// Extension packages to load (e.g. "html").
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
    /// Inline math delimiters as `[open, close]` pairs.
    #[serde(default = "default_inline_math")]
    pub inline_math: Vec<[String; 2]>,
    /// Display math delimiters as `[open, close]` pairs.
    #[serde(default = "default_display_math")]
    pub display_math: Vec<[String; 2]>,
    /// Show the "Processing math" messages.
    #[serde(default)]
    pub show_processing_messages: bool,
    /// Show the context menu on rendered math.
    #[serde(default)]
    pub show_math_menu: bool,
    /// Let long expressions break across lines.
    #[serde(default = "default_true")]
    pub automatic_linebreaks: bool,
}

fn default_packages() -> Vec<String> {
    vec!["html".to_string()]
}

fn default_inline_math() -> Vec<[String; 2]> {
    vec![["$".to_string(), "$".to_string()]]
}

fn default_display_math() -> Vec<[String; 2]> {
    vec![["$$".to_string(), "$$".to_string()]]
}

fn default_true() -> bool {
    true
}

impl Default for TypesetConfig {
    fn default() -> Self {
        Self {
            packages: default_packages(),
            inline_math: default_inline_math(),
            display_math: default_display_math(),
            show_processing_messages: false,
            show_math_menu: false,
            automatic_linebreaks: true,
        }
    }
}

impl TypesetConfig {
    /// The configuration object for the in-browser typesetter.
    pub fn to_browser_config(&self) -> serde_json::Value {
        let loads: Vec<String> = self.packages.iter().map(|p| format!("[tex]/{p}")).collect();
        let linebreaks = serde_json::json!({ "automatic": self.automatic_linebreaks });
        let message_style = if self.show_processing_messages {
            "normal"
        } else {
            "none"
        };
        serde_json::json!({
            "loader": { "load": loads },
            "tex": {
                "packages": { "[+]": self.packages },
                "inlineMath": self.inline_math,
                "displayMath": self.display_math,
            },
            "messageStyle": message_style,
            "showProcessingMessages": self.show_processing_messages,
            "showMathMenu": self.show_math_menu,
            "HTML-CSS": {
                "linebreaks": linebreaks,
                "availableFonts": ["TeX"],
                "preferredFont": "TeX",
            },
            "SVG": { "linebreaks": linebreaks },
        })
    }

    /// Delimiter pairs in matching priority: display before inline.
    fn delimiters(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        let display = self
            .display_math
            .iter()
            .map(|[open, close]| (open.as_str(), close.as_str(), true));
        let inline = self
            .inline_math
            .iter()
            .map(|[open, close]| (open.as_str(), close.as_str(), false));
        display
            .chain(inline)
            .filter(|(open, close, _)| !open.is_empty() && !close.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Math segmentation
// ---------------------------------------------------------------------------

/// A piece of option text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text.
    Text(String),
    /// Math source without its delimiters.
    Math { source: String, display: bool },
}

/// Split text into plain and math segments.
///
/// Display delimiters win over inline ones. An opening delimiter with no
/// closing partner stays literal text.
pub fn split_math(text: &str, config: &TypesetConfig) -> Vec<Segment> {
    scan(text, config).0
}

/// Returns `true` if some opening delimiter in `text` is never closed.
pub fn has_unclosed_delimiter(text: &str, config: &TypesetConfig) -> bool {
    scan(text, config).1
}

fn scan(text: &str, config: &TypesetConfig) -> (Vec<Segment>, bool) {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut unclosed = false;
    let mut i = 0;

    'outer: while i < text.len() {
        let rest = &text[i..];
        let mut opened = false;

        for (open, close, display) in config.delimiters() {
            if !rest.starts_with(open) {
                continue;
            }
            opened = true;
            let body_start = i + open.len();
            if let Some(end) = text[body_start..].find(close) {
                if !plain.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut plain)));
                }
                segments.push(Segment::Math {
                    source: text[body_start..body_start + end].to_string(),
                    display,
                });
                i = body_start + end + close.len();
                continue 'outer;
            }
        }

        if opened {
            unclosed = true;
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        plain.push(ch);
        i += ch.len_utf8();
    }

    if !plain.is_empty() {
        segments.push(Segment::Text(plain));
    }
    (segments, unclosed)
}

// ---------------------------------------------------------------------------
// Typesetter trait
// ---------------------------------------------------------------------------

/// External component that converts delimited math text into rendered output.
#[async_trait]
pub trait Typesetter: Send + Sync {
    /// Human-readable name (e.g. "unicode").
    fn name(&self) -> &str;

    /// Typeset one option's text.
    async fn typeset(&self, text: &str) -> Result<String, TypesetError>;
}

/// Typeset every option in the background, writing fragments into `surface`.
///
/// The returned handle is not needed for correctness: callers detect
/// completion through the surface markers.
pub fn spawn_typesetting(
    typesetter: Arc<dyn Typesetter>,
    options: Vec<AnswerOption>,
    surface: Arc<TypesetSurface>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for option in options {
            let fragment = match typesetter.typeset(&option.text).await {
                Ok(body) => Fragment::new(&option.id, option.label(), body),
                Err(e) if e.is_markup_error() => {
                    tracing::warn!(
                        option = %option.id,
                        "malformed math, showing source text: {e}"
                    );
                    Fragment::failure(&option.id, option.label(), &option.text)
                }
                Err(e) => {
                    tracing::warn!(
                        "{} could not typeset option {}: {e}",
                        typesetter.name(),
                        option.id
                    );
                    Fragment::failure(&option.id, option.label(), &option.text)
                }
            };
            surface.insert(fragment);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RenderedContent;

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    fn inline(s: &str) -> Segment {
        Segment::Math {
            source: s.to_string(),
            display: false,
        }
    }

    #[test]
    fn split_plain_text() {
        let config = TypesetConfig::default();
        assert_eq!(
            split_math("30 m towards West", &config),
            vec![text("30 m towards West")]
        );
    }

    #[test]
    fn split_inline_math() {
        let config = TypesetConfig::default();
        assert_eq!(
            split_math("$n \\propto u$", &config),
            vec![inline("n \\propto u")]
        );
        assert_eq!(
            split_math("speed $v$ m/s", &config),
            vec![text("speed "), inline("v"), text(" m/s")]
        );
    }

    #[test]
    fn display_delimiters_take_precedence() {
        let config = TypesetConfig::default();
        assert_eq!(
            split_math("$$x^2$$ and $y$", &config),
            vec![
                Segment::Math {
                    source: "x^2".into(),
                    display: true
                },
                text(" and "),
                inline("y"),
            ]
        );
    }

    #[test]
    fn unclosed_delimiter_stays_literal() {
        let config = TypesetConfig::default();
        assert_eq!(split_math("costs $5", &config), vec![text("costs $5")]);
        assert!(has_unclosed_delimiter("costs $5", &config));
        assert!(!has_unclosed_delimiter("$a$ and $b$", &config));
    }

    #[test]
    fn custom_delimiters() {
        let config = TypesetConfig {
            inline_math: vec![["\\(".into(), "\\)".into()]],
            display_math: vec![],
            ..Default::default()
        };
        assert_eq!(
            split_math("a \\(x\\) $y$", &config),
            vec![text("a "), inline("x"), text(" $y$")]
        );
    }

    #[test]
    fn browser_config_suppresses_chrome() {
        let value = TypesetConfig::default().to_browser_config();
        assert_eq!(value["messageStyle"], "none");
        assert_eq!(value["showProcessingMessages"], false);
        assert_eq!(value["showMathMenu"], false);
        assert_eq!(value["loader"]["load"][0], "[tex]/html");
        assert_eq!(value["tex"]["packages"]["[+]"][0], "html");
        assert_eq!(value["tex"]["inlineMath"][0][0], "$");
        assert_eq!(value["tex"]["displayMath"][0][1], "$$");
        assert_eq!(value["HTML-CSS"]["linebreaks"]["automatic"], true);
    }

    #[test]
    fn config_parses_from_toml() {
        let config: TypesetConfig = toml::from_str(
            r#"
packages = ["html", "ams"]
inline_math = [["$", "$"], ["\\(", "\\)"]]
"#,
        )
        .unwrap();
        assert_eq!(config.packages.len(), 2);
        assert_eq!(config.inline_math[1][0], "\\(");
        assert_eq!(config.display_math, default_display_math());
        assert!(!config.show_math_menu);
    }

    struct FailingTypesetter;

    #[async_trait]
    impl Typesetter for FailingTypesetter {
        fn name(&self) -> &str {
            "failing"
        }

        async fn typeset(&self, text: &str) -> Result<String, TypesetError> {
            if text.contains("bad") {
                Err(TypesetError::Backend("bad input".into()))
            } else {
                Ok(text.to_uppercase())
            }
        }
    }

    #[tokio::test]
    async fn spawn_typesetting_writes_failure_render() {
        let surface = Arc::new(TypesetSurface::new());
        let options = vec![AnswerOption::new("A", "good"), AnswerOption::new("B", "bad")];
        spawn_typesetting(
            Arc::new(FailingTypesetter),
            options,
            Arc::clone(&surface),
        )
        .await
        .unwrap();

        let a = surface.fragment("A").unwrap();
        assert_eq!(a.body, "GOOD");
        assert_eq!(a.label, "A.");
        assert!(!a.failed);

        let b = surface.fragment("B").unwrap();
        assert_eq!(b.body, "bad");
        assert!(b.failed);
    }

    #[tokio::test]
    async fn malformed_math_falls_back_to_source() {
        let surface = Arc::new(TypesetSurface::new());
        let deep = format!("${}x{}$", "{".repeat(10_000), "}".repeat(10_000));
        let options = vec![
            AnswerOption::new("A", "$\\frac{1}$"),
            AnswerOption::new("B", deep.clone()),
            AnswerOption::new("C", "$\\alpha$"),
        ];
        spawn_typesetting(
            Arc::new(crate::tex::UnicodeTypesetter::new(TypesetConfig::default())),
            options,
            Arc::clone(&surface),
        )
        .await
        .unwrap();

        let a = surface.fragment("A").unwrap();
        assert!(a.failed);
        assert_eq!(a.body, "$\\frac{1}$");

        let b = surface.fragment("B").unwrap();
        assert!(b.failed);
        assert_eq!(b.body, deep);

        assert_eq!(surface.fragment("C").unwrap().body, "α");
    }
}
