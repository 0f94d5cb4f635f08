//! Built-in typesetter that approximates TeX math with Unicode text.
//!
//! Covers the subset that shows up in answer options: Greek letters, common
//! relations and operators, digit super/subscripts, `\sqrt`, and fractions.
//! Anything it does not know is passed through verbatim.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TypesetError;
use crate::typeset::{split_math, Segment, TypesetConfig, Typesetter};

/// Deepest group or argument nesting the parser follows.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Typesetter producing plain Unicode text suitable for monospace output.
#[derive(Debug, Clone, Default)]
pub struct UnicodeTypesetter {
    config: TypesetConfig,
    latency: Duration,
}

impl UnicodeTypesetter {
    pub fn new(config: TypesetConfig) -> Self {
        Self {
            config,
            latency: Duration::ZERO,
        }
    }

    /// Delay every `typeset` call, mimicking a collaborator that finishes
    /// some time after it was invoked.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl Typesetter for UnicodeTypesetter {
    fn name(&self) -> &str {
        "unicode"
    }

    async fn typeset(&self, text: &str) -> Result<String, TypesetError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        typeset_text(text, &self.config)
    }
}

/// Typeset a whole option text synchronously.
pub fn typeset_text(text: &str, config: &TypesetConfig) -> Result<String, TypesetError> {
    let mut out = String::new();
    for segment in split_math(text, config) {
        match segment {
            Segment::Text(t) => out.push_str(&t),
            Segment::Math { source, .. } => out.push_str(&math_to_unicode(&source)?),
        }
    }
    Ok(out)
}

/// Convert one math expression (without delimiters) to Unicode.
pub fn math_to_unicode(source: &str) -> Result<String, TypesetError> {
    let mut parser = MathParser {
        source,
        chars: source.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let out = parser.sequence(false)?;
    Ok(collapse_spaces(&out))
}

struct MathParser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl MathParser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unbalanced(&self) -> TypesetError {
        TypesetError::UnbalancedBraces(self.source.to_string())
    }

    /// Run `f` one nesting level deeper, failing past the limit.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, TypesetError>,
    ) -> Result<T, TypesetError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(TypesetError::TooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    /// Parse until end of input, or until the `}` closing the current group.
    fn sequence(&mut self, in_group: bool) -> Result<String, TypesetError> {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                '}' => {
                    if !in_group {
                        return Err(self.unbalanced());
                    }
                    self.pos += 1;
                    return Ok(out);
                }
                '{' => {
                    self.pos += 1;
                    out.push_str(&self.nested(|p| p.sequence(true))?);
                }
                '\\' => out.push_str(&self.command()?),
                '^' | '_' => {
                    self.pos += 1;
                    let name = if ch == '^' { "superscript" } else { "subscript" };
                    let arg = self.argument(name)?;
                    out.push_str(&script(&arg, ch == '^'));
                }
                c if c.is_whitespace() => {
                    self.pos += 1;
                    out.push(' ');
                }
                c => {
                    self.pos += 1;
                    out.push(c);
                }
            }
        }
        if in_group {
            return Err(self.unbalanced());
        }
        Ok(out)
    }

    /// Parse one argument: a braced group, a command, or a single character.
    fn argument(&mut self, command: &str) -> Result<String, TypesetError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        match self.peek() {
            None | Some('}') => Err(TypesetError::MissingArgument {
                command: command.to_string(),
            }),
            Some('{') => {
                self.pos += 1;
                Ok(self.nested(|p| p.sequence(true))?.trim().to_string())
            }
            Some('\\') => self.nested(|p| p.command()),
            Some(c) => {
                self.pos += 1;
                Ok(c.to_string())
            }
        }
    }

    /// Parse a `\name` command, `self.pos` pointing at the backslash.
    fn command(&mut self) -> Result<String, TypesetError> {
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos == start {
            // Control symbol such as `\,` or `\{`.
            let Some(c) = self.peek() else {
                return Ok("\\".to_string());
            };
            self.pos += 1;
            return Ok(match c {
                ',' | ';' | ':' | ' ' | '\\' => " ".to_string(),
                '!' => String::new(),
                other => other.to_string(),
            });
        }

        let name: String = self.chars[start..self.pos].iter().collect();
        match name.as_str() {
            "sqrt" => {
                let arg = self.argument(&name)?;
                Ok(format!("√{}", wrap_if_compound(&arg)))
            }
            "frac" | "cfrac" | "dfrac" | "tfrac" => {
                let num = self.argument(&name)?;
                let den = self.argument(&name)?;
                Ok(format!("{}/{}", wrap_if_compound(&num), wrap_if_compound(&den)))
            }
            "text" | "textrm" | "mathrm" | "mathbf" | "mathit" | "operatorname" | "mathbb" => {
                self.argument(&name)
            }
            "left" | "right" | "displaystyle" | "limits" | "big" | "Big" => Ok(String::new()),
            "quad" | "qquad" => Ok(" ".to_string()),
            "sin" | "cos" | "tan" | "log" | "ln" | "exp" | "lim" | "max" | "min" => Ok(name.clone()),
            _ => Ok(symbol(&name)
                .map(String::from)
                .unwrap_or_else(|| format!("\\{name}"))),
        }
    }
}

fn wrap_if_compound(arg: &str) -> String {
    if arg.chars().count() > 1 {
        format!("({arg})")
    } else {
        arg.to_string()
    }
}

/// Render a super/subscript, falling back to `^(...)` when some character
/// has no Unicode script form.
fn script(arg: &str, superscript: bool) -> String {
    let mapped: Option<String> = arg
        .chars()
        .map(|c| {
            if superscript {
                superscript_char(c)
            } else {
                subscript_char(c)
            }
        })
        .collect();
    match mapped {
        Some(s) => s,
        None if superscript => format!("^{}", wrap_if_compound(arg)),
        None => format!("_{}", wrap_if_compound(arg)),
    }
}

fn superscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

fn subscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'o' => 'ₒ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" | "vartheta" => "θ",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "propto" => "∝",
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "ne" | "neq" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "infty" => "∞",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" => "⇒",
        "leftrightarrow" => "↔",
        "rightleftharpoons" => "⇌",
        "partial" => "∂",
        "nabla" => "∇",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "circ" => "∘",
        "degree" => "°",
        "ldots" | "dots" => "…",
        "cdots" => "⋯",
        "in" => "∈",
        "angle" => "∠",
        "perp" => "⊥",
        "parallel" => "∥",
        "hbar" => "ℏ",
        _ => return None,
    })
}

fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
