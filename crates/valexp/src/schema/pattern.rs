//! The `pattern` keyword
//!
//! OpenAPI patterns follow ECMAScript regular expression syntax. Sources are
//! rewritten before compiling so the `regex` engine agrees with it:
//!
//! - `\d`, `\w` and `\b` (and their negations) are ASCII-only
//! - `\b` inside a character class is a backspace
//! - `[`, `&` and `~` inside a character class are literals
//! - escaped punctuation the engine does not treat as special (`\/`) is a
//!   plain literal
//!
//! `\B` keeps its Unicode meaning: the engine cannot run an ASCII `\B`
//! over UTF-8 text. Lookaround and backreferences are rejected at compile
//! time.

use std::fmt;

use regex::Regex;

/// A regular expression compiled once during normalization.
///
/// Matching is unanchored, like ECMAScript `RegExp.test`.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&translate(source))?;
        Ok(Self {
            source: source.to_owned(),
            regex,
        })
    }

    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// The pattern as written in the schema.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

/// Rewrites an ECMAScript pattern into `regex` syntax.
fn translate(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 16);
    let mut chars = source.chars();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    // Dangling escape; let the engine report it.
                    out.push('\\');
                    break;
                };
                out.push_str(&escape(escaped, in_class));
            }
            '[' if in_class => out.push_str(r"\["),
            '&' | '~' if in_class => {
                out.push('\\');
                out.push(c);
            }
            '[' => {
                in_class = true;
                out.push(c);
                // A leading `]` or `^]` is literal in `regex` but closes the class here.
                let rest = chars.as_str();
                let negated = rest.starts_with('^');
                if negated {
                    out.push('^');
                    chars.next();
                }
                if chars.as_str().starts_with(']') {
                    chars.next();
                    in_class = false;
                    // `[]` never matches, `[^]` matches anything.
                    out.truncate(out.len() - if negated { 2 } else { 1 });
                    out.push_str(if negated { r"[\s\S]" } else { r"[^\s\S]" });
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

fn escape(c: char, in_class: bool) -> String {
    let ascii_class = |name: &str| {
        if in_class {
            format!("[:{name}:]")
        } else {
            format!("[[:{name}:]]")
        }
    };

    match c {
        'd' => ascii_class("digit"),
        'D' => ascii_class("^digit"),
        'w' => ascii_class("word"),
        'W' => ascii_class("^word"),
        'b' if in_class => r"\x08".to_owned(),
        'b' => r"(?-u:\b)".to_owned(),
        c if c.is_ascii_punctuation() => regex::escape(c.encode_utf8(&mut [0; 4])),
        c => format!("\\{c}"),
    }
}
