use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};
use thiserror::Error;

const THEME_NAME: &str = "base16-ocean.dark";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("no syntax for language: {0}")]
    UnknownLanguage(String),

    #[error("highlight theme not available: {0}")]
    ThemeMissing(&'static str),

    #[error("highlight failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Colors a fenced code block. Callers fall back to the plain block on error.
pub trait Highlight {
    fn highlight(&self, code: &str, language: &str) -> Result<Vec<String>, HighlightError>;
}

/// Syntect-backed highlighter; syntax and theme sets load on first use.
#[derive(Default)]
pub struct SyntectHighlighter {
    assets: OnceLock<Option<(SyntaxSet, Theme)>>,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    fn assets(&self) -> Option<&(SyntaxSet, Theme)> {
        self.assets
            .get_or_init(|| {
                let mut themes = ThemeSet::load_defaults();
                let theme = themes.themes.remove(THEME_NAME)?;
                Some((SyntaxSet::load_defaults_newlines(), theme))
            })
            .as_ref()
    }
}

impl Highlight for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<Vec<String>, HighlightError> {
        let (syntaxes, theme) = self
            .assets()
            .ok_or(HighlightError::ThemeMissing(THEME_NAME))?;
        let syntax = syntaxes
            .find_syntax_by_token(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut out = Vec::new();
        for line in LinesWithEndings::from(code) {
            let ranges = highlighter.highlight_line(line, syntaxes)?;
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            let escaped = escaped.trim_end_matches(['\n', '\r']);
            out.push(format!("{escaped}{RESET}"));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_is_an_error() {
        let highlighter = SyntectHighlighter::new();
        let result = highlighter.highlight("x", "definitely-not-a-language");
        assert!(matches!(result, Err(HighlightError::UnknownLanguage(_))));
    }

    #[test]
    fn highlights_known_language_line_by_line() {
        let highlighter = SyntectHighlighter::new();
        let lines = highlighter
            .highlight("fn main() {}\nlet x = 1;\n", "rust")
            .expect("highlight");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("main"));
        assert!(lines[0].contains("\x1b["));
    }
}
