//! Syntax collaborators consumed by the diagnostics: whitespace classification and the
//! current quote strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Character classification supplied by the input syntax table.
pub trait SyntaxTable {
    /// True if `ch` is syntactic whitespace.
    fn is_space(&self, ch: char) -> bool;
}

/// The default classification: ASCII blanks, including vertical tab.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSyntax;

impl SyntaxTable for DefaultSyntax {
    fn is_space(&self, ch: char) -> bool {
        matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
    }
}

pub const DEFAULT_LEFT_QUOTE: &str = "`";
pub const DEFAULT_RIGHT_QUOTE: &str = "'";

/// The current left and right quote strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSet {
    pub left: String,
    pub right: String,
}

impl QuoteSet {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Appends `text` to `dest`, wrapped in the quotes when `quoted` is set.
    pub fn push_quoted<W: fmt::Write + ?Sized>(
        &self,
        dest: &mut W,
        text: &str,
        quoted: bool,
    ) -> fmt::Result {
        if quoted {
            dest.write_str(&self.left)?;
        }
        dest.write_str(text)?;
        if quoted {
            dest.write_str(&self.right)?;
        }
        Ok(())
    }
}

impl Default for QuoteSet {
    fn default() -> Self {
        Self::new(DEFAULT_LEFT_QUOTE, DEFAULT_RIGHT_QUOTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_syntax_spaces() {
        let syntax = DefaultSyntax;
        for ch in [' ', '\t', '\n', '\r', '\x0b', '\x0c'] {
            assert!(syntax.is_space(ch), "{ch:?} should be space");
        }
        assert!(!syntax.is_space('x'));
        assert!(!syntax.is_space('\u{a0}'));
    }

    #[test]
    fn test_push_quoted() {
        let quotes = QuoteSet::new("[", "]");
        let mut out = String::new();
        quotes.push_quoted(&mut out, "a", true).unwrap();
        quotes.push_quoted(&mut out, "b", false).unwrap();
        assert_eq!(out, "[a]b");
        assert_eq!(QuoteSet::default(), QuoteSet::new("`", "'"));
    }
}
