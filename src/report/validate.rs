//! Argument checks shared by the builtins.
//!
//! None of these terminate on their own: problems are reported through the warning channel and
//! the caller decides what to do with the result. The only way out early is a warning made fatal
//! by configuration, which surfaces as an [`Exit`].

use std::fmt;

use crate::syntax::SyntaxTable;
use crate::trace::TokenData;
use crate::{DiagContext, Exit};

impl DiagContext {
    /// Warns when a builtin received an unexpected number of arguments.
    ///
    /// `argc` counts the macro name plus the supplied arguments; `min` and `max` bound the
    /// supplied arguments alone, `None` leaving the upper end open. Returns `true` only when
    /// too few arguments were given and the macro has no side effects, meaning the call may
    /// expand to nothing. Extra arguments are ignored and processing continues.
    pub fn check_arg_count(
        &mut self,
        name: &str,
        argc: usize,
        min: usize,
        max: Option<usize>,
        side_effect: bool,
    ) -> Result<bool, Exit> {
        let supplied = argc.saturating_sub(1);
        if supplied < min {
            self.warn(
                0,
                format_args!("{name}: too few arguments: {supplied} < {min}"),
            )?;
            return Ok(!side_effect);
        }
        if let Some(max) = max {
            if supplied > max {
                self.warn(
                    0,
                    format_args!("{name}: extra arguments ignored: {supplied} > {max}"),
                )?;
            }
        }
        Ok(false)
    }

    /// Parses a decimal argument of builtin `name`.
    ///
    /// Leading and trailing syntactic whitespace is ignored. Blank text is 0 with a warning.
    /// Anything else that is not an optionally signed decimal integer is warned about and yields
    /// `None`. Values beyond the range of `i64` saturate.
    pub fn numeric_arg(&mut self, name: &str, text: &str) -> Result<Option<i64>, Exit> {
        let syntax = self.syntax();
        let trimmed = skip_space(syntax, text);
        if trimmed.is_empty() {
            self.warn(0, format_args!("{name}: empty string treated as 0"))?;
            return Ok(Some(0));
        }

        let value = match parse_decimal(trimmed) {
            (Some(value), rest) if skip_space(syntax, rest).is_empty() => Some(value),
            _ => None,
        };
        if value.is_none() {
            self.warn(0, format_args!("{name}: non-numeric argument `{text}'"))?;
        }
        Ok(value)
    }

    /// Writes `args` to `dest` separated by `separator`, each wrapped in the current quotes when
    /// `quoted` is set. Builtin references contribute empty text.
    pub fn dump_args<W: fmt::Write + ?Sized>(
        &self,
        dest: &mut W,
        args: &[TokenData],
        separator: &str,
        quoted: bool,
    ) -> fmt::Result {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                dest.write_str(separator)?;
            }
            self.quotes().push_quoted(&mut *dest, arg.as_text(), quoted)?;
        }
        Ok(())
    }
}

fn skip_space<'a>(syntax: &dyn SyntaxTable, text: &'a str) -> &'a str {
    text.trim_start_matches(|ch: char| syntax.is_space(ch))
}

/// Reads an optionally signed run of decimal digits from the front of `text`.
///
/// Returns the value (if any digits were present) and the unconsumed remainder.
fn parse_decimal(text: &str) -> (Option<i64>, &str) {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, text);
    }

    let mut value: i64 = 0;
    for b in unsigned[..digits].bytes() {
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    (Some(value), &unsigned[digits..])
}
