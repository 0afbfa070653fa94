//! A deliberately tiny printf-like renderer for trace lines.
//!
//! Only five directives are understood:
//!
//! | directive | argument | output                                                    |
//! |-----------|----------|-----------------------------------------------------------|
//! | `%S`      | string   | the string, cut to the maximum length followed by `...`   |
//! | `%s`      | string   | the string in full                                         |
//! | `%d`      | integer  | decimal text                                               |
//! | `%l`      | none     | the left quote if `QUOTE` is enabled, otherwise nothing    |
//! | `%r`      | none     | the right quote if `QUOTE` is enabled, otherwise nothing   |
//!
//! Any other character after `%` produces nothing. Arguments are consumed positionally; handing
//! an argument of the wrong kind for its directive is a caller bug.

use std::fmt::Write;

use crate::debug::{AppendBuffer, DebugLevel};
use crate::syntax::QuoteSet;

/// Appended after a string cut by `%S`.
pub const TRUNCATION_MARKER: &str = "...";

/// One positional argument for [`trace_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceArg<'a> {
    Str(&'a str),
    Int(i64),
}

impl<'a> From<&'a str> for TraceArg<'a> {
    fn from(s: &'a str) -> Self {
        TraceArg::Str(s)
    }
}

impl From<i64> for TraceArg<'_> {
    fn from(n: i64) -> Self {
        TraceArg::Int(n)
    }
}

impl From<u32> for TraceArg<'_> {
    fn from(n: u32) -> Self {
        TraceArg::Int(i64::from(n))
    }
}

impl From<usize> for TraceArg<'_> {
    fn from(n: usize) -> Self {
        TraceArg::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

/// Settings the formatter consults.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions<'a> {
    pub level: DebugLevel,
    /// Maximum number of characters `%S` copies; 0 means unlimited.
    pub max_arg_length: usize,
    pub quotes: &'a QuoteSet,
}

/// Renders `template` with `args` onto the end of `buf`.
pub fn trace_format(
    buf: &mut AppendBuffer,
    opts: &FormatOptions<'_>,
    template: &str,
    args: &[TraceArg<'_>],
) {
    let mut args = args.iter();
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            let mut utf8 = [0u8; 4];
            buf.push_str(ch.encode_utf8(&mut utf8));
            continue;
        }
        match chars.next() {
            Some('S') => push_truncated(buf, next_str(&mut args), opts.max_arg_length),
            Some('s') => buf.push_str(next_str(&mut args)),
            Some('d') => {
                let n = match args.next() {
                    Some(TraceArg::Int(n)) => *n,
                    other => {
                        debug_assert!(false, "%d expects an integer, got {other:?}");
                        0
                    }
                };
                let _ = write!(buf, "{n}");
            }
            Some('l') if opts.level.contains(DebugLevel::QUOTE) => buf.push_str(&opts.quotes.left),
            Some('r') if opts.level.contains(DebugLevel::QUOTE) => {
                buf.push_str(&opts.quotes.right)
            }
            Some(_) => {}
            None => break,
        }
    }
}

fn next_str<'a>(args: &mut std::slice::Iter<'_, TraceArg<'a>>) -> &'a str {
    match args.next() {
        Some(TraceArg::Str(s)) => s,
        other => {
            debug_assert!(false, "%s/%S expects a string, got {other:?}");
            ""
        }
    }
}

fn push_truncated(buf: &mut AppendBuffer, s: &str, max_len: usize) {
    if max_len == 0 {
        buf.push_str(s);
        return;
    }
    match s.char_indices().nth(max_len) {
        Some((cut, _)) => {
            buf.push_str(&s[..cut]);
            buf.push_str(TRUNCATION_MARKER);
        }
        None => buf.push_str(s),
    }
}
