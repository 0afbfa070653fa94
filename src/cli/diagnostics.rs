//! Presentation of setup failures: bad configuration, unreadable scripts, invalid flags.
//!
//! These are reported through miette's graphical handler, so the code and help text attached
//! to each [`DiagError`] variant reach the user. Diagnostics produced while replaying a script
//! go through the reporter instead and keep the plain `prog:file:line:` format.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};

use crate::DiagError;

/// Renders `error` as a multi-line report, coloured when `color` is set.
pub fn render(error: &DiagError, color: bool) -> String {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme);
    let mut out = String::new();
    if handler
        .render_report(&mut out, error as &dyn Diagnostic)
        .is_err()
    {
        // Fall back to the plain message.
        out = format!("Error: {error}\n");
    }
    out
}
