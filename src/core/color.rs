// src/core/color.rs

/// The handful of ANSI styles the status line needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiColor {
    Reset,
    Red,
    Green,
}

/// Converts an `AnsiColor` enum into its raw ANSI escape code representation.
pub fn ansi_color_to_code(color: AnsiColor) -> &'static str {
    match color {
        AnsiColor::Reset => "\x1b[0m",
        AnsiColor::Red => "\x1b[31m",
        AnsiColor::Green => "\x1b[32m",
    }
}

/// Wraps `text` in `color` and a trailing reset.
///
/// Raw codes are emitted unconditionally; whether to paint at all is the
/// caller's decision, which keeps output independent of tty detection.
pub fn paint(text: &str, color: AnsiColor) -> String {
    format!(
        "{}{}{}",
        ansi_color_to_code(color),
        text,
        ansi_color_to_code(AnsiColor::Reset)
    )
}
