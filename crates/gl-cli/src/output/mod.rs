//! Output formatting utilities for the CLI
//!
//! Coloured, symbol-prefixed status lines. Success and info go to stdout,
//! warnings and errors to stderr.

use std::io::Write;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use gl_core::PromptState;

fn print_styled(mut out: impl Write, color: Color, symbol: &str, msg: &str) {
    let _ = crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(symbol),
        Print(" "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    print_styled(std::io::stdout(), Color::Green, "✓", msg);
}

/// Print an error message in red with an X prefix
pub fn print_error(msg: &str) {
    print_styled(std::io::stderr(), Color::Red, "✗", msg);
}

/// Print a warning message in yellow with a warning symbol prefix
pub fn print_warning(msg: &str) {
    print_styled(std::io::stderr(), Color::Yellow, "⚠", msg);
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    print_styled(std::io::stdout(), Color::Cyan, "ℹ", msg);
}

/// Show a broker notice that needs no answer
pub fn print_notice(prompt: &PromptState) {
    if prompt.category == "error" {
        print_warning(&prompt.text);
    } else {
        print_info(&prompt.text);
    }
}

/// Write a prompt without a trailing newline
pub fn print_prompt(text: &str) {
    let mut stdout = std::io::stdout();
    let text = if text.ends_with(' ') {
        text.to_string()
    } else {
        format!("{} ", text)
    };
    let _ = crossterm::execute!(stdout, SetForegroundColor(Color::Cyan), Print(text), ResetColor);
    let _ = stdout.flush();
}
