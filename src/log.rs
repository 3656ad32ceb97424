//! Leveled, colored diagnostics on standard error.
//!
//! Whether escapes are emitted is decided once per process: either
//! explicitly through [`init_color`] (the CLI does this for `--no-color`) or
//! lazily on the first message from [`stderr_supports_color`].

use std::sync::OnceLock;

use crate::color::{stderr_supports_color, Color, Colorizer};

static COLORIZER: OnceLock<Colorizer> = OnceLock::new();

/// Fix the process-wide color decision. Returns `false` when it was already
/// made, in which case the earlier decision stays in effect.
pub fn init_color(enabled: bool) -> bool {
    COLORIZER.set(Colorizer::new(enabled)).is_ok()
}

fn colorizer() -> Colorizer {
    *COLORIZER.get_or_init(|| Colorizer::new(stderr_supports_color()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn color(self) -> Color {
        match self {
            Level::Info => Color::Blue,
            Level::Warning => Color::Yellow,
            Level::Error => Color::Red,
        }
    }

    /// Line prefix, including the blank line that separates messages from
    /// preceding tool output.
    pub fn prefix(self) -> &'static str {
        match self {
            Level::Info => "\nINFO: ",
            Level::Warning => "\nWARNING: ",
            Level::Error => "\nERROR: ",
        }
    }
}

/// Build the (possibly colored) text for a single diagnostic.
pub fn format_line(colorizer: &Colorizer, level: Level, message: &str) -> String {
    colorizer.colorize(level.color(), &format!("{}{}", level.prefix(), message))
}

fn emit(level: Level, message: &str) {
    eprintln!("{}", format_line(&colorizer(), level, message));
}

/// Emit a blue informational message and continue.
pub fn info(message: &str) {
    emit(Level::Info, message);
}

/// Emit a yellow warning and continue.
pub fn warning(message: &str) {
    emit(Level::Warning, message);
}

/// Emit a red error message and exit with status 1.
pub fn die(message: &str) -> ! {
    emit(Level::Error, message);
    std::process::exit(1)
}
