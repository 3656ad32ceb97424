//! Conditional ANSI coloring of console text.
//!
//! Escapes are intentionally plain SGR sequences so that build logs piped
//! through `less -R` or CI log viewers render the same way everywhere.

use anstyle::{Reset, Style};

/// Text colors understood by [`Colorizer::colorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    /// Bold text in the terminal's default foreground color.
    Bold,
}

impl Color {
    /// All base colors in SGR order, `Bold` excluded.
    pub const BASE: [Color; 8] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];

    /// SGR foreground code for the base colors, `None` for `Bold`.
    pub fn sgr_code(self) -> Option<u8> {
        match self {
            Color::Black => Some(30),
            Color::Red => Some(31),
            Color::Green => Some(32),
            Color::Yellow => Some(33),
            Color::Blue => Some(34),
            Color::Magenta => Some(35),
            Color::Cyan => Some(36),
            Color::White => Some(37),
            Color::Bold => None,
        }
    }

    /// Escape sequence that starts this color.
    pub fn start_sequence(self) -> String {
        match self.sgr_code() {
            Some(code) => format!("\x1b[1;{code}m"),
            None => Style::new().bold().render().to_string(),
        }
    }
}

/// Wraps text in color escapes when enabled; otherwise a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colorizer {
    enabled: bool,
}

impl Colorizer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Return `text` wrapped in the escapes for `color`, or unchanged when
    /// coloring is disabled.
    pub fn colorize(&self, color: Color, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        format!("{}{}{}", color.start_sequence(), text, Reset.render())
    }
}

impl Default for Colorizer {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Decide at runtime whether color escapes should be emitted on stderr.
/// Honors the de-facto standard `NO_COLOR` environment variable so users can
/// globally disable ANSI sequences.
pub fn stderr_supports_color() -> bool {
    use crossterm::tty::IsTty;

    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_tty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_colors_use_offset_codes() {
        let c = Colorizer::new(true);
        for (idx, color) in Color::BASE.iter().enumerate() {
            let expected = format!("\x1b[1;{}mtext\x1b[0m", 30 + idx);
            assert_eq!(c.colorize(*color, "text"), expected);
        }
    }

    #[test]
    fn bold_has_its_own_prefix() {
        let c = Colorizer::new(true);
        assert_eq!(c.colorize(Color::Bold, "loud"), "\x1b[1mloud\x1b[0m");
    }

    #[test]
    fn disabled_returns_text_verbatim() {
        let c = Colorizer::new(false);
        for color in Color::BASE.iter().chain([Color::Bold].iter()) {
            assert_eq!(c.colorize(*color, "plain"), "plain");
        }
    }
}
