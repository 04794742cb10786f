//! Terminal styling and color detection for text output.

/// ANSI escape codes used by the text renderer.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    /// Bold reverse green for the visited start tag.
    pub const TAG_HERE: &str = "\x1b[1;7;32m";
    /// Bold reverse yellow for the next stop tag.
    pub const TAG_NEXT: &str = "\x1b[1;7;33m";
    /// Bold reverse cyan for intermediate stops.
    pub const TAG_STOP: &str = "\x1b[1;7;36m";
    /// Bold reverse magenta for the final stop.
    pub const TAG_GOAL: &str = "\x1b[1;7;35m";

    /// Bright bold white for system names.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for distances and decorations.
    pub const GRAY: &str = "\x1b[90m";
    /// Green for mission markers.
    pub const GREEN: &str = "\x1b[32m";
    /// Orange (256-color) for station names.
    pub const ORANGE: &str = "\x1b[38;5;208m";
}

/// Resolved color codes, empty strings when color is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_here: &'static str,
    pub tag_next: &'static str,
    pub tag_stop: &'static str,
    pub tag_goal: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub green: &'static str,
    pub orange: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_here: colors::TAG_HERE,
            tag_next: colors::TAG_NEXT,
            tag_stop: colors::TAG_STOP,
            tag_goal: colors::TAG_GOAL,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            green: colors::GREEN,
            orange: colors::ORANGE,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_here: "",
            tag_next: "",
            tag_stop: "",
            tag_goal: "",
            white_bold: "",
            gray: "",
            green: "",
            orange: "",
        }
    }

    /// Colored when the terminal supports it, plain otherwise.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

/// Whether ANSI colors should be emitted.
///
/// Honours `NO_COLOR` (https://no-color.org/) and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}

/// Format a number with thousand separators, e.g. `1,234,567`.
///
/// ```
/// # use galnav_cli::terminal::format_with_separators;
/// assert_eq!(format_with_separators(999), "999");
/// assert_eq!(format_with_separators(6784404), "6,784,404");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
