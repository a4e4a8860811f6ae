//! Legacy game chat colors and the backtick color macros used in
//! configurable templates.

use std::fmt;

/// Prefix character of a color code on the wire.
pub const COLOR_CHAR: char = '\u{a7}';

/// Prefix of a color macro in templates, e.g. `` `r `` for red.
pub const MACRO_CHAR: char = '`';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl ChatColor {
    /// The code character following [`COLOR_CHAR`].
    pub fn code(self) -> char {
        match self {
            ChatColor::Black => '0',
            ChatColor::DarkBlue => '1',
            ChatColor::DarkGreen => '2',
            ChatColor::DarkAqua => '3',
            ChatColor::DarkRed => '4',
            ChatColor::DarkPurple => '5',
            ChatColor::Gold => '6',
            ChatColor::Gray => '7',
            ChatColor::DarkGray => '8',
            ChatColor::Blue => '9',
            ChatColor::Green => 'a',
            ChatColor::Aqua => 'b',
            ChatColor::Red => 'c',
            ChatColor::LightPurple => 'd',
            ChatColor::Yellow => 'e',
            ChatColor::White => 'f',
        }
    }

    /// Maps the character after a backtick to its color.
    pub fn from_macro(c: char) -> Option<Self> {
        let color = match c {
            'r' => ChatColor::Red,
            'R' => ChatColor::DarkRed,
            'y' => ChatColor::Yellow,
            'Y' => ChatColor::Gold,
            'g' => ChatColor::Green,
            'G' => ChatColor::DarkGreen,
            'c' => ChatColor::Aqua,
            'C' => ChatColor::DarkAqua,
            'b' => ChatColor::Blue,
            'B' => ChatColor::DarkBlue,
            'p' => ChatColor::LightPurple,
            'P' => ChatColor::DarkPurple,
            '0' => ChatColor::Black,
            '1' => ChatColor::DarkGray,
            '2' => ChatColor::Gray,
            'w' => ChatColor::White,
            _ => return None,
        };
        Some(color)
    }
}

impl fmt::Display for ChatColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COLOR_CHAR}{}", self.code())
    }
}

/// Expands backtick color macros in a single pass.
///
/// Unknown macros are left as-is, so a literal backtick survives unless it
/// happens to precede one of the sixteen macro letters.
pub fn replace_color_macros(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == MACRO_CHAR {
            if let Some(color) = chars.peek().copied().and_then(ChatColor::from_macro) {
                chars.next();
                out.push(COLOR_CHAR);
                out.push(color.code());
                continue;
            }
        }
        out.push(c);
    }

    out
}

/// Removes color codes, for consoles that cannot render them.
pub fn strip_colors(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == COLOR_CHAR {
            chars.next();
            continue;
        }
        out.push(c);
    }

    out
}
