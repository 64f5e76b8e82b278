//! Text colors.

// plan is to follow the ANSI 8-bit standard. see article on Wikipedia.
// https://en.wikipedia.org/wiki/ANSI_escape_code#CSI_(Control_Sequence_Introducer)_sequences

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Color {
    pub fg: u8,
    pub bg: u8,
}

impl Color {
    pub const fn new(fg: u8, bg: u8) -> Color {
        Color { fg, bg }
    }

    /// Returns this color with its foreground replaced by `fg`.
    pub const fn with_fg(self, fg: u8) -> Color {
        Color { fg, ..self }
    }
}

// predefined colors

pub const RED: u8 = 1;
pub const GREEN: u8 = 2;
pub const YELLOW: u8 = 3;
pub const BLUE: u8 = 4;
pub const MAGENTA: u8 = 5;
pub const CYAN: u8 = 6;
pub const WHITE: u8 = 7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_foreground() {
        let color = Color::new(WHITE, 232);
        assert_eq!(color.with_fg(GREEN), Color::new(GREEN, 232));
    }
}
