//! Terminal Cell
//!
//! A single grid position: its character and the rendition it was drawn with.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Character rendition bits set by SGR
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct DrawStyle: u16 {
        const BOLD          = 0b0000_0000_0001;
        const FAINT         = 0b0000_0000_0010;
        const ITALIC        = 0b0000_0000_0100;
        const UNDERSCORE    = 0b0000_0000_1000;
        const BLINK         = 0b0000_0001_0000;
        const INVERSE       = 0b0000_0010_0000;
        const HIDDEN        = 0b0000_0100_0000;
        const STRIKETHROUGH = 0b0000_1000_0000;
    }
}

/// A single cell in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    /// The character in this cell, empty when blank. Holds the decoded
    /// text, or U+FFFD for bytes that are not valid UTF-8.
    pub content: String,
    pub fg: Color,
    pub bg: Color,
    pub style: DrawStyle,
}

impl Cell {
    pub fn new(c: char) -> Self {
        Self {
            content: c.to_string(),
            ..Default::default()
        }
    }

    /// Cell drawn from raw character bytes with the given rendition
    pub fn from_bytes(bytes: &[u8], fg: Color, bg: Color, style: DrawStyle) -> Self {
        Self {
            content: String::from_utf8_lossy(bytes).into_owned(),
            fg,
            bg,
            style,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Display width of this cell's content
    pub fn width(&self) -> usize {
        if self.content.is_empty() {
            return 0;
        }
        use unicode_width::UnicodeWidthStr;
        self.content.width()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Color representation supporting indexed and RGB colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// 256-color palette index
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Convert a 256-color index to RGB using the xterm palette
    pub fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
        match index {
            0 => (0, 0, 0),
            1 => (205, 0, 0),
            2 => (0, 205, 0),
            3 => (205, 205, 0),
            4 => (0, 0, 238),
            5 => (205, 0, 205),
            6 => (0, 205, 205),
            7 => (229, 229, 229),
            8 => (127, 127, 127),
            9 => (255, 0, 0),
            10 => (0, 255, 0),
            11 => (255, 255, 0),
            12 => (92, 92, 255),
            13 => (255, 0, 255),
            14 => (0, 255, 255),
            15 => (255, 255, 255),
            // 6x6x6 color cube
            16..=231 => {
                let n = index - 16;
                let to_rgb = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                (to_rgb(n / 36), to_rgb((n % 36) / 6), to_rgb(n % 6))
            }
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                (gray, gray, gray)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_default() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell.fg, Color::Default);
        assert_eq!(cell.style, DrawStyle::empty());
    }

    #[test]
    fn test_cell_from_bytes() {
        let cell = Cell::from_bytes("é".as_bytes(), Color::RED, Color::Default, DrawStyle::BOLD);
        assert_eq!(cell.content, "é");
        assert_eq!(cell.fg, Color::RED);
        assert!(cell.style.contains(DrawStyle::BOLD));

        let invalid = Cell::from_bytes(&[0xFF], Color::Default, Color::Default, DrawStyle::empty());
        assert_eq!(invalid.content, "\u{FFFD}");
    }

    #[test]
    fn test_cell_clear() {
        let mut cell = Cell::new('A');
        cell.fg = Color::RED;
        cell.style |= DrawStyle::BOLD;
        cell.clear();
        assert!(cell.is_empty());
        assert_eq!(cell.fg, Color::Default);
        assert!(cell.style.is_empty());
    }

    #[test]
    fn test_style_bits_accumulate() {
        let mut style = DrawStyle::BOLD;
        style |= DrawStyle::UNDERSCORE;
        assert!(style.contains(DrawStyle::BOLD | DrawStyle::UNDERSCORE));
        style.remove(DrawStyle::BOLD);
        assert_eq!(style, DrawStyle::UNDERSCORE);
    }

    #[test]
    fn test_color_indexed_to_rgb() {
        assert_eq!(Color::indexed_to_rgb(0), (0, 0, 0));
        assert_eq!(Color::indexed_to_rgb(15), (255, 255, 255));
        assert_eq!(Color::indexed_to_rgb(16), (0, 0, 0));
        assert_eq!(Color::indexed_to_rgb(231), (255, 255, 255));
        assert_eq!(Color::indexed_to_rgb(232), (8, 8, 8));
        assert_eq!(Color::indexed_to_rgb(255), (238, 238, 238));
    }

    #[test]
    fn test_cell_width() {
        assert_eq!(Cell::new('A').width(), 1);
        assert_eq!(Cell::new('中').width(), 2);
        assert_eq!(Cell::default().width(), 0);
    }
}
