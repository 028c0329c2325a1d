//! Deterministic snapshot generation
//!
//! Snapshots capture the screen state in a serializable format for testing
//! and for the headless runner. The same byte stream always produces the
//! same snapshot.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color, DrawStyle};
use super::screen::Screen;
use crate::emulator::{CharSet, CharacterTerminal};

/// A complete snapshot of the screen state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub cols: usize,
    pub rows: usize,
    /// Visible grid content (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
    pub cursor: CursorSnapshot,
    /// Charset slot invoked into GL and the designation of each slot
    pub charset: usize,
    pub charsets: Vec<CharSet>,
    pub alternate_screen: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse_video: bool,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub content: String,
    pub fg: ColorSnapshot,
    pub bg: ColorSnapshot,
    pub style: StyleSnapshot,
    /// 0 for a blank cell, 1 normal, 2 wide
    pub width: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSnapshot {
    Default,
    Indexed { index: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub faint: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: usize,
    pub row: usize,
    pub visible: bool,
    pub blinking: bool,
}

impl From<Color> for ColorSnapshot {
    fn from(color: Color) -> Self {
        match color {
            Color::Default => ColorSnapshot::Default,
            Color::Indexed(index) => ColorSnapshot::Indexed { index },
            Color::Rgb(r, g, b) => ColorSnapshot::Rgb { r, g, b },
        }
    }
}

impl From<DrawStyle> for StyleSnapshot {
    fn from(style: DrawStyle) -> Self {
        StyleSnapshot {
            bold: style.contains(DrawStyle::BOLD),
            faint: style.contains(DrawStyle::FAINT),
            italic: style.contains(DrawStyle::ITALIC),
            underline: style.contains(DrawStyle::UNDERSCORE),
            blink: style.contains(DrawStyle::BLINK),
            inverse: style.contains(DrawStyle::INVERSE),
            hidden: style.contains(DrawStyle::HIDDEN),
            strikethrough: style.contains(DrawStyle::STRIKETHROUGH),
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            content: cell.content.clone(),
            fg: cell.fg.into(),
            bg: cell.bg.into(),
            style: cell.style.into(),
            width: cell.width().min(2) as u8,
        }
    }
}

impl Snapshot {
    /// Create a snapshot from the current screen state
    pub fn from_screen(screen: &Screen) -> Self {
        let cols = screen.num_columns();
        let rows = screen.num_rows();

        let grid = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| {
                        screen
                            .cell(col, row)
                            .map(CellSnapshot::from)
                            .unwrap_or_else(|| CellSnapshot::from(&Cell::default()))
                    })
                    .collect()
            })
            .collect();

        let (col, row) = screen.cursor();
        Snapshot {
            cols,
            rows,
            grid,
            cursor: CursorSnapshot {
                col,
                row,
                visible: screen.cursor_visible(),
                blinking: screen.cursor_blink(),
            },
            charset: screen.charset(),
            charsets: (0..4).map(|slot| screen.charset_name(slot)).collect(),
            alternate_screen: screen.is_alternate(),
            reverse_video: screen.reverse_video(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text of the screen, trailing blanks and empty lines removed
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            for cell in row {
                if cell.content.is_empty() {
                    result.push(' ');
                } else {
                    result.push_str(&cell.content);
                }
            }
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare grid contents, ignoring cursor and modes
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.cols == other.cols && self.rows == other.rows && self.grid == other.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_screen() {
        let mut screen = Screen::new(10, 3);
        screen.put_char(b"H", 0, 0);
        screen.put_char(b"i", 1, 0);
        screen.set_cursor(2, 0);

        let snapshot = Snapshot::from_screen(&screen);

        assert_eq!(snapshot.cols, 10);
        assert_eq!(snapshot.rows, 3);
        assert_eq!(snapshot.grid[0][0].content, "H");
        assert_eq!(snapshot.grid[0][1].content, "i");
        assert_eq!(snapshot.grid[0][2].width, 0);
        assert_eq!(snapshot.cursor.col, 2);
        assert_eq!(snapshot.charsets.len(), 4);
    }

    #[test]
    fn test_snapshot_to_text() {
        let mut screen = Screen::new(10, 3);
        screen.put_char(b"A", 0, 0);
        screen.put_char(b"B", 1, 0);
        screen.put_char(b"C", 0, 1);

        let text = Snapshot::from_screen(&screen).to_text();
        assert_eq!(text, "AB\nC\n");
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut screen = Screen::new(5, 2);
        screen.put_char(b"X", 0, 0);
        screen.set_draw_style(DrawStyle::BOLD);
        screen.set_draw_foreground(Color::RED);
        screen.put_char(b"Y", 1, 0);

        let snapshot = Snapshot::from_screen(&screen);
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();

        assert!(snapshot.content_equals(&restored));
        assert!(restored.grid[0][1].style.bold);
        assert_eq!(restored.grid[0][1].fg, ColorSnapshot::Indexed { index: 1 });
    }

    #[test]
    fn test_color_snapshot() {
        assert_eq!(ColorSnapshot::from(Color::Default), ColorSnapshot::Default);
        assert_eq!(
            ColorSnapshot::from(Color::Rgb(255, 128, 0)),
            ColorSnapshot::Rgb { r: 255, g: 128, b: 0 }
        );
    }

    #[test]
    fn test_style_snapshot() {
        let snapshot = StyleSnapshot::from(DrawStyle::BOLD | DrawStyle::UNDERSCORE);
        assert!(snapshot.bold);
        assert!(snapshot.underline);
        assert!(!snapshot.italic);
    }
}
