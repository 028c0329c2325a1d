//! Terminal surface and listener traits
//!
//! The emulator never owns pixels or cells. It drives a [`CharacterTerminal`]
//! and reports session events to [`EmulatorListener`]s.

use serde::{Deserialize, Serialize};

use crate::core::{Color, DrawStyle};

/// National replacement and graphic character sets selectable by SCS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CharSet {
    /// DEC special graphics (line drawing)
    Graphics,
    Uk,
    #[default]
    Us,
    Dutch,
    Finnish,
    French,
    German,
    Swedish,
    NorDanish,
    /// Any designator without a specific mapping
    Other,
}

impl CharSet {
    /// Map the final character of an SCS sequence
    pub fn from_designator(c: char) -> Self {
        match c {
            '0' | '\u{0f}' => CharSet::Graphics,
            'A' => CharSet::Uk,
            'B' => CharSet::Us,
            '4' => CharSet::Dutch,
            'C' | '5' => CharSet::Finnish,
            'E' | '6' => CharSet::NorDanish,
            'H' | '7' => CharSet::Swedish,
            'K' => CharSet::German,
            'R' | 'Q' => CharSet::French,
            _ => CharSet::Other,
        }
    }

    /// Glyph for a 7-bit character drawn in this set
    pub fn translate(self, c: char) -> char {
        match self {
            CharSet::Graphics => dec_special_graphics(c),
            CharSet::Uk if c == '#' => '£',
            _ => c,
        }
    }
}

/// DEC special graphics, 0x5F-0x7E map to line drawing and symbols
fn dec_special_graphics(c: char) -> char {
    match c {
        '_' => ' ',
        '`' => '◆',
        'a' => '▒',
        'b' => '␉',
        'c' => '␌',
        'd' => '␍',
        'e' => '␊',
        'f' => '°',
        'g' => '±',
        'h' => '␤',
        'i' => '␋',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        _ => c,
    }
}

/// Character-cell surface driven by the emulator.
///
/// Coordinates are zero based, `x` is the column and `y` the row. Areas use
/// an inclusive start and an exclusive end.
pub trait CharacterTerminal {
    fn num_rows(&self) -> usize;
    fn num_columns(&self) -> usize;

    /// Cursor position as `(x, y)`
    fn cursor(&self) -> (usize, usize);
    fn set_cursor(&mut self, x: usize, y: usize);

    /// Draw one character at the cursor with the current draw style.
    /// The cursor does not move.
    fn write_char(&mut self, bytes: &[u8]);

    /// Draw one character at `(x, y)` with the current draw style
    fn put_char(&mut self, bytes: &[u8], x: usize, y: usize);

    /// Copy a `w` x `h` block from `(x, y)` to `(to_x, to_y)`
    fn move_region(&mut self, x: usize, y: usize, w: usize, h: usize, to_x: usize, to_y: usize);

    fn clear_area(&mut self, x1: usize, y1: usize, x2: usize, y2: usize);

    fn clear_all(&mut self) {
        let (columns, rows) = (self.num_columns(), self.num_rows());
        self.clear_area(0, 0, columns, rows);
    }

    /// Scroll rows `[y1, y2)` by `lines`, up or down
    fn scroll_region(&mut self, y1: usize, y2: usize, lines: usize, up: bool);

    /// Invoke charset slot G0..G3 into GL
    fn set_charset(&mut self, slot: usize);
    fn charset(&self) -> usize;
    fn set_charset_name(&mut self, slot: usize, charset: CharSet);
    fn charset_name(&self, slot: usize) -> CharSet;

    fn draw_style(&self) -> DrawStyle;
    fn set_draw_style(&mut self, style: DrawStyle);
    fn draw_foreground(&self) -> Color;
    fn set_draw_foreground(&mut self, color: Color);
    fn draw_background(&self) -> Color;
    fn set_draw_background(&mut self, color: Color);

    fn set_columns(&mut self, columns: usize);
    fn set_columns_and_rows(&mut self, columns: usize, rows: usize);

    /// Switch to or from the alternate buffer. Returns false when the
    /// surface has no alternate buffer.
    fn set_alt_screen_buffer(&mut self, _enabled: bool) -> bool {
        false
    }

    fn set_cursor_visible(&mut self, _visible: bool) {}

    fn set_cursor_blink(&mut self, _blink: bool) {}

    fn set_reverse_video(&mut self, _reverse: bool) {}

    /// RGB value of a colour-map entry
    fn color(&self, index: u8) -> (u8, u8, u8) {
        Color::indexed_to_rgb(index)
    }

    fn set_color(&mut self, _index: u8, _rgb: (u8, u8, u8)) {}

    fn beep(&mut self) {}
}

/// Session events published by the emulator
pub trait EmulatorListener: Send {
    fn emulator_started(&mut self) {}

    fn emulator_stopped(&mut self) {}

    /// OSC 0/1/2: `kind` is the OSC number
    fn notify_title(&mut self, _kind: i32, _title: &str) {}

    fn notify_resized(&mut self, _columns: usize, _rows: usize) {}
}
