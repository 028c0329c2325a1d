//! Headless screen
//!
//! An in-memory [`CharacterTerminal`] with primary and alternate buffers.
//! Used by the headless runner and as the surface in tests.

use tracing::trace;

use super::cell::{Cell, Color, DrawStyle};
use super::grid::Grid;
use crate::emulator::{CharSet, CharacterTerminal};

/// The main screen structure
#[derive(Debug, Clone)]
pub struct Screen {
    primary: Grid,
    alternate: Grid,
    on_alternate: bool,
    cursor_x: usize,
    cursor_y: usize,
    /// Slot invoked into GL
    charset_slot: usize,
    charsets: [CharSet; 4],
    style: DrawStyle,
    fg: Color,
    bg: Color,
    palette: Vec<(u8, u8, u8)>,
    cursor_visible: bool,
    cursor_blink: bool,
    reverse_video: bool,
    bells: usize,
}

impl Screen {
    /// Create a new screen. Zero dimensions are raised to one.
    pub fn new(cols: usize, rows: usize) -> Self {
        let (cols, rows) = (cols.max(1), rows.max(1));
        Self {
            primary: Grid::new(cols, rows),
            alternate: Grid::new(cols, rows),
            on_alternate: false,
            cursor_x: 0,
            cursor_y: 0,
            charset_slot: 0,
            charsets: [CharSet::Us; 4],
            style: DrawStyle::empty(),
            fg: Color::Default,
            bg: Color::Default,
            palette: (0..=255).map(Color::indexed_to_rgb).collect(),
            cursor_visible: true,
            cursor_blink: false,
            reverse_video: false,
            bells: 0,
        }
    }

    /// Active grid
    pub fn grid(&self) -> &Grid {
        if self.on_alternate {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn grid_mut(&mut self) -> &mut Grid {
        if self.on_alternate {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.grid().cell(col, row)
    }

    pub fn is_alternate(&self) -> bool {
        self.on_alternate
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn cursor_blink(&self) -> bool {
        self.cursor_blink
    }

    pub fn reverse_video(&self) -> bool {
        self.reverse_video
    }

    /// Number of BEL characters received
    pub fn bells(&self) -> usize {
        self.bells
    }

    /// Text of one row with blanks as spaces and trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> String {
        let Some(line) = self.grid().row(row) else {
            return String::new();
        };
        let mut text: String = line
            .cells
            .iter()
            .map(|c| if c.is_empty() { " " } else { c.content.as_str() })
            .collect();
        text.truncate(text.trim_end_matches(' ').len());
        text
    }

    fn make_cell(&self, bytes: &[u8]) -> Cell {
        let mut cell = Cell::from_bytes(bytes, self.fg, self.bg, self.style);
        if let [byte] = bytes {
            if byte.is_ascii() {
                let glyph = self.charsets[self.charset_slot].translate(char::from(*byte));
                cell.content = glyph.to_string();
            }
        }
        cell
    }

    fn resize(&mut self, cols: usize, rows: usize) {
        let (cols, rows) = (cols.max(1), rows.max(1));
        trace!("Resizing screen to {}x{}", cols, rows);
        self.primary.resize(cols, rows);
        self.alternate.resize(cols, rows);
        self.cursor_x = self.cursor_x.min(cols - 1);
        self.cursor_y = self.cursor_y.min(rows - 1);
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl CharacterTerminal for Screen {
    fn num_rows(&self) -> usize {
        self.grid().rows()
    }

    fn num_columns(&self) -> usize {
        self.grid().cols()
    }

    fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    fn set_cursor(&mut self, x: usize, y: usize) {
        self.cursor_x = x.min(self.num_columns() - 1);
        self.cursor_y = y.min(self.num_rows() - 1);
    }

    fn write_char(&mut self, bytes: &[u8]) {
        let (x, y) = self.cursor();
        self.put_char(bytes, x, y);
    }

    fn put_char(&mut self, bytes: &[u8], x: usize, y: usize) {
        let cell = self.make_cell(bytes);
        if let Some(target) = self.grid_mut().cell_mut(x, y) {
            *target = cell;
        }
    }

    fn move_region(&mut self, x: usize, y: usize, w: usize, h: usize, to_x: usize, to_y: usize) {
        self.grid_mut().move_region(x, y, w, h, to_x, to_y);
    }

    fn clear_area(&mut self, x1: usize, y1: usize, x2: usize, y2: usize) {
        self.grid_mut().clear_area(x1, y1, x2, y2);
    }

    fn clear_all(&mut self) {
        self.grid_mut().clear();
    }

    fn scroll_region(&mut self, y1: usize, y2: usize, lines: usize, up: bool) {
        self.grid_mut().scroll(y1, y2, lines, up);
    }

    fn set_charset(&mut self, slot: usize) {
        self.charset_slot = slot.min(3);
    }

    fn charset(&self) -> usize {
        self.charset_slot
    }

    fn set_charset_name(&mut self, slot: usize, charset: CharSet) {
        if let Some(entry) = self.charsets.get_mut(slot) {
            *entry = charset;
        }
    }

    fn charset_name(&self, slot: usize) -> CharSet {
        self.charsets.get(slot).copied().unwrap_or_default()
    }

    fn draw_style(&self) -> DrawStyle {
        self.style
    }

    fn set_draw_style(&mut self, style: DrawStyle) {
        self.style = style;
    }

    fn draw_foreground(&self) -> Color {
        self.fg
    }

    fn set_draw_foreground(&mut self, color: Color) {
        self.fg = color;
    }

    fn draw_background(&self) -> Color {
        self.bg
    }

    fn set_draw_background(&mut self, color: Color) {
        self.bg = color;
    }

    fn set_columns(&mut self, columns: usize) {
        let rows = self.num_rows();
        self.resize(columns, rows);
    }

    fn set_columns_and_rows(&mut self, columns: usize, rows: usize) {
        self.resize(columns, rows);
    }

    fn set_alt_screen_buffer(&mut self, enabled: bool) -> bool {
        self.on_alternate = enabled;
        true
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn set_cursor_blink(&mut self, blink: bool) {
        self.cursor_blink = blink;
    }

    fn set_reverse_video(&mut self, reverse: bool) {
        self.reverse_video = reverse;
    }

    fn color(&self, index: u8) -> (u8, u8, u8) {
        self.palette[usize::from(index)]
    }

    fn set_color(&mut self, index: u8, rgb: (u8, u8, u8)) {
        self.palette[usize::from(index)] = rgb;
    }

    fn beep(&mut self) {
        self.bells += 1;
    }
}
