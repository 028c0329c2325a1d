//! Emulator state
//!
//! Everything the emulator remembers between tokens that the terminal
//! surface does not: scroll region, modes, tab stops and the saved cursor.

use std::collections::BTreeSet;

use super::terminal::CharSet;
use crate::core::{Color, DrawStyle};

pub const DEFAULT_TAB_SIZE: usize = 8;

/// DEC private and ANSI mode flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecMode {
    /// Pending wrap: the last write hit the right margin
    pub lcf: bool,
    pub auto_wrap: bool,
    pub origin_mode: bool,
    pub bracketed_paste: bool,
    pub focus_events: bool,
    pub application_cursor_keys: bool,
    pub application_keypad: bool,
    pub slow_scroll: bool,
    pub insert_mode: bool,
}

impl Default for DecMode {
    fn default() -> Self {
        Self {
            lcf: false,
            auto_wrap: true,
            origin_mode: false,
            bracketed_paste: false,
            focus_events: true,
            application_cursor_keys: false,
            application_keypad: false,
            slow_scroll: false,
            insert_mode: false,
        }
    }
}

/// Cursor state stored by DECSC and mode 1048
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCursor {
    pub x: usize,
    pub y: usize,
    pub lcf: bool,
    pub style: DrawStyle,
    pub fg: Color,
    pub bg: Color,
    pub charset: usize,
    pub charset_name: CharSet,
}

/// Horizontal tab stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStops {
    stops: BTreeSet<usize>,
}

impl TabStops {
    /// Stops every `size` columns
    pub fn new(size: usize, columns: usize) -> Self {
        let mut tabs = Self {
            stops: BTreeSet::new(),
        };
        tabs.reset(size, columns);
        tabs
    }

    pub fn reset(&mut self, size: usize, columns: usize) {
        self.stops = (size.max(1)..columns).step_by(size.max(1)).collect();
    }

    pub fn set(&mut self, column: usize) {
        self.stops.insert(column);
    }

    pub fn clear(&mut self, column: usize) {
        self.stops.remove(&column);
    }

    pub fn clear_all(&mut self) {
        self.stops.clear();
    }

    /// Next stop after `column`, or the last column
    pub fn next(&self, column: usize, columns: usize) -> usize {
        let last = columns.saturating_sub(1);
        self.stops
            .range(column + 1..)
            .next()
            .copied()
            .unwrap_or(last)
            .min(last)
    }

    /// Previous stop before `column`, or column 0
    pub fn previous(&self, column: usize) -> usize {
        self.stops.range(..column).next_back().copied().unwrap_or(0)
    }

    pub fn is_set(&self, column: usize) -> bool {
        self.stops.contains(&column)
    }
}

#[derive(Debug, Clone)]
pub struct EmulatorState {
    /// Scroll region, first row inclusive, last row exclusive
    pub region_y1: usize,
    pub region_y2: usize,
    pub has_region: bool,
    pub tab_size: usize,
    pub tabs: TabStops,
    pub saved: Option<SavedCursor>,
    pub modes: DecMode,
    /// Raw bytes of the last printed character, for REP
    pub last_char: Vec<u8>,
}

impl EmulatorState {
    pub fn new(tab_size: usize, columns: usize) -> Self {
        Self {
            region_y1: 0,
            region_y2: 0,
            has_region: false,
            tab_size,
            tabs: TabStops::new(tab_size, columns),
            saved: None,
            modes: DecMode::default(),
            last_char: Vec::new(),
        }
    }

    /// Effective scroll region for a screen of `rows` rows
    pub fn region(&self, rows: usize) -> (usize, usize) {
        let y2 = self.region_y2.min(rows);
        if self.has_region && self.region_y1 < y2 {
            (self.region_y1, y2)
        } else {
            (0, rows)
        }
    }

    pub fn set_region(&mut self, y1: usize, y2: usize, rows: usize) {
        self.region_y1 = y1;
        self.region_y2 = y2;
        self.has_region = !(y1 == 0 && y2 >= rows);
    }

    pub fn clear_region(&mut self) {
        self.region_y1 = 0;
        self.region_y2 = 0;
        self.has_region = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_modes() {
        let modes = DecMode::default();
        assert!(modes.auto_wrap);
        assert!(!modes.origin_mode);
        assert!(!modes.lcf);
    }

    #[test]
    fn test_default_tab_stops() {
        let tabs = TabStops::new(DEFAULT_TAB_SIZE, 80);
        assert!(tabs.is_set(8));
        assert!(tabs.is_set(72));
        assert!(!tabs.is_set(0));
        assert_eq!(tabs.next(0, 80), 8);
        assert_eq!(tabs.next(8, 80), 16);
        assert_eq!(tabs.next(75, 80), 79);
        assert_eq!(tabs.previous(17), 16);
        assert_eq!(tabs.previous(3), 0);
    }

    #[test]
    fn test_tab_set_and_clear() {
        let mut tabs = TabStops::new(8, 40);
        tabs.set(3);
        assert_eq!(tabs.next(0, 40), 3);
        tabs.clear(3);
        assert_eq!(tabs.next(0, 40), 8);
        tabs.clear_all();
        assert_eq!(tabs.next(0, 40), 39);
    }

    #[test]
    fn test_region() {
        let mut state = EmulatorState::new(8, 80);
        assert_eq!(state.region(24), (0, 24));

        state.set_region(2, 10, 24);
        assert!(state.has_region);
        assert_eq!(state.region(24), (2, 10));
        // Shrunk below the region
        assert_eq!(state.region(8), (2, 8));
        assert_eq!(state.region(2), (0, 2));

        state.set_region(0, 24, 24);
        assert!(!state.has_region);

        state.set_region(1, 5, 24);
        state.clear_region();
        assert_eq!(state.region(24), (0, 24));
    }
}
