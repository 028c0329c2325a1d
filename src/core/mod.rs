//! Headless Terminal Core
//!
//! An in-memory character surface for the emulator:
//! - Cell representation with colours and draw style
//! - Grid with block copy, area clear and region scrolling
//! - Screen with primary and alternate buffers, implementing `CharacterTerminal`
//! - Deterministic snapshot generation

mod cell;
mod grid;
mod screen;
mod snapshot;

pub use cell::{Cell, Color, DrawStyle};
pub use grid::{Grid, Row};
pub use screen::Screen;
pub use snapshot::{CellSnapshot, ColorSnapshot, CursorSnapshot, Snapshot, StyleSnapshot};
