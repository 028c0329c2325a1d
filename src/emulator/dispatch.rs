//! Token dispatch
//!
//! Applies one token and its arguments to the emulator state and the
//! terminal surface.

use std::io::Read;
use std::mem;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use super::reply;
use super::sgr;
use super::state::SavedCursor;
use super::terminal::{CharSet, CharacterTerminal};
use super::{Emulator, EmulatorResult};
use crate::core::{Color, DrawStyle};
use crate::parser::{pretty_bytes, Arguments, Token};

/// Minimum duration of one scroll in slow scroll mode
const SLOW_SCROLL: Duration = Duration::from_millis(100);

/// Largest grid a host may request through XTWINOPS
pub const MAX_COLUMNS: usize = 1000;
pub const MAX_ROWS: usize = 1000;

/// Move `value` by `delta`, clamped to `[min, max]`
fn step(value: usize, delta: isize, min: usize, max: usize) -> usize {
    let moved = if delta < 0 {
        value.saturating_sub(delta.unsigned_abs())
    } else {
        value.saturating_add(delta as usize)
    };
    moved.min(max).max(min)
}

/// One-based argument to zero-based coordinate
fn coordinate(arg: i32) -> usize {
    (arg.max(1) - 1) as usize
}

impl<R: Read, T: CharacterTerminal> Emulator<R, T> {
    pub(super) fn dispatch(&mut self, token: Token) -> EmulatorResult<()> {
        if token == Token::Char {
            self.print_current();
            return Ok(());
        }

        let args = self.tokenizer.args().clone();
        debug!("{} {}", token, args);

        match token {
            Token::Eof | Token::Eot => {
                debug!("End of session: {}", token);
                self.control.signal_terminate();
            }
            Token::Bel => self.term.beep(),
            Token::Bs | Token::Del => self.backspace(),
            Token::Ht => self.tab(),
            Token::Lf | Token::Vt | Token::Ff | Token::Index => self.line_feed(),
            Token::Cr => self.carriage_return(),
            Token::NextLine => {
                self.line_feed();
                self.carriage_return();
            }
            Token::ReverseIndex => self.reverse_index(),
            Token::CharsetG0 => self.term.set_charset(0),
            Token::CharsetG1 => self.term.set_charset(1),
            Token::CharsetG0Des => self.designate(0, &args),
            Token::CharsetG1Des => self.designate(1, &args),
            Token::CharsetG2Des => self.designate(2, &args),
            Token::CharsetG3Des => self.designate(3, &args),
            Token::SaveCursor => self.save_cursor(),
            Token::RestoreCursor => self.restore_cursor(),
            Token::TabSet => {
                let (x, _) = self.term.cursor();
                self.state.tabs.set(x);
            }
            Token::ApplicationKeypad => self.state.modes.application_keypad = true,
            Token::NumericKeypad => self.state.modes.application_keypad = false,
            Token::DecScreenAlignment => self.screen_alignment(),

            Token::SendTermId | Token::ReqPrimaryDa => self.reply(reply::PRIMARY_DA)?,
            Token::ReqSecondaryDa => self.reply(reply::SECONDARY_DA)?,
            Token::ReqTertiaryDa => self.reply(reply::TERTIARY_DA)?,
            Token::ReqXtVersion => self.reply(&reply::xt_version())?,
            Token::DeviceStatus => self.device_status(args.arg(0))?,
            Token::XtermWinManipulation => self.window_manipulation(&args)?,
            Token::XtermSetGetGraphics => self.graphics_attributes(&args)?,

            Token::DeviceControlString => self.device_control(&args),
            Token::AppProgramCommand => debug!("Ignoring APC: {}", args),
            Token::OscGraphMode => self.graph_mode(&args)?,

            Token::DecSetMode => self.dec_modes(&args, true),
            Token::DecResetMode => self.dec_modes(&args, false),
            Token::SetMode => self.ansi_modes(&args, true),
            Token::ResetMode => self.ansi_modes(&args, false),
            Token::SetFontStyle => sgr::apply(&mut self.term, args.ints()),

            Token::Up => self.move_cursor(0, -(args.count(0) as isize)),
            Token::Down => self.move_cursor(0, args.count(0) as isize),
            Token::Right => self.move_cursor(args.count(0) as isize, 0),
            Token::Left => self.move_cursor(-(args.count(0) as isize), 0),
            Token::CursorNextLine => {
                self.move_cursor(0, args.count(0) as isize);
                self.carriage_return();
            }
            Token::PrecedingLine => {
                self.move_cursor(0, -(args.count(0) as isize));
                self.carriage_return();
            }
            Token::SetColumn => {
                let (_, y) = self.term.cursor();
                self.set_cursor(coordinate(args.arg(0)), y);
            }
            Token::SetRow => {
                let (x, _) = self.term.cursor();
                let y = coordinate(args.arg(0)) + self.origin_offset();
                self.set_cursor(x, y);
            }
            Token::SetCursor => {
                let y = coordinate(args.arg(0)) + self.origin_offset();
                self.set_cursor(coordinate(args.arg(1)), y);
            }
            Token::SetRegion => self.set_region(&args),

            Token::ForwardTabs => {
                for _ in 0..args.count(0).min(self.term.num_columns()) {
                    self.tab();
                }
            }
            Token::BackwardTabs => {
                for _ in 0..args.count(0).min(self.term.num_columns()) {
                    self.back_tab();
                }
            }
            Token::TabClear => match args.arg(0) {
                0 => {
                    let (x, _) = self.term.cursor();
                    self.state.tabs.clear(x);
                }
                3 => self.state.tabs.clear_all(),
                mode => warn!("Unknown tab clear mode: {}", mode),
            },

            Token::ScreenErase => self.erase_screen(args.arg(0)),
            Token::LineErase => self.erase_line(args.arg(0)),
            Token::InsertBlankChars => self.insert_chars(args.count(0)),
            Token::DelChar => self.delete_chars(args.count(0)),
            Token::EraseChars => self.erase_chars(args.count(0)),
            Token::InsertLines => self.insert_lines(args.count(0)),
            Token::DeleteLines => self.delete_lines(args.count(0)),
            Token::ScrollUp => self.scroll_lines(args.count(0), true),
            Token::ScrollDown => {
                if args.len() > 1 {
                    debug!("Ignoring mouse highlight tracking: {}", args);
                } else {
                    self.scroll_lines(args.count(0), false);
                }
            }
            Token::CharacterRepeat => self.repeat(args.count(0)),

            Token::XtermResetModifiers | Token::XtermGetModifiers => {
                debug!("Ignoring key modifier options: {}", args);
            }
            Token::DecLedSet | Token::DecLedTest => debug!("Ignoring {}: {}", token, args),
            Token::StartGuardedArea
            | Token::EndGuardedArea
            | Token::StartOfString
            | Token::StringTerminator
            | Token::PrivacyMessage
            | Token::ExitVt52Mode
            | Token::Nul
            | Token::Soh
            | Token::Stx
            | Token::Etx
            | Token::Enq
            | Token::Ack
            | Token::Can
            | Token::Sub
            | Token::Xon
            | Token::Xoff
            | Token::Esc
            | Token::CsiPrefix
            | Token::OscGraphModePrefix => debug!("Ignoring {}", token),

            Token::Unsupported => {
                let description = self
                    .tokenizer
                    .matched_def()
                    .map(|d| d.description().to_string())
                    .unwrap_or_default();
                debug!(
                    "Unsupported sequence {} ({}) args={}",
                    pretty_bytes(self.tokenizer.bytes()),
                    description,
                    args
                );
            }
            Token::Error => {
                warn!("Unrecognized sequence {}", pretty_bytes(self.tokenizer.bytes()));
            }
            Token::Char => {}
        }
        Ok(())
    }

    // Cursor primitives

    fn origin_offset(&self) -> usize {
        if self.state.modes.origin_mode {
            self.state.region(self.term.num_rows()).0
        } else {
            0
        }
    }

    /// Absolute positioning, clamped to the grid or to the region in origin mode
    pub(super) fn set_cursor(&mut self, x: usize, y: usize) {
        let columns = self.term.num_columns();
        let rows = self.term.num_rows();
        let (min_y, max_y) = if self.state.modes.origin_mode {
            self.state.region(rows)
        } else {
            (0, rows)
        };

        let x = x.min(columns.saturating_sub(1));
        let y = y.min(max_y.saturating_sub(1)).max(min_y);
        trace!("set_cursor({}, {})", x, y);
        self.state.modes.lcf = false;
        self.term.set_cursor(x, y);
    }

    /// Relative movement. Rows stay inside the region when the cursor is
    /// inside it.
    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let (x, y) = self.term.cursor();
        let columns = self.term.num_columns();
        let rows = self.term.num_rows();
        let (mut min_y, mut max_y) = self.state.region(rows);
        if y < min_y || y >= max_y {
            (min_y, max_y) = (0, rows);
        }

        let x = step(x, dx, 0, columns.saturating_sub(1));
        let y = step(y, dy, min_y, max_y.saturating_sub(1));
        self.state.modes.lcf = false;
        self.term.set_cursor(x, y);
    }

    fn carriage_return(&mut self) {
        let (_, y) = self.term.cursor();
        self.state.modes.lcf = false;
        self.term.set_cursor(0, y);
    }

    pub(super) fn line_feed(&mut self) {
        let (x, y) = self.term.cursor();
        let (_, max_y) = self.state.region(self.term.num_rows());
        if y + 1 == max_y {
            self.scroll_lines(1, true);
        } else if y + 1 < self.term.num_rows() {
            self.term.set_cursor(x, y + 1);
        }
        self.state.modes.lcf = false;
    }

    fn reverse_index(&mut self) {
        let (x, y) = self.term.cursor();
        let (min_y, _) = self.state.region(self.term.num_rows());
        if y == min_y {
            self.scroll_lines(1, false);
        } else if y > 0 {
            self.term.set_cursor(x, y - 1);
        }
        self.state.modes.lcf = false;
    }

    fn backspace(&mut self) {
        let (x, y) = self.term.cursor();
        if x > 0 {
            self.term.set_cursor(x - 1, y);
        } else if y > 0 {
            let last = self.term.num_columns().saturating_sub(1);
            self.term.set_cursor(last, y - 1);
        }
        self.state.modes.lcf = false;
    }

    fn tab(&mut self) {
        let (x, y) = self.term.cursor();
        let next = self.state.tabs.next(x, self.term.num_columns());
        self.state.modes.lcf = false;
        self.term.set_cursor(next, y);
    }

    fn back_tab(&mut self) {
        let (x, y) = self.term.cursor();
        let previous = self.state.tabs.previous(x);
        self.state.modes.lcf = false;
        self.term.set_cursor(previous, y);
    }

    /// Scroll the effective region, honouring slow scroll
    fn scroll_lines(&mut self, lines: usize, up: bool) {
        let (y1, y2) = self.state.region(self.term.num_rows());
        let started = Instant::now();
        self.term.scroll_region(y1, y2, lines, up);

        if self.state.modes.slow_scroll {
            let elapsed = started.elapsed();
            if elapsed < SLOW_SCROLL {
                thread::sleep(SLOW_SCROLL - elapsed);
            }
        }
    }

    pub(super) fn save_cursor(&mut self) {
        let (x, y) = self.term.cursor();
        let charset = self.term.charset();
        self.state.saved = Some(SavedCursor {
            x,
            y,
            lcf: self.state.modes.lcf,
            style: self.term.draw_style(),
            fg: self.term.draw_foreground(),
            bg: self.term.draw_background(),
            charset,
            charset_name: self.term.charset_name(charset),
        });
    }

    /// Restore the saved cursor, or home with default rendition if none
    pub(super) fn restore_cursor(&mut self) {
        match self.state.saved.clone() {
            Some(saved) => {
                self.set_cursor(saved.x, saved.y);
                self.state.modes.lcf = saved.lcf;
                self.term.set_draw_style(saved.style);
                self.term.set_draw_foreground(saved.fg);
                self.term.set_draw_background(saved.bg);
                self.term.set_charset_name(saved.charset, saved.charset_name);
                self.term.set_charset(saved.charset);
            }
            None => {
                self.set_cursor(0, 0);
                self.term.set_draw_style(DrawStyle::empty());
                self.term.set_draw_foreground(Color::Default);
                self.term.set_draw_background(Color::Default);
            }
        }
    }

    fn set_region(&mut self, args: &Arguments) {
        let rows = self.term.num_rows();
        if args.is_empty() {
            self.state.clear_region();
        } else {
            let y1 = coordinate(args.arg(0));
            let y2 = match args.arg(1) {
                v if v <= 0 => rows,
                v => (v as usize).min(rows),
            };
            if y1 + 1 >= y2 {
                warn!("Invalid scroll region {}: rows {}..{} of {}", args, y1, y2, rows);
                return;
            }
            self.state.set_region(y1, y2, rows);
        }

        let (y1, _) = self.state.region(rows);
        self.state.modes.lcf = false;
        self.term.set_cursor(0, y1);
    }

    // Characters

    fn print_current(&mut self) {
        let mut bytes = mem::take(&mut self.state.last_char);
        bytes.clear();
        bytes.extend_from_slice(self.tokenizer.bytes());
        trace!("CHAR {}", pretty_bytes(&bytes));
        self.write_char(&bytes);
        self.state.last_char = bytes;
    }

    /// Write at the cursor and advance, wrapping first if a wrap is pending
    fn write_char(&mut self, bytes: &[u8]) {
        if self.state.modes.lcf && self.state.modes.auto_wrap {
            self.line_feed();
            self.carriage_return();
        }

        let columns = self.term.num_columns();
        let (x, y) = self.term.cursor();
        if self.state.modes.insert_mode && x + 1 < columns {
            self.term.move_region(x, y, columns - x - 1, 1, x + 1, y);
        }

        self.term.write_char(bytes);

        if x + 1 >= columns {
            if self.state.modes.auto_wrap {
                self.state.modes.lcf = true;
            }
        } else {
            self.term.set_cursor(x + 1, y);
        }
    }

    fn repeat(&mut self, count: usize) {
        if self.state.last_char.is_empty() {
            debug!("Nothing to repeat");
            return;
        }
        let limit = self.term.num_columns() * self.term.num_rows();
        let bytes = mem::take(&mut self.state.last_char);
        for _ in 0..count.min(limit) {
            self.write_char(&bytes);
        }
        self.state.last_char = bytes;
    }

    fn designate(&mut self, slot: usize, args: &Arguments) {
        match args.char_param() {
            Some(c) => {
                let charset = CharSet::from_designator(c);
                debug!("Designate G{} = {:?} ('{}')", slot, charset, c);
                self.term.set_charset_name(slot, charset);
            }
            None => warn!("Charset designator for G{} without a character", slot),
        }
    }

    fn screen_alignment(&mut self) {
        let columns = self.term.num_columns();
        let (y1, y2) = self.state.region(self.term.num_rows());
        for y in y1..y2 {
            for x in 0..columns {
                self.term.put_char(b"E", x, y);
            }
        }
        self.set_cursor(0, 0);
    }

    // Erase and edit

    fn erase_screen(&mut self, mode: i32) {
        let (x, y) = self.term.cursor();
        let columns = self.term.num_columns();
        let rows = self.term.num_rows();
        match mode {
            0 => {
                self.term.clear_area(x, y, columns, y + 1);
                self.term.clear_area(0, y + 1, columns, rows);
            }
            1 => {
                self.term.clear_area(0, 0, columns, y);
                self.term.clear_area(0, y, x + 1, y + 1);
            }
            2 => self.term.clear_all(),
            3 => debug!("Erase saved lines: no scrollback"),
            _ => warn!("Unknown screen erase mode: {}", mode),
        }
    }

    fn erase_line(&mut self, mode: i32) {
        let (x, y) = self.term.cursor();
        let columns = self.term.num_columns();
        match mode {
            0 => self.term.clear_area(x, y, columns, y + 1),
            1 => self.term.clear_area(0, y, x + 1, y + 1),
            2 => self.term.clear_area(0, y, columns, y + 1),
            _ => warn!("Unknown line erase mode: {}", mode),
        }
    }

    fn insert_chars(&mut self, count: usize) {
        let (x, y) = self.term.cursor();
        let columns = self.term.num_columns();
        let count = count.min(columns.saturating_sub(x));
        let keep = columns.saturating_sub(x + count);
        if keep > 0 {
            self.term.move_region(x, y, keep, 1, x + count, y);
        }
        self.term.clear_area(x, y, x + count, y + 1);
    }

    fn delete_chars(&mut self, count: usize) {
        let (x, y) = self.term.cursor();
        let columns = self.term.num_columns();
        let count = count.min(columns.saturating_sub(x));
        let keep = columns.saturating_sub(x + count);
        if keep > 0 {
            self.term.move_region(x + count, y, keep, 1, x, y);
        }
        self.term.clear_area(columns - count, y, columns, y + 1);
    }

    fn erase_chars(&mut self, count: usize) {
        let (x, y) = self.term.cursor();
        let end = x.saturating_add(count).min(self.term.num_columns());
        self.term.clear_area(x, y, end, y + 1);
    }

    fn insert_lines(&mut self, count: usize) {
        let (_, y) = self.term.cursor();
        let (y1, y2) = self.state.region(self.term.num_rows());
        if y < y1 || y >= y2 {
            debug!("Insert lines outside scroll region ignored");
            return;
        }
        self.term.scroll_region(y, y2, count, false);
    }

    fn delete_lines(&mut self, count: usize) {
        let (_, y) = self.term.cursor();
        let (y1, y2) = self.state.region(self.term.num_rows());
        if y < y1 || y >= y2 {
            debug!("Delete lines outside scroll region ignored");
            return;
        }
        self.term.scroll_region(y, y2, count, true);
    }

    // Replies

    fn device_status(&mut self, mode: i32) -> EmulatorResult<()> {
        match mode {
            5 => self.reply(reply::STATUS_OK),
            6 => {
                // Rows are relative to the region top in origin mode
                let (x, y) = self.term.cursor();
                let y = y.saturating_sub(self.origin_offset());
                self.reply(&reply::cursor_position(x, y))
            }
            _ => {
                debug!("Unknown device status request: {}", mode);
                Ok(())
            }
        }
    }

    fn window_manipulation(&mut self, args: &Arguments) -> EmulatorResult<()> {
        match args.arg(0) {
            8 => {
                let rows = match args.arg(1) {
                    v if v > 0 => v as usize,
                    _ => self.term.num_rows(),
                };
                let columns = match args.arg(2) {
                    v if v > 0 => v as usize,
                    _ => self.term.num_columns(),
                };
                if columns > MAX_COLUMNS || rows > MAX_ROWS {
                    warn!(
                        "Rejecting resize to {}x{}: limit is {}x{}",
                        columns, rows, MAX_COLUMNS, MAX_ROWS
                    );
                    return Ok(());
                }
                self.term.set_columns_and_rows(columns, rows);
                self.reset_tabs();
                self.fire_resized();
                Ok(())
            }
            18 => {
                let (columns, rows) = (self.term.num_columns(), self.term.num_rows());
                self.reply(&reply::text_area_size(columns, rows))
            }
            _ => {
                debug!("Unsupported window manipulation: {}", args);
                Ok(())
            }
        }
    }

    fn graphics_attributes(&mut self, args: &Arguments) -> EmulatorResult<()> {
        let &[item, action, value, ..] = args.ints() else {
            debug!("XTSMGRAPHICS needs three arguments: {}", args);
            return Ok(());
        };
        match (item, action) {
            // Colour registers: read, reset, set, read maximum
            (1, 1) | (1, 4) => self.reply(&reply::graphics_attribute(1, 0, 1024)),
            (1, 2) | (1, 3) => self.reply(&reply::graphics_attribute(1, 0, value)),
            _ => {
                debug!("Unsupported graphics attribute request: {}", args);
                Ok(())
            }
        }
    }

    fn device_control(&self, args: &Arguments) {
        let payload = args.string().unwrap_or_default();
        match payload.strip_prefix("+q") {
            Some(names) => {
                for name in names.split(';') {
                    match reply::hex_decode(name) {
                        Some(decoded) => debug!("XTGETTCAP request: {}", decoded),
                        None => warn!("Malformed XTGETTCAP name: {}", name),
                    }
                }
            }
            None => debug!("Ignoring DCS: {}", payload),
        }
    }

    fn graph_mode(&mut self, args: &Arguments) -> EmulatorResult<()> {
        let kind = args.arg(0);
        let text = args.string().unwrap_or_default();
        match kind {
            0..=2 => {
                debug!("Title ({}): {}", kind, text);
                self.fire_title(kind, text);
                Ok(())
            }
            4 | 5 => self.xterm_colors(kind, text),
            _ => {
                warn!("Unsupported OSC {}: {}", kind, text);
                Ok(())
            }
        }
    }

    /// `index;spec` pairs where spec is `?` or a colour specification
    fn xterm_colors(&mut self, kind: i32, text: &str) -> EmulatorResult<()> {
        let mut parts = text.split(';');
        while let (Some(index), Some(spec)) = (parts.next(), parts.next()) {
            let Ok(index) = index.trim().parse::<u8>() else {
                warn!("Invalid colour index in OSC {}: {}", kind, text);
                return Ok(());
            };
            if spec == "?" {
                let rgb = self.term.color(index);
                self.reply(&reply::color_report(kind, index, rgb))?;
            } else if let Some(rgb) = reply::parse_color_spec(spec) {
                debug!("Setting colour {} to {:?}", index, rgb);
                self.term.set_color(index, rgb);
            } else {
                warn!("Unknown colour specification in OSC {}: {}", kind, spec);
            }
        }
        Ok(())
    }
}
