//! DEC private modes (`CSI ? Pm h/l`) and ANSI modes (`CSI Pm h/l`)

use std::io::Read;

use tracing::{debug, warn};

use super::terminal::CharacterTerminal;
use super::Emulator;
use crate::parser::Arguments;

impl<R: Read, T: CharacterTerminal> Emulator<R, T> {
    pub(super) fn dec_modes(&mut self, args: &Arguments, enable: bool) {
        if args.is_empty() {
            debug!("DEC mode without arguments ignored");
        }
        for &mode in args.ints() {
            self.dec_mode(mode, enable);
        }
    }

    fn dec_mode(&mut self, mode: i32, enable: bool) {
        debug!("DEC mode {} = {}", mode, enable);
        match mode {
            1 => self.state.modes.application_cursor_keys = enable,
            3 => {
                self.term.set_columns(if enable { 132 } else { 80 });
                self.state.clear_region();
                self.reset_tabs();
                self.set_cursor(0, 0);
                self.term.clear_all();
                self.fire_resized();
            }
            4 => self.state.modes.slow_scroll = enable,
            5 => self.term.set_reverse_video(enable),
            6 => {
                self.state.modes.origin_mode = enable;
                if enable {
                    let (y1, _) = self.state.region(self.term.num_rows());
                    self.set_cursor(0, y1);
                } else {
                    self.state.clear_region();
                    self.set_cursor(0, 0);
                }
            }
            7 => self.state.modes.auto_wrap = enable,
            12 => self.term.set_cursor_blink(enable),
            25 => self.term.set_cursor_visible(enable),
            45 | 47 | 1047 => {
                if !self.term.set_alt_screen_buffer(enable) && enable {
                    warn!("Terminal has no alternate screen buffer");
                }
            }
            1004 => self.state.modes.focus_events = enable,
            1034 => debug!("Meta key mode {} ignored", enable),
            1048 => {
                if enable {
                    self.save_cursor();
                } else {
                    self.restore_cursor();
                }
            }
            1049 => {
                if enable {
                    self.save_cursor();
                    self.state.modes.application_cursor_keys = true;
                    if !self.term.set_alt_screen_buffer(true) {
                        warn!("Terminal has no alternate screen buffer");
                    }
                    self.term.clear_all();
                } else {
                    self.state.modes.application_cursor_keys = false;
                    self.term.set_alt_screen_buffer(false);
                    self.restore_cursor();
                }
            }
            2004 => self.state.modes.bracketed_paste = enable,
            _ => warn!("Unknown DEC mode {} = {}", mode, enable),
        }
    }

    pub(super) fn ansi_modes(&mut self, args: &Arguments, enable: bool) {
        for &mode in args.ints() {
            match mode {
                4 => {
                    debug!("Insert mode = {}", enable);
                    self.state.modes.insert_mode = enable;
                }
                _ => warn!("Unknown ANSI mode {} = {}", mode, enable),
            }
        }
    }
}
