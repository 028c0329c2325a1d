//! VT100/xterm Emulator
//!
//! Pulls tokens from a [`Tokenizer`], applies them to an [`EmulatorState`]
//! and a [`CharacterTerminal`] surface, and writes replies (device status,
//! device attributes, colour queries) to an output sink.
//!
//! The emulator runs as a blocking loop in [`Emulator::start`]. Another
//! thread can halt, single-step or terminate it through [`EmulatorControl`]
//! and send keystrokes through the shared [`OutputSink`].

mod control;
mod dispatch;
mod modes;
mod reply;
mod sgr;
mod state;
mod terminal;

use std::io::{self, Read, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::app::EmulatorConfig;
use crate::keymap;
use crate::parser::{TableError, Token, TokenTable, Tokenizer, TokenizerError};

pub use control::{EmulatorControl, OutputSink};
pub use dispatch::{MAX_COLUMNS, MAX_ROWS};
pub use state::{DecMode, EmulatorState, SavedCursor, TabStops, DEFAULT_TAB_SIZE};
pub use terminal::{CharSet, CharacterTerminal, EmulatorListener};

/// Emulator errors
#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("invalid token table: {0}")]
    Table(#[from] TableError),

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error("failed to write to host: {0}")]
    Output(#[source] io::Error),
}

pub type EmulatorResult<T> = Result<T, EmulatorError>;

/// Terminal emulator driving a character surface from a byte stream
pub struct Emulator<R, T> {
    tokenizer: Tokenizer<R>,
    term: T,
    state: EmulatorState,
    output: OutputSink,
    control: EmulatorControl,
    listeners: Vec<Box<dyn EmulatorListener>>,
    term_type: String,
    tokens: u64,
}

impl<R: Read, T: CharacterTerminal> Emulator<R, T> {
    /// Create an emulator with the standard token table
    pub fn new<W>(term: T, input: R, output: W) -> EmulatorResult<Self>
    where
        W: Write + Send + 'static,
    {
        let table = Arc::new(TokenTable::standard()?);
        Ok(Self::with_table(term, input, output, table))
    }

    /// Create an emulator sharing an already compiled table
    pub fn with_table<W>(term: T, input: R, output: W, table: Arc<TokenTable>) -> Self
    where
        W: Write + Send + 'static,
    {
        let columns = term.num_columns();
        Self {
            tokenizer: Tokenizer::new(input, table),
            term,
            state: EmulatorState::new(DEFAULT_TAB_SIZE, columns),
            output: OutputSink::new(output),
            control: EmulatorControl::new(),
            listeners: Vec::new(),
            term_type: "xterm".to_string(),
            tokens: 0,
        }
    }

    /// Create an emulator using the terminal type, tab size and wrap mode
    /// from `config`
    pub fn with_config<W>(term: T, input: R, output: W, config: &EmulatorConfig) -> EmulatorResult<Self>
    where
        W: Write + Send + 'static,
    {
        let mut emulator = Self::new(term, input, output)?;
        emulator.term_type = config.term_type.clone();
        emulator.state.tab_size = config.tab_size.max(1);
        emulator.state.modes.auto_wrap = config.auto_wrap;
        emulator.reset_tabs();
        Ok(emulator)
    }

    pub fn add_listener(&mut self, listener: Box<dyn EmulatorListener>) {
        self.listeners.push(listener);
    }

    /// Handle for halting, stepping and terminating the loop
    pub fn control(&self) -> EmulatorControl {
        self.control.clone()
    }

    /// Shared sink for bytes going to the host
    pub fn output(&self) -> OutputSink {
        self.output.clone()
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.term
    }

    pub fn into_terminal(self) -> T {
        self.term
    }

    pub fn state(&self) -> &EmulatorState {
        &self.state
    }

    pub fn term_type(&self) -> &str {
        &self.term_type
    }

    pub fn set_term_type(&mut self, term_type: impl Into<String>) {
        self.term_type = term_type.into();
    }

    /// Number of tokens processed so far
    pub fn token_count(&self) -> u64 {
        self.tokens
    }

    /// Run until end of input or until terminated.
    ///
    /// Dispatch errors are logged and processing continues. An input error
    /// ends the session.
    pub fn start(&mut self) {
        info!("Emulator started, terminal type {}", self.term_type);
        for listener in &mut self.listeners {
            listener.emulator_started();
        }

        while self.control.wait_runnable() {
            match self.next_token() {
                Ok(_) => {}
                Err(EmulatorError::Tokenizer(TokenizerError::Io(e))) => {
                    error!("Reading input failed: {}", e);
                    self.control.signal_terminate();
                }
                Err(e) => warn!("Error while processing input: {}", e),
            }
        }

        info!("Emulator stopped after {} tokens", self.tokens);
        for listener in &mut self.listeners {
            listener.emulator_stopped();
        }
    }

    /// Read and apply one token
    pub fn next_token(&mut self) -> EmulatorResult<Token> {
        let token = self.tokenizer.next_token()?;
        self.tokens += 1;
        self.dispatch(token)?;
        Ok(token)
    }

    /// Write bytes to the host
    pub fn send(&self, bytes: &[u8]) -> io::Result<()> {
        self.output.send(bytes)
    }

    fn reply(&self, bytes: &[u8]) -> EmulatorResult<()> {
        debug!("Reply: {}", crate::parser::pretty_bytes(bytes));
        self.output.send(bytes).map_err(|e| {
            error!("Failed to send reply: {}", e);
            EmulatorError::Output(e)
        })
    }

    /// Byte sequence for a named key in the current cursor key mode
    pub fn key_code(&self, key: &str) -> Option<&'static [u8]> {
        let prefix = if self.state.modes.application_cursor_keys {
            "APP"
        } else {
            self.term_type.as_str()
        };
        let code = keymap::key_code(Some(prefix), key);
        if code.is_none() {
            debug!("No key mapping for {}", key);
        }
        code
    }

    /// `(columns, rows, y1, y2)` of the effective scroll region
    pub fn region(&self) -> (usize, usize, usize, usize) {
        let rows = self.term.num_rows();
        let (y1, y2) = self.state.region(rows);
        (self.term.num_columns(), rows, y1, y2)
    }

    /// Forget region, modes, tab stops and the saved cursor
    pub fn reset_state(&mut self) {
        let auto_wrap = self.state.modes.auto_wrap;
        self.state = EmulatorState::new(self.state.tab_size, self.term.num_columns());
        self.state.modes.auto_wrap = auto_wrap;
    }

    fn reset_tabs(&mut self) {
        let columns = self.term.num_columns();
        self.state.tabs.reset(self.state.tab_size, columns);
    }

    fn fire_resized(&mut self) {
        let (columns, rows) = (self.term.num_columns(), self.term.num_rows());
        info!("Terminal resized to {}x{}", columns, rows);
        for listener in &mut self.listeners {
            listener.notify_resized(columns, rows);
        }
    }

    fn fire_title(&mut self, kind: i32, title: &str) {
        for listener in &mut self.listeners {
            listener.notify_title(kind, title);
        }
    }
}
