//! Streaming Tokenizer
//!
//! Reads one octet at a time from its input, matches the accumulated bytes
//! against the pattern table and returns exactly one token per call. The
//! arguments of that token are available through [`Tokenizer::args`] until
//! the next call.
//!
//! Outside an escape sequence every byte is classified directly: C0 controls
//! become control tokens, printable bytes and UTF-8 sequences become `Char`
//! tokens carrying their raw bytes. After `ESC` the bytes go through the
//! table. A C0 control that does not continue the sequence is handled first
//! and the sequence resumes on the next call.

use std::fmt;
use std::io::{self, Read};
use std::mem;
use std::sync::Arc;

use thiserror::Error;
use tracing::{trace, warn};

use super::ctrl::{self, ESC};
use super::pretty_bytes;
use super::table::{Match, TokenDef, TokenTable};
use super::token::{ParamKind, Token};

/// Maximum number of integer arguments kept per sequence
pub const MAX_INT_ARGS: usize = 16;

const MAX_PATTERN: usize = 256;
const MAX_STRING: usize = 256;

/// Tokenizer errors
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("pushback buffer is occupied, cannot unget 0x{0:02x}")]
    PushbackOverflow(u8),
}

pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Parsed arguments of the last token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    ints: Vec<i32>,
    string: Option<String>,
}

impl Arguments {
    /// Integer arguments in order
    pub fn ints(&self) -> &[i32] {
        &self.ints
    }

    /// Number of integer arguments
    pub fn len(&self) -> usize {
        self.ints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ints.is_empty() && self.string.is_none()
    }

    pub fn int(&self, index: usize) -> Option<i32> {
        self.ints.get(index).copied()
    }

    /// Integer argument, `0` when absent
    pub fn arg(&self, index: usize) -> i32 {
        self.int(index).unwrap_or(0)
    }

    /// Integer argument used as a repeat count: absent or zero means one
    pub fn count(&self, index: usize) -> usize {
        self.arg(index).max(1) as usize
    }

    /// String payload (OSC, DCS, APC) or the charset designator
    pub fn string(&self) -> Option<&str> {
        self.string.as_deref()
    }

    /// Single character parameter of a charset designator
    pub fn char_param(&self) -> Option<char> {
        self.string.as_deref().and_then(|s| s.chars().next())
    }

    fn push_int(&mut self, value: i32) {
        if self.ints.len() < MAX_INT_ARGS {
            self.ints.push(value);
        } else {
            warn!("Dropping integer argument {}: more than {}", value, MAX_INT_ARGS);
        }
    }

    fn clear(&mut self) {
        self.ints.clear();
        self.string = None;
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.ints.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{}", value)?;
        }
        if let Some(s) = &self.string {
            if !self.ints.is_empty() {
                write!(f, ",")?;
            }
            write!(f, "'{}'", s)?;
        }
        write!(f, "]")
    }
}

/// One integer field of a list being parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Field {
    #[default]
    Empty,
    Value(i32),
    Malformed,
}

impl Field {
    fn push_digit(self, digit: u8) -> Self {
        let digit = i32::from(digit);
        match self {
            Field::Empty => Field::Value(digit),
            Field::Value(v) => v
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .map_or(Field::Malformed, Field::Value),
            Field::Malformed => Field::Malformed,
        }
    }

    fn finish(self) -> Option<i32> {
        match self {
            Field::Empty => None,
            Field::Value(v) => Some(v),
            Field::Malformed => {
                warn!("Numeric argument out of range, using 0");
                Some(0)
            }
        }
    }
}

#[derive(Debug, Default)]
struct State {
    in_escape: bool,
    ints_parsed: bool,
    graph_parsed: bool,
    string_parsed: bool,
    char_parsed: bool,
    /// Integer list interrupted by a C0 control
    open_field: Option<Field>,
    /// Resume the current sequence on the next call
    keep_pattern: bool,
    matched: Option<usize>,
    error_byte: Option<u8>,
    /// C0 control handled in the middle of a sequence
    recovered: Option<u8>,
}

/// Streaming tokenizer over a byte source
pub struct Tokenizer<R> {
    input: R,
    table: Arc<TokenTable>,
    pushback: Option<u8>,
    eof: bool,
    pattern: Vec<u8>,
    /// Arguments of the sequence under construction
    pending: Arguments,
    /// Arguments of the last emitted token
    args: Arguments,
    state: State,
}

impl<R: Read> Tokenizer<R> {
    /// Create a tokenizer. The input is read one byte per call to `read`,
    /// so wrap unbuffered sources in a `BufReader`.
    pub fn new(input: R, table: Arc<TokenTable>) -> Self {
        Self {
            input,
            table,
            pushback: None,
            eof: false,
            pattern: Vec::with_capacity(MAX_PATTERN),
            pending: Arguments::default(),
            args: Arguments::default(),
            state: State::default(),
        }
    }

    /// Arguments of the token returned by the last `next_token` call
    pub fn args(&self) -> &Arguments {
        &self.args
    }

    /// Raw bytes of the last token
    pub fn bytes(&self) -> &[u8] {
        match &self.state.recovered {
            Some(byte) => std::slice::from_ref(byte),
            None => &self.pattern,
        }
    }

    /// Definition that produced the last token, if it came from the table
    pub fn matched_def(&self) -> Option<&TokenDef> {
        self.state.matched.map(|i| &self.table.defs()[i])
    }

    /// Whether the last token was a control byte handled in the middle of
    /// a sequence that resumes on the next call
    pub fn resuming_sequence(&self) -> bool {
        self.state.in_escape && self.state.keep_pattern
    }

    pub fn table(&self) -> &Arc<TokenTable> {
        &self.table
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    /// Produce the next token
    pub fn next_token(&mut self) -> TokenizerResult<Token> {
        let table = Arc::clone(&self.table);

        if self.begin() {
            // Parameters of the kept prefix may still be pending
            if let Match::Prefix(def) = table.lookup(&self.pattern) {
                if let Some(kind) = def.param() {
                    self.parse_params(kind)?;
                }
            }
        }

        loop {
            let Some(byte) = self.read_byte()? else {
                return Ok(self.emit(Token::Eof, None));
            };

            if self.pattern.len() >= MAX_PATTERN {
                warn!("Sequence exceeds {} bytes: {}", MAX_PATTERN, pretty_bytes(&self.pattern));
                self.state.error_byte = Some(byte);
                return Ok(self.emit_error());
            }
            self.pattern.push(byte);
            trace!("+ appending [{:02x}]: pattern={}", byte, pretty_bytes(&self.pattern));

            if !self.state.in_escape {
                if byte == ESC {
                    self.state.in_escape = true;
                    continue;
                }
                if ctrl::is_control(byte) {
                    let (token, matched) = self.control_token(byte);
                    return Ok(self.emit(token, matched));
                }
                return self.emit_char(byte);
            }

            match table.lookup(&self.pattern) {
                Match::Full(def) => {
                    // Parameters of terminated forms were read at the prefix
                    if let (Some(kind), None) = (def.param(), def.terminator()) {
                        self.parse_params(kind)?;
                    }
                    return Ok(self.emit(def.token(), table.index_of(def)));
                }
                Match::Prefix(def) => {
                    if let Some(kind) = def.param() {
                        self.parse_params(kind)?;
                    }
                }
                Match::Partial(_) => {}
                Match::NoMatch => return self.no_match(byte),
            }
        }
    }

    /// Reset per-call state. Returns true when resuming a kept sequence.
    fn begin(&mut self) -> bool {
        self.args.clear();
        self.state.matched = None;
        self.state.error_byte = None;
        self.state.recovered = None;

        if mem::take(&mut self.state.keep_pattern) {
            return true;
        }
        self.pattern.clear();
        self.pending.clear();
        self.state = State::default();
        false
    }

    fn no_match(&mut self, byte: u8) -> TokenizerResult<Token> {
        if byte == ESC {
            // Keep the ESC as the start of the next sequence
            self.pattern.pop();
            self.unget(ESC)?;
            warn!("ESC inside escape sequence: {}", pretty_bytes(&self.pattern));
            self.state.error_byte = Some(ESC);
            return Ok(self.emit_error());
        }

        if ctrl::is_control(byte) {
            self.pattern.pop();
            let (token, _) = self.control_token(byte);
            warn!(
                "Received C0 during escape sequence: {} in {}",
                token,
                pretty_bytes(&self.pattern)
            );
            self.state.keep_pattern = true;
            self.state.recovered = Some(byte);
            return Ok(token);
        }

        self.state.error_byte = Some(byte);
        Ok(self.emit_error())
    }

    fn control_token(&self, byte: u8) -> (Token, Option<usize>) {
        match self.table.lookup(&[byte]) {
            Match::Full(def) => (def.token(), self.table.index_of(def)),
            _ => {
                warn!("Unknown C0 character: 0x{:02x}", byte);
                (Token::Error, None)
            }
        }
    }

    fn emit_char(&mut self, lead: u8) -> TokenizerResult<Token> {
        if ctrl::is_printable(lead) {
            return Ok(self.emit(Token::Char, None));
        }

        // Continuation bytes are taken as-is, without C0 or escape handling
        for _ in 1..utf8_len(lead) {
            match self.read_byte()? {
                Some(byte) => self.pattern.push(byte),
                None => {
                    warn!("Truncated UTF-8 sequence: {}", pretty_bytes(&self.pattern));
                    self.state.error_byte = Some(lead);
                    return Ok(self.emit_error());
                }
            }
        }
        Ok(self.emit(Token::Char, None))
    }

    fn emit(&mut self, token: Token, matched: Option<usize>) -> Token {
        self.args = mem::take(&mut self.pending);
        self.state.matched = matched;
        self.state.in_escape = false;
        trace!("MATCHED: {} args={}", token, self.args);
        token
    }

    fn emit_error(&mut self) -> Token {
        self.pending.clear();
        self.args.clear();
        self.state.in_escape = false;
        if let Some(byte) = self.state.error_byte {
            warn!(
                "Unexpected char 0x{:02x} in sequence {}",
                byte,
                pretty_bytes(&self.pattern)
            );
        }
        Token::Error
    }

    fn parse_params(&mut self, kind: ParamKind) -> TokenizerResult<()> {
        match kind {
            ParamKind::Integers => {
                if self.state.open_field.is_some()
                    || (!self.state.ints_parsed && starts_list(self.peek()?))
                {
                    self.parse_integer_list()?;
                }
            }
            ParamKind::GraphMode => {
                if !self.state.graph_parsed && starts_list(self.peek()?) {
                    self.parse_graph_mode()?;
                }
            }
            ParamKind::String => {
                if !self.state.string_parsed {
                    self.state.string_parsed = true;
                    let text = self.parse_string()?;
                    self.pending.string = Some(text);
                }
            }
            ParamKind::Char => {
                if !self.state.char_parsed {
                    self.state.char_parsed = true;
                    if let Some(byte) = self.read_byte()? {
                        self.pending.string = Some(char::from(byte).to_string());
                    }
                }
            }
        }
        Ok(())
    }

    /// `[<int>] [; <int>]*`. An empty field before `;` yields 0, a trailing
    /// empty field yields nothing.
    fn parse_integer_list(&mut self) -> TokenizerResult<()> {
        self.state.ints_parsed = true;
        let mut field = self.state.open_field.take().unwrap_or_default();

        loop {
            let Some(byte) = self.read_byte()? else {
                self.close_field(field);
                return Ok(());
            };
            match byte {
                b'0'..=b'9' => field = field.push_digit(byte - b'0'),
                b';' => {
                    self.pending.push_int(field.finish().unwrap_or(0));
                    field = Field::Empty;
                }
                b if ctrl::is_control(b) && b != ESC => {
                    // Leave the list open, it resumes after the control is handled
                    self.state.open_field = Some(field);
                    self.unget(b)?;
                    return Ok(());
                }
                b => {
                    self.close_field(field);
                    self.unget(b)?;
                    return Ok(());
                }
            }
        }
    }

    fn close_field(&mut self, field: Field) {
        if let Some(value) = field.finish() {
            self.pending.push_int(value);
        }
    }

    /// `[<int>] <separator> <string>`, the byte after the string is left unread
    fn parse_graph_mode(&mut self) -> TokenizerResult<()> {
        self.state.graph_parsed = true;

        let mut field = Field::Empty;
        while let Some(digit @ b'0'..=b'9') = self.peek()? {
            self.read_byte()?;
            field = field.push_digit(digit - b'0');
        }
        self.pending.push_int(field.finish().unwrap_or(0));

        // Separator, typically ';'
        if let Some(byte) = self.read_byte()? {
            if ctrl::is_control(byte) {
                self.unget(byte)?;
            }
        }

        let text = self.parse_string()?;
        self.pending.string = Some(text);
        Ok(())
    }

    /// Maximal run of printable 7-bit characters
    fn parse_string(&mut self) -> TokenizerResult<String> {
        let mut text = String::new();
        let mut truncated = false;

        while let Some(byte) = self.peek()? {
            if !ctrl::is_printable(byte) {
                break;
            }
            self.read_byte()?;
            if text.len() < MAX_STRING {
                text.push(char::from(byte));
            } else {
                truncated = true;
            }
        }
        if truncated {
            warn!("String argument truncated to {} characters", MAX_STRING);
        }
        Ok(text)
    }

    fn read_byte(&mut self) -> TokenizerResult<Option<u8>> {
        if let Some(byte) = self.pushback.take() {
            return Ok(Some(byte));
        }
        if self.eof {
            return Ok(None);
        }

        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(None);
                }
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn unget(&mut self, byte: u8) -> TokenizerResult<()> {
        if self.pushback.is_some() {
            return Err(TokenizerError::PushbackOverflow(byte));
        }
        self.pushback = Some(byte);
        Ok(())
    }

    fn peek(&mut self) -> TokenizerResult<Option<u8>> {
        let next = self.read_byte()?;
        if let Some(byte) = next {
            self.unget(byte)?;
        }
        Ok(next)
    }
}

fn starts_list(next: Option<u8>) -> bool {
    matches!(next, Some(b'0'..=b'9' | b';'))
}

/// Sequence length from the high bits of a UTF-8 lead byte
fn utf8_len(lead: u8) -> usize {
    match lead {
        b if b & 0xE0 == 0xC0 => 2,
        b if b & 0xF0 == 0xE0 => 3,
        b if b & 0xF8 == 0xF0 => 4,
        b if b & 0xFC == 0xF8 => 5,
        b if b & 0xFE == 0xFC => 6,
        _ => 1,
    }
}
