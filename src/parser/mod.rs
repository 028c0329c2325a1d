//! VT/xterm Escape Sequence Tokenizer
//!
//! Turns an open-ended byte stream into tokens plus their parsed arguments.
//! - `token`: the token vocabulary
//! - `table`: the pattern table and its trie
//! - `tokenizer`: the streaming lexer

mod table;
mod token;
mod tokenizer;

pub use table::{Match, TableError, TokenDef, TokenTable};
pub use token::{ParamKind, Token};
pub use tokenizer::{Arguments, Tokenizer, TokenizerError, TokenizerResult, MAX_INT_ARGS};

/// C0 control bytes
pub mod ctrl {
    pub const NUL: u8 = 0x00;
    pub const SOH: u8 = 0x01;
    pub const STX: u8 = 0x02;
    pub const ETX: u8 = 0x03;
    pub const EOT: u8 = 0x04;
    pub const ENQ: u8 = 0x05;
    pub const ACK: u8 = 0x06;
    pub const BEL: u8 = 0x07;
    pub const BS: u8 = 0x08;
    pub const HT: u8 = 0x09;
    pub const LF: u8 = 0x0A;
    pub const VT: u8 = 0x0B;
    pub const FF: u8 = 0x0C;
    pub const CR: u8 = 0x0D;
    pub const SO: u8 = 0x0E;
    pub const SI: u8 = 0x0F;
    pub const XON: u8 = 0x11;
    pub const XOFF: u8 = 0x13;
    pub const CAN: u8 = 0x18;
    pub const SUB: u8 = 0x1A;
    pub const ESC: u8 = 0x1B;
    pub const DEL: u8 = 0x7F;

    /// C0 range plus DEL
    pub fn is_control(byte: u8) -> bool {
        byte < 0x20 || byte == DEL
    }

    /// Printable 7-bit characters, space through `~`
    pub fn is_printable(byte: u8) -> bool {
        (0x20..0x7F).contains(&byte)
    }
}

/// Render bytes for diagnostics, e.g. `ESC [ ? 1 h`
pub fn pretty_bytes(bytes: &[u8]) -> String {
    let parts: Vec<String> = bytes
        .iter()
        .map(|&b| match b {
            ctrl::ESC => "ESC".to_string(),
            ctrl::BEL => "BEL".to_string(),
            ctrl::LF => "LF".to_string(),
            ctrl::CR => "CR".to_string(),
            ctrl::DEL => "DEL".to_string(),
            b' ' => "SP".to_string(),
            b if b < 0x20 => format!("^{}", (b + 0x40) as char),
            b if b < 0x7F => (b as char).to_string(),
            b => format!("\\x{:02x}", b),
        })
        .collect();
    parts.join(" ")
}
