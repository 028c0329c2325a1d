//! VTx Terminal Protocol Engine
//!
//! A VT100/VT102/xterm protocol engine that turns a host's output byte
//! stream into operations on an abstract character surface:
//!
//! - `parser`: token vocabulary, pattern table and streaming tokenizer
//! - `emulator`: the state machine applying tokens to a `CharacterTerminal`
//! - `keymap`: key names to host byte sequences
//! - `core`: an in-memory headless surface with snapshots
//! - `app`: configuration

pub mod app;
pub mod core;
pub mod emulator;
pub mod keymap;
pub mod parser;
