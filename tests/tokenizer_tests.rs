//! Tokenizer tests over the standard table
//!
//! Each case feeds a byte string through a fresh tokenizer and checks the
//! token stream together with the parsed arguments.

use std::io::{self, Cursor, Read};
use std::sync::Arc;

use proptest::prelude::*;
use vtx_terminal::parser::{Match, Token, TokenTable, Tokenizer, TokenizerError};

fn table() -> Arc<TokenTable> {
    Arc::new(TokenTable::standard().expect("standard table"))
}

fn tokenizer(bytes: &[u8]) -> Tokenizer<Cursor<Vec<u8>>> {
    Tokenizer::new(Cursor::new(bytes.to_vec()), table())
}

/// Tokens up to EOF with their integer arguments
fn tokens(bytes: &[u8]) -> Vec<(Token, Vec<i32>)> {
    let mut tok = tokenizer(bytes);
    let mut result = Vec::new();
    loop {
        let token = tok.next_token().unwrap();
        if token == Token::Eof {
            return result;
        }
        result.push((token, tok.args().ints().to_vec()));
    }
}

/// A reader that hands out one byte per call
struct Trickle(Vec<u8>, usize);

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.1 >= self.0.len() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.0[self.1];
        self.1 += 1;
        Ok(1)
    }
}

struct Broken;

impl Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "host went away"))
    }
}

#[test]
fn test_standard_table_is_unambiguous() {
    let table = table();
    assert!(!table.is_empty());
    for def in table.defs().iter().filter(|d| d.token().is_terminator()) {
        match table.lookup(&def.full()) {
            Match::Full(found) => assert_eq!(found.token(), def.token(), "{}", def.description()),
            other => panic!("{} does not match fully: {:?}", def.description(), other),
        }
    }
}

#[test]
fn test_charset_designators() {
    let slots = [
        (b'(', Token::CharsetG0Des),
        (b')', Token::CharsetG1Des),
        (b'*', Token::CharsetG2Des),
        (b'+', Token::CharsetG3Des),
    ];
    for (intro, expected) in slots {
        for designator in *b"0AB4C5E6H7KRQ" {
            let mut tok = tokenizer(&[0x1b, intro, designator]);
            assert_eq!(tok.next_token().unwrap(), expected);
            assert_eq!(tok.args().char_param(), Some(char::from(designator)));
            assert_eq!(tok.next_token().unwrap(), Token::Eof);
        }
    }
}

#[test]
fn test_cursor_position() {
    assert_eq!(tokens(b"\x1b[14;43H"), vec![(Token::SetCursor, vec![14, 43])]);
}

#[test]
fn test_empty_fields() {
    assert_eq!(tokens(b"\x1b[;2;q"), vec![(Token::DecLedSet, vec![0, 2])]);
    assert_eq!(tokens(b"\x1b[;H"), vec![(Token::SetCursor, vec![0])]);
}

#[test]
fn test_dec_private_and_ansi_modes() {
    assert_eq!(tokens(b"\x1b[?25l"), vec![(Token::DecResetMode, vec![25])]);
    assert_eq!(tokens(b"\x1b[?1;7h"), vec![(Token::DecSetMode, vec![1, 7])]);
    assert_eq!(tokens(b"\x1b[4h"), vec![(Token::SetMode, vec![4])]);
    assert_eq!(tokens(b"\x1b[4l"), vec![(Token::ResetMode, vec![4])]);
}

#[test]
fn test_device_attribute_requests() {
    assert_eq!(tokens(b"\x1b[c"), vec![(Token::ReqPrimaryDa, vec![])]);
    assert_eq!(tokens(b"\x1b[>c"), vec![(Token::ReqSecondaryDa, vec![])]);
    assert_eq!(tokens(b"\x1b[=c"), vec![(Token::ReqTertiaryDa, vec![])]);
    assert_eq!(tokens(b"\x1bZ"), vec![(Token::SendTermId, vec![])]);
}

#[test]
fn test_control_inside_sequence() {
    assert_eq!(
        tokens(b"\x1b[\n1;A"),
        vec![(Token::Lf, vec![]), (Token::Up, vec![1])]
    );
    assert_eq!(
        tokens(b"\x1b[2\x08C"),
        vec![(Token::Bs, vec![]), (Token::Right, vec![2])]
    );
}

#[test]
fn test_utf8_and_ascii_mix() {
    let mut tok = tokenizer("a€b".as_bytes());
    assert_eq!(tok.next_token().unwrap(), Token::Char);
    assert_eq!(tok.bytes(), b"a");
    assert_eq!(tok.next_token().unwrap(), Token::Char);
    assert_eq!(tok.bytes(), "€".as_bytes());
    assert_eq!(tok.next_token().unwrap(), Token::Char);
    assert_eq!(tok.bytes(), b"b");
    assert_eq!(tok.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_osc_title() {
    let mut tok = tokenizer(b"\x1b]0;XXXX\x07after");
    assert_eq!(tok.next_token().unwrap(), Token::OscGraphMode);
    assert_eq!(tok.args().arg(0), 0);
    assert_eq!(tok.args().string(), Some("XXXX"));
    assert_eq!(tok.next_token().unwrap(), Token::Char);
    assert_eq!(tok.bytes(), b"a");
}

#[test]
fn test_osc_color_query() {
    let mut tok = tokenizer(b"\x1b]4;1;?\x1b\\");
    assert_eq!(tok.next_token().unwrap(), Token::OscGraphMode);
    assert_eq!(tok.args().arg(0), 4);
    assert_eq!(tok.args().string(), Some("1;?"));
    assert_eq!(tok.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_split_reads() {
    let input = b"\x1b[38;2;10;20;30mX\x1b]2;t\x07".to_vec();
    let mut tok = Tokenizer::new(Trickle(input, 0), table());
    assert_eq!(tok.next_token().unwrap(), Token::SetFontStyle);
    assert_eq!(tok.args().ints(), &[38, 2, 10, 20, 30]);
    assert_eq!(tok.next_token().unwrap(), Token::Char);
    assert_eq!(tok.next_token().unwrap(), Token::OscGraphMode);
    assert_eq!(tok.args().string(), Some("t"));
    assert_eq!(tok.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_read_error() {
    let mut tok = Tokenizer::new(Broken, table());
    assert!(matches!(tok.next_token(), Err(TokenizerError::Io(_))));
}

#[test]
fn test_error_then_resync() {
    let result = tokens(b"\x1b!x\x1b[2J");
    assert_eq!(result[0].0, Token::Error);
    assert_eq!(result[1].0, Token::Char);
    assert_eq!(result[2], (Token::ScreenErase, vec![2]));
}

#[test]
fn test_text_starting_with_digits_after_sequences() {
    let cases: [(&[u8], Token, &[u8]); 4] = [
        (b"\x1b[m5 files", Token::SetFontStyle, b"5 files"),
        (b"\x1b[K42", Token::LineErase, b"42"),
        (b"\x1b[H7;", Token::SetCursor, b"7;"),
        (b"\x1b]0;t\x0799", Token::OscGraphMode, b"99"),
    ];
    for (input, expected, text) in cases {
        let mut tok = tokenizer(input);
        assert_eq!(tok.next_token().unwrap(), expected);
        assert!(tok.args().len() <= 1, "unexpected arguments {}", tok.args());

        let mut printed = Vec::new();
        loop {
            match tok.next_token().unwrap() {
                Token::Eof => break,
                Token::Char => {
                    assert!(tok.args().is_empty());
                    printed.extend_from_slice(tok.bytes());
                }
                other => panic!("Expected Char, got {:?}", other),
            }
        }
        assert_eq!(printed, text);
    }
}

proptest! {
    #[test]
    fn prop_arbitrary_bytes_reach_eof(input in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut tok = tokenizer(&input);
        // Every token consumes at least one byte, plus one for EOF
        let mut budget = input.len() + 1;
        loop {
            let token = tok.next_token().unwrap();
            if token == Token::Eof {
                break;
            }
            prop_assert!(budget > 0, "tokenizer did not make progress");
            budget -= 1;
            prop_assert!(tok.args().len() <= 16);
        }
    }

    #[test]
    fn prop_printable_ascii_is_chars(text in "[ -~]{0,64}") {
        let result = tokens(text.as_bytes());
        prop_assert_eq!(result.len(), text.len());
        prop_assert!(result.iter().all(|(t, _)| *t == Token::Char));
    }
}
