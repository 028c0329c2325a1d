//! Token vocabulary
//!
//! The closed set of token kinds the tokenizer produces. Every entry of the
//! pattern table maps a byte sequence onto one of these.

use std::fmt;

/// Kind of parameter block a token definition accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// `[<int>] [; <int>]*`, up to 16 entries
    Integers,
    /// Exactly one raw character (charset designators)
    Char,
    /// A run of printable 7-bit characters (DCS/APC payloads)
    String,
    /// OSC payload: `[<int>] <separator> <string>`
    GraphMode,
}

/// A recognized terminal token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// End of the input stream
    Eof,

    // C0 controls
    Nul,
    Soh,
    Stx,
    Etx,
    Eot,
    Enq,
    Ack,
    Bel,
    Bs,
    Ht,
    Lf,
    Vt,
    Ff,
    Cr,
    Can,
    Sub,
    Esc,
    Xon,
    Xoff,
    Del,
    /// SI: invoke G0 into GL
    CharsetG0,
    /// SO: invoke G1 into GL
    CharsetG1,

    // Two character escapes
    SaveCursor,
    RestoreCursor,
    Index,
    NextLine,
    TabSet,
    ReverseIndex,
    StartGuardedArea,
    EndGuardedArea,
    StartOfString,
    SendTermId,
    StringTerminator,
    PrivacyMessage,
    ApplicationKeypad,
    NumericKeypad,
    ExitVt52Mode,
    DecScreenAlignment,

    // Charset designators, single character parameter
    CharsetG0Des,
    CharsetG1Des,
    CharsetG2Des,
    CharsetG3Des,

    // String sequences
    DeviceControlString,
    AppProgramCommand,

    // OSC
    OscGraphModePrefix,
    OscGraphMode,

    // CSI
    CsiPrefix,
    DecSetMode,
    DecResetMode,
    ReqPrimaryDa,
    ReqSecondaryDa,
    ReqTertiaryDa,
    ReqXtVersion,
    XtermResetModifiers,
    XtermGetModifiers,
    XtermSetGetGraphics,
    XtermWinManipulation,
    InsertBlankChars,
    Up,
    Down,
    Right,
    Left,
    CursorNextLine,
    PrecedingLine,
    SetColumn,
    SetRow,
    SetCursor,
    ForwardTabs,
    BackwardTabs,
    TabClear,
    ScreenErase,
    LineErase,
    InsertLines,
    DeleteLines,
    DelChar,
    EraseChars,
    ScrollUp,
    ScrollDown,
    CharacterRepeat,
    SetMode,
    ResetMode,
    SetFontStyle,
    DeviceStatus,
    SetRegion,
    DecLedSet,
    DecLedTest,

    /// One printable character or one UTF-8 encoded code point, raw bytes attached
    Char,
    /// Recognized but not implemented
    Unsupported,
    /// Byte sequence matched nothing
    Error,
}

impl Token {
    /// Whether this token completes a sequence.
    ///
    /// Prefix markers (`ESC`, start of CSI, start of OSC) are never emitted
    /// on their own; they only steer parameter parsing.
    pub fn is_terminator(self) -> bool {
        !matches!(self, Token::Esc | Token::CsiPrefix | Token::OscGraphModePrefix)
    }

    /// Whether this token is a single C0 control (or DEL)
    pub fn is_control(self) -> bool {
        matches!(
            self,
            Token::Nul
                | Token::Soh
                | Token::Stx
                | Token::Etx
                | Token::Eot
                | Token::Enq
                | Token::Ack
                | Token::Bel
                | Token::Bs
                | Token::Ht
                | Token::Lf
                | Token::Vt
                | Token::Ff
                | Token::Cr
                | Token::Can
                | Token::Sub
                | Token::Esc
                | Token::Xon
                | Token::Xoff
                | Token::Del
                | Token::CharsetG0
                | Token::CharsetG1
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_tokens_are_not_terminators() {
        assert!(!Token::Esc.is_terminator());
        assert!(!Token::CsiPrefix.is_terminator());
        assert!(!Token::OscGraphModePrefix.is_terminator());
        assert!(Token::Up.is_terminator());
        assert!(Token::Error.is_terminator());
    }

    #[test]
    fn test_control_classification() {
        assert!(Token::Lf.is_control());
        assert!(Token::CharsetG1.is_control());
        assert!(!Token::Char.is_control());
        assert!(!Token::SetCursor.is_control());
    }
}
