//! Pattern Table
//!
//! Declarative mapping from byte patterns to tokens. Each definition is a
//! fixed prefix, an optional parameter block and an optional terminator.
//! Definitions are compiled into a 256-way trie keyed by raw byte value.
//!
//! Match priority at a given pattern:
//! 1. Full match: the pattern equals `prefix + terminator` of a terminating token
//! 2. Prefix match: the pattern equals the prefix of a definition, which
//!    enables parameter lookahead
//! 3. Partial match: the pattern is a proper prefix of some full sequence
//!
//! Within each class the definition added first wins, so table order is part
//! of the contract.

use thiserror::Error;

use super::ctrl::*;
use super::pretty_bytes;
use super::token::{ParamKind, Token};

/// Table construction errors
#[derive(Debug, Error)]
pub enum TableError {
    #[error("duplicate definition for {sequence}: '{existing}' already registered, '{rejected}' rejected")]
    Duplicate {
        sequence: String,
        existing: String,
        rejected: String,
    },

    #[error("definition '{0}' has an empty prefix")]
    EmptyPrefix(String),
}

/// An immutable token definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDef {
    prefix: Vec<u8>,
    param: Option<ParamKind>,
    terminator: Option<Vec<u8>>,
    token: Token,
    description: String,
}

impl TokenDef {
    pub fn new(
        prefix: impl Into<Vec<u8>>,
        param: Option<ParamKind>,
        terminator: Option<&[u8]>,
        token: Token,
        description: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            param,
            terminator: terminator.map(<[u8]>::to_vec),
            token,
            description: description.into(),
        }
    }

    /// Single C0 control byte
    pub fn control(byte: u8, token: Token, description: &str) -> Self {
        Self::new(vec![byte], None, None, token, description)
    }

    /// `ESC` followed by fixed bytes
    pub fn escape(seq: &[u8], token: Token, description: &str) -> Self {
        let mut prefix = vec![ESC];
        prefix.extend_from_slice(seq);
        Self::new(prefix, None, None, token, description)
    }

    /// `ESC [ <private>` with an integer list and a terminator
    pub fn csi(private: &[u8], terminator: &[u8], token: Token, description: &str) -> Self {
        let mut prefix = vec![ESC, b'['];
        prefix.extend_from_slice(private);
        Self::new(prefix, Some(ParamKind::Integers), Some(terminator), token, description)
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn param(&self) -> Option<ParamKind> {
        self.param
    }

    pub fn terminator(&self) -> Option<&[u8]> {
        self.terminator.as_deref()
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Prefix followed by terminator
    pub fn full(&self) -> Vec<u8> {
        let mut full = self.prefix.clone();
        if let Some(term) = &self.terminator {
            full.extend_from_slice(term);
        }
        full
    }
}

/// Result of looking up a (partial) byte pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match<'a> {
    Full(&'a TokenDef),
    Prefix(&'a TokenDef),
    Partial(&'a TokenDef),
    NoMatch,
}

const NO_CHILD: u32 = 0;

#[derive(Debug)]
struct Node {
    children: Box<[u32; 256]>,
    full: Option<usize>,
    prefix: Option<usize>,
    partial: Option<usize>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: Box::new([NO_CHILD; 256]),
            full: None,
            prefix: None,
            partial: None,
        }
    }
}

/// Compiled, immutable pattern table
#[derive(Debug)]
pub struct TokenTable {
    defs: Vec<TokenDef>,
    nodes: Vec<Node>,
}

impl TokenTable {
    /// Compile a table. Fails on an empty prefix or when two definitions
    /// share the same full byte sequence.
    pub fn new(defs: Vec<TokenDef>) -> Result<Self, TableError> {
        let mut table = Self {
            defs: Vec::with_capacity(defs.len()),
            nodes: vec![Node::new()],
        };
        for def in defs {
            table.insert(def)?;
        }
        Ok(table)
    }

    /// The VT100/VT102/xterm table
    pub fn standard() -> Result<Self, TableError> {
        Self::new(standard_defs())
    }

    fn insert(&mut self, def: TokenDef) -> Result<(), TableError> {
        if def.prefix.is_empty() {
            return Err(TableError::EmptyPrefix(def.description));
        }

        let index = self.defs.len();
        let prefix_len = def.prefix.len();
        let full = def.full();

        // Validate before touching the trie so a rejected definition leaves no trace
        if let Some(existing) = self.find_node(&full).and_then(|n| self.nodes[n].full) {
            return Err(TableError::Duplicate {
                sequence: pretty_bytes(&full),
                existing: self.defs[existing].description.clone(),
                rejected: def.description,
            });
        }

        let mut node = 0usize;
        for (depth, &byte) in full.iter().enumerate() {
            let child = self.nodes[node].children[byte as usize];
            node = if child == NO_CHILD {
                let id = self.nodes.len();
                self.nodes.push(Node::new());
                self.nodes[node].children[byte as usize] = id as u32;
                id
            } else {
                child as usize
            };

            let entry = &mut self.nodes[node];
            entry.partial.get_or_insert(index);
            if depth + 1 == prefix_len {
                entry.prefix.get_or_insert(index);
            }
        }
        self.nodes[node].full = Some(index);
        self.defs.push(def);
        Ok(())
    }

    fn find_node(&self, pattern: &[u8]) -> Option<usize> {
        let mut node = 0usize;
        for &byte in pattern {
            let child = self.nodes[node].children[byte as usize];
            if child == NO_CHILD {
                return None;
            }
            node = child as usize;
        }
        Some(node)
    }

    /// Match the bytes accumulated so far
    pub fn lookup(&self, pattern: &[u8]) -> Match<'_> {
        if pattern.is_empty() {
            return Match::NoMatch;
        }
        let Some(node) = self.find_node(pattern).map(|n| &self.nodes[n]) else {
            return Match::NoMatch;
        };

        if let Some(def) = node.full.map(|i| &self.defs[i]) {
            if def.token.is_terminator() {
                return Match::Full(def);
            }
        }
        if let Some(i) = node.prefix {
            return Match::Prefix(&self.defs[i]);
        }
        match node.partial {
            Some(i) => Match::Partial(&self.defs[i]),
            None => Match::NoMatch,
        }
    }

    /// Definitions in insertion order
    pub fn defs(&self) -> &[TokenDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Index of a definition in this table, used to report the last match
    pub(crate) fn index_of(&self, def: &TokenDef) -> Option<usize> {
        self.defs.iter().position(|d| std::ptr::eq(d, def))
    }
}

fn standard_defs() -> Vec<TokenDef> {
    use Token::*;

    let st: &[u8] = &[ESC, b'\\'];

    let mut defs = vec![
        // C0
        TokenDef::control(NUL, Nul, "Null"),
        TokenDef::control(SOH, Soh, "Start of heading"),
        TokenDef::control(STX, Stx, "Start of text"),
        TokenDef::control(ETX, Etx, "End of text"),
        TokenDef::control(EOT, Eot, "End of transmission"),
        TokenDef::control(ENQ, Enq, "Enquiry"),
        TokenDef::control(ACK, Ack, "Acknowledge"),
        TokenDef::control(BEL, Bel, "Bell"),
        TokenDef::control(BS, Bs, "Backspace"),
        TokenDef::control(HT, Ht, "Horizontal tab"),
        TokenDef::control(LF, Lf, "Line feed"),
        TokenDef::control(VT, Vt, "Vertical tab"),
        TokenDef::control(FF, Ff, "Form feed"),
        TokenDef::control(CR, Cr, "Carriage return"),
        TokenDef::control(SI, CharsetG0, "Shift in: invoke G0"),
        TokenDef::control(SO, CharsetG1, "Shift out: invoke G1"),
        TokenDef::control(CAN, Can, "Cancel"),
        TokenDef::control(SUB, Sub, "Substitute"),
        TokenDef::control(ESC, Esc, "Escape"),
        TokenDef::control(XON, Xon, "Device control 1 (XON)"),
        TokenDef::control(XOFF, Xoff, "Device control 3 (XOFF)"),
        TokenDef::control(DEL, Del, "Delete"),
        // Two character escapes
        TokenDef::escape(b"7", SaveCursor, "DECSC save cursor"),
        TokenDef::escape(b"8", RestoreCursor, "DECRC restore cursor"),
        TokenDef::escape(b"D", Index, "IND index"),
        TokenDef::escape(b"E", NextLine, "NEL next line"),
        TokenDef::escape(b"H", TabSet, "HTS horizontal tab set"),
        TokenDef::escape(b"M", ReverseIndex, "RI reverse index"),
        TokenDef::escape(b"N", Unsupported, "SS2 single shift select G2 charset"),
        TokenDef::escape(b"O", Unsupported, "SS3 single shift select G3 charset"),
        TokenDef::escape(b"V", StartGuardedArea, "SPA start of guarded area"),
        TokenDef::escape(b"W", EndGuardedArea, "EPA end of guarded area"),
        TokenDef::escape(b"X", StartOfString, "SOS start of string"),
        TokenDef::escape(b"Z", SendTermId, "DECID return terminal id"),
        TokenDef::escape(b"\\", StringTerminator, "ST string terminator"),
        TokenDef::escape(b"^", PrivacyMessage, "PM privacy message"),
        TokenDef::escape(b"=", ApplicationKeypad, "DECKPAM application keypad"),
        TokenDef::escape(b">", NumericKeypad, "DECKPNM numeric keypad"),
        TokenDef::escape(b"<", ExitVt52Mode, "Exit VT52 mode"),
        // Charset designators
        TokenDef::new([ESC, b'('], Some(ParamKind::Char), None, CharsetG0Des, "SCS designate G0 charset"),
        TokenDef::new([ESC, b')'], Some(ParamKind::Char), None, CharsetG1Des, "SCS designate G1 charset"),
        TokenDef::new([ESC, b'*'], Some(ParamKind::Char), None, CharsetG2Des, "SCS designate G2 charset"),
        TokenDef::new([ESC, b'+'], Some(ParamKind::Char), None, CharsetG3Des, "SCS designate G3 charset"),
        // Three character escapes
        TokenDef::escape(b"%@", Unsupported, "Select default charset ISO 8859-1"),
        TokenDef::escape(b"%G", Unsupported, "Select UTF-8 charset"),
        TokenDef::escape(b"#3", Unsupported, "DECDHL double height, top half"),
        TokenDef::escape(b"#4", Unsupported, "DECDHL double height, bottom half"),
        TokenDef::escape(b"#5", Unsupported, "DECSWL single width line"),
        TokenDef::escape(b"#6", Unsupported, "DECDWL double width line"),
        TokenDef::escape(b" F", Unsupported, "S7C1T 7-bit controls"),
        TokenDef::escape(b" G", Unsupported, "S8C1T 8-bit controls"),
        TokenDef::escape(b" L", Unsupported, "ANSI conformance level 1"),
        TokenDef::escape(b" M", Unsupported, "ANSI conformance level 2"),
        TokenDef::escape(b" N", Unsupported, "ANSI conformance level 3"),
        TokenDef::escape(b"#8", DecScreenAlignment, "DECALN screen alignment test"),
        // String sequences
        TokenDef::new([ESC, b'P'], Some(ParamKind::String), Some(st), DeviceControlString, "DCS device control string"),
        TokenDef::new([ESC, b'_'], Some(ParamKind::String), Some(st), AppProgramCommand, "APC application program command"),
        // OSC: the prefix entry must precede its terminated forms
        TokenDef::new([ESC, b']'], Some(ParamKind::GraphMode), None, OscGraphModePrefix, "Start of OSC"),
        TokenDef::new([ESC, b']'], Some(ParamKind::GraphMode), Some(&[BEL]), OscGraphMode, "OSC terminated by BEL"),
        TokenDef::new([ESC, b']'], Some(ParamKind::GraphMode), Some(st), OscGraphMode, "OSC terminated by ST"),
        // CSI: the prefix entry must precede every CSI form
        TokenDef::new([ESC, b'['], Some(ParamKind::Integers), None, CsiPrefix, "Start of CSI"),
    ];

    defs.extend([
        // Private forms
        TokenDef::csi(b"?", b"h", DecSetMode, "DECSET DEC private mode set"),
        TokenDef::csi(b"?", b"l", DecResetMode, "DECRST DEC private mode reset"),
        TokenDef::csi(b">", b"c", ReqSecondaryDa, "Secondary device attributes"),
        TokenDef::csi(b">", b"q", ReqXtVersion, "XTVERSION report version"),
        TokenDef::csi(b"=", b"c", ReqTertiaryDa, "Tertiary device attributes"),
        TokenDef::csi(b">", b"m", XtermResetModifiers, "XTMODKEYS set key modifier options"),
        TokenDef::csi(b"?", b"m", XtermGetModifiers, "XTQMODKEYS query key modifier options"),
        TokenDef::csi(b"?", b"S", XtermSetGetGraphics, "XTSMGRAPHICS"),
        TokenDef::csi(b">", b"S", Unsupported, "XTSHIFTESCAPE"),
        TokenDef::csi(b"?", b"$p", Unsupported, "DECRQM request DEC private mode"),
        TokenDef::csi(b"?", b"u", Unsupported, "Query keyboard protocol flags"),
        TokenDef::csi(b"=", b"u", Unsupported, "Set keyboard protocol flags"),
        TokenDef::csi(b">", b"u", Unsupported, "Push keyboard protocol flags"),
        TokenDef::csi(b"?", b"r", Unsupported, "XTRESTORE restore DEC private modes"),
        TokenDef::csi(b"=", b"r", Unsupported, "Private r"),
        TokenDef::csi(b">", b"r", Unsupported, "Private r"),
        TokenDef::csi(b"?", b"s", Unsupported, "XTSAVE save DEC private modes"),
        TokenDef::csi(b"=", b"s", Unsupported, "Private s"),
        TokenDef::csi(b">", b"s", Unsupported, "Private s"),
        // Plain forms
        TokenDef::csi(b"", b"@", InsertBlankChars, "ICH insert blank characters"),
        TokenDef::csi(b"", b"A", Up, "CUU cursor up"),
        TokenDef::csi(b"", b"B", Down, "CUD cursor down"),
        TokenDef::csi(b"", b"C", Right, "CUF cursor forward"),
        TokenDef::csi(b"", b"D", Left, "CUB cursor backward"),
        TokenDef::csi(b"", b"E", CursorNextLine, "CNL cursor next line"),
        TokenDef::csi(b"", b"F", PrecedingLine, "CPL cursor preceding line"),
        TokenDef::csi(b"", b"G", SetColumn, "CHA cursor character absolute"),
        TokenDef::csi(b"", b"H", SetCursor, "CUP cursor position"),
        TokenDef::csi(b"", b"I", ForwardTabs, "CHT cursor forward tabulation"),
        TokenDef::csi(b"", b"J", ScreenErase, "ED erase in display"),
        TokenDef::csi(b"", b"K", LineErase, "EL erase in line"),
        TokenDef::csi(b"", b"L", InsertLines, "IL insert lines"),
        TokenDef::csi(b"", b"M", DeleteLines, "DL delete lines"),
        TokenDef::csi(b"", b"P", DelChar, "DCH delete characters"),
        TokenDef::csi(b"", b"S", ScrollUp, "SU scroll up"),
        TokenDef::csi(b"", b"T", ScrollDown, "SD scroll down or mouse tracking"),
        TokenDef::csi(b"", b"X", EraseChars, "ECH erase characters"),
        TokenDef::csi(b"", b"Z", BackwardTabs, "CBT cursor backward tabulation"),
        TokenDef::csi(b"", b"^", ScrollDown, "SD scroll down"),
        TokenDef::csi(b"", b"`", Unsupported, "HPA character position absolute"),
        TokenDef::csi(b"", b"a", Unsupported, "HPR character position relative"),
        TokenDef::csi(b"", b"b", CharacterRepeat, "REP repeat preceding character"),
        TokenDef::csi(b"", b"c", ReqPrimaryDa, "Primary device attributes"),
        TokenDef::csi(b"", b"d", SetRow, "VPA line position absolute"),
        TokenDef::csi(b"", b"f", SetCursor, "HVP horizontal and vertical position"),
        TokenDef::csi(b"", b"g", TabClear, "TBC tab clear"),
        TokenDef::csi(b"", b"h", SetMode, "SM set mode"),
        TokenDef::csi(b"", b"i", Unsupported, "MC media copy"),
        TokenDef::csi(b"", b"l", ResetMode, "RM reset mode"),
        TokenDef::csi(b"", b"m", SetFontStyle, "SGR select graphic rendition"),
        TokenDef::csi(b"", b"n", DeviceStatus, "DSR device status report"),
        TokenDef::csi(b"", b"r", SetRegion, "DECSTBM set top and bottom margins"),
        TokenDef::csi(b"", b"t", XtermWinManipulation, "XTWINOPS window manipulation"),
        TokenDef::csi(b"", b"q", DecLedSet, "DECLL load LEDs"),
        TokenDef::csi(b"", b"y", DecLedTest, "DECTST invoke confidence test"),
        TokenDef::csi(b"", b"%m", Unsupported, "Unknown '%m' emitted by vi"),
        // ncurses (YaST) emits a charset designator inside an OSC
        TokenDef::new([ESC, b']', ESC, b'('], Some(ParamKind::Char), None, CharsetG0Des, "SCS inside OSC"),
    ]);

    defs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TokenTable {
        TokenTable::standard().unwrap()
    }

    /// Linear scan reference implementation of the matching rules
    fn scan<'a>(table: &'a TokenTable, pattern: &[u8]) -> Match<'a> {
        let defs = table.defs();
        if let Some(def) = defs
            .iter()
            .find(|d| d.token().is_terminator() && d.full() == pattern)
        {
            return Match::Full(def);
        }
        if let Some(def) = defs.iter().find(|d| d.prefix() == pattern) {
            return Match::Prefix(def);
        }
        if let Some(def) = defs.iter().find(|d| d.full().starts_with(pattern)) {
            return Match::Partial(def);
        }
        Match::NoMatch
    }

    #[test]
    fn test_standard_table_builds() {
        let table = table();
        assert!(table.len() > 100);
    }

    #[test]
    fn test_full_match() {
        let table = table();
        match table.lookup(&[ESC, b'7']) {
            Match::Full(def) => assert_eq!(def.token(), Token::SaveCursor),
            other => panic!("Expected full match, got {:?}", other),
        }
        match table.lookup(&[ESC, b'[', b'A']) {
            Match::Full(def) => assert_eq!(def.token(), Token::Up),
            other => panic!("Expected full match, got {:?}", other),
        }
    }

    #[test]
    fn test_csi_prefix_match() {
        let table = table();
        match table.lookup(&[ESC, b'[']) {
            Match::Prefix(def) => {
                assert_eq!(def.token(), Token::CsiPrefix);
                assert_eq!(def.param(), Some(ParamKind::Integers));
            }
            other => panic!("Expected prefix match, got {:?}", other),
        }
    }

    #[test]
    fn test_dec_private_prefix_match() {
        let table = table();
        match table.lookup(&[ESC, b'[', b'?']) {
            Match::Prefix(def) => assert_eq!(def.token(), Token::DecSetMode),
            other => panic!("Expected prefix match, got {:?}", other),
        }
    }

    #[test]
    fn test_osc_prefix_match() {
        let table = table();
        match table.lookup(&[ESC, b']']) {
            Match::Prefix(def) => assert_eq!(def.token(), Token::OscGraphModePrefix),
            other => panic!("Expected prefix match, got {:?}", other),
        }
        match table.lookup(&[ESC, b']', BEL]) {
            Match::Full(def) => assert_eq!(def.token(), Token::OscGraphMode),
            other => panic!("Expected full match, got {:?}", other),
        }
        match table.lookup(&[ESC, b']', ESC]) {
            Match::Partial(_) => {}
            other => panic!("Expected partial match, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_match() {
        let table = table();
        match table.lookup(&[ESC, b'%']) {
            Match::Partial(def) => assert_eq!(def.token(), Token::Unsupported),
            other => panic!("Expected partial match, got {:?}", other),
        }
        match table.lookup(&[ESC, b'[', b'?', b'$']) {
            Match::Partial(_) => {}
            other => panic!("Expected partial match, got {:?}", other),
        }
    }

    #[test]
    fn test_no_match() {
        let table = table();
        assert_eq!(table.lookup(&[ESC, b'!']), Match::NoMatch);
        assert_eq!(table.lookup(&[ESC, b'[', LF]), Match::NoMatch);
        assert_eq!(table.lookup(&[]), Match::NoMatch);
    }

    #[test]
    fn test_control_bytes_are_full_matches() {
        let table = table();
        match table.lookup(&[LF]) {
            Match::Full(def) => assert_eq!(def.token(), Token::Lf),
            other => panic!("Expected full match, got {:?}", other),
        }
        // ESC alone is a prefix marker, never a full token
        match table.lookup(&[ESC]) {
            Match::Prefix(def) => assert_eq!(def.token(), Token::Esc),
            other => panic!("Expected prefix match, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_definition_rejected() {
        let defs = vec![
            TokenDef::csi(b"", b"A", Token::Up, "first"),
            TokenDef::csi(b"", b"A", Token::Down, "second"),
        ];
        match TokenTable::new(defs) {
            Err(TableError::Duplicate {
                existing, rejected, ..
            }) => {
                assert_eq!(existing, "first");
                assert_eq!(rejected, "second");
            }
            other => panic!("Expected duplicate error, got {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let defs = vec![TokenDef::new(Vec::new(), None, None, Token::Nul, "empty")];
        assert!(matches!(
            TokenTable::new(defs),
            Err(TableError::EmptyPrefix(_))
        ));
    }

    #[test]
    fn test_first_added_wins() {
        let defs = vec![
            TokenDef::new([ESC, b'x'], None, Some(b"1"), Token::Up, "first"),
            TokenDef::new([ESC, b'x'], None, Some(b"2"), Token::Down, "second"),
        ];
        let table = TokenTable::new(defs).unwrap();
        match table.lookup(&[ESC, b'x']) {
            Match::Prefix(def) => assert_eq!(def.description(), "first"),
            other => panic!("Expected prefix match, got {:?}", other),
        }
    }

    #[test]
    fn test_trie_agrees_with_linear_scan() {
        let table = table();
        let mut patterns: Vec<Vec<u8>> = Vec::new();
        for def in table.defs() {
            let full = def.full();
            for len in 1..=full.len() {
                patterns.push(full[..len].to_vec());
            }
            let mut bad = full.clone();
            bad.push(b'!');
            patterns.push(bad);
        }
        for pattern in patterns {
            assert_eq!(
                table.lookup(&pattern),
                scan(&table, &pattern),
                "pattern {}",
                pretty_bytes(&pattern)
            );
        }
    }
}
