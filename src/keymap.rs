//! Key Mapping
//!
//! Translates symbolic key names (`UP`, `F5`, `PAGE_DOWN`, ...) into the
//! byte sequences a host application expects.
//!
//! Entries may be prefixed with a terminal type (`XTERM_`, `VT100_`, `VT52_`)
//! or with `APP_` for application cursor keys mode. A lookup first tries the
//! prefixed name and then falls back to the plain key.

use tracing::trace;

const KEY_MAPPINGS: &[(&str, &[u8])] = &[
    // Defaults, valid for most VT100 and xterm variants
    ("F1", b"\x1bOP"),
    ("F2", b"\x1bOQ"),
    ("F3", b"\x1bOR"),
    ("F4", b"\x1bOS"),
    ("F5", b"\x1b[15~"),
    ("F6", b"\x1b[17~"),
    ("F7", b"\x1b[18~"),
    ("F8", b"\x1b[19~"),
    ("F9", b"\x1b[20~"),
    ("F10", b"\x1b[21~"),
    ("F11", b"\x1b[23~"),
    ("F12", b"\x1b[24~"),
    ("PAGE_UP", b"\x1b[5~"),
    ("PAGE_DOWN", b"\x1b[6~"),
    ("INSERT", b"\x1b[2~"),
    ("DELETE", b"\x1b[3~"),
    ("HOME", b"\x1b[H"),
    ("END", b"\x1b[F"),
    ("ENTER", b"\r"),
    ("BACKSPACE", b"\x08"),
    ("TAB", b"\t"),
    ("UP", b"\x1b[A"),
    ("DOWN", b"\x1b[B"),
    ("RIGHT", b"\x1b[C"),
    ("LEFT", b"\x1b[D"),
    // Application cursor keys (DECCKM)
    ("APP_UP", b"\x1bOA"),
    ("APP_DOWN", b"\x1bOB"),
    ("APP_RIGHT", b"\x1bOC"),
    ("APP_LEFT", b"\x1bOD"),
    ("XTERM_UP", b"\x1b[A"),
    ("XTERM_DOWN", b"\x1b[B"),
    ("XTERM_RIGHT", b"\x1b[C"),
    ("XTERM_LEFT", b"\x1b[D"),
    ("XTERM_F1", b"\x1bOP"),
    ("XTERM_F2", b"\x1bOQ"),
    ("XTERM_F3", b"\x1bOR"),
    ("XTERM_F4", b"\x1bOS"),
    ("XTERM_F5", b"\x1b[15~"),
    ("XTERM_F6", b"\x1b[17~"),
    ("XTERM_F7", b"\x1b[18~"),
    ("XTERM_F8", b"\x1b[19~"),
    ("XTERM_F9", b"\x1b[20~"),
    ("XTERM_F10", b"\x1b[21~"),
    ("XTERM_F11", b"\x1b[23~"),
    ("XTERM_F12", b"\x1b[24~"),
    ("VT100_UP", b"\x1bOA"),
    ("VT100_DOWN", b"\x1bOB"),
    ("VT100_RIGHT", b"\x1bOC"),
    ("VT100_LEFT", b"\x1bOD"),
    ("VT52_UP", b"\x1bA"),
    ("VT52_DOWN", b"\x1bB"),
    ("VT52_RIGHT", b"\x1bC"),
    ("VT52_LEFT", b"\x1bD"),
    ("VT52_F1", b"\x1bP"),
    ("VT52_F2", b"\x1bQ"),
    ("VT52_F3", b"\x1bR"),
    ("VT52_F4", b"\x1bS"),
];

fn find(name: &str) -> Option<&'static [u8]> {
    KEY_MAPPINGS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, bytes)| *bytes)
}

/// Look up a key, trying `<prefix>_<key>` before `<key>`. Case-insensitive.
pub fn key_code(prefix: Option<&str>, key: &str) -> Option<&'static [u8]> {
    let prefixed = prefix.and_then(|p| find(&format!("{}_{}", p, key)));
    let code = prefixed.or_else(|| find(key));
    trace!("Mapping key {:?} (prefix {:?}) -> {:?}", key, prefix, code);
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_keys() {
        assert_eq!(key_code(None, "F5"), Some(&b"\x1b[15~"[..]));
        assert_eq!(key_code(None, "ENTER"), Some(&b"\r"[..]));
        assert_eq!(key_code(None, "page_down"), Some(&b"\x1b[6~"[..]));
    }

    #[test]
    fn test_prefixed_lookup() {
        assert_eq!(key_code(Some("APP"), "UP"), Some(&b"\x1bOA"[..]));
        assert_eq!(key_code(Some("vt52"), "left"), Some(&b"\x1bD"[..]));
        assert_eq!(key_code(Some("xterm"), "F10"), Some(&b"\x1b[21~"[..]));
    }

    #[test]
    fn test_prefix_falls_back_to_plain_key() {
        assert_eq!(key_code(Some("APP"), "HOME"), Some(&b"\x1b[H"[..]));
        assert_eq!(key_code(Some("vt52"), "F5"), Some(&b"\x1b[15~"[..]));
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(key_code(Some("xterm"), "HYPER"), None);
        assert_eq!(key_code(None, ""), None);
    }
}
