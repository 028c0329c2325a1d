//! Reply sequences written back to the host, and colour specifications

/// DECID and primary DA: VT100 with advanced video option
pub const PRIMARY_DA: &[u8] = b"\x1b[?1;2c";

/// Secondary DA: VT100, version 115, no firmware
pub const SECONDARY_DA: &[u8] = b"\x1b[>0;115;0c";

/// Tertiary DA: unit id
pub const TERTIARY_DA: &[u8] = b"\x1bP!|00000000\x1b\\";

/// DSR 5: terminal OK
pub const STATUS_OK: &[u8] = b"\x1b[0n";

/// XTVERSION: `DCS > | name(version) ST`
pub fn xt_version() -> Vec<u8> {
    format!(
        "\x1bP>|{}({})\x1b\\",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
    .into_bytes()
}

/// DSR 6 cursor position report, one based
pub fn cursor_position(x: usize, y: usize) -> Vec<u8> {
    format!("\x1b[{};{}R", y + 1, x + 1).into_bytes()
}

/// XTWINOPS 18: text area size in characters
pub fn text_area_size(columns: usize, rows: usize) -> Vec<u8> {
    format!("\x1b[8;{};{}t", rows, columns).into_bytes()
}

/// XTSMGRAPHICS reply: item, status, value
pub fn graphics_attribute(item: i32, status: i32, value: i32) -> Vec<u8> {
    format!("\x1b[?{};{};{}S", item, status, value).into_bytes()
}

/// OSC 4/5 colour query reply
pub fn color_report(kind: i32, index: u8, (r, g, b): (u8, u8, u8)) -> Vec<u8> {
    format!("\x1b]{};{};rgb:{:02x}/{:02x}/{:02x}\x1b\\", kind, index, r, g, b).into_bytes()
}

/// Parse an X11 colour specification: `rgb:R/G/B` with one to four hex
/// digits per channel, or `#RRGGBB`.
pub fn parse_color_spec(spec: &str) -> Option<(u8, u8, u8)> {
    if let Some(hex) = spec.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some((channel(0)?, channel(2)?, channel(4)?));
    }

    let mut channels = spec.strip_prefix("rgb:")?.split('/').map(scale_channel);
    let rgb = (channels.next()??, channels.next()??, channels.next()??);
    match channels.next() {
        None => Some(rgb),
        Some(_) => None,
    }
}

/// Scale a channel of 1-4 hex digits to 8 bits
fn scale_channel(digits: &str) -> Option<u8> {
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let max = (1u32 << (4 * digits.len())) - 1;
    Some((value * 255 / max) as u8)
}

/// Decode a hex-encoded string, as used by XTGETTCAP
pub fn hex_decode(hex: &str) -> Option<String> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }
    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_position() {
        assert_eq!(cursor_position(0, 0), b"\x1b[1;1R");
        assert_eq!(cursor_position(42, 13), b"\x1b[14;43R");
    }

    #[test]
    fn test_text_area_size() {
        assert_eq!(text_area_size(80, 24), b"\x1b[8;24;80t");
    }

    #[test]
    fn test_xt_version() {
        let reply = String::from_utf8(xt_version()).unwrap();
        assert!(reply.starts_with("\x1bP>|vtx-terminal("));
        assert!(reply.ends_with(")\x1b\\"));
    }

    #[test]
    fn test_color_report() {
        assert_eq!(
            color_report(4, 1, (205, 0, 255)),
            b"\x1b]4;1;rgb:cd/00/ff\x1b\\"
        );
    }

    #[test]
    fn test_parse_color_spec() {
        assert_eq!(parse_color_spec("rgb:ff/80/00"), Some((255, 128, 0)));
        assert_eq!(parse_color_spec("rgb:ffff/0000/8080"), Some((255, 0, 128)));
        assert_eq!(parse_color_spec("rgb:f/0/8"), Some((255, 0, 136)));
        assert_eq!(parse_color_spec("#102030"), Some((16, 32, 48)));
        assert_eq!(parse_color_spec("rgb:ff/80"), None);
        assert_eq!(parse_color_spec("rgb:ff/80/00/11"), None);
        assert_eq!(parse_color_spec("rgb:zz/00/00"), None);
        assert_eq!(parse_color_spec("red"), None);
    }

    #[test]
    fn test_hex_decode() {
        assert_eq!(hex_decode("544e").as_deref(), Some("TN"));
        assert_eq!(hex_decode("636f6c6f7273").as_deref(), Some("colors"));
        assert_eq!(hex_decode("5"), None);
        assert_eq!(hex_decode("zz"), None);
    }
}
