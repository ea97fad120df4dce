//! Codepoint primitives used by the path lexer.
//!
//! The lexer works on raw bytes and decodes one codepoint at a time, so
//! malformed input is reported at the exact position where it occurs instead
//! of failing up front on the whole string.

/// Outcome of decoding the codepoint at the front of a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A codepoint and the number of bytes it occupies
    Char(char, usize),
    /// The bytes can never start a valid UTF-8 sequence
    Invalid,
    /// A valid prefix of a multi-byte sequence that ends too early
    Partial,
    /// No bytes left
    End,
}

/// Decodes the first codepoint of `bytes`.
///
/// # Example
///
/// ```
/// use ypath::ypath::utf8::{decode_one, Decoded};
///
/// assert_eq!(decode_one("é!".as_bytes()), Decoded::Char('é', 2));
/// assert_eq!(decode_one(&[0xc3]), Decoded::Partial);
/// assert_eq!(decode_one(&[0xff]), Decoded::Invalid);
/// assert_eq!(decode_one(b""), Decoded::End);
/// ```
pub fn decode_one(bytes: &[u8]) -> Decoded {
    let first = match bytes.first() {
        Some(b) => *b,
        None => return Decoded::End,
    };

    let width = match first {
        0x00..=0x7f => return Decoded::Char(first as char, 1),
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return Decoded::Invalid,
    };

    if bytes.len() < width {
        let continuation = bytes[1..].iter().all(|b| b & 0xc0 == 0x80);
        return if continuation {
            Decoded::Partial
        } else {
            Decoded::Invalid
        };
    }

    match std::str::from_utf8(&bytes[..width]) {
        Ok(s) => match s.chars().next() {
            Some(c) => Decoded::Char(c, width),
            None => Decoded::Invalid,
        },
        Err(_) => Decoded::Invalid,
    }
}

/// How [`format_escaped`] renders a codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapePolicy {
    /// Only non-printable characters are escaped
    Plain,
    /// YAML double-quoted escapes, including `"` and `\`
    DoubleQuoted,
    /// YAML single-quoted rules: `'` doubles, nothing else changes
    SingleQuoted,
}

/// Renders one codepoint for diagnostics or for a quoted literal.
pub fn format_escaped(c: char, policy: EscapePolicy) -> String {
    match policy {
        EscapePolicy::SingleQuoted if c == '\'' => "''".to_string(),
        EscapePolicy::SingleQuoted => c.to_string(),
        EscapePolicy::DoubleQuoted if c == '"' => "\\\"".to_string(),
        EscapePolicy::DoubleQuoted if c == '\\' => "\\\\".to_string(),
        _ => match c {
            '\0' => "\\0".to_string(),
            '\u{07}' => "\\a".to_string(),
            '\u{08}' => "\\b".to_string(),
            '\t' => "\\t".to_string(),
            '\n' => "\\n".to_string(),
            '\u{0b}' => "\\v".to_string(),
            '\u{0c}' => "\\f".to_string(),
            '\r' => "\\r".to_string(),
            '\u{1b}' => "\\e".to_string(),
            '\u{85}' => "\\N".to_string(),
            '\u{a0}' => "\\_".to_string(),
            '\u{2028}' => "\\L".to_string(),
            '\u{2029}' => "\\P".to_string(),
            c if (c as u32) < 0x20 || c == '\u{7f}' => format!("\\x{:02x}", c as u32),
            c if c == '\u{feff}' || (0xfff0..=0xffff).contains(&(c as u32)) => {
                format!("\\u{:04x}", c as u32)
            }
            c => c.to_string(),
        },
    }
}

/// Decodes a double-quoted escape sequence.
///
/// `bytes` starts right after the backslash. Returns the decoded character
/// and the number of bytes consumed, or `None` if the escape is invalid.
///
/// # Example
///
/// ```
/// use ypath::ypath::utf8::decode_escape;
///
/// assert_eq!(decode_escape(b"n rest"), Some(('\n', 1)));
/// assert_eq!(decode_escape(b"x41"), Some(('A', 3)));
/// assert_eq!(decode_escape(b"u00e9"), Some(('é', 5)));
/// assert_eq!(decode_escape(b"q"), None);
/// ```
pub fn decode_escape(bytes: &[u8]) -> Option<(char, usize)> {
    let c = match bytes.first()? {
        b'0' => '\0',
        b'a' => '\u{07}',
        b'b' => '\u{08}',
        b't' | b'\t' => '\t',
        b'n' => '\n',
        b'v' => '\u{0b}',
        b'f' => '\u{0c}',
        b'r' => '\r',
        b'e' => '\u{1b}',
        b' ' => ' ',
        b'"' => '"',
        b'/' => '/',
        b'\\' => '\\',
        b'N' => '\u{85}',
        b'_' => '\u{a0}',
        b'L' => '\u{2028}',
        b'P' => '\u{2029}',
        b'x' => return hex_escape(bytes, 2),
        b'u' => return hex_escape(bytes, 4),
        b'U' => return hex_escape(bytes, 8),
        _ => return None,
    };
    Some((c, 1))
}

fn hex_escape(bytes: &[u8], digits: usize) -> Option<(char, usize)> {
    let hex = bytes.get(1..=digits)?;
    let text = std::str::from_utf8(hex).ok()?;
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(text, 16).ok()?;
    char::from_u32(value).map(|c| (c, digits + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_multibyte_widths() {
        assert_eq!(decode_one("a".as_bytes()), Decoded::Char('a', 1));
        assert_eq!(decode_one("€".as_bytes()), Decoded::Char('€', 3));
        assert_eq!(decode_one("😀".as_bytes()), Decoded::Char('😀', 4));
    }

    #[test]
    fn test_decode_truncated_and_broken_sequences() {
        // first two bytes of a three byte sequence
        assert_eq!(decode_one(&[0xe2, 0x82]), Decoded::Partial);
        // continuation byte replaced by ASCII
        assert_eq!(decode_one(&[0xe2, 0x41]), Decoded::Invalid);
        assert_eq!(decode_one(&[0xe2, 0x41, 0x41]), Decoded::Invalid);
        // overlong two byte lead
        assert_eq!(decode_one(&[0xc0, 0x80]), Decoded::Invalid);
        // lone continuation byte
        assert_eq!(decode_one(&[0x80]), Decoded::Invalid);
    }

    #[test]
    fn test_escape_roundtrip_through_double_quoted_policy() {
        for c in ['\n', '\t', '"', '\\', '\u{1b}', '\u{2028}'] {
            let escaped = format_escaped(c, EscapePolicy::DoubleQuoted);
            assert!(escaped.starts_with('\\'));
            assert_eq!(decode_escape(&escaped.as_bytes()[1..]), Some((c, escaped.len() - 1)));
        }
    }

    #[test]
    fn test_single_quoted_policy_only_doubles_quotes() {
        assert_eq!(format_escaped('\'', EscapePolicy::SingleQuoted), "''");
        assert_eq!(format_escaped('"', EscapePolicy::SingleQuoted), "\"");
        assert_eq!(format_escaped('x', EscapePolicy::Plain), "x");
        assert_eq!(format_escaped('\u{01}', EscapePolicy::Plain), "\\x01");
    }

    #[test]
    fn test_invalid_hex_escapes() {
        assert_eq!(decode_escape(b"x4"), None);
        assert_eq!(decode_escape(b"xzz"), None);
        // surrogate halves are not characters
        assert_eq!(decode_escape(b"ud800"), None);
        assert_eq!(decode_escape(b""), None);
    }
}
