//! YAML tag boundary scanning.
//!
//! Key literals inside `{ ... }` may carry a tag, either in shorthand form
//! (`!local`, `!!str`, `!handle!suffix`) or verbatim (`!<tag:example.com,2000:x>`).
//! [`scan_tag`] only measures and validates the tag; resolving handles to
//! prefixes is left to the YAML loader.

/// Lengths of the parts of a tag, in bytes, in source order:
/// prefix (`!<` of a verbatim tag), handle, URI, suffix (the closing `>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagScan {
    pub prefix_length: usize,
    pub handle_length: usize,
    pub uri_length: usize,
    pub suffix_length: usize,
}

impl TagScan {
    /// Total number of bytes covered by the tag.
    pub fn total_length(&self) -> usize {
        self.prefix_length + self.handle_length + self.uri_length + self.suffix_length
    }

    pub fn is_verbatim(&self) -> bool {
        self.prefix_length > 0
    }
}

/// Scans the tag at the front of `bytes`.
///
/// Returns `None` when `bytes` does not start with a well formed tag, for
/// instance an unterminated verbatim tag, a named handle without a suffix, or
/// a `%` escape not followed by two hex digits.
///
/// # Example
///
/// ```
/// use ypath::ypath::tag::scan_tag;
///
/// let scan = scan_tag(b"!!str 1").unwrap();
/// assert_eq!((scan.handle_length, scan.uri_length), (2, 3));
///
/// let scan = scan_tag(b"!<tag:x,2024:t> v").unwrap();
/// assert_eq!(scan.total_length(), 15);
///
/// assert!(scan_tag(b"!<open").is_none());
/// ```
pub fn scan_tag(bytes: &[u8]) -> Option<TagScan> {
    if bytes.first() != Some(&b'!') {
        return None;
    }

    if bytes.get(1) == Some(&b'<') {
        let uri_length = scan_uri(&bytes[2..], true)?;
        if uri_length == 0 || bytes.get(2 + uri_length) != Some(&b'>') {
            return None;
        }
        return Some(TagScan {
            prefix_length: 2,
            handle_length: 0,
            uri_length,
            suffix_length: 1,
        });
    }

    let mut i = 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    let handle_length = if bytes.get(i) == Some(&b'!') { i + 1 } else { 1 };

    let uri_length = scan_uri(&bytes[handle_length..], false)?;
    if handle_length > 1 && uri_length == 0 {
        return None;
    }

    Some(TagScan {
        prefix_length: 0,
        handle_length,
        uri_length,
        suffix_length: 0,
    })
}

/// Measures URI characters. Shorthand suffixes exclude `!` and the flow
/// indicators.
fn scan_uri(bytes: &[u8], verbatim: bool) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(|h| h.is_ascii_hexdigit()) {
                return None;
            }
            i += 3;
            continue;
        }
        let allowed = b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'-' | b'#' | b';' | b'/' | b'?' | b':' | b'@' | b'&' | b'=' | b'+' | b'$' | b'_'
                    | b'.' | b'~' | b'*' | b'\'' | b'(' | b')'
            )
            || (verbatim && matches!(b, b'!' | b',' | b'[' | b']'));
        if !allowed {
            break;
        }
        i += 1;
    }
    Some(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_handle() {
        let scan = scan_tag(b"!local value").unwrap();
        assert_eq!(scan.handle_length, 1);
        assert_eq!(scan.uri_length, 5);
        assert!(!scan.is_verbatim());
    }

    #[test]
    fn test_named_handle() {
        let scan = scan_tag(b"!e!tag%21 x").unwrap();
        assert_eq!(scan.handle_length, 3);
        assert_eq!(scan.uri_length, 6);
    }

    #[test]
    fn test_non_specific_tag_is_valid() {
        let scan = scan_tag(b"! x").unwrap();
        assert_eq!(scan.total_length(), 1);
    }

    #[test]
    fn test_malformed_tags() {
        assert!(scan_tag(b"!!").is_none());
        assert!(scan_tag(b"!!%zz").is_none());
        assert!(scan_tag(b"!<>").is_none());
        assert!(scan_tag(b"str").is_none());
    }

    #[test]
    fn test_suffix_stops_at_flow_indicator() {
        let scan = scan_tag(b"!!str}").unwrap();
        assert_eq!(scan.total_length(), 5);
    }
}
