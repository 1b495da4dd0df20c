//! Parsing helpers shared by the native listing parsers.

/// Split an `address:port` column into its parts.
///
/// Handles:
/// - IPv4: "127.0.0.1:3000", "*:8080", "127.0.0.53%lo:53"
/// - IPv6: "\[::1]:3000", "\[fe80::1]:8080"
///
/// Returns `None` when the port is a wildcard or not a number.
pub fn parse_address(address: &str) -> Option<(String, u16)> {
    if address.starts_with('[') {
        let bracket_end = address.find(']')?;
        if bracket_end + 1 >= address.len() || address.as_bytes()[bracket_end + 1] != b':' {
            return None;
        }
        let addr = &address[..=bracket_end];
        let port: u16 = address[bracket_end + 2..].parse().ok()?;
        Some((addr.to_string(), port))
    } else {
        let last_colon = address.rfind(':')?;
        let addr = &address[..last_colon];
        let port: u16 = address[last_colon + 1..].parse().ok()?;
        let addr = if addr.is_empty() { "*" } else { addr };
        Some((addr.to_string(), port))
    }
}

/// Decode `\xNN` escapes that lsof uses in process names.
///
/// Escapes decode to raw bytes, so a UTF-8 name split across several
/// escapes comes back intact. Invalid sequences become U+FFFD.
pub fn decode_escaped(input: &str) -> String {
    let mut bytes = Vec::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find("\\x") {
        bytes.extend_from_slice(rest[..pos].as_bytes());
        let after = &rest[pos + 2..];
        let hex = after.get(..2).filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()));
        match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
            Some(byte) => {
                bytes.push(byte);
                rest = &after[2..];
            }
            None => {
                bytes.extend_from_slice(b"\\x");
                rest = after;
            }
        }
    }

    bytes.extend_from_slice(rest.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4_address() {
        assert_eq!(parse_address("127.0.0.1:3000"), Some(("127.0.0.1".to_string(), 3000)));
        assert_eq!(parse_address("*:8080"), Some(("*".to_string(), 8080)));
        assert_eq!(parse_address("127.0.0.53%lo:53"), Some(("127.0.0.53%lo".to_string(), 53)));
    }

    #[test]
    fn test_parse_ipv6_address() {
        assert_eq!(parse_address("[::1]:3000"), Some(("[::1]".to_string(), 3000)));
        assert_eq!(parse_address("[fe80::1]:8080"), Some(("[fe80::1]".to_string(), 8080)));
    }

    #[test]
    fn test_parse_address_rejects_wildcard_and_garbage() {
        assert_eq!(parse_address("*:*"), None);
        assert_eq!(parse_address("0.0.0.0:*"), None);
        assert_eq!(parse_address("invalid"), None);
        assert_eq!(parse_address("[::1]"), None);
        assert_eq!(parse_address("[::1]3000"), None);
        assert_eq!(parse_address("host:99999"), None);
    }

    #[test]
    fn test_decode_escaped() {
        assert_eq!(decode_escaped("Code\\x20Helper"), "Code Helper");
        assert_eq!(decode_escaped("path\\x2fto"), "path/to");
        assert_eq!(decode_escaped("no_escapes"), "no_escapes");
        assert_eq!(decode_escaped("test\\x"), "test\\x");
        assert_eq!(decode_escaped("test\\x2"), "test\\x2");
    }

    #[test]
    fn test_decode_escaped_multibyte_utf8() {
        assert_eq!(decode_escaped("caf\\xc3\\xa9"), "café");
        assert_eq!(decode_escaped("\\xe6\\x9c\\x8d\\xe5\\x8a\\xa1"), "服务");
        assert_eq!(decode_escaped("bad\\xff"), "bad\u{FFFD}");
    }
}
