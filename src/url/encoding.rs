//! Percent-encoding rules for URL serialization.
//!
//! The encoder is deliberately looser than a generic percent-encoder:
//! `@`, `:`, `$` and `,` stay literal everywhere, query strings also keep
//! `;`, and segments keep `&` but escape parentheses (which delimit
//! secondary outlets). The decoder accepts anything the encoder produces
//! and additionally maps `+` to space in query values.

/// Characters never escaped by the base encoder.
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
}

fn encode_with<F: Fn(char) -> bool>(s: &str, allowed: F) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if allowed(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

/// Base escape: unreserved characters plus `@`, `:`, `$` and `,`.
pub(crate) fn encode_uri_string(s: &str) -> String {
    encode_with(s, |c| is_unreserved(c) || matches!(c, '@' | ':' | '$' | ','))
}

/// Query keys and values additionally keep `;` literal.
pub(crate) fn encode_uri_query(s: &str) -> String {
    encode_with(s, |c| {
        is_unreserved(c) || matches!(c, '@' | ':' | '$' | ',' | ';')
    })
}

/// URL segments keep `&` literal but escape `(` and `)`, which would
/// otherwise read as outlet group delimiters.
pub(crate) fn encode_uri_segment(s: &str) -> String {
    encode_with(s, |c| {
        (is_unreserved(c) && c != '(' && c != ')') || matches!(c, '@' | ':' | '$' | ',' | '&')
    })
}

/// Fragments use the standard URI encoding: reserved characters stay.
pub(crate) fn encode_uri_fragment(s: &str) -> String {
    encode_with(s, |c| {
        is_unreserved(c)
            || matches!(
                c,
                ';' | '/' | '?' | ':' | '@' | '&' | '=' | '+' | '$' | ',' | '#'
            )
    })
}

/// Percent-decode. Malformed escape sequences are kept verbatim; invalid
/// UTF-8 decodes lossily.
pub(crate) fn decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (hex_val(bytes.get(i + 1)), hex_val(bytes.get(i + 2))) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Query values convert `+` to space before decoding.
pub(crate) fn decode_query(s: &str) -> String {
    decode(&s.replace('+', "%20"))
}

fn hex_val(b: Option<&u8>) -> Option<u8> {
    match b? {
        b @ b'0'..=b'9' => Some(b - b'0'),
        b @ b'a'..=b'f' => Some(b - b'a' + 10),
        b @ b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
