//! Output escaping and URL encoding.
//!
//! Fast-path strategy: scan for the first byte that needs attention,
//! bulk-copy everything before it, then walk the remainder through a
//! lookup table.

use std::borrow::Cow;

use memchr::{memchr, memchr3};

/// Bytes escaped in HTML text content.
const TEXT_ESCAPES: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table
};

/// Escape HTML text content into `out`.
///
/// Escapes `<`, `>`, `&` and `"` (the quote for CommonMark output
/// compatibility).
pub fn escape_html_into(out: &mut String, input: &str) {
    let bytes = input.as_bytes();
    let first = match first_escape(bytes) {
        Some(pos) => pos,
        None => {
            out.push_str(input);
            return;
        }
    };
    out.push_str(&input[..first]);

    let mut pos = first;
    while pos < bytes.len() {
        let start = pos;
        while pos < bytes.len() && !TEXT_ESCAPES[bytes[pos] as usize] {
            pos += 1;
        }
        if pos > start {
            out.push_str(&input[start..pos]);
        }
        if pos < bytes.len() {
            out.push_str(match bytes[pos] {
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'&' => "&amp;",
                _ => "&quot;",
            });
            pos += 1;
        }
    }
}

/// Escape and return a new string. Prefer [`escape_html_into`] when a
/// buffer is already at hand.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    escape_html_into(&mut out, input);
    out
}

#[inline]
fn first_escape(bytes: &[u8]) -> Option<usize> {
    let angle = memchr3(b'<', b'>', b'&', bytes);
    let quote = memchr(b'"', bytes);
    match (angle, quote) {
        (Some(a), Some(q)) => Some(a.min(q)),
        (Some(a), None) => Some(a),
        (None, Some(q)) => Some(q),
        (None, None) => None,
    }
}

/// Bytes that pass through URL percent-encoding untouched.
///
/// Unreserved characters plus the reserved set that CommonMark keeps
/// verbatim in destinations. `%` is kept so existing escapes are not
/// double-encoded.
const URL_SAFE: [bool; 256] = {
    let mut table = [false; 256];
    let mut b = 0usize;
    while b < 256 {
        let c = b as u8;
        if c.is_ascii_alphanumeric() {
            table[b] = true;
        }
        b += 1;
    }
    let extra = b"-_.~!*'();:@&=+$,/?#[]%";
    let mut i = 0;
    while i < extra.len() {
        table[extra[i] as usize] = true;
        i += 1;
    }
    table
};

/// Percent-encode a link destination for output.
///
/// Multi-byte UTF-8 sequences are encoded bytewise; already-encoded
/// `%xx` sequences are left alone.
pub fn encode_url(url: &str) -> String {
    let bytes = url.as_bytes();
    if bytes.iter().all(|&b| URL_SAFE[b as usize]) {
        return url.to_owned();
    }
    let mut out = String::with_capacity(url.len() + 8);
    for &b in bytes {
        if URL_SAFE[b as usize] {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
    }
    out
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Destination substituted for harmful-protocol links.
pub const HARMFUL_LINK: &str = "#harmful-link";

/// Whether a destination uses a scheme that must not reach `href`.
pub fn is_harmful_url(url: &str) -> bool {
    let trimmed = url.trim_start();
    for scheme in ["javascript:", "vbscript:", "data:"] {
        if trimmed.len() >= scheme.len()
            && trimmed[..scheme.len()].eq_ignore_ascii_case(scheme)
        {
            return true;
        }
    }
    false
}

/// Decode HTML entities (`&amp;`, `&#35;`, named references) in `input`.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    html_escape::decode_html_entities(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_text() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn encodes_urls() {
        assert_eq!(encode_url("/url"), "/url");
        assert_eq!(encode_url("https://x.y/a b"), "https://x.y/a%20b");
        assert_eq!(encode_url("/f%C3%B6o"), "/f%C3%B6o");
        assert_eq!(encode_url("/föo"), "/f%C3%B6o");
    }

    #[test]
    fn flags_harmful_schemes() {
        assert!(is_harmful_url("javascript:alert(1)"));
        assert!(is_harmful_url("JaVaScRiPt:x"));
        assert!(is_harmful_url("data:text/html,x"));
        assert!(!is_harmful_url("https://example.com"));
        assert!(!is_harmful_url("/relative"));
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#35;"), "#");
        assert_eq!(decode_entities("none"), "none");
    }
}
