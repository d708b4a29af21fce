//! HTML escaping and entity reference utilities.
//!
//! Fast-path optimized: scans for first escapable character,
//! then bulk-copies segments between escapes.

use memchr::{memchr, memchr3};

use crate::limits;

/// Lookup table for escapable characters in text content.
/// Index by byte value, true if needs escaping.
/// Note: We escape " as &quot; for CommonMark compliance.
const TEXT_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table
};

/// Escape HTML text content into output buffer.
///
/// Escapes `<`, `>`, `&` and `"` to their HTML entity equivalents.
///
/// # Example
/// ```
/// use furimark::escape::escape_text_into;
///
/// let mut out = Vec::new();
/// escape_text_into(&mut out, "<《script》>".as_bytes());
/// assert_eq!(out, "&lt;《script》&gt;".as_bytes());
/// ```
#[inline]
pub fn escape_text_into(out: &mut Vec<u8>, input: &[u8]) {
    if input.is_empty() {
        return;
    }

    let mut pos = match first_text_escape(input) {
        Some(p) => p,
        None => {
            out.extend_from_slice(input);
            return;
        }
    };

    if pos > 0 {
        out.extend_from_slice(&input[..pos]);
    }

    while pos < input.len() {
        let scan_start = pos;
        while pos < input.len() && !TEXT_ESCAPE_TABLE[input[pos] as usize] {
            pos += 1;
        }

        if pos > scan_start {
            out.extend_from_slice(&input[scan_start..pos]);
        }

        if pos < input.len() {
            let escape_seq: &[u8] = match input[pos] {
                b'<' => b"&lt;",
                b'>' => b"&gt;",
                b'&' => b"&amp;",
                _ => b"&quot;",
            };
            out.extend_from_slice(escape_seq);
            pos += 1;
        }
    }
}

#[inline]
fn first_text_escape(input: &[u8]) -> Option<usize> {
    let a = memchr3(b'<', b'>', b'&', input);
    let b = memchr(b'"', input);
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Escape and return as a String.
///
/// Prefer `escape_text_into` to reuse buffers.
pub fn escape_text_to_string(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len() + input.len() / 8);
    escape_text_into(&mut out, input.as_bytes());
    // SAFETY: only ASCII sequences replace ASCII bytes, so valid UTF-8
    // input stays valid UTF-8
    unsafe { String::from_utf8_unchecked(out) }
}

/// Length of an entity or numeric character reference (`&amp;`, `&#38;`,
/// `&#x26;`) at the start of `s`.
///
/// Only the shape is checked; whether a named entity exists is up to the
/// decoder.
pub fn entity_ref_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'&') {
        return None;
    }
    let window = &bytes[..bytes.len().min(limits::MAX_ENTITY_LEN)];
    let semi = memchr(b';', window)?;
    let body = &bytes[1..semi];

    let valid = match body {
        [b'#', b'x' | b'X', hex @ ..] => {
            (1..=6).contains(&hex.len()) && hex.iter().all(u8::is_ascii_hexdigit)
        }
        [b'#', digits @ ..] => {
            (1..=7).contains(&digits.len()) && digits.iter().all(u8::is_ascii_digit)
        }
        [first, rest @ ..] => {
            first.is_ascii_alphabetic() && rest.iter().all(u8::is_ascii_alphanumeric)
        }
        [] => false,
    };
    valid.then_some(semi + 1)
}

/// Number of characters `text` shows in a browser, counting every entity
/// reference as one character.
pub fn visible_char_count(text: &str) -> usize {
    let mut count = 0;
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        count += rest[..amp].chars().count();
        let len = entity_ref_len(&rest[amp..]).unwrap_or(1);
        count += 1;
        rest = &rest[amp + len..];
    }
    count + rest.chars().count()
}
