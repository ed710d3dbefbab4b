//! Lexical utilities
//!
//! Pure, allocation-light helpers shared by every higher layer of the
//! translator. Nothing in here inspects dialect semantics.

/// Removes leading and trailing ASCII/Unicode whitespace.
pub fn trim(s: &str) -> &str {
    s.trim()
}

/// Returns the first `k` characters of `s`, or the whole string if shorter.
pub fn starts_with_k(s: &str, k: usize) -> &str {
    match s.char_indices().nth(k) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Scans backwards from byte offset `i`, skipping whitespace, and returns
/// the maximal `[A-Za-z0-9_]+` run ending just before the first
/// non-whitespace character encountered.
pub fn read_identifier_backwards(s: &str, i: usize) -> &str {
    let bytes = s.as_bytes();
    let mut pos = i.min(bytes.len());
    while pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
        pos -= 1;
    }
    let end = pos;
    while pos > 0 && is_ident_byte(bytes[pos - 1]) {
        pos -= 1;
    }
    &s[pos..end]
}

/// Scans forwards from byte offset `i`, skipping whitespace, and returns
/// the maximal `[A-Za-z0-9_]+` run starting just after the first
/// non-whitespace character encountered.
pub fn read_identifier_forwards(s: &str, i: usize) -> &str {
    let bytes = s.as_bytes();
    let mut pos = i.min(bytes.len());
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    let start = pos;
    while pos < bytes.len() && is_ident_byte(bytes[pos]) {
        pos += 1;
    }
    &s[start..pos]
}

/// Replaces all non-overlapping occurrences of `find` with `replace`,
/// scanning left to right. After a replacement the scan resumes after the
/// replacement text, so `replace` is never re-scanned for further matches.
pub fn str_replace(text: &str, find: &str, replace: &str) -> String {
    if find.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(find) {
        out.push_str(&rest[..pos]);
        out.push_str(replace);
        rest = &rest[pos + find.len()..];
    }
    out.push_str(rest);
    out
}
