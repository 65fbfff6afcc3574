//! `Set-Cookie` re-splitting.
//!
//! Some upstream stacks fold several cookies into one comma-joined
//! `Set-Cookie` value. Commas are legal inside cookie attributes
//! (`Expires=Wed, 21 Oct 2026 07:28:00 GMT`), so a plain split corrupts them.
//!
//! # Grammar
//! ```text
//! combined   = cookie *( split-point cookie )
//! split-point = "," *WSP token "="      ; the token and "=" start the next cookie
//! token      = 1*tchar                  ; RFC 9110 tchar
//! WSP        = SP / HTAB
//! ```
//! A comma not followed by `*WSP token "="` belongs to the current cookie.
//!
//! Known limitation: a cookie *value* holding `, name=` (for example inside a
//! quoted string) is still split there. Nothing in the header tells the two
//! readings apart, so the ambiguity is left as is.

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}

/// If a new cookie assignment begins at `pos` (just after a comma), return
/// the index where it starts, skipping leading whitespace.
fn cookie_start(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    let start = i;
    while i < bytes.len() && is_tchar(bytes[i]) {
        i += 1;
    }
    (i > start && bytes.get(i) == Some(&b'=')).then_some(start)
}

/// Split a possibly comma-joined `Set-Cookie` value into individual cookies.
///
/// Order is preserved. Surrounding whitespace is trimmed and empty pieces are
/// dropped, so an empty input yields no cookies.
pub fn split_set_cookie(combined: &str) -> Vec<&str> {
    let bytes = combined.as_bytes();
    let mut cookies = Vec::new();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if b != b',' {
            continue;
        }
        if let Some(next) = cookie_start(bytes, i + 1) {
            cookies.push(&combined[start..i]);
            start = next;
        }
    }
    cookies.push(&combined[start..]);

    cookies
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Replace every `Set-Cookie` value in `headers` with its split pieces, one
/// header entry per cookie. A map without `Set-Cookie` is left untouched.
///
/// Values that are not valid UTF-8 are kept as they are.
pub fn resplit_set_cookie(headers: &mut HeaderMap) {
    if !headers.contains_key(SET_COOKIE) {
        return;
    }

    let mut cookies: Vec<HeaderValue> = Vec::new();
    for value in headers.get_all(SET_COOKIE) {
        match value.to_str() {
            Ok(combined) => {
                for cookie in split_set_cookie(combined) {
                    if let Ok(v) = HeaderValue::from_str(cookie) {
                        cookies.push(v);
                    }
                }
            }
            Err(_) => cookies.push(value.clone()),
        }
    }

    headers.remove(SET_COOKIE);
    for cookie in cookies {
        headers.append(SET_COOKIE, cookie);
    }
}
