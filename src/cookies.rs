//! Cookie-string parsing.
//!
//! The server issues its CSRF token as a cookie; the CLI stores the raw
//! `Cookie` header line captured from an authenticated browser session and
//! reads individual values back out of it.

/// Returns the URL-decoded value of the named cookie, or `None` if the
/// cookie is absent or its value is not valid percent-encoding.
///
/// The header is split on `;`, each pair is trimmed, and the first pair
/// whose name matches exactly wins.
pub fn read_cookie(header: &str, name: &str) -> Option<String> {
    if header.is_empty() {
        return None;
    }
    for pair in header.split(';') {
        let pair = pair.trim();
        if let Some(value) = pair.strip_prefix(name).and_then(|v| v.strip_prefix('=')) {
            return urlencoding::decode(value).ok().map(|v| v.into_owned());
        }
    }
    None
}
