//! Item link normalization
//!
//! Links are stored exactly as they should be opened. Anything without an
//! `http://` or `https://` scheme gets `https://` prepended; no further URL
//! validation is done.

/// Normalize a raw link
///
/// Returns `None` when the input is blank.
pub fn normalize_link(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if has_http_scheme(value) {
        Some(value.to_string())
    } else {
        Some(format!("https://{}", value))
    }
}

fn has_http_scheme(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
