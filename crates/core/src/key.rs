//! Storage key extraction
//!
//! Objects can be referred to either by their bare key (`photo.jpg`) or by
//! the full access URL the service handed out
//! (`https://host/user/bucket/photo.jpg`). Every operation that takes a key
//! accepts both forms and reduces them to the bare key first.

/// Reduce a bare key or an object URL to the bare key.
///
/// Returns everything after the last `/`, or the input unchanged when it
/// contains none. No validation is done: `"a/b/"` yields `""`, which the
/// remote service will reject.
pub fn extract_key(key_or_url: &str) -> &str {
    match key_or_url.rfind('/') {
        Some(pos) => &key_or_url[pos + 1..],
        None => key_or_url,
    }
}
