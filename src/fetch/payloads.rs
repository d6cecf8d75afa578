use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Byte lengths of responses that are structurally 200 OK but are really an
/// upstream "not found" placeholder, keyed by source name.
///
/// The pokemontcg.io API serves a fixed 186,316-byte placeholder image for
/// missing cards.
static KNOWN_ERROR_PAYLOADS: Lazy<HashMap<&'static str, &'static [usize]>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, &'static [usize]> = HashMap::new();
    table.insert("pokemontcg_api", &[186_316]);
    table
});

/// Whether a response body of `length` bytes from `source_name` matches a
/// known error placeholder.
pub fn is_known_error_payload(source_name: &str, length: usize) -> bool {
    KNOWN_ERROR_PAYLOADS
        .get(source_name)
        .is_some_and(|lengths| lengths.contains(&length))
}
