//! Identifier derivation
//!
//! Creator ids come from names, issue ids from the source page URL.

/// Derive a creator id from a display name
///
/// Lowercased, with spaces replaced by underscores: "Chip Zdarsky" -> "chip_zdarsky".
pub fn creator_id(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Extract an issue id from a source page URL
///
/// The id is the last non-empty path segment, ignoring any query or fragment.
pub fn issue_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .map(str::trim)
        .find(|segment| !segment.is_empty())
        .filter(|segment| !segment.contains(':'))
        .map(str::to_string)
}
