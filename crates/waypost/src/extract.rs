//! Postal code extraction from inbound message text.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Five digits on word boundaries. A ZIP+4 suffix is accepted and dropped;
/// longer digit runs never match because the trailing boundary fails.
static ZIP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").expect("ZIP pattern is valid"));

/// Pull candidate ZIP codes out of free-form message text, in first-seen
/// order, without duplicates.
///
/// ```rust
/// use waypost::extract_postal_codes;
///
/// let codes = extract_postal_codes("Flooded out near 68850, was at 71301-4403 before. 68850 again");
/// assert_eq!(codes, vec!["68850".to_string(), "71301".to_string()]);
/// ```
pub fn extract_postal_codes(text: &str) -> Vec<String> {
    ZIP_CODE
        .captures_iter(text)
        .map(|captures| captures[1].to_owned())
        .unique()
        .collect()
}
