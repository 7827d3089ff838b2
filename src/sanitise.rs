// 🧼 Name sanitisation used for organisation identifiers inside feed ids
//
// Region and group names become the primary identifier of their feed entries,
// so every component that builds or matches an id goes through this function.

use once_cell::sync::Lazy;
use regex::Regex;

/// Whitespace plus hyphen-minus, the U+2010..U+2015 dash block and U+2212 minus
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-\x{2010}-\x{2015}\x{2212}]+").expect("valid regex"));

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").expect("valid regex"));

static REPEATED_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").expect("valid regex"));

/// Sanitise a display name into an identifier fragment
///
/// # Examples:
/// ```
/// use funding_feed_mock::sanitise_name;
/// assert_eq!(sanitise_name("Bristol, City of"), "Bristol_City_of");
/// ```
pub fn sanitise_name(name: &str) -> String {
    let separated = SEPARATORS.replace_all(name, "_");
    let words = NON_WORD.replace_all(&separated, "");
    let collapsed = REPEATED_UNDERSCORES.replace_all(&words, "_");
    collapsed.trim_matches('_').to_string()
}
