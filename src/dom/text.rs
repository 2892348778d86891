/// Collapse every run of whitespace to a single space and trim both ends.
///
/// All parsers run their patterns over text normalised this way, so none of
/// them has to cope with line breaks, tabs or non-breaking spaces.
pub fn clean_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ASCII case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}
