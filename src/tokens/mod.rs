//! Token splitter (verb module)
//!
//! Splits multi-valued request parameters into tokens. Separators nested in
//! `[...]` or `(...)` belong to the token they appear in, so
//! `a,b(region|id-in[1,2]),c` is three tokens.

/// Split a comma-separated list at top level
///
/// Tokens are trimmed and empty tokens are dropped.
pub fn split_list(input: &str) -> Vec<&str> {
    split_top_level(input, ',')
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split an optional parameter, treating absent as empty
pub fn split_optional(input: Option<&str>) -> Vec<&str> {
    input.map(split_list).unwrap_or_default()
}

/// Split at every top-level occurrence of `separator`
pub fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Split at the last top-level occurrence of `separator`
pub fn split_last_top_level(input: &str, separator: char) -> Option<(&str, &str)> {
    let mut depth: i32 = 0;
    let mut found = None;

    for (i, c) in input.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            c if c == separator && depth == 0 => found = Some(i),
            _ => {}
        }
    }
    found.map(|i| (&input[..i], &input[i + separator.len_utf8()..]))
}

/// Check that brackets and parentheses open and close in order
pub fn is_balanced(input: &str) -> bool {
    let mut stack = Vec::new();
    for c in input.chars() {
        match c {
            '[' | '(' => stack.push(c),
            ']' if stack.pop() != Some('[') => return false,
            ')' if stack.pop() != Some('(') => return false,
            _ => {}
        }
    }
    stack.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_respects_brackets() {
        assert_eq!(
            split_list("region|id-in[US,CA],product|desc-eq[toy]"),
            vec!["region|id-in[US,CA]", "product|desc-eq[toy]"]
        );
        assert_eq!(
            split_list("revenue, clicks(region|id-in[1,2]) ,"),
            vec!["revenue", "clicks(region|id-in[1,2])"]
        );
    }

    #[test]
    fn test_split_optional() {
        assert!(split_optional(None).is_empty());
        assert!(split_optional(Some("  , ")).is_empty());
        assert_eq!(split_optional(Some("a")), vec!["a"]);
    }

    #[test]
    fn test_split_last_top_level() {
        assert_eq!(split_last_top_level("revenue|desc", '|'), Some(("revenue", "desc")));
        assert_eq!(
            split_last_top_level("revenue(region|id-in[US])|asc", '|'),
            Some(("revenue(region|id-in[US])", "asc"))
        );
        assert_eq!(split_last_top_level("revenue(region|id-in[US])", '|'), None);
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("a(b[c])"));
        assert!(!is_balanced("a[b"));
        assert!(!is_balanced("a(b]"));
        assert!(!is_balanced("a]"));
    }
}
