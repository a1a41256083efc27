//! Shared tokenizer for quoted entity-key literals.
//!
//! Both the source scanner and the reference extractor pull entity keys
//! out of loosely structured text. The grammar they share is deliberately
//! tiny:
//!
//! - **quoted literal**: `'some.key'` or `"some.key"` — a dot-delimited
//!   identifier inside matching single or double quotes
//! - **list of quoted literals**: any bracketed or braced collection of
//!   quoted literals, e.g. `['a.b', "c.d"]` or `{'a.b': 'field'}`
//!
//! Nothing else of the host language is parsed. One shared pattern keeps
//! the scanner and the extractor from drifting apart on quote handling.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a single quoted key literal, either quote style. Quote styles
/// must pair up; `'a.b"` is not a literal.
static QUOTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)'|"([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)""#)
        .expect("quoted-literal pattern is valid")
});

/// Extract the first quoted literal in `text`, if any.
pub fn first_quoted(text: &str) -> Option<&str> {
    QUOTED.captures(text).map(unquote)
}

/// Extract every quoted literal in `text`, left to right.
///
/// This is the list form of the grammar; it also serves the reference
/// extractor, which treats every quoted literal on a line as a candidate
/// key and filters against the key index afterward.
pub fn all_quoted(text: &str) -> Vec<&str> {
    QUOTED.captures_iter(text).map(unquote).collect()
}

fn unquote<'t>(caps: regex::Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Return the value text of a `name = value` directive when the trimmed
/// line starts with exactly `name`.
///
/// `name` must be followed by optional whitespace and `=`; a longer
/// identifier sharing the prefix (e.g. `_name_suffix`) does not match.
pub fn directive_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(name)?;
    let rest = rest.trim_start();
    rest.strip_prefix('=')
}

/// Return the quoted literal of a `name=<literal>` keyword argument
/// appearing anywhere in the line (e.g. `comodel_name='res.users'`).
pub fn keyword_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let mut search = line;
    while let Some(pos) = search.find(name) {
        // Reject matches inside a longer identifier.
        let before_ok = pos == 0
            || !search[..pos]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || c == '_');
        let after = &search[pos + name.len()..];
        let after = after.trim_start();
        if before_ok {
            if let Some(value) = after.strip_prefix('=') {
                if let Some(key) = first_quoted(value) {
                    return Some(key);
                }
            }
        }
        search = &search[pos + name.len()..];
    }
    None
}

/// Whether a directive value is the list/collection form rather than a
/// single literal.
pub fn is_list_form(value: &str) -> bool {
    matches!(value.trim_start().chars().next(), Some('[') | Some('{'))
}
