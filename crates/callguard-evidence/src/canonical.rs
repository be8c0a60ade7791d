//! Reference canonicalization and multi-reference splitting

use callguard_domain::CanonicalReference;
use once_cell::sync::Lazy;
use regex::Regex;

static PARENTHETICAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(.*?\)").unwrap());

/// Strip parenthetical annotations and collapse whitespace
///
/// # Examples
///
/// ```
/// use callguard_evidence::canonicalize;
///
/// let r = canonicalize("민원처리법 제23조 (3회 이상 반복 시 종결)");
/// assert_eq!(r.as_str(), "민원처리법 제23조");
/// ```
pub fn canonicalize(raw: &str) -> CanonicalReference {
    CanonicalReference::new(&PARENTHETICAL_RE.replace_all(raw, ""))
}

/// Split a multi-reference string on `;` and `,`
///
/// Separators inside parentheses do not split, so an annotation such as
/// "(협박, 위협)" stays attached to its reference until canonicalization
/// removes it. Blank parts are dropped.
pub fn split_references(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' | ',' if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
