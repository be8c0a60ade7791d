//! Canonical legal references (the deduplication key of evidence)

use std::fmt;
use std::hash::{Hash, Hasher};

/// A legal reference normalized for deduplication
///
/// The display form keeps the original casing; equality and hashing use the
/// case-folded key, so "Act s.5" and "ACT S.5" are the same reference.
/// Parenthetical annotations are stripped by the canonicalizer before a value
/// reaches this type.
#[derive(Debug, Clone)]
pub struct CanonicalReference {
    display: String,
    key: String,
}

impl CanonicalReference {
    /// Wrap an already-stripped reference, collapsing internal whitespace
    ///
    /// # Examples
    ///
    /// ```
    /// use callguard_domain::CanonicalReference;
    ///
    /// let a = CanonicalReference::new("형법   제283조 ");
    /// assert_eq!(a.as_str(), "형법 제283조");
    /// assert_eq!(a, CanonicalReference::new("형법 제283조"));
    /// ```
    pub fn new(value: &str) -> Self {
        let display = value.split_whitespace().collect::<Vec<_>>().join(" ");
        let key = display.to_lowercase();
        Self { display, key }
    }

    /// Display form (original case)
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Case-folded deduplication key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when nothing is left after normalization
    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }

    /// Consume into the display string
    pub fn into_string(self) -> String {
        self.display
    }
}

impl PartialEq for CanonicalReference {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CanonicalReference {}

impl Hash for CanonicalReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for CanonicalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}
