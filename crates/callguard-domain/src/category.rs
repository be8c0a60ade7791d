//! Allowed category sets (the allow-list of a response)

/// The categories a response is permitted to mention
///
/// Inferred from the operator's question or, failing that, from the call
/// transcript. An empty set means "unrestricted". Iteration follows insertion
/// order so that downstream choices stay deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedCategorySet {
    categories: Vec<String>,
}

impl AllowedCategorySet {
    /// An empty (unrestricted) set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category; duplicates and blank names are ignored
    pub fn insert(&mut self, category: impl Into<String>) -> bool {
        let category = category.into();
        let category = category.trim();
        if category.is_empty() || self.contains(category) {
            return false;
        }
        self.categories.push(category.to_string());
        true
    }

    /// Membership test (exact match)
    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// True when no restriction applies
    pub fn is_unrestricted(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// True when the set holds no category
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    /// Categories sorted by name, for prompts and logs
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.iter().collect();
        names.sort_unstable();
        names
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedCategorySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unrestricted() {
        let set = AllowedCategorySet::new();
        assert!(set.is_unrestricted());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_insert_dedups_and_keeps_order() {
        let set: AllowedCategorySet = ["스토킹", "강요", "스토킹", " "].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["스토킹", "강요"]);
        assert!(set.contains("강요"));
        assert!(!set.contains("업무방해"));
    }

    #[test]
    fn test_sorted() {
        let set: AllowedCategorySet = ["b", "a"].into_iter().collect();
        assert_eq!(set.sorted(), vec!["a", "b"]);
    }
}
