//! What a single answer is allowed to mention

use callguard_domain::{AllowedCategorySet, EvidenceItem};
use callguard_evidence::canonicalize;
use callguard_lexicon::{tables, Lexicon};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use tracing::warn;

/// Allow-list derived from one response's evidence and allowed categories
#[derive(Debug, Clone)]
pub struct AllowPolicy {
    allowed_names: AllowedCategorySet,
    allowed_references: HashSet<String>,
    banned: Vec<BannedKeyword>,
    replacement: &'static str,
    primary: Option<String>,
}

/// A keyword that must not appear, with its compiled matcher
#[derive(Debug, Clone)]
pub struct BannedKeyword {
    keyword: String,
    pattern: Regex,
}

impl BannedKeyword {
    fn new(keyword: &str) -> Option<Self> {
        match RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => Some(Self {
                keyword: keyword.to_string(),
                pattern,
            }),
            Err(e) => {
                warn!(keyword, error = %e, "Skipping unmatchable banned keyword");
                None
            }
        }
    }

    /// The keyword text
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Replace every case-insensitive occurrence
    ///
    /// Korean compounds are scrubbed wherever the keyword appears, so "음란"
    /// is caught in "비음란" too. An ASCII keyword only matches a whole word:
    /// an occurrence glued to an ASCII letter or digit on either side is kept.
    pub fn replace_in(&self, line: &str, replacement: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        for m in self.pattern.find_iter(line) {
            if inside_ascii_word(line, m.start(), m.end()) {
                continue;
            }
            out.push_str(&line[last..m.start()]);
            out.push_str(replacement);
            last = m.end();
        }
        out.push_str(&line[last..]);
        out
    }
}

/// True when `line[start..end]` continues an ASCII word on either edge
fn inside_ascii_word(line: &str, start: usize, end: usize) -> bool {
    let matched = &line[start..end];
    let glued_before = matched.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
        && line[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric());
    let glued_after = matched.chars().next_back().is_some_and(|c| c.is_ascii_alphanumeric())
        && line[end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric());
    glued_before || glued_after
}

impl AllowPolicy {
    /// Build the policy for one answer
    ///
    /// Allowed names are `explicit` when it is non-empty, otherwise the
    /// categories of `evidence`. With no allowed name at all nothing is banned.
    pub fn new(lexicon: &Lexicon, evidence: &[EvidenceItem], explicit: &AllowedCategorySet) -> Self {
        let allowed_names: AllowedCategorySet = if explicit.is_empty() {
            evidence
                .iter()
                .filter(|e| e.is_valid())
                .map(|e| e.category.clone())
                .collect()
        } else {
            explicit.clone()
        };

        let allowed_references = evidence
            .iter()
            .map(|e| canonicalize(&e.legal_reference))
            .filter(|r| !r.is_empty())
            .map(|r| r.key().to_string())
            .collect();

        let replacement = replacement_term(&allowed_names);
        let banned = if allowed_names.is_empty() {
            Vec::new()
        } else {
            banned_keywords(lexicon, &allowed_names, replacement)
                .iter()
                .filter_map(|k| BannedKeyword::new(k))
                .collect()
        };
        let primary = primary_category(evidence, &allowed_names);

        Self {
            allowed_names,
            allowed_references,
            banned,
            replacement,
            primary,
        }
    }

    /// Category names the answer may mention
    pub fn allowed_names(&self) -> &AllowedCategorySet {
        &self.allowed_names
    }

    /// True when `reference` canonicalizes to a reference present in evidence
    pub fn allows_reference(&self, reference: &str) -> bool {
        self.allowed_references
            .contains(canonicalize(reference).key())
    }

    /// Banned keywords, longest first
    pub fn banned(&self) -> &[BannedKeyword] {
        &self.banned
    }

    /// Neutral wording substituted for banned keywords
    pub fn replacement(&self) -> &'static str {
        self.replacement
    }

    /// The single category named in the rewritten headline
    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Replace every banned keyword in `text`, longest first
    pub fn scrub(&self, text: &str) -> String {
        self.banned
            .iter()
            .fold(text.to_string(), |acc, k| k.replace_in(&acc, self.replacement))
    }
}

/// Neutral replacement wording by static priority of the allowed categories
pub fn replacement_term(allowed: &AllowedCategorySet) -> &'static str {
    tables::REPLACEMENT_TERMS
        .iter()
        .find(|(category, _)| allowed.contains(category))
        .map(|(_, term)| *term)
        .unwrap_or(tables::DEFAULT_REPLACEMENT)
}

/// Keywords of every disallowed category, longest first
///
/// Keywords shared with an allowed category and keywords contained in the
/// replacement term are never banned, so that scrubbing is stable.
pub fn banned_keywords(
    lexicon: &Lexicon,
    allowed: &AllowedCategorySet,
    replacement: &str,
) -> Vec<String> {
    let licensed: HashSet<String> = allowed
        .iter()
        .flat_map(|c| lexicon.keywords_for(c))
        .map(|k| k.to_lowercase())
        .collect();
    let replacement = replacement.to_lowercase();

    let mut banned: Vec<String> = lexicon
        .category_keywords()
        .iter()
        .filter(|c| !allowed.contains(&c.category))
        .flat_map(|c| c.keywords.iter())
        .map(|k| k.to_lowercase())
        .filter(|k| !k.trim().is_empty())
        .filter(|k| !licensed.contains(k) && !replacement.contains(k.as_str()))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    banned.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    banned
}

/// First evidence category that is allowed, else by table priority, else by name
pub fn primary_category(evidence: &[EvidenceItem], allowed: &AllowedCategorySet) -> Option<String> {
    evidence
        .iter()
        .map(|e| e.category.as_str())
        .find(|c| allowed.contains(c))
        .or_else(|| {
            tables::CATEGORY_PRIORITY
                .iter()
                .copied()
                .find(|c| allowed.contains(c))
        })
        .or_else(|| allowed.sorted().first().copied())
        .map(str::to_string)
}
