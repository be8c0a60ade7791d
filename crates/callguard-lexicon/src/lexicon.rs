//! The immutable lexicon and its keyword matchers

use crate::error::LexiconError;
use crate::tables;
use callguard_domain::{AllowedCategorySet, EvidenceItem};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// A category with the vocabulary that signals it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryKeywords {
    /// Category name
    pub category: String,
    /// Keywords, matched case-insensitively as substrings
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
struct BadwordFile {
    badwords: Vec<String>,
}

#[derive(Deserialize)]
struct ForceBlockFile {
    force_block: Vec<String>,
}

/// Curated keyword tables, built once and shared read-only
#[derive(Debug, Clone)]
pub struct Lexicon {
    badwords: Vec<String>,
    force_block: HashSet<String>,
    categories: Vec<CategoryKeywords>,
}

impl Lexicon {
    /// Lexicon backed entirely by the compiled-in tables
    pub fn builtin() -> Self {
        Self::with_word_lists(
            tables::BADWORDS.iter().map(|w| w.to_string()).collect(),
            tables::FORCE_BLOCK.iter().map(|w| w.to_string()).collect(),
        )
    }

    /// Lexicon with custom profanity lists and the builtin category tables
    ///
    /// Every force-block word is also a badword, so that it can be detected.
    pub fn with_word_lists(badwords: Vec<String>, force_block: Vec<String>) -> Self {
        let force_block: Vec<String> = clean_words(force_block);
        let mut seen = HashSet::new();
        let badwords = clean_words(badwords)
            .into_iter()
            .chain(force_block.iter().cloned())
            .filter(|w| seen.insert(w.clone()))
            .collect();

        let categories = tables::CATEGORY_KEYWORDS
            .iter()
            .map(|(category, keywords)| CategoryKeywords {
                category: category.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .collect();

        Self {
            badwords,
            force_block: force_block.into_iter().collect(),
            categories,
        }
    }

    /// Load profanity lists from JSON files
    ///
    /// Expected shapes: `{"badwords": [...]}` and `{"force_block": [...]}`.
    pub fn from_files(
        badwords_path: impl AsRef<Path>,
        force_block_path: impl AsRef<Path>,
    ) -> Result<Self, LexiconError> {
        let badwords: BadwordFile = read_json(badwords_path.as_ref())?;
        let force_block: ForceBlockFile = read_json(force_block_path.as_ref())?;

        if badwords.badwords.iter().all(|w| w.trim().is_empty()) {
            return Err(LexiconError::Empty(
                badwords_path.as_ref().display().to_string(),
            ));
        }

        let lexicon = Self::with_word_lists(badwords.badwords, force_block.force_block);
        info!(
            badwords = lexicon.badwords.len(),
            force_block = lexicon.force_block.len(),
            "Loaded lexicon word lists"
        );
        Ok(lexicon)
    }

    /// (category, legal reference) hints for every keyword rule that fires
    ///
    /// Rules are evaluated in table order; at most `limit` hints are returned.
    pub fn keyword_hints(&self, text: &str, limit: usize) -> Vec<EvidenceItem> {
        tables::KEYWORD_RULES
            .iter()
            .filter(|(keywords, _, _)| keywords.iter().any(|k| text.contains(k)))
            .map(|(_, category, reference)| EvidenceItem::new(*category, *reference))
            .take(limit)
            .collect()
    }

    /// Categories whose vocabulary occurs in `text`, in table order
    pub fn detect_categories(&self, text: &str) -> AllowedCategorySet {
        let hay = text.to_lowercase();
        self.categories
            .iter()
            .filter(|c| c.keywords.iter().any(|k| hay.contains(&k.to_lowercase())))
            .map(|c| c.category.clone())
            .collect()
    }

    /// Category vocabulary table
    pub fn category_keywords(&self) -> &[CategoryKeywords] {
        &self.categories
    }

    /// Keywords of one category, empty when unknown
    pub fn keywords_for(&self, category: &str) -> &[String] {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// One-line brief for a canonical legal reference
    ///
    /// Exact table hit first, then the first keyword fallback contained in
    /// the reference, then a generic sentence.
    pub fn brief_for(&self, reference: &str) -> &'static str {
        let reference = reference.trim();
        if let Some((_, brief)) = tables::LAW_BRIEFS.iter().find(|(r, _)| *r == reference) {
            return *brief;
        }
        tables::BRIEF_FALLBACKS
            .iter()
            .find(|(keys, _)| keys.iter().any(|k| reference.contains(k)))
            .map(|(_, brief)| *brief)
            .unwrap_or(tables::GENERIC_BRIEF)
    }

    /// Keep Hangul syllables, ASCII letters, digits and whitespace; lower-case; trim
    pub fn normalize(text: &str) -> String {
        text.chars()
            .filter(|c| is_hangul_syllable(*c) || c.is_ascii_alphanumeric() || c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
            .trim()
            .to_string()
    }

    /// Badwords contained in already-normalized text, in list order
    pub fn matched_badwords(&self, normalized: &str) -> Vec<String> {
        self.badwords
            .iter()
            .filter(|w| normalized.contains(w.as_str()))
            .cloned()
            .collect()
    }

    /// True when `word` blocks without consulting the classifier
    pub fn is_force_block(&self, word: &str) -> bool {
        self.force_block.contains(word)
    }

    /// Profanity list
    pub fn badwords(&self) -> &[String] {
        &self.badwords
    }

    /// Greeting, thanks or test ping with no abuse vocabulary
    ///
    /// ASCII keywords must match a whole word so that "hi" does not fire on
    /// "this".
    pub fn is_smalltalk(&self, text: &str) -> bool {
        let hay = text.trim().to_lowercase();
        if hay.is_empty() || !self.detect_categories(&hay).is_empty() {
            return false;
        }
        tables::SMALLTALK_KEYWORDS
            .iter()
            .any(|k| keyword_in(&hay, k))
    }

    /// Canned reply for a smalltalk message
    pub fn smalltalk_reply(&self, text: &str) -> &'static str {
        let hay = text.to_lowercase();
        tables::SMALLTALK_REPLIES
            .iter()
            .find(|(keys, _)| keys.iter().any(|k| keyword_in(&hay, k)))
            .map(|(_, reply)| *reply)
            .unwrap_or(tables::SMALLTALK_DEFAULT_REPLY)
    }

    /// True when the operator asks what the caller actually said
    pub fn is_asking_caller_words(&self, text: &str) -> bool {
        tables::CALLER_WORDS_PHRASES.iter().any(|p| text.contains(p))
    }

    /// Reference notes for every keyword group present in `text`, `---` separated
    pub fn additional_laws_text(&self, text: &str) -> String {
        let notes: Vec<&str> = tables::ADDITIONAL_LAW_NOTES
            .iter()
            .filter(|(keys, _)| keys.iter().any(|k| text.contains(k)))
            .map(|(_, note)| *note)
            .collect();
        debug!(notes = notes.len(), "Collected additional law notes");
        notes.join("\n---\n")
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LexiconError> {
    let content = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LexiconError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn clean_words(words: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect()
}

fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

fn keyword_in(hay: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return hay.contains(keyword);
    }
    hay.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token == keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_keyword_hints_table_order() {
        let lexicon = Lexicon::builtin();
        let hints = lexicon.keyword_hints("고객이 폭언과 음담패설을 했습니다", 5);
        let categories: Vec<&str> = hints.iter().map(|h| h.category.as_str()).collect();
        assert_eq!(
            categories,
            vec![tables::SEXUAL_HARASSMENT, tables::THREAT, tables::INSULT]
        );
    }

    #[test]
    fn test_keyword_hints_limit() {
        let lexicon = Lexicon::builtin();
        let hints = lexicon.keyword_hints("폭언 업무방해 강요 스토킹", 2);
        assert_eq!(hints.len(), 2);
        assert!(lexicon.keyword_hints("날씨가 좋네요", 5).is_empty());
    }

    #[test]
    fn test_detect_categories_case_insensitive() {
        let lexicon = Lexicon::builtin();
        let set = lexicon.detect_categories("고객이 계속 스토킹하고 업무 방해를 해요");
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![tables::OBSTRUCTION, tables::STALKING]
        );
        assert!(lexicon.detect_categories("안내 감사합니다").is_unrestricted());
    }

    #[test]
    fn test_brief_lookup_and_fallbacks() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.brief_for("형법 제283조").contains("협박 행위"));
        assert_eq!(
            lexicon.brief_for("특수협박죄 조항"),
            "협박 행위 전반을 처벌합니다."
        );
        assert_eq!(lexicon.brief_for("민원처리법 제23조"), tables::GENERIC_BRIEF);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Lexicon::normalize("  씨~발!! ABC 12 "), "씨발 abc 12");
        assert_eq!(Lexicon::normalize("ㅅㅂ"), "");
    }

    #[test]
    fn test_force_block_words_are_badwords() {
        let lexicon = Lexicon::with_word_lists(vec!["바보".into()], vec!["씨발".into()]);
        assert_eq!(lexicon.badwords(), &["바보".to_string(), "씨발".to_string()]);
        assert!(lexicon.is_force_block("씨발"));
        assert!(!lexicon.is_force_block("바보"));
        assert_eq!(lexicon.matched_badwords("야 씨발 바보야"), vec!["바보", "씨발"]);
    }

    #[test]
    fn test_smalltalk() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.is_smalltalk("안녕하세요"));
        assert!(lexicon.is_smalltalk("Hi there"));
        assert!(!lexicon.is_smalltalk("what is this"));
        assert!(!lexicon.is_smalltalk("감사하다더니 갑자기 협박을 했어요"));
        assert_eq!(
            lexicon.smalltalk_reply("고마워요"),
            "별말씀을요! 도움이 되어 기뻐요. 또 궁금한 점 있으면 편하게 물어보세요."
        );
        assert_eq!(lexicon.smalltalk_reply("잘 지내?"), tables::SMALLTALK_DEFAULT_REPLY);
    }

    #[test]
    fn test_caller_words() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.is_asking_caller_words("고객이 뭐라고 했나요?"));
        assert!(!lexicon.is_asking_caller_words("고객 대응 방법 알려줘"));
    }

    #[test]
    fn test_additional_laws_text() {
        let lexicon = Lexicon::builtin();
        let text = lexicon.additional_laws_text("폭언을 들었어요");
        assert!(text.contains("형법 제283조"));
        assert!(text.contains("형법 제311조"));
        assert!(lexicon.additional_laws_text("평범한 문의").is_empty());
    }

    #[test]
    fn test_from_files() {
        let mut bad = NamedTempFile::new().unwrap();
        write!(bad, r#"{{"badwords": ["멍청이", " 멍청이 ", ""]}}"#).unwrap();
        let mut force = NamedTempFile::new().unwrap();
        write!(force, r#"{{"force_block": ["개새끼"]}}"#).unwrap();

        let lexicon = Lexicon::from_files(bad.path(), force.path()).unwrap();
        assert_eq!(lexicon.badwords().len(), 2);
        assert!(lexicon.is_force_block("개새끼"));
    }

    #[test]
    fn test_from_files_errors() {
        let mut empty = NamedTempFile::new().unwrap();
        write!(empty, r#"{{"badwords": []}}"#).unwrap();
        let mut force = NamedTempFile::new().unwrap();
        write!(force, r#"{{"force_block": []}}"#).unwrap();
        assert!(matches!(
            Lexicon::from_files(empty.path(), force.path()),
            Err(LexiconError::Empty(_))
        ));

        let mut broken = NamedTempFile::new().unwrap();
        write!(broken, "not json").unwrap();
        assert!(matches!(
            Lexicon::from_files(broken.path(), force.path()),
            Err(LexiconError::Json { .. })
        ));
        assert!(matches!(
            Lexicon::from_files("/nonexistent/badwords.json", force.path()),
            Err(LexiconError::Io { .. })
        ));
    }
}
