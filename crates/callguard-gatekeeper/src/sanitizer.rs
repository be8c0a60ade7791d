//! Line-level rewriting of a synthesized answer

use crate::policy::AllowPolicy;
use callguard_domain::answer::HEADLINE_MARKER;
use callguard_domain::{AllowedCategorySet, EvidenceItem};
use callguard_lexicon::{looks_like_legal_reference, Lexicon};
use std::sync::Arc;
use tracing::debug;

const BULLET_OPEN: &str = "- **";
const BOLD_CLOSE: &str = "**";

/// Final content gate: drops and rewrites anything the allow-list does not license
#[derive(Debug, Clone)]
pub struct Sanitizer {
    lexicon: Arc<Lexicon>,
}

impl Sanitizer {
    /// Sanitizer using `lexicon`'s category vocabulary
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Rewrite `answer` so it mentions only allowed categories and references
    ///
    /// - A bold bullet naming a legal reference is dropped unless that
    ///   reference appears in `evidence`; kept bullets have only their
    ///   description scrubbed.
    /// - The headline line is replaced by a sentence naming the single primary
    ///   category, or dropped when there is none.
    /// - Every other line has banned keywords replaced.
    ///
    /// Runs of blank lines collapse to one and the result is trimmed. Applying
    /// the sanitizer to its own output changes nothing.
    pub fn sanitize(
        &self,
        answer: &str,
        evidence: &[EvidenceItem],
        allowed: &AllowedCategorySet,
    ) -> String {
        if answer.trim().is_empty() {
            return String::new();
        }
        let policy = AllowPolicy::new(&self.lexicon, evidence, allowed);

        let mut dropped = 0usize;
        let mut lines: Vec<String> = Vec::new();
        for raw in answer.lines() {
            let line = raw.trim_end();

            if let Some((prefix, label, rest)) = split_bullet(line) {
                if looks_like_legal_reference(label) {
                    if !policy.allows_reference(label) {
                        dropped += 1;
                        continue;
                    }
                    lines.push(format!("{}{}", prefix, policy.scrub(rest)));
                    continue;
                }
            }

            if line.contains(HEADLINE_MARKER) {
                match policy.primary() {
                    Some(primary) => lines.push(headline(primary)),
                    None => dropped += 1,
                }
                continue;
            }

            lines.push(policy.scrub(line));
        }
        debug!(
            dropped,
            banned = policy.banned().len(),
            "Sanitized answer"
        );

        collapse_blank_lines(&lines)
    }
}

/// Rewritten headline naming one category
pub fn headline(primary: &str) -> String {
    format!(
        "{} ‘{}’에 해당할 수 있으며, 관련 법률로는 다음과 같습니다.",
        HEADLINE_MARKER, primary
    )
}

/// `- **label**rest` split into (prefix through the closing `**`, label, rest)
fn split_bullet(line: &str) -> Option<(&str, &str, &str)> {
    let indent = line.len() - line.trim_start().len();
    let body = line[indent..].strip_prefix(BULLET_OPEN)?;
    let close = body.find(BOLD_CLOSE)?;
    let prefix_end = indent + BULLET_OPEN.len() + close + BOLD_CLOSE.len();
    Some((&line[..prefix_end], body[..close].trim(), &line[prefix_end..]))
}

fn collapse_blank_lines(lines: &[String]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for line in lines {
        let blank = line.trim().is_empty();
        if blank && out.last().map_or(true, |prev| prev.trim().is_empty()) {
            continue;
        }
        out.push(if blank { "" } else { line.as_str() });
    }
    out.join("\n").trim().to_string()
}
