use regex::Regex;

use super::config::SegmentConfig;

/// Splits an ingredient span into ordered candidate tokens.
///
/// Three corruption types are handled in sequence: missing commas replaced
/// by sentence periods, protected abbreviations whose periods must not be
/// mistaken for sentence breaks, and "fusion" — two names glued together
/// with no separator at all. Fusion detection is a heuristic over
/// capitalization seams and is the primary source of residual segmentation
/// error; its guard vocabularies live in [`SegmentConfig`].
pub struct TokenSegmenter {
    config: SegmentConfig,
    abbreviations: Vec<Regex>,
    sentence_period: Regex,
    camel_seam: Regex,
}

impl TokenSegmenter {
    #[must_use]
    pub fn new(config: SegmentConfig) -> Self {
        let abbreviations = config
            .protected_abbreviations
            .iter()
            .map(|a| {
                Regex::new(&format!("(?i){}", regex::escape(a)))
                    .expect("escaped abbreviation is a valid pattern")
            })
            .collect();

        Self {
            abbreviations,
            sentence_period: Regex::new(r"\.\s+[A-Z]").expect("static pattern"),
            camel_seam: Regex::new(r"[a-z][A-Z][a-z]").expect("static pattern"),
            config,
        }
    }

    /// Turn a span into a flat, ordered candidate token list.
    #[must_use]
    pub fn segment(&self, span: &str) -> Vec<String> {
        let mut candidates = Vec::new();

        for item in span.split(',') {
            let item = item.trim();
            if item.chars().count() <= self.config.min_item_chars {
                continue;
            }

            let protected = self.protect_abbreviations(item);
            for part in self.split_sentence_periods(&protected) {
                let part = part.replace(self.config.placeholder, ".");
                candidates.extend(self.split_fused(&part));
            }
        }

        candidates
    }

    /// Swap the period of each known abbreviation for the placeholder so
    /// sentence-period splitting cannot cut through it.
    fn protect_abbreviations(&self, item: &str) -> String {
        let placeholder = self.config.placeholder;
        let mut protected = item.to_string();
        for pattern in &self.abbreviations {
            protected = pattern
                .replace_all(&protected, |caps: &regex::Captures<'_>| {
                    caps[0].replace('.', &placeholder.to_string())
                })
                .into_owned();
        }
        protected
    }

    /// Split at a period followed by whitespace and an uppercase letter —
    /// the signature of two ingredients OCR'd with a period in place of a
    /// comma. The period stays with the left part.
    fn split_sentence_periods(&self, item: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut start = 0;

        for m in self.sentence_period.find_iter(item) {
            let left_end = m.start() + 1;
            parts.push(item[start..left_end].to_string());
            // The matched uppercase letter begins the next part.
            start = m.end() - 1;
        }
        parts.push(item[start..].to_string());

        parts
    }

    /// Partition a part at surviving camel seams (lowercase, uppercase,
    /// lowercase) — the signature of two names fused without a separator.
    fn split_fused(&self, part: &str) -> Vec<String> {
        let seams: Vec<usize> = self
            .camel_seam
            .find_iter(part)
            .map(|m| m.start() + 1)
            .filter(|&idx| !self.seam_is_guarded(part, idx))
            .collect();

        if seams.is_empty() {
            let trimmed = part.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        }

        let mut subparts = Vec::new();
        let mut start = 0;
        for idx in seams {
            let sub = part[start..idx].trim();
            if !sub.is_empty() {
                subparts.push(sub.to_string());
            }
            start = idx;
        }
        if start < part.len() {
            let sub = part[start..].trim();
            if !sub.is_empty() {
                subparts.push(sub.to_string());
            }
        }

        subparts
    }

    /// A seam is rejected inside an open parenthetical, after a multiplying
    /// prefix, or near a domain term with legitimate internal capitals.
    fn seam_is_guarded(&self, part: &str, idx: usize) -> bool {
        let before = &part[..idx];
        let depth = before.matches('(').count() as i64 - before.matches(')').count() as i64;
        if depth > 0 {
            return true;
        }

        let prefix = char_window_before(part, idx, self.config.guard_prefix_window).to_lowercase();
        if self
            .config
            .guard_prefixes
            .iter()
            .any(|p| prefix.contains(p.as_str()))
        {
            return true;
        }

        let context = char_window_around(part, idx, self.config.guard_context_window).to_lowercase();
        self.config
            .guard_context_terms
            .iter()
            .any(|t| context.contains(t.as_str()))
    }
}

/// Up to `n` characters immediately before byte index `idx`.
fn char_window_before(s: &str, idx: usize, n: usize) -> &str {
    let start = s[..idx]
        .char_indices()
        .rev()
        .nth(n.saturating_sub(1))
        .map_or(0, |(i, _)| i);
    &s[start..idx]
}

/// Up to `n` characters on each side of byte index `idx`.
fn char_window_around(s: &str, idx: usize, n: usize) -> &str {
    let start = s[..idx]
        .char_indices()
        .rev()
        .nth(n.saturating_sub(1))
        .map_or(0, |(i, _)| i);
    let end = s[idx..]
        .char_indices()
        .nth(n)
        .map_or(s.len(), |(i, _)| idx + i);
    &s[start..end]
}
