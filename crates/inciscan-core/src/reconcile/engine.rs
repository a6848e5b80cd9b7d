use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::service::{ReferenceRecord, ReferenceService};

/// How a token was resolved against the reference database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    SplitExact,
    CombinedExact,
    CombinedCommaExact,
    Fuzzy,
    NoMatch,
}

impl MatchType {
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

/// Terminal result for one token (or one combination of adjacent tokens).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub original: String,
    pub corrected: Option<String>,
    pub match_type: MatchType,
    pub record: Option<ReferenceRecord>,
}

impl MatchResult {
    fn no_match(original: String) -> Self {
        Self {
            original,
            corrected: None,
            match_type: MatchType::NoMatch,
            record: None,
        }
    }
}

/// The staged fallback protocol, in strict priority order. A token exits at
/// the first phase that resolves it; reordering or extending the protocol
/// means editing [`ReconcileConfig::phases`], nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Query the token verbatim, require an exact name match.
    Direct,
    /// Query each sub-word of the token; a fragment may be the true name
    /// while the rest was segmentation noise.
    Split,
    /// Re-join adjacent unmatched tokens that a spurious separator split.
    Combine,
    /// Accept the service's best non-exact candidate.
    Fuzzy,
}

#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub phases: Vec<Phase>,
    /// Fragments in this set never get their own split-phase query.
    pub split_stop_words: Vec<String>,
    /// Fragments at or below this many characters are skipped.
    pub min_fragment_chars: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            phases: vec![Phase::Direct, Phase::Split, Phase::Combine, Phase::Fuzzy],
            split_stop_words: ["and", "with", "plus", "the"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            min_fragment_chars: 2,
        }
    }
}

/// Resolves cleaned ingredient tokens to reference records, tolerating the
/// segmentation errors the earlier stages could not avoid.
///
/// Transport failures and empty result sets are the same thing here: the
/// phase fails and the token falls through to the next one. Only exhausting
/// every phase yields `no_match`, and that is a valid terminal state — one
/// unmatched token never aborts the rest of the run.
pub struct ReconciliationEngine {
    service: Arc<dyn ReferenceService>,
    config: ReconcileConfig,
}

impl ReconciliationEngine {
    pub fn new(service: Arc<dyn ReferenceService>) -> Self {
        Self {
            service,
            config: ReconcileConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }

    /// Run every phase over the token list. Results come back in original
    /// token order; a combined result sits at the position of its first
    /// constituent.
    pub async fn reconcile(&self, tokens: &[String]) -> Vec<MatchResult> {
        let mut slots: Vec<Option<MatchResult>> = vec![None; tokens.len()];
        let mut consumed = vec![false; tokens.len()];

        for phase in &self.config.phases {
            match phase {
                Phase::Direct => {
                    for (i, token) in tokens.iter().enumerate() {
                        if slots[i].is_none() && !consumed[i] {
                            slots[i] = self.try_direct(token).await;
                        }
                    }
                }
                Phase::Split => {
                    for (i, token) in tokens.iter().enumerate() {
                        if slots[i].is_none() && !consumed[i] {
                            slots[i] = self.try_split(token).await;
                        }
                    }
                }
                Phase::Combine => self.run_combine(tokens, &mut slots, &mut consumed).await,
                Phase::Fuzzy => {
                    for (i, token) in tokens.iter().enumerate() {
                        if slots[i].is_none() && !consumed[i] {
                            slots[i] = Some(self.try_fuzzy(token).await);
                        }
                    }
                }
            }
        }

        slots
            .into_iter()
            .zip(tokens)
            .zip(consumed)
            .filter_map(|((slot, token), consumed)| {
                if consumed {
                    return None;
                }
                // Tokens still unresolved (e.g. a config without the fuzzy
                // phase) terminate as no_match.
                Some(slot.unwrap_or_else(|| MatchResult::no_match(token.clone())))
            })
            .collect()
    }

    /// Exact-only query; `None` on empty results or transport failure.
    async fn lookup_exact(&self, query: &str) -> Option<ReferenceRecord> {
        match self.service.lookup(query, true).await {
            Ok(response) if response.found && response.exact => response.records.into_iter().next(),
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(query, %error, "exact lookup failed, treating as no result");
                None
            }
        }
    }

    async fn try_direct(&self, token: &str) -> Option<MatchResult> {
        let record = self.lookup_exact(token).await?;
        Some(MatchResult {
            original: token.to_string(),
            corrected: Some(token.to_string()),
            match_type: MatchType::Exact,
            record: Some(record),
        })
    }

    fn split_fragments<'a>(&self, token: &'a str) -> Vec<&'a str> {
        token
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | '/' | '-'))
            .filter(|f| {
                f.chars().count() > self.config.min_fragment_chars
                    && !self
                        .config
                        .split_stop_words
                        .iter()
                        .any(|s| s.eq_ignore_ascii_case(f))
            })
            .collect()
    }

    async fn try_split(&self, token: &str) -> Option<MatchResult> {
        let fragments = self.split_fragments(token);
        if fragments.len() < 2 {
            return None;
        }

        for fragment in fragments {
            if let Some(record) = self.lookup_exact(fragment).await {
                return Some(MatchResult {
                    original: fragment.to_string(),
                    corrected: Some(fragment.to_string()),
                    match_type: MatchType::SplitExact,
                    record: Some(record),
                });
            }
        }
        None
    }

    /// Pair adjacent unresolved tokens (adjacent within the unresolved
    /// subsequence, in original order). A successful combination consumes
    /// both tokens and lands at the first one's position.
    async fn run_combine(
        &self,
        tokens: &[String],
        slots: &mut [Option<MatchResult>],
        consumed: &mut [bool],
    ) {
        let unresolved: Vec<usize> = (0..tokens.len())
            .filter(|&i| slots[i].is_none() && !consumed[i])
            .collect();

        let mut j = 0;
        while j + 1 < unresolved.len() {
            let (a, b) = (unresolved[j], unresolved[j + 1]);
            let original = format!("{} + {}", tokens[a], tokens[b]);

            let spaced = format!("{} {}", tokens[a], tokens[b]);
            if let Some(record) = self.lookup_exact(&spaced).await {
                slots[a] = Some(MatchResult {
                    original,
                    corrected: Some(spaced),
                    match_type: MatchType::CombinedExact,
                    record: Some(record),
                });
                consumed[b] = true;
                j += 2;
                continue;
            }

            let comma = format!("{}, {}", tokens[a], tokens[b]);
            if let Some(record) = self.lookup_exact(&comma).await {
                slots[a] = Some(MatchResult {
                    original,
                    corrected: Some(comma),
                    match_type: MatchType::CombinedCommaExact,
                    record: Some(record),
                });
                consumed[b] = true;
                j += 2;
                continue;
            }

            j += 1;
        }
    }

    async fn try_fuzzy(&self, token: &str) -> MatchResult {
        match self.service.lookup(token, false).await {
            Ok(response) if response.found => {
                let record = response.records.into_iter().next();
                MatchResult {
                    original: token.to_string(),
                    corrected: record.as_ref().map(|r| r.name.clone()),
                    match_type: MatchType::Fuzzy,
                    record,
                }
            }
            Ok(_) => MatchResult::no_match(token.to_string()),
            Err(error) => {
                tracing::warn!(token, %error, "fuzzy lookup failed, terminating as no_match");
                MatchResult::no_match(token.to_string())
            }
        }
    }
}
