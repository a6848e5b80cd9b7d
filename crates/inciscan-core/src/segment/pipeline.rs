use serde::{Deserialize, Serialize};

use super::cleaner::TokenCleaner;
use super::config::SegmentConfig;
use super::extractor::{IngredientSpan, SectionExtractor};
use super::normalizer::TextNormalizer;
use super::segmenter::TokenSegmenter;

/// Result of running a raw text blob through the segmentation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentOutput {
    pub normalized: String,
    pub span: String,
    /// Whether a header pattern anchored the span or the whole text was
    /// taken as a fallback.
    pub anchored: bool,
    pub tokens: Vec<String>,
}

/// The full synchronous segmentation stage: normalize, locate the
/// ingredient section, split into candidates, clean.
///
/// Pure text transformation with no suspension points or shared state —
/// safe to run on as many workers as there are images.
pub struct SegmentPipeline {
    normalizer: TextNormalizer,
    extractor: SectionExtractor,
    segmenter: TokenSegmenter,
    cleaner: TokenCleaner,
}

impl SegmentPipeline {
    #[must_use]
    pub fn new(config: SegmentConfig) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            extractor: SectionExtractor::new(&config),
            cleaner: TokenCleaner::new(&config),
            segmenter: TokenSegmenter::new(config),
        }
    }

    /// Degenerate input (empty or garbage text) collapses to an empty token
    /// list; that is a valid output, not an error.
    #[must_use]
    pub fn run(&self, raw: &str) -> SegmentOutput {
        let normalized = self.normalizer.normalize(raw);
        let IngredientSpan { text: span, anchor } = self.extractor.extract(&normalized);
        let candidates = self.segmenter.segment(&span);
        let tokens = self.cleaner.clean(&candidates);

        tracing::debug!(
            anchored = anchor.is_some(),
            candidates = candidates.len(),
            tokens = tokens.len(),
            "segmented label text"
        );

        SegmentOutput {
            normalized,
            span,
            anchored: anchor.is_some(),
            tokens,
        }
    }
}

impl Default for SegmentPipeline {
    fn default() -> Self {
        Self::new(SegmentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straightforward_list() {
        let output = SegmentPipeline::default().run("Ingredients: Water, Glycerin, Fragrance.");

        assert!(output.anchored);
        assert_eq!(output.tokens, vec!["Water", "Glycerin", "Fragrance"]);
    }

    #[test]
    fn test_separator_noise_list() {
        let output = SegmentPipeline::default().run("Ingredients; Aqua: Alcohol Denat");

        assert_eq!(output.tokens, vec!["Aqua", "Alcohol Denat"]);
    }

    #[test]
    fn test_fused_span_without_header() {
        let output = SegmentPipeline::default().run("AquaGlycerinParfum");

        assert!(!output.anchored);
        assert_eq!(output.tokens, vec!["Aqua", "Glycerin", "Parfum"]);
    }

    #[test]
    fn test_empty_input_is_valid_degenerate_output() {
        let output = SegmentPipeline::default().run("");

        assert!(output.tokens.is_empty());
        assert_eq!(output.normalized, "");
    }

    #[test]
    fn test_token_count_bounded_by_comma_split_plus_fusion() {
        let raw = "Ingredients: Water, Water, Glycerin, and, 5%";
        let output = SegmentPipeline::default().run(raw);

        // Cleaning only removes or merges; duplicates and noise are gone.
        assert_eq!(output.tokens, vec!["Water", "Glycerin"]);
        assert!(output.tokens.len() <= output.span.split(',').count());
    }

    #[test]
    fn test_no_two_tokens_case_insensitive_equal() {
        let output =
            SegmentPipeline::default().run("Ingredients: Aqua, AQUA, aqua, Parfum, PARFUM");

        let mut lowered: Vec<String> =
            output.tokens.iter().map(|t| t.to_lowercase()).collect();
        lowered.sort();
        lowered.dedup();
        assert_eq!(lowered.len(), output.tokens.len());
    }
}
