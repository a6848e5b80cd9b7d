use regex::Regex;

use super::config::SegmentConfig;

/// The stretch of normalized text believed to hold the ingredient list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientSpan {
    pub text: String,
    /// Index of the header pattern that anchored the span, or `None` when
    /// no header matched and the whole text was taken as a fallback.
    pub anchor: Option<usize>,
}

impl IngredientSpan {
    #[must_use]
    pub const fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Locates the ingredient-list span within normalized text.
///
/// A small set of header patterns is tried in priority order; the first
/// match wins and its capture runs up to the first stop keyword or end of
/// input. When a label carries several ingredient-like sections only the
/// first is used; downstream noise filtering is the mitigation for the
/// extra text that fallback captures drag in.
pub struct SectionExtractor {
    patterns: Vec<Regex>,
}

impl SectionExtractor {
    #[must_use]
    pub fn new(config: &SegmentConfig) -> Self {
        let stops = config
            .stop_keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        // The normalizer has already rewritten `;` and `:` to `,`, so the
        // optional header separator class includes the comma.
        let headers = ["ingredients", "ingredient[s]?", "contains"];
        let patterns = headers
            .iter()
            .map(|h| {
                Regex::new(&format!(
                    r"(?is){h}\s*[,:\-;]?\s*(.*?)(?:\b(?:{stops})\b|\z)"
                ))
                .expect("header patterns are static apart from escaped keywords")
            })
            .collect();

        Self { patterns }
    }

    /// Extract the ingredient span, falling back to the whole text when no
    /// header anchors. The fallback trades false positives for forward
    /// progress on badly corrupted labels.
    #[must_use]
    pub fn extract(&self, text: &str) -> IngredientSpan {
        for (idx, pattern) in self.patterns.iter().enumerate() {
            if let Some(captures) = pattern.captures(text) {
                if let Some(span) = captures.get(1) {
                    return IngredientSpan {
                        text: span.as_str().trim().to_string(),
                        anchor: Some(idx),
                    };
                }
            }
        }

        IngredientSpan {
            text: text.trim().to_string(),
            anchor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SectionExtractor {
        SectionExtractor::new(&SegmentConfig::default())
    }

    #[test]
    fn test_header_anchors_span() {
        let span = extractor().extract("Ingredients, Water, Glycerin, Fragrance.");

        assert!(span.is_anchored());
        assert_eq!(span.text, "Water, Glycerin, Fragrance.");
    }

    #[test]
    fn test_stop_keyword_ends_span() {
        let span = extractor()
            .extract("Ingredients, Aqua, Parfum Directions, apply twice daily");

        assert!(span.is_anchored());
        assert_eq!(span.text, "Aqua, Parfum");
    }

    #[test]
    fn test_contains_header_is_fallback_pattern() {
        let span = extractor().extract("Contains, Shea Butter, Beeswax");

        assert!(span.is_anchored());
        assert_eq!(span.text, "Shea Butter, Beeswax");
    }

    #[test]
    fn test_no_header_falls_back_to_whole_text() {
        let span = extractor().extract("Aqua, Glycerin, Parfum");

        assert!(!span.is_anchored());
        assert_eq!(span.text, "Aqua, Glycerin, Parfum");
    }

    #[test]
    fn test_first_header_wins_over_later_sections() {
        let span = extractor().extract("Ingredients, Aqua Ingredients, Eau");

        // First match only; the duplicated (translated) section rides along.
        assert!(span.is_anchored());
        assert!(span.text.starts_with("Aqua"));
    }

    #[test]
    fn test_case_insensitive_header() {
        let span = extractor().extract("INGREDIENTS, AQUA, PARFUM");

        assert!(span.is_anchored());
        assert_eq!(span.text, "AQUA, PARFUM");
    }
}
