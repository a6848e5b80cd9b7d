/// Vocabulary and threshold configuration for the segmentation stage.
///
/// Every list the extractor, segmenter, and cleaner consult lives here so
/// tests can run the pipeline with alternate vocabularies instead of
/// patching process-wide constants.
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// Keywords that terminate the ingredient section capture.
    pub stop_keywords: Vec<String>,
    /// Abbreviations whose trailing period must survive sentence splitting.
    pub protected_abbreviations: Vec<String>,
    /// Placeholder substituted for protected periods. Must not occur in
    /// label text; `@` never survives OCR of an ingredient list.
    pub placeholder: char,
    /// Multiplying prefixes that legitimately produce internal capitals
    /// ("Polysorbate", "IsoPropyl") and therefore veto a fusion split.
    pub guard_prefixes: Vec<String>,
    /// Domain terms whose surrounding context vetoes a fusion split.
    pub guard_context_terms: Vec<String>,
    /// Characters of lookbehind scanned for a guard prefix.
    pub guard_prefix_window: usize,
    /// Characters scanned on each side of a seam for a guard context term.
    pub guard_context_window: usize,
    /// Whole-word casing fixes for cosmetic abbreviations the recognizer
    /// title-cases ("Peg" for "PEG").
    pub abbreviation_casing: Vec<(String, String)>,
    /// Patterns identifying non-ingredient noise, matched case-insensitively
    /// against a whole cleaned token.
    pub noise_patterns: Vec<String>,
    /// Comma-split items at or below this many characters are discarded.
    pub min_item_chars: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            stop_keywords: vec_of(&[
                "directions",
                "use",
                "warning",
                "caution",
                "disclaimer",
                "made in",
                "for external use",
                "how to use",
            ]),
            protected_abbreviations: vec_of(&[
                "vit.", "var.", "spp.", "sp.", "subsp.", "vol.", "no.", "dr.", "st.",
            ]),
            placeholder: '@',
            guard_prefixes: vec_of(&["di", "tri", "tetra", "poly", "mono", "iso"]),
            guard_context_terms: vec_of(&["vitamin", "extract", "oil"]),
            guard_prefix_window: 6,
            guard_context_window: 10,
            abbreviation_casing: [
                ("Peg", "PEG"),
                ("Ppg", "PPG"),
                ("Edta", "EDTA"),
                ("Mea", "MEA"),
                ("Tea", "TEA"),
                ("Dea", "DEA"),
                ("Bht", "BHT"),
                ("Sd", "SD"),
            ]
            .iter()
            .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
            .collect(),
            noise_patterns: vec_of(&[
                r"^[0-9.]+$",
                r"^[0-9.]+\s*%$",
                r"^may\s+contain",
                r"^and$",
                r"^contains$",
                r"^ingredients$",
                r"^warnings?$",
                r"^caution",
                r"^direction",
            ]),
            min_item_chars: 2,
        }
    }
}

fn vec_of(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabularies_nonempty() {
        let config = SegmentConfig::default();

        assert!(!config.stop_keywords.is_empty());
        assert!(!config.protected_abbreviations.is_empty());
        assert!(!config.guard_prefixes.is_empty());
        assert!(!config.noise_patterns.is_empty());
    }

    #[test]
    fn test_protected_abbreviations_carry_periods() {
        let config = SegmentConfig::default();

        assert!(config
            .protected_abbreviations
            .iter()
            .all(|a| a.ends_with('.')));
    }
}
