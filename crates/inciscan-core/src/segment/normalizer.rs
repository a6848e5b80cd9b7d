use regex::Regex;

/// Canonicalizes whitespace, separators, and hyphenation artifacts in raw
/// recognizer output before section extraction.
///
/// Normalization is pure and idempotent: feeding the output back in yields
/// the same string, and empty input yields empty output.
pub struct TextNormalizer {
    wrap_hyphen: Regex,
    spaced_hyphen: Regex,
    line_breaks: Regex,
    whitespace_runs: Regex,
    separators: Regex,
    open_paren_gap: Regex,
    close_paren_gap: Regex,
}

impl TextNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            // "word-\n word": the recognizer split one word across lines.
            wrap_hyphen: Regex::new(r"(\w+)-\s*[\n\r]+\s*(\w+)").expect("static pattern"),
            spaced_hyphen: Regex::new(r"(\w+)\s+-\s+(\w+)").expect("static pattern"),
            line_breaks: Regex::new(r"[\n\r]+").expect("static pattern"),
            whitespace_runs: Regex::new(r"\s+").expect("static pattern"),
            separators: Regex::new(r"[;:|]+").expect("static pattern"),
            open_paren_gap: Regex::new(r"\(\s+").expect("static pattern"),
            close_paren_gap: Regex::new(r"\s+\)").expect("static pattern"),
        }
    }

    /// Collapse a raw multi-line blob into a single normalized line.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        // Hyphen handling must see the original line structure, so it runs
        // before line breaks collapse.
        let text = self.wrap_hyphen.replace_all(text, "$1$2");
        let text = self.spaced_hyphen.replace_all(&text, "$1-$2");
        let text = self.line_breaks.replace_all(&text, " ");
        let text = self.whitespace_runs.replace_all(&text, " ");
        let text = self.separators.replace_all(&text, ",");
        let text = self.open_paren_gap.replace_all(&text, "(");
        let text = self.close_paren_gap.replace_all(&text, ")");
        text.trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_empty_output() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_separator_runs_become_commas() {
        let normalizer = TextNormalizer::new();

        assert_eq!(
            normalizer.normalize("Ingredients; Aqua: Alcohol Denat"),
            "Ingredients, Aqua, Alcohol Denat"
        );
        assert_eq!(normalizer.normalize("a;;b::c|d"), "a,b,c,d");
    }

    #[test]
    fn test_line_wrap_hyphenation_joins_words() {
        let normalizer = TextNormalizer::new();

        assert_eq!(
            normalizer.normalize("Cocami-\ndopropyl Betaine"),
            "Cocamidopropyl Betaine"
        );
    }

    #[test]
    fn test_spaced_hyphen_tightens() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.normalize("C10 - 16 Alkane"), "C10-16 Alkane");
    }

    #[test]
    fn test_newlines_and_runs_collapse() {
        let normalizer = TextNormalizer::new();

        assert_eq!(
            normalizer.normalize("Water\r\nGlycerin\n\n  Parfum"),
            "Water Glycerin Parfum"
        );
    }

    #[test]
    fn test_parenthesis_gaps_close() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.normalize("Aqua ( Water )"), "Aqua (Water)");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = TextNormalizer::new();
        let raw = "Ingredients; Aqua ( Water ):\nGlyce-\nrin | Parfum";

        let once = normalizer.normalize(raw);
        let twice = normalizer.normalize(&once);

        assert_eq!(once, twice);
    }
}
