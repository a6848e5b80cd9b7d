use std::collections::HashSet;

use regex::Regex;

use super::config::SegmentConfig;

/// Strips artifacts from candidate tokens, repairs known recognizer
/// character confusions, and reduces the list to unique, plausible
/// ingredient names.
pub struct TokenCleaner {
    edge_junk: Regex,
    whitespace_runs: Regex,
    l_for_digit: Regex,
    o_for_digit: Regex,
    casing_fixes: Vec<(Regex, String)>,
    noise: Vec<Regex>,
}

impl TokenCleaner {
    #[must_use]
    pub fn new(config: &SegmentConfig) -> Self {
        let casing_fixes = config
            .abbreviation_casing
            .iter()
            .map(|(from, to)| {
                let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(from)))
                    .expect("escaped abbreviation is a valid pattern");
                (pattern, to.clone())
            })
            .collect();

        let noise = config
            .noise_patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")).expect("noise patterns are validated config"))
            .collect();

        Self {
            // A leading balanced parenthetical is informative; stray edge
            // punctuation is not.
            edge_junk: Regex::new(r"^[^a-zA-Z0-9(]+|[^a-zA-Z0-9)]+$").expect("static pattern"),
            whitespace_runs: Regex::new(r"\s+").expect("static pattern"),
            // "l" misread where "1" belongs inside ranges like "C10-16",
            // and the analogous "O" for "0".
            l_for_digit: Regex::new(r"([A-Za-z])l([0-9])").expect("static pattern"),
            o_for_digit: Regex::new(r"([A-Za-z])O([0-9])").expect("static pattern"),
            casing_fixes,
            noise,
        }
    }

    /// Clean every candidate, deduplicate case-insensitively (first
    /// occurrence keeps its casing and position), and drop non-ingredient
    /// noise. Only removes or rewrites — never invents tokens.
    #[must_use]
    pub fn clean(&self, candidates: &[String]) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut tokens = Vec::new();

        for raw in candidates {
            let Some(token) = self.clean_one(raw) else {
                continue;
            };
            if !seen.insert(token.to_lowercase()) {
                continue;
            }
            if self.is_noise(&token) {
                continue;
            }
            tokens.push(token);
        }

        tokens
    }

    fn clean_one(&self, raw: &str) -> Option<String> {
        let token = raw.trim();
        let token = self.edge_junk.replace_all(token, "");
        let token = self.whitespace_runs.replace_all(&token, " ");
        let token = self.l_for_digit.replace_all(&token, "$1-$2");
        let token = self.o_for_digit.replace_all(&token, "$1-$2");

        let mut token = token.into_owned();
        for (pattern, replacement) in &self.casing_fixes {
            token = pattern
                .replace_all(&token, replacement.as_str())
                .into_owned();
        }
        let token = capitalize_first(&token);

        (token.chars().count() > 1).then_some(token)
    }

    fn is_noise(&self, token: &str) -> bool {
        self.noise.iter().any(|p| p.is_match(token))
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> TokenCleaner {
        TokenCleaner::new(&SegmentConfig::default())
    }

    fn clean(items: &[&str]) -> Vec<String> {
        cleaner().clean(&items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_edge_punctuation_stripped_parens_kept() {
        assert_eq!(clean(&["- Aqua (Water)."]), vec!["Aqua (Water)"]);
    }

    #[test]
    fn test_character_confusion_fixes() {
        assert_eq!(clean(&["Cl0-16 Alkane"]), vec!["C-0-16 Alkane"]);
        assert_eq!(clean(&["SO2 Complex"]), vec!["S-2 Complex"]);
    }

    #[test]
    fn test_abbreviation_casing_normalized() {
        assert_eq!(clean(&["Peg-40 Castor"]), vec!["PEG-40 Castor"]);
        assert_eq!(clean(&["Bht"]), vec!["BHT"]);
    }

    #[test]
    fn test_first_letter_capitalized() {
        assert_eq!(clean(&["aqua"]), vec!["Aqua"]);
    }

    #[test]
    fn test_short_tokens_dropped() {
        assert!(clean(&["a", ".", "x-"]).is_empty());
    }

    #[test]
    fn test_case_insensitive_dedup_keeps_first() {
        assert_eq!(clean(&["Aqua", "AQUA", "aqua", "Parfum"]), vec!["Aqua", "Parfum"]);
    }

    #[test]
    fn test_noise_tokens_filtered() {
        let tokens = clean(&[
            "123",
            "1.5 %",
            "May contain mica",
            "and",
            "Contains",
            "Warnings",
            "Caution keep away",
            "Directions apply",
            "Glycerin",
        ]);

        assert_eq!(tokens, vec!["Glycerin"]);
    }

    #[test]
    fn test_output_is_subsequence_of_input_characters() {
        let raw = "Water, Glycerin, Parfum";
        let tokens = clean(&["Water", "Glycerin", "Parfum"]);

        for token in &tokens {
            let mut haystack = raw.chars();
            assert!(token
                .chars()
                .all(|c| haystack.by_ref().any(|h| h == c)));
        }
    }
}
