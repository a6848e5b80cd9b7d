use serde::{Deserialize, Serialize};

/// One recognizer detection: a text fragment, its confidence, and the
/// quadrilateral it was read from. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub text: String,
    pub confidence: f32,
    /// Four corner points, (x, y).
    pub bbox: [[f32; 2]; 4],
}

impl Observation {
    #[must_use]
    pub fn new(text: impl Into<String>, confidence: f32, bbox: [[f32; 2]; 4]) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }

    fn x_min(&self) -> f32 {
        self.bbox.iter().map(|p| p[0]).fold(f32::INFINITY, f32::min)
    }

    fn x_max(&self) -> f32 {
        self.bbox.iter().map(|p| p[0]).fold(f32::NEG_INFINITY, f32::max)
    }

    fn y_min(&self) -> f32 {
        self.bbox.iter().map(|p| p[1]).fold(f32::INFINITY, f32::min)
    }

    fn y_max(&self) -> f32 {
        self.bbox.iter().map(|p| p[1]).fold(f32::NEG_INFINITY, f32::max)
    }

    fn y_center(&self) -> f32 {
        (self.y_min() + self.y_max()) / 2.0
    }

    /// Intersection over union of two observation boxes, on their
    /// axis-aligned hulls.
    fn iou(&self, other: &Self) -> f32 {
        let x_left = self.x_min().max(other.x_min());
        let y_top = self.y_min().max(other.y_min());
        let x_right = self.x_max().min(other.x_max());
        let y_bottom = self.y_max().min(other.y_max());
        if x_right <= x_left || y_bottom <= y_top {
            return 0.0;
        }

        let intersection = (x_right - x_left) * (y_bottom - y_top);
        let area_a = ((self.x_max() - self.x_min()) * (self.y_max() - self.y_min())).max(1.0);
        let area_b = ((other.x_max() - other.x_min()) * (other.y_max() - other.y_min())).max(1.0);
        intersection / (area_a + area_b - intersection)
    }
}

/// Thresholds for turning an unordered observation set into text windows.
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    /// Observations below this confidence are discarded outright.
    pub min_confidence: f32,
    /// Height of one reading-order row band, in pixels.
    pub row_band_px: f32,
    /// Box overlap at which two observations may be duplicates.
    pub iou_threshold: f32,
    /// Text similarity at which overlapping observations are duplicates.
    pub duplicate_text_ratio: f64,
    /// Similarity against "ingredients" for fuzzy header detection.
    pub header_ratio: f64,
    /// Maximum observations gathered after a header.
    pub window_len: usize,
    /// Lines required before a section stop may end the window.
    pub min_window_lines: usize,
    /// Keywords that end an ingredient window.
    pub section_stops: Vec<String>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.25,
            row_band_px: 8.0,
            iou_threshold: 0.65,
            duplicate_text_ratio: 0.85,
            header_ratio: 0.73,
            window_len: 45,
            min_window_lines: 3,
            section_stops: [
                "directions",
                "warning",
                "warnings",
                "caution",
                "how to use",
                "storage",
                "manufactured",
                "distributed",
                "made in",
                "best before",
                "expiration",
                "exp",
                "lot",
                "barcode",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        }
    }
}

/// Sorts recognizer observations into reading order, suppresses the
/// near-duplicates that multiple preprocessing variants produce, and builds
/// candidate text windows anchored at ingredient headers.
pub struct ObservationAssembler {
    config: AssemblyConfig,
}

impl ObservationAssembler {
    #[must_use]
    pub const fn new(config: AssemblyConfig) -> Self {
        Self { config }
    }

    /// Filter, deduplicate, and sort observations top-to-bottom then
    /// left-to-right within a row band. The recognizer guarantees no order
    /// of its own.
    #[must_use]
    pub fn reading_order(&self, observations: Vec<Observation>) -> Vec<Observation> {
        let mut candidates: Vec<Observation> = observations
            .into_iter()
            .filter(|o| !o.text.trim().is_empty() && o.confidence >= self.config.min_confidence)
            .collect();

        // Highest confidence first, so the best rendition of a duplicated
        // line is the one kept.
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut kept: Vec<Observation> = Vec::new();
        for candidate in candidates {
            let duplicate = kept.iter().any(|existing| {
                candidate.iou(existing) >= self.config.iou_threshold
                    && (candidate.text == existing.text
                        || strsim::normalized_levenshtein(
                            &candidate.text.to_lowercase(),
                            &existing.text.to_lowercase(),
                        ) >= self.config.duplicate_text_ratio)
            });
            if !duplicate {
                kept.push(candidate);
            }
        }

        kept.sort_by(|a, b| {
            let band_a = (a.y_center() / self.config.row_band_px).round();
            let band_b = (b.y_center() / self.config.row_band_px).round();
            band_a
                .partial_cmp(&band_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.x_min()
                        .partial_cmp(&b.x_min())
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });
        kept
    }

    /// Build candidate text windows from reading-ordered observations: one
    /// window per detected ingredient header, plus the all-text fallback.
    #[must_use]
    pub fn windows(&self, ordered: &[Observation]) -> Vec<String> {
        if ordered.is_empty() {
            return Vec::new();
        }

        let mut windows = Vec::new();
        for (idx, line) in ordered.iter().enumerate() {
            if !self.is_ingredient_header(&line.text) {
                continue;
            }

            let mut chunk = vec![line.text.as_str()];
            for follower in ordered.iter().skip(idx + 1).take(self.config.window_len) {
                if self.is_section_stop(&follower.text) && chunk.len() > self.config.min_window_lines
                {
                    break;
                }
                chunk.push(follower.text.as_str());
            }
            windows.push(chunk.join(" "));
        }

        windows.push(
            ordered
                .iter()
                .map(|o| o.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
        windows
    }

    /// Fuzzy header test: recognizers routinely mangle "INGREDIENTS" into
    /// "1NGRED1ENTS" or "INGREDIENTES".
    fn is_ingredient_header(&self, text: &str) -> bool {
        let compact: String = text
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_lowercase)
            .collect();
        if compact.is_empty() {
            return false;
        }
        if compact.contains("ingredient") {
            return true;
        }

        let prefix: String = compact.chars().take(11).collect();
        strsim::normalized_levenshtein("ingredients", &prefix) >= self.config.header_ratio
    }

    fn is_section_stop(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.config
            .section_stops
            .iter()
            .any(|k| lowered.contains(k.as_str()))
    }
}

impl Default for ObservationAssembler {
    fn default() -> Self {
        Self::new(AssemblyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(text: &str, confidence: f32, x: f32, y: f32) -> Observation {
        Observation::new(
            text,
            confidence,
            [[x, y], [x + 100.0, y], [x + 100.0, y + 10.0], [x, y + 10.0]],
        )
    }

    #[test]
    fn test_reading_order_sorts_by_band_then_x() {
        let assembler = ObservationAssembler::default();

        let ordered = assembler.reading_order(vec![
            obs("right", 0.9, 200.0, 50.0),
            obs("below", 0.9, 0.0, 120.0),
            obs("left", 0.9, 0.0, 50.0),
        ]);

        let texts: Vec<&str> = ordered.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["left", "right", "below"]);
    }

    #[test]
    fn test_low_confidence_observations_dropped() {
        let assembler = ObservationAssembler::default();

        let ordered = assembler.reading_order(vec![obs("noise", 0.1, 0.0, 0.0)]);

        assert!(ordered.is_empty());
    }

    #[test]
    fn test_overlapping_near_identical_text_deduplicated() {
        let assembler = ObservationAssembler::default();

        let ordered = assembler.reading_order(vec![
            obs("Glycerin", 0.9, 0.0, 0.0),
            obs("Glycerir", 0.6, 1.0, 1.0),
        ]);

        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].text, "Glycerin");
    }

    #[test]
    fn test_distinct_text_in_same_place_kept() {
        let assembler = ObservationAssembler::default();

        let ordered = assembler.reading_order(vec![
            obs("Aqua", 0.9, 0.0, 0.0),
            obs("Parfum", 0.8, 1.0, 1.0),
        ]);

        assert_eq!(ordered.len(), 2);
    }

    #[test]
    fn test_header_window_stops_at_section_keyword() {
        let assembler = ObservationAssembler::default();
        let ordered = assembler.reading_order(vec![
            obs("INGREDIENTS:", 0.9, 0.0, 0.0),
            obs("Aqua, Glycerin,", 0.9, 0.0, 20.0),
            obs("Parfum, Limonene", 0.9, 0.0, 40.0),
            obs("Citral, Linalool", 0.9, 0.0, 60.0),
            obs("DIRECTIONS apply daily", 0.9, 0.0, 80.0),
        ]);

        let windows = assembler.windows(&ordered);

        // One header window plus the all-text fallback.
        assert_eq!(windows.len(), 2);
        assert!(windows[0].starts_with("INGREDIENTS:"));
        assert!(!windows[0].contains("DIRECTIONS"));
        assert!(windows[1].contains("DIRECTIONS"));
    }

    #[test]
    fn test_fuzzy_header_detection() {
        let assembler = ObservationAssembler::default();

        assert!(assembler.is_ingredient_header("Ingredients:"));
        assert!(assembler.is_ingredient_header("INGREDIENTES"));
        assert!(assembler.is_ingredient_header("1NGREDIENTS"));
        assert!(!assembler.is_ingredient_header("Warnings"));
    }

    #[test]
    fn test_empty_observation_set_yields_no_windows() {
        let assembler = ObservationAssembler::default();

        assert!(assembler.windows(&[]).is_empty());
    }
}
