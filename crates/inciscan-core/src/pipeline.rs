use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::observation::{AssemblyConfig, Observation, ObservationAssembler};
use crate::reconcile::{
    MatchResult, MatchType, ReconcileConfig, ReconciliationEngine, ReferenceService,
};
use crate::segment::{SegmentConfig, SegmentOutput, SegmentPipeline};

/// Aggregate counters for one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub token_count: usize,
    pub exact: usize,
    pub split_exact: usize,
    pub combined: usize,
    pub fuzzy: usize,
    pub no_match: usize,
    pub duration_ms: u64,
}

impl AnalysisStats {
    fn tally(results: &[MatchResult], token_count: usize, duration_ms: u64) -> Self {
        let mut stats = Self {
            token_count,
            duration_ms,
            ..Self::default()
        };
        for result in results {
            match result.match_type {
                MatchType::Exact => stats.exact += 1,
                MatchType::SplitExact => stats.split_exact += 1,
                MatchType::CombinedExact | MatchType::CombinedCommaExact => stats.combined += 1,
                MatchType::Fuzzy => stats.fuzzy += 1,
                MatchType::NoMatch => stats.no_match += 1,
            }
        }
        stats
    }
}

/// Everything one label analysis produced, ready for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub tokens: Vec<String>,
    pub results: Vec<MatchResult>,
    pub stats: AnalysisStats,
}

/// End-to-end facade: segmentation feeding reconciliation.
///
/// Segmentation is synchronous and pure; reconciliation awaits the reference
/// service. Construct once, then analyze any number of labels.
pub struct LabelPipeline {
    segment: SegmentPipeline,
    assembler: ObservationAssembler,
    engine: ReconciliationEngine,
}

impl LabelPipeline {
    pub fn new(service: Arc<dyn ReferenceService>) -> Self {
        Self {
            segment: SegmentPipeline::default(),
            assembler: ObservationAssembler::default(),
            engine: ReconciliationEngine::new(service),
        }
    }

    #[must_use]
    pub fn with_segment_config(mut self, config: SegmentConfig) -> Self {
        self.segment = SegmentPipeline::new(config);
        self
    }

    #[must_use]
    pub fn with_assembly_config(mut self, config: AssemblyConfig) -> Self {
        self.assembler = ObservationAssembler::new(config);
        self
    }

    #[must_use]
    pub fn with_reconcile_config(mut self, config: ReconcileConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }

    /// Segmentation only, no service traffic.
    #[must_use]
    pub fn segment(&self, raw: &str) -> SegmentOutput {
        self.segment.run(raw)
    }

    /// Full run over a raw text blob.
    pub async fn analyze_text(&self, raw: &str) -> AnalysisOutput {
        let started = Instant::now();
        let segmented = self.segment.run(raw);
        self.reconcile_tokens(segmented.tokens, started).await
    }

    /// Full run over raw recognizer observations: assemble candidate text
    /// windows, segment each, keep the richest token list, reconcile it.
    pub async fn analyze_observations(&self, observations: Vec<Observation>) -> AnalysisOutput {
        let started = Instant::now();
        let ordered = self.assembler.reading_order(observations);
        let windows = self.assembler.windows(&ordered);

        let mut best: Vec<String> = Vec::new();
        for window in &windows {
            let candidate = self.segment.run(window).tokens;
            if richness(&candidate) > richness(&best) {
                best = candidate;
            }
        }
        tracing::debug!(
            windows = windows.len(),
            tokens = best.len(),
            "selected best observation window"
        );

        self.reconcile_tokens(best, started).await
    }

    async fn reconcile_tokens(&self, tokens: Vec<String>, started: Instant) -> AnalysisOutput {
        let results = self.engine.reconcile(&tokens).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let stats = AnalysisStats::tally(&results, tokens.len(), duration_ms);

        tracing::info!(
            tokens = stats.token_count,
            exact = stats.exact,
            no_match = stats.no_match,
            duration_ms,
            "label analysis complete"
        );

        AnalysisOutput {
            tokens,
            results,
            stats,
        }
    }
}

/// Window quality order: more tokens win, total token length breaks ties.
fn richness(tokens: &[String]) -> (usize, usize) {
    (tokens.len(), tokens.iter().map(String::len).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::StaticReferenceService;

    fn pipeline(names: &[&str]) -> LabelPipeline {
        LabelPipeline::new(Arc::new(StaticReferenceService::with_names(names)))
    }

    #[tokio::test]
    async fn test_analyze_text_end_to_end() {
        let pipeline = pipeline(&["Water", "Glycerin", "Fragrance"]);

        let output = pipeline
            .analyze_text("Ingredients: Water, Glycerin, Fragrance.")
            .await;

        assert_eq!(output.tokens.len(), 3);
        assert_eq!(output.stats.exact, 3);
        assert_eq!(output.stats.no_match, 0);
        assert!(output
            .results
            .iter()
            .all(|r| r.match_type == MatchType::Exact));
    }

    #[tokio::test]
    async fn test_unknown_token_counted_not_fatal() {
        let pipeline = pipeline(&["Water"]);

        let output = pipeline
            .analyze_text("Ingredients: Water, Xyzzqqplorp")
            .await;

        assert_eq!(output.stats.exact, 1);
        assert_eq!(output.stats.no_match, 1);
    }

    #[tokio::test]
    async fn test_analyze_observations_picks_header_window() {
        let pipeline = pipeline(&["Aqua", "Glycerin", "Parfum"]);
        let observations = vec![
            Observation::new(
                "INGREDIENTS:",
                0.9,
                [[0.0, 0.0], [100.0, 0.0], [100.0, 10.0], [0.0, 10.0]],
            ),
            Observation::new(
                "Aqua, Glycerin, Parfum",
                0.9,
                [[0.0, 20.0], [100.0, 20.0], [100.0, 30.0], [0.0, 30.0]],
            ),
        ];

        let output = pipeline.analyze_observations(observations).await;

        assert_eq!(output.tokens, vec!["Aqua", "Glycerin", "Parfum"]);
        assert_eq!(output.stats.exact, 3);
    }

    #[tokio::test]
    async fn test_empty_observations_yield_empty_output() {
        let pipeline = pipeline(&["Aqua"]);

        let output = pipeline.analyze_observations(Vec::new()).await;

        assert!(output.tokens.is_empty());
        assert!(output.results.is_empty());
        assert_eq!(output.stats.token_count, 0);
    }

    #[tokio::test]
    async fn test_output_serializes_to_json() {
        let pipeline = pipeline(&["Water"]);

        let output = pipeline.analyze_text("Ingredients: Water").await;
        let json = serde_json::to_value(&output).unwrap();

        assert_eq!(json["tokens"][0], "Water");
        assert_eq!(json["results"][0]["match_type"], "exact");
    }
}
