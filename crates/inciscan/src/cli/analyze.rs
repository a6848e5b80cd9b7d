use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use inciscan_core::{
    AnalysisOutput, HttpReferenceService, HttpServiceConfig, LabelPipeline, MatchType, Observation,
};

use super::segment::read_input;

pub async fn run(
    file: &Path,
    endpoint: Option<&str>,
    rate_limit: u64,
    output: Option<&Path>,
    observations: bool,
) -> Result<()> {
    let raw = read_input(file)?;

    let mut config = HttpServiceConfig {
        rate_limit: Duration::from_secs(rate_limit),
        ..HttpServiceConfig::default()
    };
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint.to_string();
    }
    let service = HttpReferenceService::new(&config).context("failed to build service client")?;
    let pipeline = LabelPipeline::new(Arc::new(service));

    let analysis = if observations {
        let parsed: Vec<Observation> =
            serde_json::from_str(&raw).context("failed to parse observation JSON")?;
        pipeline.analyze_observations(parsed).await
    } else {
        pipeline.analyze_text(&raw).await
    };

    print_summary(&analysis);

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&analysis)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    }

    Ok(())
}

fn print_summary(analysis: &AnalysisOutput) {
    for result in &analysis.results {
        match result.match_type {
            MatchType::Exact => eprintln!("  ✓ {}", result.original),
            MatchType::NoMatch => eprintln!("  ✗ {}", result.original),
            _ => {
                let corrected = result.corrected.as_deref().unwrap_or(&result.original);
                eprintln!("  → {} ({})", result.original, corrected);
            }
        }
    }

    let stats = &analysis.stats;
    eprintln!(
        "{} tokens: {} exact, {} split, {} combined, {} fuzzy, {} unmatched ({} ms)",
        stats.token_count,
        stats.exact,
        stats.split_exact,
        stats.combined,
        stats.fuzzy,
        stats.no_match,
        stats.duration_ms
    );
}
