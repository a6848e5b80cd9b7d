mod cleaner;
mod config;
mod extractor;
mod normalizer;
mod pipeline;
mod segmenter;

pub use cleaner::TokenCleaner;
pub use config::SegmentConfig;
pub use extractor::{IngredientSpan, SectionExtractor};
pub use normalizer::TextNormalizer;
pub use pipeline::{SegmentOutput, SegmentPipeline};
pub use segmenter::TokenSegmenter;
