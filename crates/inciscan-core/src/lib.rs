pub mod error;
pub mod observation;
pub mod pipeline;
pub mod reconcile;
pub mod segment;

pub use error::{Error, Result};
pub use observation::{AssemblyConfig, Observation, ObservationAssembler};
pub use pipeline::{AnalysisOutput, AnalysisStats, LabelPipeline};
pub use reconcile::{
    Concern, HttpReferenceService, HttpServiceConfig, LookupResponse, MatchResult, MatchType,
    Phase, RateGate, ReconcileConfig, ReconciliationEngine, ReferenceRecord, ReferenceService,
    ServiceError, ServiceResult, StaticReferenceService,
};
pub use segment::{SegmentConfig, SegmentOutput, SegmentPipeline};
