mod engine;
mod limiter;
mod service;

pub use engine::{MatchResult, MatchType, Phase, ReconcileConfig, ReconciliationEngine};
pub use limiter::RateGate;
pub use service::{
    Concern, HttpReferenceService, HttpServiceConfig, LookupResponse, ReferenceRecord,
    ReferenceService, ServiceError, ServiceResult, StaticReferenceService,
};
