use crate::reconcile::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Reference service error: {0}")]
    Service(#[from] ServiceError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
