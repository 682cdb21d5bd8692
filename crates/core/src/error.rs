use uuid::Uuid;

/// Generic domain failures shared across crates.
///
/// Admission-specific rejections have their own enum
/// ([`crate::admission::AdmissionError`]); this covers the cross-cutting
/// cases handlers map onto HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
