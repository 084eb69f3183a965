//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`InvalidCriteria`] returned when a filter cannot be applied to an entity.
//! - [`UnknownField`] returned when a criterion, sort or metric names a field
//!   the entity does not declare.
//! - [`InvalidPageSize`] returned when a page size of zero is requested.
//!
//! Action rejections are not errors: see [`Rejection`].
//!
//!  [`InvalidCriteria`]: EngineError::InvalidCriteria
//!  [`UnknownField`]: EngineError::UnknownField
//!  [`InvalidPageSize`]: EngineError::InvalidPageSize
//!  [`Rejection`]: crate::Rejection
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),
    #[error("\"{0}\" field not found!")]
    UnknownField(String),
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
    #[error("Invalid metric: {0}")]
    InvalidMetric(String),
    #[error("Invalid page size: {0}")]
    InvalidPageSize(u32),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),
    #[error("\"{0}\" already present!")]
    DuplicateId(String),
    #[error(transparent)]
    Dataset(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidCriteria(a), Self::InvalidCriteria(b)) => a == b,
            (Self::UnknownField(a), Self::UnknownField(b)) => a == b,
            (Self::UnknownStatus(a), Self::UnknownStatus(b)) => a == b,
            (Self::InvalidMetric(a), Self::InvalidMetric(b)) => a == b,
            (Self::InvalidPageSize(a), Self::InvalidPageSize(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::UnsupportedCurrency(a), Self::UnsupportedCurrency(b)) => a == b,
            (Self::UnknownEntity(a), Self::UnknownEntity(b)) => a == b,
            (Self::DuplicateId(a), Self::DuplicateId(b)) => a == b,
            (Self::Dataset(a), Self::Dataset(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
