//! Service-level errors and their wire classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rb_core::QueryError;
use rb_network::RouteError;

/// A failed route or viewport request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error kinds reported to callers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    OutOfRange,
    NotConnected,
    Malformed,
    BudgetExceeded,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Route(RouteError::OutOfRange { .. }) => ErrorKind::OutOfRange,
            ServiceError::Route(RouteError::NotConnected { .. }) => ErrorKind::NotConnected,
            ServiceError::Route(RouteError::Query(q)) | ServiceError::Query(q) => query_kind(q),
        }
    }
}

fn query_kind(err: &QueryError) -> ErrorKind {
    match err {
        QueryError::BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
        _ => ErrorKind::Malformed,
    }
}
