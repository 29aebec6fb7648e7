//! Domain services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate repository failures into `ServiceError`.
//!
//! # Invariants
//! - Services never build SQL or open transactions.
//! - `NotFound` passes through unchanged; everything else is wrapped with the
//!   service operation name.

use crate::model::EntityId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod commodity_service;
pub mod solar_system_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level error.
#[derive(Debug)]
pub enum ServiceError {
    /// Target entity does not exist.
    NotFound {
        entity: &'static str,
        id: EntityId,
    },
    /// Repository failure tagged with the service operation that hit it.
    Repo {
        operation: &'static str,
        source: RepoError,
    },
}

impl ServiceError {
    /// Adapter for `map_err` that keeps `NotFound` and wraps the rest.
    pub(crate) fn wrap(operation: &'static str) -> impl Fn(RepoError) -> Self {
        move |err| match err {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo {
                operation,
                source: other,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Underlying repository error, when there is one.
    pub fn repo_error(&self) -> Option<&RepoError> {
        match self {
            Self::Repo { source, .. } => Some(source),
            Self::NotFound { .. } => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Repo { operation, source } => write!(f, "error {operation}: {source}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo { source, .. } => Some(source),
            Self::NotFound { .. } => None,
        }
    }
}
