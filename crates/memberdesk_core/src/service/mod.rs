//! Core use-case services.
//!
//! # Responsibility
//! - Run each use case inside exactly one `UnitOfWork`.
//! - Enforce the account/member aggregate invariants above the repositories.
//! - Keep HTTP layers decoupled from storage details.

pub mod account_service;
pub mod collaborators;
pub mod error;
pub mod location_service;
pub mod member_service;

use crate::db::UnitOfWork;
use error::{ServiceError, ServiceResult};

/// Rolls the scope back and returns `err`.
pub(crate) fn abort<T>(uow: UnitOfWork, err: ServiceError) -> ServiceResult<T> {
    uow.rollback()?;
    Err(err)
}
