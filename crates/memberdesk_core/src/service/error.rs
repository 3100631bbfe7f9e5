//! Service error taxonomy shared by all use-case services.
//!
//! # Invariants
//! - Every variant except `Storage` and `Cancelled` is raised only after the
//!   operation's scope has been rolled back.

use crate::db::DbError;
use crate::model::account::AccountId;
use crate::model::location::LocationId;
use crate::model::member::MemberId;
use crate::model::validation::InputValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Referenced entity that could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    Account(AccountId),
    Location(LocationId),
    Member(MemberId),
}

/// Business rule that blocked the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Removing this member would leave its account without members.
    LastMember(MemberId),
}

/// Concurrency-sensitive guard that rejected the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// The account already has a primary member.
    PrimaryAlreadyExists(AccountId),
    /// No other member was available to take over the primary flag.
    NoPromotionCandidate(MemberId),
}

/// Error returned by account/member/location services.
#[derive(Debug)]
pub enum ServiceError {
    Validation(InputValidationError),
    NotFound(NotFound),
    InvariantViolation(InvariantViolation),
    Conflict(Conflict),
    /// A write touched an unexpected number of rows.
    WriteFailed(&'static str),
    /// Cancellation was observed before the scope opened.
    Cancelled,
    Storage(RepoError),
}

impl Display for NotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account(id) => write!(f, "account not found: {id}"),
            Self::Location(id) => write!(f, "location not found: {id}"),
            Self::Member(id) => write!(f, "member not found: {id}"),
        }
    }
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastMember(id) => write!(f, "cannot delete last member: {id}"),
        }
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrimaryAlreadyExists(id) => {
                write!(f, "a primary member already exists for account {id}")
            }
            Self::NoPromotionCandidate(id) => {
                write!(f, "no member available to replace primary member {id}")
            }
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(err) => write!(f, "{err}"),
            Self::InvariantViolation(err) => write!(f, "{err}"),
            Self::Conflict(err) => write!(f, "{err}"),
            Self::WriteFailed(details) => write!(f, "{details}"),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InputValidationError> for ServiceError {
    fn from(value: InputValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<NotFound> for ServiceError {
    fn from(value: NotFound) -> Self {
        Self::NotFound(value)
    }
}

impl From<InvariantViolation> for ServiceError {
    fn from(value: InvariantViolation) -> Self {
        Self::InvariantViolation(value)
    }
}

impl From<Conflict> for ServiceError {
    fn from(value: Conflict) -> Self {
        Self::Conflict(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(DbError::ScopeCancelled(_)) => Self::Cancelled,
            other => Self::Storage(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        RepoError::from(value).into()
    }
}
