//! Core domain logic for MemberDesk.
//! This crate owns the account/member aggregate and its invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{Database, DbError, ScopeMode, UnitOfWork};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{
    Account, AccountId, AccountStatus, AccountType, CreateAccountInput, UpdateAccountInput,
};
pub use model::location::{CreateLocationInput, Location, LocationId};
pub use model::member::{CreateMemberInput, MemberId, MemberSummary};
pub use model::validation::InputValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::account_service::AccountService;
pub use service::collaborators::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
pub use service::error::{Conflict, InvariantViolation, NotFound, ServiceError, ServiceResult};
pub use service::location_service::LocationService;
pub use service::member_service::MemberService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
