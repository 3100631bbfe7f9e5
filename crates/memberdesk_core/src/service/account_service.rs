//! Account use-case service.
//!
//! # Responsibility
//! - Provide account list/get/create/update/delete APIs.
//! - Provide the account-scoped member projection and bulk member removal.
//!
//! # Invariants
//! - Every call opens exactly one scope and finishes it with commit or
//!   rollback before returning.
//! - New accounts start `GREEN`, not pending cancel, with
//!   `next_billing_utc` one month after `period_start_utc`.
//! - Deleting an account does not touch its members.

use crate::db::{Database, ScopeMode};
use crate::model::account::{
    next_billing_after, Account, AccountId, AccountStatus, CreateAccountInput, UpdateAccountInput,
};
use crate::model::member::MemberSummary;
use crate::model::validation::InputValidationError;
use crate::repo::account_repo::{AccountRepository, SqliteAccountRepository};
use crate::repo::location_repo::{LocationRepository, SqliteLocationRepository};
use crate::service::abort;
use crate::service::collaborators::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
use crate::service::error::{NotFound, ServiceError, ServiceResult};
use log::info;
use tokio_util::sync::CancellationToken;

/// Use-case service for the account aggregate root.
#[derive(Debug, Clone)]
pub struct AccountService<C = SystemClock, G = RandomIdGenerator> {
    db: Database,
    clock: C,
    ids: G,
}

impl AccountService {
    /// Creates a service backed by the system clock and random ids.
    pub fn new(db: Database) -> Self {
        Self::with_collaborators(db, SystemClock, RandomIdGenerator)
    }
}

impl<C: Clock, G: IdGenerator> AccountService<C, G> {
    pub fn with_collaborators(db: Database, clock: C, ids: G) -> Self {
        Self { db, clock, ids }
    }

    /// Lists every account in storage-key order.
    pub fn list(&self, cancel: &CancellationToken) -> ServiceResult<Vec<Account>> {
        let uow = self.db.begin("account.list", ScopeMode::ReadOnly, cancel)?;
        let accounts = SqliteAccountRepository::new(&uow).list_accounts()?;
        uow.commit()?;
        Ok(accounts)
    }

    pub fn get_by_id(&self, id: AccountId, cancel: &CancellationToken) -> ServiceResult<Account> {
        let uow = self.db.begin("account.get", ScopeMode::ReadOnly, cancel)?;
        let Some(account) = SqliteAccountRepository::new(&uow).get_account(id)? else {
            return abort(uow, NotFound::Account(id).into());
        };
        uow.commit()?;
        Ok(account)
    }

    /// Members of the account ordered by storage key.
    ///
    /// Unknown accounts and accounts without members both yield an empty list.
    pub fn get_members(
        &self,
        id: AccountId,
        cancel: &CancellationToken,
    ) -> ServiceResult<Vec<MemberSummary>> {
        let uow = self
            .db
            .begin("account.members", ScopeMode::ReadOnly, cancel)?;
        let members = SqliteAccountRepository::new(&uow).list_account_members(id)?;
        uow.commit()?;
        Ok(members)
    }

    /// Opens a new account at an existing location and returns its id.
    ///
    /// # Errors
    /// - `Validation` for malformed input.
    /// - `NotFound::Location` when the location does not exist.
    /// - `WriteFailed` when the insert affects no row.
    pub fn create(
        &self,
        input: &CreateAccountInput,
        cancel: &CancellationToken,
    ) -> ServiceResult<AccountId> {
        let uow = self
            .db
            .begin("account.create", ScopeMode::ReadWrite, cancel)?;
        if let Err(err) = input.validate() {
            return abort(uow, err.into());
        }
        let Some(next_billing_utc) = next_billing_after(input.period_start_utc) else {
            let err = InputValidationError::InvalidFormat {
                field: "periodStartUtc",
            };
            return abort(uow, err.into());
        };

        let Some(location) =
            SqliteLocationRepository::new(&uow).find_location_key(input.location_guid)?
        else {
            return abort(uow, NotFound::Location(input.location_guid).into());
        };

        let now = self.clock.now_utc();
        let account = Account {
            guid: self.ids.next_id(),
            status: AccountStatus::Green,
            account_type: input.account_type,
            payment_amount: input.payment_amount,
            pend_cancel: false,
            pend_cancel_date_utc: None,
            period_start_utc: input.period_start_utc,
            period_end_utc: input.period_end_utc,
            next_billing_utc,
            created_utc: now,
            updated_utc: None,
            end_date_utc: None,
        };

        let changed = SqliteAccountRepository::new(&uow).insert_account(&account, location)?;
        if changed != 1 {
            return abort(uow, ServiceError::WriteFailed("unable to add account"));
        }
        uow.commit()?;
        info!(
            "event=account_create module=service status=ok account={}",
            account.guid
        );
        Ok(account.guid)
    }

    /// Replaces the mutable fields of an account and stamps `updated_utc`.
    pub fn update_by_id(
        &self,
        id: AccountId,
        input: &UpdateAccountInput,
        cancel: &CancellationToken,
    ) -> ServiceResult<()> {
        let uow = self
            .db
            .begin("account.update", ScopeMode::ReadWrite, cancel)?;
        if let Err(err) = input.validate() {
            return abort(uow, err.into());
        }
        let changed =
            SqliteAccountRepository::new(&uow).update_account(id, input, self.clock.now_utc())?;
        if changed != 1 {
            return abort(uow, NotFound::Account(id).into());
        }
        uow.commit()?;
        info!("event=account_update module=service status=ok account={id}");
        Ok(())
    }

    /// Deletes the account row. Its members are left in place.
    pub fn delete_by_id(&self, id: AccountId, cancel: &CancellationToken) -> ServiceResult<()> {
        let uow = self
            .db
            .begin("account.delete", ScopeMode::ReadWrite, cancel)?;
        let changed = SqliteAccountRepository::new(&uow).delete_account(id)?;
        if changed != 1 {
            return abort(uow, ServiceError::WriteFailed("unable to delete account"));
        }
        uow.commit()?;
        info!("event=account_delete module=service status=ok account={id}");
        Ok(())
    }

    /// Removes every non-primary member and returns how many were removed.
    pub fn delete_non_primary_members(
        &self,
        id: AccountId,
        cancel: &CancellationToken,
    ) -> ServiceResult<usize> {
        let uow = self
            .db
            .begin("account.prune_members", ScopeMode::ReadWrite, cancel)?;
        let removed = SqliteAccountRepository::new(&uow).delete_non_primary_members(id)?;
        uow.commit()?;
        info!(
            "event=account_prune_members module=service status=ok account={id} removed={removed}"
        );
        Ok(removed)
    }
}
