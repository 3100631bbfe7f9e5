//! Member use-case service.
//!
//! # Responsibility
//! - Provide member list/create/delete APIs.
//! - Keep the primary-member invariants of the account aggregate.
//!
//! # Invariants
//! - A primary member is only inserted when its account has none; the check
//!   and the insert are one statement inside a write scope.
//! - The last member of an account can never be deleted.
//! - Deleting the primary member promotes the lowest-keyed remaining member
//!   in the same scope, before the delete.

use crate::db::{Database, ScopeMode};
use crate::model::member::{CreateMemberInput, MemberId, MemberSummary};
use crate::repo::account_repo::{AccountRepository, SqliteAccountRepository};
use crate::repo::member_repo::{MemberRepository, NewMember, SqliteMemberRepository};
use crate::service::abort;
use crate::service::collaborators::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
use crate::service::error::{
    Conflict, InvariantViolation, NotFound, ServiceError, ServiceResult,
};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

/// Use-case service for members of the account aggregate.
#[derive(Debug, Clone)]
pub struct MemberService<C = SystemClock, G = RandomIdGenerator> {
    db: Database,
    clock: C,
    ids: G,
}

impl MemberService {
    /// Creates a service backed by the system clock and random ids.
    pub fn new(db: Database) -> Self {
        Self::with_collaborators(db, SystemClock, RandomIdGenerator)
    }
}

impl<C: Clock, G: IdGenerator> MemberService<C, G> {
    pub fn with_collaborators(db: Database, clock: C, ids: G) -> Self {
        Self { db, clock, ids }
    }

    /// Lists every member in storage-key order.
    pub fn list(&self, cancel: &CancellationToken) -> ServiceResult<Vec<MemberSummary>> {
        let uow = self.db.begin("member.list", ScopeMode::ReadOnly, cancel)?;
        let members = SqliteMemberRepository::new(&uow).list_members()?;
        uow.commit()?;
        Ok(members)
    }

    /// Adds a member to an existing account and returns its id.
    ///
    /// The member inherits the account's location.
    ///
    /// # Errors
    /// - `Validation` for malformed input.
    /// - `NotFound::Account` when the account does not exist.
    /// - `Conflict::PrimaryAlreadyExists` when `primary` is requested and the
    ///   account already has a primary member.
    pub fn create(
        &self,
        input: &CreateMemberInput,
        cancel: &CancellationToken,
    ) -> ServiceResult<MemberId> {
        let uow = self
            .db
            .begin("member.create", ScopeMode::ReadWrite, cancel)?;
        if let Err(err) = input.validate() {
            return abort(uow, err.into());
        }
        let Some(keys) = SqliteAccountRepository::new(&uow).find_account_keys(input.account_guid)?
        else {
            return abort(uow, NotFound::Account(input.account_guid).into());
        };

        let now = self.clock.now_utc();
        let member = NewMember {
            guid: self.ids.next_id(),
            account: keys.account,
            location: keys.location,
            primary: input.primary,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            address: trimmed(input.address.as_deref()),
            city: trimmed(input.city.as_deref()),
            locale: input.locale.clone(),
            postal_code: input.postal_code.clone(),
            cancelled: input.cancelled,
            joined_date_utc: input.joined_date_utc.unwrap_or(now),
            created_utc: now,
        };

        let members = SqliteMemberRepository::new(&uow);
        let changed = if member.primary {
            members.insert_primary_member_if_absent(&member)?
        } else {
            members.insert_member(&member)?
        };
        if changed != 1 {
            if member.primary {
                warn!(
                    "event=member_create module=service status=conflict account={}",
                    input.account_guid
                );
                return abort(uow, Conflict::PrimaryAlreadyExists(input.account_guid).into());
            }
            return abort(uow, ServiceError::WriteFailed("unable to add member"));
        }
        uow.commit()?;
        info!(
            "event=member_create module=service status=ok account={} member={} primary={}",
            input.account_guid, member.guid, member.primary
        );
        Ok(member.guid)
    }

    /// Deletes a member, promoting a replacement when it was the primary.
    ///
    /// # Errors
    /// - `NotFound::Member` when the member does not exist.
    /// - `InvariantViolation::LastMember` when it is the only member left.
    /// - `Conflict::NoPromotionCandidate` when a primary has no replacement.
    /// - `WriteFailed` when the promotion updates no row.
    pub fn delete_by_id(&self, id: MemberId, cancel: &CancellationToken) -> ServiceResult<()> {
        let uow = self
            .db
            .begin("member.delete", ScopeMode::ReadWrite, cancel)?;
        let members = SqliteMemberRepository::new(&uow);

        let Some(target) = members.find_delete_target(id)? else {
            return abort(uow, NotFound::Member(id).into());
        };
        if members.count_account_members(target.account)? <= 1 {
            warn!("event=member_delete module=service status=rejected reason=last_member member={id}");
            return abort(uow, InvariantViolation::LastMember(id).into());
        }

        if target.primary {
            let Some(candidate) = members.pick_promotion_candidate(target.account, target.member)?
            else {
                return abort(uow, Conflict::NoPromotionCandidate(id).into());
            };
            if members.promote_member(target.account, candidate)? == 0 {
                return abort(uow, ServiceError::WriteFailed("unable to promote member"));
            }
        }

        if members.delete_member(target.member)? != 1 {
            return abort(uow, NotFound::Member(id).into());
        }
        uow.commit()?;
        info!(
            "event=member_delete module=service status=ok member={id} promoted={}",
            target.primary
        );
        Ok(())
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|value| value.trim().to_string())
}
