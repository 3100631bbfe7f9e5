//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the member statements the aggregate invariants are built from:
//!   conditional primary insert, membership count, promotion candidate
//!   selection, single-pass promotion and keyed delete.
//!
//! # Invariants
//! - `insert_primary_member_if_absent` checks and inserts in one statement.
//! - `promote_member` rewrites every member flag of the account in one
//!   statement, leaving exactly one primary.
//! - Promotion candidates are ordered by storage key ascending.

use crate::model::member::{MemberId, MemberSummary};
use crate::repo::{
    bool_to_int, parse_flag, parse_uuid, AccountKey, LocationKey, MemberKey, RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{named_params, params, Connection, OptionalExtension, Row};

const MEMBER_SUMMARY_SELECT_SQL: &str = "SELECT
    guid,
    is_primary,
    first_name,
    last_name,
    address,
    city,
    cancelled
FROM member";

/// Fully resolved member row ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub guid: MemberId,
    pub account: AccountKey,
    pub location: LocationKey,
    pub primary: bool,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub locale: Option<String>,
    pub postal_code: Option<String>,
    pub cancelled: bool,
    pub joined_date_utc: DateTime<Utc>,
    pub created_utc: DateTime<Utc>,
}

/// What a delete needs to know about its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberDeleteTarget {
    pub member: MemberKey,
    pub account: AccountKey,
    pub primary: bool,
}

/// Repository interface for member operations.
pub trait MemberRepository {
    fn list_members(&self) -> RepoResult<Vec<MemberSummary>>;
    fn insert_member(&self, member: &NewMember) -> RepoResult<usize>;
    /// Inserts only when the account has no primary member; returns 0 otherwise.
    fn insert_primary_member_if_absent(&self, member: &NewMember) -> RepoResult<usize>;
    fn find_delete_target(&self, guid: MemberId) -> RepoResult<Option<MemberDeleteTarget>>;
    fn count_account_members(&self, account: AccountKey) -> RepoResult<u64>;
    /// Lowest-keyed member of the account other than `excluding`.
    fn pick_promotion_candidate(
        &self,
        account: AccountKey,
        excluding: MemberKey,
    ) -> RepoResult<Option<MemberKey>>;
    /// Sets `candidate` primary and every other member of the account non-primary.
    fn promote_member(&self, account: AccountKey, candidate: MemberKey) -> RepoResult<usize>;
    fn delete_member(&self, member: MemberKey) -> RepoResult<usize>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn list_members(&self) -> RepoResult<Vec<MemberSummary>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SUMMARY_SELECT_SQL} ORDER BY uid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_summary_row(row)?);
        }
        Ok(members)
    }

    fn insert_member(&self, member: &NewMember) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "INSERT INTO member (
                guid, account_uid, location_uid, joined_date_utc, created_utc, is_primary,
                first_name, last_name, address, city, locale, postal_code, cancelled
            ) VALUES (
                :guid, :account_uid, :location_uid, :joined_date_utc, :created_utc, :is_primary,
                :first_name, :last_name, :address, :city, :locale, :postal_code, :cancelled
            );",
            named_params! {
                ":guid": member.guid.to_string(),
                ":account_uid": member.account.0,
                ":location_uid": member.location.0,
                ":joined_date_utc": member.joined_date_utc,
                ":created_utc": member.created_utc,
                ":is_primary": bool_to_int(member.primary),
                ":first_name": member.first_name.as_str(),
                ":last_name": member.last_name.as_str(),
                ":address": member.address.as_deref(),
                ":city": member.city.as_deref(),
                ":locale": member.locale.as_deref(),
                ":postal_code": member.postal_code.as_deref(),
                ":cancelled": bool_to_int(member.cancelled),
            },
        )?;
        Ok(changed)
    }

    fn insert_primary_member_if_absent(&self, member: &NewMember) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "INSERT INTO member (
                guid, account_uid, location_uid, joined_date_utc, created_utc, is_primary,
                first_name, last_name, address, city, locale, postal_code, cancelled
            )
            SELECT
                :guid, :account_uid, :location_uid, :joined_date_utc, :created_utc, 1,
                :first_name, :last_name, :address, :city, :locale, :postal_code, :cancelled
            WHERE NOT EXISTS (
                SELECT 1
                FROM member m
                WHERE m.account_uid = :account_uid
                  AND m.is_primary = 1
            );",
            named_params! {
                ":guid": member.guid.to_string(),
                ":account_uid": member.account.0,
                ":location_uid": member.location.0,
                ":joined_date_utc": member.joined_date_utc,
                ":created_utc": member.created_utc,
                ":first_name": member.first_name.as_str(),
                ":last_name": member.last_name.as_str(),
                ":address": member.address.as_deref(),
                ":city": member.city.as_deref(),
                ":locale": member.locale.as_deref(),
                ":postal_code": member.postal_code.as_deref(),
                ":cancelled": bool_to_int(member.cancelled),
            },
        )?;
        Ok(changed)
    }

    fn find_delete_target(&self, guid: MemberId) -> RepoResult<Option<MemberDeleteTarget>> {
        let raw: Option<(i64, i64, i64)> = self
            .conn
            .query_row(
                "SELECT uid, account_uid, is_primary FROM member WHERE guid = ?1;",
                [guid.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match raw {
            Some((member, account, primary)) => Ok(Some(MemberDeleteTarget {
                member: MemberKey(member),
                account: AccountKey(account),
                primary: parse_flag(primary, "member.is_primary")?,
            })),
            None => Ok(None),
        }
    }

    fn count_account_members(&self, account: AccountKey) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM member WHERE account_uid = ?1;",
            [account.0],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn pick_promotion_candidate(
        &self,
        account: AccountKey,
        excluding: MemberKey,
    ) -> RepoResult<Option<MemberKey>> {
        let uid: Option<i64> = self
            .conn
            .query_row(
                "SELECT uid
                 FROM member
                 WHERE account_uid = ?1
                   AND uid <> ?2
                 ORDER BY uid ASC
                 LIMIT 1;",
                params![account.0, excluding.0],
                |row| row.get(0),
            )
            .optional()?;
        Ok(uid.map(MemberKey))
    }

    fn promote_member(&self, account: AccountKey, candidate: MemberKey) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE member
             SET is_primary = CASE WHEN uid = ?2 THEN 1 ELSE 0 END
             WHERE account_uid = ?1;",
            params![account.0, candidate.0],
        )?;
        Ok(changed)
    }

    fn delete_member(&self, member: MemberKey) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM member WHERE uid = ?1;", [member.0])?;
        Ok(changed)
    }
}

pub(crate) fn parse_member_summary_row(row: &Row<'_>) -> RepoResult<MemberSummary> {
    let guid_text: String = row.get("guid")?;
    Ok(MemberSummary {
        guid: parse_uuid(&guid_text, "member.guid")?,
        primary: parse_flag(row.get("is_primary")?, "member.is_primary")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        address: row.get("address")?,
        city: row.get("city")?,
        cancelled: parse_flag(row.get("cancelled")?, "member.cancelled")?,
    })
}
