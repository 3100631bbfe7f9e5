//! Account repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide account CRUD statements matched by caller-facing `guid`.
//! - Provide the account-scoped member statements (projection, bulk delete).
//!
//! # Invariants
//! - Account/member joins go through `member.account_uid = account.uid`.
//! - Write statements return affected-row counts untouched.

use crate::model::account::{Account, AccountId, AccountStatus, AccountType, UpdateAccountInput};
use crate::model::member::MemberSummary;
use crate::repo::member_repo::parse_member_summary_row;
use crate::repo::{
    bool_to_int, parse_decimal, parse_flag, parse_uuid, AccountKey, LocationKey, RepoError,
    RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ACCOUNT_SELECT_SQL: &str = "SELECT
    guid,
    status,
    account_type,
    payment_amount,
    pend_cancel,
    pend_cancel_date_utc,
    period_start_utc,
    period_end_utc,
    next_billing_utc,
    created_utc,
    updated_utc,
    end_date_utc
FROM account";

/// Storage keys needed to attach a member to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountKeys {
    pub account: AccountKey,
    pub location: LocationKey,
}

/// Repository interface for account operations.
pub trait AccountRepository {
    fn list_accounts(&self) -> RepoResult<Vec<Account>>;
    fn get_account(&self, guid: AccountId) -> RepoResult<Option<Account>>;
    fn find_account_keys(&self, guid: AccountId) -> RepoResult<Option<AccountKeys>>;
    fn insert_account(&self, account: &Account, location: LocationKey) -> RepoResult<usize>;
    fn update_account(
        &self,
        guid: AccountId,
        input: &UpdateAccountInput,
        updated_utc: DateTime<Utc>,
    ) -> RepoResult<usize>;
    fn delete_account(&self, guid: AccountId) -> RepoResult<usize>;
    /// Members of the account, ordered by storage key. Empty for unknown accounts.
    fn list_account_members(&self, guid: AccountId) -> RepoResult<Vec<MemberSummary>>;
    /// Deletes every non-primary member of the account; returns the count.
    fn delete_non_primary_members(&self, guid: AccountId) -> RepoResult<usize>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn list_accounts(&self) -> RepoResult<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} ORDER BY uid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut accounts = Vec::new();
        while let Some(row) = rows.next()? {
            accounts.push(parse_account_row(row)?);
        }
        Ok(accounts)
    }

    fn get_account(&self, guid: AccountId) -> RepoResult<Option<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE guid = ?1;"))?;
        let mut rows = stmt.query([guid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?));
        }
        Ok(None)
    }

    fn find_account_keys(&self, guid: AccountId) -> RepoResult<Option<AccountKeys>> {
        let keys = self
            .conn
            .query_row(
                "SELECT uid, location_uid FROM account WHERE guid = ?1;",
                [guid.to_string()],
                |row| {
                    Ok(AccountKeys {
                        account: AccountKey(row.get(0)?),
                        location: LocationKey(row.get(1)?),
                    })
                },
            )
            .optional()?;
        Ok(keys)
    }

    fn insert_account(&self, account: &Account, location: LocationKey) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "INSERT INTO account (
                guid,
                location_uid,
                status,
                account_type,
                payment_amount,
                pend_cancel,
                pend_cancel_date_utc,
                period_start_utc,
                period_end_utc,
                next_billing_utc,
                created_utc,
                updated_utc,
                end_date_utc
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                account.guid.to_string(),
                location.0,
                account.status.as_db(),
                account.account_type.as_db(),
                account.payment_amount.to_string(),
                bool_to_int(account.pend_cancel),
                account.pend_cancel_date_utc,
                account.period_start_utc,
                account.period_end_utc,
                account.next_billing_utc,
                account.created_utc,
                account.updated_utc,
                account.end_date_utc,
            ],
        )?;
        Ok(changed)
    }

    fn update_account(
        &self,
        guid: AccountId,
        input: &UpdateAccountInput,
        updated_utc: DateTime<Utc>,
    ) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE account
             SET
                updated_utc = ?2,
                status = ?3,
                account_type = ?4,
                payment_amount = ?5,
                pend_cancel = ?6,
                pend_cancel_date_utc = ?7,
                end_date_utc = ?8
             WHERE guid = ?1;",
            params![
                guid.to_string(),
                updated_utc,
                input.status.as_db(),
                input.account_type.as_db(),
                input.payment_amount.to_string(),
                bool_to_int(input.pend_cancel),
                input.pend_cancel_date_utc,
                input.end_date_utc,
            ],
        )?;
        Ok(changed)
    }

    fn delete_account(&self, guid: AccountId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM account WHERE guid = ?1;", [guid.to_string()])?;
        Ok(changed)
    }

    fn list_account_members(&self, guid: AccountId) -> RepoResult<Vec<MemberSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                m.guid AS guid,
                m.is_primary AS is_primary,
                m.first_name AS first_name,
                m.last_name AS last_name,
                m.address AS address,
                m.city AS city,
                m.cancelled AS cancelled
             FROM account a
             INNER JOIN member m ON m.account_uid = a.uid
             WHERE a.guid = ?1
             ORDER BY m.uid ASC;",
        )?;
        let mut rows = stmt.query([guid.to_string()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_summary_row(row)?);
        }
        Ok(members)
    }

    fn delete_non_primary_members(&self, guid: AccountId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM member
             WHERE is_primary = 0
               AND account_uid IN (SELECT uid FROM account WHERE guid = ?1);",
            [guid.to_string()],
        )?;
        Ok(changed)
    }
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    let guid_text: String = row.get("guid")?;
    let status_text: String = row.get("status")?;
    let status = AccountStatus::from_db(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in account.status"))
    })?;
    let type_text: String = row.get("account_type")?;
    let account_type = AccountType::from_db(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid account type `{type_text}` in account.account_type"
        ))
    })?;
    let amount_text: String = row.get("payment_amount")?;

    Ok(Account {
        guid: parse_uuid(&guid_text, "account.guid")?,
        status,
        account_type,
        payment_amount: parse_decimal(&amount_text, "account.payment_amount")?,
        pend_cancel: parse_flag(row.get("pend_cancel")?, "account.pend_cancel")?,
        pend_cancel_date_utc: row.get("pend_cancel_date_utc")?,
        period_start_utc: row.get("period_start_utc")?,
        period_end_utc: row.get("period_end_utc")?,
        next_billing_utc: row.get("next_billing_utc")?,
        created_utc: row.get("created_utc")?,
        updated_utc: row.get("updated_utc")?,
        end_date_utc: row.get("end_date_utc")?,
    })
}
