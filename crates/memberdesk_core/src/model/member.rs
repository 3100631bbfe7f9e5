//! Member records belonging to an account aggregate.
//!
//! # Responsibility
//! - Define the caller-facing member projection and the create input.
//!
//! # Invariants
//! - A member always belongs to exactly one account (by storage key).
//! - At most one member per account carries `primary = true`; the member
//!   service keeps exactly one once the account has any members.

use crate::model::account::AccountId;
use crate::model::validation::{
    optional_locale, optional_postal_code, optional_text, require_text, InputValidationError,
    ValidationResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-facing member identifier.
pub type MemberId = Uuid;

const NAME_MAX_CHARS: usize = 100;
const ADDRESS_MAX_CHARS: usize = 200;

/// Member projection used by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub guid: MemberId,
    pub primary: bool,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub cancelled: bool,
}

/// Input for adding a member to an existing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberInput {
    pub account_guid: AccountId,
    #[serde(default)]
    pub primary: bool,
    /// Defaults to the creation time when absent.
    #[serde(default)]
    pub joined_date_utc: Option<DateTime<Utc>>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub cancelled: bool,
}

impl CreateMemberInput {
    /// Convenience constructor with only the required fields set.
    pub fn new(
        account_guid: AccountId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            account_guid,
            primary: false,
            joined_date_utc: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: None,
            city: None,
            locale: None,
            postal_code: None,
            cancelled: false,
        }
    }

    /// Marks the member as the account's primary contact.
    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn validate(&self) -> ValidationResult {
        if self.account_guid.is_nil() {
            return Err(InputValidationError::NilId {
                field: "accountGuid",
            });
        }
        require_text("firstName", &self.first_name, NAME_MAX_CHARS)?;
        require_text("lastName", &self.last_name, NAME_MAX_CHARS)?;
        optional_text("address", self.address.as_deref(), ADDRESS_MAX_CHARS)?;
        optional_text("city", self.city.as_deref(), ADDRESS_MAX_CHARS)?;
        optional_locale(self.locale.as_deref())?;
        optional_postal_code(self.postal_code.as_deref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CreateMemberInput;
    use uuid::Uuid;

    #[test]
    fn minimal_input_is_valid() {
        let input = CreateMemberInput::new(Uuid::new_v4(), "Ada", "Lovelace");
        assert!(input.validate().is_ok());
        assert!(!input.primary);
        assert!(input.as_primary().primary);
    }

    #[test]
    fn blank_last_name_is_rejected_before_optional_fields() {
        let mut input = CreateMemberInput::new(Uuid::new_v4(), "Ada", " ");
        input.locale = Some("bad locale".to_string());
        assert_eq!(input.validate().unwrap_err().field(), "lastName");
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let account = Uuid::new_v4();
        let json = format!(
            r#"{{"accountGuid":"{account}","firstName":"Grace","lastName":"Hopper","postalCode":"10001"}}"#
        );
        let input: CreateMemberInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input.account_guid, account);
        assert!(!input.primary);
        assert!(!input.cancelled);
        assert_eq!(input.postal_code.as_deref(), Some("10001"));
        assert!(input.joined_date_utc.is_none());
    }
}
