//! Account aggregate root.
//!
//! # Responsibility
//! - Define the caller-facing account record and its enumerations.
//! - Define create/update inputs and their field validation.
//! - Derive billing dates from the billing period.
//!
//! # Invariants
//! - `guid` is the only identifier exposed to callers; the storage key stays
//!   inside the repository layer.
//! - `next_billing_utc` is one calendar month after `period_start_utc` at
//!   creation time.

use crate::model::location::LocationId;
use crate::model::validation::{InputValidationError, ValidationResult};
use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-facing account identifier.
pub type AccountId = Uuid;

/// Account lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Good standing. Every new account starts here.
    Green,
    /// Payment overdue or under review.
    Yellow,
    /// Suspended.
    Red,
    /// Closed; kept for history.
    Cancelled,
}

impl AccountStatus {
    pub(crate) fn as_db(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "GREEN" => Some(Self::Green),
            "YELLOW" => Some(Self::Yellow),
            "RED" => Some(Self::Red),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Billing plan of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Individual,
    Family,
    Business,
}

impl AccountType {
    pub(crate) fn as_db(self) -> &'static str {
        match self {
            Self::Individual => "INDIVIDUAL",
            Self::Family => "FAMILY",
            Self::Business => "BUSINESS",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "INDIVIDUAL" => Some(Self::Individual),
            "FAMILY" => Some(Self::Family),
            "BUSINESS" => Some(Self::Business),
            _ => None,
        }
    }
}

/// Account read model returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub guid: AccountId,
    pub status: AccountStatus,
    pub account_type: AccountType,
    pub payment_amount: Decimal,
    pub pend_cancel: bool,
    pub pend_cancel_date_utc: Option<DateTime<Utc>>,
    pub period_start_utc: DateTime<Utc>,
    pub period_end_utc: DateTime<Utc>,
    pub next_billing_utc: DateTime<Utc>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: Option<DateTime<Utc>>,
    pub end_date_utc: Option<DateTime<Utc>>,
}

/// Input for opening a new account at an existing location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountInput {
    pub location_guid: LocationId,
    pub account_type: AccountType,
    pub payment_amount: Decimal,
    pub period_start_utc: DateTime<Utc>,
    pub period_end_utc: DateTime<Utc>,
}

impl CreateAccountInput {
    pub fn validate(&self) -> ValidationResult {
        if self.location_guid.is_nil() {
            return Err(InputValidationError::NilId {
                field: "locationGuid",
            });
        }
        if self.payment_amount < Decimal::ZERO {
            return Err(InputValidationError::NegativeAmount {
                field: "paymentAmount",
            });
        }
        if self.period_end_utc <= self.period_start_utc {
            return Err(InputValidationError::InvalidRange {
                start: "periodStartUtc",
                end: "periodEndUtc",
            });
        }
        if next_billing_after(self.period_start_utc).is_none() {
            return Err(InputValidationError::InvalidFormat {
                field: "periodStartUtc",
            });
        }
        Ok(())
    }
}

/// Full replacement of the mutable account fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountInput {
    pub status: AccountStatus,
    pub account_type: AccountType,
    pub payment_amount: Decimal,
    #[serde(default)]
    pub pend_cancel: bool,
    #[serde(default)]
    pub pend_cancel_date_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date_utc: Option<DateTime<Utc>>,
}

impl UpdateAccountInput {
    pub fn validate(&self) -> ValidationResult {
        if self.payment_amount < Decimal::ZERO {
            return Err(InputValidationError::NegativeAmount {
                field: "paymentAmount",
            });
        }
        if self.pend_cancel && self.pend_cancel_date_utc.is_none() {
            return Err(InputValidationError::Missing {
                field: "pendCancelDateUtc",
                required_by: "pendCancel",
            });
        }
        if let (Some(pend_date), Some(end_date)) = (self.pend_cancel_date_utc, self.end_date_utc) {
            if end_date < pend_date {
                return Err(InputValidationError::InvalidRange {
                    start: "pendCancelDateUtc",
                    end: "endDateUtc",
                });
            }
        }
        Ok(())
    }
}

/// Next billing date for a period starting at `period_start`.
///
/// Adds one calendar month; the day is clamped to the end of the target
/// month (Jan 31 -> Feb 28/29). Returns `None` only on calendar overflow.
pub fn next_billing_after(period_start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    period_start.checked_add_months(Months::new(1))
}

#[cfg(test)]
mod tests {
    use super::{
        next_billing_after, AccountStatus, AccountType, CreateAccountInput, UpdateAccountInput,
    };
    use crate::model::validation::InputValidationError;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn create_input() -> CreateAccountInput {
        CreateAccountInput {
            location_guid: Uuid::new_v4(),
            account_type: AccountType::Individual,
            payment_amount: Decimal::new(4999, 2),
            period_start_utc: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            period_end_utc: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn next_billing_adds_one_calendar_month() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap();
        assert_eq!(
            next_billing_after(start),
            Some(Utc.with_ymd_and_hms(2024, 4, 15, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn next_billing_clamps_to_month_end() {
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(
            next_billing_after(start),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn create_input_rejects_inverted_period() {
        let mut input = create_input();
        input.period_end_utc = input.period_start_utc;
        let err = input.validate().unwrap_err();
        assert_eq!(err.field(), "periodEndUtc");
    }

    #[test]
    fn create_input_rejects_negative_payment_and_nil_location() {
        let mut input = create_input();
        input.payment_amount = Decimal::new(-1, 0);
        assert!(matches!(
            input.validate(),
            Err(InputValidationError::NegativeAmount { .. })
        ));

        let mut input = create_input();
        input.location_guid = Uuid::nil();
        assert!(matches!(
            input.validate(),
            Err(InputValidationError::NilId {
                field: "locationGuid"
            })
        ));
    }

    #[test]
    fn update_input_requires_date_when_pending_cancel() {
        let input = UpdateAccountInput {
            status: AccountStatus::Yellow,
            account_type: AccountType::Family,
            payment_amount: Decimal::ZERO,
            pend_cancel: true,
            pend_cancel_date_utc: None,
            end_date_utc: None,
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.field(), "pendCancelDateUtc");
    }

    #[test]
    fn status_round_trips_through_storage_text() {
        for status in [
            AccountStatus::Green,
            AccountStatus::Yellow,
            AccountStatus::Red,
            AccountStatus::Cancelled,
        ] {
            assert_eq!(AccountStatus::from_db(status.as_db()), Some(status));
        }
        assert_eq!(AccountStatus::from_db("green"), None);
    }
}
