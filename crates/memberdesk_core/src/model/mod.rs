//! Domain model for the account/member aggregate.
//!
//! # Responsibility
//! - Define caller-facing records and operation inputs.
//! - Own field-level validation rules.
//!
//! # Invariants
//! - Every record is identified externally by a stable UUID `guid`.
//! - Storage keys never appear in this module's public types.

pub mod account;
pub mod location;
pub mod member;
pub mod validation;
