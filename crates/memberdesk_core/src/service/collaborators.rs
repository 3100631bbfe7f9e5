//! Clock and identifier sources injected into services.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// UTC time source.
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Generator of caller-facing identifiers.
pub trait IdGenerator {
    /// Returns a globally unique identifier.
    fn next_id(&self) -> Uuid;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
