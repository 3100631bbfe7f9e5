//! Location use-case service.

use crate::db::{Database, ScopeMode};
use crate::model::location::{CreateLocationInput, Location, LocationId};
use crate::repo::location_repo::{LocationRepository, SqliteLocationRepository};
use crate::service::abort;
use crate::service::collaborators::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
use crate::service::error::{ServiceError, ServiceResult};
use log::info;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct LocationService<C = SystemClock, G = RandomIdGenerator> {
    db: Database,
    clock: C,
    ids: G,
}

impl LocationService {
    pub fn new(db: Database) -> Self {
        Self::with_collaborators(db, SystemClock, RandomIdGenerator)
    }
}

impl<C: Clock, G: IdGenerator> LocationService<C, G> {
    pub fn with_collaborators(db: Database, clock: C, ids: G) -> Self {
        Self { db, clock, ids }
    }

    pub fn list(&self, cancel: &CancellationToken) -> ServiceResult<Vec<Location>> {
        let uow = self
            .db
            .begin("location.list", ScopeMode::ReadOnly, cancel)?;
        let locations = SqliteLocationRepository::new(&uow).list_locations()?;
        uow.commit()?;
        Ok(locations)
    }

    /// Registers a location that accounts can be opened at.
    pub fn create(
        &self,
        input: &CreateLocationInput,
        cancel: &CancellationToken,
    ) -> ServiceResult<LocationId> {
        let uow = self
            .db
            .begin("location.create", ScopeMode::ReadWrite, cancel)?;
        if let Err(err) = input.validate() {
            return abort(uow, err.into());
        }
        let location = Location {
            guid: self.ids.next_id(),
            name: input.name.trim().to_string(),
            created_utc: self.clock.now_utc(),
        };
        if SqliteLocationRepository::new(&uow).insert_location(&location)? != 1 {
            return abort(uow, ServiceError::WriteFailed("unable to add location"));
        }
        uow.commit()?;
        info!(
            "event=location_create module=service status=ok location={}",
            location.guid
        );
        Ok(location.guid)
    }
}
