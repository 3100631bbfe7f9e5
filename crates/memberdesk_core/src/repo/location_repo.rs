//! Location repository contracts and SQLite implementation.

use crate::model::location::{Location, LocationId};
use crate::repo::{parse_uuid, LocationKey, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for location lookups and inserts.
pub trait LocationRepository {
    fn list_locations(&self) -> RepoResult<Vec<Location>>;
    /// Resolves a caller-facing id into the storage key used by accounts.
    fn find_location_key(&self, guid: LocationId) -> RepoResult<Option<LocationKey>>;
    fn insert_location(&self, location: &Location) -> RepoResult<usize>;
}

/// SQLite-backed location repository.
pub struct SqliteLocationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLocationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LocationRepository for SqliteLocationRepository<'_> {
    fn list_locations(&self) -> RepoResult<Vec<Location>> {
        let mut stmt = self.conn.prepare(
            "SELECT guid, name, created_utc
             FROM location
             ORDER BY uid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_location_row(row)?);
        }
        Ok(items)
    }

    fn find_location_key(&self, guid: LocationId) -> RepoResult<Option<LocationKey>> {
        let uid: Option<i64> = self
            .conn
            .query_row(
                "SELECT uid FROM location WHERE guid = ?1;",
                [guid.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(uid.map(LocationKey))
    }

    fn insert_location(&self, location: &Location) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "INSERT INTO location (guid, name, created_utc) VALUES (?1, ?2, ?3);",
            params![
                location.guid.to_string(),
                location.name.as_str(),
                location.created_utc,
            ],
        )?;
        Ok(changed)
    }
}

fn parse_location_row(row: &Row<'_>) -> RepoResult<Location> {
    let guid_text: String = row.get("guid")?;
    Ok(Location {
        guid: parse_uuid(&guid_text, "location.guid")?,
        name: row.get("name")?,
        created_utc: row.get("created_utc")?,
    })
}
