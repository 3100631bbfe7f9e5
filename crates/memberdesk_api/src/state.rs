//! Shared handler state and the blocking-call bridge.

use crate::error::ApiError;
use log::error;
use memberdesk_core::{AccountService, Database, LocationService, MemberService, ServiceResult};
use tokio_util::sync::CancellationToken;

/// Services shared by every handler. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub members: MemberService,
    pub locations: LocationService,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            accounts: AccountService::new(db.clone()),
            members: MemberService::new(db.clone()),
            locations: LocationService::new(db),
        }
    }
}

/// Runs one service call on the blocking pool.
///
/// The call receives a token that is cancelled if the awaiting handler is
/// dropped first (client disconnect); the service checks it before opening
/// its scope.
pub(crate) async fn run_blocking<T, F>(call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&CancellationToken) -> ServiceResult<T> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let joined = tokio::task::spawn_blocking(move || call(&cancel)).await;
    guard.disarm();

    match joined {
        Ok(result) => result.map_err(ApiError::from),
        Err(err) => {
            error!("event=blocking_call module=api status=error error={err}");
            Err(ApiError::Internal(err.to_string()))
        }
    }
}
