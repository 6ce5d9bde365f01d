//! HTTP surface for target registration.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/targets` | Register or resurrect a target |
//! | GET | `/targets/{id}` | Read a sanitized target record |

pub mod handlers;

use crate::target::{
    ports::{AppInstallations, PlatformClient, TargetRepository},
    services::TargetRegistrationService,
};
use axum::Router;
use axum::routing::{get, post};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Shared state for API handlers.
pub struct ApiState<R, P, A, C>
where
    R: TargetRepository,
    P: PlatformClient,
    A: AppInstallations,
    C: Clock + Send + Sync,
{
    /// Registration service.
    pub service: Arc<TargetRegistrationService<R, P, A, C>>,
    /// Deadline applied to each request.
    pub request_timeout: Duration,
}

impl<R, P, A, C> Clone for ApiState<R, P, A, C>
where
    R: TargetRepository,
    P: PlatformClient,
    A: AppInstallations,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            request_timeout: self.request_timeout,
        }
    }
}

/// Builds the API router.
pub fn build_router<R, P, A, C>(
    service: Arc<TargetRegistrationService<R, P, A, C>>,
    request_timeout: Duration,
) -> Router
where
    R: TargetRepository + 'static,
    P: PlatformClient + 'static,
    A: AppInstallations + 'static,
    C: Clock + Send + Sync + 'static,
{
    let state = ApiState {
        service,
        request_timeout,
    };

    Router::new()
        .route("/targets", post(handlers::create_target::<R, P, A, C>))
        .route("/targets/{id}", get(handlers::get_target::<R, P, A, C>))
        .with_state(state)
}
