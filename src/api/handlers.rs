//! REST API handlers.
//!
//! Success bodies are sanitized target records; failures are
//! `{"error": "<message>"}`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mockable::Clock;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use super::ApiState;
use crate::target::{
    domain::TargetId,
    ports::{AppInstallations, PlatformClient, TargetRepository},
    services::{RegisterTargetRequest, RegistrationError},
};

/// Body of `POST /targets`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetBody {
    /// Organization or `owner/repo` scope.
    pub scope: String,
    /// Enterprise host; falls back to the configured host when absent.
    #[serde(default)]
    pub enterprise_host: Option<String>,
    /// Whether the scope lives on an enterprise deployment.
    #[serde(default)]
    pub is_enterprise: bool,
    /// Caller's long-lived credential.
    pub credential: String,
    /// Requested machine size.
    #[serde(default)]
    pub resource_type: Option<String>,
    /// Provisioning provider endpoint.
    #[serde(default, rename = "providerURL")]
    pub provider_url: Option<String>,
    /// Worker agent identity.
    #[serde(default)]
    pub runner_user: Option<String>,
}

impl From<CreateTargetBody> for RegisterTargetRequest {
    fn from(body: CreateTargetBody) -> Self {
        let CreateTargetBody {
            scope,
            enterprise_host,
            is_enterprise,
            credential,
            resource_type,
            provider_url,
            runner_user,
        } = body;

        let mut request = Self::new(scope, SecretString::from(credential));
        if is_enterprise {
            request = request.with_enterprise(enterprise_host);
        }
        if let Some(kind) = resource_type {
            request = request.with_resource_type(kind);
        }
        if let Some(url) = provider_url {
            request = request.with_provider_url(url);
        }
        if let Some(user) = runner_user {
            request = request.with_runner_user(user);
        }
        request
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

fn registration_failure(err: &RegistrationError) -> Response {
    let kind = err.kind();
    if kind.is_caller_error() {
        warn!(?kind, error = %err, "registration rejected");
        error_response(StatusCode::BAD_REQUEST, err.public_message())
    } else {
        error!(?kind, error = %err, "registration failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, err.public_message())
    }
}

/// POST /targets
pub async fn create_target<R, P, A, C>(
    State(state): State<ApiState<R, P, A, C>>,
    body: Result<Json<CreateTargetBody>, JsonRejection>,
) -> Response
where
    R: TargetRepository + 'static,
    P: PlatformClient + 'static,
    A: AppInstallations + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(payload) = match body {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "failed to decode request body");
            return error_response(StatusCode::BAD_REQUEST, "json decode error");
        }
    };

    let registration = state.service.register(payload.into());
    let outcome = tokio::time::timeout(state.request_timeout, registration)
        .await
        .unwrap_or_else(|_| Err(RegistrationError::DeadlineExceeded(state.request_timeout)));

    match outcome {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => registration_failure(&err),
    }
}

/// GET /targets/{id}
pub async fn get_target<R, P, A, C>(
    State(state): State<ApiState<R, P, A, C>>,
    Path(raw_id): Path<String>,
) -> Response
where
    R: TargetRepository + 'static,
    P: PlatformClient + 'static,
    A: AppInstallations + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Ok(uuid) = Uuid::parse_str(&raw_id) else {
        return error_response(StatusCode::BAD_REQUEST, "invalid target id");
    };

    let lookup = state.service.find(TargetId::from_uuid(uuid));
    let Ok(outcome) = tokio::time::timeout(state.request_timeout, lookup).await else {
        error!(target_id = %uuid, timeout = ?state.request_timeout, "target lookup timed out");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "lookup timed out");
    };

    match outcome {
        Ok(Some(view)) => Json(view).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "target not found"),
        Err(err) => registration_failure(&err),
    }
}
