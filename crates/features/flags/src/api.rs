//! HTTP surface for the dashboard and the public evaluation endpoint.
//!
//! Handlers are mounted through [`dashboard_router`] / [`evaluation_router`]
//! against a state type that can hand out a [`Dashboard`].

use crate::dashboard::Dashboard;
use crate::error::FlagsError;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use fhub_domain::flags::{FeatureFlagDto, FilterDto};
use serde::Deserialize;
use tracing::error;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const DASHBOARD_TAG: &str = "Dashboard";
pub const FEATURES_TAG: &str = "Features";

impl IntoResponse for FlagsError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ValidationRejected { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Store(_) | Self::Internal { .. } => {
                error!(%self, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            },
        };
        (status, Json(serde_json::json!({ "message": self.to_string() }))).into_response()
    }
}

/// Routes under `/dashboardapi` for flag administration.
pub fn dashboard_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    Dashboard: axum::extract::FromRef<S>,
{
    OpenApiRouter::new()
        .routes(routes!(list_features, create_feature))
        .routes(routes!(get_feature, update_feature, delete_feature))
        .routes(routes!(list_filters))
}

/// Public evaluation route, total over flag names.
pub fn evaluation_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    Dashboard: axum::extract::FromRef<S>,
{
    OpenApiRouter::new().routes(routes!(evaluate_feature))
}

#[utoipa::path(
    get,
    path = "/dashboardapi/features",
    responses((status = OK, description = "All stored feature flags", body = [FeatureFlagDto])),
    tag = DASHBOARD_TAG,
)]
async fn list_features(State(dashboard): State<Dashboard>) -> Result<Response, FlagsError> {
    Ok(Json(dashboard.list().await?).into_response())
}

#[utoipa::path(
    get,
    path = "/dashboardapi/features/{name}",
    params(("name" = String, Path, description = "Flag name")),
    responses(
        (status = OK, description = "Stored feature flag", body = FeatureFlagDto),
        (status = NOT_FOUND, description = "Unknown flag name"),
    ),
    tag = DASHBOARD_TAG,
)]
async fn get_feature(
    State(dashboard): State<Dashboard>,
    Path(name): Path<String>,
) -> Result<Response, FlagsError> {
    Ok(Json(dashboard.get(&name).await?).into_response())
}

#[utoipa::path(
    post,
    path = "/dashboardapi/features",
    request_body = FeatureFlagDto,
    responses(
        (status = CREATED, description = "Flag created", body = FeatureFlagDto),
        (status = BAD_REQUEST, description = "Change validation rejected the flag"),
        (status = CONFLICT, description = "A flag with this name already exists"),
    ),
    tag = DASHBOARD_TAG,
)]
async fn create_feature(
    State(dashboard): State<Dashboard>,
    Json(dto): Json<FeatureFlagDto>,
) -> Result<Response, FlagsError> {
    let created = dashboard.create(dto).await?;
    let location = format!("/dashboardapi/features/{}", created.name);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

#[utoipa::path(
    put,
    path = "/dashboardapi/features/{name}",
    params(("name" = String, Path, description = "Flag name")),
    request_body = FeatureFlagDto,
    responses(
        (status = OK, description = "Flag replaced", body = FeatureFlagDto),
        (status = BAD_REQUEST, description = "Change validation rejected the flag"),
        (status = NOT_FOUND, description = "Unknown flag name"),
    ),
    tag = DASHBOARD_TAG,
)]
async fn update_feature(
    State(dashboard): State<Dashboard>,
    Path(name): Path<String>,
    Json(dto): Json<FeatureFlagDto>,
) -> Result<Response, FlagsError> {
    Ok(Json(dashboard.update(&name, dto).await?).into_response())
}

#[utoipa::path(
    delete,
    path = "/dashboardapi/features/{name}",
    params(("name" = String, Path, description = "Flag name")),
    responses(
        (status = NO_CONTENT, description = "Flag deleted"),
        (status = BAD_REQUEST, description = "Change validation rejected the delete"),
        (status = NOT_FOUND, description = "Unknown flag name"),
    ),
    tag = DASHBOARD_TAG,
)]
async fn delete_feature(
    State(dashboard): State<Dashboard>,
    Path(name): Path<String>,
) -> Result<Response, FlagsError> {
    dashboard.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/dashboardapi/filters",
    responses((status = OK, description = "Registered filter types", body = [FilterDto])),
    tag = DASHBOARD_TAG,
)]
async fn list_filters(State(dashboard): State<Dashboard>) -> Response {
    Json(dashboard.filters()).into_response()
}

#[derive(Debug, Deserialize)]
struct EvaluationQuery {
    /// Optional stable subject key for deterministic bucketing filters.
    key: Option<String>,
}

#[utoipa::path(
    get,
    path = "/features/{name}",
    params(
        ("name" = String, Path, description = "Flag name"),
        ("key" = Option<String>, Query, description = "Targeting key"),
    ),
    responses((status = OK, description = "Whether the flag is enabled", body = bool)),
    tag = FEATURES_TAG,
)]
async fn evaluate_feature(
    State(dashboard): State<Dashboard>,
    Path(name): Path<String>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Response, FlagsError> {
    let enabled = dashboard.is_enabled(&name, query.key.as_deref()).await?;
    Ok(Json(enabled).into_response())
}
