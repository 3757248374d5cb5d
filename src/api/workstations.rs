//! Workstation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        maintenance::ServiceLog,
        workstation::{CreateWorkstation, UpdateWorkstation, Workstation, WorkstationDetails, WorkstationQuery, WorkstationSummary},
    },
};

use super::AuthenticatedUser;

/// List workstations with their live status
#[utoipa::path(
    get,
    path = "/workstations",
    tag = "workstations",
    security(("bearer_auth" = [])),
    params(WorkstationQuery),
    responses(
        (status = 200, description = "Workstations", body = Vec<WorkstationSummary>),
        (status = 403, description = "Laboratory outside the caller's scope")
    )
)]
pub async fn list_workstations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<WorkstationQuery>,
) -> AppResult<Json<Vec<WorkstationSummary>>> {
    let workstations = state
        .services
        .workstations
        .list(claims.scope()?, query.lab_id)
        .await?;
    Ok(Json(workstations))
}

/// Workstation with system components and peripherals
#[utoipa::path(
    get,
    path = "/workstations/{id}",
    tag = "workstations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Workstation ID")
    ),
    responses(
        (status = 200, description = "Workstation details", body = WorkstationDetails),
        (status = 404, description = "Workstation not found")
    )
)]
pub async fn get_workstation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<WorkstationDetails>> {
    let workstation = state.services.workstations.get(claims.scope()?, id).await?;
    Ok(Json(workstation))
}

/// Create a workstation
#[utoipa::path(
    post,
    path = "/workstations",
    tag = "workstations",
    security(("bearer_auth" = [])),
    request_body = CreateWorkstation,
    responses(
        (status = 201, description = "Workstation created", body = Workstation),
        (status = 409, description = "Workstation name already used in the laboratory")
    )
)]
pub async fn create_workstation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateWorkstation>,
) -> AppResult<(StatusCode, Json<Workstation>)> {
    data.validate()?;

    let workstation = state
        .services
        .workstations
        .create(claims.scope()?, &data)
        .await?;
    Ok((StatusCode::CREATED, Json(workstation)))
}

/// Update a workstation
#[utoipa::path(
    put,
    path = "/workstations/{id}",
    tag = "workstations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Workstation ID")
    ),
    request_body = UpdateWorkstation,
    responses(
        (status = 200, description = "Workstation updated", body = Workstation),
        (status = 404, description = "Workstation not found")
    )
)]
pub async fn update_workstation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateWorkstation>,
) -> AppResult<Json<Workstation>> {
    data.validate()?;

    let workstation = state
        .services
        .workstations
        .update(claims.scope()?, id, &data)
        .await?;
    Ok(Json(workstation))
}

/// Delete a workstation; its assets become unassigned
#[utoipa::path(
    delete,
    path = "/workstations/{id}",
    tag = "workstations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Workstation ID")
    ),
    responses(
        (status = 204, description = "Workstation deleted"),
        (status = 404, description = "Workstation not found")
    )
)]
pub async fn delete_workstation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.workstations.delete(claims.scope()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Maintenance and repair history of a workstation
#[utoipa::path(
    get,
    path = "/workstations/{id}/service-logs",
    tag = "workstations",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Workstation ID")
    ),
    responses(
        (status = 200, description = "Service logs, newest first", body = Vec<ServiceLog>),
        (status = 404, description = "Workstation not found")
    )
)]
pub async fn list_service_logs(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ServiceLog>>> {
    let logs = state
        .services
        .workstations
        .service_logs(claims.scope()?, id)
        .await?;
    Ok(Json(logs))
}
