//! Checklist procedure endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::procedure::{CreateProcedure, Procedure, ProcedureQuery, UpdateProcedure},
};

use super::AuthenticatedUser;

/// List procedures, optionally by category
#[utoipa::path(
    get,
    path = "/procedures",
    tag = "procedures",
    security(("bearer_auth" = [])),
    params(ProcedureQuery),
    responses(
        (status = 200, description = "Procedures", body = Vec<Procedure>)
    )
)]
pub async fn list_procedures(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ProcedureQuery>,
) -> AppResult<Json<Vec<Procedure>>> {
    let procedures = state.services.procedures.list(&query).await?;
    Ok(Json(procedures))
}

/// Create a procedure
#[utoipa::path(
    post,
    path = "/procedures",
    tag = "procedures",
    security(("bearer_auth" = [])),
    request_body = CreateProcedure,
    responses(
        (status = 201, description = "Procedure created", body = Procedure),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_procedure(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateProcedure>,
) -> AppResult<(StatusCode, Json<Procedure>)> {
    claims.require_admin()?;
    data.validate()?;

    let procedure = state.services.procedures.create(&data).await?;
    Ok((StatusCode::CREATED, Json(procedure)))
}

/// Update a procedure
#[utoipa::path(
    put,
    path = "/procedures/{id}",
    tag = "procedures",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Procedure ID")
    ),
    request_body = UpdateProcedure,
    responses(
        (status = 200, description = "Procedure updated", body = Procedure),
        (status = 404, description = "Procedure not found")
    )
)]
pub async fn update_procedure(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateProcedure>,
) -> AppResult<Json<Procedure>> {
    claims.require_admin()?;
    data.validate()?;

    let procedure = state.services.procedures.update(id, &data).await?;
    Ok(Json(procedure))
}

/// Delete a procedure (deactivated when already used by reports)
#[utoipa::path(
    delete,
    path = "/procedures/{id}",
    tag = "procedures",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Procedure ID")
    ),
    responses(
        (status = 204, description = "Procedure removed"),
        (status = 404, description = "Procedure not found")
    )
)]
pub async fn delete_procedure(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.procedures.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
