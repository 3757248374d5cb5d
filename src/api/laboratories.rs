//! Laboratory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::laboratory::{AssignCustodian, CreateLaboratory, Laboratory, LaboratoryDetails, UpdateLaboratory},
};

use super::AuthenticatedUser;

/// List laboratories visible to the caller
#[utoipa::path(
    get,
    path = "/laboratories",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Laboratories", body = Vec<Laboratory>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_laboratories(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Laboratory>>> {
    let labs = state.services.laboratories.list(claims.scope()?).await?;
    Ok(Json(labs))
}

/// Laboratory with its custodian and counts
#[utoipa::path(
    get,
    path = "/laboratories/{id}",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Laboratory ID")
    ),
    responses(
        (status = 200, description = "Laboratory details", body = LaboratoryDetails),
        (status = 403, description = "Laboratory outside the caller's scope"),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn get_laboratory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LaboratoryDetails>> {
    let lab = state.services.laboratories.get(claims.scope()?, id).await?;
    Ok(Json(lab))
}

/// Create a laboratory
#[utoipa::path(
    post,
    path = "/laboratories",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    request_body = CreateLaboratory,
    responses(
        (status = 201, description = "Laboratory created", body = Laboratory),
        (status = 409, description = "Laboratory name already exists")
    )
)]
pub async fn create_laboratory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateLaboratory>,
) -> AppResult<(StatusCode, Json<Laboratory>)> {
    claims.require_admin()?;
    data.validate()?;

    let lab = state.services.laboratories.create(&data).await?;
    Ok((StatusCode::CREATED, Json(lab)))
}

/// Update a laboratory
#[utoipa::path(
    put,
    path = "/laboratories/{id}",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Laboratory ID")
    ),
    request_body = UpdateLaboratory,
    responses(
        (status = 200, description = "Laboratory updated", body = Laboratory),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn update_laboratory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateLaboratory>,
) -> AppResult<Json<Laboratory>> {
    claims.require_admin()?;
    data.validate()?;

    let lab = state.services.laboratories.update(id, &data).await?;
    Ok(Json(lab))
}

/// Delete a laboratory
#[utoipa::path(
    delete,
    path = "/laboratories/{id}",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Laboratory ID")
    ),
    responses(
        (status = 204, description = "Laboratory deleted"),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn delete_laboratory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.laboratories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign the custodian in charge of a laboratory
#[utoipa::path(
    put,
    path = "/laboratories/{id}/custodian",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Laboratory ID")
    ),
    request_body = AssignCustodian,
    responses(
        (status = 200, description = "Custodian assigned", body = Laboratory),
        (status = 400, description = "User is not an active custodian"),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn assign_custodian(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<AssignCustodian>,
) -> AppResult<Json<Laboratory>> {
    claims.require_admin()?;

    let lab = state
        .services
        .laboratories
        .assign_custodian(id, data.user_id)
        .await?;
    Ok(Json(lab))
}
