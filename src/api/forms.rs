//! Staff endpoints for reviewing submitted forms

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::form_request::{FormQuery, FormRequest, RejectForm},
    rules::FormAction,
};

use super::AuthenticatedUser;

/// List submitted forms
#[utoipa::path(
    get,
    path = "/forms",
    tag = "forms",
    security(("bearer_auth" = [])),
    params(FormQuery),
    responses(
        (status = 200, description = "Forms", body = Vec<FormRequest>)
    )
)]
pub async fn list_forms(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<FormQuery>,
) -> AppResult<Json<Vec<FormRequest>>> {
    let forms = state.services.forms.list(claims.scope()?, &query).await?;
    Ok(Json(forms))
}

/// Get a form by ID
#[utoipa::path(
    get,
    path = "/forms/{id}",
    tag = "forms",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Form ID")
    ),
    responses(
        (status = 200, description = "Form", body = FormRequest),
        (status = 404, description = "Form not found")
    )
)]
pub async fn get_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<FormRequest>> {
    let form = state.services.forms.get(claims.scope()?, id).await?;
    Ok(Json(form))
}

/// Approve a form at the caller's level
#[utoipa::path(
    post,
    path = "/forms/{id}/approve",
    tag = "forms",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Form ID")
    ),
    responses(
        (status = 200, description = "Form approved", body = FormRequest),
        (status = 409, description = "Form changed concurrently"),
        (status = 422, description = "Transition not allowed")
    )
)]
pub async fn approve_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<FormRequest>> {
    let form = state
        .services
        .forms
        .decide(&claims, id, FormAction::Approve, None)
        .await?;
    Ok(Json(form))
}

/// Reject a form with a reason
#[utoipa::path(
    post,
    path = "/forms/{id}/reject",
    tag = "forms",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Form ID")
    ),
    request_body = RejectForm,
    responses(
        (status = 200, description = "Form rejected", body = FormRequest),
        (status = 409, description = "Form changed concurrently"),
        (status = 422, description = "Transition not allowed")
    )
)]
pub async fn reject_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<RejectForm>,
) -> AppResult<Json<FormRequest>> {
    data.validate()?;

    let form = state
        .services
        .forms
        .decide(&claims, id, FormAction::Reject, Some(&data.reason))
        .await?;
    Ok(Json(form))
}
