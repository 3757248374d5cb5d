//! Unauthenticated form intake

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        form_request::{FormReceipt, SubmitFormRequest},
        laboratory::LaboratoryOption,
    },
    rules::FormType,
    AppState,
};

async fn submit(
    state: &AppState,
    form_type: FormType,
    data: SubmitFormRequest,
) -> AppResult<(StatusCode, Json<FormReceipt>)> {
    data.validate()?;
    let receipt = state.services.forms.submit(form_type, &data).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Request use of a laboratory
#[utoipa::path(
    post,
    path = "/public-forms/lab-requests",
    tag = "public-forms",
    request_body = SubmitFormRequest,
    responses(
        (status = 201, description = "Request received", body = FormReceipt),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn submit_lab_request(
    State(state): State<AppState>,
    Json(data): Json<SubmitFormRequest>,
) -> AppResult<(StatusCode, Json<FormReceipt>)> {
    submit(&state, FormType::LabRequest, data).await
}

/// Request to borrow equipment
#[utoipa::path(
    post,
    path = "/public-forms/equipment-borrows",
    tag = "public-forms",
    request_body = SubmitFormRequest,
    responses(
        (status = 201, description = "Request received", body = FormReceipt),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn submit_equipment_borrow(
    State(state): State<AppState>,
    Json(data): Json<SubmitFormRequest>,
) -> AppResult<(StatusCode, Json<FormReceipt>)> {
    submit(&state, FormType::EquipmentBorrow, data).await
}

/// Request a software installation
#[utoipa::path(
    post,
    path = "/public-forms/software-installations",
    tag = "public-forms",
    request_body = SubmitFormRequest,
    responses(
        (status = 201, description = "Request received", body = FormReceipt),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn submit_software_installation(
    State(state): State<AppState>,
    Json(data): Json<SubmitFormRequest>,
) -> AppResult<(StatusCode, Json<FormReceipt>)> {
    submit(&state, FormType::SoftwareInstallation, data).await
}

/// Laboratories offered by the public forms
#[utoipa::path(
    get,
    path = "/public-forms/laboratories",
    tag = "public-forms",
    responses(
        (status = 200, description = "Laboratories", body = Vec<LaboratoryOption>)
    )
)]
pub async fn list_laboratories(State(state): State<AppState>) -> AppResult<Json<Vec<LaboratoryOption>>> {
    let labs = state.services.laboratories.list_options().await?;
    Ok(Json(labs))
}
