//! Quarterly preventive maintenance (QPMC) and repair endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppResult,
    models::maintenance::{
        CreateRepairLog, MaintenanceOutcome, PmcExport, PmcQuery, PmcReportDetails, PmcReportListing, QuarterQuery,
        ServiceLog, SubmitMaintenance, WorkstationServiceState,
    },
    rules::Quarter,
    AppState,
};

use super::AuthenticatedUser;

/// Explicit quarter when given, otherwise the configured current one
fn resolve_quarter(state: &AppState, requested: Option<&str>) -> AppResult<Quarter> {
    match requested {
        Some(quarter) => quarter.parse(),
        None => state
            .config
            .maintenance
            .current_quarter(Utc::now()),
    }
}

/// List filed maintenance reports
#[utoipa::path(
    get,
    path = "/maintenance/pmc",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(PmcQuery),
    responses(
        (status = 200, description = "Reports", body = Vec<PmcReportListing>),
        (status = 400, description = "Malformed quarter")
    )
)]
pub async fn list_reports(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PmcQuery>,
) -> AppResult<Json<Vec<PmcReportListing>>> {
    let reports = state.services.maintenance.list(claims.scope()?, &query).await?;
    Ok(Json(reports))
}

/// File or re-file the quarter's report for a workstation
#[utoipa::path(
    post,
    path = "/maintenance/pmc",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = SubmitMaintenance,
    responses(
        (status = 201, description = "Report created", body = MaintenanceOutcome),
        (status = 200, description = "Existing report updated", body = MaintenanceOutcome),
        (status = 400, description = "Invalid submission"),
        (status = 403, description = "Workstation outside the caller's laboratory")
    )
)]
pub async fn submit_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<SubmitMaintenance>,
) -> AppResult<(StatusCode, Json<MaintenanceOutcome>)> {
    payload.validate()?;
    let quarter = resolve_quarter(&state, payload.quarter.as_deref())?;

    let outcome = state
        .services
        .maintenance
        .submit_report(&claims, quarter, &payload)
        .await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// Report with its service logs
#[utoipa::path(
    get,
    path = "/maintenance/pmc/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report details", body = PmcReportDetails),
        (status = 404, description = "Report not found")
    )
)]
pub async fn get_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<PmcReportDetails>> {
    let report = state.services.maintenance.get(claims.scope()?, id).await?;
    Ok(Json(report))
}

/// Document data for a report
#[utoipa::path(
    get,
    path = "/maintenance/pmc/{id}/export",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Export payload", body = PmcExport),
        (status = 404, description = "Report not found")
    )
)]
pub async fn export_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<PmcExport>> {
    let export = state.services.maintenance.export(claims.scope()?, id).await?;
    Ok(Json(export))
}

/// Serviced/unserviced state of every workstation for a quarter
#[utoipa::path(
    get,
    path = "/maintenance/pmc/status",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(QuarterQuery),
    responses(
        (status = 200, description = "Workstation states", body = Vec<WorkstationServiceState>),
        (status = 400, description = "Malformed quarter")
    )
)]
pub async fn quarter_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<QuarterQuery>,
) -> AppResult<Json<Vec<WorkstationServiceState>>> {
    let quarter = resolve_quarter(&state, query.quarter.as_deref())?;

    let states = state
        .services
        .maintenance
        .quarter_status(claims.scope()?, quarter, query.lab_id)
        .await?;
    Ok(Json(states))
}

/// Log repairs, replacements or upgrades outside the quarterly cycle
#[utoipa::path(
    post,
    path = "/maintenance/pmc/repair",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = CreateRepairLog,
    responses(
        (status = 201, description = "Repair logged", body = ServiceLog),
        (status = 400, description = "Invalid repair"),
        (status = 409, description = "Replacement property tag already exists")
    )
)]
pub async fn create_repair_log(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<CreateRepairLog>,
) -> AppResult<(StatusCode, Json<ServiceLog>)> {
    payload.validate()?;

    let log = state
        .services
        .maintenance
        .create_repair_log(&claims, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}
