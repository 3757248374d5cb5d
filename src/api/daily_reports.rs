//! Daily activity report (DAR) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::daily_report::{CreateDailyReport, DailyReport, DailyReportDetails, DailyReportQuery},
};

use super::AuthenticatedUser;

/// List daily reports
#[utoipa::path(
    get,
    path = "/daily-reports",
    tag = "daily-reports",
    security(("bearer_auth" = [])),
    params(DailyReportQuery),
    responses(
        (status = 200, description = "Daily reports", body = Vec<DailyReport>)
    )
)]
pub async fn list_daily_reports(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DailyReportQuery>,
) -> AppResult<Json<Vec<DailyReport>>> {
    let reports = state.services.daily_reports.list(claims.scope()?, &query).await?;
    Ok(Json(reports))
}

/// Daily report with its checklist entries
#[utoipa::path(
    get,
    path = "/daily-reports/{id}",
    tag = "daily-reports",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Daily report ID")
    ),
    responses(
        (status = 200, description = "Daily report", body = DailyReportDetails),
        (status = 404, description = "Daily report not found")
    )
)]
pub async fn get_daily_report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<DailyReportDetails>> {
    let report = state.services.daily_reports.get(claims.scope()?, id).await?;
    Ok(Json(report))
}

/// File a daily report
#[utoipa::path(
    post,
    path = "/daily-reports",
    tag = "daily-reports",
    security(("bearer_auth" = [])),
    request_body = CreateDailyReport,
    responses(
        (status = 201, description = "Daily report filed", body = DailyReportDetails),
        (status = 409, description = "Report already filed for this laboratory and date")
    )
)]
pub async fn create_daily_report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateDailyReport>,
) -> AppResult<(StatusCode, Json<DailyReportDetails>)> {
    data.validate()?;

    let report = state.services.daily_reports.create(&claims, &data).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Delete a daily report
#[utoipa::path(
    delete,
    path = "/daily-reports/{id}",
    tag = "daily-reports",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Daily report ID")
    ),
    responses(
        (status = 204, description = "Daily report deleted"),
        (status = 404, description = "Daily report not found")
    )
)]
pub async fn delete_daily_report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.daily_reports.delete(claims.scope()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
