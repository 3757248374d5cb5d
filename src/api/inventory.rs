//! Inventory asset endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::AppResult,
    models::asset::{Asset, AssetQuery, AssetStatus, CreateAsset, CreateAssetBatch, StatusCount, UpdateAsset},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Laboratory filter for the status summary
#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    pub lab_id: Option<i32>,
}

/// Search assets with pagination
#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "Matching assets", body = PaginatedResponse<Asset>),
        (status = 403, description = "Laboratory outside the caller's scope")
    )
)]
pub async fn list_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<PaginatedResponse<Asset>>> {
    let (assets, total) = state.services.inventory.search(claims.scope()?, &query).await?;

    Ok(Json(PaginatedResponse {
        items: assets,
        total,
        page: query.page(),
        per_page: query.per_page(),
    }))
}

/// Get an asset by ID
#[utoipa::path(
    get,
    path = "/inventory/{id}",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset", body = Asset),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Asset>> {
    let asset = state.services.inventory.get(claims.scope()?, id).await?;
    Ok(Json(asset))
}

/// Create an asset
#[utoipa::path(
    post,
    path = "/inventory",
    tag = "inventory",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Property tag already exists")
    )
)]
pub async fn create_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    data.validate()?;

    let asset = state.services.inventory.create(claims.scope()?, &data).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Create several assets at once; nothing is stored if one fails
#[utoipa::path(
    post,
    path = "/inventory/batch",
    tag = "inventory",
    security(("bearer_auth" = [])),
    request_body = CreateAssetBatch,
    responses(
        (status = 201, description = "Assets created", body = Vec<Asset>),
        (status = 400, description = "Invalid asset in batch"),
        (status = 409, description = "Duplicate property tag in batch")
    )
)]
pub async fn create_asset_batch(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAssetBatch>,
) -> AppResult<(StatusCode, Json<Vec<Asset>>)> {
    data.validate()?;

    let assets = state
        .services
        .inventory
        .create_batch(claims.scope()?, &data.assets)
        .await?;
    Ok((StatusCode::CREATED, Json(assets)))
}

/// Update an asset
#[utoipa::path(
    put,
    path = "/inventory/{id}",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn update_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    data.validate()?;

    let asset = state.services.inventory.update(claims.scope()?, id, &data).await?;
    Ok(Json(asset))
}

/// Delete an asset
#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.inventory.delete(claims.scope()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Asset status lookup values
#[utoipa::path(
    get,
    path = "/inventory/statuses",
    tag = "inventory",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statuses", body = Vec<AssetStatus>)
    )
)]
pub async fn list_statuses(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AssetStatus>>> {
    let statuses = state.services.inventory.statuses().await?;
    Ok(Json(statuses))
}

/// Asset counts per status
#[utoipa::path(
    get,
    path = "/inventory/summary",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(SummaryQuery),
    responses(
        (status = 200, description = "Counts per status", body = Vec<StatusCount>)
    )
)]
pub async fn status_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<Vec<StatusCount>>> {
    let summary = state
        .services
        .inventory
        .summary(claims.scope()?, query.lab_id)
        .await?;
    Ok(Json(summary))
}
