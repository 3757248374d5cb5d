//! Inventory assets repository

use sqlx::{postgres::PgExecutor, PgConnection, Pool, Postgres};

use super::contains_pattern;
use crate::{
    error::{AppError, AppResult},
    models::asset::{Asset, AssetQuery, AssetStatus, CreateAsset, StatusCount, UpdateAsset},
};

const ASSET_SELECT: &str = r#"
    SELECT a.asset_id, a.property_tag, a.unit_type, a.brand, a.model, a.serial_number,
           a.specifications, a.date_acquired, a.status_id, s.status_name, a.lab_id,
           a.workstation_id, a.remarks, a.created_at, a.updated_at
    FROM inventory_assets a
    JOIN asset_statuses s ON s.status_id = a.status_id
"#;

const ASSET_FILTER: &str = r#"
    WHERE ($1::int IS NULL OR a.lab_id = $1)
      AND ($2::int IS NULL OR a.workstation_id = $2)
      AND ($3::text IS NULL OR LOWER(s.status_name) = LOWER($3))
      AND ($4::text IS NULL OR LOWER(a.unit_type) = LOWER($4))
      AND ($5::text IS NULL
           OR LOWER(a.property_tag) LIKE $5 ESCAPE '\'
           OR LOWER(COALESCE(a.brand, '')) LIKE $5 ESCAPE '\'
           OR LOWER(COALESCE(a.model, '')) LIKE $5 ESCAPE '\'
           OR LOWER(COALESCE(a.serial_number, '')) LIKE $5 ESCAPE '\')
"#;

#[derive(Clone)]
pub struct AssetsRepository {
    pool: Pool<Postgres>,
}

impl AssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search assets; `lab_id` is the already-scoped laboratory filter
    pub async fn search(&self, query: &AssetQuery, lab_id: Option<i32>) -> AppResult<(Vec<Asset>, i64)> {
        let pattern = query
            .search
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| contains_pattern(s));

        let count_query = format!(
            "SELECT COUNT(*) FROM inventory_assets a JOIN asset_statuses s ON s.status_id = a.status_id {}",
            ASSET_FILTER
        );
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(lab_id)
            .bind(query.workstation_id)
            .bind(&query.status)
            .bind(&query.unit_type)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let list_query = format!(
            "{} {} ORDER BY a.property_tag LIMIT $6 OFFSET $7",
            ASSET_SELECT, ASSET_FILTER
        );
        let assets = sqlx::query_as::<_, Asset>(&list_query)
            .bind(lab_id)
            .bind(query.workstation_id)
            .bind(&query.status)
            .bind(&query.unit_type)
            .bind(&pattern)
            .bind(query.per_page())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((assets, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Asset> {
        Self::find(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    pub async fn find<'e>(executor: impl PgExecutor<'e>, id: i32) -> AppResult<Option<Asset>> {
        let query = format!("{} WHERE a.asset_id = $1", ASSET_SELECT);
        let asset = sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(asset)
    }

    /// Assets attached to one workstation
    pub async fn for_workstation<'e>(executor: impl PgExecutor<'e>, workstation_id: i32) -> AppResult<Vec<Asset>> {
        let query = format!(
            "{} WHERE a.workstation_id = $1 ORDER BY a.unit_type, a.property_tag",
            ASSET_SELECT
        );
        let assets = sqlx::query_as::<_, Asset>(&query)
            .bind(workstation_id)
            .fetch_all(executor)
            .await?;
        Ok(assets)
    }

    /// Assets attached to any of the given workstations
    pub async fn for_workstations(&self, workstation_ids: &[i32]) -> AppResult<Vec<Asset>> {
        let query = format!(
            "{} WHERE a.workstation_id = ANY($1) ORDER BY a.unit_type, a.property_tag",
            ASSET_SELECT
        );
        let assets = sqlx::query_as::<_, Asset>(&query)
            .bind(workstation_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(assets)
    }

    /// Ids among `asset_ids` that are not assets of the laboratory
    pub async fn missing_in_lab(&self, lab_id: i32, asset_ids: &[i32]) -> AppResult<Vec<i32>> {
        let missing: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT t.id FROM UNNEST($2::int[]) AS t(id)
            WHERE NOT EXISTS (
                SELECT 1 FROM inventory_assets a WHERE a.asset_id = t.id AND a.lab_id = $1
            )
            ORDER BY t.id
            "#,
        )
        .bind(lab_id)
        .bind(asset_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }

    /// Rows of the status lookup table
    pub async fn statuses(&self) -> AppResult<Vec<AssetStatus>> {
        let rows = sqlx::query_as::<_, AssetStatus>("SELECT * FROM asset_statuses ORDER BY status_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Resolve a status name against the lookup table
    pub async fn status_by_name<'e>(executor: impl PgExecutor<'e>, name: &str) -> AppResult<AssetStatus> {
        sqlx::query_as::<_, AssetStatus>(
            "SELECT * FROM asset_statuses WHERE LOWER(status_name) = LOWER($1)",
        )
        .bind(name.trim())
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Unknown asset status '{}'", name)))
    }

    pub async fn insert(&self, conn: &mut PgConnection, data: &CreateAsset, status_id: i32) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO inventory_assets (
                property_tag, unit_type, brand, model, serial_number, specifications,
                date_acquired, status_id, lab_id, workstation_id, remarks
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING asset_id
            "#,
        )
        .bind(data.property_tag.trim())
        .bind(data.unit_type.trim())
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(&data.specifications)
        .bind(data.date_acquired)
        .bind(status_id)
        .bind(data.lab_id)
        .bind(data.workstation_id)
        .bind(&data.remarks)
        .fetch_one(&mut *conn)
        .await?;
        Ok(id)
    }

    pub async fn update(&self, id: i32, data: &UpdateAsset, status_id: Option<i32>) -> AppResult<Asset> {
        let result = sqlx::query(
            r#"
            UPDATE inventory_assets SET
                property_tag = COALESCE($2, property_tag),
                unit_type = COALESCE($3, unit_type),
                brand = COALESCE($4, brand),
                model = COALESCE($5, model),
                serial_number = COALESCE($6, serial_number),
                specifications = COALESCE($7, specifications),
                date_acquired = COALESCE($8, date_acquired),
                status_id = COALESCE($9, status_id),
                workstation_id = CASE WHEN $10 THEN NULL ELSE COALESCE($11, workstation_id) END,
                remarks = COALESCE($12, remarks),
                updated_at = NOW()
            WHERE asset_id = $1
            "#,
        )
        .bind(id)
        .bind(data.property_tag.as_deref().map(str::trim))
        .bind(data.unit_type.as_deref().map(str::trim))
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(&data.specifications)
        .bind(data.date_acquired)
        .bind(status_id)
        .bind(data.unassign_workstation)
        .bind(data.workstation_id)
        .bind(&data.remarks)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset {} not found", id)));
        }
        self.get_by_id(id).await
    }

    pub async fn set_status(&self, conn: &mut PgConnection, asset_id: i32, status_id: i32) -> AppResult<()> {
        sqlx::query("UPDATE inventory_assets SET status_id = $2, updated_at = NOW() WHERE asset_id = $1")
            .bind(asset_id)
            .bind(status_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Swap in a replacement part's identifiers
    pub async fn replace_identifiers(
        &self,
        conn: &mut PgConnection,
        asset_id: i32,
        property_tag: Option<&str>,
        serial_number: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE inventory_assets SET
                property_tag = COALESCE($2, property_tag),
                serial_number = COALESCE($3, serial_number),
                updated_at = NOW()
            WHERE asset_id = $1
            "#,
        )
        .bind(asset_id)
        .bind(property_tag)
        .bind(serial_number)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM inventory_assets WHERE asset_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset {} not found", id)));
        }
        Ok(())
    }

    /// Number of assets per status, every status listed even when zero
    pub async fn count_by_status(&self, lab_id: Option<i32>) -> AppResult<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT s.status_name, COUNT(a.asset_id) AS count
            FROM asset_statuses s
            LEFT JOIN inventory_assets a
                   ON a.status_id = s.status_id
                  AND ($1::int IS NULL OR a.lab_id = $1)
            GROUP BY s.status_id, s.status_name
            ORDER BY s.status_id
            "#,
        )
        .bind(lab_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
