//! Workstations repository

use sqlx::{postgres::PgExecutor, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::workstation::{CreateWorkstation, UpdateWorkstation, Workstation},
};

#[derive(Clone)]
pub struct WorkstationsRepository {
    pool: Pool<Postgres>,
}

impl WorkstationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, lab_filter: Option<i32>) -> AppResult<Vec<Workstation>> {
        let rows = sqlx::query_as::<_, Workstation>(
            r#"
            SELECT * FROM workstations
            WHERE ($1::int IS NULL OR lab_id = $1)
            ORDER BY lab_id, workstation_name
            "#,
        )
        .bind(lab_filter)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Workstation> {
        Self::find(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Workstation {} not found", id)))
    }

    /// Look a workstation up on any executor
    pub async fn find<'e>(executor: impl PgExecutor<'e>, id: i32) -> AppResult<Option<Workstation>> {
        let row = sqlx::query_as::<_, Workstation>("SELECT * FROM workstations WHERE workstation_id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Lock the workstation row for the rest of the transaction
    pub async fn lock<'e>(executor: impl PgExecutor<'e>, id: i32) -> AppResult<Option<Workstation>> {
        let row = sqlx::query_as::<_, Workstation>(
            "SELECT * FROM workstations WHERE workstation_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    /// Ids among `workstation_ids` that are not workstations of the laboratory
    pub async fn missing_in_lab(&self, lab_id: i32, workstation_ids: &[i32]) -> AppResult<Vec<i32>> {
        let missing: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT t.id FROM UNNEST($2::int[]) AS t(id)
            WHERE NOT EXISTS (
                SELECT 1 FROM workstations w WHERE w.workstation_id = t.id AND w.lab_id = $1
            )
            ORDER BY t.id
            "#,
        )
        .bind(lab_id)
        .bind(workstation_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }

    pub async fn create(&self, data: &CreateWorkstation) -> AppResult<Workstation> {
        let row = sqlx::query_as::<_, Workstation>(
            r#"
            INSERT INTO workstations (lab_id, workstation_name, location, remarks)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.lab_id)
        .bind(data.workstation_name.trim())
        .bind(&data.location)
        .bind(&data.remarks)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, id: i32, data: &UpdateWorkstation) -> AppResult<Workstation> {
        sqlx::query_as::<_, Workstation>(
            r#"
            UPDATE workstations SET
                workstation_name = COALESCE($2, workstation_name),
                location = COALESCE($3, location),
                remarks = COALESCE($4, remarks),
                updated_at = NOW()
            WHERE workstation_id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.workstation_name.as_deref().map(str::trim))
        .bind(&data.location)
        .bind(&data.remarks)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Workstation {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM workstations WHERE workstation_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Workstation {} not found", id)));
        }
        Ok(())
    }
}
