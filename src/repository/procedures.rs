//! Procedures repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::procedure::{CreateProcedure, Procedure, ProcedureCategory, UpdateProcedure},
};

#[derive(Clone)]
pub struct ProceduresRepository {
    pool: Pool<Postgres>,
}

impl ProceduresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, category: Option<ProcedureCategory>, include_inactive: bool) -> AppResult<Vec<Procedure>> {
        let rows = sqlx::query_as::<_, Procedure>(
            r#"
            SELECT * FROM procedures
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2 OR is_active)
            ORDER BY category, sort_order, procedure_id
            "#,
        )
        .bind(category.map(|c| c.as_str()))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Ids among `ids` that are active procedures of `category`
    pub async fn filter_active(&self, ids: &[i32], category: ProcedureCategory) -> AppResult<Vec<i32>> {
        let rows: Vec<i32> = sqlx::query_scalar(
            "SELECT procedure_id FROM procedures WHERE procedure_id = ANY($1) AND category = $2 AND is_active",
        )
        .bind(ids)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, data: &CreateProcedure) -> AppResult<Procedure> {
        let row = sqlx::query_as::<_, Procedure>(
            r#"
            INSERT INTO procedures (category, description, sort_order)
            VALUES ($1, $2, COALESCE($3, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM procedures WHERE category = $1)))
            RETURNING *
            "#,
        )
        .bind(data.category)
        .bind(data.description.trim())
        .bind(data.sort_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, id: i32, data: &UpdateProcedure) -> AppResult<Procedure> {
        sqlx::query_as::<_, Procedure>(
            r#"
            UPDATE procedures SET
                description = COALESCE($2, description),
                sort_order = COALESCE($3, sort_order),
                is_active = COALESCE($4, is_active)
            WHERE procedure_id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.description.as_deref().map(str::trim))
        .bind(data.sort_order)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Procedure {} not found", id)))
    }

    /// Procedures referenced by past reports are deactivated instead of removed
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM daily_report_entries WHERE procedure_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let result = if referenced {
            sqlx::query("UPDATE procedures SET is_active = FALSE WHERE procedure_id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query("DELETE FROM procedures WHERE procedure_id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?
        };
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Procedure {} not found", id)));
        }
        Ok(())
    }
}
