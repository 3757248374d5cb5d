//! Form requests repository

use sqlx::{types::Json, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::form_request::{FormQuery, FormRequest, SubmitFormRequest},
    rules::FormStatus,
};

#[derive(Clone)]
pub struct FormRequestsRepository {
    pool: Pool<Postgres>,
}

impl FormRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, data: &SubmitFormRequest) -> AppResult<FormRequest> {
        let row = sqlx::query_as::<_, FormRequest>(
            r#"
            INSERT INTO form_requests (form_type, lab_id, requester_name, requester_email, purpose, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.details.form_type())
        .bind(data.lab_id)
        .bind(data.requester_name.trim())
        .bind(&data.requester_email)
        .bind(data.purpose.trim())
        .bind(Json(&data.details))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// List forms; `lab_id` is the already-scoped laboratory filter
    pub async fn list(&self, query: &FormQuery, lab_id: Option<i32>) -> AppResult<Vec<FormRequest>> {
        let rows = sqlx::query_as::<_, FormRequest>(
            r#"
            SELECT * FROM form_requests
            WHERE ($1::int IS NULL OR lab_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR form_type = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(lab_id)
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.form_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<FormRequest> {
        sqlx::query_as::<_, FormRequest>("SELECT * FROM form_requests WHERE form_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Form request {} not found", id)))
    }

    /// Record a custodian decision, only if the form is still in `from`
    pub async fn record_custodian_decision(
        &self,
        id: i32,
        from: FormStatus,
        to: FormStatus,
        custodian_id: i32,
        reason: Option<&str>,
    ) -> AppResult<FormRequest> {
        sqlx::query_as::<_, FormRequest>(
            r#"
            UPDATE form_requests SET
                status = $3,
                custodian_id = $4,
                custodian_acted_at = NOW(),
                rejection_reason = COALESCE($5, rejection_reason)
            WHERE form_id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(custodian_id)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Form request {} was modified concurrently", id)))
    }

    /// Record an administrator decision, only if the form is still in `from`
    pub async fn record_admin_decision(
        &self,
        id: i32,
        from: FormStatus,
        to: FormStatus,
        admin_id: i32,
        reason: Option<&str>,
    ) -> AppResult<FormRequest> {
        sqlx::query_as::<_, FormRequest>(
            r#"
            UPDATE form_requests SET
                status = $3,
                admin_id = $4,
                admin_acted_at = NOW(),
                rejection_reason = COALESCE($5, rejection_reason)
            WHERE form_id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(admin_id)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Form request {} was modified concurrently", id)))
    }
}
