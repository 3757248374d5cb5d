//! Daily activity reports repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::daily_report::{CreateDailyReport, DailyReport, DailyReportEntry, DailyReportQuery},
};

const REPORT_SELECT: &str = r#"
    SELECT d.daily_report_id, d.lab_id, l.lab_name, d.report_date, d.checked_by,
           u.full_name AS checked_by_name, d.remarks, d.created_at
    FROM daily_reports d
    JOIN laboratories l ON l.lab_id = d.lab_id
    LEFT JOIN users u ON u.user_id = d.checked_by
"#;

#[derive(Clone)]
pub struct DailyReportsRepository {
    pool: Pool<Postgres>,
}

impl DailyReportsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &DailyReportQuery, lab_id: Option<i32>) -> AppResult<Vec<DailyReport>> {
        let sql = format!(
            r#"{}
            WHERE ($1::int IS NULL OR d.lab_id = $1)
              AND ($2::date IS NULL OR d.report_date >= $2)
              AND ($3::date IS NULL OR d.report_date <= $3)
            ORDER BY d.report_date DESC, l.lab_name
            "#,
            REPORT_SELECT
        );
        let rows = sqlx::query_as::<_, DailyReport>(&sql)
            .bind(lab_id)
            .bind(query.from)
            .bind(query.to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<DailyReport> {
        let sql = format!("{} WHERE d.daily_report_id = $1", REPORT_SELECT);
        sqlx::query_as::<_, DailyReport>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Daily report {} not found", id)))
    }

    pub async fn entries(&self, id: i32) -> AppResult<Vec<DailyReportEntry>> {
        let rows = sqlx::query_as::<_, DailyReportEntry>(
            r#"
            SELECT e.entry_id, e.procedure_id, p.description, e.is_done, e.remarks
            FROM daily_report_entries e
            JOIN procedures p ON p.procedure_id = e.procedure_id
            WHERE e.daily_report_id = $1
            ORDER BY p.sort_order, e.entry_id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a report and its entries
    pub async fn insert(&self, conn: &mut PgConnection, data: &CreateDailyReport, checked_by: i32) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO daily_reports (lab_id, report_date, checked_by, remarks)
            VALUES ($1, $2, $3, $4)
            RETURNING daily_report_id
            "#,
        )
        .bind(data.lab_id)
        .bind(data.report_date)
        .bind(checked_by)
        .bind(&data.remarks)
        .fetch_one(&mut *conn)
        .await?;

        for entry in &data.entries {
            sqlx::query(
                r#"
                INSERT INTO daily_report_entries (daily_report_id, procedure_id, is_done, remarks)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(entry.procedure_id)
            .bind(entry.is_done)
            .bind(&entry.remarks)
            .execute(&mut *conn)
            .await?;
        }

        Ok(id)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM daily_reports WHERE daily_report_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Daily report {} not found", id)));
        }
        Ok(())
    }
}
