//! Maintenance reports and service logs repository

use sqlx::{types::Json, PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::maintenance::{
        AssetActionRecord, LogType, PmcQuery, PmcReport, PmcReportListing, ServiceLog, UpsertedReport,
    },
};

const LISTING_SELECT: &str = r#"
    SELECT r.*, w.workstation_name, w.lab_id, l.lab_name
    FROM pmc_reports r
    JOIN workstations w ON w.workstation_id = r.workstation_id
    JOIN laboratories l ON l.lab_id = w.lab_id
"#;

const LOG_SELECT: &str = r#"
    SELECT g.*, u.full_name AS performed_by_name
    FROM service_logs g
    LEFT JOIN users u ON u.user_id = g.performed_by
"#;

#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: Pool<Postgres>,
}

impl MaintenanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert the quarter's report or bump the existing one.
    ///
    /// Relies on the (workstation_id, quarter) unique constraint so concurrent
    /// submissions collapse onto a single row.
    pub async fn upsert_report(
        &self,
        conn: &mut PgConnection,
        workstation_id: i32,
        quarter: &str,
        workstation_status: &str,
        remarks: Option<&str>,
        performed_by: i32,
    ) -> AppResult<UpsertedReport> {
        let row = sqlx::query_as::<_, UpsertedReport>(
            r#"
            INSERT INTO pmc_reports (workstation_id, quarter, workstation_status, remarks, service_count, performed_by)
            VALUES ($1, $2, $3, $4, 1, $5)
            ON CONFLICT ON CONSTRAINT pmc_reports_workstation_quarter_key DO UPDATE SET
                workstation_status = EXCLUDED.workstation_status,
                remarks = COALESCE(EXCLUDED.remarks, pmc_reports.remarks),
                service_count = pmc_reports.service_count + 1,
                performed_by = EXCLUDED.performed_by,
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(workstation_id)
        .bind(quarter)
        .bind(workstation_status)
        .bind(remarks)
        .bind(performed_by)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Append a service log entry
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_log(
        &self,
        conn: &mut PgConnection,
        pmc_id: Option<i32>,
        workstation_id: i32,
        log_type: LogType,
        asset_actions: &[AssetActionRecord],
        remarks: Option<&str>,
        performed_by: i32,
    ) -> AppResult<ServiceLog> {
        let log = sqlx::query_as::<_, ServiceLog>(
            r#"
            WITH g AS (
                INSERT INTO service_logs (pmc_id, workstation_id, log_type, asset_actions, remarks, performed_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT g.*, u.full_name AS performed_by_name
            FROM g
            LEFT JOIN users u ON u.user_id = g.performed_by
            "#,
        )
        .bind(pmc_id)
        .bind(workstation_id)
        .bind(log_type)
        .bind(Json(asset_actions))
        .bind(remarks)
        .bind(performed_by)
        .fetch_one(&mut *conn)
        .await?;
        Ok(log)
    }

    /// List reports; `lab_id` is the already-scoped laboratory filter
    pub async fn list_reports(&self, query: &PmcQuery, lab_id: Option<i32>) -> AppResult<Vec<PmcReportListing>> {
        let sql = format!(
            r#"{}
            WHERE ($1::text IS NULL OR r.quarter = $1)
              AND ($2::int IS NULL OR w.lab_id = $2)
              AND ($3::int IS NULL OR r.workstation_id = $3)
            ORDER BY r.quarter DESC, l.lab_name, w.workstation_name
            "#,
            LISTING_SELECT
        );
        let rows = sqlx::query_as::<_, PmcReportListing>(&sql)
            .bind(&query.quarter)
            .bind(lab_id)
            .bind(query.workstation_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_report(&self, pmc_id: i32) -> AppResult<PmcReportListing> {
        let sql = format!("{} WHERE r.pmc_id = $1", LISTING_SELECT);
        sqlx::query_as::<_, PmcReportListing>(&sql)
            .bind(pmc_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Maintenance report {} not found", pmc_id)))
    }

    /// Reports of one quarter for the workstations in scope
    pub async fn reports_for_quarter(&self, quarter: &str, lab_id: Option<i32>) -> AppResult<Vec<PmcReport>> {
        let rows = sqlx::query_as::<_, PmcReport>(
            r#"
            SELECT r.*
            FROM pmc_reports r
            JOIN workstations w ON w.workstation_id = r.workstation_id
            WHERE r.quarter = $1
              AND ($2::int IS NULL OR w.lab_id = $2)
            "#,
        )
        .bind(quarter)
        .bind(lab_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn logs_for_report(&self, pmc_id: i32) -> AppResult<Vec<ServiceLog>> {
        let sql = format!("{} WHERE g.pmc_id = $1 ORDER BY g.created_at, g.log_id", LOG_SELECT);
        let rows = sqlx::query_as::<_, ServiceLog>(&sql)
            .bind(pmc_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Full history of a workstation, repairs included, newest first
    pub async fn logs_for_workstation(&self, workstation_id: i32) -> AppResult<Vec<ServiceLog>> {
        let sql = format!(
            "{} WHERE g.workstation_id = $1 ORDER BY g.created_at DESC, g.log_id DESC",
            LOG_SELECT
        );
        let rows = sqlx::query_as::<_, ServiceLog>(&sql)
            .bind(workstation_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
