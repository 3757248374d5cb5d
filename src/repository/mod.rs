//! Repository layer for database operations
//!
//! Read helpers take any `PgExecutor` so they run equally on the pool or
//! inside a transaction; multi-statement writes take `&mut PgConnection`.

pub mod assets;
pub mod daily_reports;
pub mod form_requests;
pub mod laboratories;
pub mod maintenance;
pub mod procedures;
pub mod users;
pub mod workstations;

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub laboratories: laboratories::LaboratoriesRepository,
    pub workstations: workstations::WorkstationsRepository,
    pub assets: assets::AssetsRepository,
    pub maintenance: maintenance::MaintenanceRepository,
    pub daily_reports: daily_reports::DailyReportsRepository,
    pub procedures: procedures::ProceduresRepository,
    pub forms: form_requests::FormRequestsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            laboratories: laboratories::LaboratoriesRepository::new(pool.clone()),
            workstations: workstations::WorkstationsRepository::new(pool.clone()),
            assets: assets::AssetsRepository::new(pool.clone()),
            maintenance: maintenance::MaintenanceRepository::new(pool.clone()),
            daily_reports: daily_reports::DailyReportsRepository::new(pool.clone()),
            procedures: procedures::ProceduresRepository::new(pool.clone()),
            forms: form_requests::FormRequestsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Start a transaction; dropping it without commit rolls back
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Connectivity probe used by the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Lower-cased `LIKE ... ESCAPE '\'` pattern matching `text` anywhere,
/// with the wildcards of the input taken literally
pub(crate) fn contains_pattern(text: &str) -> String {
    let needle = text.trim().to_lowercase();
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" Dell "), "%dell%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("PT_01"), "%pt\\_01%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
