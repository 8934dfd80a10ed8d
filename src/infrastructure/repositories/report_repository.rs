//! Report Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Report, ReportRepository, ReportStatus};
use crate::shared::error::AppError;

const REPORT_COLUMNS: &str = "id, reported_player_id, reporter_id, reason, description, \
     video_url, status, resolution, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id: i64,
    reported_player_id: i64,
    reporter_id: i64,
    reason: String,
    description: String,
    video_url: Option<String>,
    status: String,
    resolution: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReportRow {
    fn into_report(self) -> Report {
        Report {
            id: self.id,
            reported_player_id: self.reported_player_id,
            reporter_id: self.reporter_id,
            reason: self.reason,
            description: self.description,
            video_url: self.video_url,
            status: ReportStatus::from_str(&self.status).unwrap_or_default(),
            resolution: self.resolution,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL report repository implementation.
#[derive(Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, report: &Report) -> Result<Report, AppError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "INSERT INTO reports (reported_player_id, reporter_id, reason, description, \
             video_url, status) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            REPORT_COLUMNS
        ))
        .bind(report.reported_player_id)
        .bind(report.reporter_id)
        .bind(&report.reason)
        .bind(&report.description)
        .bind(&report.video_url)
        .bind(report.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_report())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Report>, AppError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_report()))
    }

    async fn exists_open(
        &self,
        reporter_id: i64,
        reported_player_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reports \
             WHERE reporter_id = $1 AND reported_player_id = $2 \
               AND status IN ('PENDING', 'REVIEWING'))",
        )
        .bind(reporter_id)
        .bind(reported_player_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn update_status(
        &self,
        id: i64,
        status: ReportStatus,
        resolution: Option<&str>,
    ) -> Result<Report, AppError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "UPDATE reports SET status = $2, resolution = COALESCE($3, resolution), \
             updated_at = NOW() WHERE id = $1 RETURNING {}",
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(resolution)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report with id {} not found", id)))?;

        Ok(row.into_report())
    }

    async fn find_by_reporter(&self, reporter_id: i64) -> Result<Vec<Report>, AppError> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports WHERE reporter_id = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .bind(reporter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_report()).collect())
    }

    async fn find_by_reported_player(
        &self,
        reported_player_id: i64,
    ) -> Result<Vec<Report>, AppError> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports WHERE reported_player_id = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .bind(reported_player_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_report()).collect())
    }

    async fn find_by_status(&self, status: ReportStatus) -> Result<Vec<Report>, AppError> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports WHERE status = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_report()).collect())
    }

    async fn find_open(&self) -> Result<Vec<Report>, AppError> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports WHERE status IN ('PENDING', 'REVIEWING') \
             ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_report()).collect())
    }

    async fn find_all(&self) -> Result<Vec<Report>, AppError> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_report()).collect())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Report with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_open(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE status IN ('PENDING', 'REVIEWING')",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
