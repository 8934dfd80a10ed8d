//! Report Service
//!
//! Abuse reports against player listings and the moderation workflow.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{GamePlayerRepository, Report, ReportRepository, ReportStatus};

/// New report request
#[derive(Debug, Clone)]
pub struct NewReport {
    pub reported_player_id: i64,
    pub reason: String,
    pub description: String,
    pub video_url: Option<String>,
}

/// Report service trait
#[async_trait]
pub trait ReportService: Send + Sync {
    /// File a report. A reporter may have one open report per player.
    async fn create(&self, reporter_id: i64, report: NewReport) -> Result<Report, ReportError>;

    /// Moderator transition with an optional resolution note.
    async fn update_status(
        &self,
        report_id: i64,
        status: ReportStatus,
        resolution: Option<String>,
    ) -> Result<Report, ReportError>;

    async fn by_reporter(&self, reporter_id: i64) -> Result<Vec<Report>, ReportError>;

    async fn by_reported_player(
        &self,
        reported_player_id: i64,
    ) -> Result<Vec<Report>, ReportError>;

    async fn by_status(&self, status: ReportStatus) -> Result<Vec<Report>, ReportError>;

    async fn open_reports(&self) -> Result<Vec<Report>, ReportError>;

    async fn all_reports(&self) -> Result<Vec<Report>, ReportError>;

    async fn delete(&self, report_id: i64) -> Result<(), ReportError>;

    /// Total and unprocessed counts for the admin dashboard.
    async fn summary(&self) -> Result<(i64, i64), ReportError>;
}

/// Report service errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report not found")]
    NotFound,

    #[error("Listing not found")]
    ListingNotFound,

    #[error("You already have an open report against this player")]
    AlreadyReported,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// ReportService implementation
pub struct ReportServiceImpl<R, GP>
where
    R: ReportRepository,
    GP: GamePlayerRepository,
{
    report_repo: Arc<R>,
    player_repo: Arc<GP>,
}

impl<R, GP> ReportServiceImpl<R, GP>
where
    R: ReportRepository,
    GP: GamePlayerRepository,
{
    pub fn new(report_repo: Arc<R>, player_repo: Arc<GP>) -> Self {
        Self {
            report_repo,
            player_repo,
        }
    }
}

#[async_trait]
impl<R, GP> ReportService for ReportServiceImpl<R, GP>
where
    R: ReportRepository + 'static,
    GP: GamePlayerRepository + 'static,
{
    async fn create(&self, reporter_id: i64, report: NewReport) -> Result<Report, ReportError> {
        if self
            .player_repo
            .find_by_id(report.reported_player_id)
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))?
            .is_none()
        {
            return Err(ReportError::ListingNotFound);
        }

        if self
            .report_repo
            .exists_open(reporter_id, report.reported_player_id)
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))?
        {
            return Err(ReportError::AlreadyReported);
        }

        let now = Utc::now();
        self.report_repo
            .create(&Report {
                id: 0,
                reported_player_id: report.reported_player_id,
                reporter_id,
                reason: report.reason,
                description: report.description,
                video_url: report.video_url,
                status: ReportStatus::Pending,
                resolution: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))
    }

    async fn update_status(
        &self,
        report_id: i64,
        status: ReportStatus,
        resolution: Option<String>,
    ) -> Result<Report, ReportError> {
        self.report_repo
            .update_status(report_id, status, resolution.as_deref())
            .await
            .map_err(|e| match e {
                crate::shared::error::AppError::NotFound(_) => ReportError::NotFound,
                e => ReportError::Internal(e.to_string()),
            })
    }

    async fn by_reporter(&self, reporter_id: i64) -> Result<Vec<Report>, ReportError> {
        self.report_repo
            .find_by_reporter(reporter_id)
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))
    }

    async fn by_reported_player(
        &self,
        reported_player_id: i64,
    ) -> Result<Vec<Report>, ReportError> {
        self.report_repo
            .find_by_reported_player(reported_player_id)
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))
    }

    async fn by_status(&self, status: ReportStatus) -> Result<Vec<Report>, ReportError> {
        self.report_repo
            .find_by_status(status)
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))
    }

    async fn open_reports(&self) -> Result<Vec<Report>, ReportError> {
        self.report_repo
            .find_open()
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))
    }

    async fn all_reports(&self) -> Result<Vec<Report>, ReportError> {
        self.report_repo
            .find_all()
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))
    }

    async fn delete(&self, report_id: i64) -> Result<(), ReportError> {
        self.report_repo.delete(report_id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => ReportError::NotFound,
            e => ReportError::Internal(e.to_string()),
        })
    }

    async fn summary(&self) -> Result<(i64, i64), ReportError> {
        let total = self
            .report_repo
            .count()
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))?;
        let unprocessed = self
            .report_repo
            .count_open()
            .await
            .map_err(|e| ReportError::Internal(e.to_string()))?;

        Ok((total, unprocessed))
    }
}
