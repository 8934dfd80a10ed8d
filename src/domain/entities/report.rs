//! Abuse report entity and repository trait.
//!
//! Maps to the `reports` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Moderation state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    #[default]
    Pending,
    Reviewing,
    Resolved,
    Rejected,
}

impl ReportStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "REVIEWING" => Some(Self::Reviewing),
            "RESOLVED" => Some(Self::Resolved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reviewing => "REVIEWING",
            Self::Resolved => "RESOLVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Open reports still need moderator attention.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Reviewing)
    }
}

/// An abuse report filed against a player listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub reported_player_id: i64,
    pub reporter_id: i64,
    pub reason: String,
    pub description: String,
    /// Link to video evidence
    pub video_url: Option<String>,
    pub status: ReportStatus,
    /// Moderator resolution note
    pub resolution: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for abuse reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn create(&self, report: &Report) -> Result<Report, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Report>, AppError>;

    /// Whether the reporter already has an open report against the player.
    async fn exists_open(
        &self,
        reporter_id: i64,
        reported_player_id: i64,
    ) -> Result<bool, AppError>;

    async fn update_status(
        &self,
        id: i64,
        status: ReportStatus,
        resolution: Option<&str>,
    ) -> Result<Report, AppError>;

    async fn find_by_reporter(&self, reporter_id: i64) -> Result<Vec<Report>, AppError>;

    async fn find_by_reported_player(
        &self,
        reported_player_id: i64,
    ) -> Result<Vec<Report>, AppError>;

    async fn find_by_status(&self, status: ReportStatus) -> Result<Vec<Report>, AppError>;

    /// Pending and reviewing reports.
    async fn find_open(&self) -> Result<Vec<Report>, AppError>;

    async fn find_all(&self) -> Result<Vec<Report>, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    async fn count_open(&self) -> Result<i64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_states() {
        assert!(ReportStatus::Pending.is_open());
        assert!(ReportStatus::Reviewing.is_open());
        assert!(!ReportStatus::Resolved.is_open());
        assert!(!ReportStatus::Rejected.is_open());
    }
}
