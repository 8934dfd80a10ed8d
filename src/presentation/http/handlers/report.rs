//! Report Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{ReportRequest, UpdateReportStatusRequest};
use crate::application::dto::response::{ReportResponse, ReportSummaryResponse};
use crate::application::services::{
    NewReport, ReportError, ReportService, ReportServiceImpl,
};
use crate::domain::{ReportStatus, Role};
use crate::infrastructure::repositories::{PgGamePlayerRepository, PgReportRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::NotFound => AppError::NotFound("Report not found".into()),
            ReportError::ListingNotFound => AppError::NotFound("Listing not found".into()),
            ReportError::AlreadyReported => {
                AppError::Conflict("You already have an open report against this player".into())
            }
            ReportError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

fn report_service(
    state: &AppState,
) -> ReportServiceImpl<PgReportRepository, PgGamePlayerRepository> {
    ReportServiceImpl::new(
        Arc::new(PgReportRepository::new(state.db.clone())),
        Arc::new(PgGamePlayerRepository::new(state.db.clone())),
    )
}

/// File a report against a player listing
pub async fn create_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<ReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let report = report_service(&state)
        .create(
            auth.user_id,
            NewReport {
                reported_player_id: body.reported_player_id,
                reason: body.reason,
                description: body.description,
                video_url: body.video,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ReportResponse::from(report))))
}

/// Update report status (admin)
pub async fn update_report_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<i64>,
    Json(body): Json<UpdateReportStatusRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    auth.require(Role::Admin)?;
    body.validate().map_err(validation_error)?;

    let status = ReportStatus::from_str(&body.status)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown report status: {}", body.status)))?;

    let report = report_service(&state)
        .update_status(report_id, status, body.resolution)
        .await?;

    Ok(Json(ReportResponse::from(report)))
}

/// The caller's own reports
pub async fn reports_by_reporter(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ReportResponse>>, AppError> {
    let reports = report_service(&state).by_reporter(auth.user_id).await?;
    Ok(Json(reports.into_iter().map(ReportResponse::from).collect()))
}

/// Reports against a player listing
pub async fn reports_by_reported_player(
    State(state): State<AppState>,
    Path(reported_player_id): Path<i64>,
) -> Result<Json<Vec<ReportResponse>>, AppError> {
    let reports = report_service(&state)
        .by_reported_player(reported_player_id)
        .await?;
    Ok(Json(reports.into_iter().map(ReportResponse::from).collect()))
}

/// Reports by status
pub async fn reports_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<ReportResponse>>, AppError> {
    let status = ReportStatus::from_str(&status)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown report status: {}", status)))?;

    let reports = report_service(&state).by_status(status).await?;
    Ok(Json(reports.into_iter().map(ReportResponse::from).collect()))
}

/// Open reports needing moderation (admin)
pub async fn active_reports(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ReportResponse>>, AppError> {
    auth.require(Role::Admin)?;

    let reports = report_service(&state).open_reports().await?;
    Ok(Json(reports.into_iter().map(ReportResponse::from).collect()))
}

/// All reports (admin)
pub async fn all_reports(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ReportResponse>>, AppError> {
    auth.require(Role::Admin)?;

    let reports = report_service(&state).all_reports().await?;
    Ok(Json(reports.into_iter().map(ReportResponse::from).collect()))
}

/// Delete a report (admin)
pub async fn delete_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    auth.require(Role::Admin)?;

    report_service(&state).delete(report_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Total and unprocessed report counts (admin)
pub async fn report_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ReportSummaryResponse>, AppError> {
    auth.require(Role::Admin)?;

    let (total, unprocessed) = report_service(&state).summary().await?;
    Ok(Json(ReportSummaryResponse { total, unprocessed }))
}
