use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::domain::AnalysisRequest;
use super::repository::ReferenceData;
use super::service::{AdmissionAnalyzer, AnalysisError};

/// Router builder exposing the analysis and grant tier endpoints.
pub fn analysis_router<S>(service: Arc<AdmissionAnalyzer<S>>) -> Router
where
    S: ReferenceData + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/analysis", post(analyze_handler::<S>))
        .route(
            "/api/v1/grants/:subject/tiers",
            get(grant_tiers_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn analyze_handler<S>(
    State(service): State<Arc<AdmissionAnalyzer<S>>>,
    axum::Json(request): axum::Json<AnalysisRequest>,
) -> Response
where
    S: ReferenceData + ?Sized + 'static,
{
    match service.analyze(&request).await {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn grant_tiers_handler<S>(
    State(service): State<Arc<AdmissionAnalyzer<S>>>,
    Path(subject): Path<String>,
) -> Response
where
    S: ReferenceData + ?Sized + 'static,
{
    match service.grant_tier_minimums(&subject).await {
        Ok(tiers) => {
            let payload = json!({
                "subject": subject,
                "tiers": tiers,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) fn error_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::SubjectMismatch { .. } => StatusCode::BAD_REQUEST,
        AnalysisError::UnknownSubject { .. } => StatusCode::NOT_FOUND,
        AnalysisError::InvalidCombination { .. }
        | AnalysisError::PointsOutOfRange { .. }
        | AnalysisError::MissingYear { .. }
        | AnalysisError::AmbiguousElective { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Repository(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(err: AnalysisError) -> Response {
    let status = error_status(&err);
    if err.is_client_error() {
        tracing::warn!(error = %err, "analysis request rejected");
    } else {
        error!(error = %err, "analysis failed");
    }

    let message = match err {
        AnalysisError::Repository(_) => {
            "Database service unavailable or transaction failed.".to_string()
        }
        other => other.to_string(),
    };
    (status, axum::Json(json!({ "error": message }))).into_response()
}
