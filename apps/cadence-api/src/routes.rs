use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use cadence_service::{
	CorrectionRequest, CorrectionResponse, Error as ServiceError, FailedCommandsResponse,
	FeedbackRequest, FeedbackResponse, InterpretRequest, Interpretation, LearningStats,
	PatternItem, PatternOutcomeRequest, PatternsResponse, RecordFailureRequest,
	RecordFailureResponse, SimilarCommand, SimilarRequest, Suggestion,
};

#[derive(Debug, Deserialize)]
pub struct FailedCommandsQuery {
	pub limit: Option<u32>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/commands/interpret", post(interpret))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/learning/failures", post(record_failure))
		.route("/v1/learning/corrections", post(record_correction))
		.route("/v1/learning/similar", post(find_similar))
		.route("/v1/learning/suggest", post(suggest))
		.route("/v1/learning/stats", get(stats))
		.route("/v1/learning/failed-commands", get(failed_commands))
		.route("/v1/learning/patterns", get(patterns))
		.route("/v1/learning/patterns/{pattern_id}/outcome", post(pattern_outcome))
		.route("/v1/learning/feedback", post(feedback))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn interpret(
	State(state): State<AppState>,
	Json(payload): Json<InterpretRequest>,
) -> Result<Json<Interpretation>, ApiError> {
	let response = state.service.interpret(payload).await?;
	Ok(Json(response))
}

async fn record_failure(
	State(state): State<AppState>,
	Json(payload): Json<RecordFailureRequest>,
) -> Result<Json<RecordFailureResponse>, ApiError> {
	let response = state.service.learning.record_failure(payload).await?;
	Ok(Json(response))
}

async fn record_correction(
	State(state): State<AppState>,
	Json(payload): Json<CorrectionRequest>,
) -> Result<Json<CorrectionResponse>, ApiError> {
	let response = state.service.learning.record_correction(payload).await?;
	Ok(Json(response))
}

async fn find_similar(
	State(state): State<AppState>,
	Json(payload): Json<SimilarRequest>,
) -> Result<Json<Vec<SimilarCommand>>, ApiError> {
	let response = state.service.learning.find_similar(&payload.command).await?;
	Ok(Json(response))
}

async fn suggest(
	State(state): State<AppState>,
	Json(payload): Json<SimilarRequest>,
) -> Result<Json<Option<Suggestion>>, ApiError> {
	let response = state.service.learning.suggest(&payload.command).await?;
	Ok(Json(response))
}

async fn stats(State(state): State<AppState>) -> Result<Json<LearningStats>, ApiError> {
	let response = state.service.learning.stats().await?;
	Ok(Json(response))
}

async fn failed_commands(
	State(state): State<AppState>,
	Query(query): Query<FailedCommandsQuery>,
) -> Result<Json<FailedCommandsResponse>, ApiError> {
	let response = state.service.learning.list_failed_commands(query.limit).await?;
	Ok(Json(response))
}

async fn patterns(State(state): State<AppState>) -> Result<Json<PatternsResponse>, ApiError> {
	let response = state.service.learning.list_patterns().await?;
	Ok(Json(response))
}

async fn pattern_outcome(
	State(state): State<AppState>,
	Path(pattern_id): Path<Uuid>,
	Json(payload): Json<PatternOutcomeRequest>,
) -> Result<Json<PatternItem>, ApiError> {
	let response = state.service.learning.record_pattern_outcome(pattern_id, payload).await?;
	Ok(Json(response))
}

async fn feedback(
	State(state): State<AppState>,
	Json(payload): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, ApiError> {
	let response = state.service.learning.record_feedback(payload).await?;
	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			ServiceError::NotFound { message } =>
				ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			ServiceError::StorageUnavailable { message } => {
				tracing::error!(error = %message, "Learning store unavailable.");

				ApiError::new(
					StatusCode::SERVICE_UNAVAILABLE,
					"STORAGE_UNAVAILABLE",
					"Learning store is unavailable.",
					None,
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
