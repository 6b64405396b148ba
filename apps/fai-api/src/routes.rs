use axum::{
	Json, Router,
	extract::{
		Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::{StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fai_service::{Error as ServiceError, QueryRequest, QueryResponse};

use crate::state::AppState;

pub const TRAINING_FILENAME: &str = "facilitai-training.jsonl";

const QUERY_FAILED: &str = "Query failed.";
const EXPORT_FAILED: &str = "Failed to fetch data.";
const TRAINING_FAILED: &str = "Failed to generate training data.";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/query", post(query))
		.route("/export", get(export))
		.route("/training-data", get(training_data))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn query(
	State(state): State<AppState>,
	payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
	// A missing or unreadable body is treated as a request without a query.
	let request = match payload {
		Ok(Json(request)) => request,
		Err(rejection) => {
			tracing::warn!(error = %rejection.body_text(), "Rejected query body.");

			QueryRequest::default()
		},
	};
	let response =
		state.service.query(request).await.map_err(|err| ApiError::service(err, QUERY_FAILED))?;
	Ok(Json(response))
}

async fn export(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
	let response =
		state.service.export().await.map_err(|err| ApiError::service(err, EXPORT_FAILED))?;
	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct TrainingParams {
	#[serde(rename = "numPrompts")]
	num_prompts: Option<u32>,
}

async fn training_data(
	State(state): State<AppState>,
	params: Result<Query<TrainingParams>, QueryRejection>,
) -> Result<Response, ApiError> {
	let Ok(Query(params)) = params else {
		return Err(json_error(StatusCode::BAD_REQUEST, "numPrompts must be a positive integer."));
	};
	let pairs = state
		.service
		.training_data(params.num_prompts)
		.await
		.map_err(|err| ApiError::service(err, TRAINING_FAILED))?;
	let disposition = format!("attachment; filename=\"{TRAINING_FILENAME}\"");

	tracing::info!(pairs = pairs.len(), "Serving training data.");

	Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(pairs)).into_response())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self { status, message: message.into() }
	}

	/// Client errors keep their message. Everything else is logged and reported as `fallback`.
	fn service(err: ServiceError, fallback: &str) -> Self {
		match err {
			ServiceError::MissingInput =>
				json_error(StatusCode::BAD_REQUEST, ServiceError::MissingInput.to_string()),
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, message),
			other => {
				tracing::error!(error = %other, "Request failed.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, fallback)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(ErrorBody { error: self.message })).into_response()
	}
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> ApiError {
	ApiError::new(status, message)
}
