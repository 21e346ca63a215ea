use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleetflow_solver::error::SolverError;
use fleetflow_solver::json::types::JsonOptimizationResponse;

pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    InternalServerError(String),
}

impl From<SolverError> for ApiError {
    fn from(error: SolverError) -> Self {
        match error {
            SolverError::InvalidLocation(_)
            | SolverError::InfeasibleProblem(_)
            | SolverError::ProblemTooLarge { .. } => ApiError::BadRequest(error.to_string()),
            SolverError::QuantumTimeout
            | SolverError::QuantumDecode(_)
            | SolverError::Internal(_) => ApiError::InternalServerError(error.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::InternalServerError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(JsonOptimizationResponse::failure(message))).into_response()
    }
}
