use crate::model::leave_request::LeaveStatus;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

/// Business-rule failures of the leave core. Every variant is a terminal
/// answer for the caller, not a transient fault to retry.
#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("employee {0} not found")]
    EmployeeNotFound(i64),

    #[error("leave request {0} not found")]
    RequestNotFound(i64),

    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("insufficient leave balance: only {available} day(s) available")]
    InsufficientBalance { available: i64 },

    /// The used-leave counter would leave [0, total_leaves]. Internal guard of
    /// the ledger; reachable from outside only through the submit-time race.
    #[error("leave counter for employee {employee_id} would leave its valid range")]
    InvariantViolation { employee_id: i64 },

    #[error("cannot change a request from {from} to {to}")]
    InvalidTransition { from: LeaveStatus, to: LeaveStatus },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type LeaveResult<T> = Result<T, LeaveError>;

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::EmployeeNotFound(_) | LeaveError::RequestNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            LeaveError::InvalidRange { .. } | LeaveError::InvalidTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            LeaveError::InsufficientBalance { .. } | LeaveError::InvariantViolation { .. } => {
                StatusCode::CONFLICT
            }
            LeaveError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let LeaveError::Database(e) = self {
            tracing::error!(error = %e, "Database error");
            // storage details stay out of the response body
            return HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }));
        }

        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}
