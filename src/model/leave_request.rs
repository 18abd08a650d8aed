use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Workflow status of a leave request.
///
/// `pending` is the only initial state. Decisions are revisable: an approved
/// request may later be rejected (and vice versa), but nothing ever moves back
/// to `pending`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
    Display,
    EnumString,
    Default,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Category of leave. Stored as text; the balance rules treat every type the
/// same way.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
    Display,
    EnumString,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveType {
    Casual,
    Sick,
    Annual,
    Maternity,
    Paternity,
    Other,
}

/// A single leave request. Rows are never deleted; decided requests stay
/// behind as the audit trail for the employee's used-leave counter.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1001)]
    pub employee_id: i64,
    #[schema(example = "sick")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// Inclusive day span, fixed at submission: end_date - start_date + 1.
    #[schema(example = 3)]
    pub days: i64,
    #[schema(example = "Medical appointment", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub applied_at: DateTime<Utc>,
    /// Set on the first transition out of pending, refreshed on every later
    /// decision (including repeated same-status calls).
    #[schema(example = 1002, nullable = true)]
    pub decided_by: Option<i64>,
    #[schema(example = "2026-01-02T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub decided_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_db_text() {
        assert_eq!(LeaveStatus::Approved.to_string(), "approved");
        assert_eq!(
            LeaveStatus::from_str("rejected").unwrap(),
            LeaveStatus::Rejected
        );
    }

    #[test]
    fn leave_type_serializes_snake_case() {
        assert_eq!(LeaveType::Maternity.to_string(), "maternity");
        assert_eq!(LeaveType::from_str("casual").unwrap(), LeaveType::Casual);
    }
}
