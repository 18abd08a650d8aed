use crate::core::ledger::{self, BalanceLedger};
use crate::error::{LeaveError, LeaveResult};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

/// State machine for leave requests, and the only component allowed to move
/// the [`BalanceLedger`].
///
/// Submission is optimistic: its balance check can go stale between two
/// concurrent submissions. The decision path is authoritative; the ledger
/// adjustment and the status write share one transaction, so overcommitted
/// approvals fail cleanly instead of corrupting the counter.
#[derive(Clone)]
pub struct RequestLifecycle {
    pool: SqlitePool,
    ledger: BalanceLedger,
}

/// Ledger delta for a `(current, requested)` status pair, or `None` when the
/// transition is not supported. Encoded as a flat lookup so each row of the
/// table is testable on its own.
pub(crate) fn transition_delta(from: LeaveStatus, to: LeaveStatus, days: i64) -> Option<i64> {
    use LeaveStatus::*;
    match (from, to) {
        (Pending, Approved) => Some(days),
        (Pending, Rejected) => Some(0),
        (Approved, Rejected) => Some(-days),
        (Rejected, Approved) => Some(days),
        (Approved, Approved) | (Rejected, Rejected) => Some(0),
        // reopening a decided (or pending) request is not supported
        (_, Pending) => None,
    }
}

impl RequestLifecycle {
    pub fn new(pool: SqlitePool) -> Self {
        let ledger = BalanceLedger::new(pool.clone());
        Self { pool, ledger }
    }

    /// Read access to the counters for balance endpoints. Writes stay inside
    /// this module.
    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    /// Creates a new pending request after validating the date range and the
    /// employee's remaining balance.
    ///
    /// The balance gate here is advisory: two concurrent submissions may both
    /// pass it. Approval re-checks under the ledger guard, so the counter
    /// itself can never overcommit.
    pub async fn submit(
        &self,
        employee_id: i64,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
    ) -> LeaveResult<LeaveRequest> {
        if end_date < start_date {
            return Err(LeaveError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }

        // inclusive span: a single-day leave counts as one day
        let days = (end_date - start_date).num_days() + 1;

        let available = self.ledger.available(employee_id).await?;
        if days > available {
            return Err(LeaveError::InsufficientBalance { available });
        }

        let applied_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO leave_requests \
             (employee_id, leave_type, start_date, end_date, days, reason, status, applied_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(employee_id)
        .bind(leave_type)
        .bind(start_date)
        .bind(end_date)
        .bind(days)
        .bind(&reason)
        .bind(LeaveStatus::Pending)
        .bind(applied_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(request_id = id, employee_id, days, "Leave request submitted");

        let mut conn = self.pool.acquire().await?;
        fetch_request(&mut conn, id).await
    }

    /// Moves a request to `new_status`, applying the matching ledger delta in
    /// the same transaction. Either both writes commit or neither does.
    pub async fn set_status(
        &self,
        request_id: i64,
        new_status: LeaveStatus,
        decided_by: i64,
    ) -> LeaveResult<LeaveRequest> {
        let mut tx = self.pool.begin().await?;

        let request = fetch_request(&mut tx, request_id).await?;

        let delta = transition_delta(request.status, new_status, request.days).ok_or(
            LeaveError::InvalidTransition {
                from: request.status,
                to: new_status,
            },
        )?;

        if delta != 0 {
            if let Err(err) = ledger::adjust_used_in(&mut tx, request.employee_id, delta).await {
                // an approval that lost the submit-time race surfaces as an
                // ordinary balance rejection; the rollback leaves the request
                // and the counter exactly as they were
                return Err(match err {
                    LeaveError::InvariantViolation { .. } if delta > 0 => {
                        let balance = ledger::balance_in(&mut tx, request.employee_id).await?;
                        LeaveError::InsufficientBalance {
                            available: balance.available,
                        }
                    }
                    other => other,
                });
            }
        }

        let decided_at = Utc::now();
        sqlx::query(
            "UPDATE leave_requests SET status = ?, decided_by = ?, decided_at = ? WHERE id = ?",
        )
        .bind(new_status)
        .bind(decided_by)
        .bind(decided_at)
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        let updated = fetch_request(&mut tx, request_id).await?;
        tx.commit().await?;

        info!(
            request_id,
            employee_id = updated.employee_id,
            from = %request.status,
            to = %new_status,
            delta,
            decided_by,
            "Leave request status changed"
        );

        Ok(updated)
    }

    /// Single request lookup.
    pub async fn request(&self, request_id: i64) -> LeaveResult<LeaveRequest> {
        let mut conn = self.pool.acquire().await?;
        fetch_request(&mut conn, request_id).await
    }
}

async fn fetch_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> LeaveResult<LeaveRequest> {
    sqlx::query_as::<_, LeaveRequest>(
        "SELECT id, employee_id, leave_type, start_date, end_date, days, reason, \
                status, applied_at, decided_by, decided_at \
         FROM leave_requests WHERE id = ?",
    )
    .bind(request_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(LeaveError::RequestNotFound(request_id))
}
