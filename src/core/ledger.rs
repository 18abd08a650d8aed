use crate::error::{LeaveError, LeaveResult};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use utoipa::ToSchema;

/// Snapshot of an employee's leave counters. `available` is always derived,
/// never stored.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[schema(example = json!({ "total": 20, "used": 5, "available": 15 }))]
pub struct LeaveBalance {
    #[schema(example = 20)]
    pub total: i64,
    #[schema(example = 5)]
    pub used: i64,
    #[schema(example = 15)]
    pub available: i64,
}

/// Authoritative per-employee leave counters.
///
/// The guarded single-statement update in `adjust_used_in` is the only
/// write path for `used_leaves`; it keeps the counter inside
/// `[0, total_leaves]` no matter how callers interleave, with no in-process
/// lock table.
#[derive(Clone)]
pub struct BalanceLedger {
    pool: SqlitePool,
}

impl BalanceLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Total / used / available counters for one employee.
    pub async fn balance(&self, employee_id: i64) -> LeaveResult<LeaveBalance> {
        let mut conn = self.pool.acquire().await?;
        balance_in(&mut conn, employee_id).await
    }

    /// Remaining entitlement: `total_leaves - used_leaves`.
    pub async fn available(&self, employee_id: i64) -> LeaveResult<i64> {
        Ok(self.balance(employee_id).await?.available)
    }

    /// Atomically applies `delta` to the employee's used-leave counter.
    ///
    /// Fails with [`LeaveError::InvariantViolation`] and leaves the counter
    /// untouched if the result would fall outside `[0, total_leaves]`.
    pub async fn adjust_used(&self, employee_id: i64, delta: i64) -> LeaveResult<()> {
        let mut tx = self.pool.begin().await?;
        adjust_used_in(&mut tx, employee_id, delta).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Connection-scoped read so the lifecycle can snapshot counters inside its
/// own transaction.
pub(crate) async fn balance_in(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> LeaveResult<LeaveBalance> {
    let row: Option<(i64, i64)> =
        sqlx::query_as("SELECT total_leaves, used_leaves FROM employees WHERE id = ?")
            .bind(employee_id)
            .fetch_optional(&mut *conn)
            .await?;

    let (total, used) = row.ok_or(LeaveError::EmployeeNotFound(employee_id))?;
    Ok(LeaveBalance {
        total,
        used,
        available: total - used,
    })
}

/// The single legal write to `used_leaves`. The WHERE clause re-checks the
/// bounds against the current row state, so a stale caller cannot push the
/// counter out of range; zero affected rows means the guard (or the employee
/// lookup) refused the write.
pub(crate) async fn adjust_used_in(
    conn: &mut SqliteConnection,
    employee_id: i64,
    delta: i64,
) -> LeaveResult<()> {
    let result = sqlx::query(
        "UPDATE employees \
         SET used_leaves = used_leaves + ?1 \
         WHERE id = ?2 AND used_leaves + ?1 BETWEEN 0 AND total_leaves",
    )
    .bind(delta)
    .bind(employee_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // distinguish "no such employee" from "counter would leave bounds"
        balance_in(conn, employee_id).await?;
        return Err(LeaveError::InvariantViolation { employee_id });
    }

    Ok(())
}
