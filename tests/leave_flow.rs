//! End-to-end tests for the balance ledger and the request lifecycle against
//! an in-memory database.

use chrono::NaiveDate;
use lms::core::RequestLifecycle;
use lms::db;
use lms::error::LeaveError;
use lms::model::leave_request::{LeaveStatus, LeaveType};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    db::ensure_schema(&pool).await.expect("schema");
    pool
}

async fn insert_employee(pool: &SqlitePool, name: &str, role: &str, total: i64, used: i64) -> i64 {
    let email = format!("{}@acme.test", name.to_lowercase().replace(' ', "."));
    sqlx::query(
        "INSERT INTO employees (name, email, password, department, role, total_leaves, used_leaves) \
         VALUES (?, ?, 'x', 'Engineering', ?, ?, ?)",
    )
    .bind(name)
    .bind(email)
    .bind(role)
    .bind(total)
    .bind(used)
    .execute(pool)
    .await
    .expect("insert employee")
    .last_insert_rowid()
}

async fn used_leaves(pool: &SqlitePool, employee_id: i64) -> i64 {
    sqlx::query_scalar("SELECT used_leaves FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_one(pool)
        .await
        .expect("used_leaves")
}

async fn request_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM leave_requests")
        .fetch_one(pool)
        .await
        .expect("request count")
}

async fn approved_days_sum(pool: &SqlitePool, employee_id: i64) -> i64 {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(days), 0) FROM leave_requests \
         WHERE employee_id = ? AND status = 'approved'",
    )
    .bind(employee_id)
    .fetch_one(pool)
    .await
    .expect("approved days")
}

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[actix_web::test]
async fn single_day_request_counts_one_day() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 0).await;

    let request = lifecycle
        .submit(emp, LeaveType::Casual, d(2026, 3, 9), d(2026, 3, 9), None)
        .await
        .unwrap();

    assert_eq!(request.days, 1);
    assert_eq!(request.status, LeaveStatus::Pending);
    assert!(request.decided_by.is_none());
    assert!(request.decided_at.is_none());
}

#[actix_web::test]
async fn five_day_span_is_inclusive() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 0).await;

    let request = lifecycle
        .submit(
            emp,
            LeaveType::Annual,
            d(2026, 3, 9),
            d(2026, 3, 13),
            Some("Spring break".into()),
        )
        .await
        .unwrap();

    assert_eq!(request.days, 5);
}

#[actix_web::test]
async fn reversed_dates_are_rejected_without_persisting() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 0).await;

    let err = lifecycle
        .submit(emp, LeaveType::Sick, d(2025, 6, 10), d(2025, 6, 5), None)
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::InvalidRange { .. }));
    assert_eq!(request_count(&pool).await, 0);
}

#[actix_web::test]
async fn submit_fails_when_days_exceed_available() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 18).await;

    let err = lifecycle
        .submit(emp, LeaveType::Casual, d(2026, 4, 1), d(2026, 4, 3), None)
        .await
        .unwrap_err();

    match err {
        LeaveError::InsufficientBalance { available } => assert_eq!(available, 2),
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }
    assert_eq!(request_count(&pool).await, 0);
    assert_eq!(used_leaves(&pool, emp).await, 18);
}

#[actix_web::test]
async fn submit_for_unknown_employee_fails() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());

    let err = lifecycle
        .submit(999, LeaveType::Sick, d(2026, 4, 1), d(2026, 4, 1), None)
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::EmployeeNotFound(999)));
}

#[actix_web::test]
async fn approval_charges_the_ledger_and_stamps_the_decider() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 0).await;
    let boss = insert_employee(&pool, "Bo Marsh", "manager", 20, 0).await;

    let request = lifecycle
        .submit(emp, LeaveType::Annual, d(2026, 5, 4), d(2026, 5, 8), None)
        .await
        .unwrap();

    let decided = lifecycle
        .set_status(request.id, LeaveStatus::Approved, boss)
        .await
        .unwrap();

    assert_eq!(decided.status, LeaveStatus::Approved);
    assert_eq!(decided.decided_by, Some(boss));
    assert!(decided.decided_at.is_some());
    assert_eq!(used_leaves(&pool, emp).await, 5);
    assert_eq!(approved_days_sum(&pool, emp).await, 5);
}

#[actix_web::test]
async fn rejection_from_pending_leaves_the_ledger_alone() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 5).await;
    let boss = insert_employee(&pool, "Bo Marsh", "manager", 20, 0).await;

    // 10 days against 15 available passes the gate
    let request = lifecycle
        .submit(emp, LeaveType::Annual, d(2026, 7, 6), d(2026, 7, 15), None)
        .await
        .unwrap();
    assert_eq!(request.days, 10);

    let decided = lifecycle
        .set_status(request.id, LeaveStatus::Rejected, boss)
        .await
        .unwrap();

    assert_eq!(decided.status, LeaveStatus::Rejected);
    assert_eq!(used_leaves(&pool, emp).await, 5);
}

#[actix_web::test]
async fn repeated_approval_does_not_double_charge() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 0).await;
    let boss = insert_employee(&pool, "Bo Marsh", "manager", 20, 0).await;

    let request = lifecycle
        .submit(emp, LeaveType::Sick, d(2026, 2, 2), d(2026, 2, 4), None)
        .await
        .unwrap();

    lifecycle
        .set_status(request.id, LeaveStatus::Approved, boss)
        .await
        .unwrap();
    assert_eq!(used_leaves(&pool, emp).await, 3);

    // same decision again: decider restamped, counter untouched
    let again = lifecycle
        .set_status(request.id, LeaveStatus::Approved, boss)
        .await
        .unwrap();
    assert_eq!(again.status, LeaveStatus::Approved);
    assert_eq!(used_leaves(&pool, emp).await, 3);
    assert_eq!(approved_days_sum(&pool, emp).await, 3);
}

#[actix_web::test]
async fn approve_then_reject_refunds_the_days() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 2).await;
    let boss = insert_employee(&pool, "Bo Marsh", "manager", 20, 0).await;

    let request = lifecycle
        .submit(emp, LeaveType::Casual, d(2026, 8, 3), d(2026, 8, 6), None)
        .await
        .unwrap();

    lifecycle
        .set_status(request.id, LeaveStatus::Approved, boss)
        .await
        .unwrap();
    assert_eq!(used_leaves(&pool, emp).await, 6);

    lifecycle
        .set_status(request.id, LeaveStatus::Rejected, boss)
        .await
        .unwrap();
    assert_eq!(used_leaves(&pool, emp).await, 2);
    assert_eq!(approved_days_sum(&pool, emp).await, 0);
}

#[actix_web::test]
async fn reject_then_approve_charges_the_days() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 0).await;
    let boss = insert_employee(&pool, "Bo Marsh", "manager", 20, 0).await;

    let request = lifecycle
        .submit(emp, LeaveType::Other, d(2026, 9, 1), d(2026, 9, 2), None)
        .await
        .unwrap();

    lifecycle
        .set_status(request.id, LeaveStatus::Rejected, boss)
        .await
        .unwrap();
    assert_eq!(used_leaves(&pool, emp).await, 0);

    lifecycle
        .set_status(request.id, LeaveStatus::Approved, boss)
        .await
        .unwrap();
    assert_eq!(used_leaves(&pool, emp).await, 2);
    assert_eq!(approved_days_sum(&pool, emp).await, 2);
}

#[actix_web::test]
async fn nothing_reopens_to_pending() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 0).await;
    let boss = insert_employee(&pool, "Bo Marsh", "manager", 20, 0).await;

    let request = lifecycle
        .submit(emp, LeaveType::Sick, d(2026, 10, 5), d(2026, 10, 6), None)
        .await
        .unwrap();

    lifecycle
        .set_status(request.id, LeaveStatus::Approved, boss)
        .await
        .unwrap();

    let err = lifecycle
        .set_status(request.id, LeaveStatus::Pending, boss)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LeaveError::InvalidTransition {
            from: LeaveStatus::Approved,
            to: LeaveStatus::Pending
        }
    ));
    // the failed call changed nothing
    let current = lifecycle.request(request.id).await.unwrap();
    assert_eq!(current.status, LeaveStatus::Approved);
    assert_eq!(used_leaves(&pool, emp).await, 2);
}

#[actix_web::test]
async fn racing_approvals_cannot_overcommit_the_balance() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 10, 0).await;
    let boss = insert_employee(&pool, "Bo Marsh", "manager", 20, 0).await;

    // both submissions see the full balance and pass the optimistic gate
    let first = lifecycle
        .submit(emp, LeaveType::Annual, d(2026, 6, 1), d(2026, 6, 7), None)
        .await
        .unwrap();
    let second = lifecycle
        .submit(emp, LeaveType::Casual, d(2026, 6, 15), d(2026, 6, 21), None)
        .await
        .unwrap();
    assert_eq!(first.days, 7);
    assert_eq!(second.days, 7);

    lifecycle
        .set_status(first.id, LeaveStatus::Approved, boss)
        .await
        .unwrap();

    // the second approval would push used to 14 of 10
    let err = lifecycle
        .set_status(second.id, LeaveStatus::Approved, boss)
        .await
        .unwrap_err();

    match err {
        LeaveError::InsufficientBalance { available } => assert_eq!(available, 3),
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }

    // failed approval left no partial state behind
    let second_now = lifecycle.request(second.id).await.unwrap();
    assert_eq!(second_now.status, LeaveStatus::Pending);
    assert!(second_now.decided_by.is_none());
    assert_eq!(used_leaves(&pool, emp).await, 7);
    assert_eq!(approved_days_sum(&pool, emp).await, 7);
}

#[actix_web::test]
async fn deciding_a_missing_request_fails() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    insert_employee(&pool, "Ann Field", "employee", 20, 0).await;

    let err = lifecycle
        .set_status(42, LeaveStatus::Approved, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::RequestNotFound(42)));
}

#[actix_web::test]
async fn ledger_guard_refuses_out_of_range_counters() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let ledger = lifecycle.ledger();
    let emp = insert_employee(&pool, "Ann Field", "employee", 20, 5).await;

    let err = ledger.adjust_used(emp, -6).await.unwrap_err();
    assert!(matches!(err, LeaveError::InvariantViolation { .. }));
    assert_eq!(used_leaves(&pool, emp).await, 5);

    let err = ledger.adjust_used(emp, 16).await.unwrap_err();
    assert!(matches!(err, LeaveError::InvariantViolation { .. }));
    assert_eq!(used_leaves(&pool, emp).await, 5);

    ledger.adjust_used(emp, 15).await.unwrap();
    assert_eq!(ledger.available(emp).await.unwrap(), 0);

    let err = ledger.adjust_used(999, 1).await.unwrap_err();
    assert!(matches!(err, LeaveError::EmployeeNotFound(999)));
}

#[actix_web::test]
async fn ledger_counters_stay_in_bounds_across_a_mixed_history() {
    let pool = test_pool().await;
    let lifecycle = RequestLifecycle::new(pool.clone());
    let emp = insert_employee(&pool, "Ann Field", "employee", 12, 0).await;
    let boss = insert_employee(&pool, "Bo Marsh", "manager", 20, 0).await;

    let a = lifecycle
        .submit(emp, LeaveType::Annual, d(2026, 1, 5), d(2026, 1, 9), None)
        .await
        .unwrap();
    let b = lifecycle
        .submit(emp, LeaveType::Sick, d(2026, 2, 2), d(2026, 2, 3), None)
        .await
        .unwrap();

    lifecycle.set_status(a.id, LeaveStatus::Approved, boss).await.unwrap();
    lifecycle.set_status(b.id, LeaveStatus::Approved, boss).await.unwrap();
    lifecycle.set_status(a.id, LeaveStatus::Rejected, boss).await.unwrap();
    lifecycle.set_status(b.id, LeaveStatus::Rejected, boss).await.unwrap();
    lifecycle.set_status(b.id, LeaveStatus::Approved, boss).await.unwrap();

    let balance = lifecycle.ledger().balance(emp).await.unwrap();
    assert_eq!(balance.used, 2);
    assert_eq!(balance.available, 10);
    assert!(balance.used >= 0 && balance.used <= balance.total);
    assert_eq!(approved_days_sum(&pool, emp).await, balance.used);
}
