use crate::auth::auth::AuthUser;
use crate::core::RequestLifecycle;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use sqlx::prelude::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "sick")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Medical appointment", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 1001)]
    /// Filter by employee ID
    pub employee_id: Option<i64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u32>,
}

/// Request row joined with the employee directory for the report view.
#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveWithEmployee {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1001)]
    pub employee_id: i64,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "sick")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 3)]
    pub days: i64,
    #[schema(example = "Medical appointment", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub applied_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveWithEmployee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    I64(i64),
    Str(&'a str),
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "End date before start date"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown employee"),
        (status = 409, description = "Insufficient leave balance")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    lifecycle: web::Data<RequestLifecycle>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();

    let request = lifecycle
        .submit(
            auth.employee_id,
            payload.leave_type,
            payload.start_date,
            payload.end_date,
            payload.reason,
        )
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Approve leave (manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 400, description = "Unsupported status transition"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Approval would exceed the employee's balance")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    lifecycle: web::Data<RequestLifecycle>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let leave_id = path.into_inner();
    let request = lifecycle
        .set_status(leave_id, LeaveStatus::Approved, auth.employee_id)
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Reject leave (manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected; an earlier approval is refunded", body = LeaveRequest),
        (status = 400, description = "Unsupported status transition"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    lifecycle: web::Data<RequestLifecycle>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let leave_id = path.into_inner();
    let request = lifecycle
        .set_status(leave_id, LeaveStatus::Rejected, auth.employee_id)
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/// Single request details; owners and managers only.
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    lifecycle: web::Data<RequestLifecycle>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let request = lifecycle.request(leave_id).await?;
    auth.require_self_or_manager(request.employee_id)?;

    Ok(HttpResponse::Ok().json(request))
}

/// The caller's own request history, newest application first.
#[utoipa::path(
    get,
    path = "/api/v1/leave/mine",
    responses(
        (status = 200, description = "Caller's leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let leaves = sqlx::query_as::<_, LeaveRequest>(
        "SELECT id, employee_id, leave_type, start_date, end_date, days, reason, \
                status, applied_at, decided_by, decided_at \
         FROM leave_requests \
         WHERE employee_id = ? \
         ORDER BY applied_at DESC",
    )
    .bind(auth.employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id = auth.employee_id, "Failed to fetch leave history");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(leaves))
}

/// Company-wide report joined with the directory (manager only).
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND lr.employee_id = ?");
        args.push(FilterValue::I64(emp_id));
    }

    let status_str;
    if let Some(status) = query.status {
        status_str = status.to_string();
        where_sql.push_str(" AND lr.status = ?");
        args.push(FilterValue::Str(&status_str));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!(
        "SELECT COUNT(*) FROM leave_requests lr{}",
        where_sql
    );

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::I64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        "SELECT lr.id, lr.employee_id, e.name, e.department, lr.leave_type, \
                lr.start_date, lr.end_date, lr.days, lr.reason, lr.status, lr.applied_at \
         FROM leave_requests lr \
         JOIN employees e ON lr.employee_id = e.id \
         {} \
         ORDER BY lr.applied_at DESC \
         LIMIT ? OFFSET ?",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveWithEmployee>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::I64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let response = LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
