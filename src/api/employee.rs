use crate::{
    auth::auth::AuthUser,
    auth::password::hash_password,
    core::RequestLifecycle,
    model::{employee::Employee, role::Role},
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

/// Directory columns a manager may change. `used_leaves` is deliberately
/// absent: only the balance ledger writes it.
const UPDATABLE_COLUMNS: &[&str] = &["name", "email", "department", "role", "total_leaves"];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@acme.com", format = "email")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "employee")]
    pub role: Role,
    /// Entitlement for the accounting period; defaults to 20 days.
    #[schema(example = 20)]
    pub total_leaves: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Filter by department
    pub department: Option<String>,
    /// Search by name or email
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 6)]
    pub total: i64,
}

const EMPLOYEE_COLUMNS: &str = "id, name, email, department, role, total_leaves, used_leaves";

/// Create Employee (manager only)
#[utoipa::path(
    post,
    path = "/api/v1/employee",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({
            "message": "Employee created",
            "id": 1007
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let total_leaves = payload.total_leaves.unwrap_or(20);
    if total_leaves < 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "total_leaves must not be negative"
        })));
    }

    let hashed = hash_password(&payload.password);

    let result = sqlx::query(
        "INSERT INTO employees (name, email, password, department, role, total_leaves, used_leaves) \
         VALUES (?, ?, ?, ?, ?, ?, 0)",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&hashed)
    .bind(&payload.department)
    .bind(payload.role)
    .bind(total_leaves)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(done) => Ok(HttpResponse::Created().json(json!({
            "message": "Employee created",
            "id": done.last_insert_rowid()
        }))),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Ok(HttpResponse::Conflict().json(json!({
                "message": "Email already registered"
            })))
        }
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// Employee details; self or manager.
#[utoipa::path(
    get,
    path = "/api/v1/employee/{id}",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    auth.require_self_or_manager(id)?;

    let employee = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {} FROM employees WHERE id = ?",
        EMPLOYEE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match employee {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Leave counters for one employee; self or manager.
#[utoipa::path(
    get,
    path = "/api/v1/employee/{id}/balance",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Current counters", body = crate::core::LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn employee_balance(
    auth: AuthUser,
    lifecycle: web::Data<RequestLifecycle>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    auth.require_self_or_manager(id)?;

    let balance = lifecycle.ledger().balance(id).await?;
    Ok(HttpResponse::Ok().json(balance))
}

/// Paginated directory listing (manager only).
#[utoipa::path(
    get,
    path = "/api/v1/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut binds: Vec<String> = Vec::new();

    if let Some(department) = &query.department {
        where_sql.push_str(" AND department = ?");
        binds.push(department.clone());
    }

    if let Some(search) = &query.search {
        where_sql.push_str(" AND (name LIKE ? OR email LIKE ?)");
        let pattern = format!("%{}%", search);
        binds.push(pattern.clone());
        binds.push(pattern);
    }

    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_q = count_q.bind(bind);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count employees");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT {} FROM employees{} ORDER BY id LIMIT ? OFFSET ?",
        EMPLOYEE_COLUMNS, where_sql
    );
    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
    for bind in &binds {
        data_q = data_q.bind(bind);
    }

    let employees = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employee list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Partial directory update (manager only). Counter columns are rejected;
/// the ledger owns them.
#[utoipa::path(
    put,
    path = "/api/v1/employee/{id}",
    params(("id" = i64, Path, description = "Employee ID")),
    request_body(content = Object, description = "Subset of: name, email, department, role, total_leaves"),
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Unknown or immutable field in payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let id = path.into_inner();
    let update = build_update_sql("employees", &payload, UPDATABLE_COLUMNS, "id", id)?;

    let affected = match execute_update(pool.get_ref(), update).await {
        Ok(n) => n,
        Err(sqlx::Error::Database(db_err)) if db_err.is_check_violation() => {
            return Ok(HttpResponse::Conflict().json(json!({
                "message": "total_leaves cannot drop below used_leaves"
            })));
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Ok(HttpResponse::Conflict().json(json!({
                "message": "Email already registered"
            })));
        }
        Err(e) => {
            error!(error = %e, id, "Failed to update employee");
            return Err(actix_web::error::ErrorInternalServerError("Internal Server Error").into());
        }
    };

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated"
    })))
}
