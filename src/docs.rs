use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveWithEmployee};
use crate::core::LeaveBalance;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::models::LoginReqDto;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave Management Service

This API tracks employee leave entitlement and drives the leave-request
approval workflow.

### Key Features
- **Leave Requests**
  - Submit requests with an automatic balance check
  - Approve/reject with atomic balance accounting; decisions are reversible
- **Balance Ledger**
  - Per-employee total/used/available counters that can never overcommit
- **Employee Directory**
  - Create, update, list, and view employees and their balances

### Security
Endpoints under `/api` are protected with **JWT Bearer authentication**.
Approval, rejection and directory management require the **manager** role.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::employee_balance,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee
    ),
    components(
        schemas(
            LoginReqDto,
            CreateLeave,
            LeaveFilter,
            LeaveRequest,
            LeaveStatus,
            LeaveType,
            LeaveWithEmployee,
            LeaveListResponse,
            LeaveBalance,
            CreateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication APIs"),
        (name = "Leave", description = "Leave request and approval APIs"),
        (name = "Employee", description = "Employee directory and balance APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
