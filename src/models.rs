use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "john.doe@acme.com", format = "email")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Employee row as read by the auth handlers; the only place the password
/// hash is loaded.
#[derive(FromRow)]
pub struct EmployeeAuthSql {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub employee_id: i64,
    /// Email address of the authenticated employee.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
