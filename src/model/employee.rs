use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee directory row as exposed by the API. The password hash lives in
/// the same table but never leaves the auth module.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1001,
        "name": "John Doe",
        "email": "john.doe@acme.com",
        "department": "Engineering",
        "role": "employee",
        "total_leaves": 20,
        "used_leaves": 5
    })
)]
pub struct Employee {
    #[schema(example = 1001)]
    pub id: i64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@acme.com")]
    pub email: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "employee")]
    pub role: Role,

    /// Entitlement for the accounting period.
    #[schema(example = 20)]
    pub total_leaves: i64,

    /// Days consumed by currently-approved requests. Written only by the
    /// balance ledger.
    #[schema(example = 5)]
    pub used_leaves: i64,
}
