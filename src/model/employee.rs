use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
pub enum Designation {
    Developer,
    Designer,
    #[serde(rename = "HR")]
    #[strum(serialize = "HR")]
    #[sqlx(rename = "HR")]
    Hr,
    Manager,
    Other,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Directory row for an account, password column excluded. The core reads
/// `salary` and mutates `paid_leaves_available` (leave approval, monthly
/// reset); everything else is profile data.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "John Doe",
        "email": "john.doe@company.com",
        "employee_code": "EMP-001",
        "role": "Employee",
        "designation": "Developer",
        "salary": 22000.0,
        "dob": "1996-04-12",
        "gender": "Male",
        "profile_image": "default_profile.png",
        "paid_leaves_available": 2,
        "last_paid_leave_reset": "2026-08-01T00:00:00"
    })
)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub employee_code: String,
    pub role: Role,
    pub designation: Designation,
    pub salary: f64,
    #[schema(example = "1996-04-12", format = "date", value_type = String)]
    pub dob: NaiveDate,
    pub gender: Gender,
    pub profile_image: String,
    pub paid_leaves_available: i64,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub last_paid_leave_reset: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}
