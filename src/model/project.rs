use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
pub enum ProjectStatus {
    Running,
    Completed,
    #[serde(rename = "On Hold")]
    #[strum(serialize = "On Hold")]
    #[sqlx(rename = "On Hold")]
    OnHold,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    #[schema(format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub due_date: Option<NaiveDate>,
}
