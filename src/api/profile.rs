use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::employee::Gender;
use crate::store;
use crate::store::employee::ProfileChanges;

#[utoipa::path(
    get,
    path = "/api/employee/profile",
    responses(
        (status = 200, description = "Own profile"),
        (status = 404, description = "Employee profile not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let profile = store::employee::find(pool.get_ref(), employee_id)
        .await?
        .ok_or(AppError::NotFound("Employee profile"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "profile": profile,
    })))
}

/// Only non-sensitive fields; role, salary and employee code stay
/// admin-controlled.
#[derive(Deserialize, ToSchema)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    #[schema(format = "date", value_type = Option<String>)]
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub profile_image: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/employee/profile",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Email already exists"),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateProfile>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let payload = payload.into_inner();

    store::employee::find(pool.get_ref(), employee_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let changes = ProfileChanges {
        name: payload.name,
        email: payload.email,
        dob: payload.dob,
        gender: payload.gender,
        profile_image: payload.profile_image,
    };

    if let Err(e) = store::employee::update_profile(pool.get_ref(), employee_id, &changes).await {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return Err(AppError::Validation("Email already exists.".into()));
            }
        }
        return Err(e.into());
    }

    let profile = store::employee::find(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated successfully.",
        "profile": profile,
    })))
}
