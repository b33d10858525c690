use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::warn;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::model::employee::{Designation, Gender};
use crate::model::role::Role;
use crate::notify::{Mailer, spawn_send};
use crate::store;
use crate::store::employee::{EmployeeChanges, NewEmployee};
use crate::utils::directory_cache;

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,
    pub password: String,
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    /// Defaults to Employee.
    pub role: Option<Role>,
    pub designation: Designation,
    #[schema(example = 22000.0)]
    pub salary: f64,
    #[schema(example = "1996-04-12", format = "date", value_type = String)]
    pub dob: NaiveDate,
    pub gender: Gender,
    pub profile_image: Option<String>,
}

/// Add a new employee account (admin). The account starts with one paid
/// leave and gets a welcome email.
#[utoipa::path(
    post,
    path = "/api/admin/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee added", body = Object, example = json!({
            "success": true,
            "message": "Employee added successfully.",
            "user": { "id": 7, "name": "John Doe", "email": "john.doe@company.com" }
        })),
        (status = 400, description = "Missing fields or duplicate email/code"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn add_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<Mailer>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.employee_code.trim().is_empty()
    {
        return Err(AppError::Validation("Please fill all required fields.".into()));
    }
    if payload.salary < 0.0 {
        return Err(AppError::Validation("Salary must not be negative.".into()));
    }

    let new = NewEmployee {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        password_hash: hash_password(&payload.password),
        employee_code: payload.employee_code.trim().to_string(),
        role: payload.role.unwrap_or(Role::Employee),
        designation: payload.designation,
        salary: payload.salary,
        dob: payload.dob,
        gender: payload.gender,
        profile_image: payload.profile_image,
    };

    let id = match store::employee::insert(pool.get_ref(), &new).await {
        Ok(id) => id,
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(AppError::Validation(
                        "User with this email or employee ID already exists.".into(),
                    ));
                }
            }
            return Err(e.into());
        }
    };

    directory_cache::invalidate().await;

    let (subject, html) = mailer.welcome_email(
        &new.name,
        &new.email,
        &new.employee_code,
        &new.designation.to_string(),
    );
    spawn_send(mailer.clone().into_inner(), new.email.clone(), subject, html);

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Employee added successfully.",
        "user": { "id": id, "name": new.name, "email": new.email },
    })))
}

#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses(
        (status = 200, description = "Every Employee-role account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let employees = store::employee::list(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "employees": employees,
    })))
}

#[utoipa::path(
    get,
    path = "/api/admin/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let employee = store::employee::find(pool.get_ref(), path.into_inner())
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "employee": employee,
    })))
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub email: Option<String>,
    pub employee_code: Option<String>,
    pub designation: Option<Designation>,
    pub salary: Option<f64>,
    #[schema(format = "date", value_type = Option<String>)]
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub profile_image: Option<String>,
}

/// Update an employee (admin). Admin accounts other than the caller's own
/// are off limits.
#[utoipa::path(
    put,
    path = "/api/admin/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Target is another admin, or duplicate email/code"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<Mailer>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let employee_id = path.into_inner();
    let payload = payload.into_inner();

    let target = store::employee::find(pool.get_ref(), employee_id)
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    if target.role.is_admin() && auth.user_id != employee_id {
        return Err(AppError::Validation(
            "Cannot modify other admin accounts.".into(),
        ));
    }

    if let Some(salary) = payload.salary {
        if salary < 0.0 {
            return Err(AppError::Validation("Salary must not be negative.".into()));
        }
    }

    let changes = EmployeeChanges {
        name: payload.name,
        email: payload.email,
        employee_code: payload.employee_code,
        designation: payload.designation,
        salary: payload.salary,
        dob: payload.dob,
        gender: payload.gender,
        profile_image: payload.profile_image,
    };

    if let Err(e) = store::employee::update(pool.get_ref(), employee_id, &changes).await {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return Err(AppError::Validation(
                    "Email or Employee ID already exists.".into(),
                ));
            }
        }
        return Err(e.into());
    }

    match store::employee::contact(pool.get_ref(), employee_id).await {
        Ok(Some((name, email))) => {
            let (subject, html) = mailer.profile_update_email(&name);
            spawn_send(mailer.clone().into_inner(), email, subject, html);
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Could not load contact for update notification"),
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Employee updated successfully.",
    })))
}

/// Delete an employee (admin). Attendance rows, leave requests and project
/// memberships go with the account through the FK cascade.
#[utoipa::path(
    delete,
    path = "/api/admin/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee and related data deleted"),
        (status = 400, description = "Target is an admin account"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let employee_id = path.into_inner();

    let target = store::employee::find(pool.get_ref(), employee_id)
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    if target.role.is_admin() {
        return Err(AppError::Validation("Cannot delete admin account.".into()));
    }

    store::employee::delete(pool.get_ref(), employee_id).await?;
    directory_cache::invalidate().await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Employee and all related data deleted successfully.",
    })))
}

/// Monthly paid-leave grant: +1 for every employee, uncapped carryover.
/// Invoked by an admin (or an external scheduler hitting this endpoint).
#[utoipa::path(
    post,
    path = "/api/admin/paid-leaves/reset",
    responses(
        (status = 200, description = "Balances credited", body = Object, example = json!({
            "success": true,
            "message": "Paid leaves reset successfully. 12 employees received 1 paid leave."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn reset_paid_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let credited = store::employee::grant_monthly_paid_leave(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!(
            "Paid leaves reset successfully. {credited} employees received 1 paid leave."
        ),
    })))
}
