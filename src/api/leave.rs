use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::warn;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::leave_request::{
    LeaveStatus, LeaveType, inclusive_day_count, validate_notice, validate_paid_leave_balance,
    validate_range,
};
use crate::notify::{Mailer, spawn_send};
use crate::store;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveRequest {
    #[schema(example = "2026-09-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    #[schema(example = "Family function out of town")]
    pub reason: String,
    /// Draw the days from the paid-leave balance. Fails when the balance
    /// cannot cover the whole range.
    #[serde(default)]
    pub use_paid_leave: bool,
}

/// Submit a leave request (employee).
#[utoipa::path(
    post,
    path = "/api/employee/leave/request",
    request_body = CreateLeaveRequest,
    responses(
        (status = 201, description = "Pending request created", body = Object, example = json!({
            "success": true,
            "message": "Leave request submitted successfully."
        })),
        (status = 400, description = "Bad range, insufficient notice or insufficient paid leave"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn request_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<Mailer>,
    payload: web::Json<CreateLeaveRequest>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let payload = payload.into_inner();

    if payload.reason.trim().is_empty() {
        return Err(AppError::Validation("Please fill all required fields.".into()));
    }
    validate_range(payload.start_date, payload.end_date)?;

    let today = Local::now().date_naive();
    validate_notice(payload.leave_type, payload.start_date, today)?;

    let employee = store::employee::find(pool.get_ref(), employee_id)
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    let requested_days = inclusive_day_count(payload.start_date, payload.end_date);
    let is_paid_leave = if payload.use_paid_leave {
        // Refused requests are never created.
        validate_paid_leave_balance(employee.paid_leaves_available, requested_days)?;
        true
    } else {
        false
    };

    store::leave::insert(
        pool.get_ref(),
        employee_id,
        payload.start_date,
        payload.end_date,
        payload.leave_type,
        is_paid_leave,
        payload.reason.trim(),
    )
    .await?;

    // Fire-and-forget: the request exists whether or not any admin hears
    // about it by mail.
    match store::employee::admin_emails(pool.get_ref()).await {
        Ok(admin_emails) => {
            let (subject, html) = mailer.leave_request_email(
                &employee.name,
                &employee.employee_code,
                payload.leave_type,
                payload.start_date,
                payload.end_date,
                payload.reason.trim(),
            );
            for email in admin_emails {
                spawn_send(
                    mailer.clone().into_inner(),
                    email,
                    subject.clone(),
                    html.clone(),
                );
            }
        }
        Err(e) => warn!(error = %e, "Could not load admin recipients for leave notification"),
    }

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Leave request submitted successfully."
    })))
}

/// Employee's own requests, newest first.
#[utoipa::path(
    get,
    path = "/api/employee/leave/requests",
    responses(
        (status = 200, description = "Own leave requests"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let requests = store::leave::list_for_employee(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "leave_requests": requests,
    })))
}

#[utoipa::path(
    get,
    path = "/api/employee/paid-leaves",
    responses(
        (status = 200, description = "Paid-leave balance", body = Object, example = json!({
            "success": true,
            "paid_leaves_available": 2,
            "last_reset": "2026-08-01T00:00:00"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_paid_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let employee = store::employee::find(pool.get_ref(), employee_id)
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "paid_leaves_available": employee.paid_leaves_available,
        "last_reset": employee.last_paid_leave_reset,
    })))
}

/// Admin queue of pending requests.
#[utoipa::path(
    get,
    path = "/api/admin/leave/requests",
    responses(
        (status = 200, description = "Pending requests with requesting employees"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn pending_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let requests = store::leave::list_pending(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "leave_requests": requests,
    })))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveAction {
    Approve,
    Reject,
}

#[derive(Deserialize, ToSchema)]
pub struct RespondToLeave {
    pub action: LeaveAction,
    pub admin_response: Option<String>,
}

/// Approve or reject a pending request (admin).
///
/// Approval deducts the paid-leave balance (when the request draws on it)
/// and marks every covered day as Leave in the attendance ledger through one
/// idempotent batch upsert.
#[utoipa::path(
    put,
    path = "/api/admin/leave/requests/{request_id}",
    params(("request_id" = u64, Path, description = "Leave request to respond to")),
    request_body = RespondToLeave,
    responses(
        (status = 200, description = "Request approved or rejected"),
        (status = 400, description = "Already processed"),
        (status = 404, description = "Leave request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn respond_to_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<Mailer>,
    path: web::Path<u64>,
    payload: web::Json<RespondToLeave>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let request_id = path.into_inner();
    let payload = payload.into_inner();

    let request = store::leave::find(pool.get_ref(), request_id)
        .await?
        .ok_or(AppError::NotFound("Leave request"))?;

    if request.status != LeaveStatus::Pending {
        return Err(AppError::StateConflict(
            "Leave request has already been processed.".into(),
        ));
    }

    let new_status = match payload.action {
        LeaveAction::Approve => LeaveStatus::Approved,
        LeaveAction::Reject => LeaveStatus::Rejected,
    };

    let affected = store::leave::set_response(
        pool.get_ref(),
        request_id,
        new_status,
        auth.user_id,
        payload.admin_response.as_deref(),
    )
    .await?;
    if affected == 0 {
        // Lost the race against another admin.
        return Err(AppError::StateConflict(
            "Leave request has already been processed.".into(),
        ));
    }

    if new_status == LeaveStatus::Approved {
        if request.is_paid_leave {
            store::employee::deduct_paid_leaves(
                pool.get_ref(),
                request.employee_id,
                request.day_count(),
            )
            .await?;
        }

        store::attendance::mark_leave_days(
            pool.get_ref(),
            request.employee_id,
            &request.covered_days(),
            request.leave_type,
        )
        .await?;
    }

    match store::employee::contact(pool.get_ref(), request.employee_id).await {
        Ok(Some((name, email))) => {
            let (subject, html) = mailer.leave_response_email(
                &name,
                new_status,
                request.leave_type,
                request.start_date,
                request.end_date,
                payload.admin_response.as_deref().unwrap_or(""),
            );
            spawn_send(mailer.clone().into_inner(), email, subject, html);
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Could not load employee contact for leave notification"),
    }

    let verdict = match new_status {
        LeaveStatus::Approved => "approved",
        _ => "rejected",
    };
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Leave request {verdict} successfully."),
    })))
}
