use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::attendance::AttendanceRecord;
use crate::store;

/// Punch-in: creates today's record, or claims an existing record that has
/// no in-punch yet (e.g. one pre-created by a leave write-through).
#[utoipa::path(
    post,
    path = "/api/employee/attendance/check-in",
    responses(
        (status = 200, description = "Punch in recorded", body = Object, example = json!({
            "success": true,
            "message": "Punch In recorded successfully."
        })),
        (status = 400, description = "Already punched in today"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn punch_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let now = Local::now().naive_local();
    let today = now.date();

    let existing = store::attendance::find_by_day(pool.get_ref(), employee_id, today).await?;
    let mut record = existing.unwrap_or_else(|| AttendanceRecord::blank(employee_id, today));
    record.record_punch_in(now)?;

    if record.id == 0 {
        if let Err(e) = store::attendance::insert(pool.get_ref(), &record).await {
            // Two punch-ins racing on the (employee, day) unique key: the
            // loser reads as a second punch-in, not a server error.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(AppError::StateConflict(
                        "You have already punched in today.".into(),
                    ));
                }
            }
            return Err(e.into());
        }
    } else {
        store::attendance::update(pool.get_ref(), &record).await?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Punch In recorded successfully.",
        "punch_in": record.punch_in,
    })))
}

#[utoipa::path(
    post,
    path = "/api/employee/attendance/lunch-start",
    responses(
        (status = 200, description = "Lunch started"),
        (status = 400, description = "Not punched in, or lunch already started"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn lunch_start(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let now = Local::now().naive_local();

    let mut record = store::attendance::find_by_day(pool.get_ref(), employee_id, now.date())
        .await?
        .ok_or_else(|| {
            AppError::StateConflict("Please punch in before starting lunch.".into())
        })?;

    record.record_lunch_start(now)?;
    store::attendance::update(pool.get_ref(), &record).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Lunch started.",
        "lunch_start": record.lunch_start,
    })))
}

#[utoipa::path(
    post,
    path = "/api/employee/attendance/lunch-end",
    responses(
        (status = 200, description = "Lunch ended, break time accrued"),
        (status = 400, description = "Lunch not started, or already ended"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn lunch_end(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let now = Local::now().naive_local();

    let mut record = store::attendance::find_by_day(pool.get_ref(), employee_id, now.date())
        .await?
        .ok_or_else(|| AppError::StateConflict("Lunch break was not started.".into()))?;

    record.record_lunch_end(now)?;
    store::attendance::update(pool.get_ref(), &record).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Lunch ended. Break time added.",
        "lunch_end": record.lunch_end,
    })))
}

/// Punch-out closes the day: an open lunch is folded into the break total,
/// then work minutes and the Present/Half Day status are fixed.
#[utoipa::path(
    post,
    path = "/api/employee/attendance/check-out",
    responses(
        (status = 200, description = "Punch out recorded", body = Object, example = json!({
            "success": true,
            "message": "Punch Out recorded successfully.",
            "total_work": "7h 45m"
        })),
        (status = 400, description = "Not punched in, or already punched out"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn punch_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let now = Local::now().naive_local();

    let mut record = store::attendance::find_by_day(pool.get_ref(), employee_id, now.date())
        .await?
        .ok_or_else(|| {
            AppError::StateConflict("You must punch in before punching out.".into())
        })?;

    record.record_punch_out(now)?;
    store::attendance::update(pool.get_ref(), &record).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Punch Out recorded successfully.",
        "punch_out": record.punch_out,
        "total_work": work_duration_label(record.total_work_minutes),
    })))
}

fn work_duration_label(minutes: i64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[utoipa::path(
    get,
    path = "/api/employee/attendance/today",
    responses(
        (status = 200, description = "Today's record, or null when none exists"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let today = Local::now().date_naive();

    let record = store::attendance::find_by_day(pool.get_ref(), employee_id, today).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "attendance": record,
    })))
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Number of most recent days to return, default 30.
    pub limit: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/employee/attendance/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Most-recent-first attendance history", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.require_employee()?;
    let limit = query.limit.unwrap_or(30).clamp(1, 100);

    let records = store::attendance::history(pool.get_ref(), employee_id, limit).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "history": records,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_duration_label_splits_hours_and_minutes() {
        assert_eq!(work_duration_label(465), "7h 45m");
        assert_eq!(work_duration_label(59), "0h 59m");
        assert_eq!(work_duration_label(480), "8h 0m");
    }
}
