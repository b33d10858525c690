use actix_web::{HttpResponse, web};
use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::IntoParams;

use crate::api::salary::MonthQuery;
use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::attendance::{AttendanceStatus, AttendanceRecord};
use crate::reports::{
    REPORT_DETAIL_CAP, attendance_rate, daily_trends, employee_monthly_stats, range_rollup,
    summarize_day, weekly_trends,
};
use crate::salary::month_range;
use crate::store;
use crate::utils::directory_cache;

const TREND_RANGE_DAYS: u32 = 30;

/// Today's present/leave/half-day/absent counts across the directory.
#[utoipa::path(
    get,
    path = "/api/admin/attendance/summary",
    responses(
        (status = 200, description = "Daily summary", body = Object, example = json!({
            "success": true,
            "total_employees": 12,
            "summary": { "present": 8, "on_leave": 2, "half_day": 1, "absent": 1 }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn daily_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let today = Local::now().date_naive();

    let employee_ids = directory_cache::active_employee_ids(pool.get_ref()).await?;
    let records =
        store::attendance::in_range(pool.get_ref(), &employee_ids, today, today).await?;
    let summary = summarize_day(&records, employee_ids.len() as u32);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "total_employees": employee_ids.len(),
        "summary": summary,
    })))
}

#[utoipa::path(
    get,
    path = "/api/admin/attendance/present",
    responses(
        (status = 200, description = "Employees present today with their punches"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn present_today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let today = Local::now().date_naive();

    let rows =
        store::attendance::day_listing(pool.get_ref(), today, AttendanceStatus::Present).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "present_employees": rows,
    })))
}

#[utoipa::path(
    get,
    path = "/api/admin/attendance/leave",
    responses(
        (status = 200, description = "Employees on leave today"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn on_leave_today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let today = Local::now().date_naive();

    let rows =
        store::attendance::day_listing(pool.get_ref(), today, AttendanceStatus::Leave).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "employees_on_leave": rows,
    })))
}

/// 30-day attendance trends: per-day and per-week status counts plus the
/// overall attendance rate.
#[utoipa::path(
    get,
    path = "/api/admin/attendance/analytics",
    responses(
        (status = 200, description = "Daily/weekly trends and attendance rate"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn analytics(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let today = Local::now().date_naive();
    let range_start = today - Duration::days(TREND_RANGE_DAYS as i64);

    let employee_ids = directory_cache::active_employee_ids(pool.get_ref()).await?;
    let records =
        store::attendance::in_range(pool.get_ref(), &employee_ids, range_start, today)
            .await?;

    let total_present = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count() as u32;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "daily_trends": daily_trends(&records),
        "weekly_summary": weekly_trends(&records),
        "attendance_rate": attendance_rate(total_present, employee_ids.len() as u32, TREND_RANGE_DAYS),
        "total_employees": employee_ids.len(),
    })))
}

#[derive(Deserialize, IntoParams)]
pub struct ReportQuery {
    #[param(value_type = Option<String>, example = "2026-08-01")]
    pub start_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, example = "2026-08-31")]
    pub end_date: Option<NaiveDate>,
    /// Restrict the report to one employee.
    pub employee_id: Option<u64>,
}

/// Range report: per-status roll-up plus a capped detail list.
#[utoipa::path(
    get,
    path = "/api/admin/attendance/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Roll-up and most recent detail rows"),
        (status = 400, description = "Missing start or end date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn range_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(AppError::Validation(
            "Start date and end date are required.".into(),
        ));
    };

    let employee_ids = directory_cache::active_employee_ids(pool.get_ref()).await?;
    let scope: Vec<u64> = match query.employee_id {
        // An id outside the directory yields an empty report instead of
        // resurrecting a deleted employee's rows.
        Some(id) => employee_ids.iter().copied().filter(|e| *e == id).collect(),
        None => employee_ids.to_vec(),
    };

    let records = store::attendance::in_range(pool.get_ref(), &scope, start, end).await?;
    let detail: Vec<&AttendanceRecord> =
        records.iter().take(REPORT_DETAIL_CAP as usize).collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "summary": range_rollup(&records),
        "detailed_report": detail,
    })))
}

/// Per-employee attendance statistics for one month (admin).
#[utoipa::path(
    get,
    path = "/api/admin/employees/{employee_id}/stats",
    params(
        ("employee_id" = u64, Path, description = "Employee to report on"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Monthly attendance statistics"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn employee_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let (year, month) = query.resolve();
    let (start, end) = month_range(year, month)?;

    let records =
        store::attendance::between(pool.get_ref(), path.into_inner(), start, end).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "stats": employee_monthly_stats(&records),
    })))
}
