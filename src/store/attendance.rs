use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Designation;
use crate::model::leave_request::LeaveType;

pub async fn find_by_day(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, punch_in, lunch_start, lunch_end, punch_out,
               total_break_minutes, total_work_minutes, status, leave_type
        FROM attendance
        WHERE employee_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &MySqlPool, rec: &AttendanceRecord) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance
            (employee_id, date, punch_in, lunch_start, lunch_end, punch_out,
             total_break_minutes, total_work_minutes, status, leave_type)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rec.employee_id)
    .bind(rec.date)
    .bind(rec.punch_in)
    .bind(rec.lunch_start)
    .bind(rec.lunch_end)
    .bind(rec.punch_out)
    .bind(rec.total_break_minutes)
    .bind(rec.total_work_minutes)
    .bind(rec.status)
    .bind(rec.leave_type)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

/// Writes the whole mutated row back after a punch transition.
pub async fn update(pool: &MySqlPool, rec: &AttendanceRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE attendance
        SET punch_in = ?, lunch_start = ?, lunch_end = ?, punch_out = ?,
            total_break_minutes = ?, total_work_minutes = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(rec.punch_in)
    .bind(rec.lunch_start)
    .bind(rec.lunch_end)
    .bind(rec.punch_out)
    .bind(rec.total_break_minutes)
    .bind(rec.total_work_minutes)
    .bind(rec.status)
    .bind(rec.id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Leave-approval write-through: ensure every given day is marked Leave.
///
/// One multi-row upsert keyed on (employee_id, date), so re-applying the same
/// approval is a no-op and punch fields of pre-existing rows are untouched.
pub async fn mark_leave_days(
    pool: &MySqlPool,
    employee_id: u64,
    days: &[NaiveDate],
    leave_type: LeaveType,
) -> Result<(), sqlx::Error> {
    if days.is_empty() {
        return Ok(());
    }

    let values = vec!["(?, ?, 'Leave', ?)"; days.len()].join(", ");
    let sql = format!(
        "INSERT INTO attendance (employee_id, date, status, leave_type) VALUES {values} \
         ON DUPLICATE KEY UPDATE status = VALUES(status), leave_type = VALUES(leave_type)"
    );

    let mut query = sqlx::query(&sql);
    for day in days {
        query = query.bind(employee_id).bind(day).bind(leave_type);
    }
    query.execute(pool).await?;

    Ok(())
}

/// Most-recent-first attendance history for one employee.
pub async fn history(
    pool: &MySqlPool,
    employee_id: u64,
    limit: u32,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, punch_in, lunch_start, lunch_end, punch_out,
               total_break_minutes, total_work_minutes, status, leave_type
        FROM attendance
        WHERE employee_id = ?
        ORDER BY date DESC
        LIMIT ?
        "#,
    )
    .bind(employee_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// All records for one employee inside an inclusive date range.
pub async fn between(
    pool: &MySqlPool,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, punch_in, lunch_start, lunch_end, punch_out,
               total_break_minutes, total_work_minutes, status, leave_type
        FROM attendance
        WHERE employee_id = ? AND date BETWEEN ? AND ?
        ORDER BY date
        "#,
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

/// Records in a range scoped to the given employee set, most recent first.
pub async fn in_range(
    pool: &MySqlPool,
    employee_ids: &[u64],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    if employee_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; employee_ids.len()].join(", ");
    let sql = format!(
        "SELECT id, employee_id, date, punch_in, lunch_start, lunch_end, punch_out, \
                total_break_minutes, total_work_minutes, status, leave_type \
         FROM attendance \
         WHERE date BETWEEN ? AND ? AND employee_id IN ({placeholders}) \
         ORDER BY date DESC"
    );

    let mut query = sqlx::query_as::<_, AttendanceRecord>(&sql).bind(start).bind(end);
    for id in employee_ids {
        query = query.bind(id);
    }

    query.fetch_all(pool).await
}

/// One line of the admin "who is present / on leave today" dashboards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct DayPunchRow {
    pub employee_id: u64,
    pub name: String,
    pub employee_code: String,
    pub designation: Designation,
    pub email: String,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub punch_in: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub lunch_start: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub lunch_end: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub punch_out: Option<NaiveDateTime>,
}

/// Employees with the given status on the given day, joined against the
/// directory so only Employee-role accounts that still exist come back.
pub async fn day_listing(
    pool: &MySqlPool,
    date: NaiveDate,
    status: AttendanceStatus,
) -> Result<Vec<DayPunchRow>, sqlx::Error> {
    sqlx::query_as::<_, DayPunchRow>(
        r#"
        SELECT a.employee_id, u.name, u.employee_code, u.designation, u.email,
               a.punch_in, a.lunch_start, a.lunch_end, a.punch_out
        FROM attendance a
        JOIN users u ON u.id = a.employee_id
        WHERE a.date = ? AND a.status = ? AND u.role = 'Employee'
        ORDER BY u.name
        "#,
    )
    .bind(date)
    .bind(status)
    .fetch_all(pool)
    .await
}
