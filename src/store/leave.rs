use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::model::employee::Designation;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};

const REQUEST_COLUMNS: &str = "id, employee_id, start_date, end_date, leave_type, is_paid_leave, \
                               reason, status, admin_response, responded_by, responded_at, created_at";

pub async fn insert(
    pool: &MySqlPool,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
    leave_type: LeaveType,
    is_paid_leave: bool,
    reason: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, start_date, end_date, leave_type, is_paid_leave, reason, status)
        VALUES (?, ?, ?, ?, ?, ?, 'Pending')
        "#,
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .bind(leave_type)
    .bind(is_paid_leave)
    .bind(reason)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

pub async fn find(pool: &MySqlPool, id: u64) -> Result<Option<LeaveRequest>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Employee's own requests, newest first.
pub async fn list_for_employee(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Vec<LeaveRequest>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE employee_id = ? ORDER BY created_at DESC"
    ))
    .bind(employee_id)
    .fetch_all(pool)
    .await
}

/// Pending request plus the requesting employee, for the admin queue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct PendingLeaveRow {
    pub id: u64,
    pub employee_id: u64,
    pub employee_name: String,
    pub employee_code: String,
    pub designation: Designation,
    pub email: String,
    #[schema(format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub is_paid_leave: bool,
    pub reason: String,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

pub async fn list_pending(pool: &MySqlPool) -> Result<Vec<PendingLeaveRow>, sqlx::Error> {
    sqlx::query_as::<_, PendingLeaveRow>(
        r#"
        SELECT l.id, l.employee_id, u.name AS employee_name, u.employee_code,
               u.designation, u.email, l.start_date, l.end_date, l.leave_type,
               l.is_paid_leave, l.reason, l.created_at
        FROM leave_requests l
        JOIN users u ON u.id = l.employee_id
        WHERE l.status = 'Pending'
        ORDER BY l.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Records the one-way Pending transition. The status guard is repeated in
/// the WHERE clause so a racing second response loses; 0 rows affected means
/// the request was already processed.
pub async fn set_response(
    pool: &MySqlPool,
    id: u64,
    status: LeaveStatus,
    admin_id: u64,
    note: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?, admin_response = ?, responded_by = ?, responded_at = NOW()
        WHERE id = ? AND status = 'Pending'
        "#,
    )
    .bind(status)
    .bind(note.unwrap_or(""))
    .bind(admin_id)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Approved paid requests overlapping [start, end], for the salary engine's
/// paid-leave date set.
pub async fn approved_paid_overlapping(
    pool: &MySqlPool,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<LeaveRequest>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM leave_requests \
         WHERE employee_id = ? AND status = 'Approved' AND is_paid_leave = TRUE \
           AND start_date <= ? AND end_date >= ?"
    ))
    .bind(employee_id)
    .bind(end)
    .bind(start)
    .fetch_all(pool)
    .await
}
