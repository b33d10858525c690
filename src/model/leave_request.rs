use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
pub enum LeaveType {
    Sick,
    Casual,
    Vacation,
    Personal,
    Other,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// A leave request transitions exactly once, Pending -> Approved|Rejected.
/// `is_paid_leave` is fixed at creation; approval is the only transition with
/// side effects (balance deduction + Time Ledger write-through).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-09-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub is_paid_leave: bool,
    pub reason: String,
    pub status: LeaveStatus,
    pub admin_response: Option<String>,
    pub responded_by: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub responded_at: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    pub fn day_count(&self) -> i64 {
        inclusive_day_count(self.start_date, self.end_date)
    }

    pub fn covered_days(&self) -> Vec<NaiveDate> {
        covered_days(self.start_date, self.end_date)
    }
}

/// Days of notice required before the leave starts.
pub fn notice_days_required(leave_type: LeaveType) -> i64 {
    match leave_type {
        LeaveType::Vacation | LeaveType::Personal => 10,
        _ => 1,
    }
}

/// Number of calendar days in the inclusive range.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Every calendar day in [start, end] inclusive.
pub fn covered_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if start > end {
        return Err(AppError::Validation(
            "Start date must be before or equal to end date.".into(),
        ));
    }
    Ok(())
}

/// Notice-period rule, boundary inclusive: a Vacation request starting
/// exactly 10 days from today is accepted.
pub fn validate_notice(leave_type: LeaveType, start: NaiveDate, today: NaiveDate) -> AppResult<()> {
    let days_until_start = (start - today).num_days();
    let required = notice_days_required(leave_type);
    if days_until_start < required {
        let message = match leave_type {
            LeaveType::Vacation | LeaveType::Personal => {
                "Vacation and Personal leave requests must be submitted at least 10 days in advance."
            }
            _ => "Leave requests must be submitted at least 1 day in advance.",
        };
        return Err(AppError::PolicyViolation(message.into()));
    }
    Ok(())
}

/// Balance rule for a request drawing on paid leave: the whole inclusive
/// range must fit, otherwise the request is refused with the shortfall
/// spelled out and nothing is created.
pub fn validate_paid_leave_balance(available: i64, requested_days: i64) -> AppResult<()> {
    if available < requested_days {
        return Err(AppError::PolicyViolation(format!(
            "You only have {available} paid leave(s) available. Requested days: {requested_days}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn vacation_five_days_out_is_too_short_notice() {
        let today = d(2026, 8, 1);
        let err = validate_notice(LeaveType::Vacation, d(2026, 8, 6), today).unwrap_err();
        assert!(matches!(err, AppError::PolicyViolation(_)));
        assert!(err.to_string().contains("10 days"));
    }

    #[test]
    fn vacation_ten_days_out_is_accepted() {
        let today = d(2026, 8, 1);
        assert!(validate_notice(LeaveType::Vacation, d(2026, 8, 11), today).is_ok());
    }

    #[test]
    fn sick_leave_needs_one_day_notice() {
        let today = d(2026, 8, 1);
        assert!(validate_notice(LeaveType::Sick, d(2026, 8, 1), today).is_err());
        assert!(validate_notice(LeaveType::Sick, d(2026, 8, 2), today).is_ok());
    }

    #[test]
    fn personal_follows_the_vacation_rule() {
        let today = d(2026, 8, 1);
        assert!(validate_notice(LeaveType::Personal, d(2026, 8, 10), today).is_err());
        assert!(validate_notice(LeaveType::Personal, d(2026, 8, 11), today).is_ok());
    }

    #[test]
    fn inverted_range_is_invalid() {
        assert!(validate_range(d(2026, 8, 5), d(2026, 8, 4)).is_err());
        assert!(validate_range(d(2026, 8, 5), d(2026, 8, 5)).is_ok());
    }

    #[test]
    fn day_count_is_inclusive() {
        assert_eq!(inclusive_day_count(d(2026, 8, 5), d(2026, 8, 5)), 1);
        assert_eq!(inclusive_day_count(d(2026, 8, 5), d(2026, 8, 7)), 3);
    }

    #[test]
    fn paid_leave_shortfall_is_refused_with_the_numbers() {
        let err = validate_paid_leave_balance(2, 3).unwrap_err();
        assert!(matches!(err, AppError::PolicyViolation(_)));
        assert_eq!(
            err.to_string(),
            "You only have 2 paid leave(s) available. Requested days: 3"
        );
        assert!(validate_paid_leave_balance(3, 3).is_ok());
        assert!(validate_paid_leave_balance(0, 0).is_ok());
    }

    #[test]
    fn covered_days_expand_the_inclusive_range() {
        let days = covered_days(d(2026, 8, 30), d(2026, 9, 2));
        assert_eq!(
            days,
            vec![d(2026, 8, 30), d(2026, 8, 31), d(2026, 9, 1), d(2026, 9, 2)]
        );
    }
}
