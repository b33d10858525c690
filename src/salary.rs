//! Monthly salary derivation over Time Ledger and Leave Ledger snapshots.
//!
//! The engine owns no state: callers fetch one month of attendance rows plus
//! the approved paid-leave requests overlapping that month and get back a
//! deterministic breakdown. The per-employee and bulk endpoints both go
//! through [`compute_monthly_salary`], so bulk output is never an
//! approximation of the single path.

use std::collections::HashSet;

use chrono::{Months, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};

/// The month model is fixed, not derived from the actual calendar month.
pub const WORKING_DAYS_PER_MONTH: u32 = 22;
pub const WORKING_HOURS_PER_DAY: u32 = 8;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalaryBreakdown {
    pub working_days: u32,
    pub present_days: u32,
    pub paid_leaves: u32,
    pub unpaid_leaves: u32,
    pub half_days: u32,
    /// Rounded to 1 decimal.
    pub total_work_hours: f64,
    /// Rounded to 1 decimal.
    pub expected_work_hours: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalarySlip {
    pub base_salary: f64,
    /// Rounded to 2 decimals, floored at 0.
    pub calculated_salary: f64,
    /// base - calculated, rounded to 2 decimals.
    pub deductions: f64,
    pub breakdown: SalaryBreakdown,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// First and last calendar day of the given month.
pub fn month_range(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation("Invalid month or year.".into()))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::Validation("Invalid month or year.".into()))?;
    Ok((start, end))
}

/// Expands every Approved paid request into its covered calendar dates.
/// A Leave-status attendance day that is NOT in this set is an unpaid leave.
pub fn paid_leave_dates(requests: &[LeaveRequest]) -> HashSet<NaiveDate> {
    requests
        .iter()
        .filter(|r| r.status == LeaveStatus::Approved && r.is_paid_leave)
        .flat_map(|r| r.covered_days())
        .collect()
}

/// Deterministic salary for one employee-month.
///
/// Deductions against the base, in order: unpaid leave days at the daily
/// rate, half days at half the daily rate, then the work-hour shortfall
/// (expected minus actual, only when positive) at the hourly rate. Surplus
/// hours are never credited; the result never goes below zero.
pub fn compute_monthly_salary(
    base_salary: f64,
    records: &[AttendanceRecord],
    paid_leave_dates: &HashSet<NaiveDate>,
) -> SalarySlip {
    let daily_rate = base_salary / WORKING_DAYS_PER_MONTH as f64;
    let hourly_rate = daily_rate / WORKING_HOURS_PER_DAY as f64;

    let count = |status: AttendanceStatus| {
        records.iter().filter(|r| r.status == status).count() as u32
    };
    let present_days = count(AttendanceStatus::Present);
    let half_days = count(AttendanceStatus::HalfDay);
    let leave_days = count(AttendanceStatus::Leave);
    let unpaid_leaves = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Leave && !paid_leave_dates.contains(&r.date))
        .count() as u32;
    let paid_leaves = leave_days - unpaid_leaves;

    let mut calculated = base_salary;
    calculated -= unpaid_leaves as f64 * daily_rate;
    calculated -= half_days as f64 * (daily_rate / 2.0);

    let total_work_hours: f64 = records
        .iter()
        .map(|r| r.total_work_minutes as f64 / 60.0)
        .sum();
    let expected_work_hours = present_days as f64 * WORKING_HOURS_PER_DAY as f64
        + half_days as f64 * (WORKING_HOURS_PER_DAY as f64 / 2.0);

    let shortfall = expected_work_hours - total_work_hours;
    if shortfall > 0.0 {
        calculated -= shortfall * hourly_rate;
    }

    let calculated = calculated.max(0.0);

    SalarySlip {
        base_salary,
        calculated_salary: round2(calculated),
        deductions: round2(base_salary - calculated),
        breakdown: SalaryBreakdown {
            working_days: WORKING_DAYS_PER_MONTH,
            present_days,
            paid_leaves,
            unpaid_leaves,
            half_days,
            total_work_hours: round1(total_work_hours),
            expected_work_hours: round1(expected_work_hours),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveType;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    fn closed_day(day: u32, status: AttendanceStatus, work_minutes: i64) -> AttendanceRecord {
        let mut rec = AttendanceRecord::blank(1, d(day));
        rec.status = status;
        rec.total_work_minutes = work_minutes;
        rec
    }

    fn present_days(count: u32, minutes_each: i64) -> Vec<AttendanceRecord> {
        (1..=count)
            .map(|day| closed_day(day, AttendanceStatus::Present, minutes_each))
            .collect()
    }

    fn approved_paid_request(start: NaiveDate, end: NaiveDate) -> LeaveRequest {
        LeaveRequest {
            id: 1,
            employee_id: 1,
            start_date: start,
            end_date: end,
            leave_type: LeaveType::Casual,
            is_paid_leave: true,
            reason: "family".into(),
            status: LeaveStatus::Approved,
            admin_response: None,
            responded_by: Some(2),
            responded_at: None,
            created_at: None,
        }
    }

    #[test]
    fn full_attendance_pays_the_full_base() {
        let records = present_days(22, 8 * 60);
        let slip = compute_monthly_salary(22_000.0, &records, &HashSet::new());
        assert_eq!(slip.calculated_salary, 22_000.0);
        assert_eq!(slip.deductions, 0.0);
        assert_eq!(slip.breakdown.present_days, 22);
        assert_eq!(slip.breakdown.expected_work_hours, 176.0);
        assert_eq!(slip.breakdown.total_work_hours, 176.0);
    }

    #[test]
    fn one_unpaid_leave_costs_one_daily_rate() {
        let mut records = present_days(20, 8 * 60);
        records.push(closed_day(25, AttendanceStatus::Leave, 0));

        let slip = compute_monthly_salary(22_000.0, &records, &HashSet::new());
        // dailyRate = 22000 / 22 = 1000; no work-hour shortfall on top.
        assert_eq!(slip.calculated_salary, 21_000.0);
        assert_eq!(slip.deductions, 1_000.0);
        assert_eq!(slip.breakdown.unpaid_leaves, 1);
        assert_eq!(slip.breakdown.paid_leaves, 0);
    }

    #[test]
    fn paid_leave_days_do_not_deduct() {
        let mut records = present_days(20, 8 * 60);
        records.push(closed_day(25, AttendanceStatus::Leave, 0));
        records.push(closed_day(26, AttendanceStatus::Leave, 0));

        let paid = paid_leave_dates(&[approved_paid_request(d(25), d(26))]);
        let slip = compute_monthly_salary(22_000.0, &records, &paid);
        assert_eq!(slip.calculated_salary, 22_000.0);
        assert_eq!(slip.breakdown.paid_leaves, 2);
        assert_eq!(slip.breakdown.unpaid_leaves, 0);
    }

    #[test]
    fn half_day_costs_half_a_daily_rate() {
        let mut records = present_days(21, 8 * 60);
        records.push(closed_day(25, AttendanceStatus::HalfDay, 4 * 60));

        let slip = compute_monthly_salary(22_000.0, &records, &HashSet::new());
        // Half-day deduction only: the 4 worked hours match the half-day
        // expectation, so no shortfall is added.
        assert_eq!(slip.calculated_salary, 21_500.0);
        assert_eq!(slip.breakdown.half_days, 1);
    }

    #[test]
    fn work_hour_shortfall_deducts_at_the_hourly_rate() {
        let mut records = present_days(21, 8 * 60);
        records.push(closed_day(25, AttendanceStatus::Present, 6 * 60));

        let slip = compute_monthly_salary(22_000.0, &records, &HashSet::new());
        // 2 hours short of 176 expected at 125/h.
        assert_eq!(slip.calculated_salary, 21_750.0);
        assert_eq!(slip.deductions, 250.0);
    }

    #[test]
    fn surplus_hours_are_never_credited() {
        let records = present_days(22, 10 * 60);
        let slip = compute_monthly_salary(22_000.0, &records, &HashSet::new());
        assert_eq!(slip.calculated_salary, 22_000.0);
        assert_eq!(slip.breakdown.total_work_hours, 220.0);
    }

    #[test]
    fn salary_is_floored_at_zero() {
        let records: Vec<_> = (1..=22)
            .map(|day| closed_day(day, AttendanceStatus::Leave, 0))
            .collect();
        let slip = compute_monthly_salary(500.0, &records, &HashSet::new());
        assert_eq!(slip.calculated_salary, 0.0);
        assert_eq!(slip.deductions, 500.0);
    }

    #[test]
    fn figures_are_rounded_at_the_boundary() {
        let mut records = present_days(1, 8 * 60);
        records.push(closed_day(25, AttendanceStatus::Leave, 0));

        let slip = compute_monthly_salary(1_000.0, &records, &HashSet::new());
        // dailyRate = 1000/22 = 45.4545...; calculated = 954.5454...
        assert_eq!(slip.calculated_salary, 954.55);
        assert_eq!(slip.deductions, 45.45);
    }

    #[test]
    fn expansion_covers_every_day_of_each_approved_paid_request() {
        let paid = paid_leave_dates(&[
            approved_paid_request(d(3), d(5)),
            approved_paid_request(d(20), d(20)),
        ]);
        assert_eq!(paid.len(), 4);
        assert!(paid.contains(&d(3)));
        assert!(paid.contains(&d(4)));
        assert!(paid.contains(&d(5)));
        assert!(paid.contains(&d(20)));
    }

    #[test]
    fn pending_or_unpaid_requests_are_not_expanded() {
        let mut pending = approved_paid_request(d(3), d(4));
        pending.status = LeaveStatus::Pending;
        let mut unpaid = approved_paid_request(d(10), d(11));
        unpaid.is_paid_leave = false;

        assert!(paid_leave_dates(&[pending, unpaid]).is_empty());
    }

    #[test]
    fn month_range_handles_month_lengths() {
        assert_eq!(
            month_range(2026, 2).unwrap(),
            (
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
            )
        );
        assert_eq!(
            month_range(2026, 12).unwrap(),
            (
                NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
            )
        );
        assert!(month_range(2026, 13).is_err());
    }
}
