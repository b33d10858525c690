//! Read-side roll-ups over the Time Ledger.
//!
//! Handlers fetch the raw rows (already scoped to currently-existing
//! Employee-role accounts via the directory cache) and the functions here do
//! the counting, so the aggregation rules stay unit-testable without storage.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Detail rows returned by the range report are capped at the most recent N.
pub const REPORT_DETAIL_CAP: u32 = 100;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailySummary {
    pub present: u32,
    pub on_leave: u32,
    pub half_day: u32,
    /// Employees with no record today plus explicitly marked absences.
    pub absent: u32,
}

/// Summary for one day. `total_employees` is the size of the current
/// directory; employees without any record are folded into `absent`.
pub fn summarize_day(records: &[AttendanceRecord], total_employees: u32) -> DailySummary {
    let count = |status: AttendanceStatus| {
        records.iter().filter(|r| r.status == status).count() as u32
    };
    let present = count(AttendanceStatus::Present);
    let on_leave = count(AttendanceStatus::Leave);
    let half_day = count(AttendanceStatus::HalfDay);
    let marked_absent = count(AttendanceStatus::Absent);

    let with_records = present + on_leave + half_day + marked_absent;
    let pending = total_employees.saturating_sub(with_records);

    DailySummary {
        present,
        on_leave,
        half_day,
        absent: pending + marked_absent,
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyTrendPoint {
    #[schema(format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeeklyTrendPoint {
    pub year: i32,
    pub week: u32,
    pub status: AttendanceStatus,
    pub count: u32,
}

/// Per-(day, status) counts, date ascending.
pub fn daily_trends(records: &[AttendanceRecord]) -> Vec<DailyTrendPoint> {
    let mut grouped: BTreeMap<(NaiveDate, AttendanceStatus), u32> = BTreeMap::new();
    for rec in records {
        *grouped.entry((rec.date, rec.status)).or_default() += 1;
    }
    grouped
        .into_iter()
        .map(|((date, status), count)| DailyTrendPoint { date, status, count })
        .collect()
}

/// Per-(ISO week, year, status) counts.
pub fn weekly_trends(records: &[AttendanceRecord]) -> Vec<WeeklyTrendPoint> {
    let mut grouped: BTreeMap<(i32, u32, AttendanceStatus), u32> = BTreeMap::new();
    for rec in records {
        let week = rec.date.iso_week();
        *grouped.entry((week.year(), week.week(), rec.status)).or_default() += 1;
    }
    grouped
        .into_iter()
        .map(|((year, week, status), count)| WeeklyTrendPoint { year, week, status, count })
        .collect()
}

/// Overall rate = present / (employees x days) x 100, 2 decimals, 0 when the
/// directory is empty.
pub fn attendance_rate(total_present: u32, employee_count: u32, range_days: u32) -> f64 {
    let possible = employee_count as f64 * range_days as f64;
    if possible <= 0.0 {
        return 0.0;
    }
    ((total_present as f64 / possible) * 100.0 * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusRollup {
    pub status: AttendanceStatus,
    pub count: u32,
    pub total_work_minutes: i64,
}

/// Per-status count and summed work minutes over a range.
pub fn range_rollup(records: &[AttendanceRecord]) -> Vec<StatusRollup> {
    let mut grouped: BTreeMap<AttendanceStatus, (u32, i64)> = BTreeMap::new();
    for rec in records {
        let entry = grouped.entry(rec.status).or_default();
        entry.0 += 1;
        entry.1 += rec.total_work_minutes;
    }
    grouped
        .into_iter()
        .map(|(status, (count, total_work_minutes))| StatusRollup {
            status,
            count,
            total_work_minutes,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeMonthlyStats {
    pub total_days: u32,
    pub present: u32,
    pub absent: u32,
    pub leave: u32,
    pub half_day: u32,
    /// Whole hours, rounded.
    pub total_work_hours: i64,
    /// Rounded to 1 decimal.
    pub average_work_hours: f64,
}

pub fn employee_monthly_stats(records: &[AttendanceRecord]) -> EmployeeMonthlyStats {
    let count = |status: AttendanceStatus| {
        records.iter().filter(|r| r.status == status).count() as u32
    };
    let total_minutes: i64 = records.iter().map(|r| r.total_work_minutes).sum();
    let total_hours = total_minutes as f64 / 60.0;
    let average = if records.is_empty() {
        0.0
    } else {
        (total_hours / records.len() as f64 * 10.0).round() / 10.0
    };

    EmployeeMonthlyStats {
        total_days: records.len() as u32,
        present: count(AttendanceStatus::Present),
        absent: count(AttendanceStatus::Absent),
        leave: count(AttendanceStatus::Leave),
        half_day: count(AttendanceStatus::HalfDay),
        total_work_hours: total_hours.round() as i64,
        average_work_hours: average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(day: u32, status: AttendanceStatus, work_minutes: i64) -> AttendanceRecord {
        let mut rec =
            AttendanceRecord::blank(1, NaiveDate::from_ymd_opt(2026, 8, day).unwrap());
        rec.status = status;
        rec.total_work_minutes = work_minutes;
        rec
    }

    #[test]
    fn absent_combines_missing_records_and_marked_absences() {
        let records = vec![
            rec(3, AttendanceStatus::Present, 480),
            rec(3, AttendanceStatus::Present, 470),
            rec(3, AttendanceStatus::Leave, 0),
            rec(3, AttendanceStatus::HalfDay, 180),
            rec(3, AttendanceStatus::Absent, 0),
        ];
        // 9 employees, 5 records: 4 without a record + 1 marked absent.
        let summary = summarize_day(&records, 9);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.on_leave, 1);
        assert_eq!(summary.half_day, 1);
        assert_eq!(summary.absent, 5);
    }

    #[test]
    fn more_records_than_employees_does_not_underflow() {
        let records = vec![
            rec(3, AttendanceStatus::Present, 480),
            rec(3, AttendanceStatus::Present, 480),
        ];
        let summary = summarize_day(&records, 1);
        assert_eq!(summary.absent, 0);
    }

    #[test]
    fn daily_trends_group_by_day_and_status() {
        let records = vec![
            rec(3, AttendanceStatus::Present, 480),
            rec(3, AttendanceStatus::Present, 450),
            rec(4, AttendanceStatus::Present, 480),
            rec(4, AttendanceStatus::Leave, 0),
        ];
        let trends = daily_trends(&records);
        assert_eq!(trends.len(), 3);
        assert_eq!(trends[0].date, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        assert_eq!(trends[0].count, 2);
    }

    #[test]
    fn weekly_trends_use_iso_weeks() {
        // 2026-08-03 is a Monday, so the 2nd and 3rd land in different weeks.
        let records = vec![
            rec(2, AttendanceStatus::Present, 480),
            rec(3, AttendanceStatus::Present, 480),
            rec(4, AttendanceStatus::Present, 480),
        ];
        let trends = weekly_trends(&records);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].count, 1);
        assert_eq!(trends[1].count, 2);
    }

    #[test]
    fn attendance_rate_is_zero_for_an_empty_directory() {
        assert_eq!(attendance_rate(10, 0, 30), 0.0);
    }

    #[test]
    fn attendance_rate_rounds_to_two_decimals() {
        // 20 of (3 x 30) = 22.2222...%
        assert_eq!(attendance_rate(20, 3, 30), 22.22);
    }

    #[test]
    fn range_rollup_sums_work_minutes_per_status() {
        let records = vec![
            rec(3, AttendanceStatus::Present, 480),
            rec(4, AttendanceStatus::Present, 400),
            rec(5, AttendanceStatus::HalfDay, 200),
        ];
        let rollup = range_rollup(&records);
        let present = rollup
            .iter()
            .find(|r| r.status == AttendanceStatus::Present)
            .unwrap();
        assert_eq!(present.count, 2);
        assert_eq!(present.total_work_minutes, 880);
    }

    #[test]
    fn monthly_stats_average_is_rounded_to_one_decimal() {
        let records = vec![
            rec(3, AttendanceStatus::Present, 480),
            rec(4, AttendanceStatus::Present, 450),
            rec(5, AttendanceStatus::Leave, 0),
        ];
        let stats = employee_monthly_stats(&records);
        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.present, 2);
        assert_eq!(stats.leave, 1);
        // 15.5 hours over 3 days.
        assert_eq!(stats.total_work_hours, 16);
        assert_eq!(stats.average_work_hours, 5.2);
    }

    #[test]
    fn monthly_stats_on_no_records_are_all_zero() {
        let stats = employee_monthly_stats(&[]);
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.average_work_hours, 0.0);
    }
}
