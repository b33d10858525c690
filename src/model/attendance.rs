use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::leave_request::LeaveType;

/// Net work time below this (and above zero) closes the day as Half Day.
pub const HALF_DAY_THRESHOLD_MINUTES: i64 = 240;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Display,
    EnumString, sqlx::Type, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    #[sqlx(rename = "Half Day")]
    HalfDay,
}

/// One attendance row per (employee, calendar day).
///
/// Punch transitions live here as pure methods so the day's state machine can
/// be exercised without storage. Handlers load the row, apply a transition
/// and write the whole row back; the (employee_id, date) unique key keeps the
/// one-row-per-day invariant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-08-03", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub punch_in: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub lunch_start: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub lunch_end: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub punch_out: Option<NaiveDateTime>,
    pub total_break_minutes: i64,
    pub total_work_minutes: i64,
    pub status: AttendanceStatus,
    #[schema(value_type = Option<String>)]
    pub leave_type: Option<LeaveType>,
}

/// Whole minutes between two instants, floor truncated.
fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_minutes()
}

impl AttendanceRecord {
    /// Fresh unsaved row for a day without any punch yet (status Absent
    /// until the first in-event, matching the leave write-through which may
    /// create the row first).
    pub fn blank(employee_id: u64, date: NaiveDate) -> Self {
        Self {
            id: 0,
            employee_id,
            date,
            punch_in: None,
            lunch_start: None,
            lunch_end: None,
            punch_out: None,
            total_break_minutes: 0,
            total_work_minutes: 0,
            status: AttendanceStatus::Absent,
            leave_type: None,
        }
    }

    /// The day is closed once the out-punch is recorded; status and work
    /// minutes are fixed from then on.
    pub fn is_closed(&self) -> bool {
        self.punch_out.is_some()
    }

    pub fn record_punch_in(&mut self, now: NaiveDateTime) -> AppResult<()> {
        if self.punch_in.is_some() {
            return Err(AppError::StateConflict(
                "You have already punched in today.".into(),
            ));
        }
        self.punch_in = Some(now);
        self.status = AttendanceStatus::Present;
        Ok(())
    }

    pub fn record_lunch_start(&mut self, now: NaiveDateTime) -> AppResult<()> {
        if self.punch_in.is_none() {
            return Err(AppError::StateConflict(
                "Please punch in before starting lunch.".into(),
            ));
        }
        if self.lunch_start.is_some() {
            return Err(AppError::StateConflict(
                "Lunch break already started.".into(),
            ));
        }
        self.lunch_start = Some(now);
        Ok(())
    }

    pub fn record_lunch_end(&mut self, now: NaiveDateTime) -> AppResult<()> {
        let Some(lunch_start) = self.lunch_start else {
            return Err(AppError::StateConflict(
                "Lunch break was not started.".into(),
            ));
        };
        if self.lunch_end.is_some() {
            return Err(AppError::StateConflict("Lunch break already ended.".into()));
        }
        self.lunch_end = Some(now);
        self.total_break_minutes += minutes_between(lunch_start, now);
        Ok(())
    }

    /// Closes the day: an open lunch is folded into the break total at the
    /// out-punch instant, then net work minutes and the Present/Half Day
    /// status are fixed.
    pub fn record_punch_out(&mut self, now: NaiveDateTime) -> AppResult<()> {
        let Some(punch_in) = self.punch_in else {
            return Err(AppError::StateConflict(
                "You must punch in before punching out.".into(),
            ));
        };
        if self.punch_out.is_some() {
            return Err(AppError::StateConflict(
                "You have already punched out today.".into(),
            ));
        }

        if let Some(lunch_start) = self.lunch_start {
            if self.lunch_end.is_none() {
                self.lunch_end = Some(now);
                self.total_break_minutes += minutes_between(lunch_start, now);
            }
        }

        self.punch_out = Some(now);
        self.total_work_minutes = minutes_between(punch_in, now) - self.total_break_minutes;
        self.status =
            if self.total_work_minutes > 0 && self.total_work_minutes < HALF_DAY_THRESHOLD_MINUTES {
                AttendanceStatus::HalfDay
            } else {
                AttendanceStatus::Present
            };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, min, 0).unwrap()
    }

    fn record() -> AttendanceRecord {
        AttendanceRecord::blank(7, day())
    }

    #[test]
    fn full_day_with_lunch() {
        let mut rec = record();
        rec.record_punch_in(at(9, 0)).unwrap();
        rec.record_lunch_start(at(13, 0)).unwrap();
        rec.record_lunch_end(at(13, 45)).unwrap();
        rec.record_punch_out(at(18, 0)).unwrap();

        assert_eq!(rec.total_break_minutes, 45);
        // 9h span minus 45min lunch
        assert_eq!(rec.total_work_minutes, 540 - 45);
        assert_eq!(rec.status, AttendanceStatus::Present);
        assert!(rec.is_closed());
    }

    #[test]
    fn second_punch_in_is_rejected_and_state_unchanged() {
        let mut rec = record();
        rec.record_punch_in(at(9, 0)).unwrap();
        let err = rec.record_punch_in(at(9, 5)).unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
        assert_eq!(rec.punch_in, Some(at(9, 0)));
        assert_eq!(rec.status, AttendanceStatus::Present);
    }

    #[test]
    fn lunch_requires_punch_in() {
        let mut rec = record();
        assert!(matches!(
            rec.record_lunch_start(at(12, 0)),
            Err(AppError::StateConflict(_))
        ));
    }

    #[test]
    fn lunch_end_without_start_is_rejected() {
        let mut rec = record();
        rec.record_punch_in(at(9, 0)).unwrap();
        let err = rec.record_lunch_end(at(13, 0)).unwrap_err();
        assert_eq!(err.to_string(), "Lunch break was not started.");
    }

    #[test]
    fn double_lunch_is_rejected() {
        let mut rec = record();
        rec.record_punch_in(at(9, 0)).unwrap();
        rec.record_lunch_start(at(12, 0)).unwrap();
        rec.record_lunch_end(at(12, 30)).unwrap();
        assert!(rec.record_lunch_start(at(15, 0)).is_err());
        assert!(rec.record_lunch_end(at(15, 30)).is_err());
    }

    #[test]
    fn punch_out_auto_closes_open_lunch() {
        let mut rec = record();
        rec.record_punch_in(at(9, 0)).unwrap();
        rec.record_lunch_start(at(13, 0)).unwrap();
        rec.record_punch_out(at(17, 0)).unwrap();

        // Open lunch ran until the out-punch.
        assert_eq!(rec.lunch_end, Some(at(17, 0)));
        assert_eq!(rec.total_break_minutes, 240);
        assert_eq!(rec.total_work_minutes, 480 - 240);
        assert_eq!(rec.status, AttendanceStatus::Present);
    }

    #[test]
    fn short_day_closes_as_half_day() {
        let mut rec = record();
        rec.record_punch_in(at(9, 0)).unwrap();
        rec.record_punch_out(at(12, 59)).unwrap();
        assert_eq!(rec.total_work_minutes, 239);
        assert_eq!(rec.status, AttendanceStatus::HalfDay);
    }

    #[test]
    fn four_hours_exactly_is_a_full_present_day() {
        let mut rec = record();
        rec.record_punch_in(at(9, 0)).unwrap();
        rec.record_punch_out(at(13, 0)).unwrap();
        assert_eq!(rec.total_work_minutes, 240);
        assert_eq!(rec.status, AttendanceStatus::Present);
    }

    #[test]
    fn zero_work_minutes_is_not_a_half_day() {
        let mut rec = record();
        rec.record_punch_in(at(9, 0)).unwrap();
        rec.record_punch_out(at(9, 0)).unwrap();
        assert_eq!(rec.total_work_minutes, 0);
        assert_eq!(rec.status, AttendanceStatus::Present);
    }

    #[test]
    fn punch_out_twice_is_rejected() {
        let mut rec = record();
        rec.record_punch_in(at(9, 0)).unwrap();
        rec.record_punch_out(at(17, 0)).unwrap();
        let err = rec.record_punch_out(at(18, 0)).unwrap_err();
        assert_eq!(err.to_string(), "You have already punched out today.");
        assert_eq!(rec.punch_out, Some(at(17, 0)));
    }

    #[test]
    fn durations_are_floor_truncated_to_whole_minutes() {
        let mut rec = record();
        rec.record_punch_in(day().and_hms_opt(9, 0, 30).unwrap()).unwrap();
        rec.record_punch_out(day().and_hms_opt(17, 0, 15).unwrap()).unwrap();
        // 7h59m45s floors to 479 minutes.
        assert_eq!(rec.total_work_minutes, 479);
    }
}
