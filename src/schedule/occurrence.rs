//! Dose-occurrence expansion shared by record generation and trigger
//! scheduling.
//!
//! Both features are projections of the same medicine definition and a
//! fixed "now": one into adherence records, one into armed triggers.
//! Keeping the expansion pure and in one place is what keeps the two
//! projections from drifting apart.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::models::Medicine;
use crate::reminder_times::parse_reminder_times;

/// Open-ended medicines are expanded this far past "now".
pub const DEFAULT_WINDOW_DAYS: i64 = 365;

/// One (date, clock-time) dose slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseSlot {
    pub date: NaiveDate,
    /// Raw clock token, e.g. "08:00". May be malformed; the trigger
    /// scheduler skips what it cannot parse.
    pub time: String,
}

/// The last calendar date expansion reaches: the medicine's own end date
/// when set, otherwise exactly `today + 365` days. Computed per
/// invocation, never written back to the medicine.
pub fn effective_end_date(end_date: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    end_date.unwrap_or_else(|| today + chrono::Duration::days(DEFAULT_WINDOW_DAYS))
}

/// Every (date, time) slot of the medicine from its start date through
/// the effective end date, dates ascending, times in configured order.
pub fn expand_slots(medicine: &Medicine, today: NaiveDate) -> Vec<DoseSlot> {
    let end = effective_end_date(medicine.end_date, today);
    let times = parse_reminder_times(&medicine.reminder_times);

    let mut slots = Vec::new();
    for date in medicine
        .start_date
        .iter_days()
        .take_while(|date| *date <= end)
    {
        for time in &times {
            slots.push(DoseSlot {
                date,
                time: time.clone(),
            });
        }
    }
    slots
}

/// Resolve a slot to the local instant its trigger should fire.
///
/// The hour must parse to 0..=23 or the slot is unusable (`None`); a
/// missing or unparsable minute falls back to 0. Local resolution is
/// best effort: an instant inside a DST gap also yields `None`.
pub fn fire_instant(date: NaiveDate, time: &str) -> Option<DateTime<Local>> {
    let mut parts = time.splitn(2, ':');

    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts
        .next()
        .and_then(|m| m.trim().parse().ok())
        .filter(|m| *m < 60)
        .unwrap_or(0);

    let naive: NaiveDateTime = date.and_hms_opt(hour, minute, 0)?;
    Local.from_local_datetime(&naive).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn medicine(start: NaiveDate, end: Option<NaiveDate>, times: &str) -> Medicine {
        Medicine {
            id: Uuid::new_v4(),
            name: "Metformin".into(),
            purpose: String::new(),
            dosage: "500mg".into(),
            times_per_day: 2,
            reminder_times: times.into(),
            start_date: start,
            end_date: end,
            is_active: true,
            custom_ringtone: None,
            created_at: 0,
        }
    }

    #[test]
    fn explicit_end_date_wins() {
        let end = date(2025, 3, 1);
        assert_eq!(effective_end_date(Some(end), date(2025, 1, 1)), end);
    }

    #[test]
    fn open_ended_defaults_to_one_year_from_today() {
        assert_eq!(
            effective_end_date(None, date(2024, 1, 1)),
            date(2024, 12, 31)
        );
        assert_eq!(
            effective_end_date(None, date(2025, 3, 10)),
            date(2026, 3, 10)
        );
    }

    #[test]
    fn expansion_covers_full_range_inclusive() {
        let med = medicine(date(2024, 1, 1), Some(date(2024, 1, 2)), "08:00,20:00");
        let slots = expand_slots(&med, date(2024, 1, 1));

        let expected: Vec<(NaiveDate, &str)> = vec![
            (date(2024, 1, 1), "08:00"),
            (date(2024, 1, 1), "20:00"),
            (date(2024, 1, 2), "08:00"),
            (date(2024, 1, 2), "20:00"),
        ];
        let actual: Vec<(NaiveDate, &str)> =
            slots.iter().map(|s| (s.date, s.time.as_str())).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn open_ended_expansion_ends_exactly_a_year_out() {
        let today = date(2025, 6, 1);
        let med = medicine(today, None, "08:00");
        let slots = expand_slots(&med, today);

        assert_eq!(slots.first().unwrap().date, today);
        assert_eq!(slots.last().unwrap().date, date(2026, 6, 1));
        assert_eq!(slots.len(), 366);
    }

    #[test]
    fn single_day_range_yields_each_configured_time() {
        let day = date(2024, 1, 1);
        let med = medicine(day, Some(day), "06:00,12:00,18:00");
        assert_eq!(expand_slots(&med, day).len(), 3);
    }

    #[test]
    fn malformed_tokens_still_become_slots() {
        // Expansion does not validate; the scheduler decides what to skip.
        let day = date(2024, 1, 1);
        let med = medicine(day, Some(day), "08:00,noonish");
        let slots = expand_slots(&med, day);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].time, "noonish");
    }

    #[test]
    fn fire_instant_parses_hour_and_minute() {
        let at = fire_instant(date(2025, 6, 15), "08:30").unwrap();
        assert_eq!(at.hour(), 8);
        assert_eq!(at.minute(), 30);
        assert_eq!(at.date_naive(), date(2025, 6, 15));
    }

    #[test]
    fn fire_instant_defaults_missing_minute_to_zero() {
        let at = fire_instant(date(2025, 6, 15), "8").unwrap();
        assert_eq!(at.hour(), 8);
        assert_eq!(at.minute(), 0);
    }

    #[test]
    fn fire_instant_defaults_bad_minute_to_zero() {
        assert_eq!(fire_instant(date(2025, 6, 15), "08:xx").unwrap().minute(), 0);
        assert_eq!(fire_instant(date(2025, 6, 15), "08:75").unwrap().minute(), 0);
    }

    #[test]
    fn fire_instant_rejects_bad_hour() {
        assert!(fire_instant(date(2025, 6, 15), "noonish").is_none());
        assert!(fire_instant(date(2025, 6, 15), "24:00").is_none());
        assert!(fire_instant(date(2025, 6, 15), "").is_none());
    }
}
