// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expansion of an availability profile into bookable time points.

use chrono::{Days, NaiveDate, NaiveTime, Timelike};
use consulta_core::types::{AvailabilityProfile, weekday_index};

fn minutes_of(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Lazy, strictly increasing sequence of slot start times.
///
/// Every slot fits inside the window: it starts before `end_time` and its
/// full duration ends at or before it.
#[derive(Debug, Clone)]
pub struct Slots {
    next: u32,
    end: u32,
    step: u32,
}

impl Slots {
    fn empty() -> Self {
        Self {
            next: 0,
            end: 0,
            step: 1,
        }
    }
}

impl Iterator for Slots {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<NaiveTime> {
        if self.next + self.step > self.end {
            return None;
        }
        let minute = self.next;
        self.next += self.step;
        NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end.saturating_sub(self.next) / self.step) as usize;
        (n, Some(n))
    }
}

/// Slots of `profile` on `date`.
///
/// Empty when the weekday differs, the date is blocked, or the profile is
/// inactive.
pub fn generate_slots(profile: &AvailabilityProfile, date: NaiveDate) -> Slots {
    let step = profile.slot_duration();
    if !profile.is_active
        || weekday_index(date) != profile.day_of_week
        || profile.is_blocked(date)
        || step == 0
    {
        return Slots::empty();
    }
    Slots {
        next: minutes_of(profile.start_time),
        end: minutes_of(profile.end_time),
        step,
    }
}

/// The date used when a message names none: the next Monday strictly after
/// `today`. A Monday anchor advances a full week.
pub fn default_target_date(today: NaiveDate) -> NaiveDate {
    let ahead = 7 - u64::from(weekday_index(today));
    today.checked_add_days(Days::new(ahead)).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profile(start: NaiveTime, end: NaiveTime, duration: Option<u32>) -> AvailabilityProfile {
        AvailabilityProfile {
            id: 1,
            lecturer_id: None,
            lecturer_name: "Dr. Lan".into(),
            day_of_week: 0,
            start_time: start,
            end_time: end,
            slot_duration_minutes: duration,
            max_slots_per_day: 10,
            is_active: true,
            blocked_dates: Vec::new(),
            blocked_dates_version: 0,
            subject: None,
            location: None,
            notes: None,
        }
    }

    #[test]
    fn monday_window_expands_in_steps() {
        let p = profile(at(9, 0), at(11, 0), Some(30));
        let slots: Vec<_> = generate_slots(&p, date(2025, 1, 27)).collect();
        assert_eq!(slots, vec![at(9, 0), at(9, 30), at(10, 0), at(10, 30)]);
    }

    #[test]
    fn unset_duration_defaults_to_thirty() {
        let p = profile(at(14, 0), at(15, 0), None);
        let slots: Vec<_> = generate_slots(&p, date(2025, 1, 27)).collect();
        assert_eq!(slots, vec![at(14, 0), at(14, 30)]);
    }

    #[test]
    fn partial_trailing_slot_is_not_offered() {
        let p = profile(at(9, 0), at(10, 0), Some(25));
        let slots: Vec<_> = generate_slots(&p, date(2025, 1, 27)).collect();
        assert_eq!(slots, vec![at(9, 0), at(9, 25)]);
    }

    #[test]
    fn blocked_date_yields_nothing() {
        let mut p = profile(at(9, 0), at(11, 0), Some(30));
        p.blocked_dates = vec![date(2025, 1, 27)];
        assert_eq!(generate_slots(&p, date(2025, 1, 27)).count(), 0);
        // The following Monday is unaffected.
        assert_eq!(generate_slots(&p, date(2025, 2, 3)).count(), 4);
    }

    #[test]
    fn wrong_weekday_or_inactive_yields_nothing() {
        let mut p = profile(at(9, 0), at(11, 0), Some(30));
        assert_eq!(generate_slots(&p, date(2025, 1, 28)).count(), 0);
        p.is_active = false;
        assert_eq!(generate_slots(&p, date(2025, 1, 27)).count(), 0);
    }

    #[test]
    fn default_date_is_next_monday() {
        // Wednesday
        assert_eq!(default_target_date(date(2025, 1, 22)), date(2025, 1, 27));
        // Sunday
        assert_eq!(default_target_date(date(2025, 1, 26)), date(2025, 1, 27));
        // Monday advances a full week.
        assert_eq!(default_target_date(date(2025, 1, 27)), date(2025, 2, 3));
    }

    proptest! {
        #[test]
        fn slots_are_deterministic_increasing_and_counted(
            start in 0u32..(23 * 60),
            len in 1u32..600,
            duration in 5u32..120,
        ) {
            let end = (start + len).min(23 * 60 + 59);
            prop_assume!(end > start);
            let p = profile(
                at(start / 60, start % 60),
                at(end / 60, end % 60),
                Some(duration),
            );
            let monday = date(2025, 1, 27);
            let first: Vec<_> = generate_slots(&p, monday).collect();
            let second: Vec<_> = generate_slots(&p, monday).collect();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len() as u32, (end - start) / duration);
            prop_assert!(first.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(first.iter().all(|t| *t < p.end_time));
        }
    }
}
