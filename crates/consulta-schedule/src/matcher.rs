// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Matching requested times against free generated slots.
//!
//! Both searches are pure given a snapshot of the ledger's live slots. When
//! several lecturers offer the same time, every one of them is returned.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use consulta_core::types::{
    AvailabilityProfile, BookingOption, OccupiedSlot, OptionKind, TimeRange,
};

use crate::generator::generate_slots;

/// Set of (profile, date, time) tuples held by pending or confirmed bookings.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    taken: HashSet<OccupiedSlot>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_occupied(&self, availability_id: i64, date: NaiveDate, time: NaiveTime) -> bool {
        self.taken.contains(&OccupiedSlot {
            availability_id,
            date,
            time,
        })
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

impl FromIterator<OccupiedSlot> for Occupancy {
    fn from_iter<I: IntoIterator<Item = OccupiedSlot>>(iter: I) -> Self {
        Self {
            taken: iter.into_iter().collect(),
        }
    }
}

fn option(
    kind: OptionKind,
    profile: &AvailabilityProfile,
    date: NaiveDate,
    time: NaiveTime,
) -> BookingOption {
    BookingOption {
        kind,
        lecturer_name: profile.lecturer_name.clone(),
        date,
        time,
        subject: profile.subject_or_default().to_string(),
        location: profile.location_or_default().to_string(),
        duration_minutes: profile.slot_duration(),
        availability_id: profile.id,
    }
}

/// Options for each requested time that some profile offers and nobody holds.
///
/// Output follows the order of `requested`, then the order of `profiles`.
pub fn find_exact(
    profiles: &[AvailabilityProfile],
    occupancy: &Occupancy,
    requested: &[NaiveTime],
    date: NaiveDate,
) -> Vec<BookingOption> {
    let mut options = Vec::new();
    for &time in requested {
        for profile in profiles {
            if occupancy.is_occupied(profile.id, date, time) {
                continue;
            }
            if generate_slots(profile, date).any(|slot| slot == time) {
                options.push(option(OptionKind::ExactMatch, profile, date, time));
            }
        }
    }
    options
}

/// Free slots on `date`, optionally clipped to `range`, earliest first.
///
/// Profiles whose window does not overlap `range` contribute nothing. Equal
/// times stay adjacent in profile order. At most `limit` options come back.
pub fn find_alternatives(
    profiles: &[AvailabilityProfile],
    occupancy: &Occupancy,
    range: Option<TimeRange>,
    date: NaiveDate,
    limit: usize,
) -> Vec<BookingOption> {
    let mut options: Vec<BookingOption> = profiles
        .iter()
        .filter(|p| range.is_none_or(|r| p.start_time < r.end() && r.start() < p.end_time))
        .flat_map(|profile| {
            generate_slots(profile, date)
                .filter(move |&time| range.is_none_or(|r| r.contains(time)))
                .filter(move |&time| !occupancy.is_occupied(profile.id, date, time))
                .map(move |time| option(OptionKind::Alternative, profile, date, time))
        })
        .collect();
    // Stable sort keeps profile order among equal times.
    options.sort_by_key(|o| o.time);
    options.truncate(limit);
    options
}
