// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clock-time extraction and normalization.
//!
//! Every accepted form ends up as a [`NaiveTime`] (rendered `HH:MM`):
//! `8h15`, `8:15`, `8h`, `8 giờ`, `815`, `1430`, `2pm`, `2:30pm`. Twelve-hour
//! readings need an explicit am/pm. Values outside a real clock are dropped.

use std::ops::Range;
use std::sync::LazyLock;

use chrono::NaiveTime;
use consulta_core::types::TimeRange;
use regex::{Captures, Regex};

use crate::date::NUMERIC_DATE;

/// One clock mention. Alternatives are tried left to right at each position.
const CLOCK_PATTERN: &str = r"(?x)
      (?P<ap_h>[0-9]{1,2})(?::(?P<ap_m>[0-9]{2}))?\s*(?P<ap>am|pm)
    | (?P<hm_h>[0-9]{1,2})[h:](?P<hm_m>[0-9]{2})
    | (?P<h>[0-9]{1,2})\s*(?:h|giờ)
    | (?P<compact>[0-9]{3,4})
";

static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b(?:{CLOCK_PATTERN})\b")).unwrap());

static CLOCK_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(?:{CLOCK_PATTERN})$")).unwrap());

/// "từ 8h đến 10h", "from 2pm to 4pm", "between 9:00 and 11:00".
static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    let endpoint = r"[0-9]{1,2}(?:[h:][0-9]{2})?(?:\s*(?:h|giờ))?(?:\s*(?:am|pm))?";
    Regex::new(&format!(
        r"\b(?:từ|from|between)\s+(?P<a>{endpoint})\s*(?:đến|tới|to|and|-)\s*(?P<b>{endpoint})"
    ))
    .unwrap()
});

/// Named parts of the day, used as a range when no explicit range is given.
static PARTS_OF_DAY: LazyLock<Vec<(Regex, &'static str, (u32, u32))>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"\b(?:buổi\s+sáng|morning)\b").unwrap(),
            "morning",
            (8, 12),
        ),
        (
            Regex::new(r"\b(?:buổi\s+chiều|afternoon)\b").unwrap(),
            "afternoon",
            (13, 17),
        ),
        (
            Regex::new(r"\b(?:buổi\s+tối|evening)\b").unwrap(),
            "evening",
            (18, 21),
        ),
    ]
});

/// Times found in one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeExtraction {
    /// Explicit single times, mention order, duplicates removed.
    pub slots: Vec<NaiveTime>,
    pub range: Option<TimeRange>,
    /// Whether `range` came from "from X to Y" phrasing.
    pub explicit_range: bool,
    /// Set when `range` came from a part-of-day word.
    pub part_of_day: Option<&'static str>,
}

fn num(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn clock_from(caps: &Captures<'_>) -> Option<NaiveTime> {
    if let Some(meridiem) = caps.name("ap") {
        let hour = num(caps, "ap_h")?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let minute = num(caps, "ap_m").unwrap_or(0);
        let hour = match (meridiem.as_str(), hour) {
            ("am", 12) => 0,
            ("am", h) => h,
            ("pm", 12) => 12,
            (_, h) => h + 12,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }
    if let Some(hour) = num(caps, "hm_h") {
        return NaiveTime::from_hms_opt(hour, num(caps, "hm_m")?, 0);
    }
    if let Some(hour) = num(caps, "h") {
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }
    let compact = caps.name("compact")?.as_str();
    let (hour, minute) = compact.split_at(compact.len() - 2);
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// Normalize one free-standing time token such as `"8h"`, `"0815"` or `"2:30 pm"`.
///
/// A bare one or two digit number reads as a whole hour.
pub fn normalize_time(raw: &str) -> Option<NaiveTime> {
    let token = raw.trim().to_lowercase();
    if !token.is_empty() && token.len() <= 2 && token.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveTime::from_hms_opt(token.parse().ok()?, 0, 0);
    }
    CLOCK_EXACT.captures(&token).and_then(|caps| clock_from(&caps))
}

/// Replace numeric dates with spaces so `2025` or `27/01` never read as clock times.
fn mask_dates(text: &str) -> String {
    NUMERIC_DATE
        .replace_all(text, |caps: &Captures<'_>| " ".repeat(caps[0].len()))
        .into_owned()
}

fn overlaps(span: &Range<usize>, spans: &[Range<usize>]) -> bool {
    spans.iter().any(|s| span.start < s.end && s.start < span.end)
}

/// Extract single times and an optional range from lowercase text.
pub fn extract_times(text: &str) -> TimeExtraction {
    let masked = mask_dates(text);
    let mut out = TimeExtraction::default();

    let mut range_spans = Vec::new();
    for caps in RANGE.captures_iter(&masked) {
        if let Some(whole) = caps.get(0) {
            range_spans.push(whole.range());
        }
        // Only the first range phrase counts. Endpoints are never slots,
        // even when the pair is unordered and gets dropped.
        if out.range.is_none() && !out.explicit_range {
            let start = caps.name("a").and_then(|m| normalize_time(m.as_str()));
            let end = caps.name("b").and_then(|m| normalize_time(m.as_str()));
            out.explicit_range = true;
            out.range = start.zip(end).and_then(|(s, e)| TimeRange::new(s, e));
        }
    }

    for caps in CLOCK.captures_iter(&masked) {
        let Some(whole) = caps.get(0) else { continue };
        if overlaps(&whole.range(), &range_spans) {
            continue;
        }
        if let Some(time) = clock_from(&caps)
            && !out.slots.contains(&time)
        {
            out.slots.push(time);
        }
    }

    if !out.explicit_range {
        let first_part = PARTS_OF_DAY
            .iter()
            .filter_map(|(re, name, hours)| re.find(&masked).map(|m| (m.start(), *name, *hours)))
            .min_by_key(|(pos, _, _)| *pos);
        if let Some((_, name, (from, to))) = first_part {
            out.range = NaiveTime::from_hms_opt(from, 0, 0)
                .zip(NaiveTime::from_hms_opt(to, 0, 0))
                .and_then(|(s, e)| TimeRange::new(s, e));
            out.part_of_day = Some(name);
        }
    }

    out
}
