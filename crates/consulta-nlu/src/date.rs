// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Date expression resolution against a caller-supplied "today".

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use consulta_core::types::weekday_index;
use regex::Regex;

/// ISO `yyyy-mm-dd`, or `dd/mm` with an optional `/yyyy`.
pub(crate) static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?P<iy>[0-9]{4})-(?P<im>[0-9]{1,2})-(?P<id>[0-9]{1,2})|(?P<d>[0-9]{1,2})/(?P<m>[0-9]{1,2})(?:/(?P<y>[0-9]{4}))?)\b",
    )
    .unwrap()
});

static TODAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:hôm nay|today)\b").unwrap());

static DAY_AFTER_TOMORROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:ngày mốt|ngày kia|day after tomorrow)\b").unwrap());

static TOMORROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:ngày mai|tomorrow)\b").unwrap());

static NEXT_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:tuần sau|tuần tới|next week)\b").unwrap());

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)\b(?:
            thứ\s*(?P<vn_num>[2-7])
          | thứ\s+(?P<vn_word>hai|ba|tư|năm|sáu|bảy)
          | (?P<sunday>chủ\s+nhật)
          | t(?P<short>[2-7])
          | (?P<en>monday|tuesday|wednesday|thursday|friday|saturday|sunday)
        )\b",
    )
    .unwrap()
});

/// The date a message refers to, if any, plus the expressions that decided it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateExtraction {
    pub date: Option<NaiveDate>,
    pub expressions: Vec<String>,
}

fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}

fn next_monday(today: NaiveDate) -> Option<NaiveDate> {
    add_days(today, 7 - u64::from(weekday_index(today)))
}

/// 0 = Monday .. 6 = Sunday.
fn weekday_of(caps: &regex::Captures<'_>) -> Option<u8> {
    if let Some(n) = caps.name("vn_num").or_else(|| caps.name("short")) {
        // "thứ 2" is Monday.
        return n.as_str().parse::<u8>().ok().map(|n| n - 2);
    }
    if let Some(word) = caps.name("vn_word") {
        return ["hai", "ba", "tư", "năm", "sáu", "bảy"]
            .iter()
            .position(|w| *w == word.as_str())
            .map(|i| i as u8);
    }
    if caps.name("sunday").is_some() {
        return Some(6);
    }
    let en = caps.name("en")?.as_str();
    [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ]
    .iter()
    .position(|d| *d == en)
    .map(|i| i as u8)
}

fn numeric_date(caps: &regex::Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let field = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());
    if let Some(year) = caps.name("iy").and_then(|m| m.as_str().parse::<i32>().ok()) {
        return NaiveDate::from_ymd_opt(year, field("im")?, field("id")?);
    }
    let (day, month) = (field("d")?, field("m")?);
    if let Some(year) = caps.name("y").and_then(|m| m.as_str().parse::<i32>().ok()) {
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(d) if d < today => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
        // 29/02 outside a leap year may still exist next time round.
        None => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
        found => found,
    }
}

/// Resolve the first date expression in lowercase `text`.
///
/// Numeric dates win over relative words. A weekday together with "next
/// week" means that weekday of the following week; a weekday alone is its
/// next occurrence, a full week ahead when it names today.
pub fn extract_date(text: &str, today: NaiveDate) -> DateExtraction {
    let mut out = DateExtraction::default();

    for caps in NUMERIC_DATE.captures_iter(text) {
        if let Some(date) = numeric_date(&caps, today) {
            out.date = Some(date);
            out.expressions.push(caps[0].to_string());
            return out;
        }
    }

    let simple: [(&Regex, u64); 3] = [(&TODAY, 0), (&DAY_AFTER_TOMORROW, 2), (&TOMORROW, 1)];
    for (re, offset) in simple {
        if let Some(m) = re.find(text) {
            out.date = add_days(today, offset);
            out.expressions.push(m.as_str().to_string());
            return out;
        }
    }

    let next_week = NEXT_WEEK.find(text);
    let weekday = WEEKDAY
        .captures(text)
        .and_then(|caps| weekday_of(&caps).map(|w| (caps[0].to_string(), w)));

    match (weekday, next_week) {
        (Some((expr, w)), Some(nw)) => {
            out.date = next_monday(today).and_then(|m| add_days(m, u64::from(w)));
            out.expressions.push(expr);
            out.expressions.push(nw.as_str().to_string());
        }
        (Some((expr, w)), None) => {
            let ahead = (u64::from(w) + 7 - u64::from(weekday_index(today))) % 7;
            out.date = add_days(today, if ahead == 0 { 7 } else { ahead });
            out.expressions.push(expr);
        }
        (None, Some(nw)) => {
            out.date = next_monday(today);
            out.expressions.push(nw.as_str().to_string());
        }
        (None, None) => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // Wednesday 2025-01-22.
    fn wednesday() -> NaiveDate {
        d(2025, 1, 22)
    }

    fn resolve(text: &str) -> Option<NaiveDate> {
        extract_date(text, wednesday()).date
    }

    #[test]
    fn relative_days() {
        assert_eq!(resolve("hôm nay được không"), Some(d(2025, 1, 22)));
        assert_eq!(resolve("tomorrow at 9"), Some(d(2025, 1, 23)));
        assert_eq!(resolve("ngày mai"), Some(d(2025, 1, 23)));
        assert_eq!(resolve("ngày mốt"), Some(d(2025, 1, 24)));
        assert_eq!(resolve("the day after tomorrow"), Some(d(2025, 1, 24)));
    }

    #[test]
    fn weekdays_resolve_to_next_occurrence() {
        assert_eq!(resolve("thứ 2"), Some(d(2025, 1, 27)));
        assert_eq!(resolve("thứ hai"), Some(d(2025, 1, 27)));
        assert_eq!(resolve("t6 nhé"), Some(d(2025, 1, 24)));
        assert_eq!(resolve("friday"), Some(d(2025, 1, 24)));
        assert_eq!(resolve("chủ nhật"), Some(d(2025, 1, 26)));
        // Same weekday as today means next week.
        assert_eq!(resolve("wednesday"), Some(d(2025, 1, 29)));
        assert_eq!(resolve("thứ 4"), Some(d(2025, 1, 29)));
    }

    #[test]
    fn next_week_with_and_without_weekday() {
        assert_eq!(resolve("tuần sau"), Some(d(2025, 1, 27)));
        assert_eq!(resolve("next week"), Some(d(2025, 1, 27)));
        let got = extract_date("thứ 3 tuần sau", wednesday());
        assert_eq!(got.date, Some(d(2025, 1, 28)));
        assert_eq!(got.expressions, vec!["thứ 3", "tuần sau"]);
    }

    #[test]
    fn numeric_dates() {
        assert_eq!(resolve("2025-02-03"), Some(d(2025, 2, 3)));
        assert_eq!(resolve("03/02"), Some(d(2025, 2, 3)));
        assert_eq!(resolve("3/2/2026"), Some(d(2026, 2, 3)));
        // Already past this year: next year.
        assert_eq!(resolve("15/01"), Some(d(2026, 1, 15)));
        // Numeric beats relative words.
        assert_eq!(resolve("tomorrow, i mean 30/01"), Some(d(2025, 1, 30)));
    }

    #[test]
    fn invalid_or_absent_dates_are_null() {
        assert_eq!(resolve("31/02/2025"), None);
        assert_eq!(resolve("any time works"), None);
        assert!(extract_date("hello", wednesday()).expressions.is_empty());
    }

    #[test]
    fn expressions_are_recorded() {
        let got = extract_date("ngày mai lúc 9h", wednesday());
        assert_eq!(got.expressions, vec!["ngày mai"]);
    }
}
