// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic pattern stage.
//!
//! Bilingual (Vietnamese/English) keyword sets decide the intent and the
//! time and date extractors fill in the rest. Scores stay inside the 25-75
//! band so a pattern result never looks as sure as a model result can.

use std::sync::LazyLock;

use chrono::NaiveDate;
use consulta_core::ConsultaError;
use consulta_core::types::{Intent, NluResult, format_hhmm};
use regex::Regex;

use crate::date::extract_date;
use crate::time::extract_times;

const AGREEMENT: &[&str] = &[
    "được",
    "đồng ý",
    "ok",
    "okay",
    "tốt",
    "xác nhận",
    "yes",
    "sounds good",
    "that works",
    "let's do it",
];

const CONFIRMATION: &[&str] = &["chọn", "xác nhận", "ok slot", "book this", "confirm"];

const CHECKING: &[&str] = &[
    "còn giờ nào",
    "thời gian nào",
    "slot nào",
    "được không",
    "có thể",
    "what about",
    "do you have",
    "any other",
];

const BOOKING_VERBS: &[&str] = &[
    "đặt lịch",
    "đặt",
    "book",
    "hẹn",
    "appointment",
    "muốn đặt",
    "tôi muốn",
    "i want",
    "schedule",
    "reserve",
];

const REJECTION: &[&str] = &[
    "không",
    "không được",
    "bận",
    "không thể",
    "từ chối",
    "no",
    "not available",
    "can't",
    "cannot",
];

/// Whole-word alternation over a keyword list.
fn word_set(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).unwrap()
}

static AGREEMENT_RE: LazyLock<Regex> = LazyLock::new(|| word_set(AGREEMENT));
static CONFIRMATION_RE: LazyLock<Regex> = LazyLock::new(|| word_set(CONFIRMATION));
static BOOKING_RE: LazyLock<Regex> = LazyLock::new(|| word_set(BOOKING_VERBS));
static REJECTION_RE: LazyLock<Regex> = LazyLock::new(|| word_set(REJECTION));

/// Checking phrases, including the "có ... không" and "is ... free" question forms.
static CHECKING_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        word_set(CHECKING),
        Regex::new(r"\bis\b[^.!?]*\bfree\b").unwrap(),
        Regex::new(r"\bcó\b[^.!?]*\bkhông\b\s*\??\s*$").unwrap(),
        Regex::new(r"\bkhông\s*\?").unwrap(),
    ]
});

/// Which keyword case decided the intent. Named in the reasoning string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCase {
    Confirmation,
    Agreement,
    Rejection,
    Checking,
    Request,
    TimeOnly,
    NoMatch,
}

impl PatternCase {
    fn label(self) -> &'static str {
        match self {
            PatternCase::Confirmation => "confirmation",
            PatternCase::Agreement => "agreement",
            PatternCase::Rejection => "rejection",
            PatternCase::Checking => "checking",
            PatternCase::Request => "request",
            PatternCase::TimeOnly => "time-only",
            PatternCase::NoMatch => "no-match",
        }
    }

    fn intent(self) -> Intent {
        match self {
            PatternCase::Confirmation | PatternCase::Agreement | PatternCase::Request => {
                Intent::Accepted
            }
            PatternCase::Checking | PatternCase::TimeOnly => Intent::Checking,
            PatternCase::Rejection | PatternCase::NoMatch => Intent::OutOfScope,
        }
    }

    fn score(self) -> u8 {
        match self {
            PatternCase::Confirmation => 25,
            PatternCase::Request => 30,
            PatternCase::Agreement => 35,
            PatternCase::TimeOnly => 40,
            PatternCase::Checking => 45,
            PatternCase::NoMatch => 50,
            PatternCase::Rejection => 75,
        }
    }
}

/// Blank out question phrases so "được không" reads as neither agreement nor rejection.
fn without_checking(text: &str) -> (String, bool) {
    let mut found = false;
    let mut out = text.to_string();
    for re in CHECKING_RES.iter() {
        if re.is_match(&out) {
            found = true;
            out = re.replace_all(&out, " ").into_owned();
        }
    }
    (out, found)
}

/// Decide the keyword case of lowercase `text`.
pub fn classify(text: &str, mentions_schedule: bool) -> PatternCase {
    let (rest, checking) = without_checking(text);
    // A confirmation word only sharpens agreement; alone it decides nothing.
    if AGREEMENT_RE.is_match(&rest) {
        if CONFIRMATION_RE.is_match(&rest) {
            return PatternCase::Confirmation;
        }
        return PatternCase::Agreement;
    }
    if REJECTION_RE.is_match(&rest) {
        return PatternCase::Rejection;
    }
    let request = BOOKING_RE.is_match(&rest);
    let question = text.trim_end().ends_with('?') && (request || mentions_schedule);
    if checking || question {
        return PatternCase::Checking;
    }
    if request {
        return PatternCase::Request;
    }
    if mentions_schedule {
        return PatternCase::TimeOnly;
    }
    PatternCase::NoMatch
}

/// The regex-driven second stage of the NLU chain.
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    max_input_chars: usize,
    reasoning_max_chars: usize,
}

impl PatternAnalyzer {
    pub fn new(max_input_chars: usize, reasoning_max_chars: usize) -> Self {
        Self {
            max_input_chars,
            reasoning_max_chars,
        }
    }

    /// Analyze one message. Fails only on input it refuses to scan.
    pub fn analyze(&self, text: &str, today: NaiveDate) -> Result<NluResult, ConsultaError> {
        let length = text.chars().count();
        if length > self.max_input_chars {
            return Err(ConsultaError::InvalidInput(format!(
                "message of {length} chars exceeds the {} char pattern limit",
                self.max_input_chars
            )));
        }

        let lower = text.to_lowercase();
        let times = extract_times(&lower);
        let date = extract_date(&lower, today);
        let mentions_schedule =
            !times.slots.is_empty() || times.range.is_some() || date.date.is_some();
        let case = classify(&lower, mentions_schedule);

        let mut reasoning = format!("pattern: {}", case.label());
        if !times.slots.is_empty() {
            let slots: Vec<String> = times.slots.iter().map(|t| format_hhmm(*t)).collect();
            reasoning.push_str(&format!("; times {}", slots.join(", ")));
        }
        if let Some(range) = times.range {
            let source = times.part_of_day.unwrap_or("range");
            reasoning.push_str(&format!(
                "; {source} {}-{}",
                format_hhmm(range.start()),
                format_hhmm(range.end())
            ));
        }
        if !date.expressions.is_empty() {
            reasoning.push_str(&format!("; date {}", date.expressions.join(" ")));
        }

        Ok(NluResult {
            intent: case.intent(),
            safety_score: case.score(),
            is_rejection: case == PatternCase::Rejection,
            is_confirmation: case == PatternCase::Confirmation,
            input_slots: times.slots,
            time_range: times.range,
            date: date.date,
            date_expressions: date.expressions,
            reasoning: crate::truncate_chars(&reasoning, self.reasoning_max_chars),
        })
    }
}
