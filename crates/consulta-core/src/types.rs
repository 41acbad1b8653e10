// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across Consulta crates.
//!
//! Times of day are carried as [`NaiveTime`] and rendered as 24-hour `HH:MM`
//! everywhere they cross a boundary (storage, JSON, replies). Calendar dates
//! are [`NaiveDate`] and render as ISO `YYYY-MM-DD`.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Slot length used when a profile record leaves `slot_duration_minutes` unset.
pub const DEFAULT_SLOT_DURATION_MINUTES: u32 = 30;

/// Daily capacity used when a profile record leaves `max_slots_per_day` unset.
pub const DEFAULT_MAX_SLOTS_PER_DAY: u32 = 10;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator an adapter plugs in as.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Moderation,
    Notification,
}

// --- Clock helpers ---

/// Formats a time of day as zero-padded 24-hour `HH:MM`.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parses a strict `HH:MM` (or `H:MM`) string. Seconds are not accepted.
pub fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    let (h, m) = s.trim().split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Day-of-week index used by availability profiles: 0 = Monday .. 6 = Sunday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// Serde adapter rendering a [`NaiveTime`] as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_hhmm(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM time `{raw}`")))
    }
}

/// Serde adapter rendering a list of [`NaiveTime`] as `["HH:MM", ...]`.
pub mod hhmm_list {
    use chrono::NaiveTime;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(times: &[NaiveTime], s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(times.len()))?;
        for t in times {
            seq.serialize_element(&super::format_hhmm(*t))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<NaiveTime>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        raw.iter()
            .map(|s| {
                super::parse_hhmm(s)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM time `{s}`")))
            })
            .collect()
    }
}

// --- Conversation records ---

/// Booking lifecycle of a conversation.
///
/// `Completed` and `Abandoned` are terminal: no transition leaves them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingStatus {
    Ongoing,
    Completed,
    Abandoned,
}

impl BookingStatus {
    /// Returns true for `Completed` and `Abandoned`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, BookingStatus::Ongoing)
    }

    /// Only `ongoing -> completed` and `ongoing -> abandoned` are legal moves.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        self == BookingStatus::Ongoing && next.is_terminal()
    }
}

/// Author of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// A chat conversation between a visitor and the booking assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    /// Owning user; `None` for anonymous visitors.
    pub user_id: Option<String>,
    /// Derived lazily from the first user message.
    pub title: Option<String>,
    /// Free-form topic tag, e.g. "consultant".
    pub context: String,
    pub bot_response_count: u32,
    pub booking_status: BookingStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// A single stored chat message. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub content: String,
    pub sender: Sender,
    pub is_appropriate: bool,
    pub created_at: String,
}

/// The caller on whose behalf a message or booking is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

// --- Availability and bookings ---

/// A lecturer's recurring weekly bookable window.
///
/// A lecturer with several disjoint windows has several profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityProfile {
    pub id: i64,
    pub lecturer_id: Option<String>,
    pub lecturer_name: String,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub slot_duration_minutes: Option<u32>,
    pub max_slots_per_day: u32,
    pub is_active: bool,
    /// Explicit exception dates, kept sorted and free of duplicates.
    pub blocked_dates: Vec<NaiveDate>,
    /// Bumped on every blocked-date append.
    pub blocked_dates_version: i64,
    pub subject: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl AvailabilityProfile {
    /// Effective slot length in minutes.
    pub fn slot_duration(&self) -> u32 {
        self.slot_duration_minutes
            .unwrap_or(DEFAULT_SLOT_DURATION_MINUTES)
    }

    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        self.blocked_dates.binary_search(&date).is_ok()
    }

    /// Subject shown to the user when the profile has none.
    pub fn subject_or_default(&self) -> &str {
        self.subject.as_deref().unwrap_or("General")
    }

    /// Location shown to the user when the profile has none.
    pub fn location_or_default(&self) -> &str {
        self.location.as_deref().unwrap_or("TBD")
    }
}

/// Reservation status of a booking slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingSlotStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingSlotStatus {
    /// Whether a slot in this status counts toward occupancy and capacity.
    pub fn occupies(self) -> bool {
        matches!(self, BookingSlotStatus::Pending | BookingSlotStatus::Confirmed)
    }
}

/// A reservation in the booking ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSlot {
    pub id: String,
    pub availability_id: i64,
    /// Booker; `None` for anonymous bookings.
    pub user_id: Option<String>,
    pub booking_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub booking_time: NaiveTime,
    pub duration_minutes: u32,
    pub status: BookingSlotStatus,
    pub subject: String,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Arguments of a guarded booking write.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub availability_id: i64,
    pub user_id: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub subject: String,
    pub duration_minutes: u32,
    pub notes: Option<String>,
    /// Status to insert with: `Confirmed` for direct mode, `Pending` for two-phase.
    pub status: BookingSlotStatus,
}

/// An occupied (profile, date, time) tuple read from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccupiedSlot {
    pub availability_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Whether an option exactly matched a requested time or was offered instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OptionKind {
    ExactMatch,
    Alternative,
}

/// A slot offered to the user to select and confirm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingOption {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub lecturer_name: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub subject: String,
    pub location: String,
    pub duration_minutes: u32,
    pub availability_id: i64,
}

/// Details handed to the notification collaborator after a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDetails {
    pub booking_id: String,
    pub recipient_name: Option<String>,
    pub lecturer_name: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub subject: String,
    pub location: String,
    pub duration_minutes: u32,
}

// --- NLU ---

/// Booking intent of a single message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Intent {
    /// Accepting or confirming a booking.
    #[serde(rename = "A")]
    #[strum(serialize = "A")]
    Accepted,
    /// Checking availability or continuing the conversation.
    #[serde(rename = "C")]
    #[strum(serialize = "C")]
    Checking,
    /// Unrelated to booking, or a rejection.
    #[serde(rename = "O")]
    #[strum(serialize = "O")]
    OutOfScope,
}

/// An ordered time window. Construction guarantees `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    /// Returns `None` unless `start` is strictly before `end`.
    ///
    /// A zero-length window such as "from 9h to 9h" is not an ordered pair
    /// and would offer no slots, so it is dropped like an inverted one.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// True when the half-open window `[start, end)` contains `time`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

impl TryFrom<Vec<String>> for TimeRange {
    type Error = String;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [a, b] => {
                let start = parse_hhmm(a).ok_or_else(|| format!("invalid start `{a}`"))?;
                let end = parse_hhmm(b).ok_or_else(|| format!("invalid end `{b}`"))?;
                TimeRange::new(start, end).ok_or_else(|| "range start must precede end".into())
            }
            _ => Err(format!("time range needs exactly 2 entries, got {}", value.len())),
        }
    }
}

impl From<TimeRange> for Vec<String> {
    fn from(range: TimeRange) -> Self {
        vec![format_hhmm(range.start), format_hhmm(range.end)]
    }
}

/// Structured output of the NLU pipeline for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluResult {
    pub intent: Intent,
    /// 1 = eager acceptance, 99 = clear rejection.
    pub safety_score: u8,
    pub is_rejection: bool,
    pub is_confirmation: bool,
    /// Mention order, duplicates removed.
    #[serde(with = "hhmm_list")]
    pub input_slots: Vec<NaiveTime>,
    pub time_range: Option<TimeRange>,
    pub date: Option<NaiveDate>,
    pub date_expressions: Vec<String>,
    /// Audit only; never shown to the end user.
    pub reasoning: String,
}

impl NluResult {
    /// The result that is always available, whatever happens upstream.
    pub fn safe_default() -> Self {
        Self {
            intent: Intent::OutOfScope,
            safety_score: 50,
            is_rejection: false,
            is_confirmation: false,
            input_slots: Vec::new(),
            time_range: None,
            date: None,
            date_expressions: Vec::new(),
            reasoning: "fallback".to_string(),
        }
    }

    /// Clamps any integer score into the 1..=99 band.
    pub fn clamp_score(raw: i64) -> u8 {
        raw.clamp(1, 99) as u8
    }

    /// True when the message asked about concrete times or a date.
    pub fn mentions_schedule(&self) -> bool {
        !self.input_slots.is_empty() || self.time_range.is_some() || self.date.is_some()
    }
}

/// Which stage of the NLU chain produced a result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NluStage {
    Remote,
    Pattern,
    Fallback,
}

/// Audit record of one analyzed user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingAnalysis {
    pub id: String,
    pub conversation_id: String,
    pub message_id: String,
    pub result: NluResult,
    pub stage: NluStage,
    pub processing_time_ms: u64,
    pub analysis_version: String,
    pub created_at: String,
}

// --- Collaborator payloads ---

/// Moderation outcome for a piece of user text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Verdict {
    Clean,
    Warn,
    Block,
}

/// Verdict plus the collaborator's human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub verdict: Verdict,
    pub reason: Option<String>,
}

impl ModerationVerdict {
    pub fn clean() -> Self {
        Self {
            verdict: Verdict::Clean,
            reason: None,
        }
    }
}

/// One prior turn of the conversation, sent as model context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub content: String,
    pub sender: Sender,
}

/// A single completion request to the language-model collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub system_prompt: Option<String>,
    /// Ordered oldest first.
    pub history: Vec<HistoryEntry>,
    pub message: String,
    /// Ask the model for a bare JSON object.
    pub json_mode: bool,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// The text of a completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub content: String,
    pub model: String,
}
