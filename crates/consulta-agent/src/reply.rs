// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply objects returned to the calling surface, and the fixed texts they carry.

use chrono::{NaiveDate, NaiveTime};
use consulta_core::types::{
    BookingDetails, BookingOption, BookingStatus, NluStage, Verdict, format_hhmm,
};
use serde::Serialize;
use strum::Display;

pub const BUSY_TEXT: &str = "Looks like you are busy or haven't chosen a time slot yet. \
     I'll stop here, you can text back later!";

pub const BLOCKED_TEXT: &str = "Your message has been blocked due to policy violations. \
     Please ensure your messages are appropriate and constructive.";

pub const ALREADY_COMPLETED_TEXT: &str = "Your booking for this conversation is already confirmed. \
     Start a new conversation if you would like to book another consultation.";

pub const CLOSING_TEXT: &str = "Thank you for chatting with us! \
     Feel free to come back any time you want to book a consultation.";

pub const REJECTION_TEXT: &str = "No problem! Let me know whenever another time suits you \
     and I will check the lecturers' availability for you.";

pub const CHAT_APOLOGY_TEXT: &str = "I apologize, but I'm having trouble processing your request \
     right now. Please try again later.";

pub const NO_PROVIDER_TEXT: &str = "I can help you find a time slot that works for you! \
     When would you like to book an appointment?";

pub const BOOKING_FAILED_TEXT: &str = "Unable to Complete Booking\n\n\
     This time slot may have been taken by another student. \
     Please try selecting a different time slot.\n\n\
     Tip: Popular time slots fill up quickly. Consider booking alternative times for better availability.";

/// What produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReplyKind {
    /// At least one requested time is free; options are exact matches.
    ExactMatch,
    /// Nothing matched exactly; options are nearby free slots.
    Alternatives,
    /// No free slot at all.
    NoMatch,
    /// Free-form reply from the language model.
    Chat,
    Rejection,
    /// The user wrapped up the conversation.
    Closing,
    Busy,
    AlreadyCompleted,
    Blocked,
    Booked,
    /// Booking request stored as pending.
    BookingRequested,
    BookingFailed,
}

/// The reply to one inbound message or confirmation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineReply {
    /// `None` only when a blocked first message never created a conversation.
    pub conversation_id: Option<String>,
    pub text: String,
    pub kind: ReplyKind,
    /// Structured options for the surface to render as buttons.
    pub options: Vec<BookingOption>,
    pub booking_status: Option<BookingStatus>,
    pub moderation: Verdict,
    /// Moderation warning included verbatim in `text`.
    pub warning: Option<String>,
    pub is_appropriate: bool,
    pub email_sent: bool,
    pub booking: Option<BookingDetails>,
    /// NLU stage that classified the message, when the pipeline ran.
    pub nlu_stage: Option<NluStage>,
}

impl EngineReply {
    pub(crate) fn new(
        conversation_id: Option<String>,
        kind: ReplyKind,
        text: impl Into<String>,
        booking_status: Option<BookingStatus>,
    ) -> Self {
        Self {
            conversation_id,
            text: text.into(),
            kind,
            options: Vec::new(),
            booking_status,
            moderation: Verdict::Clean,
            warning: None,
            is_appropriate: true,
            email_sent: false,
            booking: None,
            nlu_stage: None,
        }
    }
}

/// A slot the user picked from an offered option.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub availability_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Defaults to the profile's subject.
    pub subject: Option<String>,
    /// Defaults to the profile's slot length.
    pub duration_minutes: Option<u32>,
}

impl From<&BookingOption> for Selection {
    fn from(option: &BookingOption) -> Self {
        Self {
            availability_id: option.availability_id,
            date: option.date,
            time: option.time,
            subject: Some(option.subject.clone()),
            duration_minutes: Some(option.duration_minutes),
        }
    }
}

/// Success text for a direct (confirmed) booking.
pub fn booked_text(details: &BookingDetails, email_sent: bool) -> String {
    let mut text = String::from("Booking Confirmed Successfully!\n\n");
    text.push_str(&appointment_lines(details));
    if email_sent {
        text.push_str("Email Confirmation Sent! Check your inbox for detailed booking information.");
    } else {
        text.push_str("No confirmation email was sent for this booking.");
    }
    text
}

/// Acknowledgement for a two-phase booking held as pending.
pub fn requested_text(details: &BookingDetails, email_sent: bool) -> String {
    let mut text = String::from("Booking Request Received!\n\n");
    text.push_str(&appointment_lines(details));
    text.push_str("The lecturer will confirm this request shortly.");
    if email_sent {
        text.push_str(" We have emailed you the request details.");
    }
    text
}

fn appointment_lines(details: &BookingDetails) -> String {
    format!(
        "Your Appointment Details:\n\
         Lecturer: {}\n\
         Date: {}\n\
         Time: {}\n\
         Subject: {}\n\
         Location: {}\n\
         Duration: {} minutes\n\n",
        details.lecturer_name,
        details.date,
        format_hhmm(details.time),
        details.subject,
        details.location,
        details.duration_minutes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use consulta_core::types::OptionKind;

    fn details() -> BookingDetails {
        BookingDetails {
            booking_id: "b1".into(),
            recipient_name: None,
            lecturer_name: "Dr. Lan".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 27).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            subject: "Career planning".into(),
            location: "Room 101".into(),
            duration_minutes: 30,
        }
    }

    #[test]
    fn booked_text_lists_every_detail() {
        let text = booked_text(&details(), true);
        for needle in [
            "Dr. Lan",
            "2025-01-27",
            "09:00",
            "Career planning",
            "Room 101",
            "30 minutes",
            "Email Confirmation Sent",
        ] {
            assert!(text.contains(needle), "missing {needle} in {text}");
        }
        assert!(!booked_text(&details(), false).contains("Email Confirmation Sent"));
    }

    #[test]
    fn requested_text_uses_request_wording() {
        let text = requested_text(&details(), false);
        assert!(text.starts_with("Booking Request Received"));
        assert!(!text.contains("Confirmed Successfully"));
    }

    #[test]
    fn selection_copies_the_option() {
        let option = BookingOption {
            kind: OptionKind::Alternative,
            lecturer_name: "Dr. Lan".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 27).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            subject: "General".into(),
            location: "TBD".into(),
            duration_minutes: 45,
            availability_id: 7,
        };
        let selection = Selection::from(&option);
        assert_eq!(selection.availability_id, 7);
        assert_eq!(selection.duration_minutes, Some(45));
        assert_eq!(selection.subject.as_deref(), Some("General"));
    }

    #[test]
    fn reply_kind_serializes_snake_case() {
        assert_eq!(ReplyKind::ExactMatch.to_string(), "exact_match");
        assert_eq!(ReplyKind::BookingFailed.to_string(), "booking_failed");
    }
}
