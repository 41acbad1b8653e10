// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns matcher output into one of three reply shapes.
//!
//! Exact matches stay out of the text; the surface renders them from the
//! structured options. Alternatives are also listed inline so a plain-text
//! surface can show them.

use consulta_core::types::{BookingOption, format_hhmm};

use crate::reply::ReplyKind;

const EXACT_TEXT: &str = "Great news, I found a matching time slot!\n\
     Please select one of the options below.";

const NO_EXACT_HEADER: &str = "Nothing matched your requested time exactly.\n\
     However, I found some slots close to what you asked for:\n\n";

const ALTERNATIVES_CTA: &str = "Pick the slot you want to book!";

const NO_MATCH_TEXT: &str = "Sorry, no lecturer is free at the time you asked for.\n\
     You could:\n\
     - try another time (for example Monday morning or Tuesday afternoon)\n\
     - ask which slots are still free\n\
     - book for next week\n\n\
     Let me know another time that works for you!";

/// A composed reply body.
#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    pub kind: ReplyKind,
    pub text: String,
    pub options: Vec<BookingOption>,
}

/// Exact matches win; alternatives are used only when there are none.
/// Both lists are capped at `max_options`.
pub fn compose(
    mut exact: Vec<BookingOption>,
    mut alternatives: Vec<BookingOption>,
    max_options: usize,
) -> Composed {
    if !exact.is_empty() {
        exact.truncate(max_options);
        return Composed {
            kind: ReplyKind::ExactMatch,
            text: EXACT_TEXT.to_string(),
            options: exact,
        };
    }

    if !alternatives.is_empty() {
        alternatives.truncate(max_options);
        let mut text = String::from(NO_EXACT_HEADER);
        for (i, opt) in alternatives.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} - {}\n   {} | {} | {} min\n   {}\n\n",
                i + 1,
                format_hhmm(opt.time),
                opt.lecturer_name,
                opt.subject,
                opt.location,
                opt.duration_minutes,
                opt.date,
            ));
        }
        text.push_str(ALTERNATIVES_CTA);
        return Composed {
            kind: ReplyKind::Alternatives,
            text,
            options: alternatives,
        };
    }

    Composed {
        kind: ReplyKind::NoMatch,
        text: NO_MATCH_TEXT.to_string(),
        options: Vec::new(),
    }
}
