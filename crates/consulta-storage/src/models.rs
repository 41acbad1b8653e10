// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical records live in `consulta-core::types`; this module
//! re-exports them and adds the few shapes only the storage layer returns.

pub use consulta_core::types::{
    AvailabilityProfile, BookingAnalysis, BookingRequest, BookingSlot, BookingSlotStatus,
    BookingStatus, Conversation, Message, OccupiedSlot, Sender,
};

/// Result of a successful guarded booking write.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingOutcome {
    /// The inserted ledger row.
    pub slot: BookingSlot,
    /// True when this booking filled the day and the date was appended to
    /// the profile's blocked dates.
    pub day_blocked: bool,
}
