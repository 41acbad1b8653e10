// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification adapter trait for booking confirmations.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::BookingDetails;

/// Fire-and-forget delivery of a templated booking confirmation.
///
/// Returns whether the message was handed off. Delivery failure never
/// affects the booking itself.
#[async_trait]
pub trait NotificationAdapter: PluginAdapter {
    async fn send_confirmation(&self, recipient: &str, details: &BookingDetails) -> bool;
}
