// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the engine's external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod moderation;
pub mod notification;
pub mod provider;
pub mod storage;

pub use adapter::PluginAdapter;
pub use moderation::ModerationAdapter;
pub use notification::NotificationAdapter;
pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
