// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Consulta booking engine.
//!
//! This crate provides the error taxonomy, the domain records shared by every
//! other crate (conversations, availability profiles, booking slots, NLU
//! results), and the adapter traits through which the engine talks to its
//! external collaborators.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ConsultaError;
pub use types::{AdapterType, HealthStatus};

// Re-export all adapter traits at crate root.
pub use traits::{
    ModerationAdapter, NotificationAdapter, PluginAdapter, ProviderAdapter, StorageAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_taken_error_names_the_slot() {
        let err = ConsultaError::SlotTaken {
            availability_id: 7,
            date: "2025-01-27".into(),
            time: "09:00".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2025-01-27"), "got: {msg}");
        assert!(msg.contains("09:00"), "got: {msg}");
        assert!(err.is_slot_taken());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Provider,
            AdapterType::Storage,
            AdapterType::Moderation,
            AdapterType::Notification,
        ] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_moderation_adapter<T: ModerationAdapter>() {}
        fn _assert_notification_adapter<T: NotificationAdapter>() {}
    }
}
