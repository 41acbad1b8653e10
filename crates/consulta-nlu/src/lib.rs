// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Natural-language understanding for booking conversations.
//!
//! [`NluPipeline`] turns one free-text message into an
//! [`NluResult`](consulta_core::types::NluResult): a remote language-model
//! classification first, deterministic pattern extraction when that fails,
//! and a fixed safe default when even the patterns refuse the input.

pub mod date;
pub mod patterns;
pub mod pipeline;
pub mod remote;
pub mod time;

pub use patterns::PatternAnalyzer;
pub use pipeline::{NluOutcome, NluPipeline};
pub use remote::RemoteAnalyzer;

/// Version tag stored with every booking analysis.
pub const ANALYSIS_VERSION: &str = "1";

/// Cut `text` to at most `max` characters.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("đặt lịch", 3), "đặt");
        assert_eq!(truncate_chars("ok", 10), "ok");
    }
}
