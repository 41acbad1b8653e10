// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moderation adapter trait.

use async_trait::async_trait;

use crate::error::ConsultaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ModerationVerdict;

/// Scores user text before the engine processes it.
#[async_trait]
pub trait ModerationAdapter: PluginAdapter {
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, ConsultaError>;
}
