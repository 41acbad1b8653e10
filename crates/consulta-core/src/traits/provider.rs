// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for language-model completion services.

use async_trait::async_trait;

use crate::error::ConsultaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for a language-model completion service.
///
/// Used once per NLU attempt (with `json_mode` set) and once per generic
/// chat reply. Callers bound every call with their own timeout.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response text.
    async fn complete(&self, request: ProviderRequest)
    -> Result<ProviderResponse, ConsultaError>;
}
