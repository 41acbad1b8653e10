// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-model classification stage.
//!
//! One structured completion per message. The model's JSON is mapped at
//! this boundary into a fixed [`NluResult`]; anything the contract does not
//! allow is either repaired field by field or fails the stage as a whole.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use consulta_core::ConsultaError;
use consulta_core::traits::ProviderAdapter;
use consulta_core::types::{HistoryEntry, Intent, NluResult, ProviderRequest, TimeRange};
use serde::Deserialize;
use tracing::debug;

use crate::time::normalize_time;

const CLASSIFY_PROMPT: &str = r#"You analyze messages in a chat where visitors book consultation appointments with lecturers. Messages may be in Vietnamese or English.

Today is {today} ({weekday}).

Classify the latest user message, using the conversation so far as context:
- "A": the user accepts or confirms a time, or asks to book a specific time.
- "C": the user is checking availability, comparing options, or needs more information.
- "O": unrelated to booking, or a refusal.

safety_score runs from 1 (eager to book) to 99 (clear refusal); 50 is neutral.

Extract only times the user states explicitly. Write times as 24-hour "HH:MM" and dates as "YYYY-MM-DD", resolving words like "tomorrow", "thứ 2" or "next week" against today. A "from X to Y" phrase is a time_range of exactly two entries and its endpoints are not input_slots.

Reply with one JSON object and nothing else:
{"intent": "A|C|O", "safety_score": 1-99, "is_rejection": bool, "is_confirmation": bool, "input_slots": ["HH:MM"], "time_range": [] or ["HH:MM", "HH:MM"], "date": "YYYY-MM-DD" or null, "date_expressions": ["..."], "reasoning": "one or two short sentences"}"#;

/// Raw model output. Every field is optional; validation decides what survives.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    intent: Option<String>,
    safety_score: Option<f64>,
    #[serde(default)]
    is_rejection: bool,
    #[serde(default)]
    is_confirmation: bool,
    #[serde(default)]
    input_slots: Vec<String>,
    #[serde(default)]
    time_range: Option<Vec<String>>,
    date: Option<String>,
    #[serde(default)]
    date_expressions: Vec<String>,
    #[serde(default)]
    reasoning: String,
}

fn stage_error(message: impl Into<String>) -> ConsultaError {
    ConsultaError::Provider {
        message: message.into(),
        source: None,
    }
}

/// Take the outermost `{...}` of a response, tolerating Markdown fences and chatter.
fn json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

/// Map a model reply onto an [`NluResult`].
///
/// An unknown intent or unparseable JSON is an error. Scores are clamped,
/// times re-normalized with invalid entries dropped, a range kept only as an
/// ordered pair, a bad date nulled, and the reasoning truncated.
pub fn parse_remote_response(
    response: &str,
    reasoning_max_chars: usize,
) -> Result<NluResult, ConsultaError> {
    let json = json_object(response).ok_or_else(|| stage_error("no JSON object in reply"))?;
    let raw: RawAnalysis = serde_json::from_str(json).map_err(|e| ConsultaError::Provider {
        message: "malformed analysis JSON".into(),
        source: Some(Box::new(e)),
    })?;

    let intent = match raw.intent.as_deref().map(str::trim) {
        Some(code) => code
            .to_ascii_uppercase()
            .parse::<Intent>()
            .map_err(|_| stage_error(format!("unknown intent `{code}`")))?,
        None => return Err(stage_error("missing intent")),
    };

    let mut input_slots = Vec::new();
    for slot in raw.input_slots.iter().filter_map(|s| normalize_time(s)) {
        if !input_slots.contains(&slot) {
            input_slots.push(slot);
        }
    }

    let time_range = match raw.time_range.as_deref() {
        Some([a, b]) => normalize_time(a)
            .zip(normalize_time(b))
            .and_then(|(start, end)| TimeRange::new(start, end)),
        _ => None,
    };

    let date = raw
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

    let score = raw.safety_score.map(|s| s.round() as i64).unwrap_or(50);

    Ok(NluResult {
        intent,
        safety_score: NluResult::clamp_score(score),
        is_rejection: raw.is_rejection,
        is_confirmation: raw.is_confirmation,
        input_slots,
        time_range,
        date,
        date_expressions: raw.date_expressions,
        reasoning: crate::truncate_chars(raw.reasoning.trim(), reasoning_max_chars),
    })
}

/// Remote classifier over any [`ProviderAdapter`].
pub struct RemoteAnalyzer {
    provider: Arc<dyn ProviderAdapter>,
    timeout: Duration,
    reasoning_max_chars: usize,
}

impl RemoteAnalyzer {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        timeout: Duration,
        reasoning_max_chars: usize,
    ) -> Self {
        Self {
            provider,
            timeout,
            reasoning_max_chars,
        }
    }

    fn system_prompt(today: NaiveDate) -> String {
        CLASSIFY_PROMPT
            .replace("{today}", &today.to_string())
            .replace("{weekday}", &today.format("%A").to_string())
    }

    /// Classify `text`. Transport failure, timeout and contract violations all
    /// come back as errors for the pipeline to fall through on.
    pub async fn analyze(
        &self,
        text: &str,
        history: &[HistoryEntry],
        today: NaiveDate,
    ) -> Result<NluResult, ConsultaError> {
        let request = ProviderRequest {
            system_prompt: Some(Self::system_prompt(today)),
            history: history.to_vec(),
            message: text.to_string(),
            json_mode: true,
            max_output_tokens: None,
            temperature: None,
        };

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| ConsultaError::Timeout {
                duration: self.timeout,
            })??;
        debug!(model = %response.model, "remote classification received");
        parse_remote_response(&response.content, self.reasoning_max_chars)
    }
}
