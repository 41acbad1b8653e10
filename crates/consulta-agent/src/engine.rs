// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The booking engine: one inbound message or one confirmation in, one reply out.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use consulta_config::model::{
    BookingConfig, ConfirmationMode, ConsultaConfig, ConversationConfig,
};
use consulta_core::ConsultaError;
use consulta_core::traits::{ModerationAdapter, NotificationAdapter, ProviderAdapter};
use consulta_core::types::{
    AvailabilityProfile, BookingAnalysis, BookingDetails, BookingRequest, BookingSlotStatus,
    BookingStatus, Conversation, HistoryEntry, Intent, Message, ModerationVerdict, NluResult,
    Sender, UserIdentity, Verdict, format_hhmm, weekday_index,
};
use consulta_nlu::{ANALYSIS_VERSION, NluOutcome, NluPipeline};
use consulta_schedule::{
    Occupancy, default_target_date, find_alternatives, find_exact, generate_slots,
};
use consulta_storage::{SqliteStorage, now_timestamp};
use tracing::{debug, info, warn};

use crate::chat::ChatResponder;
use crate::composer::{Composed, compose};
use crate::reply::{
    ALREADY_COMPLETED_TEXT, BLOCKED_TEXT, BOOKING_FAILED_TEXT, BUSY_TEXT, CLOSING_TEXT,
    EngineReply, REJECTION_TEXT, ReplyKind, Selection, booked_text, requested_text,
};
use crate::state::{self, Gate};

const DEFAULT_WARNING: &str = "Please keep the conversation respectful and constructive.";

/// Coordinates moderation, the NLU pipeline, slot matching and the booking
/// ledger for every conversation.
///
/// Holds no per-conversation state in memory; everything lives in storage,
/// so one engine serves any number of conversations.
pub struct BookingEngine {
    storage: Arc<SqliteStorage>,
    nlu: NluPipeline,
    chat: ChatResponder,
    moderation: Option<Arc<dyn ModerationAdapter>>,
    notifier: Option<Arc<dyn NotificationAdapter>>,
    moderation_timeout: Duration,
    conversation: ConversationConfig,
    booking: BookingConfig,
    today: Option<NaiveDate>,
}

impl BookingEngine {
    /// Creates an engine. Without a provider the NLU pipeline is pattern-only
    /// and chat replies use a fixed prompt.
    pub fn new(
        config: &ConsultaConfig,
        storage: Arc<SqliteStorage>,
        provider: Option<Arc<dyn ProviderAdapter>>,
    ) -> Self {
        info!(
            agent_name = config.agent.name.as_str(),
            remote_nlu = provider.is_some() && config.nlu.remote_enabled,
            confirmation_mode = ?config.booking.confirmation_mode,
            "booking engine initialized"
        );
        Self {
            storage,
            nlu: NluPipeline::from_config(&config.nlu, provider.clone()),
            chat: ChatResponder::new(provider, Duration::from_secs(config.gemini.timeout_secs)),
            moderation: None,
            notifier: None,
            moderation_timeout: Duration::from_secs(config.moderation.timeout_secs),
            conversation: config.conversation.clone(),
            booking: config.booking.clone(),
            today: None,
        }
    }

    pub fn with_moderation(mut self, moderation: Arc<dyn ModerationAdapter>) -> Self {
        self.moderation = Some(moderation);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationAdapter>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Pin the date relative expressions resolve against. Defaults to the
    /// local calendar date at call time.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Process one user message.
    ///
    /// `conversation_id = None` starts a new conversation. Fails only for an
    /// unknown conversation, a conversation owned by someone else, or a
    /// storage error; everything else is a natural-language reply.
    pub async fn handle_message(
        &self,
        conversation_id: Option<&str>,
        user: Option<&UserIdentity>,
        text: &str,
        context: &str,
    ) -> Result<EngineReply, ConsultaError> {
        let existing = match conversation_id {
            Some(id) => Some(self.load_conversation(id, user).await?),
            None => None,
        };

        let moderation = self.moderate(text).await;
        if moderation.verdict == Verdict::Block {
            return self.blocked(existing.as_ref(), text, moderation).await;
        }

        let conversation = match existing {
            Some(conversation) => conversation,
            None => self.start_conversation(user, context).await?,
        };
        let id = conversation.id.clone();

        match state::gate(&conversation, self.conversation.max_bot_responses) {
            Gate::Proceed => {}
            Gate::AlreadyCompleted => {
                debug!(conversation_id = %id, "message on a completed conversation");
                return Ok(EngineReply::new(
                    Some(id),
                    ReplyKind::AlreadyCompleted,
                    ALREADY_COMPLETED_TEXT,
                    Some(BookingStatus::Completed),
                ));
            }
            Gate::Busy { abandon } => {
                if abandon && self.storage.transition_status(&id, BookingStatus::Abandoned).await? {
                    info!(
                        conversation_id = %id,
                        bot_responses = conversation.bot_response_count,
                        "conversation abandoned"
                    );
                }
                return Ok(busy_reply(id));
            }
        }

        let user_message = new_message(&id, text, Sender::User, true);
        self.storage.insert_message(&user_message).await?;
        let history = self.history(&id, &user_message.id).await?;

        let today = self.today();
        let outcome = self.nlu.analyze(text, &history, today).await;
        self.record_analysis(&id, &user_message.id, &outcome).await?;

        let mut reply = self
            .route(&conversation, &outcome.result, text, &history, today)
            .await?;
        reply.nlu_stage = Some(outcome.stage);

        if moderation.verdict == Verdict::Warn {
            let warning = moderation
                .reason
                .clone()
                .unwrap_or_else(|| DEFAULT_WARNING.to_string());
            reply.text = format!("{warning}\n\n{}", reply.text);
            reply.warning = Some(warning);
            reply.moderation = Verdict::Warn;
        }

        self.storage
            .insert_message(&new_message(&id, &reply.text, Sender::Bot, true))
            .await?;
        let count = self.storage.increment_bot_response_count(&id).await?;
        debug!(conversation_id = %id, kind = %reply.kind, bot_responses = count, "reply stored");
        self.maybe_set_title(&conversation).await?;

        Ok(reply)
    }

    /// Book a slot the user picked from the offered options.
    ///
    /// Bypasses the NLU pipeline. A slot that was taken meanwhile, or is not
    /// a slot of the profile on that date, gets the failure reply and the
    /// conversation stays `ongoing`.
    pub async fn confirm(
        &self,
        conversation_id: &str,
        user: Option<&UserIdentity>,
        selection: &Selection,
    ) -> Result<EngineReply, ConsultaError> {
        let conversation = self.load_conversation(conversation_id, user).await?;
        let id = conversation.id.clone();
        match conversation.booking_status {
            BookingStatus::Ongoing => {}
            BookingStatus::Completed => {
                return Ok(EngineReply::new(
                    Some(id),
                    ReplyKind::AlreadyCompleted,
                    ALREADY_COMPLETED_TEXT,
                    Some(BookingStatus::Completed),
                ));
            }
            BookingStatus::Abandoned => return Ok(busy_reply(id)),
        }
        // An option from the last allowed reply may still be confirmed once;
        // a failure past the ceiling ends the conversation.
        if conversation.bot_response_count > self.conversation.max_bot_responses {
            if self.storage.transition_status(&id, BookingStatus::Abandoned).await? {
                info!(
                    conversation_id = %id,
                    bot_responses = conversation.bot_response_count,
                    "conversation abandoned"
                );
            }
            return Ok(busy_reply(id));
        }

        let profile = self
            .storage
            .get_profile(selection.availability_id)
            .await?
            .ok_or(ConsultaError::ProfileNotFound(selection.availability_id))?;

        if !offers_slot(&profile, selection, self.today()) {
            warn!(
                conversation_id = %id,
                availability_id = profile.id,
                date = %selection.date,
                time = %format_hhmm(selection.time),
                "selection is not a bookable slot"
            );
            return self.booking_failed(&id).await;
        }

        let status = match self.booking.confirmation_mode {
            ConfirmationMode::Direct => BookingSlotStatus::Confirmed,
            ConfirmationMode::TwoPhase => BookingSlotStatus::Pending,
        };
        let subject = selection
            .subject
            .clone()
            .unwrap_or_else(|| profile.subject_or_default().to_string());
        let duration_minutes = selection
            .duration_minutes
            .or(profile.slot_duration_minutes)
            .unwrap_or(self.booking.default_duration_minutes);
        let request = BookingRequest {
            availability_id: profile.id,
            user_id: user.map(|u| u.id.clone()),
            date: selection.date,
            time: selection.time,
            subject: subject.clone(),
            duration_minutes,
            notes: None,
            status,
        };

        let outcome = match self.storage.create_booking(&request).await {
            Ok(outcome) => outcome,
            Err(e @ (ConsultaError::SlotTaken { .. } | ConsultaError::SlotUnavailable { .. })) => {
                info!(conversation_id = %id, error = %e, "booking rejected");
                return self.booking_failed(&id).await;
            }
            Err(e) => return Err(e),
        };

        if self
            .storage
            .transition_status(&id, BookingStatus::Completed)
            .await?
        {
            info!(conversation_id = %id, booking_id = %outcome.slot.id, "conversation completed");
        }

        let details = BookingDetails {
            booking_id: outcome.slot.id.clone(),
            recipient_name: user.and_then(|u| u.display_name.clone()),
            lecturer_name: profile.lecturer_name.clone(),
            date: selection.date,
            time: selection.time,
            subject,
            location: profile.location_or_default().to_string(),
            duration_minutes,
        };
        let email_sent = self.notify(user, &details).await;

        let (kind, text) = match status {
            BookingSlotStatus::Pending => {
                (ReplyKind::BookingRequested, requested_text(&details, email_sent))
            }
            _ => (ReplyKind::Booked, booked_text(&details, email_sent)),
        };
        self.storage
            .insert_message(&new_message(&id, &text, Sender::Bot, true))
            .await?;
        self.storage.increment_bot_response_count(&id).await?;

        let mut reply = EngineReply::new(Some(id), kind, text, Some(BookingStatus::Completed));
        reply.email_sent = email_sent;
        reply.booking = Some(details);
        Ok(reply)
    }

    async fn load_conversation(
        &self,
        id: &str,
        user: Option<&UserIdentity>,
    ) -> Result<Conversation, ConsultaError> {
        let conversation = self
            .storage
            .get_conversation(id)
            .await?
            .ok_or_else(|| ConsultaError::ConversationNotFound(id.to_string()))?;
        check_access(&conversation, user)?;
        Ok(conversation)
    }

    async fn start_conversation(
        &self,
        user: Option<&UserIdentity>,
        context: &str,
    ) -> Result<Conversation, ConsultaError> {
        let now = now_timestamp();
        let conversation = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.map(|u| u.id.clone()),
            title: None,
            context: context.to_string(),
            bot_response_count: 0,
            booking_status: BookingStatus::Ongoing,
            created_at: now.clone(),
            updated_at: now,
        };
        self.storage.create_conversation(&conversation).await?;
        info!(conversation_id = %conversation.id, context, "conversation created");
        Ok(conversation)
    }

    /// Moderation fails open: errors and timeouts count as clean.
    async fn moderate(&self, text: &str) -> ModerationVerdict {
        let Some(moderation) = &self.moderation else {
            return ModerationVerdict::clean();
        };
        match tokio::time::timeout(self.moderation_timeout, moderation.moderate(text)).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                warn!(error = %e, "moderation failed, allowing message");
                ModerationVerdict::clean()
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.moderation_timeout.as_secs(),
                    "moderation timed out, allowing message"
                );
                ModerationVerdict::clean()
            }
        }
    }

    /// Record the blocked attempt on an existing conversation and nothing else.
    async fn blocked(
        &self,
        conversation: Option<&Conversation>,
        text: &str,
        moderation: ModerationVerdict,
    ) -> Result<EngineReply, ConsultaError> {
        if let Some(conversation) = conversation {
            self.storage
                .insert_message(&new_message(&conversation.id, text, Sender::User, false))
                .await?;
        }
        warn!(
            conversation_id = conversation.map(|c| c.id.as_str()).unwrap_or("-"),
            reason = moderation.reason.as_deref().unwrap_or("-"),
            "message blocked by moderation"
        );
        let mut reply = EngineReply::new(
            conversation.map(|c| c.id.clone()),
            ReplyKind::Blocked,
            BLOCKED_TEXT,
            conversation.map(|c| c.booking_status),
        );
        reply.moderation = Verdict::Block;
        reply.is_appropriate = false;
        reply.warning = moderation.reason;
        Ok(reply)
    }

    /// Prior appropriate turns, oldest first, excluding `current_id`.
    async fn history(
        &self,
        conversation_id: &str,
        current_id: &str,
    ) -> Result<Vec<HistoryEntry>, ConsultaError> {
        let limit = self.conversation.history_limit as usize;
        let messages = self
            .storage
            .get_messages(conversation_id, Some(self.conversation.history_limit + 1))
            .await?;
        let mut history: Vec<HistoryEntry> = messages
            .into_iter()
            .filter(|m| m.id != current_id && m.is_appropriate)
            .map(|m| HistoryEntry {
                content: m.content,
                sender: m.sender,
            })
            .collect();
        if history.len() > limit {
            history.drain(..history.len() - limit);
        }
        Ok(history)
    }

    async fn record_analysis(
        &self,
        conversation_id: &str,
        message_id: &str,
        outcome: &NluOutcome,
    ) -> Result<(), ConsultaError> {
        let analysis = BookingAnalysis {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            message_id: message_id.to_string(),
            result: outcome.result.clone(),
            stage: outcome.stage,
            processing_time_ms: outcome.elapsed.as_millis() as u64,
            analysis_version: ANALYSIS_VERSION.to_string(),
            created_at: now_timestamp(),
        };
        self.storage.insert_analysis(&analysis).await
    }

    async fn route(
        &self,
        conversation: &Conversation,
        result: &NluResult,
        text: &str,
        history: &[HistoryEntry],
        today: NaiveDate,
    ) -> Result<EngineReply, ConsultaError> {
        let id = conversation.id.clone();

        let names_times = !result.input_slots.is_empty() || result.time_range.is_some();
        if !names_times && state::is_completion_phrase(text, &self.conversation.completion_keywords)
        {
            if self
                .storage
                .transition_status(&id, BookingStatus::Completed)
                .await?
            {
                info!(conversation_id = %id, "conversation completed by the user");
            }
            return Ok(EngineReply::new(
                Some(id),
                ReplyKind::Closing,
                CLOSING_TEXT,
                Some(BookingStatus::Completed),
            ));
        }

        if result.intent == Intent::OutOfScope && result.is_rejection {
            return Ok(EngineReply::new(
                Some(id),
                ReplyKind::Rejection,
                REJECTION_TEXT,
                Some(BookingStatus::Ongoing),
            ));
        }

        if result.intent == Intent::OutOfScope || !result.mentions_schedule() {
            let text = self.chat.reply(&conversation.context, history, text).await;
            return Ok(EngineReply::new(
                Some(id),
                ReplyKind::Chat,
                text,
                Some(BookingStatus::Ongoing),
            ));
        }

        let composed = self.match_slots(result, today).await?;
        let mut reply = EngineReply::new(
            Some(id),
            composed.kind,
            composed.text,
            Some(BookingStatus::Ongoing),
        );
        reply.options = composed.options;
        Ok(reply)
    }

    /// Exact matches for the requested times, else alternatives within the
    /// requested range (or the whole day).
    async fn match_slots(
        &self,
        result: &NluResult,
        today: NaiveDate,
    ) -> Result<Composed, ConsultaError> {
        let date = result.date.unwrap_or_else(|| default_target_date(today));
        let profiles = self
            .storage
            .list_profiles_for_day(weekday_index(date))
            .await?;
        let occupancy: Occupancy = self.storage.occupied_slots(date).await?.into_iter().collect();

        let exact = find_exact(&profiles, &occupancy, &result.input_slots, date);
        let alternatives = if exact.is_empty() {
            find_alternatives(
                &profiles,
                &occupancy,
                result.time_range,
                date,
                self.booking.alternatives_limit,
            )
        } else {
            Vec::new()
        };
        debug!(
            date = %date,
            profiles = profiles.len(),
            occupied = occupancy.len(),
            exact = exact.len(),
            alternatives = alternatives.len(),
            "slot matching finished"
        );
        Ok(compose(exact, alternatives, self.booking.max_options))
    }

    async fn maybe_set_title(&self, conversation: &Conversation) -> Result<(), ConsultaError> {
        if conversation.title.is_some() {
            return Ok(());
        }
        let users = self
            .storage
            .count_messages_by_sender(&conversation.id, Sender::User)
            .await?;
        let bots = self
            .storage
            .count_messages_by_sender(&conversation.id, Sender::Bot)
            .await?;
        if !state::needs_title(conversation, users, bots) {
            return Ok(());
        }
        if let Some(first) = self.storage.first_user_message(&conversation.id).await? {
            let title = state::derive_title(&first.content, self.conversation.title_max_chars);
            if self.storage.set_title_if_absent(&conversation.id, &title).await? {
                debug!(conversation_id = %conversation.id, "conversation titled");
            }
        }
        Ok(())
    }

    /// Only bookers with an email address are notified.
    async fn notify(&self, user: Option<&UserIdentity>, details: &BookingDetails) -> bool {
        let Some(notifier) = &self.notifier else {
            return false;
        };
        let Some(email) = user.and_then(|u| u.email.as_deref()) else {
            debug!(booking_id = %details.booking_id, "no email address, skipping confirmation");
            return false;
        };
        let sent = notifier.send_confirmation(email, details).await;
        if !sent {
            warn!(booking_id = %details.booking_id, "confirmation email was not sent");
        }
        sent
    }

    async fn booking_failed(&self, conversation_id: &str) -> Result<EngineReply, ConsultaError> {
        self.storage
            .insert_message(&new_message(
                conversation_id,
                BOOKING_FAILED_TEXT,
                Sender::Bot,
                true,
            ))
            .await?;
        let count = self
            .storage
            .increment_bot_response_count(conversation_id)
            .await?;
        debug!(conversation_id, bot_responses = count, "booking failure reply stored");
        Ok(EngineReply::new(
            Some(conversation_id.to_string()),
            ReplyKind::BookingFailed,
            BOOKING_FAILED_TEXT,
            Some(BookingStatus::Ongoing),
        ))
    }
}

fn busy_reply(conversation_id: String) -> EngineReply {
    EngineReply::new(
        Some(conversation_id),
        ReplyKind::Busy,
        BUSY_TEXT,
        Some(BookingStatus::Abandoned),
    )
}

fn new_message(conversation_id: &str, content: &str, sender: Sender, is_appropriate: bool) -> Message {
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        conversation_id: conversation_id.to_string(),
        content: content.to_string(),
        sender,
        is_appropriate,
        created_at: now_timestamp(),
    }
}

/// Anonymous conversations are open to whoever holds the id; owned ones only
/// to their owner.
fn check_access(conversation: &Conversation, user: Option<&UserIdentity>) -> Result<(), ConsultaError> {
    match &conversation.user_id {
        Some(owner) if user.is_none_or(|u| &u.id != owner) => Err(ConsultaError::AccessDenied {
            conversation_id: conversation.id.clone(),
        }),
        _ => Ok(()),
    }
}

/// Whether `selection` is a slot `profile` offers on its date, ignoring
/// blocked dates. The ledger write rejects blocked dates as taken.
fn offers_slot(profile: &AvailabilityProfile, selection: &Selection, today: NaiveDate) -> bool {
    if !profile.is_active || selection.date < today {
        return false;
    }
    let unblocked = AvailabilityProfile {
        blocked_dates: Vec::new(),
        ..profile.clone()
    };
    generate_slots(&unblocked, selection.date).any(|slot| slot == selection.time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use consulta_test_utils::{MockModeration, TestHarness, profile};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 27).unwrap()
    }

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 22).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn user(id: &str) -> UserIdentity {
        UserIdentity {
            id: id.into(),
            email: None,
            display_name: None,
        }
    }

    fn conversation(owner: Option<&str>) -> Conversation {
        Conversation {
            id: "c1".into(),
            user_id: owner.map(String::from),
            title: None,
            context: "consultant".into(),
            bot_response_count: 0,
            booking_status: BookingStatus::Ongoing,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn selection(time: NaiveTime, date: NaiveDate) -> Selection {
        Selection {
            availability_id: 1,
            date,
            time,
            subject: None,
            duration_minutes: None,
        }
    }

    #[test]
    fn owned_conversations_are_private() {
        let owned = conversation(Some("u1"));
        assert!(check_access(&owned, Some(&user("u1"))).is_ok());
        assert!(matches!(
            check_access(&owned, Some(&user("u2"))),
            Err(ConsultaError::AccessDenied { .. })
        ));
        assert!(check_access(&owned, None).is_err());
        assert!(check_access(&conversation(None), Some(&user("u2"))).is_ok());
    }

    #[test]
    fn selection_must_sit_on_the_slot_grid() {
        let mut p = profile("Dr. Lan", 0, "09:00", "11:00");
        p.id = 1;
        assert!(offers_slot(&p, &selection(at(9, 30), monday()), wednesday()));
        assert!(!offers_slot(&p, &selection(at(9, 15), monday()), wednesday()));
        assert!(!offers_slot(&p, &selection(at(11, 0), monday()), wednesday()));
        // Wrong weekday.
        let tuesday = NaiveDate::from_ymd_opt(2025, 1, 28).unwrap();
        assert!(!offers_slot(&p, &selection(at(9, 0), tuesday), wednesday()));
        // In the past.
        assert!(!offers_slot(&p, &selection(at(9, 0), monday()), monday().succ_opt().unwrap()));
    }

    #[test]
    fn blocked_dates_do_not_hide_grid_slots() {
        let mut p = profile("Dr. Lan", 0, "09:00", "11:00");
        p.blocked_dates = vec![monday()];
        assert!(offers_slot(&p, &selection(at(9, 0), monday()), wednesday()));
        p.is_active = false;
        assert!(!offers_slot(&p, &selection(at(9, 0), monday()), wednesday()));
    }

    #[tokio::test]
    async fn history_skips_current_and_blocked_messages() {
        let harness = TestHarness::builder().build().await.unwrap();
        let mut config = harness.config.clone();
        config.conversation.history_limit = 2;
        let engine = BookingEngine::new(&config, harness.storage.clone(), None);

        let c = conversation(None);
        harness.storage.create_conversation(&c).await.unwrap();
        for (text, sender, ok) in [
            ("first", Sender::User, true),
            ("reply", Sender::Bot, true),
            ("rude", Sender::User, false),
            ("second", Sender::User, true),
        ] {
            harness
                .storage
                .insert_message(&new_message("c1", text, sender, ok))
                .await
                .unwrap();
        }
        let current = new_message("c1", "now", Sender::User, true);
        harness.storage.insert_message(&current).await.unwrap();

        let history = engine.history("c1", &current.id).await.unwrap();
        let contents: Vec<_> = history.iter().map(|h| h.content.as_str()).collect();
        assert_eq!(contents, vec!["second"]);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn moderation_errors_fail_open() {
        let harness = TestHarness::builder().build().await.unwrap();
        let engine = BookingEngine::new(&harness.config, harness.storage.clone(), None)
            .with_moderation(Arc::new(MockModeration::failing()));
        assert_eq!(engine.moderate("hello").await.verdict, Verdict::Clean);
        assert!(logs_contain("moderation failed, allowing message"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_moderation_fails_open() {
        let harness = TestHarness::builder().build().await.unwrap();
        let slow = MockModeration::blocking("nope").with_delay(Duration::from_secs(60));
        let engine = BookingEngine::new(&harness.config, harness.storage.clone(), None)
            .with_moderation(Arc::new(slow));
        assert_eq!(engine.moderate("hello").await.verdict, Verdict::Clean);
    }
}
