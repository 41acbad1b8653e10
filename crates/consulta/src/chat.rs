// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `consulta chat` command implementation.
//!
//! Launches an interactive REPL with a colored prompt and readline history.
//! Every line goes through the booking engine; offered slots are numbered so
//! `/book N` can confirm one. `/new` starts a fresh conversation.

use colored::Colorize;
use consulta_agent::{BookingEngine, EngineReply, ReplyKind, Selection};
use consulta_config::model::ConsultaConfig;
use consulta_core::ConsultaError;
use consulta_core::StorageAdapter;
use consulta_core::types::{BookingOption, UserIdentity};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Empty,
    Quit,
    New,
    /// 1-based option number.
    Book(usize),
    Message(&'a str),
    Invalid(String),
}

pub fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Message(trimmed);
    };
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("quit" | "exit"), None, None) => Input::Quit,
        (Some("new"), None, None) => Input::New,
        (Some("book"), Some(n), None) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::Book(n),
            _ => Input::Invalid(format!("`{n}` is not an option number")),
        },
        (Some("book"), None, None) => Input::Invalid("usage: /book N".into()),
        _ => Input::Invalid(format!("unknown command `{trimmed}`")),
    }
}

/// The identity to chat as. An email alone books as that address.
pub fn identity(user: Option<String>, email: Option<String>) -> Option<UserIdentity> {
    let id = user.or_else(|| email.clone())?;
    Some(UserIdentity {
        display_name: Some(id.clone()),
        id,
        email,
    })
}

/// Runs the `consulta chat` interactive REPL.
pub async fn run_chat(
    config: ConsultaConfig,
    context: String,
    user: Option<UserIdentity>,
) -> Result<(), ConsultaError> {
    let storage = crate::open_storage(&config).await?;
    let engine = BookingEngine::new(&config, storage.clone(), crate::language_model(&config));

    let mut rl = DefaultEditor::new()
        .map_err(|e| ConsultaError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "consulta chat".bold().green());
    println!(
        "Ask for a time to meet a lecturer. Type {} to book an option, {} for a new conversation, {} to exit.\n",
        "/book N".yellow(),
        "/new".yellow(),
        "/quit".yellow()
    );

    let mut session = ChatSession::default();
    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let input = parse_input(&line);
                if !matches!(input, Input::Empty) {
                    let _ = rl.add_history_entry(line.as_str());
                }
                match input {
                    Input::Empty => continue,
                    Input::Quit => break,
                    Input::New => {
                        session = ChatSession::default();
                        println!("{}", "started a new conversation".dimmed());
                    }
                    Input::Invalid(message) => eprintln!("{}: {message}", "error".red()),
                    Input::Book(n) => {
                        if let Err(e) = session.book(&engine, user.as_ref(), n).await {
                            eprintln!("{}: {e}", "error".red());
                        }
                    }
                    Input::Message(text) => {
                        match engine
                            .handle_message(
                                session.conversation_id.as_deref(),
                                user.as_ref(),
                                text,
                                &context,
                            )
                            .await
                        {
                            Ok(reply) => session.show(reply),
                            Err(e) => eprintln!("{}: {e}", "error".red()),
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    if let Some(id) = &session.conversation_id {
        info!(conversation_id = %id, "chat session ended");
    }
    storage.close().await
}

/// Conversation and currently offered options of one REPL session.
#[derive(Default)]
struct ChatSession {
    conversation_id: Option<String>,
    options: Vec<BookingOption>,
}

impl ChatSession {
    async fn book(
        &mut self,
        engine: &BookingEngine,
        user: Option<&UserIdentity>,
        n: usize,
    ) -> Result<(), ConsultaError> {
        let (Some(id), Some(option)) = (self.conversation_id.clone(), self.options.get(n - 1))
        else {
            return Err(ConsultaError::InvalidInput(format!(
                "there is no option {n}; ask for a time first"
            )));
        };
        let selection = Selection::from(option);
        let reply = engine.confirm(&id, user, &selection).await?;
        self.show(reply);
        Ok(())
    }

    fn show(&mut self, reply: EngineReply) {
        if reply.conversation_id.is_some() {
            self.conversation_id = reply.conversation_id.clone();
        }
        print_reply(&reply);
        if reply.kind != ReplyKind::BookingFailed {
            self.options = reply.options;
        }
    }
}

fn print_reply(reply: &EngineReply) {
    let text = match reply.kind {
        ReplyKind::Blocked | ReplyKind::BookingFailed => reply.text.red(),
        ReplyKind::Busy | ReplyKind::AlreadyCompleted => reply.text.yellow(),
        ReplyKind::Booked | ReplyKind::BookingRequested => reply.text.green(),
        _ => reply.text.normal(),
    };
    println!("{} {text}", "consulta>".cyan());
    for (i, option) in reply.options.iter().enumerate() {
        println!("  [{}] {}", i + 1, crate::slots::slot_line(option).bold());
    }
    if !reply.options.is_empty() {
        println!("{}", "Type /book N to book an option.".dimmed());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use consulta_test_utils::{TestHarness, profile};

    #[test]
    fn commands_are_parsed() {
        assert_eq!(parse_input("  "), Input::Empty);
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/exit"), Input::Quit);
        assert_eq!(parse_input("/new"), Input::New);
        assert_eq!(parse_input("/book 2"), Input::Book(2));
        assert_eq!(parse_input(" book at 9h "), Input::Message("book at 9h"));
        assert!(matches!(parse_input("/book 0"), Input::Invalid(_)));
        assert!(matches!(parse_input("/book x"), Input::Invalid(_)));
        assert!(matches!(parse_input("/book"), Input::Invalid(_)));
        assert!(matches!(parse_input("/help"), Input::Invalid(_)));
    }

    #[test]
    fn email_alone_is_an_identity() {
        let user = identity(None, Some("an@example.edu".into())).unwrap();
        assert_eq!(user.id, "an@example.edu");
        assert_eq!(user.email.as_deref(), Some("an@example.edu"));
        assert!(identity(None, None).is_none());
        assert_eq!(identity(Some("u1".into()), None).unwrap().id, "u1");
    }

    #[tokio::test]
    async fn session_books_a_numbered_option() {
        let harness = TestHarness::builder()
            .with_profile(profile("Dr. Lan", 0, "09:00", "11:00"))
            .build()
            .await
            .unwrap();
        let engine = BookingEngine::new(&harness.config, Arc::clone(&harness.storage), None)
            .with_today(chrono::NaiveDate::from_ymd_opt(2025, 1, 22).unwrap());
        let mut session = ChatSession::default();

        assert!(session.book(&engine, None, 1).await.is_err());

        let reply = engine
            .handle_message(None, None, "book at 9h15", "consultant")
            .await
            .unwrap();
        session.show(reply);
        assert_eq!(session.options.len(), 4);

        session.book(&engine, None, 2).await.unwrap();
        assert!(session.options.is_empty());
        let id = session.conversation_id.clone().unwrap();
        let conversation = harness.storage.get_conversation(&id).await.unwrap().unwrap();
        assert_eq!(
            conversation.booking_status,
            consulta_core::types::BookingStatus::Completed
        );
    }
}
