// ABOUTME: Simulated chat conversation state with canned assistant replies
// ABOUTME: In-memory message log seeded with a greeting; no real LLM behind it
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 AnyChat contributors

//! Simulated chat
//!
//! The conversation is a demo fixture: one in-memory message list seeded
//! with a greeting, and a canned assistant reply emitted after a short
//! delay. There is no persistence and no model call.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::constants::time::CHAT_REPLY_DELAY_MS;
use crate::models::{ChatMessage, MessageRole};

/// Greeting shown before the user has said anything
const GREETING: &str = "Hello! How can I assist you today?";

/// The canned reply used for every user message
const CANNED_REPLY: &str = "This is a simulated response from the AI assistant.";

/// In-memory simulated conversation
pub struct ChatState {
    messages: RwLock<Vec<ChatMessage>>,
    reply_delay: Duration,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatState {
    /// Create a conversation seeded with the assistant greeting
    #[must_use]
    pub fn new() -> Self {
        Self::with_reply_delay(Duration::from_millis(CHAT_REPLY_DELAY_MS))
    }

    /// Create a conversation with a custom reply delay (tests use zero)
    #[must_use]
    pub fn with_reply_delay(reply_delay: Duration) -> Self {
        let greeting = ChatMessage {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: GREETING.to_owned(),
            timestamp: Utc::now(),
        };

        Self {
            messages: RwLock::new(vec![greeting]),
            reply_delay,
        }
    }

    /// All messages in the conversation, oldest first
    pub async fn list(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    /// Append a user message and, after the simulated delay, the canned
    /// assistant reply. Returns both messages.
    pub async fn send(&self, content: String) -> (ChatMessage, ChatMessage) {
        let user_message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content,
            timestamp: Utc::now(),
        };
        self.messages.write().await.push(user_message.clone());

        // Simulated thinking time before the assistant responds
        tokio::time::sleep(self.reply_delay).await;

        let assistant_message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: CANNED_REPLY.to_owned(),
            timestamp: Utc::now(),
        };
        self.messages.write().await.push(assistant_message.clone());

        (user_message, assistant_message)
    }
}
