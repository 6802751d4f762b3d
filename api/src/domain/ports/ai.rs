//! AI completion port trait
//!
//! Defines the interface to an external chat completion API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A model reply with token accounting
#[derive(Debug, Clone, Default)]
pub struct AiCompletion {
    pub content: String,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
}

#[async_trait]
pub trait AiClient: Send + Sync {
    /// Run one chat completion
    async fn complete(&self, messages: &[ChatMessage]) -> Result<AiCompletion, AiError>;
}
