//! AI usage domain entity
//!
//! One row per AI helper call, used for per-user daily limits and profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Unique identifier for a usage record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiUsageId(pub Uuid);

impl From<Uuid> for AiUsageId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// AI helper feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiFeature {
    Rewrite,
    Tag,
    Moderate,
    Chat,
}

impl std::fmt::Display for AiFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiFeature::Rewrite => write!(f, "rewrite"),
            AiFeature::Tag => write!(f, "tag"),
            AiFeature::Moderate => write!(f, "moderate"),
            AiFeature::Chat => write!(f, "chat"),
        }
    }
}

impl std::str::FromStr for AiFeature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rewrite" => Ok(AiFeature::Rewrite),
            "tag" => Ok(AiFeature::Tag),
            "moderate" => Ok(AiFeature::Moderate),
            "chat" => Ok(AiFeature::Chat),
            _ => Err(format!("Unknown AI feature: {}", s)),
        }
    }
}

/// A recorded AI call
#[derive(Debug, Clone, Serialize)]
pub struct AiUsage {
    pub id: AiUsageId,
    pub user_id: UserId,
    pub feature: AiFeature,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub created_at: DateTime<Utc>,
}

/// Data needed to record an AI call
#[derive(Debug, Clone)]
pub struct NewAiUsage {
    pub user_id: UserId,
    pub feature: AiFeature,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
}
