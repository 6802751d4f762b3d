//! AI service
//!
//! Story rewriting, genre tagging, moderation and the board chatbot. Every
//! call is metered per user and capped by a daily limit.
//!
//! The chatbot first asks the model to classify the message, then routes on
//! the returned intent string:
//! - `sql`: generate a read-only query from the schema documents and run it
//! - `rag`: answer from the context documents
//! - `general`: plain conversation
//! - anything else: a fixed fallback answer

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::ai_prompts::{
    general_messages, intent_messages, moderation_messages, normalize_intent, parse_moderation,
    parse_tags, rag_messages, rewrite_messages, sql_messages, tag_messages,
    validate_read_only_sql, ModerationVerdict,
};
use crate::app::cache_service::{keys, CacheService};
use crate::domain::entities::{
    render_context, validate_content, AiFeature, DocumentKind, KnowledgeDocument, NewAiUsage,
    UserId,
};
use crate::domain::ports::{
    AiClient, AiCompletion, AiUsageRepository, ChatMessage, KnowledgeBaseRepository, QueryRunner,
};
use crate::error::{AiError, AppError, DomainError};

/// Row cap for chatbot queries
pub const MAX_CHAT_ROWS: usize = 100;
pub const MAX_CHAT_MESSAGE_LEN: usize = 2000;

pub const FALLBACK_ANSWER: &str =
    "Sorry, I can only help with questions about posts, ratings and the board itself.";

/// Chatbot answer
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub intent: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<serde_json::Value>>,
}

impl ChatReply {
    fn text(intent: &str, answer: impl Into<String>) -> Self {
        Self {
            intent: intent.to_string(),
            answer: answer.into(),
            sql: None,
            rows: None,
        }
    }
}

/// Today's AI usage for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AiUsageSummary {
    pub used_today: u64,
    pub daily_limit: u32,
    pub remaining: u64,
}

/// Token totals across the model calls of one operation
#[derive(Debug, Default, Clone, Copy)]
struct TokenTally {
    prompt: i32,
    completion: i32,
}

impl TokenTally {
    fn add(&mut self, completion: &AiCompletion) {
        self.prompt = self.prompt.saturating_add(completion.prompt_tokens);
        self.completion = self.completion.saturating_add(completion.completion_tokens);
    }
}

/// Midnight UTC of the day containing `now`
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

pub struct AiService<AU, KB, QR, AC>
where
    AU: AiUsageRepository,
    KB: KnowledgeBaseRepository,
    QR: QueryRunner,
    AC: AiClient + ?Sized,
{
    usages: Arc<AU>,
    knowledge: Arc<KB>,
    queries: Arc<QR>,
    ai: Arc<AC>,
    cache: Arc<CacheService>,
    daily_limit: u32,
}

impl<AU, KB, QR, AC> AiService<AU, KB, QR, AC>
where
    AU: AiUsageRepository,
    KB: KnowledgeBaseRepository,
    QR: QueryRunner,
    AC: AiClient + ?Sized,
{
    pub fn new(
        usages: Arc<AU>,
        knowledge: Arc<KB>,
        queries: Arc<QR>,
        ai: Arc<AC>,
        cache: Arc<CacheService>,
        daily_limit: u32,
    ) -> Self {
        Self {
            usages,
            knowledge,
            queries,
            ai,
            cache,
            daily_limit,
        }
    }

    /// Rewrite a story in an optional style
    pub async fn rewrite(
        &self,
        user_id: &UserId,
        content: &str,
        style: Option<&str>,
    ) -> Result<String, AppError> {
        let content = validate_content(content).map_err(AppError::BadRequest)?;
        self.check_quota(user_id).await?;

        let completion = self.complete(&rewrite_messages(&content, style)).await?;
        let text = completion.content.trim().to_string();
        if text.is_empty() {
            return Err(AiError::InvalidResponse("empty rewrite".to_string()).into());
        }

        self.record(user_id, AiFeature::Rewrite, &completion).await?;
        Ok(text)
    }

    /// Suggest up to three genre tags; identical content is served from cache
    pub async fn tag(&self, user_id: &UserId, content: &str) -> Result<Vec<String>, AppError> {
        let content = validate_content(content).map_err(AppError::BadRequest)?;
        self.check_quota(user_id).await?;

        let key = keys::ai_tags(&content);
        if let Some(tags) = self.cache.get::<Vec<String>>(&key).await {
            return Ok(tags);
        }

        let completion = self.complete(&tag_messages(&content)).await?;
        let tags = parse_tags(&completion.content);
        if tags.is_empty() {
            return Err(AiError::InvalidResponse("no tags in reply".to_string()).into());
        }

        self.record(user_id, AiFeature::Tag, &completion).await?;
        self.cache.insert(&key, tags.clone()).await;
        Ok(tags)
    }

    /// Check content against the moderation policy
    pub async fn moderate(
        &self,
        user_id: &UserId,
        content: &str,
    ) -> Result<ModerationVerdict, AppError> {
        let content = validate_content(content).map_err(AppError::BadRequest)?;
        self.check_quota(user_id).await?;

        let completion = self.complete(&moderation_messages(&content)).await?;
        let verdict = parse_moderation(&completion.content).map_err(AiError::InvalidResponse)?;

        self.record(user_id, AiFeature::Moderate, &completion).await?;
        Ok(verdict)
    }

    /// Answer a chatbot message
    pub async fn chat(&self, user_id: &UserId, message: &str) -> Result<ChatReply, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::BadRequest("Message is required".to_string()));
        }
        if message.chars().count() > MAX_CHAT_MESSAGE_LEN {
            return Err(AppError::BadRequest(format!(
                "Message must be at most {} characters",
                MAX_CHAT_MESSAGE_LEN
            )));
        }
        self.check_quota(user_id).await?;

        let mut tally = TokenTally::default();
        let classified = self.complete(&intent_messages(message)).await?;
        tally.add(&classified);

        let intent = normalize_intent(&classified.content);
        tracing::debug!(user_id = %user_id, intent = %intent, "Chat intent classified");

        let reply = match intent.as_str() {
            "sql" => self.answer_with_sql(message, &mut tally).await?,
            "rag" => self.answer_with_context(message, &mut tally).await?,
            "general" => {
                let completion = self.complete(&general_messages(message)).await?;
                tally.add(&completion);
                ChatReply::text("general", completion.content.trim())
            }
            _ => ChatReply::text("none", FALLBACK_ANSWER),
        };

        self.record_tally(user_id, AiFeature::Chat, tally).await?;
        Ok(reply)
    }

    /// Today's usage against the daily limit
    pub async fn usage(&self, user_id: &UserId) -> Result<AiUsageSummary, AppError> {
        let used_today = self.used_today(user_id).await?;
        Ok(AiUsageSummary {
            used_today,
            daily_limit: self.daily_limit,
            remaining: (self.daily_limit as u64).saturating_sub(used_today),
        })
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    async fn answer_with_sql(
        &self,
        message: &str,
        tally: &mut TokenTally,
    ) -> Result<ChatReply, AppError> {
        let schema = render_context(&self.documents(DocumentKind::Schema).await?);
        let completion = self.complete(&sql_messages(message, &schema)).await?;
        tally.add(&completion);

        let sql = match validate_read_only_sql(&completion.content) {
            Ok(sql) => sql,
            Err(reason) => {
                tracing::warn!(reason = %reason, "Rejected generated query");
                return Ok(ChatReply {
                    sql: Some(completion.content.trim().to_string()),
                    ..ChatReply::text(
                        "sql",
                        format!("I couldn't build a safe query for that question ({}).", reason),
                    )
                });
            }
        };

        match self.queries.run_select(&sql, MAX_CHAT_ROWS).await {
            Ok(rows) => Ok(ChatReply {
                intent: "sql".to_string(),
                answer: format!("Found {} row(s).", rows.len()),
                sql: Some(sql),
                rows: Some(rows),
            }),
            Err(DomainError::Validation(msg)) => {
                tracing::warn!(error = %msg, sql = %sql, "Generated query failed");
                Ok(ChatReply {
                    sql: Some(sql),
                    ..ChatReply::text("sql", "That query didn't work against the database.")
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn answer_with_context(
        &self,
        message: &str,
        tally: &mut TokenTally,
    ) -> Result<ChatReply, AppError> {
        let context = render_context(&self.documents(DocumentKind::Context).await?);
        let completion = self.complete(&rag_messages(message, &context)).await?;
        tally.add(&completion);
        Ok(ChatReply::text("rag", completion.content.trim()))
    }

    async fn documents(&self, kind: DocumentKind) -> Result<Vec<KnowledgeDocument>, AppError> {
        let docs = self
            .cache
            .get_or_try_insert_with(&keys::knowledge(kind), || self.knowledge.find_by_kind(kind))
            .await?;
        Ok(docs)
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<AiCompletion, AppError> {
        Ok(self
            .ai
            .complete(messages)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "AI completion failed"))?)
    }

    async fn used_today(&self, user_id: &UserId) -> Result<u64, AppError> {
        Ok(self
            .usages
            .count_since(user_id, start_of_day(Utc::now()))
            .await?)
    }

    async fn check_quota(&self, user_id: &UserId) -> Result<(), AppError> {
        if self.used_today(user_id).await? >= self.daily_limit as u64 {
            tracing::info!(user_id = %user_id, limit = self.daily_limit, "Daily AI limit reached");
            return Err(AppError::TooManyRequests(format!(
                "Daily AI limit of {} requests reached",
                self.daily_limit
            )));
        }
        Ok(())
    }

    async fn record(
        &self,
        user_id: &UserId,
        feature: AiFeature,
        completion: &AiCompletion,
    ) -> Result<(), AppError> {
        let mut tally = TokenTally::default();
        tally.add(completion);
        self.record_tally(user_id, feature, tally).await
    }

    async fn record_tally(
        &self,
        user_id: &UserId,
        feature: AiFeature,
        tally: TokenTally,
    ) -> Result<(), AppError> {
        self.usages
            .record(&NewAiUsage {
                user_id: *user_id,
                feature,
                prompt_tokens: tally.prompt,
                completion_tokens: tally.completion,
            })
            .await?;
        self.cache.invalidate(&keys::profile(user_id)).await;
        Ok(())
    }
}
