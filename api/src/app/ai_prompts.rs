//! Prompt builders and reply parsers for the AI helpers
//!
//! Model replies are free text, so every parser here is tolerant of code
//! fences, casing and stray punctuation.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::ports::ChatMessage;

pub const MAX_TAGS: usize = 3;

/// Moderation result returned by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub flagged: bool,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

pub fn rewrite_messages(content: &str, style: Option<&str>) -> Vec<ChatMessage> {
    let style = style
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("engaging");
    vec![
        ChatMessage::system(format!(
            "You rewrite short bulletin board stories. Keep the plot and the \
             language of the original, make the prose {}, and reply with the \
             rewritten story only.",
            style
        )),
        ChatMessage::user(content),
    ]
}

pub fn tag_messages(content: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "Classify the story into at most {} literary genres. Reply with a \
             comma-separated list of lowercase genre names and nothing else.",
            MAX_TAGS
        )),
        ChatMessage::user(content),
    ]
}

/// Parse a comma or newline separated genre list
pub fn parse_tags(reply: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in strip_fences(reply).split([',', '\n', ';']) {
        let tag = raw
            .trim()
            .trim_start_matches(['-', '*', '#'])
            .trim_matches(|c: char| c == '.' || c == '"' || c == '\'' || c.is_whitespace())
            .to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

pub fn moderation_messages(content: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You moderate posts on a public bulletin board. Flag hate, \
             harassment, sexual content involving minors, self-harm \
             encouragement, violent threats, spam and personal data. Reply \
             with JSON only: {\"flagged\": bool, \"categories\": [string], \
             \"reason\": string|null}.",
        ),
        ChatMessage::user(content),
    ]
}

pub fn parse_moderation(reply: &str) -> Result<ModerationVerdict, String> {
    let body = strip_fences(reply);
    // Models sometimes wrap the JSON in prose
    let json = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => return Err(format!("no JSON object in moderation reply: {}", reply)),
    };
    serde_json::from_str(json).map_err(|e| format!("invalid moderation JSON: {}", e))
}

pub fn intent_messages(message: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "Classify the user's message for a bulletin board assistant. Reply \
             with exactly one word:\n\
             sql - the user asks for statistics or data about posts, ratings or users\n\
             rag - the user asks about the board itself, its rules or how it works\n\
             general - small talk or writing help\n\
             none - anything else",
        ),
        ChatMessage::user(message),
    ]
}

/// Reduce a classifier reply to its first lowercase word
pub fn normalize_intent(reply: &str) -> String {
    strip_fences(reply)
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

pub fn sql_messages(question: &str, schema: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You translate questions into a single PostgreSQL SELECT statement. \
             Only use these tables:\n\n{}\n\nOnly read data. Reply with the SQL \
             only, no explanation.",
            schema
        )),
        ChatMessage::user(question),
    ]
}

pub fn rag_messages(question: &str, context: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You answer questions about the IBBS bulletin board using only the \
             context below. If the answer is not in the context, say you don't \
             know.\n\n{}",
            context
        )),
        ChatMessage::user(question),
    ]
}

pub fn general_messages(message: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You are the friendly assistant of the IBBS bulletin board. Keep \
             answers short.",
        ),
        ChatMessage::user(message),
    ]
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)\s*```").expect("fence regex is valid")
    })
}

fn forbidden_sql_regex() -> &'static Regex {
    static FORBIDDEN: OnceLock<Regex> = OnceLock::new();
    FORBIDDEN.get_or_init(|| {
        Regex::new(
            r"(?i)\b(insert|update|delete|merge|drop|alter|create|truncate|grant|revoke|copy|vacuum|call|do|execute|lock|set|reset|comment|refresh|listen|notify)\b",
        )
        .expect("forbidden sql regex is valid")
    })
}

/// Return the body of the first code fence, or the trimmed text
pub fn strip_fences(reply: &str) -> &str {
    match fence_regex().captures(reply).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => reply.trim(),
    }
}

/// Accept a single read-only statement, returned without trailing semicolon
pub fn validate_read_only_sql(sql: &str) -> Result<String, String> {
    let sql = strip_fences(sql).trim().trim_end_matches(';').trim();
    if sql.is_empty() {
        return Err("empty query".to_string());
    }
    if sql.contains(';') {
        return Err("only a single statement is allowed".to_string());
    }
    if sql.contains("--") || sql.contains("/*") {
        return Err("comments are not allowed".to_string());
    }

    let first = sql
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();
    if first != "select" && first != "with" {
        return Err("query must start with SELECT or WITH".to_string());
    }

    if let Some(m) = forbidden_sql_regex().find(sql) {
        return Err(format!("keyword '{}' is not allowed", m.as_str()));
    }

    Ok(sql.to_string())
}
