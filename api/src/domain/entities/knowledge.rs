//! Knowledge base documents
//!
//! Schema and context documents stored in MongoDB and used as prompt context
//! for the chatbot, plus the board's "about us" page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the single "about us" document
pub const ABOUT_US_KEY: &str = "about-us";

/// Kind of knowledge document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Table descriptions for natural-language-to-SQL
    Schema,
    /// Free text used for retrieval-augmented answers
    Context,
    AboutUs,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Schema => write!(f, "schema"),
            DocumentKind::Context => write!(f, "context"),
            DocumentKind::AboutUs => write!(f, "about_us"),
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "schema" => Ok(DocumentKind::Schema),
            "context" => Ok(DocumentKind::Context),
            "about_us" | "about-us" => Ok(DocumentKind::AboutUs),
            _ => Err(format!("Unknown document kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Hex ObjectId when loaded from storage
    pub id: Option<String>,
    pub key: String,
    pub kind: DocumentKind,
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

/// Join documents into a single prompt context block
pub fn render_context(documents: &[KnowledgeDocument]) -> String {
    documents
        .iter()
        .map(|d| format!("## {}\n{}", d.title, d.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
