//! Post domain entity
//!
//! A short text post on the bulletin board. Posts are soft-deleted through
//! `is_active` and carry a denormalized rating counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CONTENT_LEN: usize = 5000;
pub const MAX_GENRES: usize = 5;
pub const MAX_GENRE_LEN: usize = 32;

/// Unique identifier for a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PostId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(PostId)
            .map_err(|_| format!("Invalid post id: {}", s))
    }
}

/// Listing order for posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    #[default]
    Newest,
    Top,
}

impl std::fmt::Display for PostSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostSort::Newest => write!(f, "newest"),
            PostSort::Top => write!(f, "top"),
        }
    }
}

impl std::str::FromStr for PostSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" | "new" | "" => Ok(PostSort::Newest),
            "top" | "rating" => Ok(PostSort::Top),
            _ => Err(format!("Unknown sort order: {}. Use: newest, top", s)),
        }
    }
}

/// A post on the board
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub genres: Vec<String>,
    pub rating: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }
}

/// Data needed to create a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub genres: Vec<String>,
}

/// Partial update of a post; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub genres: Option<Vec<String>>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.genres.is_none()
    }
}

/// Filter for post listings
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub user_id: Option<UserId>,
    pub genre: Option<String>,
    pub sort: PostSort,
    pub limit: u64,
    pub offset: u64,
}

/// Trim and check a title
pub fn validate_title(title: &str) -> Result<String, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Title is required".to_string());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        ));
    }
    Ok(title.to_string())
}

/// Trim and check post content
pub fn validate_content(content: &str) -> Result<String, String> {
    let content = content.trim();
    if content.is_empty() {
        return Err("Content is required".to_string());
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(format!(
            "Content must be at most {} characters",
            MAX_CONTENT_LEN
        ));
    }
    Ok(content.to_string())
}

/// Lowercase, trim and de-duplicate genre tags, keeping input order
pub fn normalize_genres<S: AsRef<str>>(genres: &[S]) -> Result<Vec<String>, String> {
    let mut normalized: Vec<String> = Vec::new();
    for genre in genres {
        let genre = genre.as_ref().trim().trim_start_matches('#').to_lowercase();
        if genre.is_empty() || normalized.contains(&genre) {
            continue;
        }
        if genre.chars().count() > MAX_GENRE_LEN {
            return Err(format!(
                "Genre '{}' is longer than {} characters",
                genre, MAX_GENRE_LEN
            ));
        }
        normalized.push(genre);
    }
    if normalized.len() > MAX_GENRES {
        return Err(format!("A post can have at most {} genres", MAX_GENRES));
    }
    Ok(normalized)
}
