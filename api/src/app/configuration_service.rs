//! Public runtime configuration for the frontend

use serde::Serialize;

use crate::app::post_service::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::config::Config;
use crate::domain::entities::{MAX_CONTENT_LEN, MAX_GENRES, MAX_TITLE_LEN};

/// Non-secret settings the frontend needs to render forms and feature toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicConfiguration {
    pub ai_enabled: bool,
    pub moderation_enabled: bool,
    pub directory_enabled: bool,
    pub max_title_length: usize,
    pub max_content_length: usize,
    pub max_genres: usize,
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub ai_daily_limit: u32,
}

pub struct ConfigurationService {
    public: PublicConfiguration,
}

impl ConfigurationService {
    pub fn new(config: &Config) -> Self {
        let ai_enabled = config.ai_enabled();
        Self {
            public: PublicConfiguration {
                ai_enabled,
                // Moderation needs a model to talk to
                moderation_enabled: ai_enabled && config.moderate_posts,
                directory_enabled: config.directory_enabled(),
                max_title_length: MAX_TITLE_LEN,
                max_content_length: MAX_CONTENT_LEN,
                max_genres: MAX_GENRES,
                default_page_size: DEFAULT_PAGE_SIZE,
                max_page_size: MAX_PAGE_SIZE,
                ai_daily_limit: config.ai_daily_limit,
            },
        }
    }

    pub fn get(&self) -> PublicConfiguration {
        self.public.clone()
    }
}
