//! AI completion adapters

pub mod client;

pub use client::{DisabledAiClient, OpenAiCompatibleClient};
