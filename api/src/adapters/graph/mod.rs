//! Microsoft Graph adapters

pub mod client;

pub use client::{DisabledDirectory, GraphDirectoryClient};
