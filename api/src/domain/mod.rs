//! Domain layer
//!
//! Board concepts (posts, ratings, users, AI usage, knowledge documents) and
//! the port traits the application layer talks to. Nothing here touches
//! storage or the network.

pub mod entities;
pub mod ports;
