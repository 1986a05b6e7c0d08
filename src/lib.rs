//! Aria Mini is a chat-bot front end: inbound messages are classified,
//! rate-limited and authorized, then dispatched to a fixed table of
//! command handlers (AI Q&A, media search/download, administration,
//! support tickets). Short-lived interactive state (pending format
//! choices) is correlated per (conversation, user) with TTL expiry.

/// Command table and handlers
pub mod commands;
/// Settings loaded from environment and config files
pub mod config;
/// Inbound-event pipeline
pub mod engine;
/// Error taxonomy for the dispatch boundary
pub mod error;
/// Health-check HTTP endpoint
pub mod health;
/// Identity canonicalization and authorization
pub mod identity;
/// Pending-interaction state machine
pub mod interaction;
/// Owner notification and support tickets
pub mod notify;
/// External collaborator interfaces (search, fetch, lookup, AI)
pub mod providers;
/// Fixed-window rate limiter
pub mod rate_limit;
/// TTL-based ephemeral store
pub mod store;
/// Telegram-backed transport implementation
pub mod telegram;
/// Transport abstraction consumed by the core
pub mod transport;
/// Text and filename helpers
pub mod utils;
