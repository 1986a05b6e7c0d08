//! Error taxonomy for the command-dispatch boundary.
//!
//! Every failure a handler can produce maps to one of these categories,
//! and every category maps to exactly one fixed user-facing reply. All
//! variants are recovered at the dispatch boundary; none propagate far
//! enough to abort the event-processing loop.

use crate::providers::ProviderError;
use thiserror::Error;

/// Failure categories surfaced by command handlers.
#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or invalid arguments. Surfaced as a usage hint and never
    /// logged as a fault; the user can correct it.
    #[error("usage: {usage}")]
    Validation {
        /// Ready-to-send usage hint, prefix already applied
        usage: String,
    },

    /// A non-owner invoked an owner-only command.
    #[error("owner-only command")]
    Authorization,

    /// The command is switched off by a feature flag.
    #[error("{notice}")]
    FeatureDisabled {
        /// Fixed informational reply for the disabled feature
        notice: String,
    },

    /// Search or lookup yielded no result.
    #[error("no result for {subject}")]
    NotFound {
        /// What was searched for, echoed back to the user
        subject: String,
    },

    /// A collaborator call failed or timed out. Logged with detail for
    /// operators, surfaced as one generic failure message.
    #[error(transparent)]
    Upstream(#[from] ProviderError),

    /// The caller exhausted the current rate-limit window.
    #[error("rate limit exceeded")]
    RateLimited,
}

impl BotError {
    /// Whether this error is an operator-facing fault worth logging.
    ///
    /// Validation, authorization and throttling are user-correctable and
    /// expected; upstream failures are not.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}
