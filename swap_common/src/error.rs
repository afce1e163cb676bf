//! Error types shared between the swap library and the client.
//!
//! The `SwapError` enum unifies infrastructure failures (I/O, JSON, price feed
//! transport, channels) and the submission-level refusals raised by the
//! session, so every crate in the workspace can propagate a single error type.
//! Quote validation outcomes are not errors: they are values of
//! [`crate::quote::QuoteResult`].
use std::io;

use thiserror::Error;

/// Unified error type shared by the library and the client.
#[derive(Error, Debug)]
pub enum SwapError {
    /// I/O error originating from the standard library (files, stdin).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while decoding a price feed or encoding output via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Price feed transport failure (connection, timeout, non-success status).
    #[error("Price feed unavailable: {0}")]
    Feed(String),

    /// A symbol was requested that the current catalog does not list.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// The current quote is not `Valid`; carries the user-facing reason, if any.
    #[error("Swap not submittable: {0}")]
    NotSubmittable(String),

    /// A submission is already waiting for settlement.
    #[error("A swap is already pending settlement")]
    SubmissionPending,

    /// Settlement was requested for a swap the session did not issue.
    #[error("Unknown submission: {0}")]
    UnknownSubmission(u64),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Crossbeam/channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),
}
