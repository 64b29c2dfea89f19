// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error type shared by the builder, the reader and the query cursor.
//!
//! Every failure is handed back to whoever called the failing operation.
//! Nothing in this crate logs-and-continues. A cancelled write or query is
//! not an error: it is reported as
//! [`Completion::Cancelled`](crate::task::Completion).

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A table would grow past what 24-bit ids can address, or a value or
    /// file would exceed what a reader accepts.
    #[error("index is full: cannot store more than {limit} {what}")]
    Capacity { what: &'static str, limit: usize },

    /// Malformed container, bad checksum, bad tag, truncated section...
    #[error("invalid index format: {0}")]
    Format(String),

    #[error("unsupported index version {found} (expected {expected})")]
    VersionMismatch { found: i32, expected: i32 },

    #[error("index is missing required section '{0}'")]
    MissingSection(&'static str),

    #[error("I/O error for '{context}': {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A builder may be serialized exactly once.
    #[error("index builder has already been written")]
    AlreadyWritten,

    /// The worker thread went away without sending a completion.
    #[error("background worker exited without reporting a result")]
    WorkerLost,
}

impl Error {
    pub fn format(message: impl Into<String>) -> Self {
        Error::Format(message.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// True for errors caused by the bytes on disk rather than by the caller.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::Format(_) | Error::VersionMismatch { .. } | Error::MissingSection(_)
        )
    }
}
