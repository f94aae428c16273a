//! User-facing notices produced at the command boundary.

use std::fmt;

use levdash_core::{ClientError, ErrorKind};
use serde::Serialize;

/// Where a notice is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Persistent, for failed reads. Cleared by a successful retry.
    Banner,
    /// Transient, for mutation outcomes and validation failures.
    Toast,
}

/// A failure turned into something the rendering layer can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub kind: ErrorKind,
    pub message: String,
}

impl Notice {
    pub fn banner(err: impl Into<ClientError>) -> Self {
        Self::from_error(NoticeLevel::Banner, err.into())
    }

    pub fn toast(err: impl Into<ClientError>) -> Self {
        Self::from_error(NoticeLevel::Toast, err.into())
    }

    fn from_error(level: NoticeLevel, err: ClientError) -> Self {
        Self {
            level,
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Notice {}
