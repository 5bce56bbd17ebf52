use thiserror::Error;

use crate::builder::BuildError;
use crate::issuer::TokenKind;

/// Pipeline stage that rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Build,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Build => "build",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IssueError {
    #[error("failed to parse expireTime: {raw}, causing error: {reason}")]
    MalformedExpiry { raw: String, reason: String },

    #[error("failed to parse uidStr: {raw}, causing error: {reason}")]
    MalformedUid { raw: String, reason: String },

    /// Path or query that could not be extracted at all.
    #[error("{0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl IssueError {
    pub fn stage(&self) -> Stage {
        match self {
            IssueError::MalformedExpiry { .. } | IssueError::MalformedRequest(_) => Stage::Parse,
            // uid is parsed at dispatch time, right before the builder call
            IssueError::MalformedUid { .. } | IssueError::Build(_) => Stage::Build,
        }
    }
}

/// Client-facing rejection, uniform across token kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorOutcome {
    pub stage: Stage,
    pub message: String,
}

impl ErrorOutcome {
    pub fn new(kind: TokenKind, err: &IssueError) -> Self {
        Self {
            stage: err.stage(),
            message: format!("Error Generating {} token: {}", kind.label(), err),
        }
    }
}
