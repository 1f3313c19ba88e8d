//! Error types for MetaBuilder operations.
//!
//! Editing calls never fail with an error: infeasible edits are reported by
//! `can_*` queries or by a `None` operation. [`MetabuilderError`] covers the
//! outer boundary, where configuration and scene input come from users.

use std::{io, ops::Range};

use thiserror::Error;

use metabuilder_core::element::ParseKindError;

/// The main error type for MetaBuilder operations.
#[derive(Debug, Error)]
pub enum MetabuilderError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    UnknownKind(#[from] ParseKindError),

    #[error("Unknown element reference `{0}`")]
    UnknownReference(String),

    #[error("Rejected edit: {0}")]
    Rejected(String),

    /// Malformed scene text, with the byte range of the offending source.
    #[error("Scene error: {message}")]
    Scene {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },
}

impl MetabuilderError {
    /// Creates a [`MetabuilderError::Scene`] error pointing into `src`.
    pub fn new_scene_error(
        message: impl Into<String>,
        span: Option<Range<usize>>,
        src: impl Into<String>,
    ) -> Self {
        Self::Scene {
            message: message.into(),
            span,
            src: src.into(),
        }
    }
}
