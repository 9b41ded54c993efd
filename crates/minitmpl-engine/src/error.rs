// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the template engine.
///
/// Only parsing can fail while turning a template into output. Rendering is
/// infallible: missing paths and bad loop sources degrade to empty output.
/// The remaining variants belong to the edges of the engine, converting host
/// models and reading or writing template files.
#[derive(Debug, Error)]
pub enum Error {
    /// The template source is malformed. `offset` is a character offset into
    /// the source pointing at the place where the expectation failed.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },
    /// A host model could not be converted into the engine's data model.
    #[error("model error: {source}")]
    Model {
        #[from]
        source: serde_json::Error,
    },
    /// A template file could not be read or a rendered file could not be written.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn syntax(message: impl Into<String>, offset: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            offset,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Character offset of a syntax error, if this is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Syntax { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
