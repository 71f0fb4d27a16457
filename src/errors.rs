// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtprocError {
    #[error("Empty argument vector: an invocation needs at least a program name")]
    EmptyArgv,

    #[error("Invalid runner options: {0}")]
    InvalidOptions(String),

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The {0} pipe of the spawned child was not available")]
    PipeSetup(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ExtprocError>;
