// src/runner/mod.rs

//! Process execution layer.
//!
//! This module owns the full lifecycle of one external process invocation:
//! spawn, chunked capture of stdout and stderr, exit detection, one-shot
//! delivery of the captured stdout, and resource teardown.
//!
//! - [`process`] spawns the child, supervises its exit and holds the
//!   teardown path.
//! - [`drain`] reads one output pipe to end-of-stream in bounded chunks.
//!
//! Each launch creates an independent [`RunningProcess`]; there is no shared
//! registry of in-flight children, so concurrent invocations never contend
//! on anything beyond the runtime itself.

pub mod drain;
pub mod process;

pub use drain::{DEFAULT_READ_CHUNK, drain_stream};
pub use process::{ProcessResources, RunningProcess, launch, launch_with_options};

use crate::errors::{ExtprocError, Result};

/// Per-invocation tunables.
#[derive(Debug, Clone, Copy)]
pub struct RunnerOptions {
    /// Bytes read from a child pipe per read call. Must be at least 1.
    pub read_chunk: usize,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            read_chunk: DEFAULT_READ_CHUNK,
        }
    }
}

impl RunnerOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.read_chunk == 0 {
            return Err(ExtprocError::InvalidOptions(
                "read_chunk must be at least 1 byte".to_string(),
            ));
        }
        Ok(())
    }
}
