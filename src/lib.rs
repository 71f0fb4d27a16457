// src/lib.rs

//! Asynchronous external-process execution helper.
//!
//! Spawn a command, let its stdout and stderr be captured in the background,
//! and receive the accumulated stdout once the child has exited cleanly:
//!
//! ```no_run
//! use extproc::{launch, Invocation};
//!
//! # async fn demo() -> extproc::errors::Result<()> {
//! let invocation = Invocation::new("git").arg("show-ref");
//! let process = launch(invocation)?;
//!
//! if let Some(stdout) = process.stdout().await {
//!     println!("stdout was: {}", String::from_utf8_lossy(&stdout));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! `launch` returns as soon as the OS confirms the spawn; capture happens on
//! the Tokio runtime without blocking the caller. Output is delivered once,
//! atomically, at process exit, and only when the child exits with status 0.
//! Any other outcome is logged and the delivery channel simply never fires.
//! See [`runner`] for the exact contract.

pub mod errors;
pub mod invocation;
pub mod logging;
pub mod runner;

pub use invocation::Invocation;
pub use runner::{RunnerOptions, RunningProcess, launch, launch_with_options};
