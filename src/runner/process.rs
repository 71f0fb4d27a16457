// src/runner/process.rs

//! Spawning and supervising one external process invocation.

use std::fmt;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::{ExtprocError, Result};
use crate::invocation::Invocation;
use crate::runner::RunnerOptions;
use crate::runner::drain::drain_stream;

/// Exit codes at or above this value are reported as "exited unexpectedly"
/// rather than as an ordinary command failure.
const ABNORMAL_EXIT_CODE: i32 = 255;

/// Owned resources of one in-flight child process.
///
/// Every field is an `Option` so that "never acquired", "active" and
/// "already released" stay distinguishable, which is what makes
/// [`teardown`](ProcessResources::teardown) safe to run any number of times.
/// Normal callers only ever see [`RunningProcess`]; this struct is public so
/// the teardown path can be exercised directly in tests.
pub struct ProcessResources {
    /// OS pid; `None` means "not running".
    pub pid: Option<u32>,
    /// Handle to the spawned child, kept for waiting and release.
    pub child: Option<Child>,
    /// Drain task for the stdout pipe.
    pub stdout_drain: Option<JoinHandle<Option<Vec<u8>>>>,
    /// Drain task for the stderr pipe.
    pub stderr_drain: Option<JoinHandle<Option<Vec<u8>>>>,
    /// Accumulated stdout, once the drain has finished.
    pub stdout_buf: Option<Vec<u8>>,
    /// Accumulated stderr, once the drain has finished.
    pub stderr_buf: Option<Vec<u8>>,
}

impl ProcessResources {
    /// Release everything this invocation still holds.
    ///
    /// Ordered like the launch path in reverse, and safe to call repeatedly:
    /// each step independently checks whether its resource is still held
    /// before acting.
    pub fn teardown(&mut self) {
        // Aborting a drain drops the pipe end it owns, which closes the fd.
        if let Some(handle) = self.stdout_drain.take() {
            if !handle.is_finished() {
                warn!("stdout drain still active at teardown; aborting it");
            }
            handle.abort();
        }
        if let Some(handle) = self.stderr_drain.take() {
            if !handle.is_finished() {
                warn!("stderr drain still active at teardown; aborting it");
            }
            handle.abort();
        }

        // Releasing the handle does not kill the child; a process that is
        // somehow still running is left to the OS, matching the
        // no-cancellation contract.
        if let Some(child) = self.child.take() {
            drop(child);
        }

        self.pid = None;

        // A buffer already handed to the receiver was moved out beforehand;
        // whatever is still here is ours to drop.
        self.stdout_buf = None;
        self.stderr_buf = None;
    }

    /// True when every resource slot has been released.
    pub fn is_torn_down(&self) -> bool {
        self.pid.is_none()
            && self.child.is_none()
            && self.stdout_drain.is_none()
            && self.stderr_drain.is_none()
            && self.stdout_buf.is_none()
            && self.stderr_buf.is_none()
    }
}

/// Handle for a launched invocation.
///
/// Dropping the handle does not stop the child; the supervisor keeps running
/// detached and the eventual delivery is discarded.
pub struct RunningProcess {
    pid: Option<u32>,
    output_rx: oneshot::Receiver<Vec<u8>>,
    supervisor: Option<JoinHandle<()>>,
}

impl fmt::Debug for RunningProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunningProcess")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

impl RunningProcess {
    /// OS process id of the child, while the invocation is believed alive.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// True once the exit supervisor has finished, meaning delivery was
    /// attempted and all resources were released.
    pub fn is_finished(&self) -> bool {
        self.supervisor
            .as_ref()
            .map(JoinHandle::is_finished)
            .unwrap_or(true)
    }

    /// Wait for the captured stdout.
    ///
    /// Resolves `Some(bytes)` at most once, and only if the child exits with
    /// status 0; ownership of the buffer moves to the caller. Any other
    /// outcome (nonzero exit, signal) resolves `None`; the reason is logged
    /// but deliberately not part of the result.
    pub async fn stdout(self) -> Option<Vec<u8>> {
        self.output_rx.await.ok()
    }
}

/// Launch `invocation` with default options.
///
/// See [`launch_with_options`].
pub fn launch(invocation: Invocation) -> Result<RunningProcess> {
    launch_with_options(invocation, RunnerOptions::default())
}

/// Launch `invocation`, spawning the child and starting capture.
///
/// Returns as soon as the OS confirms the spawn; must be called from within
/// a Tokio runtime. The child gets its own stdout and stderr pipes, reads
/// /dev/null on stdin, and inherits working directory and environment.
///
/// On spawn failure everything acquired so far is released and the error is
/// returned directly; the delivery channel never fires.
pub fn launch_with_options(
    invocation: Invocation,
    options: RunnerOptions,
) -> Result<RunningProcess> {
    options.validate()?;

    let program = invocation.program().to_string_lossy().into_owned();

    let mut command = Command::new(invocation.program());
    command
        .args(invocation.arguments())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| {
        warn!(program = %program, error = %e, "failed to spawn child process");
        ExtprocError::Spawn {
            program: program.clone(),
            source: e,
        }
    })?;

    let pid = child.id();

    // Both pipes were requested above, so `take` only comes back empty if
    // the OS-level setup went wrong. That is fatal for the invocation; the
    // already-running child is dropped here and left to be reaped by the
    // runtime, possibly continuing orphaned.
    let stdout_pipe = match child.stdout.take() {
        Some(pipe) => pipe,
        None => {
            warn!(program = %program, "stdout pipe unavailable after spawn");
            return Err(ExtprocError::PipeSetup("stdout"));
        }
    };
    let stderr_pipe = match child.stderr.take() {
        Some(pipe) => pipe,
        None => {
            warn!(program = %program, "stderr pipe unavailable after spawn");
            return Err(ExtprocError::PipeSetup("stderr"));
        }
    };

    let stdout_drain = tokio::spawn(drain_stream(stdout_pipe, options.read_chunk, "stdout"));
    let stderr_drain = tokio::spawn(drain_stream(stderr_pipe, options.read_chunk, "stderr"));

    let (output_tx, output_rx) = oneshot::channel();

    let resources = ProcessResources {
        pid,
        child: Some(child),
        stdout_drain: Some(stdout_drain),
        stderr_drain: Some(stderr_drain),
        stdout_buf: None,
        stderr_buf: None,
    };

    debug!(program = %program, pid = ?pid, "spawned child process");

    let supervisor = tokio::spawn(supervise(program, resources, output_tx));

    Ok(RunningProcess {
        pid,
        output_rx,
        supervisor: Some(supervisor),
    })
}

/// Exit watcher for one invocation.
///
/// Waits for the child to terminate, lets both drains run to end-of-stream
/// so the exit notification cannot race ahead of bytes still sitting in the
/// OS pipe buffers, then delivers on clean success and tears everything
/// down. Runs exactly once per launched process.
async fn supervise(
    program: String,
    mut resources: ProcessResources,
    output_tx: oneshot::Sender<Vec<u8>>,
) {
    let status = match resources.child.as_mut() {
        Some(child) => match child.wait().await {
            Ok(status) => status,
            Err(e) => {
                warn!(program = %program, error = %e, "failed waiting for child exit");
                resources.teardown();
                return;
            }
        },
        // Launch never hands over resources without a child.
        None => {
            resources.teardown();
            return;
        }
    };

    resources.stdout_buf = finish_drain(resources.stdout_drain.take(), &program, "stdout").await;
    resources.stderr_buf = finish_drain(resources.stderr_drain.take(), &program, "stderr").await;

    match status.code() {
        Some(0) => {
            // Ownership of the buffer moves to the receiver here; the
            // teardown below must not touch it again.
            let buffer = resources.stdout_buf.take().unwrap_or_default();
            if output_tx.send(buffer).is_err() {
                debug!(program = %program, "output receiver dropped before delivery");
            }
        }
        Some(code) if code >= ABNORMAL_EXIT_CODE => {
            warn!(
                program = %program,
                code,
                stderr = %stderr_excerpt(&resources.stderr_buf),
                "child exited unexpectedly; withholding output"
            );
        }
        Some(code) => {
            warn!(
                program = %program,
                code,
                stderr = %stderr_excerpt(&resources.stderr_buf),
                "child exited with nonzero status; withholding output"
            );
        }
        None => {
            warn!(program = %program, "child terminated by a signal; withholding output");
        }
    }

    resources.teardown();
}

/// Await a drain task and hand back its accumulator.
async fn finish_drain(
    handle: Option<JoinHandle<Option<Vec<u8>>>>,
    program: &str,
    stream: &'static str,
) -> Option<Vec<u8>> {
    match handle {
        Some(handle) => match handle.await {
            Ok(acc) => acc,
            Err(e) => {
                warn!(program = %program, stream, error = %e, "drain task failed");
                None
            }
        },
        None => None,
    }
}

/// Render captured stderr for a warning line, trimmed to a loggable size.
fn stderr_excerpt(buf: &Option<Vec<u8>>) -> String {
    const MAX: usize = 256;
    match buf {
        Some(bytes) => String::from_utf8_lossy(&bytes[..bytes.len().min(MAX)])
            .trim_end()
            .to_string(),
        None => String::from("<empty>"),
    }
}
