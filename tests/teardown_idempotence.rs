// tests/teardown_idempotence.rs

use std::process::Stdio;

use tokio::process::Command;

use extproc::launch;
use extproc::runner::{DEFAULT_READ_CHUNK, ProcessResources, drain_stream};
use extproc_test_utils::builders::ChildScript;
use extproc_test_utils::{init_tracing, with_timeout};

/// Build resources around a real child, the same shape the launch path uses.
async fn spawn_resources() -> ProcessResources {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg("sleep 1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn sleeping child");

    let stdout_pipe = child.stdout.take().expect("stdout pipe");
    let stderr_pipe = child.stderr.take().expect("stderr pipe");

    ProcessResources {
        pid: child.id(),
        child: Some(child),
        stdout_drain: Some(tokio::spawn(drain_stream(
            stdout_pipe,
            DEFAULT_READ_CHUNK,
            "stdout",
        ))),
        stderr_drain: Some(tokio::spawn(drain_stream(
            stderr_pipe,
            DEFAULT_READ_CHUNK,
            "stderr",
        ))),
        stdout_buf: None,
        stderr_buf: None,
    }
}

#[tokio::test]
async fn teardown_releases_every_slot() {
    init_tracing();

    let mut resources = spawn_resources().await;
    assert!(!resources.is_torn_down());

    resources.teardown();
    assert!(resources.is_torn_down());
}

#[tokio::test]
async fn teardown_twice_is_a_noop() {
    init_tracing();

    let mut resources = spawn_resources().await;
    resources.teardown();
    assert!(resources.is_torn_down());

    // The second run must find every slot already released and do nothing.
    resources.teardown();
    assert!(resources.is_torn_down());
}

#[tokio::test]
async fn supervisor_tears_down_after_delivery() {
    init_tracing();

    let invocation = ChildScript::new().print("done").into_invocation();
    let process = launch(invocation).expect("launch");

    with_timeout(async {
        while !process.is_finished() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await;

    // Delivery stays buffered in the one-shot channel after the supervisor
    // has finished and released everything else.
    assert_eq!(process.stdout().await.as_deref(), Some(b"done".as_slice()));
}
