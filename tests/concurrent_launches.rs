// tests/concurrent_launches.rs

use extproc::launch;
use extproc_test_utils::builders::ChildScript;
use extproc_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn concurrent_invocations_do_not_cross_contaminate() {
    init_tracing();

    let slow = ChildScript::new()
        .sleep_ms(100)
        .print("slow output")
        .into_invocation();
    let fast = ChildScript::new().print("fast output").into_invocation();

    let slow_process = launch(slow).expect("launch slow");
    let fast_process = launch(fast).expect("launch fast");

    let (slow_out, fast_out) =
        with_timeout(async { tokio::join!(slow_process.stdout(), fast_process.stdout()) }).await;

    assert_eq!(slow_out.as_deref(), Some(b"slow output".as_slice()));
    assert_eq!(fast_out.as_deref(), Some(b"fast output".as_slice()));
}

#[tokio::test]
async fn failure_of_one_invocation_leaves_another_untouched() {
    init_tracing();

    let failing = ChildScript::new()
        .print("doomed")
        .exit_with(255)
        .into_invocation();
    let healthy = ChildScript::new()
        .sleep_ms(50)
        .print("survivor")
        .into_invocation();

    let failing_process = launch(failing).expect("launch failing");
    let healthy_process = launch(healthy).expect("launch healthy");

    let (failed, survived) = with_timeout(async {
        tokio::join!(failing_process.stdout(), healthy_process.stdout())
    })
    .await;

    assert_eq!(failed, None);
    assert_eq!(survived.as_deref(), Some(b"survivor".as_slice()));
}

#[tokio::test]
async fn many_simultaneous_invocations_each_get_their_own_output() {
    init_tracing();

    let mut processes = Vec::new();
    for i in 0..8 {
        let invocation = ChildScript::new()
            .print(&format!("child-{i}"))
            .into_invocation();
        processes.push((i, launch(invocation).expect("launch")));
    }

    for (i, process) in processes {
        let stdout = with_timeout(process.stdout()).await;
        assert_eq!(stdout, Some(format!("child-{i}").into_bytes()));
    }
}
