// tests/logging_init.rs

use extproc::logging::init_logging;

// Runs in its own test binary: installing the global subscriber here cannot
// collide with the per-test subscribers used by the other suites.
#[test]
fn init_logging_installs_the_global_subscriber() {
    init_logging(Some(tracing::Level::DEBUG)).expect("first init succeeds");
    tracing::debug!("subscriber is live");
}
