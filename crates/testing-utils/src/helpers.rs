//! Test helper utilities

use std::time::Duration;

use tokio::time::sleep;

/// Test environment setup utilities
pub struct TestEnv;

impl TestEnv {
    /// Poll `condition` every 10ms until it holds or `timeout` elapses
    pub async fn wait_for<F>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> bool,
    {
        let start = std::time::Instant::now();

        while start.elapsed() < timeout {
            if condition() {
                return true;
            }
            sleep(Duration::from_millis(10)).await;
        }

        condition()
    }
}
