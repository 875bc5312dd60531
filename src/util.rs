use anyhow::Result;
use std::time::{Duration, Instant};

use crate::error::WaitTimeout;

/// Poll `cond` until it returns true or `timeout` of wall-clock time elapses.
///
/// Fails with a downcastable [`WaitTimeout`] (with no pending job ids). The
/// condition is checked before the deadline, so a condition that already
/// holds succeeds even with a zero timeout.
pub fn wait_until(cond: impl Fn() -> bool, interval: Duration, timeout: Duration) -> Result<()> {
    let start = Instant::now();
    loop {
        if cond() {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(WaitTimeout {
                waited: start.elapsed(),
                pending: Vec::new(),
            }
            .into());
        }
        std::thread::sleep(interval);
    }
}
