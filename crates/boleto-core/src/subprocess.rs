//! Deadlines for external tools (`pdftoppm`, `tesseract`).

use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};

use tracing::warn;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Poll the child until it exits or the deadline passes (`Ok(None)`).
pub(crate) fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Wait for the child, killing it at the deadline. `Ok(None)` means it was killed.
pub(crate) fn wait_or_kill(child: &mut Child, deadline: Instant, tool: &str) -> std::io::Result<Option<ExitStatus>> {
    let status = wait_until(child, deadline)?;
    if status.is_none() {
        warn!("{} passed its deadline, killing", tool);
        let _ = child.kill();
        let _ = child.wait();
    }
    Ok(status)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_wait_until_times_out() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let status = wait_until(&mut child, Instant::now() + Duration::from_millis(100)).unwrap();
        assert!(status.is_none());
        child.kill().unwrap();
        child.wait().unwrap();
    }

    #[test]
    fn test_wait_or_kill_reaps_child() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let start = Instant::now();
        let status = wait_or_kill(&mut child, start + Duration::from_millis(100), "sleep").unwrap();
        assert!(status.is_none());
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_fast_child_returns_status() {
        let mut child = Command::new("true").spawn().unwrap();
        let status = wait_or_kill(&mut child, Instant::now() + Duration::from_secs(5), "true").unwrap();
        assert!(status.is_some_and(|s| s.success()));
    }
}
