//! Waiting on external tools, with an optional deadline

use std::io;
use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The process exited on its own
    Exited(ExitStatus),
    /// The deadline passed; the process was killed and reaped
    TimedOut,
}

impl Completion {
    /// True only for a normal exit with status zero
    pub fn succeeded(&self) -> bool {
        matches!(self, Completion::Exited(status) if status.success())
    }
}

/// Wait for `child`, killing it once `timeout` elapses
///
/// Without a timeout this blocks until the process exits.
pub fn wait_for(child: &mut Child, timeout: Option<Duration>) -> io::Result<Completion> {
    let Some(timeout) = timeout else {
        return child.wait().map(Completion::Exited);
    };

    // A deadline past what `Instant` can represent never arrives.
    let Some(deadline) = Instant::now().checked_add(timeout) else {
        return child.wait().map(Completion::Exited);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Completion::Exited(status));
        }
        if Instant::now() >= deadline {
            // The child may exit between try_wait and kill.
            match child.kill() {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
                Err(e) => return Err(e),
            }
            child.wait()?;
            return Ok(Completion::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
