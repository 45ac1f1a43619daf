use std::io;
use std::path::Path;
use std::time::Duration;

use hotbind_common::ConfigError;
use tracing::debug;

/// Bounded retry for reads that hit a file locked by another process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails with something other than a
    /// sharing violation, or the attempts are used up.
    pub(crate) fn run<R>(
        &self,
        path: &Path,
        mut op: impl FnMut() -> io::Result<R>,
    ) -> Result<R, ConfigError> {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if is_sharing_violation(&e) => {
                    if attempt >= attempts {
                        return Err(ConfigError::Locked {
                            path: path.to_path_buf(),
                            attempts,
                        });
                    }
                    debug!(
                        path = %path.display(),
                        attempt,
                        "config file locked by another process, retrying"
                    );
                    std::thread::sleep(self.backoff);
                    attempt += 1;
                }
                Err(e) => return Err(ConfigError::io(path, e)),
            }
        }
    }
}

/// `ERROR_SHARING_VIOLATION` / `ERROR_LOCK_VIOLATION` on Windows,
/// `EWOULDBLOCK` elsewhere.
pub(crate) fn is_sharing_violation(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}
