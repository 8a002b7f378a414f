// Nullmove Shutdown Token
// Cooperative cancellation: a signal flag plus a pipe wired into the poll set

use std::io;
use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nix::fcntl::OFlag;

/// Cancellation signal shared between the signal handlers and the dispatch
/// loop.
///
/// Registered signals set the flag and write one byte to the wake pipe, so a
/// `poll(2)` blocked on the read end returns immediately instead of waiting
/// for the next key event. Both ends stay open for the process lifetime.
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
    wake_read: OwnedFd,
    _wake_write: OwnedFd,
}

impl ShutdownToken {
    /// Install handlers for the given signals and build the token.
    pub fn for_signals(signals: &[libc::c_int]) -> io::Result<Self> {
        let flag = Arc::new(AtomicBool::new(false));
        let (wake_read, wake_write) = nix::unistd::pipe2(OFlag::O_NONBLOCK | OFlag::O_CLOEXEC)
            .map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;

        for signal in signals {
            signal_hook::flag::register(*signal, Arc::clone(&flag))?;
            signal_hook::low_level::pipe::register_raw(*signal, wake_write.as_raw_fd())?;
        }

        Ok(Self {
            flag,
            wake_read,
            _wake_write: wake_write,
        })
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation directly (tests and the emergency path).
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let buf = [0u8; 1];
        // The pipe is non-blocking; a full pipe still wakes the poller.
        unsafe {
            libc::write(self._wake_write.as_raw_fd(), buf.as_ptr().cast(), 1);
        }
    }

    /// The read end to include in the poll set.
    pub fn wake_fd(&self) -> RawFd {
        self.wake_read.as_raw_fd()
    }

    /// Discard pending wake bytes so the fd stops reading as ready.
    pub fn drain(&self) {
        let mut buf = [0u8; 64];
        loop {
            let n = unsafe {
                libc::read(
                    self.wake_read.as_raw_fd(),
                    buf.as_mut_ptr().cast(),
                    buf.len(),
                )
            };
            if n <= 0 {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_uncancelled() {
        // No signals registered; just the pipe plumbing.
        let token = ShutdownToken::for_signals(&[]).unwrap();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_sets_flag_and_wakes() {
        let token = ShutdownToken::for_signals(&[]).unwrap();
        token.cancel();
        assert!(token.is_cancelled());

        // The wake byte must be readable on the poll fd.
        let mut fds = [libc::pollfd {
            fd: token.wake_fd(),
            events: libc::POLLIN,
            revents: 0,
        }];
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), 1, 0) };
        assert_eq!(rc, 1);
        assert_ne!(fds[0].revents & libc::POLLIN, 0);

        token.drain();
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), 1, 0) };
        assert_eq!(rc, 0);
    }
}
