// Nullmove Daemonization
// Foreground -> Detached lifecycle transition

use std::os::unix::io::RawFd;
use std::process;

use nix::fcntl::{open, OFlag};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::stat::{umask, Mode};
use nix::unistd::{chdir, close, dup2, fork, setsid, ForkResult};

/// Errors during the detach transition. All are fatal; the process must not
/// keep filtering half-detached.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),

    #[error("setsid failed: {0}")]
    Setsid(#[source] nix::Error),

    #[error("failed to ignore signal: {0}")]
    IgnoreSignal(#[source] nix::Error),

    #[error("chdir to / failed: {0}")]
    Chdir(#[source] nix::Error),

    #[error("failed to redirect stdio to /dev/null: {0}")]
    Redirect(#[source] nix::Error),
}

/// Detach into a background daemon.
///
/// Double fork with a `setsid` in between, ignoring SIGCHLD and SIGHUP,
/// clearing the umask, and moving to `/`. Only the standard streams are
/// redirected to `/dev/null`: every already-open device and sink descriptor
/// survives the transition, so the caller keeps filtering without reopening
/// anything. The caller is responsible for switching the log destination.
pub fn daemonize() -> Result<(), DaemonError> {
    fork_and_exit_parent()?;

    setsid().map_err(DaemonError::Setsid)?;

    // The daemon must not die with the session leader or collect children.
    unsafe {
        signal(Signal::SIGCHLD, SigHandler::SigIgn).map_err(DaemonError::IgnoreSignal)?;
        signal(Signal::SIGHUP, SigHandler::SigIgn).map_err(DaemonError::IgnoreSignal)?;
    }

    // Second fork: the session leader exits, so the daemon can never
    // reacquire a controlling terminal.
    fork_and_exit_parent()?;

    umask(Mode::empty());
    chdir("/").map_err(DaemonError::Chdir)?;
    redirect_stdio()?;

    Ok(())
}

fn fork_and_exit_parent() -> Result<(), DaemonError> {
    // Safe here: the process is single-threaded, so the child inherits a
    // consistent address space.
    match unsafe { fork() }.map_err(DaemonError::Fork)? {
        ForkResult::Parent { .. } => process::exit(0),
        ForkResult::Child => Ok(()),
    }
}

fn redirect_stdio() -> Result<(), DaemonError> {
    let null: RawFd = open("/dev/null", OFlag::O_RDWR, Mode::empty())
        .map_err(DaemonError::Redirect)?;
    for fd in 0..3 {
        dup2(null, fd).map_err(DaemonError::Redirect)?;
    }
    if null > 2 {
        let _ = close(null);
    }
    Ok(())
}
