// Nullmove Dispatch Loop
// Multiplexes reads across keyboards and feeds the tracker into the sink

use std::io;
use std::os::unix::io::AsRawFd;

use evdev::InputEvent;
use nix::fcntl::{fcntl, FcntlArg, OFlag};

use super::{RawEvent, EV_KEY};
use crate::action::Action;
use crate::input::Keyboard;
use crate::key::KeyCode;
use crate::output::EventSink;
use crate::shutdown::ShutdownToken;
use crate::state::NullTracker;

/// Errors that terminate the dispatch loop.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to grab device '{name}': {source}")]
    Grab {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to configure device '{name}': {source}")]
    Configure {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("wait for events failed: {0}")]
    Poll(#[source] io::Error),

    #[error("device read failed on '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("lifecycle hook failed: {0}")]
    Lifecycle(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Lifecycle seam: notified once per initial key press.
///
/// The loop itself knows nothing about daemonization; the binary installs a
/// hook that counts presses and detaches when its threshold is reached. A
/// hook error is fatal to the run.
pub trait ActivityHook {
    fn key_pressed(&mut self, key: KeyCode)
        -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Hook that does nothing; used by the non-daemonizing variant.
pub struct NoopHook;

impl ActivityHook for NoopHook {
    fn key_pressed(
        &mut self,
        _key: KeyCode,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Single-threaded event pump over all enumerated keyboards.
///
/// Owns the device handles for the process lifetime. Devices are grabbed for
/// exclusive access so the unfiltered stream never reaches other consumers,
/// and ungrabbed on drop; the Drop guarantee matters because a panic must not
/// leave the physical keyboards seized.
pub struct DispatchLoop {
    keyboards: Vec<Keyboard>,
    /// Device pollfds first, wake pipe last.
    poll_fds: Vec<libc::pollfd>,
    grabbed: bool,
}

impl DispatchLoop {
    /// Take ownership of the keyboards, switch their fds to non-blocking
    /// reads, grab them, and build the poll set around the token's wake fd.
    pub fn new(keyboards: Vec<Keyboard>, shutdown: &ShutdownToken) -> Result<Self, DispatchError> {
        let mut keyboards = keyboards;

        for keyboard in &mut keyboards {
            set_nonblocking(keyboard.device.as_raw_fd()).map_err(|source| {
                DispatchError::Configure {
                    name: keyboard.name.clone(),
                    source,
                }
            })?;

            // Ungrab first in case a previous instance crashed while holding
            // the grab.
            let _ = keyboard.device.ungrab();
            keyboard.device.grab().map_err(|source| DispatchError::Grab {
                name: keyboard.name.clone(),
                source,
            })?;
        }

        let mut poll_fds: Vec<libc::pollfd> = keyboards
            .iter()
            .map(|k| libc::pollfd {
                fd: k.device.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();
        poll_fds.push(libc::pollfd {
            fd: shutdown.wake_fd(),
            events: libc::POLLIN,
            revents: 0,
        });

        Ok(Self {
            keyboards,
            poll_fds,
            grabbed: true,
        })
    }

    /// Number of devices this loop reads from.
    pub fn device_count(&self) -> usize {
        self.keyboards.len()
    }

    /// Release the exclusive grabs (also runs on drop).
    pub fn ungrab_all(&mut self) {
        if self.grabbed {
            for keyboard in &mut self.keyboards {
                let _ = keyboard.device.ungrab();
            }
            self.grabbed = false;
        }
    }

    /// Block on all devices until cancellation, feeding every raw event
    /// through the tracker and forwarding the corrected burst to the sink.
    ///
    /// Returns `Ok(())` when the token fires. Sink write failures are logged
    /// and skipped; a non-transient device read failure ends the run with an
    /// error so the caller can shut down in order.
    pub fn run(
        &mut self,
        tracker: &mut NullTracker,
        sink: &mut dyn EventSink,
        shutdown: &ShutdownToken,
        hook: &mut dyn ActivityHook,
    ) -> Result<(), DispatchError> {
        while !shutdown.is_cancelled() {
            let rc = unsafe {
                libc::poll(
                    self.poll_fds.as_mut_ptr(),
                    self.poll_fds.len() as libc::nfds_t,
                    -1,
                )
            };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(DispatchError::Poll(err));
            }

            // Wake pipe is the last entry; drain it and let the loop
            // condition re-check the flag.
            if let Some(wake) = self.poll_fds.last() {
                if wake.revents & libc::POLLIN != 0 {
                    shutdown.drain();
                    continue;
                }
            }

            for i in 0..self.keyboards.len() {
                if self.poll_fds[i].revents & libc::POLLIN == 0 {
                    continue;
                }
                self.drain_device(i, tracker, sink, hook)?;
            }
        }

        Ok(())
    }

    /// Read a ready device until it reports would-block.
    fn drain_device(
        &mut self,
        index: usize,
        tracker: &mut NullTracker,
        sink: &mut dyn EventSink,
        hook: &mut dyn ActivityHook,
    ) -> Result<(), DispatchError> {
        loop {
            let keyboard = &mut self.keyboards[index];
            match keyboard.device.fetch_events() {
                Ok(events) => {
                    let events: Vec<InputEvent> = events.collect();
                    for event in events {
                        dispatch_event(&event, tracker, sink, hook)?;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    let name = keyboard.name.clone();
                    log::error!("error reading events from '{}': {}", name, source);
                    return Err(DispatchError::Read { name, source });
                }
            }
        }
    }
}

impl Drop for DispatchLoop {
    fn drop(&mut self) {
        self.ungrab_all();
    }
}

/// Feed one raw event through the tracker and emit its output burst.
fn dispatch_event(
    event: &InputEvent,
    tracker: &mut NullTracker,
    sink: &mut dyn EventSink,
    hook: &mut dyn ActivityHook,
) -> Result<(), DispatchError> {
    let raw = if event.event_type().0 == EV_KEY {
        match Action::from_i32(event.value()) {
            Some(action) => {
                if action.just_pressed() {
                    if let Some(key) = KeyCode::new(event.code()) {
                        log::debug!("key pressed: {}", key);
                        hook.key_pressed(key).map_err(DispatchError::Lifecycle)?;
                    }
                } else if action.is_released() {
                    log::debug!("key released: {}", crate::key::key_name(event.code()));
                }
                RawEvent::Key {
                    code: event.code(),
                    action,
                }
            }
            // Unrecognized key value; forward untouched rather than guess.
            None => RawEvent::Other {
                event_type: EV_KEY,
                code: event.code(),
                value: event.value(),
            },
        }
    } else {
        RawEvent::Other {
            event_type: event.event_type().0,
            code: event.code(),
            value: event.value(),
        }
    };

    for out in tracker.process(raw) {
        if let Err(e) = sink.emit(&out) {
            // Transient under kernel buffer pressure; drop rather than
            // stall the single dispatch thread on a retry.
            log::warn!("dropping output event {:?}: {}", out, e);
        }
    }

    Ok(())
}

fn set_nonblocking(fd: i32) -> io::Result<()> {
    let current = fcntl(fd, FcntlArg::F_GETFL)
        .map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;
    let flags = OFlag::from_bits_truncate(current) | OFlag::O_NONBLOCK;
    fcntl(fd, FcntlArg::F_SETFL(flags))
        .map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;
    Ok(())
}
