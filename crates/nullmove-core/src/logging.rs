// Nullmove Logging
// Console logger pre-daemonization, syslog after detachment

use std::ffi::CString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{Level, Log, Metadata, Record, SetLoggerError};

const SYSLOG_IDENT: &[u8] = b"nullmove\0";

/// Logger that writes human-readable lines to the console until the process
/// detaches, then forwards to the system log facility.
///
/// Syslog only receives INFO and above; per-key DEBUG chatter stays on the
/// console side and disappears with it.
struct ServiceLogger {
    console: env_logger::Logger,
    syslog: Arc<AtomicBool>,
}

impl Log for ServiceLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.syslog.load(Ordering::SeqCst) {
            self.console.log(record);
            return;
        }

        let priority = match record.level() {
            Level::Error => libc::LOG_ERR,
            Level::Warn => libc::LOG_WARNING,
            Level::Info => libc::LOG_INFO,
            Level::Debug | Level::Trace => return,
        };
        let Ok(message) = CString::new(format!("{}", record.args())) else {
            return;
        };
        unsafe {
            libc::syslog(priority, b"%s\0".as_ptr().cast(), message.as_ptr());
        }
    }

    fn flush(&self) {
        if !self.syslog.load(Ordering::SeqCst) {
            self.console.flush();
        }
    }
}

/// Handle for flipping the installed logger over to syslog.
#[derive(Clone)]
pub struct LogSwitch {
    syslog: Arc<AtomicBool>,
}

impl LogSwitch {
    /// Open the system log connection and route all further records to it.
    /// Called once, right after the daemon transition.
    pub fn to_syslog(&self) {
        unsafe {
            libc::openlog(SYSLOG_IDENT.as_ptr().cast(), libc::LOG_PID, libc::LOG_DAEMON);
        }
        self.syslog.store(true, Ordering::SeqCst);
    }
}

/// Install the switching logger. Defaults to INFO on the console;
/// `RUST_LOG` overrides as usual.
pub fn init() -> Result<LogSwitch, SetLoggerError> {
    let console = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .build();
    let max_level = console.filter();
    let syslog = Arc::new(AtomicBool::new(false));
    let switch = LogSwitch {
        syslog: Arc::clone(&syslog),
    };

    log::set_boxed_logger(Box::new(ServiceLogger { console, syslog }))?;
    log::set_max_level(max_level);
    Ok(switch)
}
