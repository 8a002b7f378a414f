// Nullmove CLI
// Auto-detecting null-movement filter with background detachment

use std::process;

use anyhow::{ensure, Context};
use signal_hook::consts::{SIGINT, SIGTERM};

use nullmove_core::{
    daemonize, find_keyboards, init_logging, ActivityHook, DetectionPolicy, DispatchLoop, KeyCode,
    LogSwitch, NullTracker, ShutdownToken, VirtualKeyboard,
};

/// Bound on how many keyboards feed the shared tracker.
const MAX_KEYBOARDS: usize = 5;

/// Initial key presses observed before the process detaches.
const DAEMONIZE_AFTER_PRESSES: u32 = 10;

/// Counts initial presses and performs the Foreground -> Detached transition
/// once the activity threshold is reached. Device and sink handles survive
/// the detachment untouched.
struct DaemonAfterActivity {
    presses: u32,
    detached: bool,
    logs: LogSwitch,
}

impl DaemonAfterActivity {
    fn new(logs: LogSwitch) -> Self {
        Self {
            presses: 0,
            detached: false,
            logs,
        }
    }
}

impl ActivityHook for DaemonAfterActivity {
    fn key_pressed(
        &mut self,
        key: KeyCode,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.detached {
            return Ok(());
        }

        self.presses += 1;
        log::info!(
            "key pressed: {} ({}/{})",
            key,
            self.presses,
            DAEMONIZE_AFTER_PRESSES
        );

        if self.presses >= DAEMONIZE_AFTER_PRESSES {
            log::info!("daemonizing...");
            daemonize()?;
            self.logs.to_syslog();
            log::info!("null movement keyboard daemon started");
            self.detached = true;
        }
        Ok(())
    }
}

fn main() {
    let logs = match init_logging() {
        Ok(logs) => logs,
        Err(e) => {
            eprintln!("failed to install logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(logs) {
        log::error!("{:#}", e);
        process::exit(1);
    }
}

fn run(logs: LogSwitch) -> anyhow::Result<()> {
    log::info!("null movement keyboard starting");

    let shutdown =
        ShutdownToken::for_signals(&[SIGINT, SIGTERM]).context("installing signal handlers")?;

    let keyboards = find_keyboards(DetectionPolicy::Capabilities, MAX_KEYBOARDS);
    ensure!(!keyboards.is_empty(), "no keyboards found");

    let mut sink = VirtualKeyboard::create().context("creating virtual output device")?;
    let mut tracker = NullTracker::new();
    let mut dispatch =
        DispatchLoop::new(keyboards, &shutdown).context("preparing dispatch loop")?;

    log::info!(
        "filtering {} keyboard(s); press any key {} times to detach into the background",
        dispatch.device_count(),
        DAEMONIZE_AFTER_PRESSES
    );

    let mut hook = DaemonAfterActivity::new(logs);
    let result = dispatch.run(&mut tracker, &mut sink, &shutdown, &mut hook);

    // Orderly teardown on both paths: destroy the sink first, then release
    // the grabs; the device handles close when the loop drops.
    sink.close();
    dispatch.ungrab_all();
    drop(dispatch);

    result.context("dispatch loop failed")?;
    log::info!("null movement keyboard shutting down");
    Ok(())
}
