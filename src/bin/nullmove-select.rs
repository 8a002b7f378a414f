// Nullmove Select CLI
// Interactive single-keyboard variant: pick one device, no daemonization

use std::io::{self, BufRead, Write};
use std::process;

use anyhow::{ensure, Context};
use signal_hook::consts::{SIGINT, SIGTERM};

use nullmove_core::{
    find_keyboards, DetectionPolicy, DispatchLoop, NoopHook, NullTracker, ShutdownToken,
    VirtualKeyboard,
};

/// This variant lists more candidates because the name heuristic is looser.
const MAX_KEYBOARDS: usize = 10;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{:#}", e);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let shutdown =
        ShutdownToken::for_signals(&[SIGINT, SIGTERM]).context("installing signal handlers")?;

    let mut keyboards = find_keyboards(DetectionPolicy::NameMatch, MAX_KEYBOARDS);
    ensure!(!keyboards.is_empty(), "no keyboards found");

    println!("Available keyboards:");
    for (index, keyboard) in keyboards.iter().enumerate() {
        println!(
            "  {}: {} ({})",
            index + 1,
            keyboard.name,
            keyboard.path.display()
        );
    }
    print!("Select keyboard [1-{}]: ", keyboards.len());
    io::stdout().flush().context("writing prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading selection")?;
    let choice: usize = line
        .trim()
        .parse()
        .with_context(|| format!("invalid selection '{}'", line.trim()))?;
    ensure!(
        (1..=keyboards.len()).contains(&choice),
        "selection {} out of range 1-{}",
        choice,
        keyboards.len()
    );

    // The unchosen handles close here.
    let selected = keyboards.swap_remove(choice - 1);
    drop(keyboards);
    log::info!("filtering keyboard: {}", selected.name);

    let mut sink = VirtualKeyboard::create().context("creating virtual output device")?;
    let mut tracker = NullTracker::new();
    let mut dispatch =
        DispatchLoop::new(vec![selected], &shutdown).context("preparing dispatch loop")?;

    let mut hook = NoopHook;
    let result = dispatch.run(&mut tracker, &mut sink, &shutdown, &mut hook);

    sink.close();
    dispatch.ungrab_all();
    drop(dispatch);

    result.context("dispatch loop failed")?;
    log::info!("shutting down");
    Ok(())
}
