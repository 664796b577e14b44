use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use uartshell::config::ShellConfig;
use uartshell::console::{self, TermConsole};
use uartshell::flags::{EventFlags, EventSource};
use uartshell::gpio::SimulatedGpio;
use uartshell::input::TermInput;
use uartshell::memory::{SimulatedMemory, FLASH_START};
use uartshell::shell::Shell;
use uartshell::timer::PeriodicTimer;

/// Host-side MSP432 command shell. F1/F2 press the board switches; Esc quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// callback timer period in microseconds (0 = stopped)
    #[arg(long, default_value_t = ShellConfig::default().timer_period_us)]
    timer_us: u32,

    /// ticker rate in milliseconds
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    /// how deep stored commands may nest
    #[arg(long, default_value_t = ShellConfig::default().max_nesting)]
    max_depth: usize,

    /// binary image to preload into flash at address 0
    #[arg(long)]
    flash: Option<PathBuf>,

    /// debug logging on stderr regardless of RUST_LOG
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut logger = env_logger::Builder::from_default_env();
    // stderr shares the raw-mode terminal
    logger.format(|buf, record| console::write_log_line(buf, record));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let config = ShellConfig {
        max_nesting: args.max_depth,
        timer_period_us: args.timer_us,
        tick_period: Duration::from_millis(args.tick_ms),
        ..ShellConfig::default()
    };

    let mut memory = SimulatedMemory::new();
    if let Some(path) = &args.flash {
        let n = memory.load(&mut File::open(path)?, FLASH_START)?;
        log::info!("loaded {} bytes from {}", n, path.display());
    }

    // the "interrupt" side
    let flags = EventFlags::new();
    let tick_us = u32::try_from(config.tick_period.as_micros())?;
    let _ticker = PeriodicTimer::start(tick_us, flags.producer(EventSource::Tick))?;
    let mut timer = PeriodicTimer::start(config.timer_period_us, flags.producer(EventSource::Timer))?;

    let mut console = TermConsole::new();
    let mut gpio = SimulatedGpio::new();
    let mut input = TermInput::new(
        flags.producer(EventSource::Switch1),
        flags.producer(EventSource::Switch2),
    )?;
    let mut shell = Shell::new(&mut console, &memory, &mut gpio, &mut timer, config);
    shell.main_loop(&mut input, &flags)?;
    Ok(())
}
