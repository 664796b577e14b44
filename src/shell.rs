//! # shell
//!
//! The interpreter context: every table the commands act on, plus borrowed
//! devices. All of it is touched from the one loop thread only, including
//! recursively while a payload runs; the only thing shared with the event
//! producers is the [`EventFlags`] passed to [`Shell::poll_events`].
//!
//! Recursion: a payload (script line, `-if` branch, callback, ticker) goes
//! through [`Shell::execute_payload`], which copies it into a scratch line and
//! re-enters [`Shell::handle_line`] one level deeper. Past
//! [`ShellConfig::max_nesting`] levels it refuses.
use crate::branch::Branch;
use crate::callback::{CallbackCommand, CallbackTable};
use crate::config::ShellConfig;
use crate::console::Console;
use crate::dispatch::{Command, CommandLine};
use crate::error::{ErrorCounters, ShellError};
use crate::flags::{EventFlags, EventSource};
use crate::gpio::{Gpio, GpioCommand};
use crate::input::{Input, InputEvent, LineBuffer};
use crate::memory::{parse_hex_address, MemoryMap};
use crate::regmachine::{self, Instruction};
use crate::registers::RegisterBank;
use crate::script::{ScriptCommand, ScriptStore, SCRIPT_LINES, SCRIPT_LINE_CAPACITY};
use crate::text::{truncated, Bounded, LINE_CAPACITY};
use crate::ticker::{TickerCommand, TickerTable};
use crate::timer::{self, TimerControl};
use std::io;

pub const PROMPT: &str = "> ";

pub struct Shell<'a> {
    console: &'a mut dyn Console,
    memory: &'a dyn MemoryMap,
    gpio: &'a mut dyn Gpio,
    timer: &'a mut dyn TimerControl,
    config: ShellConfig,
    pub registers: RegisterBank,
    pub scripts: ScriptStore,
    pub callbacks: CallbackTable,
    pub tickers: TickerTable,
    pub errors: ErrorCounters,
    /// payload nesting level of the line being handled
    depth: usize,
    /// script slots currently executing, outermost first
    running_lines: Vec<usize>,
}

impl<'a> Shell<'a> {
    pub fn new(
        console: &'a mut dyn Console,
        memory: &'a dyn MemoryMap,
        gpio: &'a mut dyn Gpio,
        timer: &'a mut dyn TimerControl,
        config: ShellConfig,
    ) -> Shell<'a> {
        Shell {
            console,
            memory,
            gpio,
            timer,
            config,
            registers: RegisterBank::new(),
            scripts: ScriptStore::new(),
            callbacks: CallbackTable::new(),
            tickers: TickerTable::new(),
            errors: ErrorCounters::new(),
            depth: 0,
            running_lines: Vec::new(),
        }
    }

    /// Run one command line. Every failure except a broken console ends up
    /// as a diagnostic on the console.
    pub fn handle_line(&mut self, line: &str) -> Result<(), io::Error> {
        let result = self.dispatch(line);
        self.settle(result)
    }

    /// Run a stored command line one nesting level down. The text is copied
    /// first, so the payload may freely rewrite the entry it came from.
    pub fn execute_payload(&mut self, payload: &str) -> Result<(), ShellError> {
        if self.depth >= self.config.max_nesting {
            return Err(ShellError::NestingTooDeep(self.config.max_nesting));
        }
        let scratch: Bounded<LINE_CAPACITY> = truncated(payload);
        self.depth += 1;
        let result = self.handle_line(&scratch);
        self.depth -= 1;
        Ok(result?)
    }

    /// Drain the event flags once, in their fixed order: the three callback
    /// sources, then one tick for every ticker.
    pub fn poll_events(&mut self, flags: &EventFlags) -> Result<(), io::Error> {
        for source in EventSource::POLL_ORDER {
            if flags.take(source) {
                self.service(source)?;
            }
        }
        Ok(())
    }

    /// what the loop does for one observed event
    pub fn service(&mut self, source: EventSource) -> Result<(), io::Error> {
        match CallbackTable::index_for(source) {
            Some(idx) => self.fire_callback(idx),
            None => self.tick(),
        }
    }

    fn fire_callback(&mut self, idx: usize) -> Result<(), io::Error> {
        if let Some(firing) = self.callbacks.begin(idx) {
            log::debug!("callback {} firing: {}", idx, firing.payload);
            let result = self.execute_payload(&firing.payload);
            self.callbacks.finish(&firing);
            self.settle(result)?;
        }
        Ok(())
    }

    /// Advance every ticker by one tick, in index order. Tickers armed by a
    /// payload during the sweep start counting on the next tick.
    pub fn tick(&mut self) -> Result<(), io::Error> {
        let sweep = self.tickers.generations();
        for (idx, since) in sweep.into_iter().enumerate() {
            if let Some(firing) = self.tickers.advance(idx, since) {
                log::debug!("ticker {} firing: {}", idx, firing.payload);
                let result = self.execute_payload(&firing.payload);
                self.tickers.finish(&firing);
                self.settle(result)?;
            }
        }
        Ok(())
    }

    /// Interactive loop: service events, assemble keystrokes into lines and
    /// run them, until the input says quit.
    pub fn main_loop(&mut self, input: &mut dyn Input, flags: &EventFlags) -> Result<(), io::Error> {
        let mut line = LineBuffer::new();
        self.banner()?;
        loop {
            self.poll_events(flags)?;
            match input.poll_event()? {
                Some(InputEvent::Char(c)) => match line.push(c) {
                    Ok(true) => self.console.write_str(c.encode_utf8(&mut [0; 4]))?,
                    Ok(false) => {}
                    Err(e) => {
                        self.console.write_str("\r\n")?;
                        self.settle(Err(e))?;
                        self.console.write_str(PROMPT)?;
                    }
                },
                Some(InputEvent::Backspace) => {
                    if line.backspace() {
                        self.console.write_str("\x08 \x08")?;
                    }
                }
                Some(InputEvent::Enter) => {
                    self.console.write_str("\r\n")?;
                    if let Some(text) = line.take() {
                        self.handle_line(&text)?;
                    }
                    self.console.write_str(PROMPT)?;
                }
                Some(InputEvent::Quit) => break,
                None => spin_sleep::sleep(self.config.idle_poll),
            }
        }
        self.console.write_str("\r\n")
    }

    fn banner(&mut self) -> Result<(), io::Error> {
        self.console.write_line("")?;
        self.console.write_line("*** MSP432 Command Shell Ready ***")?;
        self.console.write_line("Type -help for a list of commands.")?;
        self.console.write_line("")?;
        self.console.write_str(PROMPT)
    }

    /// report a failed command; only I/O errors get out of here
    fn settle(&mut self, result: Result<(), ShellError>) -> Result<(), io::Error> {
        match result {
            Ok(()) => Ok(()),
            Err(ShellError::Io(e)) => Err(e),
            Err(e) => {
                log::warn!("{}", e);
                self.errors.record(&e);
                self.console.write_line(&e.to_string())
            }
        }
    }

    fn write_lines(&mut self, lines: impl IntoIterator<Item = impl AsRef<str>>) -> Result<(), ShellError> {
        for l in lines {
            self.console.write_line(l.as_ref())?;
        }
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> Result<(), ShellError> {
        let cl = match CommandLine::parse(line)? {
            Some(cl) => cl,
            None => return Ok(()),
        };
        log::debug!("{} (depth {})", cl.command, self.depth);
        let args = cl.args();
        match cl.command {
            Command::Help => self.cmd_help(args),
            Command::About => self.cmd_about(),
            Command::Gpio => self.cmd_gpio(args),
            Command::Timer => self.cmd_timer(args),
            Command::Callback => self.cmd_callback(args),
            Command::Ticker => self.cmd_ticker(args),
            Command::Error => self.cmd_error(),
            Command::Print => Ok(self.console.write_line(args)?),
            Command::Memr => self.cmd_memr(args),
            Command::Reg => self.cmd_reg(args),
            Command::Script => self.cmd_script(args),
            Command::Rem => Ok(()),
            Command::If => self.cmd_if(args),
        }
    }

    fn cmd_help(&mut self, args: &str) -> Result<(), ShellError> {
        let topic = args.trim();
        if topic.is_empty() {
            let names: Vec<String> = Command::ALL.iter().map(Command::to_string).collect();
            return self.write_lines([
                format!("Commands: {}", names.join("  ")),
                "Use -help <cmd> for details.".to_string(),
            ]);
        }
        match topic.trim_start_matches('-').parse::<Command>() {
            Ok(c) => self.write_lines(c.help()),
            Err(_) => Ok(self.console.write_line("No help for that topic")?),
        }
    }

    fn cmd_about(&mut self) -> Result<(), ShellError> {
        let build = if cfg!(debug_assertions) { "debug" } else { "release" };
        let about = format!(
            "{} | {} | v{} | {} build",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_DESCRIPTION"),
            env!("CARGO_PKG_VERSION"),
            build
        );
        Ok(self.console.write_line(&about)?)
    }

    fn cmd_gpio(&mut self, args: &str) -> Result<(), ShellError> {
        if let Some(level) = GpioCommand::parse(args)?.execute(self.gpio)? {
            self.console.write_line(if level { "1" } else { "0" })?;
        }
        Ok(())
    }

    fn cmd_timer(&mut self, args: &str) -> Result<(), ShellError> {
        if args.trim().is_empty() {
            let report = match self.timer.period_us() {
                0 => "stopped".to_string(),
                us => format!("period {} us", us),
            };
            return Ok(self.console.write_line(&report)?);
        }
        self.timer.set_period_us(timer::parse_period(args)?);
        Ok(())
    }

    fn cmd_callback(&mut self, args: &str) -> Result<(), ShellError> {
        match CallbackCommand::parse(args)? {
            CallbackCommand::List => self.write_lines(self.callbacks.listing()),
            CallbackCommand::Disable(idx) => {
                self.callbacks.disable(idx)?;
                Ok(self.console.write_line("clr")?)
            }
            CallbackCommand::Arm {
                index,
                count,
                payload,
            } => {
                log::info!("callback {} armed x{}: {}", index, count, payload);
                self.callbacks.arm(index, count, payload)
            }
        }
    }

    fn cmd_ticker(&mut self, args: &str) -> Result<(), ShellError> {
        match TickerCommand::parse(args)? {
            TickerCommand::List => self.write_lines(self.tickers.listing()),
            TickerCommand::Disable(idx) => {
                self.tickers.disable(idx)?;
                Ok(self.console.write_line("clr")?)
            }
            TickerCommand::Arm {
                index,
                delay,
                period,
                count,
                payload,
            } => {
                log::info!(
                    "ticker {} armed delay {} period {} x{}: {}",
                    index,
                    delay,
                    period,
                    count,
                    payload
                );
                self.tickers.arm(index, delay, period, count, payload)
            }
        }
    }

    fn cmd_error(&mut self) -> Result<(), ShellError> {
        self.console.write_line("Errors:")?;
        let report: Vec<String> = self.errors.report().collect();
        self.write_lines(report)
    }

    fn cmd_memr(&mut self, args: &str) -> Result<(), ShellError> {
        if args.trim().is_empty() {
            return Err(ShellError::MissingAddress);
        }
        let addr = parse_hex_address(args).ok_or(ShellError::Usage("-memr addrhex"))?;
        let word = self.memory.read_word(addr)?;
        Ok(self.console.write_line(&format!("0x{:08X}", word))?)
    }

    fn cmd_reg(&mut self, args: &str) -> Result<(), ShellError> {
        if args.trim().is_empty() {
            return self.write_lines(regmachine::listing(&self.registers));
        }
        let dst = Instruction::parse(args)?.execute(&mut self.registers, self.memory)?;
        let value = self.registers.get(dst)?;
        Ok(self.console.write_line(&format!("R{}={}", dst, value))?)
    }

    fn cmd_if(&mut self, args: &str) -> Result<(), ShellError> {
        let branch = Branch::parse(args)?;
        match branch.select(&self.registers, self.memory)? {
            Some(clause) => self.execute_payload(clause),
            None => Ok(()),
        }
    }

    fn cmd_script(&mut self, args: &str) -> Result<(), ShellError> {
        match ScriptCommand::parse(args)? {
            ScriptCommand::List => self.write_lines(self.scripts.listing()),
            ScriptCommand::Show(n) => {
                let line = self.scripts.show(n)?;
                Ok(self.console.write_line(&line)?)
            }
            ScriptCommand::Write(n, text) => {
                self.scripts.write(n, text)?;
                Ok(self.console.write_line(&format!("Script {} loaded.", n))?)
            }
            ScriptCommand::Clear(n) => {
                self.scripts.clear(n)?;
                Ok(self.console.write_line(&format!("Script {} cleared.", n))?)
            }
            ScriptCommand::Execute(n) => self.run_script(n),
        }
    }

    /// Execute slots from `start` until an empty one. Emptiness is checked as
    /// each slot comes up, so lines may edit the slots after them.
    fn run_script(&mut self, start: usize) -> Result<(), ShellError> {
        if self.running_lines.iter().any(|&r| self.scripts.reaches(start, r)) {
            return Err(ShellError::ScriptReentry(start));
        }
        for idx in start..SCRIPT_LINES {
            let text: Bounded<SCRIPT_LINE_CAPACITY> = truncated(self.scripts.get(idx)?);
            if text.is_empty() {
                break;
            }
            self.running_lines.push(idx);
            let result = self.execute_payload(&text);
            self.running_lines.pop();
            result?;
        }
        Ok(())
    }
}
