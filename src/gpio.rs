use crate::error::ShellError;

pub const NUM_PINS: usize = 8;
/// indices at and above this are the switches, which are inputs
pub const FIRST_INPUT: usize = 6;

const PIN_NAMES: [&str; NUM_PINS] = ["LED0", "LED1", "LED2", "LED3", "PK5", "PD4", "SW1", "SW2"];

/// Digital I/O over the board's eight shell-visible pins.
pub trait Gpio {
    fn read(&mut self, idx: usize) -> Result<bool, ShellError>;
    fn write(&mut self, idx: usize, high: bool) -> Result<(), ShellError>;
    fn toggle(&mut self, idx: usize) -> Result<(), ShellError>;
}

/// pins that only live in memory; logs every change
#[derive(Debug, Default)]
pub struct SimulatedGpio {
    levels: [bool; NUM_PINS],
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// drive an input from outside, e.g. a switch being held
    pub fn set_input(&mut self, idx: usize, high: bool) {
        if let Some(l) = self.levels.get_mut(idx) {
            *l = high;
        }
    }

    fn output(&mut self, idx: usize) -> Result<&mut bool, ShellError> {
        if idx >= NUM_PINS {
            return Err(ShellError::BadGpio("idx out of range"));
        }
        if idx >= FIRST_INPUT {
            return Err(ShellError::BadGpio("cannot drive input"));
        }
        Ok(&mut self.levels[idx])
    }
}

impl Gpio for SimulatedGpio {
    fn read(&mut self, idx: usize) -> Result<bool, ShellError> {
        self.levels
            .get(idx)
            .copied()
            .ok_or(ShellError::BadGpio("idx out of range"))
    }

    fn write(&mut self, idx: usize, high: bool) -> Result<(), ShellError> {
        *self.output(idx)? = high;
        log::info!("{} <- {}", PIN_NAMES[idx], high as u8);
        Ok(())
    }

    fn toggle(&mut self, idx: usize) -> Result<(), ShellError> {
        let level = self.output(idx)?;
        *level = !*level;
        let now = *level;
        log::info!("{} toggled to {}", PIN_NAMES[idx], now as u8);
        Ok(())
    }
}

/// A decoded `-gpio` line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpioCommand {
    Read(usize),
    Write(usize, bool),
    Toggle(usize),
}

impl GpioCommand {
    pub fn parse(args: &str) -> Result<GpioCommand, ShellError> {
        let mut tokens = args.split_whitespace();
        let idx = tokens.next().ok_or(ShellError::GpioParse("usage: -gpio idx op ..."))?;
        if !idx.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ShellError::GpioParse("bad idx"));
        }
        let idx = match idx.parse::<usize>() {
            Ok(i) if i < NUM_PINS => i,
            _ => return Err(ShellError::BadGpio("idx out of range")),
        };
        match tokens.next() {
            Some("r") => Ok(GpioCommand::Read(idx)),
            Some("t") => Ok(GpioCommand::Toggle(idx)),
            Some("w") => match tokens.next() {
                Some("0") => Ok(GpioCommand::Write(idx, false)),
                Some("1") => Ok(GpioCommand::Write(idx, true)),
                _ => Err(ShellError::GpioParse("need 0 or 1")),
            },
            _ => Err(ShellError::GpioParse("op must be r/w/t")),
        }
    }

    /// run against a pin bank; reads return the level
    pub fn execute(self, gpio: &mut dyn Gpio) -> Result<Option<bool>, ShellError> {
        match self {
            GpioCommand::Read(i) => gpio.read(i).map(Some),
            GpioCommand::Write(i, v) => gpio.write(i, v).map(|_| None),
            GpioCommand::Toggle(i) => gpio.toggle(i).map(|_| None),
        }
    }
}
