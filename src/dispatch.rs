//! Command-line splitting and the fixed command table.
use crate::error::ShellError;
use crate::text::split_word;
use std::fmt;
use std::str::FromStr;

/// marks the first token of every command line
pub const MARKER: char = '-';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    About,
    Gpio,
    Timer,
    Callback,
    Ticker,
    Error,
    Print,
    Memr,
    Reg,
    Script,
    Rem,
    If,
}

impl Command {
    /// in the order `-help` lists them
    pub const ALL: [Command; 13] = [
        Command::Help,
        Command::About,
        Command::Print,
        Command::Memr,
        Command::Gpio,
        Command::Timer,
        Command::Callback,
        Command::Ticker,
        Command::Reg,
        Command::Script,
        Command::If,
        Command::Rem,
        Command::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::About => "about",
            Command::Gpio => "gpio",
            Command::Timer => "timer",
            Command::Callback => "callback",
            Command::Ticker => "ticker",
            Command::Error => "error",
            Command::Print => "print",
            Command::Memr => "memr",
            Command::Reg => "reg",
            Command::Script => "script",
            Command::Rem => "rem",
            Command::If => "if",
        }
    }

    /// lines printed by `-help <cmd>`
    pub fn help(self) -> &'static [&'static str] {
        match self {
            Command::Help => &["-help [cmd]   : list all commands or details for <cmd>"],
            Command::About => &["-about        : show name, version and build"],
            Command::Print => &["-print text   : echo text exactly as entered"],
            Command::Memr => &[
                "-memr addrhex : read 32-bit word (flash 0x0-0x7FFFF | SRAM 0x20000000-0x2007FFFF)",
            ],
            Command::Gpio => &[
                "-gpio idx op [val]",
                "  idx 0-3 : LEDs, 4:PK5, 5:PD4, 6-7: switches",
                "  op  r      : read pin",
                "      w 0|1  : write (outputs only)",
                "      t      : toggle (outputs only)",
            ],
            Command::Error => &["-error        : show error counters since power-up"],
            Command::Timer => &[
                "-timer         : print current timer 0 period (us)",
                "-timer 0       : turn timer 0 off",
                "-timer val     : set timer 0 period (us)",
                "-timer val m   : set timer 0 period (ms)",
                "-timer val s   : set timer 0 period (s)",
                "Example: -timer 1000 m  (sets 1s period)",
            ],
            Command::Callback => &[
                "-callback           : show all callback info",
                "-callback idx count -payload : arm callback idx (0-2)",
                "  idx 0: timer, 1: SW1, 2: SW2",
                "  count: number of triggers, <0 infinite, 0 clears",
                "  payload: e.g. -print hello, -gpio 2 t",
                "Example: -callback 1 2 -gpio 3 t",
            ],
            Command::Ticker => &[
                "-ticker idx delay period count -payload",
                "  idx:     0-15 (selects ticker slot)",
                "  delay:   ticks (10ms) before the first run",
                "  period:  ticks (10ms) between runs",
                "  count:   number of runs (<0 means infinite)",
                "  payload: shell command (ex: -gpio 2 t)",
                "Example: -ticker 3 100 100 5 -gpio 2 t",
                "-ticker (no args) lists all tickers; -ticker idx 0 clears one",
            ],
            Command::Reg => &[
                "-reg                        : show all 32 registers",
                "-reg mov dst src            : dst = src",
                "-reg xchg rX rY             : swap two registers",
                "-reg inc/dec rX             : rX +/- 1",
                "-reg not/neg rX             : bitwise NOT / negate",
                "-reg add/sub/mul/div/rem dst src : dst = dst op src",
                "-reg and/ior/xor dst src    : bitwise ops",
                "-reg max/min dst src        : larger / smaller of the two",
                "Operands: rX, #imm, #xHEX, @addr, @xHEX, @rX",
                "Example: -reg add r2 r1     (r2 += r1)",
            ],
            Command::Script => &[
                "-script                  : display all script lines",
                "-script N                : show script line N",
                "-script N w CMD...       : write CMD... to line N",
                "-script N x              : execute from line N to the next empty line",
                "-script N c              : clear line N",
            ],
            Command::If => &[
                "-if A COND B ? DESTT : DESTF",
                "  A/B: rN (register) or #IMM",
                "  COND: >  =  <",
                "Example: -if r3 < #10 ? : -print hi",
            ],
            Command::Rem => &["-rem [text]   : comment line (does nothing)"],
        }
    }
}

impl FromStr for Command {
    type Err = ShellError;

    /// exact, case-sensitive match on the name without its marker
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or(ShellError::UnknownCommand)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MARKER, self.name())
    }
}

/// A command line split into its command and the raw rest of the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandLine<'a> {
    pub command: Command,
    /// everything after the first whitespace run, untouched; `None` if blank
    pub args: Option<&'a str>,
}

impl<'a> CommandLine<'a> {
    /// `Ok(None)` for a blank line, which is silently ignored.
    pub fn parse(line: &'a str) -> Result<Option<CommandLine<'a>>, ShellError> {
        let (token, rest) = split_word(line.trim_start());
        if token.is_empty() {
            return Ok(None);
        }
        let name = token.strip_prefix(MARKER).ok_or(ShellError::MissingMarker)?;
        let command = name.parse()?;
        let rest = rest.trim_start();
        Ok(Some(CommandLine {
            command,
            args: Some(rest).filter(|r| !r.is_empty()),
        }))
    }

    pub fn args(&self) -> &'a str {
        self.args.unwrap_or("")
    }
}
