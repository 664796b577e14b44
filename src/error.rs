use std::fmt;
use std::io;
use thiserror::Error;

/// Everything a command can go wrong with. The `Display` text is exactly what
/// gets printed back to the operator.
#[derive(Debug, Error)]
pub enum ShellError {
    // syntax
    #[error("?? unknown (expected leading '-')")]
    MissingMarker,
    #[error("?? unknown")]
    UnknownCommand,
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Bad src")]
    BadSource,
    #[error("Bad dst")]
    BadDestination,
    #[error("Bad reg")]
    BadRegister,
    #[error("Bad A")]
    BadLeftOperand,
    #[error("Bad B")]
    BadRightOperand,
    #[error("COND?")]
    BadCondition,
    #[error("Bad '?' in -if")]
    MissingQuestionMark,

    // semantic
    #[error("Bad op")]
    BadOpcode,
    #[error("div0")]
    DivideByZero,
    #[error("Bad line {0} (0-{max})", max = crate::script::SCRIPT_LINES - 1)]
    BadScriptLine(i64),
    #[error("idx0-2")]
    BadCallbackIndex,
    #[error("idx0-15")]
    BadTickerIndex,
    #[error("script {0} would re-enter itself")]
    ScriptReentry(usize),
    #[error("nesting too deep (max {0})")]
    NestingTooDeep(usize),

    // resources
    #[error("need addr...")]
    MissingAddress,
    #[error("addr 0x{0:08X} out of range")]
    AddressOutOfRange(u32),
    #[error("bad timer period")]
    BadTimerPeriod,

    // gpio
    #[error("{0}")]
    GpioParse(&'static str),
    #[error("{0}")]
    BadGpio(&'static str),

    // capacity
    #[error("!! character-overflow ({0} max) start again")]
    LineOverflow(usize),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// which of the diagnostic counters this error feeds, if any
    pub fn counter(&self) -> Option<ErrorKind> {
        match self {
            ShellError::MissingMarker | ShellError::UnknownCommand => Some(ErrorKind::UnknownCommand),
            ShellError::LineOverflow(_) => Some(ErrorKind::Overflow),
            ShellError::BadGpio(_) => Some(ErrorKind::BadGpio),
            ShellError::GpioParse(_) => Some(ErrorKind::GpioParse),
            _ => None,
        }
    }
}

/// The counted error families. Only these show up in `-error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownCommand,
    Overflow,
    BadGpio,
    GpioParse,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 4] = [
        ErrorKind::UnknownCommand,
        ErrorKind::Overflow,
        ErrorKind::BadGpio,
        ErrorKind::GpioParse,
    ];

    fn name(self) -> &'static str {
        match self {
            ErrorKind::UnknownCommand => "unknown_cmd",
            ErrorKind::Overflow => "overflow",
            ErrorKind::BadGpio => "bad_gpio",
            ErrorKind::GpioParse => "parse_gpio",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Counters since power-up; never reset.
#[derive(Debug, Default)]
pub struct ErrorCounters {
    counts: [u32; 4],
}

impl ErrorCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// bump the counter for `err`, if it is a counted kind
    pub fn record(&mut self, err: &ShellError) {
        if let Some(kind) = err.counter() {
            self.bump(kind);
        }
    }

    pub fn bump(&mut self, kind: ErrorKind) {
        let slot = &mut self.counts[kind as usize];
        *slot = slot.saturating_add(1);
    }

    pub fn get(&self, kind: ErrorKind) -> u32 {
        self.counts[kind as usize]
    }

    /// one line per counter, in the order `-error` prints them
    pub fn report(&self) -> impl Iterator<Item = String> + '_ {
        ErrorKind::ALL
            .iter()
            .map(move |kind| format!("  {:<12}: {}", kind, self.get(*kind)))
    }
}
