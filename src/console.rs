use std::cell::RefCell;
use std::io;
use std::io::Write;
use std::rc::Rc;

/// Console is the text sink the shell writes to. It should abstract the
/// implementation details, so a UART, a terminal or a test transcript would
/// all work.
pub trait Console {
    /// write text as-is, no line ending added
    fn write_str(&mut self, s: &str) -> Result<(), io::Error>;

    /// write one line of output
    fn write_line(&mut self, s: &str) -> Result<(), io::Error> {
        self.write_str(s)?;
        self.write_str("\r\n")
    }
}

/// console on the host terminal. The terminal is in raw mode while the shell
/// runs, so line endings are spelled out as CRLF like on the serial link.
pub struct TermConsole {
    out: io::Stdout,
}

impl TermConsole {
    pub fn new() -> Self {
        TermConsole { out: io::stdout() }
    }
}

impl Default for TermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TermConsole {
    fn write_str(&mut self, s: &str) -> Result<(), io::Error> {
        let mut lock = self.out.lock();
        lock.write_all(s.as_bytes())?;
        lock.flush()
    }
}

/// Write one log record as a CRLF-terminated line, for a log sink sharing
/// the raw-mode terminal with [`TermConsole`].
pub fn write_log_line(out: &mut impl Write, record: &log::Record) -> Result<(), io::Error> {
    write!(out, "[{:<5} {}] {}\r\n", record.level(), record.target(), record.args())
}

/// A read handle onto everything a [`CaptureConsole`] has been sent, split
/// into lines. Stays valid while the console itself is lent to a shell.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    text: Rc<RefCell<String>>,
}

impl Transcript {
    /// complete lines so far, without their CRLF; blank lines included
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.text.borrow().split("\r\n").map(str::to_string).collect();
        // whatever follows the last CRLF is not a line yet
        lines.pop();
        lines
    }

    /// raw text, line endings included
    pub fn raw(&self) -> String {
        self.text.borrow().clone()
    }

    /// lines so far, and forget them
    pub fn take(&self) -> Vec<String> {
        let lines = self.lines();
        self.text.borrow_mut().clear();
        lines
    }
}

/// useful for testing: records output instead of printing it
#[derive(Default)]
pub struct CaptureConsole {
    transcript: Transcript,
}

impl CaptureConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }
}

impl Console for CaptureConsole {
    fn write_str(&mut self, s: &str) -> Result<(), io::Error> {
        self.transcript.text.borrow_mut().push_str(s);
        Ok(())
    }
}
