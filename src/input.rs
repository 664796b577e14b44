use crate::error::ShellError;
use crate::flags::EventProducer;
use crate::text::{Bounded, LINE_CAPACITY};
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// what the line source hands the main loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Enter,
    Backspace,
    Quit,
}

/// reads key events
pub trait Input {
    /// next pending event, if any, without blocking
    fn poll_event(&mut self) -> Result<Option<InputEvent>, io::Error>;
}

/// Input from the host terminal in raw mode. F1 and F2 stand in for the two
/// board switches: they raise the switch event flags directly, the way the
/// GPIO edge interrupts do on the board.
pub struct TermInput {
    switches: [EventProducer; 2],
}

impl TermInput {
    pub fn new(sw1: EventProducer, sw2: EventProducer) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            switches: [sw1, sw2],
        })
    }

    fn map_key(&self, key: KeyEvent) -> Option<InputEvent> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputEvent::Quit)
            }
            KeyCode::Char(c) => Some(InputEvent::Char(c)),
            KeyCode::Enter => Some(InputEvent::Enter),
            KeyCode::Backspace => Some(InputEvent::Backspace),
            KeyCode::Esc => Some(InputEvent::Quit),
            KeyCode::F(n @ 1..=2) => {
                self.switches[n as usize - 1].raise();
                None
            }
            _ => {
                log::debug!("ignoring key {:?}", key.code);
                None
            }
        }
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("couldn't leave raw mode: {}", e);
        }
    }
}

impl Input for TermInput {
    fn poll_event(&mut self) -> Result<Option<InputEvent>, io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(key) = read()? {
                if let Some(evt) = self.map_key(key) {
                    return Ok(Some(evt));
                }
            }
        }
        Ok(None)
    }
}

/// dummy Input implementation for testing: replays a fixed key sequence,
/// with `\r` or `\n` as Enter, then quits
pub struct DummyInput {
    events: VecDeque<InputEvent>,
}

impl DummyInput {
    pub fn new(keys: &str) -> Self {
        DummyInput {
            events: keys
                .chars()
                .map(|c| match c {
                    '\r' | '\n' => InputEvent::Enter,
                    '\x08' | '\x7f' => InputEvent::Backspace,
                    c => InputEvent::Char(c),
                })
                .collect(),
        }
    }
}

impl Input for DummyInput {
    fn poll_event(&mut self) -> Result<Option<InputEvent>, io::Error> {
        Ok(Some(self.events.pop_front().unwrap_or(InputEvent::Quit)))
    }
}

/// Assembles printable characters into a command line. Lines never exceed
/// [`LINE_CAPACITY`] bytes; one character too many throws the line away.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Bounded<LINE_CAPACITY>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a character. `Ok(true)` if it was taken (and should be echoed),
    /// `Ok(false)` if it isn't printable and was ignored.
    pub fn push(&mut self, c: char) -> Result<bool, ShellError> {
        if !(c == ' ' || c.is_ascii_graphic()) {
            return Ok(false);
        }
        if self.buf.push(c).is_err() {
            self.buf.clear();
            return Err(ShellError::LineOverflow(LINE_CAPACITY + 1));
        }
        Ok(true)
    }

    /// drop the last character; true if there was one
    pub fn backspace(&mut self) -> bool {
        self.buf.pop().is_some()
    }

    /// hand over the finished line, leaving the buffer empty. Blank lines
    /// yield nothing.
    pub fn take(&mut self) -> Option<Bounded<LINE_CAPACITY>> {
        let line = std::mem::take(&mut self.buf);
        Some(line).filter(|l| !l.trim().is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}
