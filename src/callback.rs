//! Event-triggered callbacks: one entry per trigger source, each re-running a
//! stored payload a limited (or unlimited) number of times.
use crate::error::ShellError;
use crate::flags::EventSource;
use crate::text::{split_word, truncated, Bounded};

pub const NUM_CALLBACKS: usize = 3;
pub const CALLBACK_PAYLOAD_CAPACITY: usize = 63;

pub const USAGE: &str = "-callback idx count -payload";

pub type CallbackPayload = Bounded<CALLBACK_PAYLOAD_CAPACITY>;

/// static binding of entries to trigger sources
const BINDINGS: [(EventSource, &str); NUM_CALLBACKS] = [
    (EventSource::Timer, "timer"),
    (EventSource::Switch1, "SW1"),
    (EventSource::Switch2, "SW2"),
];

/// Apply one firing to a repeat count: negative counts never run out,
/// positive ones tick down. Returns whether the entry stays active.
pub(crate) fn count_down(remaining: &mut i32) -> bool {
    if *remaining > 0 {
        *remaining -= 1;
        *remaining != 0
    } else {
        *remaining < 0
    }
}

#[derive(Clone, Debug, Default)]
pub struct CallbackEntry {
    pub active: bool,
    /// negative = forever
    pub remaining: i32,
    pub payload: CallbackPayload,
    /// bumped on every arm/disable so a firing can tell it was re-armed
    generation: u32,
}

/// A firing in progress: a private copy of the payload plus the generation
/// it was taken from.
#[derive(Clone, Debug)]
pub struct Firing<const N: usize> {
    pub index: usize,
    pub payload: Bounded<N>,
    pub(crate) generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackCommand<'a> {
    List,
    Disable(usize),
    Arm {
        index: usize,
        count: i32,
        payload: &'a str,
    },
}

impl<'a> CallbackCommand<'a> {
    pub fn parse(args: &'a str) -> Result<CallbackCommand<'a>, ShellError> {
        let args = args.trim_start();
        if args.is_empty() {
            return Ok(CallbackCommand::List);
        }
        let (idx, rest) = split_word(args);
        let index: usize = idx.parse().map_err(|_| ShellError::BadCallbackIndex)?;
        if index >= NUM_CALLBACKS {
            return Err(ShellError::BadCallbackIndex);
        }
        let (count, payload) = split_word(rest.trim_start());
        let count: i32 = count.parse().map_err(|_| ShellError::Usage(USAGE))?;
        if count == 0 {
            return Ok(CallbackCommand::Disable(index));
        }
        Ok(CallbackCommand::Arm {
            index,
            count,
            payload: payload.trim(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct CallbackTable {
    entries: [CallbackEntry; NUM_CALLBACKS],
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// which entry a source drives
    pub fn index_for(source: EventSource) -> Option<usize> {
        BINDINGS.iter().position(|(s, _)| *s == source)
    }

    pub fn entry(&self, idx: usize) -> Option<&CallbackEntry> {
        self.entries.get(idx)
    }

    /// Arm an entry; a zero count disables it instead.
    pub fn arm(&mut self, idx: usize, count: i32, payload: &str) -> Result<(), ShellError> {
        let e = self
            .entries
            .get_mut(idx)
            .ok_or(ShellError::BadCallbackIndex)?;
        e.generation = e.generation.wrapping_add(1);
        if count == 0 {
            e.active = false;
            return Ok(());
        }
        e.active = true;
        e.remaining = count;
        e.payload = truncated(payload);
        Ok(())
    }

    pub fn disable(&mut self, idx: usize) -> Result<(), ShellError> {
        self.arm(idx, 0, "")
    }

    /// Take a copy of the payload if the entry is armed. The count is not
    /// touched until [`CallbackTable::finish`].
    pub fn begin(&self, idx: usize) -> Option<Firing<CALLBACK_PAYLOAD_CAPACITY>> {
        let e = self.entries.get(idx).filter(|e| e.active)?;
        Some(Firing {
            index: idx,
            payload: e.payload.clone(),
            generation: e.generation,
        })
    }

    /// Account for a completed firing. If the payload re-armed or disabled
    /// this entry in the meantime, that configuration stands untouched.
    pub fn finish(&mut self, firing: &Firing<CALLBACK_PAYLOAD_CAPACITY>) {
        if let Some(e) = self.entries.get_mut(firing.index) {
            if e.active && e.generation == firing.generation {
                e.active = count_down(&mut e.remaining);
            }
        }
    }

    pub fn listing(&self) -> Vec<String> {
        self.entries
            .iter()
            .zip(BINDINGS.iter())
            .enumerate()
            .map(|(i, (e, (_, name)))| {
                let count = if e.active {
                    e.remaining.to_string()
                } else {
                    "off".to_string()
                };
                let mut line = format!("callback {} is {}, count is {}", i, name, count);
                if !e.payload.is_empty() {
                    line.push(' ');
                    line.push_str(&e.payload);
                }
                line
            })
            .collect()
    }
}
