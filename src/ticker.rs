//! Periodic tickers, advanced once per scheduler tick (nominally 10ms).
use crate::callback::{count_down, Firing};
use crate::error::ShellError;
use crate::text::{split_word, truncated, Bounded};

pub const NUM_TICKERS: usize = 16;
pub const TICKER_PAYLOAD_CAPACITY: usize = 47;

pub const USAGE: &str = "-ticker idx delay period count -payload";

pub type TickerPayload = Bounded<TICKER_PAYLOAD_CAPACITY>;

#[derive(Clone, Debug, Default)]
pub struct TickerEntry {
    pub active: bool,
    /// ticks before the first firing
    pub delay: u32,
    /// ticks between firings
    pub period: u32,
    /// firings left; negative = forever
    pub count: i32,
    pub ticks_left: u32,
    pub payload: TickerPayload,
    generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickerCommand<'a> {
    List,
    Disable(usize),
    Arm {
        index: usize,
        delay: u32,
        period: u32,
        count: i32,
        payload: &'a str,
    },
}

impl<'a> TickerCommand<'a> {
    pub fn parse(args: &'a str) -> Result<TickerCommand<'a>, ShellError> {
        let args = args.trim_start();
        if args.is_empty() {
            return Ok(TickerCommand::List);
        }
        let (idx, rest) = split_word(args);
        let index: usize = idx.parse().map_err(|_| ShellError::BadTickerIndex)?;
        if index >= NUM_TICKERS {
            return Err(ShellError::BadTickerIndex);
        }
        let (delay, rest) = split_word(rest.trim_start());
        // `-ticker idx 0` is shorthand for clearing
        if delay == "0" && rest.trim().is_empty() {
            return Ok(TickerCommand::Disable(index));
        }
        let (period, rest) = split_word(rest.trim_start());
        let (count, payload) = split_word(rest.trim_start());
        let usage = |_| ShellError::Usage(USAGE);
        let delay: u32 = delay.parse().map_err(usage)?;
        let period: u32 = period.parse().map_err(usage)?;
        let count: i32 = count.parse().map_err(usage)?;
        if count == 0 {
            return Ok(TickerCommand::Disable(index));
        }
        Ok(TickerCommand::Arm {
            index,
            delay,
            period,
            count,
            payload: payload.trim(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct TickerTable {
    entries: [TickerEntry; NUM_TICKERS],
}

impl TickerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, idx: usize) -> Option<&TickerEntry> {
        self.entries.get(idx)
    }

    /// Arm a ticker; its countdown starts at `delay`. A zero count disables.
    pub fn arm(&mut self, idx: usize, delay: u32, period: u32, count: i32, payload: &str) -> Result<(), ShellError> {
        let e = self.entries.get_mut(idx).ok_or(ShellError::BadTickerIndex)?;
        e.generation = e.generation.wrapping_add(1);
        if count == 0 {
            e.active = false;
            return Ok(());
        }
        e.active = true;
        e.delay = delay;
        e.period = period;
        e.count = count;
        e.ticks_left = delay;
        e.payload = truncated(payload);
        Ok(())
    }

    pub fn disable(&mut self, idx: usize) -> Result<(), ShellError> {
        self.arm(idx, 0, 0, 0, "")
    }

    /// Generation of every entry, taken when a tick sweep starts.
    pub fn generations(&self) -> [u32; NUM_TICKERS] {
        let mut out = [0; NUM_TICKERS];
        for (g, e) in out.iter_mut().zip(&self.entries) {
            *g = e.generation;
        }
        out
    }

    /// Advance one entry by a tick. `since` is the entry's generation when
    /// the tick was observed; an entry armed after that is left for the next
    /// tick. Returns a firing when the countdown has hit zero; the caller runs
    /// the payload and then calls [`TickerTable::finish`].
    pub fn advance(&mut self, idx: usize, since: u32) -> Option<Firing<TICKER_PAYLOAD_CAPACITY>> {
        let e = self
            .entries
            .get_mut(idx)
            .filter(|e| e.active && e.generation == since)?;
        if e.ticks_left > 0 {
            e.ticks_left -= 1;
        }
        if e.ticks_left != 0 {
            return None;
        }
        Some(Firing {
            index: idx,
            payload: e.payload.clone(),
            generation: e.generation,
        })
    }

    /// Repeat-count and reload step for a completed firing, skipped when the
    /// payload reconfigured this entry.
    pub fn finish(&mut self, firing: &Firing<TICKER_PAYLOAD_CAPACITY>) {
        if let Some(e) = self.entries.get_mut(firing.index) {
            if e.active && e.generation == firing.generation {
                e.active = count_down(&mut e.count);
                if e.active {
                    e.ticks_left = e.period;
                }
            }
        }
    }

    pub fn listing(&self) -> Vec<String> {
        let mut out = vec!["Idx | Active | Delay | Period | Count | Payload".to_string()];
        out.extend(self.entries.iter().enumerate().map(|(i, e)| {
            format!(
                "{:<3} | {:^6} | {:<5} | {:<6} | {:<5} | {}",
                i,
                if e.active { "Yes" } else { "No" },
                e.delay,
                e.period,
                e.count,
                e.payload
            )
        }));
        out
    }
}
