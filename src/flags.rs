//! Event flags: the only state shared between interrupt producers and the
//! main loop.
//!
//! Producers hold an [`EventProducer`] and can only *raise* their one flag.
//! The loop owns the [`EventFlags`] and can only *take* (test-and-clear).
//! Two raises between takes collapse into one.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// interrupt sources, in the order the main loop services them
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventSource {
    /// periodic callback timer
    Timer,
    Switch1,
    Switch2,
    /// fixed-rate ticker timer (nominally 10ms)
    Tick,
}

impl EventSource {
    pub const POLL_ORDER: [EventSource; 4] = [
        EventSource::Timer,
        EventSource::Switch1,
        EventSource::Switch2,
        EventSource::Tick,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
pub struct EventFlags {
    flags: [AtomicBool; 4],
}

impl EventFlags {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// hand out the raise-only half for one source
    pub fn producer(self: &Arc<Self>, source: EventSource) -> EventProducer {
        EventProducer {
            flags: Arc::clone(self),
            source,
        }
    }

    /// test-and-clear; true if the source fired since the last take
    pub fn take(&self, source: EventSource) -> bool {
        self.flags[source.slot()].swap(false, Ordering::AcqRel)
    }

    /// look without clearing
    pub fn is_raised(&self, source: EventSource) -> bool {
        self.flags[source.slot()].load(Ordering::Acquire)
    }

    fn raise(&self, source: EventSource) {
        self.flags[source.slot()].store(true, Ordering::Release);
    }
}

/// Raise-only handle given to an interrupt producer (timer thread, key
/// handler). Cheap to clone and safe to move to another thread.
#[derive(Clone, Debug)]
pub struct EventProducer {
    flags: Arc<EventFlags>,
    source: EventSource,
}

impl EventProducer {
    pub fn raise(&self) {
        self.flags.raise(self.source);
    }

    pub fn source(&self) -> EventSource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_take_clears() {
        let flags = EventFlags::new();
        let p = flags.producer(EventSource::Switch1);
        assert!(!flags.take(EventSource::Switch1));
        p.raise();
        assert!(flags.is_raised(EventSource::Switch1));
        assert!(flags.take(EventSource::Switch1));
        assert!(!flags.take(EventSource::Switch1));
    }

    #[test]
    fn test_raises_coalesce() {
        let flags = EventFlags::new();
        let p = flags.producer(EventSource::Timer);
        p.raise();
        p.raise();
        assert!(flags.take(EventSource::Timer));
        assert!(!flags.take(EventSource::Timer));
    }

    #[test]
    fn test_sources_are_independent() {
        let flags = EventFlags::new();
        flags.producer(EventSource::Tick).raise();
        assert!(!flags.take(EventSource::Timer));
        assert!(!flags.take(EventSource::Switch2));
        assert!(flags.take(EventSource::Tick));
    }

    #[test]
    fn test_raise_from_other_thread() {
        let flags = EventFlags::new();
        let p = flags.producer(EventSource::Switch2);
        thread::spawn(move || p.raise()).join().unwrap();
        assert!(flags.take(EventSource::Switch2));
    }
}
