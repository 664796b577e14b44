use crate::error::ShellError;
use crate::flags::EventProducer;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// longest the producer thread sleeps before rechecking its settings
const SLICE: Duration = Duration::from_millis(20);

/// Period configuration for a periodic event source, in microseconds.
/// 0 means stopped.
pub trait TimerControl {
    fn period_us(&self) -> u32;
    fn set_period_us(&mut self, period_us: u32);
}

/// A hardware timer stand-in: a thread that raises one event flag per
/// period and does nothing else.
pub struct PeriodicTimer {
    period_us: Arc<AtomicU32>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PeriodicTimer {
    pub fn start(period_us: u32, producer: EventProducer) -> Result<Self, io::Error> {
        let period = Arc::new(AtomicU32::new(period_us));
        let running = Arc::new(AtomicBool::new(true));
        let name = format!("{:?}-timer", producer.source()).to_lowercase();
        log::debug!("starting {} at {}us", name, period_us);
        let handle = thread::Builder::new().name(name).spawn({
            let period = Arc::clone(&period);
            let running = Arc::clone(&running);
            move || run(&period, &running, &producer)
        })?;
        Ok(PeriodicTimer {
            period_us: period,
            running,
            handle: Some(handle),
        })
    }
}

fn run(period: &AtomicU32, running: &AtomicBool, producer: &EventProducer) {
    let mut last = Instant::now();
    while running.load(Ordering::Acquire) {
        let us = period.load(Ordering::Acquire);
        if us == 0 {
            spin_sleep::sleep(SLICE);
            last = Instant::now();
            continue;
        }
        let every = Duration::from_micros(us.into());
        let due = last + every;
        let now = Instant::now();
        if now < due {
            // nap in slices so period changes and shutdown are seen
            spin_sleep::sleep((due - now).min(SLICE));
            continue;
        }
        producer.raise();
        // a whole period late: drop the missed ones instead of bursting
        last = if now - due >= every { now } else { due };
    }
}

impl TimerControl for PeriodicTimer {
    fn period_us(&self) -> u32 {
        self.period_us.load(Ordering::Acquire)
    }

    fn set_period_us(&mut self, period_us: u32) {
        log::info!("timer period now {}us", period_us);
        self.period_us.store(period_us, Ordering::Release);
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("timer thread panicked");
            }
        }
    }
}

/// dummy TimerControl implementation for testing; remembers the period and
/// never fires
#[derive(Debug, Default)]
pub struct ManualTimer {
    period_us: u32,
}

impl ManualTimer {
    pub fn new(period_us: u32) -> Self {
        ManualTimer { period_us }
    }
}

impl TimerControl for ManualTimer {
    fn period_us(&self) -> u32 {
        self.period_us
    }

    fn set_period_us(&mut self, period_us: u32) {
        self.period_us = period_us;
    }
}

/// Parse a `-timer` argument: a decimal value with an optional `u`, `m` or
/// `s` unit (case-insensitive), e.g. `1000 m`. Result in microseconds.
pub fn parse_period(text: &str) -> Result<u32, ShellError> {
    let t = text.trim();
    let (digits, scale) = match t.char_indices().last() {
        Some((i, 's' | 'S')) => (&t[..i], 1_000_000),
        Some((i, 'm' | 'M')) => (&t[..i], 1_000),
        Some((i, 'u' | 'U')) => (&t[..i], 1),
        _ => (t, 1),
    };
    digits
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|v| v.checked_mul(scale))
        .ok_or(ShellError::BadTimerPeriod)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{EventFlags, EventSource};

    #[test]
    fn test_parse_period() -> Result<(), ShellError> {
        assert_eq!(parse_period("250")?, 250);
        assert_eq!(parse_period("1000 m")?, 1_000_000);
        assert_eq!(parse_period("2s")?, 2_000_000);
        assert_eq!(parse_period("15 U")?, 15);
        assert_eq!(parse_period("0")?, 0);
        assert!(matches!(parse_period("-1"), Err(ShellError::BadTimerPeriod)));
        assert!(matches!(parse_period("m"), Err(ShellError::BadTimerPeriod)));
        assert!(matches!(parse_period("5000 s"), Err(ShellError::BadTimerPeriod)));
        Ok(())
    }

    #[test]
    fn test_manual_timer() {
        let mut t = ManualTimer::new(10);
        t.set_period_us(0);
        assert_eq!(t.period_us(), 0);
    }

    #[test]
    fn test_periodic_timer_raises() -> Result<(), io::Error> {
        let flags = EventFlags::new();
        let timer = PeriodicTimer::start(1_000, flags.producer(EventSource::Tick))?;
        let deadline = Instant::now() + Duration::from_secs(2);
        while !flags.is_raised(EventSource::Tick) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        drop(timer);
        assert!(flags.take(EventSource::Tick));
        Ok(())
    }

    #[test]
    fn test_stopped_timer_is_quiet() -> Result<(), io::Error> {
        let flags = EventFlags::new();
        let mut timer = PeriodicTimer::start(0, flags.producer(EventSource::Timer))?;
        thread::sleep(Duration::from_millis(50));
        assert!(!flags.is_raised(EventSource::Timer));
        timer.set_period_us(500);
        assert_eq!(timer.period_us(), 500);
        Ok(())
    }
}
