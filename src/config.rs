use std::time::Duration;

/// Knobs for a [`crate::shell::Shell`] and the devices around it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellConfig {
    /// how many payloads may be running inside one another
    pub max_nesting: usize,
    /// callback timer period at power-up; 0 starts it stopped
    pub timer_period_us: u32,
    /// ticker scheduler rate
    pub tick_period: Duration,
    /// sleep between loop iterations when nothing is pending
    pub idle_poll: Duration,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            max_nesting: 8,
            timer_period_us: 1_000_000,
            tick_period: Duration::from_millis(10),
            idle_poll: Duration::from_millis(1),
        }
    }
}
