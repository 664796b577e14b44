//!
//! ## Design
//!
//! * one cooperative loop owns all the state; "interrupts" (timer threads,
//!   function keys) only ever raise an event flag
//! * everything a command touches lives in one `Shell` value, passed by
//!   reference; no globals
//! * stored command lines (scripts, callbacks, tickers, `-if` branches) run by
//!   re-entering the dispatcher, with a hard nesting limit
//! * devices behind traits so the core runs without hardware:
//!    - console (text out), input (keys in), memory map, gpio, timer period
//!    - each has a host implementation and a dummy/simulated one for tests
//! * fixed-capacity text everywhere a firmware buffer would be; writes
//!   truncate, never overflow
//!
//! Model
//!
//! main
//!  |-- flags, timers(flags), console, input(flags), memory, gpio
//!  |-- shell(console, memory, gpio, timer, config)
//!  |    |-- registers, scripts, callbacks, tickers, error counters
//!  |    `-- dispatcher -> handlers -> (payload executor -> dispatcher)*
//!  `-- main loop
//!       |-- for each raised flag, in order: fire its callback / sweep tickers
//!       |-- read a key; echo; on Enter, dispatch the line
//!       `-- nothing to do: sleep a little
pub mod branch;
pub mod callback;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod flags;
pub mod gpio;
pub mod input;
pub mod memory;
pub mod operand;
pub mod registers;
pub mod regmachine;
pub mod script;
pub mod shell;
pub mod text;
pub mod ticker;
pub mod timer;
