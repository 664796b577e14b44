//! Fixed-capacity text buffers. Capacities are in bytes and do not include a
//! terminator; a 128-byte C buffer becomes a `Bounded<127>`.
use heapless::String;

/// a command line as the line source delivers it
pub const LINE_CAPACITY: usize = 127;

pub type Bounded<const N: usize> = String<N>;

/// copy `s` into a new buffer, dropping whatever doesn't fit. Never splits a
/// UTF-8 sequence.
pub fn truncated<const N: usize>(s: &str) -> Bounded<N> {
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    // fits by construction
    Bounded::try_from(&s[..end]).unwrap_or_default()
}

/// overwrite `dst` with as much of `s` as fits
pub fn assign<const N: usize>(dst: &mut Bounded<N>, s: &str) {
    *dst = truncated(s);
}

/// split off the first word; the rest keeps its leading whitespace
pub fn split_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], &s[i..]),
        None => (s, ""),
    }
}
