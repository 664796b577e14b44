//! Script store: 64 editable command-line slots.
use crate::error::ShellError;
use crate::text::{assign, split_word, Bounded};

pub const SCRIPT_LINES: usize = 64;
/// 128-byte slots, one byte of which the firmware spent on a terminator
pub const SCRIPT_LINE_CAPACITY: usize = 127;

pub const USAGE: &str = "-script [line] [w|x|c] [payload]";

pub type ScriptLine = Bounded<SCRIPT_LINE_CAPACITY>;

/// What a `-script` line asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptCommand<'a> {
    List,
    Show(usize),
    Write(usize, &'a str),
    Execute(usize),
    Clear(usize),
}

impl<'a> ScriptCommand<'a> {
    /// `""`, `N`, `N w TEXT`, `N x` or `N c`. The index is range-checked
    /// here, before anything touches the store.
    pub fn parse(args: &'a str) -> Result<ScriptCommand<'a>, ShellError> {
        let args = args.trim_start();
        if args.is_empty() {
            return Ok(ScriptCommand::List);
        }
        let (idx, rest) = split_word(args);
        let line: i64 = idx.parse().map_err(|_| ShellError::Usage(USAGE))?;
        if !(0..SCRIPT_LINES as i64).contains(&line) {
            return Err(ShellError::BadScriptLine(line));
        }
        let line = line as usize;

        let rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(ScriptCommand::Show(line));
        }
        let (verb, text) = split_word(rest);
        match verb {
            "w" => Ok(ScriptCommand::Write(line, text.trim_start())),
            "x" => Ok(ScriptCommand::Execute(line)),
            "c" => Ok(ScriptCommand::Clear(line)),
            _ => Err(ShellError::Usage(USAGE)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScriptStore {
    lines: Vec<ScriptLine>,
}

impl Default for ScriptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptStore {
    pub fn new() -> Self {
        ScriptStore {
            lines: vec![ScriptLine::new(); SCRIPT_LINES],
        }
    }

    fn slot(&self, idx: usize) -> Result<&ScriptLine, ShellError> {
        self.lines
            .get(idx)
            .ok_or(ShellError::BadScriptLine(idx as i64))
    }

    pub fn get(&self, idx: usize) -> Result<&str, ShellError> {
        self.slot(idx).map(|l| l.as_str())
    }

    /// store `text`, cut to the slot capacity
    pub fn write(&mut self, idx: usize, text: &str) -> Result<(), ShellError> {
        let slot = self
            .lines
            .get_mut(idx)
            .ok_or(ShellError::BadScriptLine(idx as i64))?;
        assign(slot, text);
        Ok(())
    }

    pub fn clear(&mut self, idx: usize) -> Result<(), ShellError> {
        self.write(idx, "")
    }

    /// The slots an execute from `start` would run: ascending, stopping at the
    /// first empty slot or the end of the table.
    pub fn run_range(&self, start: usize) -> std::ops::Range<usize> {
        let end = (start..SCRIPT_LINES)
            .find(|i| self.lines[*i].is_empty())
            .unwrap_or(SCRIPT_LINES);
        start..end.max(start)
    }

    /// whether a run from `start` would reach slot `target`
    pub fn reaches(&self, start: usize, target: usize) -> bool {
        self.run_range(start).contains(&target)
    }

    pub fn show(&self, idx: usize) -> Result<String, ShellError> {
        Ok(format!("{:2} | {}", idx, display_text(self.slot(idx)?)))
    }

    pub fn listing(&self) -> Vec<String> {
        let mut out = vec![
            "Line | Script Line".to_string(),
            "------------------------------".to_string(),
        ];
        out.extend(
            self.lines
                .iter()
                .enumerate()
                .map(|(i, l)| format!("{:2}   | {}", i, display_text(l))),
        );
        out
    }
}

fn display_text(line: &ScriptLine) -> &str {
    if line.is_empty() {
        "<empty>"
    } else {
        line.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verbs() -> Result<(), ShellError> {
        assert_eq!(ScriptCommand::parse("")?, ScriptCommand::List);
        assert_eq!(ScriptCommand::parse("  ")?, ScriptCommand::List);
        assert_eq!(ScriptCommand::parse("3")?, ScriptCommand::Show(3));
        assert_eq!(
            ScriptCommand::parse("10 w -gpio 0 t")?,
            ScriptCommand::Write(10, "-gpio 0 t")
        );
        assert_eq!(ScriptCommand::parse("10 x")?, ScriptCommand::Execute(10));
        assert_eq!(ScriptCommand::parse("10 c")?, ScriptCommand::Clear(10));
        Ok(())
    }

    #[test]
    fn test_parse_rejects_bad_index() {
        assert!(matches!(
            ScriptCommand::parse("64 w -print x"),
            Err(ShellError::BadScriptLine(64))
        ));
        assert!(matches!(
            ScriptCommand::parse("-1 x"),
            Err(ShellError::BadScriptLine(-1))
        ));
        assert!(matches!(ScriptCommand::parse("abc"), Err(ShellError::Usage(_))));
        assert!(matches!(ScriptCommand::parse("1 q"), Err(ShellError::Usage(_))));
    }

    #[test]
    fn test_write_then_show() -> Result<(), ShellError> {
        let mut s = ScriptStore::new();
        s.write(5, "-print hello")?;
        assert_eq!(s.get(5)?, "-print hello");
        assert_eq!(s.show(5)?, " 5 | -print hello");
        assert_eq!(s.show(6)?, " 6 | <empty>");
        Ok(())
    }

    #[test]
    fn test_write_truncates() -> Result<(), ShellError> {
        let mut s = ScriptStore::new();
        let long = "x".repeat(200);
        s.write(0, &long)?;
        assert_eq!(s.get(0)?.len(), SCRIPT_LINE_CAPACITY);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<(), ShellError> {
        let mut s = ScriptStore::new();
        s.write(1, "-rem")?;
        s.clear(1)?;
        assert_eq!(s.get(1)?, "");
        Ok(())
    }

    #[test]
    fn test_run_range_stops_at_empty() -> Result<(), ShellError> {
        let mut s = ScriptStore::new();
        s.write(2, "-print a")?;
        s.write(3, "-print b")?;
        s.write(5, "-print c")?;
        assert_eq!(s.run_range(2), 2..4);
        assert_eq!(s.run_range(4), 4..4);
        assert!(s.reaches(2, 3));
        assert!(!s.reaches(2, 5));
        Ok(())
    }

    #[test]
    fn test_run_range_to_end_of_table() -> Result<(), ShellError> {
        let mut s = ScriptStore::new();
        s.write(62, "-print a")?;
        s.write(63, "-print b")?;
        assert_eq!(s.run_range(62), 62..64);
        Ok(())
    }

    #[test]
    fn test_listing() -> Result<(), ShellError> {
        let mut s = ScriptStore::new();
        s.write(0, "-print a")?;
        let l = s.listing();
        assert_eq!(l.len(), SCRIPT_LINES + 2);
        assert_eq!(l[2], " 0   | -print a");
        assert_eq!(l[3], " 1   | <empty>");
        Ok(())
    }
}
