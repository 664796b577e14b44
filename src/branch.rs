//! `-if A COND B ? DESTT : DESTF`
use crate::error::ShellError;
use crate::memory::MemoryMap;
use crate::operand::Operand;
use crate::registers::RegisterBank;

pub const USAGE: &str = "-if A COND B ? DESTT : DESTF";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Greater,
    Less,
    Equal,
}

impl Condition {
    fn parse(token: &str) -> Option<Condition> {
        match token {
            ">" => Some(Condition::Greater),
            "<" => Some(Condition::Less),
            "=" => Some(Condition::Equal),
            _ => None,
        }
    }

    fn holds(self, a: i32, b: i32) -> bool {
        match self {
            Condition::Greater => a > b,
            Condition::Less => a < b,
            Condition::Equal => a == b,
        }
    }
}

/// A parsed conditional. The destinations borrow from the argument string
/// and are already trimmed; either may be empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Branch<'a> {
    pub a: Operand,
    pub cond: Condition,
    pub b: Operand,
    pub on_true: &'a str,
    pub on_false: &'a str,
}

impl<'a> Branch<'a> {
    /// The first three whitespace tokens are `A COND B`. The clauses are found
    /// independently: everything after the first `?`, split at the first `:`
    /// after it. A missing `:` leaves the false branch empty.
    pub fn parse(args: &'a str) -> Result<Branch<'a>, ShellError> {
        let mut tokens = args.split_whitespace();
        let (a, cond, b) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(a), Some(c), Some(b)) => (a, c, b),
            _ => return Err(ShellError::Usage(USAGE)),
        };

        let (_, clauses) = args
            .split_once('?')
            .ok_or(ShellError::MissingQuestionMark)?;
        let (on_true, on_false) = clauses.split_once(':').unwrap_or((clauses, ""));

        let a = Operand::parse_comparable(a).ok_or(ShellError::BadLeftOperand)?;
        let b = Operand::parse_comparable(b).ok_or(ShellError::BadRightOperand)?;
        let cond = Condition::parse(cond).ok_or(ShellError::BadCondition)?;

        Ok(Branch {
            a,
            cond,
            b,
            on_true: on_true.trim(),
            on_false: on_false.trim(),
        })
    }

    /// Compare with signed 32-bit semantics and pick a clause. `None` when the
    /// selected clause is empty: nothing to dispatch.
    pub fn select(&self, regs: &RegisterBank, memory: &dyn MemoryMap) -> Result<Option<&'a str>, ShellError> {
        let a = self.a.resolve(regs, memory)?;
        let b = self.b.resolve(regs, memory)?;
        let dest = if self.cond.holds(a, b) {
            self.on_true
        } else {
            self.on_false
        };
        Ok(Some(dest).filter(|d| !d.is_empty()))
    }
}
