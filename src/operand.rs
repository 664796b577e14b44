//! Operand literals shared by `-reg` and `-if`.
//!
//! ```text
//! rN  RN          register, N in [0, 32)
//! #123  #-4       immediate, decimal
//! #x1f  #XFF      immediate, hex
//! @1024           memory word, decimal address
//! @x20000000      memory word, hex address
//! @r3             memory word, address held in a register
//! ```
use crate::error::ShellError;
use crate::memory::MemoryMap;
use crate::registers::{parse_register, RegisterBank};

/// Where a memory operand's address comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddrOperand {
    Direct(u32),
    /// register whose current value is the address
    Indirect(usize),
}

/// A source operand, as written on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Reg(usize),
    Imm(i32),
    Mem(AddrOperand),
}

impl Operand {
    /// try the register, immediate and memory forms, in that order
    pub fn parse(token: &str) -> Option<Operand> {
        if let Some(r) = parse_register(token) {
            return Some(Operand::Reg(r));
        }
        if let Some(v) = parse_immediate(token) {
            return Some(Operand::Imm(v));
        }
        parse_address(token).map(Operand::Mem)
    }

    /// the forms `-if` accepts: no memory operands
    pub fn parse_comparable(token: &str) -> Option<Operand> {
        match Operand::parse(token)? {
            Operand::Mem(_) => None,
            op => Some(op),
        }
    }

    /// current value of the operand
    pub fn resolve(&self, regs: &RegisterBank, memory: &dyn MemoryMap) -> Result<i32, ShellError> {
        match *self {
            Operand::Reg(r) => regs.get(r),
            Operand::Imm(v) => Ok(v),
            Operand::Mem(addr) => {
                let a = match addr {
                    AddrOperand::Direct(a) => a,
                    AddrOperand::Indirect(r) => regs.get(r)? as u32,
                };
                Ok(memory.read_word(a)? as i32)
            }
        }
    }
}

/// `#dec` or `#xhex`; values wrap modulo 2^32
pub fn parse_immediate(token: &str) -> Option<i32> {
    let body = token.strip_prefix('#')?;
    match body.strip_prefix(['x', 'X']) {
        Some(hex) => parse_hex_word(hex).map(|v| v as i32),
        None => parse_decimal_word(body),
    }
}

/// `@dec`, `@xhex` or `@rN`
pub fn parse_address(token: &str) -> Option<AddrOperand> {
    let body = token.strip_prefix('@')?;
    if body.starts_with(['r', 'R']) {
        return parse_register(body).map(AddrOperand::Indirect);
    }
    match body.strip_prefix(['x', 'X']) {
        Some(hex) => parse_hex_word(hex).map(AddrOperand::Direct),
        None => {
            if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            body.parse::<u32>().ok().map(AddrOperand::Direct)
        }
    }
}

fn parse_hex_word(hex: &str) -> Option<u32> {
    if hex.is_empty() || hex.len() > 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn parse_decimal_word(dec: &str) -> Option<i32> {
    let digits = dec.strip_prefix(['-', '+']).unwrap_or(dec);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let wide: i64 = dec.parse().ok()?;
    if wide > u32::MAX as i64 || wide < i32::MIN as i64 {
        return None;
    }
    Some(wide as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SimulatedMemory;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Operand::parse("r7"), Some(Operand::Reg(7)));
        assert_eq!(Operand::parse("#42"), Some(Operand::Imm(42)));
        assert_eq!(Operand::parse("#-42"), Some(Operand::Imm(-42)));
        assert_eq!(Operand::parse("#x10"), Some(Operand::Imm(16)));
        assert_eq!(Operand::parse("#XfF"), Some(Operand::Imm(255)));
        assert_eq!(
            Operand::parse("@x20000000"),
            Some(Operand::Mem(AddrOperand::Direct(0x2000_0000)))
        );
        assert_eq!(
            Operand::parse("@1024"),
            Some(Operand::Mem(AddrOperand::Direct(1024)))
        );
        assert_eq!(
            Operand::parse("@r3"),
            Some(Operand::Mem(AddrOperand::Indirect(3)))
        );
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert_eq!(Operand::parse(""), None);
        assert_eq!(Operand::parse("#"), None);
        assert_eq!(Operand::parse("#x"), None);
        assert_eq!(Operand::parse("#12ab"), None);
        assert_eq!(Operand::parse("#x123456789"), None);
        assert_eq!(Operand::parse("@"), None);
        assert_eq!(Operand::parse("@r99"), None);
        assert_eq!(Operand::parse("42"), None);
    }

    #[test]
    fn test_immediates_wrap() {
        assert_eq!(parse_immediate("#4294967295"), Some(-1));
        assert_eq!(parse_immediate("#xFFFFFFFF"), Some(-1));
        assert_eq!(parse_immediate("#x80000000"), Some(i32::MIN));
        assert_eq!(parse_immediate("#4294967296"), None);
    }

    #[test]
    fn test_comparable_excludes_memory() {
        assert_eq!(Operand::parse_comparable("@x0"), None);
        assert_eq!(Operand::parse_comparable("r1"), Some(Operand::Reg(1)));
    }

    #[test]
    fn test_resolve() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mut mem = SimulatedMemory::new();
        mem.write_word(0x2000_0100, 0xffff_fffe)?;
        regs.set(4, 0x2000_0100)?;
        regs.set(5, 9)?;
        assert_eq!(Operand::Reg(5).resolve(&regs, &mem)?, 9);
        assert_eq!(Operand::Imm(-3).resolve(&regs, &mem)?, -3);
        assert_eq!(
            Operand::Mem(AddrOperand::Indirect(4)).resolve(&regs, &mem)?,
            -2
        );
        assert_eq!(
            Operand::Mem(AddrOperand::Direct(0x2000_0100)).resolve(&regs, &mem)?,
            -2
        );
        Ok(())
    }

    #[test]
    fn test_resolve_refuses_unmapped() {
        let regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        let op = Operand::Mem(AddrOperand::Direct(0xf000_0000));
        assert!(matches!(
            op.resolve(&regs, &mem),
            Err(ShellError::AddressOutOfRange(_))
        ));
    }
}
