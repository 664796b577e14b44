//! The `-reg` register machine: `OP DST [SRC]`.
use crate::error::ShellError;
use crate::memory::MemoryMap;
use crate::operand::Operand;
use crate::registers::{parse_register, RegisterBank};
use std::str::FromStr;

pub const USAGE: &str = "-reg OP DST [SRC]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Mov,
    Xchg,
    Inc,
    Dec,
    Neg,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Ior,
    Xor,
    Max,
    Min,
}

impl FromStr for Opcode {
    type Err = ShellError;

    /// opcodes are case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.to_ascii_lowercase().as_str() {
            "mov" => Opcode::Mov,
            "xchg" => Opcode::Xchg,
            "inc" => Opcode::Inc,
            "dec" => Opcode::Dec,
            "neg" => Opcode::Neg,
            "not" => Opcode::Not,
            "add" => Opcode::Add,
            "sub" => Opcode::Sub,
            "mul" => Opcode::Mul,
            "div" => Opcode::Div,
            "rem" => Opcode::Rem,
            "and" => Opcode::And,
            "ior" => Opcode::Ior,
            "xor" => Opcode::Xor,
            "max" => Opcode::Max,
            "min" => Opcode::Min,
            _ => return Err(ShellError::BadOpcode),
        };
        Ok(op)
    }
}

impl Opcode {
    fn is_unary(self) -> bool {
        matches!(self, Opcode::Inc | Opcode::Dec | Opcode::Neg | Opcode::Not)
    }

    /// combine the destination's current value with a source value
    fn apply(self, dst: i32, src: i32) -> Result<i32, ShellError> {
        let v = match self {
            Opcode::Mov => src,
            Opcode::Add => dst.wrapping_add(src),
            Opcode::Sub => dst.wrapping_sub(src),
            Opcode::Mul => dst.wrapping_mul(src),
            Opcode::Div | Opcode::Rem if src == 0 => return Err(ShellError::DivideByZero),
            // truncates toward zero; i32::MIN / -1 wraps
            Opcode::Div => dst.wrapping_div(src),
            // sign follows the dividend
            Opcode::Rem => dst.wrapping_rem(src),
            Opcode::And => dst & src,
            Opcode::Ior => dst | src,
            Opcode::Xor => dst ^ src,
            Opcode::Max => dst.max(src),
            Opcode::Min => dst.min(src),
            Opcode::Inc => dst.wrapping_add(1),
            Opcode::Dec => dst.wrapping_sub(1),
            Opcode::Neg => dst.wrapping_neg(),
            Opcode::Not => !dst,
            // a swap, not a combine; see Instruction::Xchg
            Opcode::Xchg => return Err(ShellError::BadOpcode),
        };
        Ok(v)
    }
}

/// A decoded `-reg` instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Unary { op: Opcode, dst: usize },
    Binary { op: Opcode, dst: usize, src: Operand },
    Xchg { a: usize, b: usize },
}

impl Instruction {
    /// decode `OP DST [SRC]`; at most three tokens are looked at
    pub fn parse(args: &str) -> Result<Instruction, ShellError> {
        let mut tokens = args.split_whitespace();
        let (op, dst) = match (tokens.next(), tokens.next()) {
            (Some(op), Some(dst)) => (op, dst),
            _ => return Err(ShellError::Usage(USAGE)),
        };
        let src = tokens.next();
        let op: Opcode = op.parse()?;

        if op == Opcode::Xchg {
            let a = parse_register(dst);
            let b = src.and_then(parse_register);
            return match (a, b) {
                (Some(a), Some(b)) => Ok(Instruction::Xchg { a, b }),
                _ => Err(ShellError::BadRegister),
            };
        }
        if op.is_unary() {
            let dst = parse_register(dst).ok_or(ShellError::BadRegister)?;
            return Ok(Instruction::Unary { op, dst });
        }
        let src = src.and_then(Operand::parse).ok_or(ShellError::BadSource)?;
        let dst = parse_register(dst).ok_or(ShellError::BadDestination)?;
        Ok(Instruction::Binary { op, dst, src })
    }

    /// Run against the register bank. Returns the destination index so the
    /// caller can echo its new value. Nothing is written unless every operand
    /// resolved and the arithmetic succeeded.
    pub fn execute(&self, regs: &mut RegisterBank, memory: &dyn MemoryMap) -> Result<usize, ShellError> {
        match *self {
            Instruction::Xchg { a, b } => {
                regs.swap(a, b)?;
                Ok(a)
            }
            Instruction::Unary { op, dst } => {
                let v = op.apply(regs.get(dst)?, 0)?;
                regs.set(dst, v)?;
                Ok(dst)
            }
            Instruction::Binary { op, dst, src } => {
                let s = src.resolve(regs, memory)?;
                let v = op.apply(regs.get(dst)?, s)?;
                regs.set(dst, v)?;
                Ok(dst)
            }
        }
    }
}

/// lines printed by a bare `-reg`
pub fn listing(regs: &RegisterBank) -> Vec<String> {
    let mut out = vec!["R  Value".to_string(), "--------".to_string()];
    out.extend(regs.iter().map(|(i, v)| format!("R{} = {}", i, v)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SimulatedMemory;

    fn run(regs: &mut RegisterBank, mem: &SimulatedMemory, args: &str) -> Result<usize, ShellError> {
        Instruction::parse(args)?.execute(regs, mem)
    }

    #[test]
    fn test_mov_then_add_self() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        run(&mut regs, &mem, "mov r1 #10")?;
        assert_eq!(run(&mut regs, &mem, "add r1 r1")?, 1);
        assert_eq!(regs.get(1)?, 20);
        Ok(())
    }

    #[test]
    fn test_unary_ops() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        run(&mut regs, &mem, "mov r3 #5")?;
        run(&mut regs, &mem, "inc r3")?;
        assert_eq!(regs.get(3)?, 6);
        run(&mut regs, &mem, "dec r3")?;
        run(&mut regs, &mem, "dec r3")?;
        assert_eq!(regs.get(3)?, 4);
        run(&mut regs, &mem, "neg r3")?;
        assert_eq!(regs.get(3)?, -4);
        run(&mut regs, &mem, "not r3")?;
        assert_eq!(regs.get(3)?, 3);
        Ok(())
    }

    #[test]
    fn test_opcode_case_insensitive() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        run(&mut regs, &mem, "MOV R2 #xFF")?;
        assert_eq!(regs.get(2)?, 255);
        Ok(())
    }

    #[test]
    fn test_xchg() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        run(&mut regs, &mem, "mov r1 #1")?;
        run(&mut regs, &mem, "mov r2 #2")?;
        assert_eq!(run(&mut regs, &mem, "xchg r1 r2")?, 1);
        assert_eq!(regs.get(1)?, 2);
        assert_eq!(regs.get(2)?, 1);
        assert!(matches!(
            run(&mut regs, &mem, "xchg r1 #2"),
            Err(ShellError::BadRegister)
        ));
        Ok(())
    }

    #[test]
    fn test_div_rem_truncate_toward_zero() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        run(&mut regs, &mem, "mov r0 #-7")?;
        run(&mut regs, &mem, "div r0 #2")?;
        assert_eq!(regs.get(0)?, -3);
        run(&mut regs, &mem, "mov r0 #-7")?;
        run(&mut regs, &mem, "rem r0 #2")?;
        assert_eq!(regs.get(0)?, -1);
        run(&mut regs, &mem, "mov r0 #7")?;
        run(&mut regs, &mem, "rem r0 #-2")?;
        assert_eq!(regs.get(0)?, 1);
        Ok(())
    }

    #[test]
    fn test_div_by_zero_leaves_dst() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        run(&mut regs, &mem, "mov r4 #9")?;
        assert!(matches!(
            run(&mut regs, &mem, "div r4 r5"),
            Err(ShellError::DivideByZero)
        ));
        assert!(matches!(
            run(&mut regs, &mem, "rem r4 #0"),
            Err(ShellError::DivideByZero)
        ));
        assert_eq!(regs.get(4)?, 9);
        Ok(())
    }

    #[test]
    fn test_min_wraps_div() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        run(&mut regs, &mem, "mov r0 #x80000000")?;
        run(&mut regs, &mem, "div r0 #-1")?;
        assert_eq!(regs.get(0)?, i32::MIN);
        Ok(())
    }

    #[test]
    fn test_bitwise_and_minmax() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        run(&mut regs, &mem, "mov r1 #x0f")?;
        run(&mut regs, &mem, "ior r1 #xf0")?;
        assert_eq!(regs.get(1)?, 0xff);
        run(&mut regs, &mem, "and r1 #x3c")?;
        assert_eq!(regs.get(1)?, 0x3c);
        run(&mut regs, &mem, "xor r1 #x3c")?;
        assert_eq!(regs.get(1)?, 0);
        run(&mut regs, &mem, "max r1 #-5")?;
        assert_eq!(regs.get(1)?, 0);
        run(&mut regs, &mem, "max r1 #5")?;
        assert_eq!(regs.get(1)?, 5);
        run(&mut regs, &mem, "min r1 #-5")?;
        assert_eq!(regs.get(1)?, -5);
        Ok(())
    }

    #[test]
    fn test_memory_sources() -> Result<(), ShellError> {
        let mut regs = RegisterBank::new();
        let mut mem = SimulatedMemory::new();
        mem.write_word(0x2000_0000, 77)?;
        run(&mut regs, &mem, "mov r1 @x20000000")?;
        assert_eq!(regs.get(1)?, 77);
        run(&mut regs, &mem, "mov r2 #x20000000")?;
        run(&mut regs, &mem, "add r1 @r2")?;
        assert_eq!(regs.get(1)?, 154);
        assert!(matches!(
            run(&mut regs, &mem, "mov r1 @xf0000000"),
            Err(ShellError::AddressOutOfRange(_))
        ));
        assert_eq!(regs.get(1)?, 154);
        Ok(())
    }

    #[test]
    fn test_bad_operands() {
        let mut regs = RegisterBank::new();
        let mem = SimulatedMemory::new();
        assert!(matches!(run(&mut regs, &mem, "mov r1"), Err(ShellError::BadSource)));
        assert!(matches!(run(&mut regs, &mem, "mov x1 #1"), Err(ShellError::BadDestination)));
        assert!(matches!(run(&mut regs, &mem, "inc r40"), Err(ShellError::BadRegister)));
        assert!(matches!(run(&mut regs, &mem, "frob r1 #1"), Err(ShellError::BadOpcode)));
        assert!(matches!(run(&mut regs, &mem, "mov"), Err(ShellError::Usage(_))));
    }

    #[test]
    fn test_listing() {
        let mut regs = RegisterBank::new();
        regs.set(31, -1).unwrap();
        let lines = listing(&regs);
        assert_eq!(lines.len(), 34);
        assert_eq!(lines[2], "R0 = 0");
        assert_eq!(lines[33], "R31 = -1");
    }
}
