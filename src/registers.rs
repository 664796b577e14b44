use crate::error::ShellError;

pub const NUM_REGISTERS: usize = 32;

/// General-purpose register file: 32 signed words, zeroed at power-up.
#[derive(Clone, Debug, Default)]
pub struct RegisterBank {
    regs: [i32; NUM_REGISTERS],
}

impl RegisterBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, idx: usize) -> Result<i32, ShellError> {
        self.regs.get(idx).copied().ok_or(ShellError::BadRegister)
    }

    pub fn set(&mut self, idx: usize, value: i32) -> Result<(), ShellError> {
        let slot = self.regs.get_mut(idx).ok_or(ShellError::BadRegister)?;
        *slot = value;
        Ok(())
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), ShellError> {
        if a >= NUM_REGISTERS || b >= NUM_REGISTERS {
            return Err(ShellError::BadRegister);
        }
        self.regs.swap(a, b);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.regs.iter().copied().enumerate()
    }
}

/// parse `rN`/`RN` with N in `[0, 32)`
pub fn parse_register(token: &str) -> Option<usize> {
    let digits = token
        .strip_prefix('r')
        .or_else(|| token.strip_prefix('R'))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<usize>().ok().filter(|n| *n < NUM_REGISTERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_at_start() {
        let bank = RegisterBank::new();
        assert!(bank.iter().all(|(_, v)| v == 0));
        assert_eq!(bank.iter().count(), NUM_REGISTERS);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut bank = RegisterBank::new();
        assert!(bank.get(32).is_err());
        assert!(bank.set(32, 1).is_err());
        assert!(bank.swap(0, 40).is_err());
    }

    #[test]
    fn test_swap() -> Result<(), ShellError> {
        let mut bank = RegisterBank::new();
        bank.set(1, 10)?;
        bank.set(2, -3)?;
        bank.swap(1, 2)?;
        assert_eq!(bank.get(1)?, -3);
        assert_eq!(bank.get(2)?, 10);
        Ok(())
    }

    #[test]
    fn test_parse_register() {
        assert_eq!(parse_register("r0"), Some(0));
        assert_eq!(parse_register("R31"), Some(31));
        assert_eq!(parse_register("r32"), None);
        assert_eq!(parse_register("r"), None);
        assert_eq!(parse_register("r1x"), None);
        assert_eq!(parse_register("r-1"), None);
        assert_eq!(parse_register("#1"), None);
    }
}
