use crate::error::ShellError;
use std::io;

// NB. addresses are u32 as on the target; lengths are usize to stop endless casting

/// Read access to the controller's address space, gated by a range predicate.
/// Nothing dereferences an address without asking `is_readable` first.
pub trait MemoryMap {
    /// whether all four bytes of the word at `addr` are backed
    fn is_readable(&self, addr: u32) -> bool;

    /// get a r/o slice of the underlying memory; callers check the range first
    fn get_ro_slice(&self, addr: u32, len: usize) -> &[u8];

    /// get a little-endian 32-bit word, refusing anything out of range
    fn read_word(&self, addr: u32) -> Result<u32, ShellError> {
        if !self.is_readable(addr) {
            return Err(ShellError::AddressOutOfRange(addr));
        }
        let w = self.get_ro_slice(addr, 4);
        Ok(u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
    }
}

/// one contiguous backed region
struct Region {
    start: u32,
    bytes: Box<[u8]>,
}

impl Region {
    fn new(start: u32, size: usize) -> Self {
        Region {
            start,
            bytes: vec![0u8; size].into_boxed_slice(),
        }
    }

    fn offset(&self, addr: u32, len: usize) -> Option<usize> {
        let off = addr.checked_sub(self.start)? as usize;
        (off.checked_add(len)? <= self.bytes.len()).then_some(off)
    }
}

/// Defines the MSP432E4 memory map, as far as the shell is allowed to look:
///   0x0000_0000-0x0007_ffff  flash
///   0x2000_0000-0x2007_ffff  SRAM
///
/// everything else (peripherals, bit-band aliases) is refused
pub struct SimulatedMemory {
    regions: Vec<Region>,
}

pub const FLASH_START: u32 = 0x0000_0000;
pub const FLASH_SIZE_BYTES: usize = 0x0008_0000;
pub const SRAM_START: u32 = 0x2000_0000;
pub const SRAM_SIZE_BYTES: usize = 0x0008_0000;

impl SimulatedMemory {
    /// zeroed flash and SRAM
    pub fn new() -> Self {
        SimulatedMemory {
            regions: vec![
                Region::new(FLASH_START, FLASH_SIZE_BYTES),
                Region::new(SRAM_START, SRAM_SIZE_BYTES),
            ],
        }
    }

    fn region(&self, addr: u32, len: usize) -> Option<(&Region, usize)> {
        self.regions
            .iter()
            .find_map(|r| r.offset(addr, len).map(|off| (r, off)))
    }

    /// get a r/w slice of backed memory
    pub fn get_rw_slice(&mut self, addr: u32, len: usize) -> Result<&mut [u8], ShellError> {
        let r = self
            .regions
            .iter_mut()
            .find(|r| r.offset(addr, len).is_some())
            .ok_or(ShellError::AddressOutOfRange(addr))?;
        let off = (addr - r.start) as usize;
        Ok(&mut r.bytes[off..off + len])
    }

    /// write a chunk of bytes
    pub fn write(&mut self, data: &[u8], addr: u32) -> Result<(), ShellError> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    pub fn write_word(&mut self, addr: u32, value: u32) -> Result<(), ShellError> {
        self.write(&value.to_le_bytes(), addr)
    }

    /// write unknown len of data at a particular address, e.g. a flash image
    pub fn load(&mut self, reader: &mut impl io::Read, addr: u32) -> Result<usize, ShellError> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        self.write(&buf, addr)?;
        Ok(len)
    }
}

impl Default for SimulatedMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMap for SimulatedMemory {
    fn is_readable(&self, addr: u32) -> bool {
        self.region(addr, 4).is_some()
    }

    fn get_ro_slice(&self, addr: u32, len: usize) -> &[u8] {
        match self.region(addr, len) {
            Some((r, off)) => &r.bytes[off..off + len],
            None => &[],
        }
    }
}

/// parse the argument of `-memr`: hex, with or without `0x`
pub fn parse_hex_address(text: &str) -> Option<u32> {
    let t = text.trim();
    let digits = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .unwrap_or(t);
    u32::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() -> Result<(), ShellError> {
        let m = SimulatedMemory::new();
        assert_eq!(m.read_word(FLASH_START)?, 0);
        assert_eq!(m.read_word(SRAM_START)?, 0);
        Ok(())
    }

    #[test]
    fn test_range_predicate() {
        let m = SimulatedMemory::new();
        assert!(m.is_readable(0x0000_0000));
        assert!(m.is_readable(0x0007_fffc));
        // word would run off the end of flash
        assert!(!m.is_readable(0x0007_fffe));
        assert!(!m.is_readable(0x0008_0000));
        assert!(m.is_readable(0x2000_0000));
        assert!(m.is_readable(0x2007_fffc));
        assert!(!m.is_readable(0x2008_0000));
        assert!(!m.is_readable(0xf000_0000));
    }

    #[test]
    fn test_read_word_little_endian() -> Result<(), ShellError> {
        let mut m = SimulatedMemory::new();
        m.write(&[0x78, 0x56, 0x34, 0x12], 0x2000_0010)?;
        assert_eq!(m.read_word(0x2000_0010)?, 0x1234_5678);
        Ok(())
    }

    #[test]
    fn test_out_of_range_refused() {
        let m = SimulatedMemory::new();
        assert!(matches!(
            m.read_word(0xf000_0000),
            Err(ShellError::AddressOutOfRange(0xf000_0000))
        ));
    }

    #[test]
    fn test_write_outside_refused() {
        let mut m = SimulatedMemory::new();
        assert!(m.write_word(0x1000_0000, 1).is_err());
    }

    #[test]
    fn test_load_image() -> Result<(), ShellError> {
        let mut m = SimulatedMemory::new();
        let mut image: &[u8] = &[0x00, 0x10, 0x00, 0x20, 0xef, 0xbe, 0xad, 0xde];
        let n = m.load(&mut image, FLASH_START)?;
        assert_eq!(n, 8);
        assert_eq!(m.read_word(0)?, 0x2000_1000);
        assert_eq!(m.read_word(4)?, 0xdead_beef);
        Ok(())
    }

    #[test]
    fn test_parse_hex_address() {
        assert_eq!(parse_hex_address("20000000"), Some(0x2000_0000));
        assert_eq!(parse_hex_address("0xf0000000"), Some(0xf000_0000));
        assert_eq!(parse_hex_address(" 1C "), Some(0x1c));
        assert_eq!(parse_hex_address("zz"), None);
        assert_eq!(parse_hex_address(""), None);
    }
}
