use crate::error::Chip8Error;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the address space the interpreter reads and writes.
///
/// Implementors only provide the raw slices and a reset; everything else is
/// built on those, and every access is checked against `size()`.
pub trait MemoryMap {
    /// how many bytes are addressable
    fn size(&self) -> usize;

    /// zero the whole address space
    fn reset(&mut self);

    /// get a r/w slice of the underlying memory, `None` if it would run off the end
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Option<&mut [u8]>;

    /// get a r/o slice of the underlying memory, `None` if it would run off the end
    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]>;

    /// fail unless `addr..addr + len` lies wholly inside memory
    fn check_range(&self, addr: u16, len: usize) -> Result<(), Chip8Error> {
        let end = addr as usize + len;
        if end > self.size() {
            // report the first byte that's missing
            let address = (addr as usize).max(self.size());
            return Err(Chip8Error::OutOfBounds { address });
        }
        Ok(())
    }

    fn get(&self, addr: u16) -> Result<u8, Chip8Error> {
        self.read(addr, 1).map(|b| b[0])
    }

    fn set(&mut self, addr: u16, value: u8) -> Result<(), Chip8Error> {
        self.write(&[value], addr)
    }

    /// borrow `len` bytes starting at `addr`
    fn read(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error> {
        self.check_range(addr, len)?;
        self.get_ro_slice(addr, len)
            .ok_or(Chip8Error::OutOfBounds { address: addr as usize })
    }

    /// write a chunk of bytes into "RAM"; nothing is written if it doesn't fit
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Chip8Error> {
        self.check_range(addr, data.len())?;
        let bytes = self
            .get_rw_slice(addr, data.len())
            .ok_or(Chip8Error::OutOfBounds { address: addr as usize })?;
        bytes.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (opcodes)
    fn get_word(&self, addr: u16) -> Result<u16, Chip8Error> {
        let word = self.read(addr, 2)?;
        Ok(((word[0] as u16) << 8) | (word[1] as u16))
    }
}

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit glyphs live; everything below the program is reserved
pub const CHIP8_FONT_ADDR: u16 = 0x0000;

/// bytes per glyph in `CHIP8_FONT`
pub const CHIP8_GLYPH_BYTES: u16 = 5;

/// the largest address space a 16-bit I / PC can reach
const CHIP8_MAX_RAM_SIZE_BYTES: usize = 0x10000;

/// Plain linear RAM, as on the standard interpreters.
///
/// ```text
///   0x0000-0x004f  font
///   0x0050-0x01ff  reserved
///   0x0200-....    program
/// ```
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn reset(&mut self) {
        self.bytes.iter_mut().for_each(|b| *b = 0);
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Option<&mut [u8]> {
        let a = addr as usize;
        self.bytes.get_mut(a..a + len)
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]> {
        let a = addr as usize;
        self.bytes.get(a..a + len)
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM of `size` bytes; must at least cover the reserved area
    pub fn new(size: usize) -> Result<Self, Chip8Error> {
        if size <= CHIP8_PROGRAM_ADDR as usize || size > CHIP8_MAX_RAM_SIZE_BYTES {
            return Err(Chip8Error::InvalidMemorySize { size });
        }
        Ok(Chip8MemoryMap {
            bytes: vec![0u8; size].into_boxed_slice(),
        })
    }

    /// how much room there is for a program
    pub fn program_capacity(&self) -> usize {
        self.bytes.len() - CHIP8_PROGRAM_ADDR as usize
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Chip8MemoryMap {
            bytes: vec![0u8; crate::config::DEFAULT_MEMORY_SIZE].into_boxed_slice(),
        }
    }
}

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::default();
        assert_eq!(m.size(), 4096);
        assert_eq!(m.bytes[..], [0; 4096]);
    }

    #[test]
    fn test_bad_sizes_rejected() {
        assert!(Chip8MemoryMap::new(0x200).is_err());
        assert!(Chip8MemoryMap::new(0x10001).is_err());
        assert!(Chip8MemoryMap::new(0x10000).is_ok());
    }

    #[test]
    fn test_write_slice_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::default();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 8)?;
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::default();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0)?;
        assert_eq!(m.get_word(0x4)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_get_set() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::default();
        m.set(0xfff, 0xab)?;
        assert_eq!(m.get(0xfff)?, 0xab);
        assert_eq!(
            m.get(0x1000),
            Err(Chip8Error::OutOfBounds { address: 0x1000 })
        );
        Ok(())
    }

    #[test]
    fn test_write_too_much_is_rejected_untouched() {
        let mut dst = Chip8MemoryMap::default();
        let r = dst.write(&[0xff; 8], 4089);
        assert_eq!(r, Err(Chip8Error::OutOfBounds { address: 4096 }));
        assert_eq!(dst.bytes[4089..], [0; 7]);
    }

    #[test]
    fn test_word_straddling_the_end() {
        let m = Chip8MemoryMap::default();
        assert_eq!(
            m.get_word(0xfff),
            Err(Chip8Error::OutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_reset_zeroes() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new(0x400)?;
        m.write(&CHIP8_FONT, CHIP8_FONT_ADDR)?;
        m.reset();
        assert_eq!(m.read(0, 0x400)?, &[0; 0x400][..]);
        assert_eq!(m.program_capacity(), 0x200);
        Ok(())
    }
}
