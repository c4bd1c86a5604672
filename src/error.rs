use std::io;
use thiserror::Error;

/// Everything the interpreter can report back to whoever is driving it.
///
/// None of these are fatal to the process: the instruction that hit one is
/// abandoned, and the driver decides whether to carry on.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program is too large ({size} bytes), at most {max} bytes fit above 0x200")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("stack overflow: subroutine nesting exceeds {depth} levels")]
    StackOverflow { depth: usize },

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("memory access out of bounds at address {address:#06X}")]
    OutOfBounds { address: usize },

    #[error("unsupported memory size {size}, must be between 0x200 and 0x10000 bytes")]
    InvalidMemorySize { size: usize },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("sound device error: {0}")]
    Sound(String),
}

impl PartialEq for Chip8Error {
    fn eq(&self, other: &Self) -> bool {
        use Chip8Error::*;
        match (self, other) {
            (ProgramTooLarge { size: a, max: b }, ProgramTooLarge { size: c, max: d }) => {
                a == c && b == d
            }
            (StackOverflow { depth: a }, StackOverflow { depth: b }) => a == b,
            (StackUnderflow, StackUnderflow) => true,
            (OutOfBounds { address: a }, OutOfBounds { address: b }) => a == b,
            (InvalidMemorySize { size: a }, InvalidMemorySize { size: b }) => a == b,
            (Io(a), Io(b)) => a.kind() == b.kind(),
            (Sound(a), Sound(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = Chip8Error::OutOfBounds { address: 0x1000 };
        assert_eq!(e.to_string(), "memory access out of bounds at address 0x1000");
        let e = Chip8Error::StackOverflow { depth: 16 };
        assert_eq!(
            e.to_string(),
            "stack overflow: subroutine nesting exceeds 16 levels"
        );
    }

    #[test]
    fn test_io_converts() {
        let e: Chip8Error = io::Error::new(io::ErrorKind::UnexpectedEof, "short").into();
        assert_eq!(e, Chip8Error::Io(io::ErrorKind::UnexpectedEof.into()));
    }
}
