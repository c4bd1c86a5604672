use std::fmt;

/// # Instruction set
///
/// Every opcode is 16 bits. The top nibble picks the family; the rest is
/// operands, always in the same places:
///
/// ```text
/// [_nnn]  12-bit address
/// [_x__]  register Vx (or the range V0..=Vx)
/// [__y_]  register Vy
/// [__kk]  8-bit immediate
/// [___n]  4-bit count, or a selector within the family
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 0nnn: machine code routine on the original hardware; ignored
    Sys(u16),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SkipEqImm { x: u8, kk: u8 },
    /// 4xkk
    SkipNeImm { x: u8, kk: u8 },
    /// 5xy0
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadImm { x: u8, kk: u8 },
    /// 7xkk
    AddImm { x: u8, kk: u8 },
    /// 8xy0
    Move { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddReg { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8, y: u8 },
    /// 8xy7
    SubReversed { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8, y: u8 },
    /// 9xy0
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    LoadIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipKeyDown { x: u8 },
    /// ExA1
    SkipKeyUp { x: u8 },
    /// Fx07
    ReadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    LoadGlyph { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegisters { x: u8 },
    /// Fx65
    LoadRegisters { x: u8 },
    /// anything else
    Unknown(u16),
}

fn nibbles(op: u16) -> (u8, u8, u8, u8) {
    (
        ((op & 0xF000) >> 12) as u8,
        ((op & 0x0F00) >> 8) as u8,
        ((op & 0x00F0) >> 4) as u8,
        (op & 0x000F) as u8,
    )
}

impl Instruction {
    pub fn decode(op: u16) -> Instruction {
        use Instruction::*;
        let nnn = op & 0x0FFF;
        let kk = (op & 0x00FF) as u8;
        match nibbles(op) {
            (0x0, 0x0, 0xE, 0x0) => ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x0, ..) => Sys(nnn),
            (0x1, ..) => Jump(nnn),
            (0x2, ..) => Call(nnn),
            (0x3, x, ..) => SkipEqImm { x, kk },
            (0x4, x, ..) => SkipNeImm { x, kk },
            (0x5, x, y, 0x0) => SkipEqReg { x, y },
            (0x6, x, ..) => LoadImm { x, kk },
            (0x7, x, ..) => AddImm { x, kk },
            (0x8, x, y, 0x0) => Move { x, y },
            (0x8, x, y, 0x1) => Or { x, y },
            (0x8, x, y, 0x2) => And { x, y },
            (0x8, x, y, 0x3) => Xor { x, y },
            (0x8, x, y, 0x4) => AddReg { x, y },
            (0x8, x, y, 0x5) => Sub { x, y },
            (0x8, x, y, 0x6) => ShiftRight { x, y },
            (0x8, x, y, 0x7) => SubReversed { x, y },
            (0x8, x, y, 0xE) => ShiftLeft { x, y },
            (0x9, x, y, 0x0) => SkipNeReg { x, y },
            (0xA, ..) => LoadIndex(nnn),
            (0xB, ..) => JumpOffset(nnn),
            (0xC, x, ..) => Random { x, kk },
            (0xD, x, y, n) => Draw { x, y, n },
            (0xE, x, 0x9, 0xE) => SkipKeyDown { x },
            (0xE, x, 0xA, 0x1) => SkipKeyUp { x },
            (0xF, x, 0x0, 0x7) => ReadDelay { x },
            (0xF, x, 0x0, 0xA) => WaitKey { x },
            (0xF, x, 0x1, 0x5) => SetDelay { x },
            (0xF, x, 0x1, 0x8) => SetSound { x },
            (0xF, x, 0x1, 0xE) => AddIndex { x },
            (0xF, x, 0x2, 0x9) => LoadGlyph { x },
            (0xF, x, 0x3, 0x3) => StoreBcd { x },
            (0xF, x, 0x5, 0x5) => StoreRegisters { x },
            (0xF, x, 0x6, 0x5) => LoadRegisters { x },
            _ => Unknown(op),
        }
    }
}

/// disassembly, in the usual Cowgod mnemonics
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Sys(a) => write!(f, "SYS  {:#05X}", a),
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP   {:#05X}", a),
            Call(a) => write!(f, "CALL {:#05X}", a),
            SkipEqImm { x, kk } => write!(f, "SE   V{:X}, {:#04X}", x, kk),
            SkipNeImm { x, kk } => write!(f, "SNE  V{:X}, {:#04X}", x, kk),
            SkipEqReg { x, y } => write!(f, "SE   V{:X}, V{:X}", x, y),
            LoadImm { x, kk } => write!(f, "LD   V{:X}, {:#04X}", x, kk),
            AddImm { x, kk } => write!(f, "ADD  V{:X}, {:#04X}", x, kk),
            Move { x, y } => write!(f, "LD   V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR   V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND  V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR  V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD  V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB  V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR  V{:X}, V{:X}", x, y),
            SubReversed { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL  V{:X}, V{:X}", x, y),
            SkipNeReg { x, y } => write!(f, "SNE  V{:X}, V{:X}", x, y),
            LoadIndex(a) => write!(f, "LD   I, {:#05X}", a),
            JumpOffset(a) => write!(f, "JP   V0, {:#05X}", a),
            Random { x, kk } => write!(f, "RND  V{:X}, {:#04X}", x, kk),
            Draw { x, y, n } => write!(f, "DRW  V{:X}, V{:X}, {}", x, y, n),
            SkipKeyDown { x } => write!(f, "SKP  V{:X}", x),
            SkipKeyUp { x } => write!(f, "SKNP V{:X}", x),
            ReadDelay { x } => write!(f, "LD   V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD   V{:X}, K", x),
            SetDelay { x } => write!(f, "LD   DT, V{:X}", x),
            SetSound { x } => write!(f, "LD   ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD  I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD   F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD   B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD   [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD   V{:X}, [I]", x),
            Unknown(op) => write!(f, "DW   {:#06X}", op),
        }
    }
}

/// Disassemble a program image as it would sit in memory from `base`.
/// A trailing odd byte is shown as data.
pub fn disassemble(program: &[u8], base: u16) -> Vec<String> {
    program
        .chunks(2)
        .enumerate()
        .map(|(n, chunk)| {
            let addr = base as usize + n * 2;
            match chunk {
                [hi, lo] => {
                    let op = (*hi as u16) << 8 | *lo as u16;
                    format!("{:04X}: {:04X}  {}", addr, op, Instruction::decode(op))
                }
                [b] => format!("{:04X}: {:02X}    DB   {:#04X}", addr, b, b),
                _ => unreachable!("chunks(2) yields one or two bytes"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_nibbles() {
        assert_eq!(nibbles(0xABCD), (0xA, 0xB, 0xC, 0xD));
    }

    #[test]
    fn test_decode_operand_fields() {
        assert_eq!(Instruction::decode(0x1ABC), Jump(0xABC));
        assert_eq!(Instruction::decode(0x3A5F), SkipEqImm { x: 0xA, kk: 0x5F });
        assert_eq!(Instruction::decode(0x8AB4), AddReg { x: 0xA, y: 0xB });
        assert_eq!(Instruction::decode(0xD12F), Draw { x: 1, y: 2, n: 0xF });
        assert_eq!(Instruction::decode(0xF265), LoadRegisters { x: 2 });
    }

    #[test]
    fn test_decode_system_family() {
        assert_eq!(Instruction::decode(0x00E0), ClearScreen);
        assert_eq!(Instruction::decode(0x00EE), Return);
        assert_eq!(Instruction::decode(0x0123), Sys(0x123));
    }

    #[test]
    fn test_decode_unknown() {
        for op in [0x5121, 0x8128, 0x912F, 0xE1FF, 0xF1FF, 0xF100] {
            assert_eq!(Instruction::decode(op), Unknown(op), "{:04X}", op);
        }
    }

    #[test]
    fn test_decodes_all_35_instructions() {
        let ops: [u16; 35] = [
            0x0123, 0x00E0, 0x00EE, 0x1000, 0x2000, 0x3000, 0x4000, 0x5000, 0x6000, 0x7000,
            0x8000, 0x8001, 0x8002, 0x8003, 0x8004, 0x8005, 0x8006, 0x8007, 0x800E, 0x9000,
            0xA000, 0xB000, 0xC000, 0xD000, 0xE09E, 0xE0A1, 0xF007, 0xF00A, 0xF015, 0xF018,
            0xF01E, 0xF029, 0xF033, 0xF055, 0xF065,
        ];
        let mut seen = Vec::new();
        for op in ops {
            let i = Instruction::decode(op);
            assert!(!matches!(i, Unknown(_)), "{:04X}", op);
            assert!(!seen.contains(&i));
            seen.push(i);
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Instruction::decode(0xA22A).to_string(), "LD   I, 0x22A");
        assert_eq!(Instruction::decode(0xD015).to_string(), "DRW  V0, V1, 5");
        assert_eq!(Instruction::decode(0xFFFF).to_string(), "DW   0xFFFF");
    }

    #[test]
    fn test_disassemble_listing() {
        let listing = disassemble(&[0x60, 0x05, 0x00, 0xE0, 0x12], 0x200);
        assert_eq!(
            listing,
            vec![
                "0200: 6005  LD   V0, 0x05",
                "0202: 00E0  CLS",
                "0204: 12    DB   0x12",
            ]
        );
    }
}
