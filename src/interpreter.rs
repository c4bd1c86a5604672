//! # interpreter
//!
//! The CHIP-8 machine state proper; everything else is a borrowed device.
//!
//!  V0-VF  8-bit registers. VF doubles as the carry / borrow / collision flag
//!         and gets clobbered by the instructions that set flags.
//!  I      16-bit address register
//!  PC     16-bit program counter, 0x200 after reset
//!  stack  return addresses, 16 deep
//!  DT/ST  delay and sound timers, counted down at 60Hz by the driver
//!
//! ... and where the machine is in its little state machine:
//!
//!  Halted --load_program--> Ready --FX0A--> AwaitingKey --key--> Ready

use crate::config::{Config, ShiftQuirk};
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::Input;
use crate::memory::{
    MemoryMap, CHIP8_FONT, CHIP8_FONT_ADDR, CHIP8_GLYPH_BYTES, CHIP8_PROGRAM_ADDR,
};
use crate::opcode::Instruction;
use crate::sound::Sound;
use log::{debug, error, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

const VF: usize = 0xF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// reset, nothing loaded
    Halted,
    Ready,
    /// FX0A is waiting; the next key goes into V`register`
    AwaitingKey { register: u8 },
}

/// Everything the interpreter owns outright.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub stack: Vec<u16>,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl Registers {
    fn new(stack_depth: usize) -> Self {
        Registers {
            v: [0; 16],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: Vec::with_capacity(stack_depth),
            delay_timer: 0,
            sound_timer: 0,
        }
    }
}

pub struct Chip8Interpreter<'a> {
    memory: &'a mut dyn MemoryMap,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: Config,
    registers: Registers,
    state: RunState,
    rng: StdRng,
    tone_on: bool,
    dirty: bool,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        memory: &'a mut dyn MemoryMap,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Chip8Interpreter<'a> {
        Self::with_config(memory, display, input, sound, Config::default())
    }

    pub fn with_config(
        memory: &'a mut dyn MemoryMap,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: Config,
    ) -> Chip8Interpreter<'a> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut i = Chip8Interpreter {
            memory,
            display,
            input,
            sound,
            registers: Registers::new(config.stack_depth),
            config,
            state: RunState::Halted,
            rng,
            tone_on: false,
            dirty: false,
        };
        i.reset();
        i
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn memory(&self) -> &dyn MemoryMap {
        &*self.memory
    }

    pub fn display(&self) -> &dyn Display {
        &*self.display
    }

    /// back to power-on: registers, stack, timers, memory (with the font
    /// reseeded) and the screen
    pub fn reset(&mut self) {
        self.registers = Registers::new(self.config.stack_depth);
        self.state = RunState::Halted;
        self.memory.reset();
        if let Err(e) = self.memory.write(&CHIP8_FONT, CHIP8_FONT_ADDR) {
            error!("no room for the font: {}", e);
        }
        self.display.clear();
        self.dirty = true;
        if let Err(e) = self.set_tone(false) {
            error!("{}", e);
        }
        debug!("reset");
    }

    /// reset, then copy a raw program image in at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        self.reset();
        let max = self
            .memory
            .size()
            .saturating_sub(CHIP8_PROGRAM_ADDR as usize);
        if program.len() > max {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max,
            });
        }
        self.memory.write(program, CHIP8_PROGRAM_ADDR)?;
        self.state = RunState::Ready;
        debug!(
            "loaded {} byte program at {:#05X}",
            program.len(),
            CHIP8_PROGRAM_ADDR
        );
        Ok(())
    }

    /// load a chip8 program
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }

    /// Fetch, decode and execute one instruction. Does nothing unless Ready.
    ///
    /// If the instruction fails, PC is put back on it and nothing else has
    /// changed, so the error can be inspected and the step retried.
    pub fn step(&mut self) -> Result<(), Chip8Error> {
        if self.state != RunState::Ready {
            return Ok(());
        }
        let pc = self.registers.pc;
        let op = self.memory.get_word(pc)?;
        let instruction = Instruction::decode(op);
        trace!("{:04X}: {:04X}  {}", pc, op, instruction);

        self.registers.pc = pc.wrapping_add(2);
        if let Err(e) = self.execute(instruction) {
            self.registers.pc = pc;
            debug!("{:04X}: {:04X} faulted: {}", pc, op, e);
            return Err(e);
        }
        Ok(())
    }

    /// `n` steps, stopping at the first error
    pub fn cycle(&mut self, n: usize) -> Result<(), Chip8Error> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// the 60Hz tick: count both timers down, silencing the tone at zero
    pub fn tick_timers(&mut self) -> Result<(), Chip8Error> {
        self.registers.delay_timer = self.registers.delay_timer.saturating_sub(1);
        self.registers.sound_timer = self.registers.sound_timer.saturating_sub(1);
        self.set_tone(self.registers.sound_timer > 0)
    }

    /// a key went down; satisfies a pending FX0A, otherwise ignored
    pub fn on_key_press(&mut self, key: u8) {
        if key > 0xF {
            warn!("ignoring key {:#04X}, not on the keypad", key);
            return;
        }
        if let RunState::AwaitingKey { register } = self.state {
            self.registers.v[register as usize] = key;
            self.state = RunState::Ready;
            debug!("key {:X} -> V{:X}, resuming", key, register);
        }
    }

    /// hand every key the input device has seen to `on_key_press`
    pub fn poll_input(&mut self) -> Result<(), Chip8Error> {
        for key in self.input.poll()? {
            self.on_key_press(key);
        }
        Ok(())
    }

    /// render the display if anything was drawn since last time
    pub fn present(&mut self) -> Result<(), Chip8Error> {
        if self.dirty {
            self.display.render()?;
            self.dirty = false;
        }
        Ok(())
    }

    fn set_tone(&mut self, on: bool) -> Result<(), Chip8Error> {
        if on == self.tone_on {
            return Ok(());
        }
        let r = if on {
            self.sound.start()
        } else {
            self.sound.stop()
        };
        r.map_err(|e| Chip8Error::Sound(e.to_string()))?;
        self.tone_on = on;
        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.pc = self.registers.pc.wrapping_add(2);
        }
    }

    /// result into Vx first, then the flag, so the flag wins when x is F
    fn set_with_flag(&mut self, x: u8, value: u8, flag: bool) {
        self.registers.v[x as usize] = value;
        self.registers.v[VF] = flag as u8;
    }

    fn shift_source(&self, x: u8, y: u8) -> u8 {
        match self.config.shift_quirk {
            ShiftQuirk::InPlace => self.registers.v[x as usize],
            ShiftQuirk::FromVy => self.registers.v[y as usize],
        }
    }

    /// PC has already moved past `instruction`
    fn execute(&mut self, instruction: Instruction) -> Result<(), Chip8Error> {
        use Instruction::*;
        let r = &mut self.registers;
        match instruction {
            Sys(_) => (),
            ClearScreen => {
                self.display.clear();
                self.dirty = true;
            }
            Return => r.pc = r.stack.pop().ok_or(Chip8Error::StackUnderflow)?,
            Jump(addr) => r.pc = addr,
            Call(addr) => {
                if r.stack.len() >= self.config.stack_depth {
                    return Err(Chip8Error::StackOverflow {
                        depth: self.config.stack_depth,
                    });
                }
                r.stack.push(r.pc);
                r.pc = addr;
            }
            SkipEqImm { x, kk } => {
                let c = r.v[x as usize] == kk;
                self.skip_if(c)
            }
            SkipNeImm { x, kk } => {
                let c = r.v[x as usize] != kk;
                self.skip_if(c)
            }
            SkipEqReg { x, y } => {
                let c = r.v[x as usize] == r.v[y as usize];
                self.skip_if(c)
            }
            SkipNeReg { x, y } => {
                let c = r.v[x as usize] != r.v[y as usize];
                self.skip_if(c)
            }
            LoadImm { x, kk } => r.v[x as usize] = kk,
            AddImm { x, kk } => r.v[x as usize] = r.v[x as usize].wrapping_add(kk),
            Move { x, y } => r.v[x as usize] = r.v[y as usize],
            Or { x, y } => r.v[x as usize] |= r.v[y as usize],
            And { x, y } => r.v[x as usize] &= r.v[y as usize],
            Xor { x, y } => r.v[x as usize] ^= r.v[y as usize],
            AddReg { x, y } => {
                let (res, carry) = r.v[x as usize].overflowing_add(r.v[y as usize]);
                self.set_with_flag(x, res, carry);
            }
            Sub { x, y } => {
                let (vx, vy) = (r.v[x as usize], r.v[y as usize]);
                self.set_with_flag(x, vx.wrapping_sub(vy), vx > vy);
            }
            SubReversed { x, y } => {
                let (vx, vy) = (r.v[x as usize], r.v[y as usize]);
                self.set_with_flag(x, vy.wrapping_sub(vx), vy > vx);
            }
            ShiftRight { x, y } => {
                let src = self.shift_source(x, y);
                self.set_with_flag(x, src >> 1, src & 0x01 != 0);
            }
            ShiftLeft { x, y } => {
                let src = self.shift_source(x, y);
                self.set_with_flag(x, src << 1, src & 0x80 != 0);
            }
            LoadIndex(addr) => r.i = addr,
            JumpOffset(addr) => r.pc = addr + r.v[0] as u16,
            Random { x, kk } => {
                let byte: u8 = self.rng.gen();
                self.registers.v[x as usize] = byte & kk;
            }
            Draw { x, y, n } => self.draw_sprite(x, y, n)?,
            SkipKeyDown { x } => {
                let c = self.input.is_pressed(r.v[x as usize]);
                self.skip_if(c)
            }
            SkipKeyUp { x } => {
                let c = !self.input.is_pressed(r.v[x as usize]);
                self.skip_if(c)
            }
            ReadDelay { x } => r.v[x as usize] = r.delay_timer,
            WaitKey { x } => {
                self.state = RunState::AwaitingKey { register: x };
                debug!("waiting for a key for V{:X}", x);
            }
            SetDelay { x } => r.delay_timer = r.v[x as usize],
            SetSound { x } => {
                let st = r.v[x as usize];
                self.set_tone(st > 0)?;
                self.registers.sound_timer = st;
            }
            AddIndex { x } => r.i = r.i.wrapping_add(r.v[x as usize] as u16),
            LoadGlyph { x } => {
                r.i = CHIP8_FONT_ADDR + (r.v[x as usize] & 0x0F) as u16 * CHIP8_GLYPH_BYTES
            }
            StoreBcd { x } => {
                let vx = r.v[x as usize];
                let i = r.i;
                self.memory.write(&[vx / 100, vx / 10 % 10, vx % 10], i)?;
            }
            StoreRegisters { x } => {
                let i = r.i;
                self.memory.write(&r.v[..=x as usize], i)?;
            }
            LoadRegisters { x } => {
                let bytes = self.memory.read(r.i, x as usize + 1)?;
                r.v[..=x as usize].copy_from_slice(bytes);
            }
            Unknown(op) => warn!(
                "unknown opcode {:04X} at {:04X}, skipping",
                op,
                r.pc.wrapping_sub(2)
            ),
        }
        Ok(())
    }

    /// XOR an 8-wide, n-high sprite from memory at I onto the screen at
    /// (Vx, Vy), wrapping at the edges. VF = 1 iff a lit pixel went dark.
    fn draw_sprite(&mut self, x: u8, y: u8, n: u8) -> Result<(), Chip8Error> {
        let sprite = self.memory.read(self.registers.i, n as usize)?;
        let x0 = self.registers.v[x as usize] as usize;
        let y0 = self.registers.v[y as usize] as usize;
        let mut collision = false;
        for (row, byte) in sprite.iter().enumerate() {
            for bit in 0..8 {
                if byte & (0x80 >> bit) != 0 && !self.display.toggle_pixel(x0 + bit, y0 + row) {
                    collision = true;
                }
            }
        }
        self.registers.v[VF] = collision as u8;
        self.dirty = true;
        Ok(())
    }
}
