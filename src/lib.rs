//! ## Design
//!
//! * the interpreter is the machine: registers, stack, timers and the
//!   fetch/decode/execute loop
//! * everything else is a device the interpreter borrows through a narrow
//!   trait, so the same core runs against a terminal, a test harness or
//!   whatever else gets plugged in
//! * no timing in the core; the driver calls `.step()` at its own rate and
//!   `.tick_timers()` at 60Hz
//! * faults (stack, bounds, oversized programs) come back as errors and
//!   leave the machine as it was before the faulting instruction
//!
//! Model
//!
//! ```text
//! Environment (the binary)
//!  |-- memory(config), display, input, sound
//!  |-- interpreter(memory, display, input, sound, config)
//!  |    |-- instruction set
//!  |    `-- registers, stack, timers, run state
//!  `-- main loop, once per 60Hz frame
//!       |-- interpreter.poll_input()   // may satisfy a pending FX0A
//!       |-- interpreter.cycle(ips / 60)
//!       |-- interpreter.tick_timers()
//!       |-- interpreter.present()
//!       `-- sleep out the rest of the frame
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod sound;

pub use config::{Config, ShiftQuirk};
pub use error::Chip8Error;
pub use interpreter::{Chip8Interpreter, Registers, RunState};
