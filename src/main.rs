use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chip8vm::display::{MonoTermDisplay, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_WIDTH};
use chip8vm::input::TermInput;
use chip8vm::memory::{Chip8MemoryMap, CHIP8_PROGRAM_ADDR};
use chip8vm::opcode::disassemble;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use chip8vm::{Chip8Interpreter, Config, ShiftQuirk};

/// Run a CHIP-8 program in the terminal. Esc quits.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// raw program image, loaded at 0x200
    rom: PathBuf,

    /// instructions per second
    #[arg(long, default_value_t = 700)]
    ips: u32,

    /// timer and display rate
    #[arg(long, default_value_t = 60)]
    timer_hz: u32,

    #[arg(long, default_value_t = chip8vm::config::DEFAULT_MEMORY_SIZE)]
    memory_size: usize,

    #[arg(long, default_value_t = chip8vm::config::DEFAULT_STACK_DEPTH)]
    stack_depth: usize,

    /// 8XY6/8XYE shift VY into VX, like the COSMAC VIP
    #[arg(long)]
    shift_vy: bool,

    /// seed for CXNN
    #[arg(long)]
    seed: Option<u64>,

    /// how long a key stays down after the terminal last reported it
    #[arg(long, default_value_t = 200)]
    key_hold_ms: u64,

    #[arg(long)]
    mute: bool,

    /// print the program as an instruction listing and exit
    #[arg(long)]
    disassemble: bool,

    /// stop after this many frames; 0 runs until Esc
    #[arg(long, default_value_t = 0)]
    frames: u64,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            memory_size: self.memory_size,
            stack_depth: self.stack_depth,
            shift_quirk: if self.shift_vy {
                ShiftQuirk::FromVy
            } else {
                ShiftQuirk::InPlace
            },
            seed: self.seed,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.disassemble {
        let program = std::fs::read(&args.rom)?;
        for line in disassemble(&program, CHIP8_PROGRAM_ADDR) {
            println!("{}", line);
        }
        return Ok(());
    }

    // initialise
    let config = args.config();
    let mut memory = Chip8MemoryMap::new(config.memory_size)?;
    let mut display = MonoTermDisplay::new(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT)?;
    let mut input = TermInput::new(Duration::from_millis(args.key_hold_ms))?;
    let quit = input.quit_handle();
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let mut interpreter = Chip8Interpreter::with_config(
        &mut memory,
        &mut display,
        &mut input,
        sound.as_mut(),
        config,
    );

    // load a program
    let mut f = File::open(&args.rom)?;
    interpreter.load_program_from(&mut f)?;
    log::info!("running {}", args.rom.display());

    let timer_hz = args.timer_hz.max(1);
    let steps_per_frame = (args.ips / timer_hz).max(1) as usize;
    let frame_time = Duration::from_secs_f64(1.0 / timer_hz as f64);
    let mut next_frame = Instant::now();
    let mut frames = 0u64;
    while !quit.get() {
        next_frame += frame_time;
        let frame = interpreter
            .poll_input()
            .and_then(|_| interpreter.cycle(steps_per_frame))
            .and_then(|_| interpreter.tick_timers())
            .and_then(|_| interpreter.present());
        if let Err(e) = frame {
            log::error!(
                "stopped at {:04X} after {} frames: {}",
                interpreter.registers().pc,
                frames,
                e
            );
            return Err(e.into());
        }
        frames += 1;
        if args.frames != 0 && frames >= args.frames {
            break;
        }
        // sleep out the rest of the frame; if we're behind, don't try to catch up
        let now = Instant::now();
        if next_frame > now {
            spin_sleep::sleep(next_frame - now);
        } else {
            next_frame = now;
        }
    }

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    Ok(())
}
