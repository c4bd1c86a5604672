/// Which register the 8XY6 / 8XYE shifts read from.
///
/// The instruction table documents VX being shifted in place. The COSMAC VIP
/// interpreter instead loaded VY, shifted it and stored the result in VX, and
/// a handful of old programs depend on that.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftQuirk {
    InPlace,
    FromVy,
}

/// standard CHIP-8 RAM
pub const DEFAULT_MEMORY_SIZE: usize = 4096;

/// return addresses the original hardware could hold
pub const DEFAULT_STACK_DEPTH: usize = 16;

/// Knobs for the machine being emulated. `Default` is plain CHIP-8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub memory_size: usize,
    pub stack_depth: usize,
    pub shift_quirk: ShiftQuirk,
    /// fixed seed for CXNN; entropy when unset
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            memory_size: DEFAULT_MEMORY_SIZE,
            stack_depth: DEFAULT_STACK_DEPTH,
            shift_quirk: ShiftQuirk::InPlace,
            seed: None,
        }
    }
}
