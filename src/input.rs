use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::cell::Cell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// keys on the hex keypad
pub const CHIP8_KEY_COUNT: usize = 16;

/// left-hand side of qwerty keyboard, laid out like the COSMAC keypad
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// reads keypresses
pub trait Input {
    /// pick up whatever the device has seen since last time; returns the
    /// keys that went down, oldest first
    fn poll(&mut self) -> Result<Vec<u8>, io::Error>;

    /// whether key 0x0-0xF is currently held; anything else never is
    fn is_pressed(&self, key: u8) -> bool;
}

/// Keyboard input in a raw-mode terminal.
///
/// Terminals only report key-down (and auto-repeat), never key-up, so a key
/// counts as held for `hold` after the last event seen for it.
pub struct TermInput {
    keymap: HashMap<char, u8>,
    last_seen: [Option<Instant>; CHIP8_KEY_COUNT],
    hold: Duration,
    quit: Rc<Cell<bool>>,
}

impl TermInput {
    pub fn new(hold: Duration) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            last_seen: [None; CHIP8_KEY_COUNT],
            hold,
            quit: Rc::new(Cell::new(false)),
        })
    }

    /// set once Esc or ctrl-c has been read
    pub fn quit_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.quit)
    }

    fn read_terminal(&mut self) -> Result<Vec<u8>, io::Error> {
        let mut pressed = Vec::new();
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Esc => self.quit.set(true),
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit.set(true)
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped_key) => {
                            self.last_seen[mapped_key as usize] = Some(Instant::now());
                            pressed.push(mapped_key);
                        }
                        None => log::debug!("can't map {:?} to a COSMAC key", key),
                    },
                    other => log::debug!("ignoring key event {:?}", other),
                }
            }
        }
        Ok(pressed)
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("failed to leave raw mode: {}", e);
        }
    }
}

impl Input for TermInput {
    fn poll(&mut self) -> Result<Vec<u8>, io::Error> {
        self.read_terminal()
    }

    fn is_pressed(&self, key: u8) -> bool {
        match self.last_seen.get(key as usize) {
            Some(Some(at)) => at.elapsed() < self.hold,
            _ => false,
        }
    }
}

/// dummy Input implementation for testing
#[derive(Default)]
pub struct DummyInput {
    held: [bool; CHIP8_KEY_COUNT],
    queued: Vec<u8>,
}

impl DummyInput {
    /// `keys` are held down for the lifetime of the device
    pub fn new(keys: &[u8]) -> Self {
        let mut input = DummyInput::default();
        for &k in keys {
            if let Some(h) = input.held.get_mut(k as usize) {
                *h = true;
            }
        }
        input
    }

    /// queue a key-down for the next `poll`
    pub fn push_press(&mut self, key: u8) {
        self.queued.push(key);
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<Vec<u8>, io::Error> {
        Ok(std::mem::take(&mut self.queued))
    }

    fn is_pressed(&self, key: u8) -> bool {
        self.held.get(key as usize).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_covers_keypad() {
        let map = HashMap::from(CHIP8_CONVENTIONAL_KEYMAP);
        let mut keys: Vec<u8> = map.values().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_dummy_held_keys() {
        let input = DummyInput::new(&[0x1, 0xf, 0x20]);
        assert!(input.is_pressed(0x1));
        assert!(input.is_pressed(0xf));
        assert!(!input.is_pressed(0x2));
        assert!(!input.is_pressed(0x20));
    }

    #[test]
    fn test_dummy_poll_drains() -> Result<(), io::Error> {
        let mut input = DummyInput::new(&[]);
        input.push_press(0x7);
        input.push_press(0x3);
        assert_eq!(input.poll()?, vec![0x7, 0x3]);
        assert!(input.poll()?.is_empty());
        Ok(())
    }
}
