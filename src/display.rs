use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// Display is used by the interpreter to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// flip the pixel at (x, y), wrapping both coordinates; returns whether
    /// the pixel is now lit
    fn toggle_pixel(&mut self, x: usize, y: usize) -> bool;

    /// whether the pixel at (x, y) is lit, wrapping both coordinates
    fn is_lit(&self, x: usize, y: usize) -> bool;

    /// turn every pixel off
    fn clear(&mut self);

    /// push the current pixels out to wherever they're shown
    fn render(&mut self) -> Result<(), io::Error>;
}

/// One bit per pixel, rows packed most-significant bit first. This is the
/// layout the COSMAC VIP kept its display page in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    bytes: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            bytes: vec![0; (width * height + 7) / 8],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn locate(&self, x: usize, y: usize) -> (usize, u8) {
        let px = (x % self.width) + (y % self.height) * self.width;
        (px / 8, 0x80 >> (px % 8))
    }

    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        let (i, mask) = self.locate(x, y);
        self.bytes[i] ^= mask;
        self.bytes[i] & mask != 0
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        let (i, mask) = self.locate(x, y);
        self.bytes[i] & mask != 0
    }

    pub fn clear(&mut self) {
        self.bytes.iter_mut().for_each(|b| *b = 0);
    }

    /// every pixel in the given state as canvas coords; y grows downwards on
    /// the CHIP-8 but upwards on the canvas
    fn bitplane(&self, lit: bool) -> impl std::iter::Iterator<Item = (f64, f64)> + '_ {
        let w = self.width;
        (0..self.width * self.height)
            .filter(move |&p| self.get(p % w, p / w) == lit)
            .map(move |p| ((p % w) as f64, -1.0 * (p / w) as f64))
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.width - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.height - 1) as f64, 0.0]
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer::new(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT)
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    frame: FrameBuffer,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            frame: FrameBuffer::new(x, y),
        })
    }
}

impl Display for MonoTermDisplay {
    fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        self.frame.toggle(x, y)
    }

    fn is_lit(&self, x: usize, y: usize) -> bool {
        self.frame.get(x, y)
    }

    fn clear(&mut self) {
        self.frame.clear()
    }

    fn render(&mut self) -> Result<(), io::Error> {
        let frame = &self.frame;
        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + frame.width() as u16, 2 + frame.height() as u16);
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(frame.x_bounds())
                .y_bounds(frame.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &frame.bitplane(false).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &frame.bitplane(true).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; keeps pixels but never shows them
#[derive(Default)]
pub struct DummyDisplay {
    frame: FrameBuffer,
    pub renders: usize,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}

impl Display for DummyDisplay {
    fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        self.frame.toggle(x, y)
    }

    fn is_lit(&self, x: usize, y: usize) -> bool {
        self.frame.get(x, y)
    }

    fn clear(&mut self) {
        self.frame.clear()
    }

    fn render(&mut self) -> Result<(), io::Error> {
        self.renders += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_count() {
        let f = FrameBuffer::default();
        assert_eq!(f.as_bytes().len(), 256)
    }

    #[test]
    fn test_x_bounds() {
        let f = FrameBuffer::default();
        assert_eq!(f.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let f = FrameBuffer::default();
        assert_eq!(f.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_toggle_reports_lit() {
        let mut f = FrameBuffer::default();
        assert!(f.toggle(3, 1));
        assert!(f.get(3, 1));
        assert!(!f.toggle(3, 1));
        assert!(!f.get(3, 1));
    }

    #[test]
    fn test_packing_is_msb_first() {
        let mut f = FrameBuffer::default();
        f.toggle(0, 0);
        f.toggle(9, 1);
        assert_eq!(f.as_bytes()[0], 0x80);
        // row 1 starts at byte 8; x=9 is the second bit of its second byte
        assert_eq!(f.as_bytes()[9], 0x40);
    }

    #[test]
    fn test_toggle_wraps() {
        let mut f = FrameBuffer::default();
        f.toggle(64, 32);
        assert!(f.get(0, 0));
        f.toggle(65 + 64, 33);
        assert!(f.get(1, 1));
    }

    #[test]
    fn test_clear() {
        let mut d = DummyDisplay::new();
        d.toggle_pixel(10, 10);
        d.clear();
        assert!(!d.is_lit(10, 10));
        assert_eq!(d.frame().as_bytes(), &[0; 256][..]);
    }

    #[test]
    fn test_bitplanes_partition_the_screen() {
        let mut f = FrameBuffer::default();
        f.toggle(2, 3);
        let lit: Vec<_> = f.bitplane(true).collect();
        assert_eq!(lit, vec![(2.0, -3.0)]);
        assert_eq!(f.bitplane(false).count(), 2047);
    }
}
