use crate::entity::{Direction, Position};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Direction(Direction),
    Restart,
    /// Quit key or the window/terminal being closed.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn to_css(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    TopLeft,
    /// Horizontally centred, `n` text rows away from the vertical centre.
    Centered(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Normal,
    Large,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub content: String,
    pub anchor: TextAnchor,
    pub size: TextSize,
    pub color: Rgb,
}

impl Text {
    pub fn new(content: impl Into<String>, anchor: TextAnchor) -> Self {
        Self {
            content: content.into(),
            anchor,
            size: TextSize::Normal,
            color: Rgb::WHITE,
        }
    }

    pub fn large(mut self) -> Self {
        self.size = TextSize::Large;
        self
    }
}

/// Trait that abstracts the display, audio and input subsystem.
/// This allows for different backends (CLI, Web, etc.)
pub trait Renderer {
    /// Initialize the display
    fn init(&mut self) -> io::Result<()>;

    /// Restore terminal/display state
    fn cleanup(&mut self) -> io::Result<()>;

    /// Drain every input event received since the last poll, without blocking
    fn poll_input(&mut self) -> io::Result<Vec<Input>>;

    /// Wipe the frame with a background color
    fn clear(&mut self, color: Rgb) -> io::Result<()>;

    /// Fill one grid cell
    fn fill_cell(&mut self, cell: Position, color: Rgb) -> io::Result<()>;

    fn draw_text(&mut self, text: &Text) -> io::Result<()>;

    /// Show everything drawn since the last `clear`
    fn present(&mut self) -> io::Result<()>;

    /// Start a background track looping forever. A missing or unreadable track is an error.
    fn play_music_looped(&mut self, path: &str) -> io::Result<()>;
}
