use crate::entity::Position;
use std::time::Duration;

/// Square playfield measured in pixels and split into `cell_size` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width_px: i32,
    pub cell_size: i32,
}

impl Grid {
    pub fn new(width_px: i32, cell_size: i32) -> Self {
        assert!(cell_size > 0, "cell size must be positive");
        assert!(
            width_px >= cell_size,
            "playfield must hold at least one cell"
        );
        Self { width_px, cell_size }
    }

    /// Number of cells along each axis.
    pub fn cells(&self) -> i32 {
        self.width_px / self.cell_size
    }

    pub fn contains(&self, pos: Position) -> bool {
        let cells = self.cells();
        pos.x >= 0 && pos.y >= 0 && pos.x < cells && pos.y < cells
    }

    /// Top-left pixel of a cell.
    pub fn to_pixels(&self, pos: Position) -> (i32, i32) {
        (pos.x * self.cell_size, pos.y * self.cell_size)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(800, 50)
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub grid: Grid,
    pub ticks_per_second: u32,
    pub title: &'static str,
    pub music_path: &'static str,
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second.max(1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: Grid::default(),
            ticks_per_second: 9,
            title: "Snake Game",
            music_path: "snake_game_music.mp3",
        }
    }
}
