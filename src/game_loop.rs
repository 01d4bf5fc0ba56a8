use crate::config::GameConfig;
use crate::game::{GameState, Phase, Snapshot};
use crate::renderer::{Input, Renderer, Rgb, Text, TextAnchor};
use log::info;
use std::io;

const SNAKE_COLOR: Rgb = Rgb::GREEN;
const TARGET_COLOR: Rgb = Rgb::RED;
const BACKGROUND_COLOR: Rgb = Rgb::BLACK;

/// Drives a [`GameState`] against a rendering backend, one frame per tick.
pub struct GameLoop<R: Renderer> {
    config: GameConfig,
    game: GameState,
    renderer: R,
    running: bool,
}

impl<R: Renderer> GameLoop<R> {
    pub fn new(config: GameConfig, seed: u64, renderer: R) -> Self {
        let game = GameState::with_grid(config.grid, seed);
        Self {
            config,
            game,
            renderer,
            running: true,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Bring up the display, start the music and show the first frame.
    pub fn start(&mut self) -> io::Result<()> {
        self.renderer.init()?;
        self.renderer.play_music_looped(self.config.music_path)?;
        info!(
            "started: {}x{} cells at {} ticks/s",
            self.config.grid.cells(),
            self.config.grid.cells(),
            self.config.ticks_per_second
        );
        let snapshot = self.game.snapshot();
        self.draw(&snapshot)
    }

    /// Run one loop iteration. Returns `false` once a quit was requested.
    pub fn frame(&mut self) -> io::Result<bool> {
        let inputs = self.renderer.poll_input()?;

        match self.game.phase() {
            Phase::Playing => {
                self.handle_playing_input(&inputs);
                let result = self.game.tick();
                self.draw(&result.snapshot)?;
            }
            Phase::GameOver => {
                self.handle_game_over_input(&inputs);
                let snapshot = self.game.snapshot();
                self.draw(&snapshot)?;
            }
        }

        Ok(self.running)
    }

    /// Blocking native loop: frames at the configured tick rate until quit.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run(&mut self) -> io::Result<()> {
        self.start()?;

        let mut limiter = TickLimiter::new(self.config.tick_interval());
        let outcome = loop {
            match self.frame() {
                Ok(true) => limiter.wait(),
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        let cleanup = self.shutdown();
        outcome.and(cleanup)
    }

    /// Release the display and audio.
    pub fn shutdown(&mut self) -> io::Result<()> {
        info!("shutting down, last score {}", self.game.score());
        self.renderer.cleanup()
    }

    fn handle_playing_input(&mut self, inputs: &[Input]) {
        let mut turn = None;
        for input in inputs {
            match input {
                Input::Direction(direction) => turn = Some(*direction),
                Input::Quit => self.quit(),
                Input::Restart => {}
            }
        }
        if let Some(direction) = turn {
            self.game.set_direction(direction);
        }
    }

    fn handle_game_over_input(&mut self, inputs: &[Input]) {
        for input in inputs {
            match input {
                Input::Restart => {
                    self.game.reset();
                    return;
                }
                Input::Quit => {
                    self.quit();
                    return;
                }
                Input::Direction(_) => {}
            }
        }
    }

    fn quit(&mut self) {
        if self.running {
            info!("quit requested");
        }
        self.running = false;
    }

    fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        self.renderer.clear(BACKGROUND_COLOR)?;
        match snapshot.phase {
            Phase::Playing => {
                for &cell in &snapshot.snake {
                    self.renderer.fill_cell(cell, SNAKE_COLOR)?;
                }
                self.renderer.fill_cell(snapshot.target, TARGET_COLOR)?;
                self.renderer.draw_text(&Text::new(
                    format!("Score: {}", snapshot.score),
                    TextAnchor::TopLeft,
                ))?;
            }
            Phase::GameOver => {
                self.renderer
                    .draw_text(&Text::new("Game Over", TextAnchor::Centered(-2)).large())?;
                self.renderer.draw_text(&Text::new(
                    format!("Final Score: {}", snapshot.score),
                    TextAnchor::Centered(0),
                ))?;
                self.renderer.draw_text(&Text::new(
                    "Press R to Restart or Q to Quit",
                    TextAnchor::Centered(2),
                ))?;
            }
        }
        self.renderer.present()
    }
}

/// Sleeps until the next fixed tick boundary.
#[cfg(not(target_arch = "wasm32"))]
pub struct TickLimiter {
    interval: std::time::Duration,
    next: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl TickLimiter {
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            interval,
            next: std::time::Instant::now() + interval,
        }
    }

    pub fn wait(&mut self) {
        let now = std::time::Instant::now();
        if now < self.next {
            std::thread::sleep(self.next - now);
            self.next += self.interval;
        } else {
            // Fell behind: re-anchor instead of bursting to catch up.
            self.next = now + self.interval;
        }
    }
}
