pub mod config;
pub mod entity;
pub mod game;
pub mod game_loop;
pub mod renderer;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli_renderer;

#[cfg(target_arch = "wasm32")]
pub mod web_renderer;
#[cfg(target_arch = "wasm32")]
mod web_main;

pub use config::{GameConfig, Grid};
pub use entity::{Direction, Position};
pub use game::{GameOverReason, GameState, Phase, Snapshot, TickEvent, TickResult};
pub use game_loop::GameLoop;
pub use renderer::{Input, Renderer, Rgb, Text, TextAnchor, TextSize};

#[cfg(not(target_arch = "wasm32"))]
pub use cli_renderer::CliRenderer;
#[cfg(target_arch = "wasm32")]
pub use web_renderer::WebRenderer;
