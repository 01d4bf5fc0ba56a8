#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::io::Result<()> {
    use log::{info, LevelFilter};
    use simplelog::{Config, WriteLogger};
    use snake::{CliRenderer, GameConfig, GameLoop};
    use std::fs::File;
    use std::io;

    // The terminal is busy drawing the board, so logs go to a file
    WriteLogger::init(LevelFilter::Info, Config::default(), File::create("snake.log")?)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let config = GameConfig::default();
    let renderer = CliRenderer::new(&config);
    let seed: u64 = rand::random();
    info!("starting {} with seed {}", config.title, seed);

    let mut game_loop = GameLoop::new(config, seed, renderer);
    game_loop.run()
}

// The browser build starts through `start_game` in the library.
#[cfg(target_arch = "wasm32")]
fn main() {}
