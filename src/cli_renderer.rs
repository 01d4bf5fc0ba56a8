use crate::config::GameConfig;
use crate::entity::{Direction, Position};
use crate::renderer::{Input, Renderer, Rgb, Text, TextAnchor, TextSize};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::info;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::time::Duration;

/// Terminal backend. Each grid cell is two characters wide.
pub struct CliRenderer {
    cells: i32,
    title: &'static str,
    frame: Vec<Rgb>,
    texts: Vec<Text>,
    active: bool,
    // The stream must outlive the sink or playback stops.
    music: Option<(OutputStream, Sink)>,
}

impl CliRenderer {
    pub fn new(config: &GameConfig) -> Self {
        let cells = config.grid.cells();
        Self {
            cells,
            title: config.title,
            frame: vec![Rgb::BLACK; (cells * cells) as usize],
            texts: Vec::new(),
            active: false,
            music: None,
        }
    }

    /// Columns and rows the board needs on screen.
    fn required_size(&self) -> (u16, u16) {
        ((self.cells * 2) as u16, self.cells as u16)
    }

    fn fits(&self, (width, height): (u16, u16)) -> bool {
        let (need_w, need_h) = self.required_size();
        width >= need_w && height >= need_h
    }

    fn text_origin(&self, text: &Text) -> (u16, u16) {
        let board_width = self.cells * 2;
        match text.anchor {
            TextAnchor::TopLeft => (1, 0),
            TextAnchor::Centered(rows) => {
                let x = (board_width - text.content.chars().count() as i32).max(0) / 2;
                let y = (self.cells / 2 + rows).clamp(0, self.cells - 1);
                (x as u16, y as u16)
            }
        }
    }

    fn draw_text_line(&self, text: &Text, stdout: &mut io::Stdout) -> io::Result<()> {
        let (x, y) = self.text_origin(text);
        let Rgb(r, g, b) = text.color;

        queue!(
            stdout,
            cursor::MoveTo(x, y),
            SetBackgroundColor(Color::Black),
            SetForegroundColor(Color::Rgb { r, g, b })
        )?;
        if text.size == TextSize::Large {
            queue!(stdout, SetAttribute(Attribute::Bold))?;
        }
        queue!(
            stdout,
            Print(&text.content),
            SetAttribute(Attribute::Reset),
            ResetColor
        )?;
        Ok(())
    }
}

impl Renderer for CliRenderer {
    fn init(&mut self) -> io::Result<()> {
        let size = terminal::size()?;
        if !self.fits(size) {
            let (need_w, need_h) = self.required_size();
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "terminal is {}x{}, the board needs at least {}x{}",
                    size.0, size.1, need_w, need_h
                ),
            ));
        }

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::SetTitle(self.title),
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;
        self.active = true;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        if let Some((_stream, sink)) = self.music.take() {
            sink.stop();
        }
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            ResetColor
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<Vec<Input>> {
        let mut inputs = Vec::new();

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(input) = map_key(key) {
                        inputs.push(input);
                    }
                }
            }
        }

        Ok(inputs)
    }

    fn clear(&mut self, color: Rgb) -> io::Result<()> {
        self.frame.fill(color);
        self.texts.clear();
        Ok(())
    }

    fn fill_cell(&mut self, cell: Position, color: Rgb) -> io::Result<()> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.cells || cell.y >= self.cells {
            return Ok(());
        }
        self.frame[(cell.y * self.cells + cell.x) as usize] = color;
        Ok(())
    }

    fn draw_text(&mut self, text: &Text) -> io::Result<()> {
        self.texts.push(text.clone());
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();

        for (y, row) in self.frame.chunks(self.cells as usize).enumerate() {
            queue!(stdout, cursor::MoveTo(0, y as u16))?;
            for &Rgb(r, g, b) in row {
                queue!(stdout, SetBackgroundColor(Color::Rgb { r, g, b }), Print("  "))?;
            }
            queue!(stdout, ResetColor)?;
        }

        for text in &self.texts {
            self.draw_text_line(text, &mut stdout)?;
        }

        stdout.flush()?;
        Ok(())
    }

    fn play_music_looped(&mut self, path: &str) -> io::Result<()> {
        let file = File::open(path)
            .map_err(|e| io::Error::new(e.kind(), format!("background track {}: {}", path, e)))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{}: {}", path, e)))?;

        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("audio output: {}", e)))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("audio sink: {}", e)))?;
        sink.append(source.repeat_infinite());

        info!("looping background track {}", path);
        self.music = Some((stream, sink));
        Ok(())
    }
}

impl Drop for CliRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn map_key(key: KeyEvent) -> Option<Input> {
    // Ctrl+C is the terminal's close signal while in raw mode.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Input::Quit);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w') => Some(Input::Direction(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') => Some(Input::Direction(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') => Some(Input::Direction(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') => Some(Input::Direction(Direction::Right)),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Input::Restart),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}
