use crate::config::{GameConfig, Grid};
use crate::entity::{Direction, Position};
use crate::renderer::{Input, Renderer, Rgb, Text, TextAnchor, TextSize};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlAudioElement, HtmlCanvasElement, HtmlElement, KeyboardEvent};

const FONT_NORMAL: &str = "32px sans-serif";
const FONT_LARGE: &str = "64px sans-serif";
const TEXT_ROW_HEIGHT: f64 = 32.0;
const TEXT_MARGIN: f64 = 10.0;

fn js_error(err: JsValue) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{:?}", err))
}

pub struct WebRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    window: web_sys::Window,
    device_pixel_ratio: f64,

    grid: Grid,
    width_px: f64,
    title: &'static str,

    music: Option<HtmlAudioElement>,

    // Filled by the keydown listener, drained by poll_input
    pending_input: Rc<RefCell<Vec<Input>>>,
}

impl WebRenderer {
    pub fn new(canvas_id: &str, config: &GameConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        // Disable image smoothing for crisp pixels
        context.set_image_smoothing_enabled(false);

        let device_pixel_ratio = window.device_pixel_ratio();

        Ok(Self {
            canvas,
            context,
            window,
            device_pixel_ratio,
            grid: config.grid,
            width_px: config.grid.width_px as f64,
            title: config.title,
            music: None,
            pending_input: Rc::new(RefCell::new(Vec::new())),
        })
    }

    fn setup_keyboard_listener(&self) -> io::Result<()> {
        let pending_input = self.pending_input.clone();

        let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            let input = match event.key().as_str() {
                "ArrowUp" => Some(Input::Direction(Direction::Up)),
                "ArrowDown" => Some(Input::Direction(Direction::Down)),
                "ArrowLeft" => Some(Input::Direction(Direction::Left)),
                "ArrowRight" => Some(Input::Direction(Direction::Right)),
                "q" | "Q" => Some(Input::Quit),
                "r" | "R" => Some(Input::Restart),
                _ => None,
            };

            if let Some(input) = input {
                pending_input.borrow_mut().push(input);
                event.prevent_default();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        self.window
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
            .map_err(js_error)?;

        closure.forget(); // Keep listener alive
        Ok(())
    }

    fn resize_canvas(&self) -> io::Result<()> {
        // Display size (CSS pixels)
        let display = self.width_px as u32;

        // Internal resolution (actual pixels, scaled for high DPI)
        let pixels = (self.width_px * self.device_pixel_ratio) as u32;

        self.canvas.set_width(pixels);
        self.canvas.set_height(pixels);

        let element: &HtmlElement = self.canvas.unchecked_ref();
        let style = element.style();
        style
            .set_property("width", &format!("{}px", display))
            .map_err(js_error)?;
        style
            .set_property("height", &format!("{}px", display))
            .map_err(js_error)?;

        // Setting width/height resets the context
        self.context.set_image_smoothing_enabled(false);
        self.context
            .scale(self.device_pixel_ratio, self.device_pixel_ratio)
            .map_err(js_error)
    }
}

impl Renderer for WebRenderer {
    fn init(&mut self) -> io::Result<()> {
        self.setup_keyboard_listener()?;
        self.resize_canvas()?;

        if let Some(document) = self.window.document() {
            document.set_title(self.title);
        }
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        if let Some(music) = self.music.take() {
            music.pause().map_err(js_error)?;
        }
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<Vec<Input>> {
        Ok(self.pending_input.borrow_mut().drain(..).collect())
    }

    fn clear(&mut self, color: Rgb) -> io::Result<()> {
        self.context.set_fill_style_str(&color.to_css());
        self.context.fill_rect(0.0, 0.0, self.width_px, self.width_px);
        Ok(())
    }

    fn fill_cell(&mut self, cell: Position, color: Rgb) -> io::Result<()> {
        self.context.set_fill_style_str(&color.to_css());
        let (x, y) = self.grid.to_pixels(cell);
        let size = self.grid.cell_size as f64;
        self.context.fill_rect(x as f64, y as f64, size, size);
        Ok(())
    }

    fn draw_text(&mut self, text: &Text) -> io::Result<()> {
        self.context.set_fill_style_str(&text.color.to_css());
        self.context.set_font(match text.size {
            TextSize::Normal => FONT_NORMAL,
            TextSize::Large => FONT_LARGE,
        });

        let (x, y) = match text.anchor {
            TextAnchor::TopLeft => {
                self.context.set_text_align("left");
                self.context.set_text_baseline("top");
                (TEXT_MARGIN, TEXT_MARGIN)
            }
            TextAnchor::Centered(rows) => {
                self.context.set_text_align("center");
                self.context.set_text_baseline("middle");
                let center = self.width_px / 2.0;
                (center, center + rows as f64 * TEXT_ROW_HEIGHT)
            }
        };

        self.context
            .fill_text(&text.content, x, y)
            .map_err(js_error)
    }

    fn present(&mut self) -> io::Result<()> {
        // The canvas shows draw calls as they happen
        Ok(())
    }

    fn play_music_looped(&mut self, path: &str) -> io::Result<()> {
        let music = HtmlAudioElement::new_with_src(path).map_err(js_error)?;
        music.set_loop(true);

        // A missing or undecodable file only surfaces asynchronously.
        let track = path.to_string();
        let on_error = Closure::wrap(Box::new(move || {
            web_sys::console::error_1(&format!("[WASM] Failed to load background track {}", track).into());
        }) as Box<dyn FnMut()>);
        music.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();

        // Autoplay may be refused until the first user gesture.
        let on_rejected = Closure::wrap(Box::new(move |err: JsValue| {
            web_sys::console::warn_2(&"[WASM] Background track did not start:".into(), &err);
        }) as Box<dyn FnMut(JsValue)>);
        let _ = music.play().map_err(js_error)?.catch(&on_rejected);
        on_rejected.forget();

        self.music = Some(music);
        Ok(())
    }
}
