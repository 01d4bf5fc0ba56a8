use crate::config::GameConfig;
use crate::game_loop::GameLoop;
use crate::web_renderer::WebRenderer;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

struct WebLoop {
    game_loop: GameLoop<WebRenderer>,
    tick_interval_ms: f64,
    last_tick: f64,
}

impl WebLoop {
    fn new() -> Result<Self, JsValue> {
        let config = GameConfig::default();
        let tick_interval_ms = config.tick_interval().as_secs_f64() * 1000.0;
        let renderer = WebRenderer::new("gameCanvas", &config)?;

        let mut game_loop = GameLoop::new(config, rand::random(), renderer);
        game_loop
            .start()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let window = web_sys::window().ok_or("no window")?;
        let performance = window.performance().ok_or("no performance")?;

        Ok(Self {
            game_loop,
            tick_interval_ms,
            last_tick: performance.now(),
        })
    }

    /// Returns `false` once the game has quit.
    fn update_frame(&mut self, current_time: f64) -> Result<bool, JsValue> {
        if current_time - self.last_tick < self.tick_interval_ms {
            return Ok(true);
        }
        self.last_tick = current_time;

        let running = self
            .game_loop
            .frame()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        if !running {
            self.game_loop
                .shutdown()
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
        }
        Ok(running)
    }
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    web_sys::console::log_1(&"[WASM] Starting snake...".into());

    let web_loop = match WebLoop::new() {
        Ok(wl) => Rc::new(RefCell::new(wl)),
        Err(e) => {
            web_sys::console::error_1(&format!("[WASM] Failed to start: {:?}", e).into());
            return Err(e);
        }
    };

    let window = web_sys::window().ok_or("no window")?;
    let performance = window.performance().ok_or("no performance")?;

    // Closure that reschedules itself every animation frame
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let current_time = performance.now();

        match web_loop.borrow_mut().update_frame(current_time) {
            Ok(true) => {}
            Ok(false) => {
                web_sys::console::log_1(&"[WASM] Game quit".into());
                return;
            }
            Err(e) => {
                web_sys::console::error_1(&e);
                return; // Stop loop on error
            }
        }

        if let Some(window) = web_sys::window() {
            if let Some(callback) = f.borrow().as_ref() {
                let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }

    web_sys::console::log_1(&"[WASM] Game loop started".into());

    Ok(())
}
