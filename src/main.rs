//! Rock Dodge entry point
//!
//! In the browser this wires the Canvas 2D surface, LocalStorage and keyboard
//! input into the game and pumps its timers from `requestAnimationFrame`.
//! Natively it runs a headless session against virtual time.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use rock_dodge::{GameOverPolicy, Settings};
    use rock_dodge::highscores::LocalStorageScoreStore;
    use rock_dodge::platform::EventQueue;
    use rock_dodge::render::{Colour, Rect, Shadow, Surface, TextAlign};
    use rock_dodge::sim::Game;

    /// Canvas 2D implementation of the drawing primitives
    struct CanvasSurface {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    impl CanvasSurface {
        fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
            let ctx = canvas
                .get_context("2d")?
                .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
                .dyn_into::<CanvasRenderingContext2d>()?;
            Ok(Self { canvas, ctx })
        }

        fn no_shadow(&self) {
            self.ctx.set_shadow_blur(0.0);
        }
    }

    impl Surface for CanvasSurface {
        fn width(&self) -> f32 {
            self.canvas.width() as f32
        }

        fn height(&self) -> f32 {
            self.canvas.height() as f32
        }

        fn clear(&mut self, colour: Colour) {
            self.no_shadow();
            self.ctx.set_fill_style_str(&colour.to_css());
            self.ctx
                .fill_rect(0.0, 0.0, self.width() as f64, self.height() as f64);
        }

        fn fill_rect(&mut self, rect: Rect, colour: Colour) {
            self.ctx.set_fill_style_str(&colour.to_css());
            self.ctx
                .fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
        }

        fn fill_rect_with_shadow(&mut self, rect: Rect, colour: Colour, shadow: Shadow) {
            self.ctx.set_shadow_blur(shadow.blur as f64);
            self.ctx.set_shadow_color(&shadow.colour.to_css());
            self.fill_rect(rect, colour);
            self.no_shadow();
        }

        fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, colour: Colour, align: TextAlign) {
            self.no_shadow();
            self.ctx.set_font(&format!("{}px Arial", size));
            self.ctx.set_text_align(match align {
                TextAlign::Start => "start",
                TextAlign::End => "right",
            });
            self.ctx.set_text_baseline("middle");
            self.ctx.set_fill_style_str(&colour.to_css());
            let _ = self.ctx.fill_text(text, x as f64, y as f64);
        }

        fn line(&mut self, from: Vec2, to: Vec2, colour: Colour, width: f32) {
            self.no_shadow();
            self.ctx.set_stroke_style_str(&colour.to_css());
            self.ctx.set_line_width(width as f64);
            self.ctx.begin_path();
            self.ctx.move_to(from.x as f64, from.y as f64);
            self.ctx.line_to(to.x as f64, to.y as f64);
            self.ctx.stroke();
        }
    }

    type WebGame = Game<EventQueue, CanvasSurface>;

    /// Game plus the settings it was built from (saved on change)
    struct App {
        game: WebGame,
        settings: Settings,
    }

    thread_local! {
        static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Result<R, JsValue> {
        let app = APP
            .with(|slot| slot.borrow().clone())
            .ok_or_else(|| JsValue::from_str("game not initialised"))?;
        let mut app = app.borrow_mut();
        Ok(f(&mut app))
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    #[wasm_bindgen]
    pub fn start() -> Result<(), JsValue> {
        with_app(|app| app.game.start(now_ms()))
    }

    #[wasm_bindgen]
    pub fn stop() -> Result<(), JsValue> {
        with_app(|app| app.game.stop())
    }

    #[wasm_bindgen]
    pub fn set_max_obstacles(n: u32) -> Result<(), JsValue> {
        with_app(|app| {
            app.game.set_max_obstacles(n as usize)?;
            app.settings.max_obstacles = n as usize;
            app.settings.save();
            Ok::<_, rock_dodge::GameError>(())
        })?
        .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn set_spawn_interval(seconds: f64) -> Result<(), JsValue> {
        with_app(|app| {
            app.game.set_spawn_interval(seconds)?;
            app.settings.spawn_interval_secs = seconds;
            app.settings.save();
            Ok::<_, rock_dodge::GameError>(())
        })?
        .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// `"restart"` or `"halt"`
    #[wasm_bindgen]
    pub fn set_game_over_policy(name: &str) -> Result<(), JsValue> {
        let policy = GameOverPolicy::from_str(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown game over policy: {}", name)))?;
        with_app(|app| {
            app.game.set_policy(policy);
            app.settings.on_game_over = policy;
            app.settings.save();
            log::info!("Game over policy set to {}", policy.as_str());
        })
    }

    /// Size the canvas to the window
    fn fit_to_window(window: &web_sys::Window, canvas: &HtmlCanvasElement) {
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Rock Dodge starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        fit_to_window(&window, &canvas);

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);
        let now = now_ms();
        let surface = CanvasSurface::new(canvas.clone())?;
        let game = Game::new(
            &settings,
            seed,
            now,
            EventQueue::new(now),
            surface,
            Box::new(LocalStorageScoreStore),
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App { game, settings }));
        app.borrow_mut().game.start(now);
        APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

        setup_key_handlers(&document, app.clone());
        setup_focus_loss(&window, app.clone());
        setup_resize(&window, canvas);
        request_animation_frame(app);

        log::info!("Rock Dodge running!");
        Ok(())
    }

    fn setup_key_handlers(document: &web_sys::Document, app: Rc<RefCell<App>>) {
        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().game.input_mut().handle_key(&event.key(), pressed);
            });
            let _ = document
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Keys released while the page is unfocused never send keyup
    fn setup_focus_loss(window: &web_sys::Window, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().game.input_mut().clear();
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(window: &web_sys::Window, canvas: HtmlCanvasElement) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some(window) = web_sys::window() {
                fit_to_window(&window, &canvas);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().game.pump(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rock Dodge (native) starting...");
    log::info!("Native mode runs headless - build for wasm32 to play in the browser");

    if let Err(e) = run_headless() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// One simulated minute with nobody at the keys
#[cfg(not(target_arch = "wasm32"))]
fn run_headless() -> Result<(), rock_dodge::GameError> {
    use rock_dodge::consts::TICK_INTERVAL_MS;
    use rock_dodge::platform::EventQueue;
    use rock_dodge::render::RecordingSurface;
    use rock_dodge::sim::Game;
    use rock_dodge::{MemoryScoreStore, Settings, format_time};

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or(0x5eed);
    let mut game = Game::new(
        &settings,
        seed,
        0.0,
        EventQueue::new(0.0),
        RecordingSurface::new(1280.0, 720.0),
        Box::new(MemoryScoreStore::new()),
    )?;

    game.start(0.0);
    let frames = (60_000.0 / TICK_INTERVAL_MS) as u32;
    for frame in 1..=frames {
        game.pump(frame as f64 * TICK_INTERVAL_MS);
    }
    game.stop();

    println!("Seed: {}", seed);
    println!("Sessions played: {}", game.sessions());
    println!("Frames drawn: {}", game.surface().frames);
    println!(
        "Best time: {}",
        game.best_time().map(format_time).unwrap_or_else(|| "N/A".to_string())
    );
    Ok(())
}
