//! Block Dodge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use block_dodge::consts::*;
    use block_dodge::input::{Controls, GamepadState, KeyboardState};
    use block_dodge::renderer::{FrameBuffer, RenderState, SpriteSheet, build_frame};
    use block_dodge::sim::{GameState, TickClock, autopilot, tick};
    use block_dodge::{Assets, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        sheet: SpriteSheet,
        framebuffer: FrameBuffer,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        keyboard: KeyboardState,
        /// Autopilot plays instead of the keyboard/gamepad
        idle_mode: bool,
        quit: bool,
    }

    impl Game {
        fn new(settings: &Settings, assets: &Assets, seed: u64) -> anyhow::Result<Self> {
            let state = GameState::new(
                settings,
                assets.player.alpha_mask(),
                assets.block.alpha_mask(),
                seed,
            )?;
            Ok(Self {
                framebuffer: FrameBuffer::new(state.screen_width, state.screen_height),
                state,
                sheet: SpriteSheet::new(assets),
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                keyboard: KeyboardState::default(),
                idle_mode: false,
                quit: false,
            })
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let controls = Controls::combine(&self.keyboard, &poll_gamepad());
            if controls.quit {
                self.quit = true;
                return;
            }

            self.accumulator += dt.min(MAX_FRAME_DT);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = if self.idle_mode {
                    autopilot(&self.state)
                } else {
                    controls.input
                };
                let clock = TickClock::next_fixed(&self.state);
                tick(&mut self.state, &input, clock);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let frame = build_frame(&self.state);
            self.framebuffer.compose(&frame, &self.sheet);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.framebuffer) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }

            update_hud(&frame.score_lines);
        }

        /// Release graphics and show the end screen
        fn shutdown(&mut self) {
            self.render_state = None;
            let score = self.state.score;
            log::info!(
                "Session ended after {} ticks: dodged {} of {}, hit {}",
                self.state.time_ticks,
                score.dodged(),
                score.all_blocks,
                score.hit_blocks
            );

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("game-over") {
                let _ = el.set_attribute("class", "");
            }
            if let Some(el) = document.get_element_by_id("canvas") {
                let _ = el.set_attribute("class", "hidden");
            }
        }
    }

    /// Write the scoreboard lines into the HUD
    fn update_hud(lines: &[String; 2]) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        for (id, text) in ["score-line", "hits-line"].iter().zip(lines) {
            if let Some(el) = document.get_element_by_id(id) {
                if el.text_content().as_deref() != Some(text.as_str()) {
                    el.set_text_content(Some(text));
                }
            }
        }
    }

    /// Read the first connected gamepad (standard mapping)
    fn poll_gamepad() -> GamepadState {
        let Some(window) = web_sys::window() else {
            return GamepadState::default();
        };
        let Ok(pads) = window.navigator().get_gamepads() else {
            return GamepadState::default();
        };

        for pad in pads.iter() {
            let Ok(pad) = pad.dyn_into::<web_sys::Gamepad>() else {
                continue;
            };
            if !pad.connected() {
                continue;
            }
            let buttons = pad.buttons();
            return GamepadState::from_buttons(|i| {
                buttons
                    .get(i as u32)
                    .dyn_into::<web_sys::GamepadButton>()
                    .map(|b| b.pressed())
                    .unwrap_or(false)
            });
        }

        GamepadState::default()
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Block Dodge starting...");

        let settings = match Settings::load() {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Invalid settings: {:#}", e);
                return;
            }
        };
        let assets = match Assets::load_embedded() {
            Ok(assets) => assets,
            Err(e) => {
                log::error!("Failed to load assets: {:#}", e);
                return;
            }
        };

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let game = match Game::new(&settings, &assets, seed) {
            Ok(game) => Rc::new(RefCell::new(game)),
            Err(e) => {
                log::error!("Failed to start session: {:#}", e);
                return;
            }
        };
        log::info!("Game initialized with seed: {}", seed);

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Canvas matches the playfield; CSS scales it
        let width = settings.screen_width;
        let height = settings.screen_height;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone());

        // Show HUD
        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Block Dodge running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if g.keyboard.key_down(&key) {
                    event.prevent_default();
                } else if key == "i" || key == "I" {
                    g.idle_mode = !g.idle_mode;
                    log::info!("Idle mode: {}", g.idle_mode);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().keyboard.key_up(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur - keyups never arrive, release everything
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().keyboard.clear();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            if g.quit {
                g.shutdown();
                return;
            }
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    //! Native runner: plays a session with the autopilot and logs the scoreboard

    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::Context;

    use block_dodge::consts::TICK_MS;
    use block_dodge::renderer::score_lines;
    use block_dodge::sim::{GameEvent, GameState, TickClock, autopilot, tick};
    use block_dodge::{Assets, Settings};

    /// Simulated seconds when no duration is given
    const DEFAULT_SECONDS: u64 = 60;
    /// Log the scoreboard this often (simulated seconds)
    const REPORT_EVERY_SECONDS: u64 = 10;

    pub fn run() -> anyhow::Result<()> {
        let seconds = match std::env::args().nth(1) {
            Some(arg) => arg
                .parse::<u64>()
                .with_context(|| format!("duration must be whole seconds, got {:?}", arg))?,
            None => DEFAULT_SECONDS,
        };

        let settings = Settings::load()?;
        let assets = Assets::load_embedded()?;
        let seed = settings.seed.unwrap_or_else(clock_seed);
        let mut state = GameState::new(
            &settings,
            assets.player.alpha_mask(),
            assets.block.alpha_mask(),
            seed,
        )?;
        log::info!("Headless session: {} s, seed {}", seconds, seed);

        let total_ticks = (seconds as f64 * 1000.0 / TICK_MS).round() as u64;
        let report_ticks = (REPORT_EVERY_SECONDS as f64 * 1000.0 / TICK_MS).round() as u64;
        let mut onsets = 0u32;

        for _ in 0..total_ticks {
            let input = autopilot(&state);
            let clock = TickClock::next_fixed(&state);
            tick(&mut state, &input, clock);

            onsets += state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::HitOnset { .. }))
                .count() as u32;

            if state.time_ticks % report_ticks == 0 {
                let [dodged, hits] = score_lines(&state.score);
                log::info!(
                    "[{:>4.0}s] {} | {} | live blocks {} | fall {:.2} px/tick",
                    state.time_ms / 1000.0,
                    dodged,
                    hits,
                    state.blocks.len(),
                    state.difficulty.fall_speed.current
                );
            }
        }

        let [dodged, hits] = score_lines(&state.score);
        log::info!("Final: {} | {} | hit onsets {}", dodged, hits, onsets);
        println!("{}\n{}", dodged, hits);
        Ok(())
    }

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Block Dodge (native, headless) starting...");

    match headless::run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
