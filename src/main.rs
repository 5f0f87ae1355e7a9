//! Daily Walk entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, KeyboardEvent,
        PointerEvent,
    };

    use daily_walk::audio::AudioManager;
    use daily_walk::consts::*;
    use daily_walk::persistence::LocalStorageStore;
    use daily_walk::platform::{daily_seed, share_text, today_label};
    use daily_walk::reward::{RewardCard, UnlockCountdown};
    use daily_walk::sim::{GameEvent, MeterMode, PickupKind, RunController, RunPhase};
    use daily_walk::{Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        controller: RunController<LocalStorageStore>,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        audio: AudioManager,
        settings: Settings,
        seed: u64,
        /// Continue gate while the reward card is up
        countdown: Option<UnlockCountdown>,
        last_score: u32,
        /// A NewBest fired during the current run
        run_set_best: bool,
    }

    impl Game {
        fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d, seed: u64) -> Self {
            let settings = Settings::load();
            let mut tuning = Tuning::load();
            settings.apply_to(&mut tuning);

            let mut audio = AudioManager::new();
            audio.set_volume(settings.effective_volume());

            let (w, h) = css_size(&canvas);
            let controller = RunController::new(
                tuning,
                daily_walk::Viewport::new(w, h),
                seed,
                LocalStorageStore::new(),
            );

            Self {
                controller,
                canvas,
                ctx,
                audio,
                settings,
                seed,
                countdown: None,
                last_score: 0,
                run_set_best: false,
            }
        }

        /// Match the backing store to the CSS box and tell the simulation
        fn resize(&mut self) {
            let Some(window) = web_sys::window() else { return };
            let dpr = window.device_pixel_ratio();
            let (w, h) = css_size(&self.canvas);
            self.canvas.set_width((w as f64 * dpr) as u32);
            self.canvas.set_height((h as f64 * dpr) as u32);
            let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
            self.controller.resize(w, h);
        }

        fn update(&mut self, now_ms: f64) {
            let events = self.controller.frame(now_ms).to_vec();
            let dt = self.controller.last_dt();
            self.audio.play_events(&events);

            for event in &events {
                match event {
                    GameEvent::Started => self.run_set_best = false,
                    GameEvent::NewBest { .. } => self.run_set_best = true,
                    GameEvent::RunEnded {
                        final_score,
                        best_score,
                        reason,
                    } => {
                        log::info!(
                            "Run ended ({:?}): score {}, best {}",
                            reason,
                            final_score,
                            best_score
                        );
                        self.last_score = *final_score;
                        self.show_reward(*final_score, *best_score);
                    }
                    _ => {}
                }
            }

            if let Some(countdown) = &mut self.countdown {
                let unlocked = countdown.advance(dt);
                let label = if unlocked {
                    "Continue".to_string()
                } else {
                    countdown.label()
                };
                if let Some(document) = document() {
                    if let Some(btn) = document.get_element_by_id("reward-continue") {
                        btn.set_text_content(Some(&label));
                        let _ = btn.set_attribute(
                            "class",
                            if unlocked { "pill ready" } else { "pill" },
                        );
                    }
                }
            }
        }

        fn show_reward(&mut self, final_score: u32, best_score: u32) {
            let card = RewardCard::new(
                final_score,
                best_score,
                self.run_set_best,
                self.seed,
                today_label(),
            );
            let Some(document) = document() else { return };

            let fill = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            fill("reward-title", card.title);
            fill("reward-meta", card.meta);
            fill("reward-date", &card.date_label);
            fill("reward-ref", card.verse.reference);
            fill("reward-text", card.verse.text);
            fill(
                "reward-score",
                &format!("Score {}  \u{b7}  Best {}", card.final_score, card.best_score),
            );

            set_hidden(&document, "reward", false);
            self.countdown = Some(UnlockCountdown::new());
        }

        /// Continue button. Ignored until the countdown finishes.
        fn try_continue(&mut self) {
            let unlocked = self
                .countdown
                .as_ref()
                .is_some_and(UnlockCountdown::is_unlocked);
            if !unlocked {
                return;
            }
            self.countdown = None;
            if let Some(document) = document() {
                set_hidden(&document, "reward", true);
            }
            // Past midnight: the next run gets the new day's layout
            let today = daily_seed();
            if today != self.seed {
                log::info!("New day, reseeding ({} -> {})", self.seed, today);
                self.controller.reseed(today);
                self.seed = today;
            }
            self.run_set_best = false;
            let events = self.controller.continue_run().to_vec();
            self.audio.play_events(&events);
        }

        /// Flip mute and remember it
        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.audio.set_muted(self.settings.muted);
            self.audio.set_volume(self.settings.effective_volume());
            self.settings.save();
            log::info!("Muted: {}", self.settings.muted);
        }

        /// Render the current frame
        fn render(&self) {
            let ctx = &self.ctx;
            let state = self.controller.state();
            let w = state.viewport.width as f64;
            let h = state.viewport.height as f64;

            ctx.set_fill_style_str("#07080d");
            ctx.fill_rect(0.0, 0.0, w, h);

            // Halo: the light meter made visible
            let light = state.meter.fraction() as f64;
            let px = state.player.pos.x as f64;
            let py = state.player.pos.y as f64;
            let halo = state.player.radius as f64 * (2.0 + 6.0 * light);
            ctx.set_global_alpha(0.12 + 0.18 * light);
            ctx.set_fill_style_str(match state.meter.mode() {
                MeterMode::Charging => "#f7d774",
                MeterMode::Overcharged => "#9fd8ff",
            });
            circle(ctx, px, py, halo);
            ctx.set_global_alpha(1.0);

            // Gates
            for gate in &state.field.obstacles {
                ctx.set_fill_style_str("#1b1f2e");
                let x = gate.x as f64;
                let gw = gate.width as f64;
                ctx.fill_rect(x, 0.0, gw, gate.gap_top() as f64);
                ctx.fill_rect(x, gate.gap_bottom() as f64, gw, h - gate.gap_bottom() as f64);

                if let (Some(pickup), Some(pos)) = (&gate.pickup, gate.pickup_pos()) {
                    ctx.set_fill_style_str(match pickup.kind {
                        PickupKind::Restore => "#f7d774",
                        PickupKind::Overcharge => "#9fd8ff",
                    });
                    circle(ctx, pos.x as f64, pos.y as f64, pickup.radius as f64);
                }
            }

            // Player
            ctx.set_fill_style_str("#fff6d8");
            circle(ctx, px, py, state.player.radius as f64);

            self.draw_hud(w, h);
        }

        fn draw_hud(&self, w: f64, h: f64) {
            let ctx = &self.ctx;
            let state = self.controller.state();

            ctx.set_fill_style_str("#e9e6dc");
            ctx.set_text_align("center");
            ctx.set_font("600 42px system-ui, sans-serif");
            let _ = ctx.fill_text(&state.score.to_string(), w / 2.0, 64.0);
            ctx.set_font("14px system-ui, sans-serif");
            let _ = ctx.fill_text(&format!("Best {}", state.best), w / 2.0, 88.0);

            // Light bar
            let bar_w = (w * 0.4).min(240.0);
            let bar_x = (w - bar_w) / 2.0;
            let bar_y = h - 32.0;
            ctx.set_fill_style_str("#2a2f40");
            ctx.fill_rect(bar_x, bar_y, bar_w, 8.0);
            let fill = (state.meter.value() / LIGHT_MAX).min(LIGHT_OVERCHARGE_MAX) as f64;
            ctx.set_fill_style_str(if fill > 1.0 { "#9fd8ff" } else { "#f7d774" });
            ctx.fill_rect(bar_x, bar_y, bar_w * fill.min(1.0), 8.0);
            if self.settings.show_light_value {
                let _ = ctx.fill_text(
                    &format!("{:.0}%", state.meter.value() * 100.0),
                    w / 2.0,
                    bar_y - 8.0,
                );
            }

            if state.phase == RunPhase::Idle {
                ctx.set_font("20px system-ui, sans-serif");
                let _ = ctx.fill_text("Tap to start", w / 2.0, h * 0.62);
                ctx.set_font("14px system-ui, sans-serif");
                let _ = ctx.fill_text("Spacebar works too", w / 2.0, h * 0.62 + 26.0);
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn css_size(canvas: &HtmlCanvasElement) -> (f32, f32) {
        (canvas.client_width() as f32, canvas.client_height() as f32)
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) {
        ctx.begin_path();
        let _ = ctx.arc(x, y, r, 0.0, TAU);
        ctx.fill();
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    /// Create a child element with an id and optional class
    fn child(document: &Document, parent: &Element, tag: &str, id: &str, class: &str) -> Option<Element> {
        let el = document.create_element(tag).ok()?;
        el.set_id(id);
        if !class.is_empty() {
            el.set_class_name(class);
        }
        parent.append_child(&el).ok()?;
        Some(el)
    }

    /// Build the reward overlay if the page doesn't already have one
    fn ensure_reward_overlay(document: &Document) -> Option<()> {
        if document.get_element_by_id("reward").is_some() {
            return Some(());
        }
        let body = document.body()?;
        let overlay = document.create_element("div").ok()?;
        overlay.set_id("reward");
        overlay.set_class_name("hidden");
        body.append_child(&overlay).ok()?;

        let card = child(document, &overlay, "div", "reward-card", "card")?;
        child(document, &card, "h2", "reward-title", "")?;
        child(document, &card, "p", "reward-meta", "meta")?;
        child(document, &card, "p", "reward-date", "date")?;
        child(document, &card, "p", "reward-score", "score")?;
        child(document, &card, "blockquote", "reward-text", "verse")?;
        child(document, &card, "cite", "reward-ref", "")?;
        let actions = child(document, &card, "div", "reward-actions", "actions")?;
        child(document, &actions, "button", "reward-continue", "pill")?;
        let share = child(document, &actions, "button", "reward-share", "pill")?;
        share.set_text_content(Some("Share"));
        Some(())
    }

    /// Native share sheet when present, SMS composer otherwise. Failures are ignored.
    fn share(score: u32) {
        let text = share_text(score);
        let Some(window) = web_sys::window() else { return };
        let navigator = window.navigator();

        let share_fn = js_sys::Reflect::get(&navigator, &JsValue::from_str("share"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());

        if let Some(share_fn) = share_fn {
            let data = js_sys::Object::new();
            let _ = js_sys::Reflect::set(&data, &"title".into(), &"Daily Walk".into());
            let _ = js_sys::Reflect::set(&data, &"text".into(), &text.as_str().into());
            if let Ok(promise) = share_fn.call1(&navigator, &data) {
                if let Ok(promise) = promise.dyn_into::<js_sys::Promise>() {
                    // Swallow the rejection when the user cancels the sheet
                    let noop = Closure::<dyn FnMut(JsValue)>::new(|_| {});
                    let _ = promise.catch(&noop);
                    noop.forget();
                }
                return;
            }
        }

        let body = js_sys::encode_uri_component(&text);
        let _ = window
            .location()
            .set_href(&format!("sms:&body={}", String::from(body)));
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Daily Walk starting...");

        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Hide loading indicator
        set_hidden(&document, "loading", true);

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("Canvas 2D context unavailable");
            return;
        };

        if ensure_reward_overlay(&document).is_none() {
            log::warn!("Could not build reward overlay");
        }

        let seed = daily_seed();
        let game = Rc::new(RefCell::new(Game::new(canvas.clone(), ctx, seed)));
        game.borrow_mut().resize();

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_reward_buttons(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Daily Walk running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Pointer down/up (mouse, touch and pen)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.controller.trigger_down(now_ms());
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().controller.trigger_up(now_ms());
            });
            // On the window so a release outside the canvas still counts;
            // a cancelled pointer ends the hold too
            for name in ["pointerup", "pointercancel"] {
                let _ = window
                    .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() == "KeyM" {
                    game.borrow_mut().toggle_mute();
                    return;
                }
                if event.code() != "Space" {
                    return;
                }
                event.prevent_default();
                if event.repeat() {
                    return;
                }
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.controller.trigger_down(now_ms());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() == "Space" {
                    game.borrow_mut().controller.trigger_up(now_ms());
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_reward_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else { return };

        if let Some(btn) = document.get_element_by_id("reward-continue") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().try_continue();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("reward-share") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let score = game.borrow().last_score;
                share(score);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                let mut g = game.borrow_mut();
                // The frame gap while hidden must not become one huge step
                g.controller.pause_clock();
                let muted = g.settings.muted || (hidden && g.settings.mute_on_blur);
                g.audio.set_muted(muted);
                if hidden {
                    log::info!("Tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur/focus (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                // The key-up or pointer-up will not reach us once focus is gone
                g.controller.trigger_up(now_ms());
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let muted = g.settings.muted;
                g.audio.set_muted(muted);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Daily Walk (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let seed = daily_walk::platform::daily_seed();
    let (score, best) = headless_run(seed, 60 * 60);
    println!("Autopilot run (seed {}): score {}, best {}", seed, score, best);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Fly a run on autopilot for at most `frames` display refreshes
#[cfg(not(target_arch = "wasm32"))]
fn headless_run(seed: u64, frames: u32) -> (u32, u32) {
    use daily_walk::consts::FRAME_DT;
    use daily_walk::persistence::MemoryStore;
    use daily_walk::sim::{GameEvent, RunController, RunPhase};
    use daily_walk::{Tuning, Viewport};

    let mut ctl = RunController::new(
        Tuning::load(),
        Viewport::default(),
        seed,
        MemoryStore::new(),
    );

    let frame_ms = FRAME_DT as f64 * 1000.0;
    ctl.trigger_down(0.0);
    ctl.trigger_up(1.0);

    for i in 1..=frames {
        let now = i as f64 * frame_ms;
        let state = ctl.state();
        // Flap whenever we sink below the middle of the next open gap
        let target = state
            .field
            .obstacles
            .iter()
            .find(|o| !o.is_behind(&state.player))
            .map(|o| o.gap_y + o.gap_h * 0.15)
            .unwrap_or(state.viewport.height * 0.5);
        if state.player.pos.y > target && state.player.vy > 0.0 {
            ctl.trigger_down(now);
            ctl.trigger_up(now + 1.0);
        }

        let events = ctl.step(FRAME_DT, now).to_vec();
        for event in &events {
            match event {
                GameEvent::Passed { score, .. } => log::debug!("Passed gate, score {}", score),
                GameEvent::RunEnded { reason, .. } => log::info!("Run ended: {:?}", reason),
                _ => {}
            }
        }
        if ctl.phase() == RunPhase::Ended {
            break;
        }
    }

    (ctl.score(), ctl.best())
}
