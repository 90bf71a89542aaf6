//! Wild West entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        AddEventListenerOptions, HtmlCanvasElement, KeyboardEvent, MouseEvent, Touch, TouchEvent,
        TouchList,
    };

    use wild_west::persistence::{self, LocalStorageStore};
    use wild_west::platform::time::now_ms;
    use wild_west::platform::{FrameClock, InputState, Notifications};
    use wild_west::quests::QuestNotice;
    use wild_west::settings::Settings;
    use wild_west::sim::{GameEvent, GamePhase, GameState, Topic, tick};

    /// Max thumb travel of the touch joystick in CSS pixels
    const JOYSTICK_RADIUS: f32 = 50.0;

    /// Finger currently driving the joystick
    #[derive(Clone, Copy)]
    struct JoystickTouch {
        id: i32,
        center: Vec2,
    }

    impl JoystickTouch {
        fn drag(&self, touch: &Touch, input: &mut InputState) {
            let dx = touch.client_x() as f32 - self.center.x;
            let dy = touch.client_y() as f32 - self.center.y;
            input.drag_stick(dx, dy, JOYSTICK_RADIUS);
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: InputState,
        settings: Settings,
        clock: FrameClock,
        store: LocalStorageStore,
        autosave_timer: f32,
        notifications: Rc<RefCell<Notifications>>,
        /// Damage numbers toggle shared with the bus listener
        show_damage: Rc<Cell<bool>>,
        joystick: Option<JoystickTouch>,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let mut game = Self {
                state: GameState::new(seed),
                input: InputState::new(),
                clock: FrameClock::default(),
                store: LocalStorageStore,
                autosave_timer: 0.0,
                notifications: Rc::new(RefCell::new(Notifications::default())),
                show_damage: Rc::new(Cell::new(settings.effective_damage_numbers())),
                joystick: None,
                settings,
            };
            game.subscribe_ui();
            game
        }

        /// Presentation listeners on the simulation bus
        fn subscribe_ui(&mut self) {
            let notes = Rc::clone(&self.notifications);
            self.state.bus.subscribe(
                Topic::ShopPurchased,
                Box::new(move |event: &GameEvent| {
                    if let GameEvent::ShopPurchased { item_id } = event {
                        notes.borrow_mut().push(format!("Bought {}", item_id));
                    }
                }),
            );

            let notes = Rc::clone(&self.notifications);
            self.state.bus.subscribe(
                Topic::ItemCollected,
                Box::new(move |event: &GameEvent| {
                    if let GameEvent::ItemCollected { item, .. } = event {
                        notes.borrow_mut().push(format!("Picked up {}", item.as_str()));
                    }
                }),
            );

            let show = Rc::clone(&self.show_damage);
            self.state.bus.subscribe(
                Topic::DamageDealt,
                Box::new(move |event: &GameEvent| {
                    if !show.get() {
                        return;
                    }
                    if let GameEvent::DamageDealt { bandit_id, amount, .. } = event {
                        log::debug!("-{} {}", amount, bandit_id);
                    }
                }),
            );
        }

        /// Flip a preference from the pause menu and persist it
        fn toggle_setting(&mut self, apply: impl FnOnce(&mut Settings)) {
            apply(&mut self.settings);
            self.show_damage.set(self.settings.effective_damage_numbers());
            self.settings.save();
        }

        /// Advance one animation frame
        fn update(&mut self, time: f64) {
            let dt = self.clock.tick(time);
            let input = self.input.take();
            tick(&mut self.state, &input, dt);

            if self.state.phase == GamePhase::Playing {
                if let Some(period) = self.settings.autosave_period() {
                    self.autosave_timer += dt;
                    if self.autosave_timer >= period {
                        self.autosave_timer = 0.0;
                        self.save_game();
                    }
                }
            }

            if self.state.take_save_request() {
                self.save_game();
                self.notifications.borrow_mut().push("Game saved!".to_string());
            }

            self.notifications.borrow_mut().update(dt);

            for notice in self.state.drain_quest_notices() {
                match notice {
                    QuestNotice::Accepted { name, .. } => {
                        self.notifications.borrow_mut().push(format!("Quest accepted: {}", name));
                    }
                    QuestNotice::Completed { name, reward, .. } => {
                        self.notifications
                            .borrow_mut()
                            .push(format!("Quest complete: {} (+{} lilky)", name, reward));
                    }
                    QuestNotice::Progress {
                        objective,
                        current,
                        amount,
                        ..
                    } => log::info!("{} ({}/{})", objective, current, amount),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.state.hud();

            if let Some(el) = document.get_element_by_id("health-text") {
                el.set_text_content(Some(&format!("{} / {}", hud.hp, hud.max_hp)));
            }

            if let Some(el) = document.get_element_by_id("weapon-name") {
                let text = if hud.capacity == 0 {
                    hud.weapon.to_string()
                } else if hud.reloading {
                    format!("{} (reloading)", hud.weapon)
                } else {
                    format!("{} {}/{}", hud.weapon, hud.ammo, hud.capacity)
                };
                el.set_text_content(Some(&text));
            }

            if let Some(el) = document.get_element_by_id("stamina-text") {
                el.set_text_content(Some(&format!(
                    "{} / {}",
                    hud.stamina.round(),
                    hud.max_stamina.round()
                )));
            }

            if let Some(el) = document.get_element_by_id("lilky-amount") {
                el.set_text_content(Some(&hud.balance.to_string()));
            }

            // Show/hide pause menu
            if let Some(el) = document.get_element_by_id("pause-menu") {
                let class = if self.state.phase == GamePhase::Paused { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                let class = if self.state.phase == GamePhase::GameOver { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            if let Some(el) = document.get_element_by_id("notification") {
                let notes = self.notifications.borrow();
                el.set_text_content(notes.current());
                let class = if notes.current().is_some() { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }

        fn save_game(&mut self) {
            let data = self.state.snapshot(now_ms());
            if let Err(e) = persistence::save(&mut self.store, &data) {
                log::error!("Failed to save game: {}", e);
            }
        }

        /// Respawn, then apply the last save if there is one
        fn continue_game(&mut self) {
            self.state.respawn();
            if let Some(data) = persistence::load(&self.store) {
                self.state.restore(&data);
            }
            self.clock.reset();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Wild West starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("game-canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("Canvas #game-canvas not found");
            return;
        };

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));

        if let Some(data) = persistence::load(&game.borrow().store) {
            game.borrow_mut().state.restore(&data);
        }

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Wild West running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let Game {
                    input, settings, ..
                } = &mut *g;
                input.key_down(&event.code(), &settings.bindings);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let Game {
                    input, settings, ..
                } = &mut *g;
                input.key_up(&event.code(), &settings.bindings);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - normalized device coordinates, y up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
                let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
                let x = (event.client_x() as f64 / w) * 2.0 - 1.0;
                let y = -(event.client_y() as f64 / h) * 2.0 + 1.0;
                game.borrow_mut().input.pointer_moved(x as f32, y as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - attack
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut().input.mouse_down(event.button());
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // No context menu on right click
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
            });
            let _ = canvas
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch joystick (left pad)
        if let Some(pad) = document.get_element_by_id("joystick-base") {
            let game = game.clone();
            let pad_ref = pad.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.changed_touches().get(0) else {
                    return;
                };
                let rect = pad_ref.get_bounding_client_rect();
                let stick = JoystickTouch {
                    id: touch.identifier(),
                    center: Vec2::new(
                        (rect.left() + rect.width() / 2.0) as f32,
                        (rect.top() + rect.height() / 2.0) as f32,
                    ),
                };
                let mut g = game.borrow_mut();
                stick.drag(&touch, &mut g.input);
                g.joystick = Some(stick);
            });
            let _ = pad.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                let Some(stick) = g.joystick else {
                    return;
                };
                if let Some(touch) = find_touch(&event.changed_touches(), stick.id) {
                    event.prevent_default();
                    stick.drag(&touch, &mut g.input);
                }
            });
            // Non-passive so the page does not scroll under the stick
            let options = AddEventListenerOptions::new();
            options.set_passive(false);
            let _ = window.add_event_listener_with_callback_and_add_event_listener_options(
                "touchmove",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                let Some(stick) = g.joystick else {
                    return;
                };
                if find_touch(&event.changed_touches(), stick.id).is_some() {
                    g.joystick = None;
                    g.input.release_stick();
                }
            });
            for name in ["touchend", "touchcancel"] {
                let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }

        // Touch fire button
        if let Some(btn) = document.get_element_by_id("attack-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().input.trigger_attack();
            });
            let _ = btn.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Save on close
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().save_game();
            });
            let _ = window
                .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn find_touch(list: &TouchList, id: i32) -> Option<Touch> {
        (0..list.length())
            .filter_map(|i| list.get(i))
            .find(|touch| touch.identifier() == id)
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
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
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        // Resume toggles pause back off
        {
            let game = game.clone();
            on_click("resume-btn", move || game.borrow_mut().input.request_pause());
        }

        // Game over: continue from the last save
        {
            let game = game.clone();
            on_click("continue-btn", move || {
                game.borrow_mut().continue_game();
                log::info!("Continued from last save");
            });
        }

        // Game over: respawn in place of the last save
        {
            let game = game.clone();
            on_click("restart-btn", move || {
                let mut g = game.borrow_mut();
                g.state.respawn();
                g.clock.reset();
            });
        }

        // Pause menu preferences
        {
            let game = game.clone();
            on_click("damage-numbers-btn", move || {
                game.borrow_mut()
                    .toggle_setting(|s| s.damage_numbers = !s.damage_numbers);
            });
        }
        {
            let game = game.clone();
            on_click("autosave-btn", move || {
                game.borrow_mut().toggle_setting(|s| s.autosave = !s.autosave);
            });
        }

        on_click("main-menu-btn", move || {
            game.borrow_mut().save_game();
            if let Some(window) = web_sys::window() {
                let _ = window.location().reload();
            }
        });
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    pause_if_playing(&game, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                pause_if_playing(&game, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn pause_if_playing(game: &Rc<RefCell<Game>>, reason: &str) {
        let mut g = game.borrow_mut();
        // Key-up events are lost while unfocused
        g.input.release_all();
        if g.settings.pause_on_blur && g.state.phase == GamePhase::Playing {
            g.state.phase = GamePhase::Paused;
            g.clock.reset();
            log::info!("Auto-paused ({})", reason);
        }
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
    log::info!("Wild West (native) starting...");
    log::info!("Native mode runs a headless skirmish - run with `trunk serve` for the web version");

    // Optional balance override: wild-west path/to/tuning.json
    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| wild_west::Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => wild_west::Tuning::default(),
    };

    skirmish(tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Walk up to the nearest bandit camp and brawl until someone drops
#[cfg(not(target_arch = "wasm32"))]
fn skirmish(tuning: wild_west::Tuning) {
    use glam::Vec3;
    use wild_west::persistence::{self, MemoryStore};
    use wild_west::platform::time::now_ms;
    use wild_west::sim::{Aim, GamePhase, GameState, PlayerBody, TickInput, tick};

    const DT: f32 = 1.0 / 60.0;

    let mut state = GameState::with_tuning(2024, tuning);
    state.accept_quest("protect-town");

    let camp = state.bandits[0].home();
    state
        .avatar
        .teleport(Vec3::new(camp.x - 6.0, 2.0, camp.y));

    for frame in 0..60 * 60 {
        let target = state
            .bandits
            .iter()
            .filter(|b| !b.is_dead())
            .min_by(|a, b| {
                let da = a.pos.distance(state.player_pos());
                let db = b.pos.distance(state.player_pos());
                da.total_cmp(&db)
            })
            .map(|b| b.pos);

        let input = match target {
            Some(target) => {
                let to_target = target - state.player_pos();
                TickInput {
                    attack: to_target.length() < 1.4,
                    aim: Aim::Point(target),
                    move_dir: if to_target.length() > 1.0 {
                        to_target.normalize_or_zero()
                    } else {
                        glam::Vec2::ZERO
                    },
                    ..Default::default()
                }
            }
            None => TickInput::default(),
        };
        tick(&mut state, &input, DT);

        if state.phase == GamePhase::GameOver {
            log::info!("Player fell after {} frames", frame);
            break;
        }
        if state.bandits.iter().filter(|b| b.is_dead()).count() >= 2 {
            log::info!("Two bandits down after {} frames", frame);
            break;
        }
    }

    let hud = state.hud();
    println!(
        "hp {}/{}  lilky {}  kills {}",
        hud.hp,
        hud.max_hp,
        hud.balance,
        state.bandits.iter().filter(|b| b.is_dead()).count()
    );

    let mut store = MemoryStore::new();
    let saved = state.snapshot(now_ms());
    match persistence::save(&mut store, &saved) {
        Ok(()) => {
            let restored = persistence::load(&store).is_some_and(|data| data == saved);
            println!("save round trip: {}", if restored { "ok" } else { "mismatch" });
        }
        Err(e) => println!("save failed: {}", e),
    }
}
