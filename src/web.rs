//! Browser shell: DOM mounting, input listeners and the animation-frame loop.
//!
//! The game lives in a thread-local slot; the frame callback, the key listener and the
//! start/stop button borrow it one at a time. A frame is only re-requested while
//! `tick()` reports `Step::Continue`, so a stopped game lets its pending frame run
//! once as a no-op and the loop dies.

use std::cell::RefCell;

use log::{info, warn};
use rand::rngs::{OsRng, SmallRng};
use rand::SeedableRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, window};

use crate::config::GameConfig;
use crate::controller::{GameController, Outcome, Step};
use crate::render::CanvasRenderer;

const CANVAS_ID: &str = "lr-canvas";
const SCORE_ID: &str = "lr-score";
const BUTTON_ID: &str = "lr-toggle";
const STATUS_ID: &str = "lr-status";

struct WebGame {
    controller: GameController<CanvasRenderer, SmallRng>,
    score_el: Element,
    button: Element,
    status_el: Element,
    frame_pending: bool,
}

impl WebGame {
    fn sync_score(&self) {
        self.score_el
            .set_text_content(Some(&format!("Score: {}", self.controller.score())));
    }

    fn sync_button(&self) {
        let label = if self.controller.is_running() { "Stop" } else { "Start" };
        self.button.set_text_content(Some(label));
    }

    fn report(&self, outcome: Outcome) {
        self.sync_score();
        self.sync_button();
        self.status_el.set_text_content(Some(outcome.message()));
        if outcome != Outcome::Stopped {
            self.controller.renderer().draw_banner(outcome.message());
        }
        info!("{} (score {})", outcome.message(), self.controller.score());
    }
}

thread_local! {
    static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
    static FRAME: RefCell<Option<Closure<dyn FnMut(f64)>>> = const { RefCell::new(None) };
}

/// Mount the game with the default configuration.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    mount(GameConfig::default())
}

/// Mount the game with a JSON configuration; omitted fields keep their defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config =
        GameConfig::from_json(json).map_err(|e| JsValue::from_str(&format!("bad config: {e}")))?;
    mount(config)
}

/// Same as pressing the start/stop button.
#[wasm_bindgen]
pub fn toggle_game() {
    toggle();
}

#[wasm_bindgen]
pub fn current_score() -> u32 {
    GAME.with(|cell| cell.borrow().as_ref().map_or(0, |g| g.controller.score()))
}

fn mount(config: GameConfig) -> Result<(), JsValue> {
    if GAME.with(|cell| cell.borrow().is_some()) {
        warn!("game already mounted");
        return Ok(());
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    let config = config.sanitized();

    let canvas: HtmlCanvasElement = match doc.get_element_by_id(CANVAS_ID) {
        Some(el) => el.dyn_into()?,
        None => {
            let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
            c.set_id(CANVAS_ID);
            body.append_child(&c)?;
            c
        }
    };
    let (canvas_w, canvas_h) = config.canvas_size();
    canvas.set_width(canvas_w);
    canvas.set_height(canvas_h);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let score_el = element_or_create(&doc, &body, "div", SCORE_ID, "Score: 0")?;
    let button = element_or_create(&doc, &body, "button", BUTTON_ID, "Start")?;
    let status_el = element_or_create(&doc, &body, "div", STATUS_ID, "")?;

    let rng = SmallRng::from_rng(OsRng).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let renderer = CanvasRenderer::new(ctx, config.width, config.height, config.tile_size);
    let controller = GameController::new(config, renderer, rng);
    controller.renderer().draw();

    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            toggle();
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            on_key(&evt.key());
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    FRAME.with(|f| {
        *f.borrow_mut() = Some(Closure::wrap(
            Box::new(|_ts: f64| on_frame()) as Box<dyn FnMut(f64)>
        ));
    });
    GAME.with(|cell| {
        cell.replace(Some(WebGame {
            controller,
            score_el,
            button,
            status_el,
            frame_pending: false,
        }))
    });
    info!("letter rain mounted");
    Ok(())
}

fn element_or_create(
    doc: &Document,
    body: &web_sys::HtmlElement,
    tag: &str,
    id: &str,
    text: &str,
) -> Result<Element, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
        return Ok(el);
    }
    let el = doc.create_element(tag)?;
    el.set_id(id);
    el.set_text_content(Some(text));
    body.append_child(&el)?;
    Ok(el)
}

fn toggle() {
    let needs_frame = GAME.with(|cell| {
        let mut slot = cell.borrow_mut();
        let Some(game) = slot.as_mut() else {
            return false;
        };
        if let Some(outcome) = game.controller.toggle() {
            game.report(outcome);
            return false;
        }
        game.status_el.set_text_content(Some(""));
        game.sync_score();
        game.sync_button();
        // A frame left over from the previous run picks the new run up.
        let needs = !game.frame_pending;
        game.frame_pending = true;
        needs
    });
    if needs_frame {
        request_frame();
    }
}

fn on_key(key: &str) {
    GAME.with(|cell| {
        if let Some(game) = cell.borrow_mut().as_mut() {
            if game.controller.is_running() {
                game.controller.handle_key(key);
                game.sync_score();
            }
        }
    });
}

fn on_frame() {
    let reschedule = GAME.with(|cell| {
        let mut slot = cell.borrow_mut();
        let Some(game) = slot.as_mut() else {
            return false;
        };
        game.frame_pending = false;
        let step = game.controller.tick();
        game.controller.renderer().draw();
        match step {
            Step::Continue => {
                game.sync_score();
                game.frame_pending = true;
                true
            }
            Step::Finished(outcome) => {
                game.report(outcome);
                false
            }
            Step::Idle => false,
        }
    });
    if reschedule {
        request_frame();
    }
}

/// Ask the browser for the next frame. On failure the pending flag is cleared so the
/// start/stop button can kick the loop off again.
fn request_frame() {
    let result = FRAME.with(|f| {
        let cb = f.borrow();
        let cb = cb.as_ref().ok_or_else(|| JsValue::from_str("frame callback not installed"))?;
        window()
            .ok_or_else(|| JsValue::from_str("no window"))?
            .request_animation_frame(cb.as_ref().unchecked_ref())
    });
    GAME.with(|cell| {
        if let Some(game) = cell.borrow_mut().as_mut() {
            settle_frame_request(result, &mut game.frame_pending);
        }
    });
}

fn settle_frame_request<T, E: std::fmt::Debug>(result: Result<T, E>, pending: &mut bool) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            warn!("requestAnimationFrame failed: {e:?}");
            *pending = false;
            false
        }
    }
}
