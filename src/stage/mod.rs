//! Browser stage: mounts a canvas into the host page and drives a [`Game`]
//! from `requestAnimationFrame`.
//!
//! All browser state lives in one thread-local so event listeners and the
//! frame callback share it without globals scattered across the crate.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, KeyboardEvent, MouseEvent, window};

use crate::clock::FrameClock;
use crate::config::GameConfig;
use crate::game::Game;
use crate::input::{InputState, Key};

pub mod logger;
mod render;

struct Stage {
    ctx: CanvasRenderingContext2d,
    game: Game,
    input: InputState,
    clock: FrameClock,
}

thread_local! {
    static STAGE: RefCell<Option<Stage>> = const { RefCell::new(None) };
    static LOOP_RUNNING: RefCell<bool> = const { RefCell::new(false) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Build the game from `config`, mount it and start the frame loop. Calling
/// again replaces the running game and its canvas.
pub fn mount(config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let host = find_host(&doc, &config)?;

    let game = Game::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let cfg = game.config();

    // Replace whatever the page had in the stage with a fresh canvas.
    host.set_inner_html("");
    let canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    canvas.set_width(cfg.viewport_width);
    canvas.set_height(cfg.viewport_height);
    canvas.set_attribute("tabindex", "0").ok();
    host.append_child(&canvas)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into()?;

    let clock = FrameClock::new(cfg.max_frame_dt);
    let first_mount = STAGE.with(|s| s.borrow().is_none());
    STAGE.with(|s| s.replace(Some(Stage { ctx, game, input: InputState::new(), clock })));

    if first_mount {
        install_listeners(&win)?;
    }
    // Each mount makes a new canvas, so the click listener goes with it.
    listen_for_clicks(&canvas)?;
    start_loop();
    Ok(())
}

fn find_host(doc: &Document, config: &GameConfig) -> Result<Element, JsValue> {
    doc.get_element_by_id(&config.stage_id)
        .or_else(|| doc.get_element_by_id(&config.fallback_stage_id))
        .ok_or_else(|| {
            JsValue::from_str(&format!(
                "no element with id `{}` or `{}`",
                config.stage_id, config.fallback_stage_id
            ))
        })
}

fn install_listeners(win: &web_sys::Window) -> Result<(), JsValue> {
    let keydown = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
        let Some(key) = Key::from_event_key(&evt.key()) else {
            return;
        };
        // Keep arrows, space and backspace from scrolling or navigating the page.
        if matches!(key, Key::Move(_) | Key::Space | Key::Backspace | Key::Enter) {
            evt.prevent_default();
        }
        with_stage(|stage| {
            if let Some(dir) = key.direction() {
                stage.input.press(dir);
            }
            if !evt.repeat() {
                if let Some(event) = stage.game.handle_key(key) {
                    log::debug!("{event:?}");
                }
            }
        });
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();

    let keyup = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
        if let Some(dir) = Key::from_event_key(&evt.key()).and_then(Key::direction) {
            with_stage(|stage| stage.input.release(dir));
        }
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
    keyup.forget();

    // Keys released while the page is unfocused never send keyup.
    let blur = Closure::wrap(Box::new(move || {
        with_stage(|stage| {
            stage.input.clear();
            stage.clock.reset();
        });
    }) as Box<dyn FnMut()>);
    win.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
    blur.forget();
    Ok(())
}

fn listen_for_clicks(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let target = canvas.clone();
    let click = Closure::wrap(Box::new(move |evt: MouseEvent| {
        // offset_x/offset_y are CSS pixels; scale to the drawing buffer when
        // the page stretches the canvas.
        let sx = scale(target.width(), target.client_width());
        let sy = scale(target.height(), target.client_height());
        let (x, y) = (evt.offset_x() as f64 * sx, evt.offset_y() as f64 * sy);
        with_stage(|stage| {
            if let Some(event) = stage.game.handle_click(x, y) {
                log::debug!("{event:?}");
            }
        });
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
    click.forget();
    Ok(())
}

fn scale(buffer: u32, shown: i32) -> f64 {
    if shown > 0 { f64::from(buffer) / f64::from(shown) } else { 1.0 }
}

fn with_stage(f: impl FnOnce(&mut Stage)) {
    STAGE.with(|cell| {
        if let Some(stage) = cell.borrow_mut().as_mut() {
            f(stage);
        }
    });
}

fn start_loop() {
    if LOOP_RUNNING.with(|r| r.replace(true)) {
        return;
    }
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_stage(|stage| frame(stage, ts));
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(cb: &FrameCallback) {
    let Some(w) = window() else {
        return;
    };
    if let Some(closure) = cb.borrow().as_ref() {
        if let Err(e) = w.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
    }
}

fn frame(stage: &mut Stage, now_ms: f64) {
    let dt = stage.clock.tick(now_ms);
    for event in stage.game.update(dt, &stage.input) {
        log::debug!("{event:?}");
    }
    render::draw_frame(&stage.ctx, &stage.game);
}
