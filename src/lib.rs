#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod app;
mod audio;
mod canvas;
mod chat;
mod constants;
mod dom;
mod events;
mod frame;
mod keys;
mod mic;
mod overlay;

use constants::{BOOT_OVERLAY_ID, CANVAS_ID};

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("mochi-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas_el = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    // Backing store tracks CSS size * devicePixelRatio; the face is laid out in those pixels.
    wire_canvas_resize(&canvas);
    let surface = canvas::CanvasSurface::new(&canvas)?;

    let app = app::App::shared();
    // Browsers only allow audio after a gesture, so the engine slot starts empty.
    let audio: audio::SharedAudio = Rc::new(RefCell::new(None));

    let audio_boot = audio.clone();
    dom::add_click_listener(&document, BOOT_OVERLAY_ID, move || {
        audio::unlock(&audio_boot);
    });
    events::wire_global_keydown(app.clone(), audio.clone());
    events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        app: app.clone(),
        audio: audio.clone(),
    });
    chat::wire_chat_form(&document, app.clone());
    overlay::set_mode(&document, mochi_core::Mode::Normal);

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext::new(
        app, audio, canvas, document, surface,
    )));
    let handle = frame::start_loop(frame_ctx.clone());

    // Tear the loop down with the page so no frame runs against a dead DOM.
    let unload = Closure::wrap(Box::new(move || {
        handle.stop();
        frame_ctx.borrow_mut().shutdown();
    }) as Box<dyn FnMut()>);
    _ = window.add_event_listener_with_callback("pagehide", unload.as_ref().unchecked_ref());
    unload.forget();

    Ok(())
}
