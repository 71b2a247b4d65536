use crate::app::SharedApp;
use crate::audio::{self, SharedAudio};
use crate::constants::MODE_LABEL_ID;
use crate::dom;
use glam::Vec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub app: SharedApp,
    pub audio: SharedAudio,
}

pub fn wire_input_handlers(w: InputWiring) {
    wire_mousemove(&w);
    wire_touch(&w);
    wire_click(&w);
    wire_mode_button(&w);
}

/// Client coordinates to canvas backing-store pixels.
fn to_canvas_px(canvas: &web::HtmlCanvasElement, client_x: f64, client_y: f64) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let dpr = dom::device_pixel_ratio() as f64;
    Vec2::new(
        ((client_x - rect.left()) * dpr) as f32,
        ((client_y - rect.top()) * dpr) as f32,
    )
}

fn wire_mousemove(w: &InputWiring) {
    let w = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
        let pos = to_canvas_px(&w.canvas, ev.client_x() as f64, ev.client_y() as f64);
        w.app.borrow_mut().pointer = Some(pos);
    }) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_touch(w: &InputWiring) {
    let w = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::TouchEvent| {
        if let Some(t) = ev.touches().get(0) {
            let pos = to_canvas_px(&w.canvas, t.client_x() as f64, t.client_y() as f64);
            w.app.borrow_mut().pointer = Some(pos);
        }
        if ev.type_() == "touchstart" {
            audio::unlock(&w.audio);
        }
    }) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        for kind in ["touchstart", "touchmove"] {
            _ = wnd.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
    }
    closure.forget();
}

/// A click anywhere on the pet unlocks audio and makes it rant.
fn wire_click(w: &InputWiring) {
    let w = w.clone();
    let canvas_for_listener = w.canvas.clone();
    let closure = Closure::wrap(Box::new(move |_ev: web::MouseEvent| {
        audio::unlock(&w.audio);
        let mut app = w.app.borrow_mut();
        if !app.booted {
            return;
        }
        let now = app.now_ms();
        let app = &mut *app;
        app.director.rant(None, now, &mut app.events);
        log::info!("[click] rant");
    }) as Box<dyn FnMut(_)>);
    _ = canvas_for_listener.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// The HUD mode label doubles as a button cycling Phonk, Disco and Normal.
fn wire_mode_button(w: &InputWiring) {
    let Some(document) = dom::window_document() else {
        return;
    };
    let w = w.clone();
    dom::add_click_listener(&document, MODE_LABEL_ID, move || {
        audio::unlock(&w.audio);
        let mut app = w.app.borrow_mut();
        let now = app.now_ms();
        let app = &mut *app;
        app.director.cycle_mode(now, &mut app.events);
        log::info!("[click] mode -> {}", app.director.mode());
    });
}
