use crate::app::SharedApp;
use crate::audio::{self, SharedAudio};
use crate::constants::CHAT_INPUT_ID;
use crate::dom;
use crate::keys::{command_for_key, KeyCommand};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn handle_global_keydown(ev: &web::KeyboardEvent, app: &SharedApp, audio: &SharedAudio) {
    audio::unlock(audio);
    let Some(document) = dom::window_document() else {
        return;
    };
    let key = ev.key();
    let Some(command) = command_for_key(&key, dom::is_typing(&document)) else {
        return;
    };
    log::info!("[keys] {} -> {:?}", key, command);

    match command {
        KeyCommand::FocusChat => {
            if let Some(input) = dom::element::<web::HtmlInputElement>(&document, CHAT_INPUT_ID) {
                _ = input.focus();
                ev.prevent_default();
            }
        }
        KeyCommand::ClearChat => {
            if let Some(input) = dom::element::<web::HtmlInputElement>(&document, CHAT_INPUT_ID) {
                input.set_value("");
            }
        }
        KeyCommand::ToggleMicrophone => audio::toggle_microphone(audio),
        KeyCommand::ToggleMode(mode) => {
            let mut a = app.borrow_mut();
            let now = a.now_ms();
            let a = &mut *a;
            a.director.toggle_mode(mode, now, &mut a.events);
        }
        KeyCommand::SetMode(mode) => {
            let mut a = app.borrow_mut();
            let now = a.now_ms();
            let a = &mut *a;
            a.director.set_mode(mode, now, &mut a.events);
        }
        KeyCommand::Express(expression) => app.borrow_mut().director.set_expression(expression),
    }
}

pub fn wire_global_keydown(app: SharedApp, audio: SharedAudio) {
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &app, &audio);
    }) as Box<dyn FnMut(_)>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
