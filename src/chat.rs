use crate::app::SharedApp;
use crate::constants::{CHAT_FORM_ID, CHAT_INPUT_ID};
use crate::{dom, overlay};
use mochi_core::{
    build_request, check_status, parse_completion, ChatConfig, ChatError, ChatHistory,
    ChatMessage, Mode, CHAT_ERROR_LINE,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

fn transport(e: JsValue) -> ChatError {
    ChatError::Transport(format!("{:?}", e))
}

/// POST the prompt to the completion endpoint and return the reply text.
pub async fn ask(
    config: &ChatConfig,
    prompt: &str,
    mode: Mode,
    history: &ChatHistory,
) -> Result<String, ChatError> {
    let authorization = config.authorization()?;
    let body = build_request(config, prompt, mode, history).to_json()?;

    let headers = web::Headers::new().map_err(transport)?;
    headers
        .set("Content-Type", "application/json")
        .map_err(transport)?;
    headers
        .set("Authorization", &authorization)
        .map_err(transport)?;
    let init = web::RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));
    let request =
        web::Request::new_with_str_and_init(&config.endpoint, &init).map_err(transport)?;

    let window = web::window().ok_or_else(|| ChatError::Transport("no window".into()))?;
    let response: web::Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?
        .dyn_into()
        .map_err(transport)?;
    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?
        .as_string()
        .unwrap_or_default();

    check_status(response.status(), &text)?;
    parse_completion(&text)
}

/// Submit handler for the chat form: record the prompt, put the pet into
/// its thinking state and hand the reply (or error) to the director.
pub fn wire_chat_form(document: &web::Document, app: SharedApp) {
    let Some(form) = dom::element::<web::HtmlFormElement>(document, CHAT_FORM_ID) else {
        log::warn!("[chat] missing #{}", CHAT_FORM_ID);
        return;
    };
    let Some(input) = dom::element::<web::HtmlInputElement>(document, CHAT_INPUT_ID) else {
        log::warn!("[chat] missing #{}", CHAT_INPUT_ID);
        return;
    };

    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        ev.prevent_default();
        let prompt = input.value().trim().to_string();
        if prompt.is_empty() {
            return;
        }
        input.set_value("");

        let (config, mode, history) = {
            let mut a = app.borrow_mut();
            // Sent history excludes the prompt itself; it is appended last.
            let snapshot = a.history.clone();
            a.history.push(ChatMessage::user(prompt.clone()));
            a.director.begin_chat();
            (a.chat.clone(), a.director.mode(), snapshot)
        };
        if let Some(doc) = dom::window_document() {
            overlay::set_thinking(&doc, true);
        }

        let app = app.clone();
        spawn_local(async move {
            let reply = ask(&config, &prompt, mode, &history).await;
            let mut a = app.borrow_mut();
            let logged = match &reply {
                Ok(text) => text.clone(),
                Err(_) => CHAT_ERROR_LINE.to_string(),
            };
            a.history.push(ChatMessage::assistant(logged));
            let now = a.now_ms();
            let a = &mut *a;
            a.director.finish_chat(reply, now, &mut a.events);
            if let Some(doc) = dom::window_document() {
                overlay::set_thinking(&doc, false);
            }
        });
    }) as Box<dyn FnMut(_)>);
    _ = form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
    closure.forget();
}
