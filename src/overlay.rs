use crate::constants::*;
use mochi_core::Mode;
use web_sys as web;

#[inline]
fn set_hidden(el: &web::Element, hidden: bool) {
    let cl = el.class_list();
    if hidden {
        _ = cl.add_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "display:none");
    } else {
        _ = cl.remove_1("hidden");
        _ = el.set_attribute("style", "");
    }
}

/// Append one boot log line, timestamped like a terminal.
pub fn push_boot_line(document: &web::Document, text: &str) {
    let Some(log_el) = document.get_element_by_id(BOOT_LOG_ID) else {
        return;
    };
    let Ok(line) = document.create_element("p") else {
        return;
    };
    let stamp = js_sys::Date::new_0().to_locale_time_string("en-US");
    line.set_text_content(Some(&format!("[{}] {}", String::from(stamp), text)));
    _ = log_el.append_child(&line);
}

#[inline]
pub fn hide_boot(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(BOOT_OVERLAY_ID) {
        set_hidden(&el, true);
    }
}

/// Show the speech bubble with `text`, or hide it for `None`.
pub fn set_speech(document: &web::Document, text: Option<&str>) {
    if let Some(el) = document.get_element_by_id(SPEECH_ID) {
        match text {
            Some(t) => {
                el.set_text_content(Some(t));
                set_hidden(&el, false);
            }
            None => {
                el.set_text_content(None);
                set_hidden(&el, true);
            }
        }
    }
}

/// Swap in a "thinking" placeholder while a chat reply is pending.
pub fn set_thinking(document: &web::Document, thinking: bool) {
    if thinking {
        set_speech(document, Some("..."));
    }
    if let Some(el) = document.get_element_by_id(SPEECH_ID) {
        let cl = el.class_list();
        _ = if thinking {
            cl.add_1("thinking")
        } else {
            cl.remove_1("thinking")
        };
    }
}

pub fn set_mode(document: &web::Document, mode: Mode) {
    if let Some(body) = document.body() {
        _ = body.set_attribute("data-mode", mode.as_str());
    }
    if let Some(el) = document.get_element_by_id(MODE_LABEL_ID) {
        el.set_text_content(Some(mode.as_str()));
    }
}

pub fn set_microphone(document: &web::Document, on: bool) {
    if let Some(el) = document.get_element_by_id(MIC_BADGE_ID) {
        set_hidden(&el, !on);
    }
}
