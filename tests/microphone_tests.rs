// Host-side tests for microphone request bookkeeping.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod mic {
    include!("../src/mic.rs");
}

use mic::{MicAction, MicRequests};

#[test]
fn first_press_opens() {
    let mut req = MicRequests::default();
    assert_eq!(req.press(false), MicAction::Open(0));
    assert!(req.settle(0));
    assert!(!req.cancel());
}

#[test]
fn press_while_live_stops() {
    let mut req = MicRequests::default();
    assert_eq!(req.press(true), MicAction::Stop);
    assert!(!req.cancel());
}

#[test]
fn teardown_voids_an_open_prompt() {
    let mut req = MicRequests::default();
    let MicAction::Open(ticket) = req.press(false) else {
        panic!("expected an open request");
    };
    assert!(req.cancel());
    assert!(!req.settle(ticket));
    // The next press starts a fresh request rather than cancelling.
    assert!(matches!(req.press(false), MicAction::Open(_)));
}

#[test]
fn second_press_while_pending_cancels_the_grant() {
    let mut req = MicRequests::default();
    let MicAction::Open(ticket) = req.press(false) else {
        panic!("expected an open request");
    };
    assert_eq!(req.press(false), MicAction::Cancel);
    // The prompt resolves after the cancel: the stream must not be attached.
    assert!(!req.settle(ticket));
}

#[test]
fn only_the_latest_request_attaches() {
    let mut req = MicRequests::default();
    let MicAction::Open(first) = req.press(false) else {
        panic!("expected an open request");
    };
    assert_eq!(req.press(false), MicAction::Cancel);
    let MicAction::Open(second) = req.press(false) else {
        panic!("expected an open request");
    };
    assert_ne!(first, second);
    // Both prompts resolve; exactly one stream survives.
    assert!(!req.settle(first));
    assert!(req.settle(second));
    assert!(!req.settle(second));
}
