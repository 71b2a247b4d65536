use glam::Vec2;
use instant::Instant;
use mochi_core::{ChatConfig, ChatHistory, DirectorEvent, MoodDirector};
use std::cell::RefCell;
use std::rc::Rc;

/// State touched by both the frame loop and DOM event handlers.
///
/// Handlers never voice or display anything themselves: director calls push
/// into `events`, which the next frame drains.
pub struct App {
    pub director: MoodDirector,
    pub events: Vec<DirectorEvent>,
    /// Latest pointer position in canvas backing-store pixels.
    pub pointer: Option<Vec2>,
    pub history: ChatHistory,
    pub chat: ChatConfig,
    pub booted: bool,
    clock: Instant,
}

pub type SharedApp = Rc<RefCell<App>>;

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            director: MoodDirector::from_entropy(),
            events: Vec::new(),
            pointer: None,
            history: ChatHistory::default(),
            chat: ChatConfig::from_build_env(),
            booted: false,
            clock: Instant::now(),
        }
    }

    /// Milliseconds since start-up; the time base for every deadline.
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }

    pub fn shared() -> SharedApp {
        Rc::new(RefCell::new(Self::new()))
    }
}
