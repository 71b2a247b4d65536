use crate::app::SharedApp;
use crate::audio::{self, SharedAudio};
use crate::canvas::CanvasSurface;
use crate::constants::BOOT_BLIP_SEC;
use crate::{dom, overlay};
use instant::Instant;
use mochi_core::constants::MAX_FRAME_DT_SEC;
use mochi_core::{
    render_frame, BootEvent, BootSequence, DirectorEvent, DrumHit, DrumMachine, Expression, Mode,
    Simulation,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub app: SharedApp,
    pub audio: SharedAudio,
    pub canvas: web::HtmlCanvasElement,
    pub document: web::Document,
    pub surface: CanvasSurface,
    pub sim: Simulation,
    pub drums: DrumMachine,
    pub boot: BootSequence,
    pub last_instant: Instant,
    pub boot_events: Vec<BootEvent>,
    pub director_events: Vec<DirectorEvent>,
    pub hits: Vec<DrumHit>,
}

impl FrameContext {
    pub fn new(
        app: SharedApp,
        audio: SharedAudio,
        canvas: web::HtmlCanvasElement,
        document: web::Document,
        surface: CanvasSurface,
    ) -> Self {
        let now_ms = app.borrow().now_ms();
        let sim = Simulation::from_entropy(dom::canvas_viewport(&canvas));
        Self {
            app,
            audio,
            canvas,
            document,
            surface,
            sim,
            drums: DrumMachine::default(),
            boot: BootSequence::new(now_ms),
            last_instant: Instant::now(),
            boot_events: Vec::new(),
            director_events: Vec::new(),
            hits: Vec::new(),
        }
    }

    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;
        let now_ms = self.app.borrow().now_ms();

        if self.boot.is_finished() {
            self.tick_director(now_ms);
        } else {
            self.tick_boot(now_ms);
        }

        let (expression, mode, pointer) = {
            let app = self.app.borrow();
            if app.booted {
                (app.director.expression(), app.director.mode(), app.pointer)
            } else {
                (Expression::Sleepy, Mode::Normal, app.pointer)
            }
        };

        // Drums only advance while audible so a late unlock starts on step 0.
        // A stalled tab must not dump a backlog of hits in one frame.
        if audio::is_unlocked(&self.audio) {
            self.hits.clear();
            let step_dt = dt.min(Duration::from_secs_f32(MAX_FRAME_DT_SEC));
            self.drums.tick(step_dt, &mut self.hits);
            if let Some(engine) = self.audio.borrow().as_ref() {
                for hit in &self.hits {
                    engine.play_drum(hit.voice);
                }
            }
        }

        let viewport = dom::canvas_viewport(&self.canvas);
        if viewport != self.sim.viewport() {
            self.sim.set_viewport(viewport);
        }
        if let Some(p) = pointer {
            self.sim.set_pointer(p);
        }
        self.sim.set_mood(expression, mode);

        let mut source = self.audio.borrow_mut();
        let frame = self.sim.step(now_ms, dt.as_secs_f32(), &mut *source);
        render_frame(&mut self.surface, &frame);
    }

    /// Silence the beat and drop the microphone when the page goes away.
    pub fn shutdown(&mut self) {
        self.drums.stop();
        audio::release_microphone(&self.audio);
    }

    fn tick_boot(&mut self, now_ms: f64) {
        self.boot_events.clear();
        self.boot.tick(now_ms, &mut self.boot_events);
        for ev in &self.boot_events {
            match *ev {
                BootEvent::Line { text, blip_hz, .. } => {
                    overlay::push_boot_line(&self.document, text);
                    if let Some(engine) = self.audio.borrow().as_ref() {
                        engine.play_blip(blip_hz, BOOT_BLIP_SEC);
                    }
                }
                BootEvent::Finished => {
                    self.sim.start();
                    overlay::hide_boot(&self.document);
                    let mut app = self.app.borrow_mut();
                    app.booted = true;
                    app.director.start(now_ms);
                    log::info!("[frame] boot finished, loop running");
                }
            }
        }
    }

    fn tick_director(&mut self, now_ms: f64) {
        {
            let mut app = self.app.borrow_mut();
            let app = &mut *app;
            app.director.tick(now_ms, &mut app.events);
            self.director_events.clear();
            self.director_events.append(&mut app.events);
        }
        let audio = self.audio.borrow();
        for ev in &self.director_events {
            match ev {
                DirectorEvent::Blip {
                    frequency_hz,
                    duration_sec,
                } => {
                    if let Some(engine) = audio.as_ref() {
                        engine.play_blip(*frequency_hz, *duration_sec);
                    }
                }
                DirectorEvent::Speech(text) => overlay::set_speech(&self.document, text.as_deref()),
                DirectorEvent::ModeChanged(mode) => {
                    self.drums.set_mode(*mode);
                    overlay::set_mode(&self.document, *mode);
                }
            }
        }
    }
}

/// Handle to a running `requestAnimationFrame` loop.
pub struct LoopHandle {
    raf_id: Rc<Cell<Option<i32>>>,
}

impl LoopHandle {
    /// Cancel the pending frame; the loop does not reschedule afterwards.
    pub fn stop(&self) {
        if let Some(id) = self.raf_id.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
            log::info!("[frame] loop stopped");
        }
    }
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) -> Option<i32> {
    let w = web::window()?;
    let slot = tick.borrow();
    let closure = slot.as_ref()?;
    w.request_animation_frame(closure.as_ref().unchecked_ref()).ok()
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) -> LoopHandle {
    let raf_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let raf_id_tick = raf_id.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        // A stopped loop has no pending id; do not reschedule.
        if raf_id_tick.take().is_none() {
            return;
        }
        frame_ctx.borrow_mut().frame();
        raf_id_tick.set(request_frame(&tick_clone));
    }) as Box<dyn FnMut()>));
    raf_id.set(request_frame(&tick));
    LoopHandle { raf_id }
}
