use crate::constants::*;
use crate::mic::{MicAction, MicRequests};
use crate::{dom, overlay};
use mochi_core::{AudioSource, DrumVoice};
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// Engine slot shared by the frame loop and input handlers. Stays `None`
/// until the first user gesture unlocks audio.
pub type SharedAudio = Rc<RefCell<Option<AudioEngine>>>;

struct Microphone {
    stream: web::MediaStream,
    source: web::MediaStreamAudioSourceNode,
}

/// Master bus, analyser tap and the synth voices that play into them.
pub struct AudioEngine {
    ctx: web::AudioContext,
    master: web::GainNode,
    analyser: web::AnalyserNode,
    freq: Vec<u8>,
    noise: Option<web::AudioBuffer>,
    mic: Option<Microphone>,
    mic_requests: MicRequests,
}

fn stop_tracks(stream: &web::MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
            track.stop();
        }
    }
}

fn create_gain(audio_ctx: &web::AudioContext, value: f32, label: &str) -> anyhow::Result<web::GainNode> {
    let gain = web::GainNode::new(audio_ctx)
        .map_err(|e| anyhow::anyhow!("{} GainNode error: {:?}", label, e))?;
    gain.gain().set_value(value);
    Ok(gain)
}

/// One channel of white noise, long enough for a hat hit.
fn noise_buffer(audio_ctx: &web::AudioContext) -> Option<web::AudioBuffer> {
    let sr = audio_ctx.sample_rate();
    let len = ((sr as f64 * HAT_DURATION_SEC) as u32).max(1);
    let buffer = audio_ctx.create_buffer(1, len, sr).ok()?;
    let mut rng = rand::thread_rng();
    let mut data: Vec<f32> = (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect();
    _ = buffer.copy_to_channel(&mut data, 0);
    Some(buffer)
}

/// Envelope gain: start at `peak`, decay exponentially to the floor by `end`.
fn decaying_gain(
    audio_ctx: &web::AudioContext,
    peak: f32,
    start: f64,
    end: f64,
) -> Option<web::GainNode> {
    let gain = web::GainNode::new(audio_ctx).ok()?;
    _ = gain.gain().set_value_at_time(peak, start);
    _ = gain.gain().exponential_ramp_to_value_at_time(RAMP_FLOOR, end);
    Some(gain)
}

impl AudioEngine {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let master = create_gain(&ctx, MASTER_GAIN, "Master")?;
        _ = master.connect_with_audio_node(&ctx.destination());

        let analyser =
            web::AnalyserNode::new(&ctx).map_err(|e| anyhow::anyhow!("AnalyserNode error: {:?}", e))?;
        analyser.set_fft_size(ANALYSER_FFT_SIZE);
        // Internal voices feed the analyser too so the face reacts to its own beat.
        _ = master.connect_with_audio_node(&analyser);
        let freq = vec![0u8; analyser.frequency_bin_count() as usize];
        let noise = noise_buffer(&ctx);

        log::info!(
            "[audio] context ready sr={} bins={}",
            ctx.sample_rate(),
            freq.len()
        );
        Ok(Self {
            ctx,
            master,
            analyser,
            freq,
            noise,
            mic: None,
            mic_requests: MicRequests::default(),
        })
    }

    pub fn resume(&self) {
        _ = self.ctx.resume();
    }

    pub fn play_blip(&self, frequency_hz: f32, duration_sec: f32) {
        let t0 = self.ctx.current_time();
        self.blip_at(frequency_hz, duration_sec as f64, t0);
    }

    /// Schedule one sequencer hit slightly ahead of the audio clock.
    pub fn play_drum(&self, voice: DrumVoice) {
        let t0 = self.ctx.current_time() + SCHEDULE_AHEAD_SEC;
        match voice {
            DrumVoice::Kick { distorted } => self.kick_at(distorted, t0),
            DrumVoice::Hat => self.hat_at(t0),
            DrumVoice::Cowbell => self.cowbell_at(t0),
            DrumVoice::Blip {
                frequency_hz,
                duration_sec,
            } => self.blip_at(frequency_hz, duration_sec as f64, t0),
        }
    }

    fn blip_at(&self, frequency_hz: f32, duration_sec: f64, t0: f64) {
        let Ok(src) = web::OscillatorNode::new(&self.ctx) else {
            return;
        };
        let Some(gain) = decaying_gain(&self.ctx, BLIP_GAIN, t0, t0 + duration_sec) else {
            return;
        };
        src.set_type(web::OscillatorType::Sine);
        _ = src.frequency().set_value_at_time(frequency_hz, t0);
        _ = src.connect_with_audio_node(&gain);
        _ = gain.connect_with_audio_node(&self.master);
        _ = src.start_with_when(t0);
        _ = src.stop_with_when(t0 + duration_sec);
    }

    fn kick_at(&self, distorted: bool, t0: f64) {
        let Ok(src) = web::OscillatorNode::new(&self.ctx) else {
            return;
        };
        let Some(gain) = decaying_gain(&self.ctx, KICK_GAIN, t0, t0 + KICK_DURATION_SEC) else {
            return;
        };
        let start_hz = if distorted { KICK_DISTORTED_HZ } else { KICK_HZ };
        _ = src.frequency().set_value_at_time(start_hz, t0);
        _ = src
            .frequency()
            .exponential_ramp_to_value_at_time(RAMP_FLOOR, t0 + KICK_DURATION_SEC);
        _ = src.connect_with_audio_node(&gain);
        _ = gain.connect_with_audio_node(&self.master);
        _ = src.start_with_when(t0);
        _ = src.stop_with_when(t0 + KICK_DURATION_SEC);
    }

    fn hat_at(&self, t0: f64) {
        let Some(noise) = &self.noise else {
            return;
        };
        let Ok(src) = web::AudioBufferSourceNode::new(&self.ctx) else {
            return;
        };
        let Ok(filter) = web::BiquadFilterNode::new(&self.ctx) else {
            return;
        };
        let Some(gain) = decaying_gain(&self.ctx, HAT_GAIN, t0, t0 + HAT_DURATION_SEC) else {
            return;
        };
        src.set_buffer(Some(noise));
        filter.set_type(web::BiquadFilterType::Highpass);
        filter.frequency().set_value(HAT_HIGHPASS_HZ);
        _ = src.connect_with_audio_node(&filter);
        _ = filter.connect_with_audio_node(&gain);
        _ = gain.connect_with_audio_node(&self.master);
        _ = src.start_with_when(t0);
    }

    fn cowbell_at(&self, t0: f64) {
        let end = t0 + COWBELL_DURATION_SEC;
        for hz in COWBELL_HZ {
            let Ok(src) = web::OscillatorNode::new(&self.ctx) else {
                continue;
            };
            let Some(gain) = decaying_gain(&self.ctx, COWBELL_GAIN, t0, end) else {
                continue;
            };
            src.set_type(web::OscillatorType::Square);
            _ = src.frequency().set_value_at_time(hz, t0);
            _ = src.connect_with_audio_node(&gain);
            _ = gain.connect_with_audio_node(&self.master);
            _ = src.start_with_when(t0);
            _ = src.stop_with_when(end);
        }
    }

    /// Route a granted microphone stream into the analyser only; it never
    /// reaches the destination. Any stream already attached is stopped first.
    fn attach_microphone(&mut self, stream: web::MediaStream) -> anyhow::Result<()> {
        self.stop_listening();
        let source = match self.ctx.create_media_stream_source(&stream) {
            Ok(source) => source,
            Err(e) => {
                stop_tracks(&stream);
                anyhow::bail!("MediaStreamSource error: {:?}", e);
            }
        };
        _ = source.connect_with_audio_node(&self.analyser);
        self.mic = Some(Microphone { stream, source });
        Ok(())
    }

    /// Stop every track of the live stream. Returns false if nothing was open.
    fn stop_listening(&mut self) -> bool {
        let Some(mic) = self.mic.take() else {
            return false;
        };
        _ = mic.source.disconnect();
        stop_tracks(&mic.stream);
        log::info!("[audio] microphone off");
        true
    }
}

impl AudioSource for AudioEngine {
    fn frequency_data(&mut self) -> &[u8] {
        self.analyser.get_byte_frequency_data(&mut self.freq);
        &self.freq
    }
}

/// Create the engine on the first gesture and resume a suspended context.
/// A failed creation is logged and retried on the next gesture.
pub fn unlock(audio: &SharedAudio) {
    let mut slot = audio.borrow_mut();
    if slot.is_none() {
        match AudioEngine::new() {
            Ok(engine) => *slot = Some(engine),
            Err(e) => {
                log::error!("[audio] init failed: {:?}", e);
                return;
            }
        }
    }
    if let Some(engine) = slot.as_ref() {
        engine.resume();
    }
}

pub fn is_unlocked(audio: &SharedAudio) -> bool {
    audio.borrow().is_some()
}

async fn open_microphone() -> anyhow::Result<web::MediaStream> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let constraints = web::MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let stream = JsFuture::from(promise)
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    stream
        .dyn_into::<web::MediaStream>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))
}

fn show_microphone(on: bool) {
    if let Some(document) = dom::window_document() {
        overlay::set_microphone(&document, on);
    }
}

/// Turn the microphone off if it is live, otherwise request it. A press while
/// the permission prompt is open cancels that request. Denial is logged and
/// leaves the analyser on internal audio only.
pub fn toggle_microphone(audio: &SharedAudio) {
    unlock(audio);
    let ticket = {
        let mut slot = audio.borrow_mut();
        let Some(engine) = slot.as_mut() else {
            return;
        };
        let live = engine.mic.is_some();
        match engine.mic_requests.press(live) {
            MicAction::Stop => {
                engine.stop_listening();
                show_microphone(false);
                return;
            }
            MicAction::Cancel => {
                log::info!("[audio] microphone request cancelled");
                return;
            }
            MicAction::Open(ticket) => ticket,
        }
    };
    let audio = audio.clone();
    spawn_local(async move {
        let opened = open_microphone().await;
        let mut slot = audio.borrow_mut();
        let Some(engine) = slot.as_mut() else {
            if let Ok(stream) = &opened {
                stop_tracks(stream);
            }
            return;
        };
        let current = engine.mic_requests.settle(ticket);
        let stream = match opened {
            Ok(stream) if current => stream,
            Ok(stream) => {
                stop_tracks(&stream);
                log::info!("[audio] discarded stale microphone stream");
                return;
            }
            Err(e) => {
                log::warn!("[audio] microphone access denied: {:?}", e);
                return;
            }
        };
        match engine.attach_microphone(stream) {
            Ok(()) => {
                log::info!("[audio] microphone on");
                show_microphone(true);
            }
            Err(e) => log::error!("[audio] {:?}", e),
        }
    });
}

/// Stop a live microphone and void any open request.
pub fn release_microphone(audio: &SharedAudio) {
    let mut slot = audio.borrow_mut();
    let Some(engine) = slot.as_mut() else {
        return;
    };
    if engine.mic_requests.cancel() {
        log::info!("[audio] microphone request cancelled");
    }
    if engine.stop_listening() {
        show_microphone(false);
    }
}
