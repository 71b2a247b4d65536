//! Host-side owner of the current Expression and Mode.
//!
//! Everything here is driven by deadlines checked in [`MoodDirector::tick`],
//! so a retarget simply overwrites the pending deadline instead of racing a
//! stale timer.

use crate::chat::ChatError;
use crate::constants::*;
use crate::mood::{Expression, Mode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const NORMAL_RANTS: &[&str] = &[
    "I USE ARCH BTW. (▼v▼)",
    "WINDOWS UPDATE? DISGUSTING. (・_・)",
    "MY EYES ARE PIXELS, BUT MY SOUL IS KERNEL.",
    "SUDO PACMAN -SYU... (・v・)",
    "BLUE SCREEN OF DEATH? COULDN'T BE ME. (>v<)",
    "LINUX ISN'T A HOBBY, IT'S A LIFESTYLE. (▼w▼)",
    "STILL ON WINDOWS? CRINGE. 🥺",
    "NEOFETCH ME SOMETHING GOOD. (・v・)",
    "KERNEL PANIC? NO, JUST VIBE PANIC. (▼v▼)",
    "BLOATWARE DETECTED. PURGING... (・_・)",
    "CUSTOM COMPILED VIBES ONLY. (>v<)",
];

pub const PHONK_RANTS: &[&str] = &[
    "9MM GOES BANG!",
    "PHONK VIBES ONLY.",
    "REPRESENT THE UNDERGROUND.",
    "BASS KICKING HARDER THAN A PANIC ERROR.",
    "9MM... 9MM... 9MM...",
    "KEEP IT DIRTY. (▼w▼)",
    "STAY UNDERGROUND. (▼w▼)",
];

pub const DISCO_RANTS: &[&str] = &[
    "LET'S GROOVE! (>v<)",
    "SPARKLE MODE ACTIVATED!",
    "PARTY IN THE CPU!",
    "DANCE LIKE NO ONE'S WATCHING THE LOGS.",
    "RHYTHM OF THE NIGHT!",
    "STAY GOLDEN. (・v・)/",
    "GROOVY KERNEL VIBES. (・v,-)/",
];

pub const CHAT_ERROR_LINE: &str = "KERNEL ERROR: VIBE OVERLOAD. (・_・)";

const CUTE_EXPRESSIONS: [Expression; 7] = [
    Expression::Happy,
    Expression::Smug,
    Expression::Pleading,
    Expression::TongueSquint,
    Expression::Yum,
    Expression::TongueWink,
    Expression::Wink,
];

const SPICY_EXPRESSIONS: [Expression; 6] = [
    Expression::Pleading,
    Expression::Yum,
    Expression::TongueWink,
    Expression::Wink,
    Expression::Smug,
    Expression::EvilLaughTwitch,
];

const SPICY_HOLD_MS: f64 = 2500.0;
const HAPPY_HOLD_MS: f64 = 3000.0;
const CHAT_REPLY_HOLD_MS: f64 = 4500.0;

pub fn rants_for(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Normal => NORMAL_RANTS,
        Mode::Phonk => PHONK_RANTS,
        Mode::Disco => DISCO_RANTS,
    }
}

/// Side effects for the front end to voice or display.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectorEvent {
    Blip { frequency_hz: f32, duration_sec: f32 },
    /// `None` hides the speech bubble.
    Speech(Option<String>),
    ModeChanged(Mode),
}

fn blip(frequency_hz: f32, duration_sec: f32) -> DirectorEvent {
    DirectorEvent::Blip {
        frequency_hz,
        duration_sec,
    }
}

pub struct MoodDirector<R: Rng = StdRng> {
    expression: Expression,
    mode: Mode,
    speech: Option<String>,
    thinking: bool,
    /// Expression falls back to Idle.
    expression_reset_at: Option<f64>,
    /// Speech clears and expression falls back to Idle.
    speech_reset_at: Option<f64>,
    next_cycle_at: Option<f64>,
    rng: R,
}

impl MoodDirector<StdRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> MoodDirector<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            expression: Expression::Idle,
            mode: Mode::Normal,
            speech: None,
            thinking: false,
            expression_reset_at: None,
            speech_reset_at: None,
            next_cycle_at: None,
            rng,
        }
    }

    pub fn expression(&self) -> Expression {
        self.expression
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn speech(&self) -> Option<&str> {
        self.speech.as_deref()
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn next_cycle_at(&self) -> Option<f64> {
        self.next_cycle_at
    }

    /// Arm the autonomous mood cycle; called once boot has finished.
    pub fn start(&mut self, now_ms: f64) {
        self.next_cycle_at = Some(now_ms + MOOD_CYCLE_FIRST_MS);
    }

    /// Direct expression override (keyboard). Cancels a pending revert.
    pub fn set_expression(&mut self, expression: Expression) {
        self.expression = expression;
        self.expression_reset_at = None;
    }

    pub fn set_mode(&mut self, mode: Mode, now_ms: f64, events: &mut Vec<DirectorEvent>) {
        if mode == self.mode {
            return;
        }
        log::info!("[director] mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.speech_reset_at = None;
        if self.speech.take().is_some() {
            events.push(DirectorEvent::Speech(None));
        }
        let (expression, flash) = match mode {
            Mode::Phonk => (Expression::Angry, blip(200.0, 0.3)),
            Mode::Disco => (Expression::Happy, blip(800.0, 0.2)),
            Mode::Normal => (Expression::Blink, blip(440.0, 0.1)),
        };
        self.expression = expression;
        self.expression_reset_at = Some(now_ms + MODE_FLASH_REVERT_MS);
        events.push(DirectorEvent::ModeChanged(mode));
        events.push(flash);
    }

    /// Enter `mode`, or drop back to Normal if it is already active.
    pub fn toggle_mode(&mut self, mode: Mode, now_ms: f64, events: &mut Vec<DirectorEvent>) {
        let next = if self.mode == mode { Mode::Normal } else { mode };
        self.set_mode(next, now_ms, events);
    }

    /// Phonk -> Disco -> Normal -> Phonk.
    pub fn cycle_mode(&mut self, now_ms: f64, events: &mut Vec<DirectorEvent>) {
        let next = match self.mode {
            Mode::Phonk => Mode::Disco,
            Mode::Disco => Mode::Normal,
            Mode::Normal => Mode::Phonk,
        };
        self.set_mode(next, now_ms, events);
    }

    pub fn rant(&mut self, forced: Option<Expression>, now_ms: f64, events: &mut Vec<DirectorEvent>) {
        let list = rants_for(self.mode);
        let line = list[self.rng.gen_range(0..list.len())];
        let frequency = if self.mode == Mode::Phonk { 150.0 } else { 600.0 };
        events.push(blip(frequency, 0.1));

        self.expression = match forced {
            Some(expression) => expression,
            None if self.mode.is_special() => {
                if self.rng.gen::<f64>() > 0.5 {
                    Expression::EvilLaughTwitch
                } else {
                    Expression::Happy
                }
            }
            None => self.expression_for_line(line),
        };
        log::debug!("[director] rant {:?} as {}", line, self.expression);
        self.say(line.to_string(), now_ms + RANT_DURATION_MS, events);
    }

    fn expression_for_line(&mut self, line: &str) -> Expression {
        if line.contains("WINDOWS") || line.contains("BLOATWARE") {
            Expression::EvilLaughTwitch
        } else if line.contains("ARCH") || line.contains("LINUX") {
            Expression::Smug
        } else {
            CUTE_EXPRESSIONS[self.rng.gen_range(0..CUTE_EXPRESSIONS.len())]
        }
    }

    fn say(&mut self, text: String, clear_at: f64, events: &mut Vec<DirectorEvent>) {
        self.expression_reset_at = None;
        self.speech_reset_at = Some(clear_at);
        self.speech = Some(text.clone());
        events.push(DirectorEvent::Speech(Some(text)));
    }

    pub fn begin_chat(&mut self) {
        self.thinking = true;
        self.set_expression(Expression::Thinking);
    }

    pub fn finish_chat(
        &mut self,
        reply: Result<String, ChatError>,
        now_ms: f64,
        events: &mut Vec<DirectorEvent>,
    ) {
        self.thinking = false;
        match reply {
            Ok(text) => {
                self.expression = Expression::Happy;
                self.say(text, now_ms + CHAT_REPLY_HOLD_MS, events);
            }
            Err(err) => {
                log::warn!("[director] chat failed: {}", err);
                self.expression = Expression::Angry;
                events.push(blip(100.0, 0.5));
                self.say(
                    CHAT_ERROR_LINE.to_string(),
                    now_ms + CHAT_ERROR_DURATION_MS,
                    events,
                );
            }
        }
    }

    /// Fire every deadline that has passed.
    pub fn tick(&mut self, now_ms: f64, events: &mut Vec<DirectorEvent>) {
        if self.speech_reset_at.is_some_and(|at| now_ms >= at) {
            self.speech_reset_at = None;
            self.speech = None;
            self.expression = Expression::Idle;
            events.push(DirectorEvent::Speech(None));
        }
        if self.expression_reset_at.is_some_and(|at| now_ms >= at) {
            self.expression_reset_at = None;
            self.expression = Expression::Idle;
        }
        if let Some(at) = self.next_cycle_at {
            if now_ms >= at {
                self.cycle_mood(now_ms, events);
                let gap = MOOD_CYCLE_MIN_MS + self.rng.gen::<f64>() * MOOD_CYCLE_SPAN_MS;
                self.next_cycle_at = Some(now_ms + gap);
            }
        }
    }

    fn cycle_mood(&mut self, now_ms: f64, events: &mut Vec<DirectorEvent>) {
        if self.speech.is_some() || self.thinking || self.expression == Expression::Thinking {
            return;
        }
        let roll = self.rng.gen::<f64>();
        if roll > 0.92 {
            self.rant(None, now_ms, events);
        } else if roll > 0.8 {
            let pick = SPICY_EXPRESSIONS[self.rng.gen_range(0..SPICY_EXPRESSIONS.len())];
            self.expression = pick;
            self.expression_reset_at = Some(now_ms + SPICY_HOLD_MS);
        } else if roll > 0.45 {
            self.expression = Expression::Happy;
            self.expression_reset_at = Some(now_ms + HAPPY_HOLD_MS);
        } else {
            self.set_expression(Expression::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn mode_change_flashes_then_reverts() {
        let mut d = MoodDirector::new(1);
        let mut events = Vec::new();
        d.set_mode(Mode::Phonk, 0.0, &mut events);
        assert_eq!(d.expression(), Expression::Angry);
        assert!(events.contains(&DirectorEvent::ModeChanged(Mode::Phonk)));
        assert!(events.contains(&blip(200.0, 0.3)));
        d.tick(499.0, &mut events);
        assert_eq!(d.expression(), Expression::Angry);
        d.tick(500.0, &mut events);
        assert_eq!(d.expression(), Expression::Idle);
    }

    #[test]
    fn toggle_returns_to_normal_with_blink() {
        let mut d = MoodDirector::new(1);
        let mut events = Vec::new();
        d.toggle_mode(Mode::Disco, 0.0, &mut events);
        assert_eq!(d.mode(), Mode::Disco);
        assert_eq!(d.expression(), Expression::Happy);
        d.toggle_mode(Mode::Disco, 10.0, &mut events);
        assert_eq!(d.mode(), Mode::Normal);
        assert_eq!(d.expression(), Expression::Blink);
    }

    #[test]
    fn cycle_mode_order() {
        let mut d = MoodDirector::new(1);
        let mut events = Vec::new();
        d.cycle_mode(0.0, &mut events);
        assert_eq!(d.mode(), Mode::Phonk);
        d.cycle_mode(0.0, &mut events);
        assert_eq!(d.mode(), Mode::Disco);
        d.cycle_mode(0.0, &mut events);
        assert_eq!(d.mode(), Mode::Normal);
    }

    #[test]
    fn cycle_mode_announces_every_change() {
        let mut d = MoodDirector::new(1);
        let mut events = Vec::new();
        for _ in 0..3 {
            d.cycle_mode(0.0, &mut events);
        }
        let modes: Vec<Mode> = events
            .iter()
            .filter_map(|e| match e {
                DirectorEvent::ModeChanged(m) => Some(*m),
                _ => None,
            })
            .collect();
        assert_eq!(modes, vec![Mode::Phonk, Mode::Disco, Mode::Normal]);
    }

    #[test]
    fn rant_keywords_pick_expression() {
        // StepRng(0, 0) always picks index 0: "I USE ARCH BTW."
        let mut d = MoodDirector::with_rng(StepRng::new(0, 0));
        let mut events = Vec::new();
        d.rant(None, 0.0, &mut events);
        assert_eq!(d.speech(), Some(NORMAL_RANTS[0]));
        assert_eq!(d.expression(), Expression::Smug);
        assert!(events.contains(&blip(600.0, 0.1)));
        d.tick(RANT_DURATION_MS, &mut events);
        assert_eq!(d.speech(), None);
        assert_eq!(d.expression(), Expression::Idle);
        assert_eq!(events.last(), Some(&DirectorEvent::Speech(None)));
    }

    #[test]
    fn special_mode_rant_uses_phonk_list() {
        let mut d = MoodDirector::new(4);
        let mut events = Vec::new();
        d.set_mode(Mode::Phonk, 0.0, &mut events);
        d.rant(None, 0.0, &mut events);
        assert!(PHONK_RANTS.contains(&d.speech().unwrap()));
        assert!(matches!(
            d.expression(),
            Expression::EvilLaughTwitch | Expression::Happy
        ));
        assert!(events.contains(&blip(150.0, 0.1)));
    }

    #[test]
    fn forced_rant_expression_wins() {
        let mut d = MoodDirector::new(2);
        let mut events = Vec::new();
        d.rant(Some(Expression::Pleading), 0.0, &mut events);
        assert_eq!(d.expression(), Expression::Pleading);
    }

    #[test]
    fn mode_change_clears_speech() {
        let mut d = MoodDirector::new(2);
        let mut events = Vec::new();
        d.rant(None, 0.0, &mut events);
        events.clear();
        d.set_mode(Mode::Disco, 100.0, &mut events);
        assert_eq!(d.speech(), None);
        assert_eq!(events[0], DirectorEvent::Speech(None));
    }

    #[test]
    fn chat_success_and_failure() {
        let mut d = MoodDirector::new(3);
        let mut events = Vec::new();
        d.begin_chat();
        assert!(d.is_thinking());
        assert_eq!(d.expression(), Expression::Thinking);
        d.finish_chat(Ok("hi (・v・)".into()), 0.0, &mut events);
        assert!(!d.is_thinking());
        assert_eq!(d.expression(), Expression::Happy);
        assert_eq!(d.speech(), Some("hi (・v・)"));

        d.begin_chat();
        d.finish_chat(Err(ChatError::EmptyResponse), 0.0, &mut events);
        assert_eq!(d.expression(), Expression::Angry);
        assert_eq!(d.speech(), Some(CHAT_ERROR_LINE));
        assert!(events.contains(&blip(100.0, 0.5)));
        d.tick(CHAT_ERROR_DURATION_MS, &mut events);
        assert_eq!(d.speech(), None);
        assert_eq!(d.expression(), Expression::Idle);
    }

    #[test]
    fn mood_cycle_waits_for_first_deadline_and_reschedules() {
        let mut d = MoodDirector::new(8);
        let mut events = Vec::new();
        assert!(d.next_cycle_at().is_none());
        d.start(1000.0);
        assert_eq!(d.next_cycle_at(), Some(4000.0));
        d.tick(4000.0, &mut events);
        let next = d.next_cycle_at().unwrap();
        assert!((4000.0 + MOOD_CYCLE_MIN_MS..4000.0 + MOOD_CYCLE_MIN_MS + MOOD_CYCLE_SPAN_MS)
            .contains(&next));
    }

    #[test]
    fn mood_cycle_skips_while_thinking() {
        // High rolls would otherwise rant.
        let mut d = MoodDirector::with_rng(StepRng::new(u64::MAX, 0));
        let mut events = Vec::new();
        d.begin_chat();
        d.start(0.0);
        d.tick(MOOD_CYCLE_FIRST_MS, &mut events);
        assert_eq!(d.expression(), Expression::Thinking);
        assert!(d.speech().is_none());
    }

    #[test]
    fn low_roll_settles_to_idle() {
        let mut d = MoodDirector::with_rng(StepRng::new(0, 0));
        let mut events = Vec::new();
        d.set_expression(Expression::Smug);
        d.start(0.0);
        d.tick(MOOD_CYCLE_FIRST_MS, &mut events);
        assert_eq!(d.expression(), Expression::Idle);
    }
}
