use crate::constants::{DISCO_BPM, NORMAL_BPM, PHONK_BPM};
use std::fmt;

/// Discrete mood/pose selector. Owned by the host, pushed into the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Expression {
    #[default]
    Idle,
    Happy,
    Angry,
    Sleepy,
    Thinking,
    Blink,
    Evil,
    Laughing,
    EvilLaugh,
    EvilLaughTwitch,
    EvilRant,
    Smug,
    Wink,
    Disco,
    Dance,
    Pleading,
    TongueSquint,
    Yum,
    TongueWink,
}

impl Expression {
    pub const ALL: [Expression; 19] = [
        Expression::Idle,
        Expression::Happy,
        Expression::Angry,
        Expression::Sleepy,
        Expression::Thinking,
        Expression::Blink,
        Expression::Evil,
        Expression::Laughing,
        Expression::EvilLaugh,
        Expression::EvilLaughTwitch,
        Expression::EvilRant,
        Expression::Smug,
        Expression::Wink,
        Expression::Disco,
        Expression::Dance,
        Expression::Pleading,
        Expression::TongueSquint,
        Expression::Yum,
        Expression::TongueWink,
    ];

    /// Evil family members trigger snap transitions on entry and exit.
    #[inline]
    pub fn is_evil(self) -> bool {
        matches!(
            self,
            Expression::Evil | Expression::EvilLaugh | Expression::EvilLaughTwitch
        )
    }

    #[inline]
    pub fn is_evil_laugh(self) -> bool {
        matches!(self, Expression::EvilLaugh | Expression::EvilLaughTwitch)
    }

    /// Expressions that get the strongest bounce when entered.
    #[inline]
    pub fn is_high_energy(self) -> bool {
        matches!(
            self,
            Expression::Laughing
                | Expression::EvilLaugh
                | Expression::EvilLaughTwitch
                | Expression::Happy
                | Expression::EvilRant
                | Expression::Disco
                | Expression::TongueSquint
        )
    }

    /// Tongue hangs off to one side and wags.
    #[inline]
    pub fn has_playful_tongue(self) -> bool {
        matches!(self, Expression::Yum | Expression::TongueWink)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Expression::Idle => "IDLE",
            Expression::Happy => "HAPPY",
            Expression::Angry => "ANGRY",
            Expression::Sleepy => "SLEEPY",
            Expression::Thinking => "THINKING",
            Expression::Blink => "BLINK",
            Expression::Evil => "EVIL",
            Expression::Laughing => "LAUGHING",
            Expression::EvilLaugh => "EVILLAUGH",
            Expression::EvilLaughTwitch => "EVILLAUGH_TWITCH",
            Expression::EvilRant => "EVIL_RANT",
            Expression::Smug => "SMUG",
            Expression::Wink => "WINK",
            Expression::Disco => "DISCO",
            Expression::Dance => "DANCE",
            Expression::Pleading => "PLEADING",
            Expression::TongueSquint => "TONGUE_SQUINT",
            Expression::Yum => "YUM",
            Expression::TongueWink => "TONGUE_WINK",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary axis: tempo, palette and some target magnitudes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Phonk,
    Disco,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Normal, Mode::Phonk, Mode::Disco];

    #[inline]
    pub fn bpm(self) -> f32 {
        match self {
            Mode::Normal => NORMAL_BPM,
            Mode::Phonk => PHONK_BPM,
            Mode::Disco => DISCO_BPM,
        }
    }

    /// Any mode other than normal dances to its beat.
    #[inline]
    pub fn is_special(self) -> bool {
        self != Mode::Normal
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Phonk => "PHONK",
            Mode::Disco => "DISCO",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evil_family_membership() {
        let evil: Vec<_> = Expression::ALL.iter().filter(|e| e.is_evil()).collect();
        assert_eq!(evil.len(), 3);
        assert!(Expression::EvilLaughTwitch.is_evil());
        assert!(!Expression::EvilRant.is_evil());
        assert!(!Expression::Pleading.is_evil());
    }

    #[test]
    fn tempo_per_mode() {
        assert_eq!(Mode::Disco.bpm(), 128.0);
        assert_eq!(Mode::Phonk.bpm(), 135.0);
        assert_eq!(Mode::Normal.bpm(), 60.0);
        assert!(!Mode::Normal.is_special());
    }

    #[test]
    fn all_expressions_are_distinct() {
        for (i, a) in Expression::ALL.iter().enumerate() {
            for b in &Expression::ALL[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }
}
