use mochi_core::{Expression, Mode};

/// What a key press asks the pet to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    /// Enter the mode, or fall back to Normal if it is already active.
    ToggleMode(Mode),
    SetMode(Mode),
    Express(Expression),
    ToggleMicrophone,
    FocusChat,
    ClearChat,
}

/// Map a `KeyboardEvent.key` to a command. While the chat input has focus
/// only Escape is handled; everything else is left to the input.
#[inline]
pub fn command_for_key(key: &str, typing: bool) -> Option<KeyCommand> {
    if typing {
        return (key == "Escape").then_some(KeyCommand::ClearChat);
    }
    match key {
        "9" | "v" | "V" => Some(KeyCommand::ToggleMode(Mode::Phonk)),
        "8" | "d" | "D" => Some(KeyCommand::ToggleMode(Mode::Disco)),
        "7" => Some(KeyCommand::SetMode(Mode::Normal)),
        "5" => Some(KeyCommand::FocusChat),
        "l" | "L" => Some(KeyCommand::ToggleMicrophone),
        "e" => Some(KeyCommand::Express(Expression::EvilLaughTwitch)),
        "i" => Some(KeyCommand::Express(Expression::Idle)),
        _ => None,
    }
}
