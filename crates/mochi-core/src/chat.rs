//! Chat boundary: request building and reply parsing for an
//! OpenAI-compatible completion endpoint.
//!
//! The HTTP call itself belongs to the front end; everything here is pure so
//! it can be tested on the host.

use crate::mood::Mode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://gen.pollinations.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gemini-fast";
pub const FALLBACK_REPLY: &str = "Just vibing on my custom kernel... (・v・)";

const PERSONA: &str = "You are Mochi, a minimalist digital desk companion. You are cool, \
slightly aggressive but still cute. You are a hardcore Arch Linux enthusiast and you \
absolutely despise Windows. You use phrases like 'I use Arch btw' and often mock \
'bloatware' or 'blue screens'. and sometimes ragebait you";

const PHONK_FLAVOUR: &str = " You are currently in 'Phonk Vibe' mode, inspired by Memphis \
rap. You are gritty and use slang like 'mane', 'vibe', and 'bang'. You still hate Windows \
though.";

const DISCO_FLAVOUR: &str = " You are currently in 'Disco Vibe' mode. You are energetic, \
colorful, and love to dance! Use words like 'groove', 'sparkle', 'party', and 'rhythm'. You \
find Windows too boring for the dance floor.";

const STYLE: &str = " Your responses are short, punchy, and opinionated. Use emoticons like \
(▼v▼), (・v・), or (>v<). use google search if the user asks for news or complex technical \
info. You have a memory of our previous conversations - remember what we've talked about and \
reference it when relevant.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("no API key configured (set POLLINATIONS_API_KEY at build time)")]
    MissingApiKey,
    #[error("completion endpoint returned {status}: {body}")]
    Http { status: u16, body: String },
    #[error("completion response had no choices")]
    EmptyResponse,
    #[error("malformed completion JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("transport failure: {0}")]
    Transport(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Prior messages sent along with each prompt.
    pub history_limit: usize,
    pub api_key: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 500,
            history_limit: 10,
            api_key: None,
        }
    }
}

impl ChatConfig {
    /// Defaults plus the key baked in at compile time, if any.
    pub fn from_build_env() -> Self {
        Self {
            api_key: option_env!("POLLINATIONS_API_KEY")
                .filter(|k| !k.trim().is_empty())
                .map(str::to_string),
            ..Self::default()
        }
    }

    /// `Authorization` header value.
    pub fn authorization(&self) -> Result<String, ChatError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(format!("Bearer {key}")),
            _ => Err(ChatError::MissingApiKey),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// In-memory conversation log. Not persisted.
#[derive(Clone, Debug, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// The last `limit` messages, oldest first.
    pub fn recent(&self, limit: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn to_json(&self) -> Result<String, ChatError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub fn system_prompt(mode: Mode) -> String {
    let flavour = match mode {
        Mode::Phonk => PHONK_FLAVOUR,
        Mode::Disco => DISCO_FLAVOUR,
        Mode::Normal => "",
    };
    format!("{PERSONA}{flavour}{STYLE}")
}

/// System persona, then recent history, then the new prompt.
pub fn build_request(
    config: &ChatConfig,
    prompt: &str,
    mode: Mode,
    history: &ChatHistory,
) -> CompletionRequest {
    let recent = history.recent(config.history_limit);
    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage {
        role: Role::System,
        content: system_prompt(mode),
    });
    messages.extend_from_slice(recent);
    messages.push(ChatMessage::user(prompt));
    CompletionRequest {
        model: config.model.clone(),
        messages,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// Map a non-2xx status to [`ChatError::Http`].
pub fn check_status(status: u16, body: &str) -> Result<(), ChatError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ChatError::Http {
            status,
            body: body.to_string(),
        })
    }
}

/// Extract `choices[0].message.content`; a blank reply becomes the fallback line.
pub fn parse_completion(body: &str) -> Result<String, ChatError> {
    let response: CompletionResponse = serde_json::from_str(body)?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(ChatError::EmptyResponse)?;
    Ok(match choice.message.content {
        Some(text) if !text.trim().is_empty() => text,
        _ => FALLBACK_REPLY.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(n: usize) -> ChatHistory {
        let mut h = ChatHistory::default();
        for i in 0..n {
            h.push(ChatMessage::user(format!("m{i}")));
        }
        h
    }

    #[test]
    fn request_carries_persona_history_and_prompt() {
        let config = ChatConfig::default();
        let req = build_request(&config, "hello", Mode::Phonk, &history_of(14));
        assert_eq!(req.messages.len(), 12);
        assert_eq!(req.messages[0].role, Role::System);
        assert!(req.messages[0].content.contains("Phonk Vibe"));
        assert_eq!(req.messages[1].content, "m4");
        assert_eq!(req.messages[11], ChatMessage::user("hello"));
        assert_eq!(req.model, "gemini-fast");
    }

    #[test]
    fn request_json_shape() {
        let req = build_request(&ChatConfig::default(), "yo", Mode::Normal, &ChatHistory::default());
        let json: serde_json::Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();
        assert_eq!(json["model"], "gemini-fast");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(!json["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("Disco Vibe"));
    }

    #[test]
    fn parses_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"I use Arch btw"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "I use Arch btw");
    }

    #[test]
    fn blank_content_falls_back() {
        let body = r#"{"choices":[{"message":{"content":""}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), FALLBACK_REPLY);
        let null = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert_eq!(parse_completion(null).unwrap(), FALLBACK_REPLY);
    }

    #[test]
    fn no_choices_is_an_error() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(ChatError::EmptyResponse)
        ));
        assert!(matches!(
            parse_completion("not json"),
            Err(ChatError::Decode(_))
        ));
    }

    #[test]
    fn missing_key_is_reported() {
        let config = ChatConfig::default();
        assert!(matches!(config.authorization(), Err(ChatError::MissingApiKey)));
        let keyed = ChatConfig {
            api_key: Some("abc".into()),
            ..ChatConfig::default()
        };
        assert_eq!(keyed.authorization().unwrap(), "Bearer abc");
    }

    #[test]
    fn status_check() {
        assert!(check_status(200, "").is_ok());
        assert!(matches!(
            check_status(429, "slow down"),
            Err(ChatError::Http { status: 429, .. })
        ));
    }
}
