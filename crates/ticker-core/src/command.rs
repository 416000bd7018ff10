//! Method-name commands.
//!
//! Parses lines such as `setSetting interval 5000` into typed
//! [`Command`]s and applies them to a widget. Only the public method names
//! are accepted; anything else, including names starting with `_`, is
//! rejected with [`CommandError::NoSuchMethod`].

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::controller::TickerWidget;
use crate::settings::{Settings, SettingsError};

/// A public widget operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetCurrentTicker,
    GetSetting(String),
    GetSettings,
    IsRunning,
    MergeSettings(Value),
    Pause,
    Resume,
    Restart,
    SetSetting(String, Value),
    SetSettings(Value),
    Start,
    Stop,
    Update,
}

impl Command {
    /// Public method names, as accepted by `parse`.
    pub const METHODS: &[&str] = &[
        "getCurrentTicker",
        "getSetting",
        "getSettings",
        "isRunning",
        "mergeSettings",
        "pause",
        "resume",
        "restart",
        "setSetting",
        "setSettings",
        "start",
        "stop",
        "update",
    ];

    /// Runs the command and returns its result (`null` for mutators).
    ///
    /// # Errors
    /// Returns an error if a settings change is rejected.
    pub fn apply(self, widget: &TickerWidget) -> Result<Value, CommandError> {
        let result = match self {
            Command::GetCurrentTicker => widget
                .current_ticker()
                .and_then(|ticker| serde_json::to_value(ticker).ok())
                .unwrap_or(Value::Null),
            Command::GetSetting(name) => widget.setting(&name).unwrap_or(Value::Null),
            Command::GetSettings => widget.settings().to_value(),
            Command::IsRunning => Value::Bool(widget.is_running()),
            Command::MergeSettings(partial) => {
                widget.merge_settings(&partial)?;
                Value::Null
            }
            Command::Pause => {
                widget.pause();
                Value::Null
            }
            Command::Resume => {
                widget.resume();
                Value::Null
            }
            Command::Restart => {
                widget.restart();
                Value::Null
            }
            Command::SetSetting(name, value) => {
                widget.set_setting(&name, value)?;
                Value::Null
            }
            Command::SetSettings(value) => {
                widget.set_settings(Settings::from_value(value)?);
                Value::Null
            }
            Command::Start => {
                widget.start();
                Value::Null
            }
            Command::Stop => {
                widget.stop();
                Value::Null
            }
            Command::Update => {
                widget.update();
                Value::Null
            }
        };
        Ok(result)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (method, rest) = match line.split_once(char::is_whitespace) {
            Some((method, rest)) => (method, rest.trim()),
            None => (line, ""),
        };
        if method.is_empty() {
            return Err(CommandError::Empty);
        }

        let command = match method {
            "getCurrentTicker" => Command::GetCurrentTicker,
            "getSetting" => Command::GetSetting(required(method, "name", rest)?.to_string()),
            "getSettings" => Command::GetSettings,
            "isRunning" => Command::IsRunning,
            "mergeSettings" => Command::MergeSettings(parse_json(method, rest)?),
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "restart" => Command::Restart,
            "setSetting" => {
                let (name, raw) = match rest.split_once(char::is_whitespace) {
                    Some((name, raw)) => (name, raw.trim()),
                    None => (rest, ""),
                };
                let name = required(method, "name", name)?;
                let raw = required(method, "value", raw)?;
                // Bare words are taken as strings: `setSetting format %s (%s)`.
                let value = serde_json::from_str(raw)
                    .unwrap_or_else(|_| Value::String(raw.to_string()));
                Command::SetSetting(name.to_string(), value)
            }
            "setSettings" => Command::SetSettings(parse_json(method, rest)?),
            "start" => Command::Start,
            "stop" => Command::Stop,
            "update" => Command::Update,
            other => return Err(CommandError::NoSuchMethod(other.to_string())),
        };
        Ok(command)
    }
}

fn required<'a>(
    method: &str,
    argument: &'static str,
    raw: &'a str,
) -> Result<&'a str, CommandError> {
    if raw.is_empty() {
        Err(CommandError::MissingArgument {
            method: method.to_string(),
            argument,
        })
    } else {
        Ok(raw)
    }
}

fn parse_json(method: &str, raw: &str) -> Result<Value, CommandError> {
    let raw = required(method, "json", raw)?;
    serde_json::from_str(raw).map_err(|e| CommandError::InvalidArgument {
        method: method.to_string(),
        message: e.to_string(),
    })
}

/// Errors from parsing or applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    NoSuchMethod(String),
    MissingArgument {
        method: String,
        argument: &'static str,
    },
    InvalidArgument {
        method: String,
        message: String,
    },
    Settings(SettingsError),
}

impl From<SettingsError> for CommandError {
    fn from(err: SettingsError) -> Self {
        CommandError::Settings(err)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "Empty command"),
            CommandError::NoSuchMethod(name) => write!(
                f,
                "There is no such method \"{name}\" in {}",
                crate::events::NAMESPACE
            ),
            CommandError::MissingArgument { method, argument } => {
                write!(f, "{method}: missing argument <{argument}>")
            }
            CommandError::InvalidArgument { method, message } => {
                write!(f, "{method}: invalid argument: {message}")
            }
            CommandError::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CommandError {}
