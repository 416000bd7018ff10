//! Per-instance ticker settings.
//!
//! Settings are addressed by their public camelCase names (`tickerUrl`,
//! `fadeInTime`, ...). Durations are exchanged as milliseconds. Lookups and
//! single-field writes go through the JSON form so callers can address a
//! field by name without a hand-written match per field.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Endpoint queried when no `tickerUrl` is configured.
pub const DEFAULT_TICKER_URL: &str = "https://www.der-postillion.de/ticker/newsticker2.php";

/// Display template: first `%s` is the ticker text, second is its short name.
pub const DEFAULT_FORMAT: &str = "+++ %s +++ (%s)";

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(15_000);
pub const DEFAULT_FADE_IN_TIME: Duration = Duration::from_millis(1_000);
pub const DEFAULT_FADE_OUT_TIME: Duration = Duration::from_millis(1_000);

/// Ticker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    /// Start cycling as soon as the instance is built.
    pub auto_start: bool,

    /// Duration of the fade-in animation.
    #[serde(with = "millis")]
    pub fade_in_time: Duration,

    /// Duration of the fade-out animation.
    #[serde(with = "millis")]
    pub fade_out_time: Duration,

    /// printf-like template with two `%s` placeholders (text, short name).
    pub format: String,

    /// Show a ticker right away on start instead of waiting one interval.
    pub instant_start: bool,

    /// Time between two updates.
    #[serde(with = "millis")]
    pub interval: Duration,

    /// Render tickers that carry a link as links.
    pub show_links: bool,

    /// Endpoint returning `{"tickers": [...]}`.
    pub ticker_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_start: true,
            fade_in_time: DEFAULT_FADE_IN_TIME,
            fade_out_time: DEFAULT_FADE_OUT_TIME,
            format: DEFAULT_FORMAT.to_string(),
            instant_start: true,
            interval: DEFAULT_INTERVAL,
            show_links: true,
            ticker_url: DEFAULT_TICKER_URL.to_string(),
        }
    }
}

impl Settings {
    /// Public setting names, in declaration order.
    pub const NAMES: &[&str] = &[
        "autoStart",
        "fadeInTime",
        "fadeOutTime",
        "format",
        "instantStart",
        "interval",
        "showLinks",
        "tickerUrl",
    ];

    /// Returns the value of the named setting, or `None` if there is no such setting.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut map = self.to_map().ok()?;
        map.remove(name)
    }

    /// Returns a copy with one setting replaced.
    ///
    /// # Errors
    /// Returns an error if the name is unknown or the value has the wrong type.
    pub fn with_value(&self, name: &str, value: Value) -> Result<Settings, SettingsError> {
        if !Self::NAMES.contains(&name) {
            return Err(SettingsError::UnknownSetting(name.to_string()));
        }

        let mut map = self.to_map()?;
        map.insert(name.to_string(), value);
        serde_json::from_value(Value::Object(map)).map_err(|e| SettingsError::InvalidValue {
            name: Some(name.to_string()),
            message: e.to_string(),
        })
    }

    /// Returns a copy with `partial` deep-merged on top.
    ///
    /// # Errors
    /// Returns an error if `partial` is not an object, names an unknown
    /// setting, or carries a value of the wrong type.
    pub fn merged(&self, partial: &Value) -> Result<Settings, SettingsError> {
        if !partial.is_object() {
            return Err(SettingsError::NotAnObject);
        }

        let mut base = Value::Object(self.to_map()?);
        merge_values(&mut base, partial);
        serde_json::from_value(base).map_err(|e| SettingsError::InvalidValue {
            name: None,
            message: e.to_string(),
        })
    }

    /// Builds settings from a complete or partial object; missing names take defaults.
    ///
    /// # Errors
    /// Returns an error if `value` does not describe valid settings.
    pub fn from_value(value: Value) -> Result<Settings, SettingsError> {
        if !value.is_object() {
            return Err(SettingsError::NotAnObject);
        }
        serde_json::from_value(value).map_err(|e| SettingsError::InvalidValue {
            name: None,
            message: e.to_string(),
        })
    }

    /// Returns the settings as a JSON object keyed by public name.
    pub fn to_value(&self) -> Value {
        self.to_map().map_or(Value::Null, Value::Object)
    }

    fn to_map(&self) -> Result<Map<String, Value>, SettingsError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SettingsError::NotAnObject),
            Err(e) => Err(SettingsError::InvalidValue {
                name: None,
                message: e.to_string(),
            }),
        }
    }
}

/// Recursively merges `source` into `target`.
///
/// Objects merge key by key; any other value in `source` replaces the target value.
fn merge_values(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_values(existing, value);
                    }
                    _ => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Errors raised when changing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// No setting with this name exists.
    UnknownSetting(String),
    /// The value could not be stored in the setting.
    InvalidValue {
        name: Option<String>,
        message: String,
    },
    /// A settings object was expected.
    NotAnObject,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::UnknownSetting(name) => write!(f, "Unknown setting \"{name}\""),
            SettingsError::InvalidValue {
                name: Some(name),
                message,
            } => write!(f, "Invalid value for setting \"{name}\": {message}"),
            SettingsError::InvalidValue {
                name: None,
                message,
            } => write!(f, "Invalid settings: {message}"),
            SettingsError::NotAnObject => write!(f, "Settings must be a JSON object"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Serde helpers for durations exchanged as whole milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    /// Accepts an integer or a numeric string (`"1500"`).
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum MillisOrString {
            Millis(u64),
            String(String),
        }

        match MillisOrString::deserialize(deserializer)? {
            MillisOrString::Millis(ms) => Ok(Duration::from_millis(ms)),
            MillisOrString::String(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| {
                    de::Error::custom(format!("expected milliseconds, got '{raw}': {e}"))
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_get_returns_public_names_in_millis() {
        let settings = Settings::default();
        assert_eq!(settings.get("interval"), Some(json!(15000)));
        assert_eq!(settings.get("format"), Some(json!("+++ %s +++ (%s)")));
        assert_eq!(settings.get("showLinks"), Some(json!(true)));
    }

    #[test]
    fn test_get_unknown_name_is_none() {
        let settings = Settings::default();
        assert_eq!(settings.get("nope"), None);
        assert_eq!(settings.get("_tickers"), None);
    }

    #[test]
    fn test_with_value_replaces_single_field() {
        let settings = Settings::default();
        let updated = settings.with_value("interval", json!(5000)).unwrap();

        assert_eq!(updated.interval, Duration::from_secs(5));
        assert_eq!(updated.format, settings.format);
        assert_eq!(settings.interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn test_with_value_accepts_numeric_strings_for_durations() {
        let updated = Settings::default()
            .with_value("fadeInTime", json!("250"))
            .unwrap();
        assert_eq!(updated.fade_in_time, Duration::from_millis(250));
    }

    #[test]
    fn test_with_value_rejects_unknown_name() {
        let err = Settings::default()
            .with_value("colour", json!("red"))
            .unwrap_err();
        assert_eq!(err, SettingsError::UnknownSetting("colour".to_string()));
    }

    #[test]
    fn test_with_value_rejects_wrong_type() {
        let err = Settings::default()
            .with_value("showLinks", json!("maybe"))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue { name: Some(ref n), .. } if n == "showLinks"
        ));
    }

    #[test]
    fn test_merged_keeps_unmentioned_fields() {
        let base = Settings {
            format: "%s / %s".to_string(),
            ..Default::default()
        };
        let merged = base
            .merged(&json!({"interval": 2000, "showLinks": false}))
            .unwrap();

        assert_eq!(merged.interval, Duration::from_secs(2));
        assert!(!merged.show_links);
        assert_eq!(merged.format, "%s / %s");
    }

    #[test]
    fn test_merged_rejects_non_object() {
        let err = Settings::default().merged(&json!([1, 2])).unwrap_err();
        assert_eq!(err, SettingsError::NotAnObject);
    }

    #[test]
    fn test_merged_rejects_unknown_names() {
        let result = Settings::default().merged(&json!({"speed": 3}));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_values_is_deep() {
        let mut target = json!({"a": {"x": 1, "y": 2}, "b": 1});
        merge_values(&mut target, &json!({"a": {"y": 3}, "c": 4}));
        assert_eq!(target, json!({"a": {"x": 1, "y": 3}, "b": 1, "c": 4}));
    }

    #[test]
    fn test_from_value_fills_defaults() {
        let settings = Settings::from_value(json!({"tickerUrl": "http://localhost/t"})).unwrap();
        assert_eq!(settings.ticker_url, "http://localhost/t");
        assert_eq!(settings.interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn test_to_value_lists_every_name() {
        let value = Settings::default().to_value();
        let map = value.as_object().unwrap();
        for name in Settings::NAMES {
            assert!(map.contains_key(*name), "missing {name}");
        }
        assert_eq!(map.len(), Settings::NAMES.len());
    }
}
