//! Engine options.
//!
//! The host's option form is modelled as a plain struct. Options are read
//! through named accessors that apply the documented defaults, and written
//! either wholesale (env, YAML) or one at a time via [`EngineOptions::update`].

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TARGET_LANGUAGE: &str = "English - US";

pub const OPTION_NAMES: [&str; 4] = ["api_key", "target_language", "api_type", "timeout"];

/// Provider account tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    #[default]
    Free,
    Pro,
}

impl ApiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiType::Free => "free",
            ApiType::Pro => "pro",
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(ApiType::Free),
            "pro" => Ok(ApiType::Pro),
            other => Err(Error::validation_with_context(
                "api_type must be \"free\" or \"pro\"",
                ErrorContext::new()
                    .with_field_path("api_type")
                    .with_details(format!("got {:?}", other)),
            )),
        }
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_type: Option<ApiType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<f64>,
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("target_language", &self.target_language)
            .field("api_type", &self.api_type)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from `ENGINE_API_KEY`, `ENGINE_TARGET_LANGUAGE`,
    /// `ENGINE_API_TYPE` and `ENGINE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::new();
        options.api_key = lookup("ENGINE_API_KEY").filter(|s| !s.is_empty());
        options.target_language = lookup("ENGINE_TARGET_LANGUAGE").filter(|s| !s.is_empty());
        if let Some(api_type) = lookup("ENGINE_API_TYPE") {
            options.api_type = Some(api_type.parse()?);
        }
        if let Some(timeout) = lookup("ENGINE_TIMEOUT_SECS") {
            let secs = timeout.trim().parse::<f64>().map_err(|e| {
                Error::configuration_with_context(
                    "ENGINE_TIMEOUT_SECS is not a number",
                    ErrorContext::new()
                        .with_field_path("timeout")
                        .with_details(e.to_string()),
                )
            })?;
            options.timeout = Some(validate_timeout(secs)?);
        }
        Ok(options)
    }

    pub fn from_yaml_str(doc: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(doc)?;
        if let Some(secs) = options.timeout {
            validate_timeout(secs)?;
        }
        Ok(options)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }

    pub fn with_api_type(mut self, api_type: ApiType) -> Self {
        self.api_type = Some(api_type);
        self
    }

    pub fn with_timeout(mut self, secs: f64) -> Self {
        self.timeout = Some(secs);
        self
    }

    /// Configured key, `None` when absent or empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn target_language(&self) -> &str {
        self.target_language
            .as_deref()
            .unwrap_or(DEFAULT_TARGET_LANGUAGE)
    }

    pub fn api_type(&self) -> ApiType {
        self.api_type.unwrap_or_default()
    }

    /// Request timeout in seconds; `0` disables it.
    pub fn timeout(&self) -> f64 {
        self.timeout.unwrap_or(0.0)
    }

    /// Look an option up by name, defaults applied.
    pub fn get(&self, name: &str) -> Result<Value> {
        let value = match name {
            "api_key" => self.api_key().map(Value::from).unwrap_or(Value::Null),
            "target_language" => Value::from(self.target_language()),
            "api_type" => Value::from(self.api_type().as_str()),
            "timeout" => Value::from(self.timeout()),
            other => return Err(unknown_option(other)),
        };
        Ok(value)
    }

    /// Write one option by name. `null` resets it to its default.
    pub fn update(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "api_key" => self.api_key = optional_string(name, value)?,
            "target_language" => self.target_language = optional_string(name, value)?,
            "api_type" => {
                self.api_type = optional_string(name, value)?
                    .map(|s| s.parse())
                    .transpose()?;
            }
            "timeout" => {
                self.timeout = match value {
                    Value::Null => None,
                    Value::Number(n) => n.as_f64().map(validate_timeout).transpose()?,
                    Value::String(s) => Some(validate_timeout(s.trim().parse().map_err(|_| {
                        wrong_type(name, "a number of seconds", &Value::String(s.clone()))
                    })?)?),
                    other => return Err(wrong_type(name, "a number of seconds", &other)),
                };
            }
            other => return Err(unknown_option(other)),
        }
        tracing::debug!(option = name, "engine option updated");
        Ok(())
    }
}

fn validate_timeout(secs: f64) -> Result<f64> {
    if secs >= 0.0 && Duration::try_from_secs_f64(secs).is_ok() {
        Ok(secs)
    } else {
        Err(Error::validation_with_context(
            "timeout must be a non-negative, representable number of seconds",
            ErrorContext::new()
                .with_field_path("timeout")
                .with_details(format!("got {}", secs)),
        ))
    }
}

fn optional_string(name: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(wrong_type(name, "a string", &other)),
    }
}

fn wrong_type(name: &str, expected: &str, got: &Value) -> Error {
    Error::validation_with_context(
        format!("option {} must be {}", name, expected),
        ErrorContext::new()
            .with_field_path(name)
            .with_details(format!("got {}", got)),
    )
}

fn unknown_option(name: &str) -> Error {
    Error::validation_with_context(
        format!("unknown option {:?}", name),
        ErrorContext::new()
            .with_field_path(name)
            .with_details(format!("known options: {}", OPTION_NAMES.join(", "))),
    )
}
