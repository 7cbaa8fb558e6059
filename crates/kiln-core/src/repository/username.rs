use std::sync::LazyLock;

use regex::Regex;
use serde::{de::Visitor, Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Debug, PartialEq, Eq, Clone)]
pub struct Username(String);

impl Default for Username {
    fn default() -> Self {
        Self(String::from("Player"))
    }
}

struct UsernameVisitor;

impl<'de> Visitor<'de> for UsernameVisitor {
    type Value = Username;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Username::new(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(UsernameVisitor)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid username `{0}`: use 3 to 16 characters from A-Z, a-z, 0-9 and `_`")]
    InvalidUsername(String),
}

impl Username {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            // PANICS: This will never panic because the pattern is valid.
            Regex::new(r"^[a-zA-Z0-9_]{3,16}$").unwrap()
        });

        let s = s.into();
        if REGEX.is_match(&s) {
            Ok(Username(s))
        } else {
            Err(ValidationError::InvalidUsername(s))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}
