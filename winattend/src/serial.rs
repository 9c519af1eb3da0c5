//! Windows product keys.

use anyhow::bail;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr, sync::LazyLock};

/// A generic key that installs Windows 8.1 Pro without activating it.
///
/// https://technet.microsoft.com/en-us/library/jj612867.aspx
pub const DEFAULT_SERIAL_KEY: &str = "GCRJD-8NW9H-F2CDX-CCM8D-9D6T9";

/// How a product key is expected to look.
pub const EXAMPLE_ENCODING: &str = "AAAAA-BBBBB-CCCCC-DDDDD-EEEEE";

/// Five groups of five alphanumeric characters.
pub static SERIAL_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]{5}(-[A-Za-z0-9]{5}){4}$").expect("serial key pattern is valid")
});

/// Check whether the given product key has the right encoding.
pub fn valid_serial_key(key: &str) -> bool {
    SERIAL_KEY_PATTERN.is_match(key)
}

/// A product key that is known to have the right encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialKey(String);

impl SerialKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SerialKey {
    fn default() -> Self {
        Self(DEFAULT_SERIAL_KEY.to_string())
    }
}

impl FromStr for SerialKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !valid_serial_key(s) {
            bail!("Incorrect serial key encoding (expected {EXAMPLE_ENCODING})");
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for SerialKey {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SerialKey> for String {
    fn from(value: SerialKey) -> Self {
        value.0
    }
}

impl Display for SerialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
