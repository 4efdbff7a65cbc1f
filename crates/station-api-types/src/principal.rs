use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text form of the anonymous principal.
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

const GROUP_LEN: usize = 5;
const MAX_TEXT_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCanisterIdError {
    #[error("canister id cannot be empty")]
    Empty,
    #[error("canister id is longer than {MAX_TEXT_LEN} characters")]
    TooLong,
    #[error("invalid character {0:?} in canister id")]
    InvalidChar(char),
    #[error("malformed group {0:?} in canister id")]
    MalformedGroup(String),
}

/// Identifier of a wallet canister, kept in its textual principal form.
///
/// The textual form is lowercase base32 split into dash-separated groups of
/// five characters, the last group holding the remainder. Checksums are not
/// verified here; the remote service rejects ids it does not know.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanisterId(String);

impl CanisterId {
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL.to_owned())
    }

    pub fn parse(text: &str) -> Result<Self, ParseCanisterIdError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseCanisterIdError::Empty);
        }
        if text.len() > MAX_TEXT_LEN {
            return Err(ParseCanisterIdError::TooLong);
        }

        if let Some(bad) = text
            .chars()
            .find(|c| *c != '-' && !matches!(c, 'a'..='z' | '2'..='7'))
        {
            return Err(ParseCanisterIdError::InvalidChar(bad));
        }

        let groups: Vec<&str> = text.split('-').collect();
        let last = groups.len() - 1;
        for (index, group) in groups.iter().enumerate() {
            let valid = if index == last {
                (1..=GROUP_LEN).contains(&group.len())
            } else {
                group.len() == GROUP_LEN
            };
            if !valid {
                return Err(ParseCanisterIdError::MalformedGroup((*group).to_owned()));
            }
        }

        Ok(Self(text.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL
    }
}

impl Default for CanisterId {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Display for CanisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CanisterId {
    type Err = ParseCanisterIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for CanisterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
