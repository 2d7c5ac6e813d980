// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The per-session key/value mapping that the store persists.
//!
//! Keys form a closed set; each key determines the shape of its value, which is how the JSON
//! form is decoded without type tags.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::capture::Capture;
use super::evidence::RawEvidence;
use super::filter::FilterRecord;
use super::state::{ParseStateError, StateKey};

/// Flags that survive a reset of the session data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionFlag {
    Sfw,
    SpecialContent,
}

impl SessionFlag {
    pub const ALL: [SessionFlag; 2] = [Self::Sfw, Self::SpecialContent];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sfw => "sfw_flag",
            Self::SpecialContent => "special_content_flag",
        }
    }

    /// Store keys that a flush keeps.
    pub fn persistent_keys() -> [StoreKey; 2] {
        Self::ALL.map(StoreKey::Flag)
    }
}

impl fmt::Display for SessionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKey {
    CurrentCapture,
    History,
    Flag(SessionFlag),
    RedirectionFlag,
    AvailableFilters,
    RawEvidence,
    PromptMessageId,
    Snapshot(StateKey),
}

impl StoreKey {
    fn fixed_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::CurrentCapture => "current_capture",
            Self::History => "history",
            Self::Flag(flag) => flag.as_str(),
            Self::RedirectionFlag => "redirection_flag",
            Self::AvailableFilters => "available_filters",
            Self::RawEvidence => "raw_evidence",
            Self::PromptMessageId => "prompt_message_id",
            Self::Snapshot(_) => return None,
        })
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot(key) => write!(f, "{key}"),
            other => f.write_str(other.fixed_name().unwrap_or_default()),
        }
    }
}

impl FromStr for StoreKey {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "current_capture" => Self::CurrentCapture,
            "history" => Self::History,
            "sfw_flag" => Self::Flag(SessionFlag::Sfw),
            "special_content_flag" => Self::Flag(SessionFlag::SpecialContent),
            "redirection_flag" => Self::RedirectionFlag,
            "available_filters" => Self::AvailableFilters,
            "raw_evidence" => Self::RawEvidence,
            "prompt_message_id" => Self::PromptMessageId,
            other => Self::Snapshot(other.parse()?),
        })
    }
}

/// A capture stored under the state key that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    capture: Capture,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Capture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_id: Option<i64>,
}

impl Snapshot {
    pub fn new(capture: Capture) -> Self {
        Self { capture, input: None, message_id: None }
    }

    /// A snapshot of a user edit: the edited capture, the capture it was edited from, and the
    /// chat message that showed the result.
    pub fn edited(capture: Capture, input: Capture, message_id: Option<i64>) -> Self {
        Self { capture, input: Some(input), message_id }
    }

    pub fn capture(&self) -> &Capture {
        &self.capture
    }

    pub fn input(&self) -> Option<&Capture> {
        self.input.as_ref()
    }

    pub fn message_id(&self) -> Option<i64> {
        self.message_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StoreValue {
    Capture(Capture),
    History(Vec<StateKey>),
    Bool(bool),
    Filters(FilterRecord),
    Evidence(RawEvidence),
    MessageId(i64),
    Snapshot(Snapshot),
}

impl StoreValue {
    /// Decodes a JSON value into the shape `key` holds.
    pub fn decode(key: &StoreKey, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match key {
            StoreKey::CurrentCapture => Self::Capture(serde_json::from_value(value)?),
            StoreKey::History => Self::History(serde_json::from_value(value)?),
            StoreKey::Flag(_) | StoreKey::RedirectionFlag => {
                Self::Bool(serde_json::from_value(value)?)
            }
            StoreKey::AvailableFilters => Self::Filters(serde_json::from_value(value)?),
            StoreKey::RawEvidence => Self::Evidence(serde_json::from_value(value)?),
            StoreKey::PromptMessageId => Self::MessageId(serde_json::from_value(value)?),
            StoreKey::Snapshot(_) => Self::Snapshot(serde_json::from_value(value)?),
        })
    }

    pub fn as_capture(&self) -> Option<&Capture> {
        match self {
            Self::Capture(capture) => Some(capture),
            _ => None,
        }
    }

    pub fn as_history(&self) -> Option<&[StateKey]> {
        match self {
            Self::History(history) => Some(history),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_filters(&self) -> Option<&FilterRecord> {
        match self {
            Self::Filters(filters) => Some(filters),
            _ => None,
        }
    }

    pub fn as_evidence(&self) -> Option<&RawEvidence> {
        match self {
            Self::Evidence(evidence) => Some(evidence),
            _ => None,
        }
    }

    pub fn as_message_id(&self) -> Option<i64> {
        match self {
            Self::MessageId(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Persisted session data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    entries: BTreeMap<StoreKey, StoreValue>,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &StoreKey) -> Option<&StoreValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &StoreKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: StoreKey, value: StoreValue) -> Option<StoreValue> {
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: &StoreKey) -> Option<StoreValue> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StoreKey, &StoreValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(StoreKey, StoreValue)> for SessionData {
    fn from_iter<I: IntoIterator<Item = (StoreKey, StoreValue)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl Serialize for SessionData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SessionData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(raw_key, raw_value)| {
                let key = raw_key.parse::<StoreKey>().map_err(D::Error::custom)?;
                let value = StoreValue::decode(&key, raw_value)
                    .map_err(|err| D::Error::custom(format!("invalid value for `{key}`: {err}")))?;
                Ok((key, value))
            })
            .collect()
    }
}
