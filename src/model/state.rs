// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Conversation states and the keys derived from them.
//!
//! A state renders as `group(.subgroup)*:leaf`. History entries and capture snapshots are
//! keyed by [`StateKey`], which is a state plus an optional decimal version suffix used by
//! the repeatable edit leaf (`conversation.user_edit:edited0`, `...edited1`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::filter::ContentFilter;

/// Closed set of conversation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StateName {
    WaitingForInput,
    ResultReview,
    EditMenuFirst,
    EditMenuContinuing,
    FilterMenuFirst,
    FilterMenuContinuing,
    ReApprove,
    FilterApplied(ContentFilter),
    EditAwaitingInput,
    Edited,
    RedirectReview,
    Confirmed,
    Posting,
    Error,
    SpecialContentError,
}

/// Which menu a group switch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    Edit,
    Filters,
}

impl StateName {
    pub const ALL: [StateName; 17] = [
        Self::WaitingForInput,
        Self::ResultReview,
        Self::EditMenuFirst,
        Self::EditMenuContinuing,
        Self::FilterMenuFirst,
        Self::FilterMenuContinuing,
        Self::ReApprove,
        Self::FilterApplied(ContentFilter::Partial),
        Self::FilterApplied(ContentFilter::Absolute),
        Self::FilterApplied(ContentFilter::AnalIgnore),
        Self::EditAwaitingInput,
        Self::Edited,
        Self::RedirectReview,
        Self::Confirmed,
        Self::Posting,
        Self::Error,
        Self::SpecialContentError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaitingForInput => "conversation:waiting_for_input",
            Self::ResultReview => "conversation:result_review",
            Self::EditMenuFirst => "conversation.edit_menu:menu",
            Self::FilterMenuFirst => "conversation.edit_menu:filters",
            Self::EditMenuContinuing => "conversation.edit_menu.continuing:menu",
            Self::FilterMenuContinuing => "conversation.edit_menu.continuing:filters",
            Self::ReApprove => "conversation.edit_menu.continuing:re_approve",
            Self::FilterApplied(ContentFilter::Partial) => "conversation.filter:partial",
            Self::FilterApplied(ContentFilter::Absolute) => "conversation.filter:absolute",
            Self::FilterApplied(ContentFilter::AnalIgnore) => "conversation.filter:anal_ignore",
            Self::EditAwaitingInput => "conversation.user_edit:awaiting_input",
            Self::Edited => "conversation.user_edit:edited",
            Self::RedirectReview => "conversation.redirect:result_review",
            Self::Confirmed => "conversation:confirmed",
            Self::Posting => "conversation:posting",
            Self::Error => "conversation.error:raised",
            Self::SpecialContentError => "conversation.error:special_content",
        }
    }

    /// The `group(.subgroup)*` part before the leaf.
    pub fn group(self) -> &'static str {
        let name = self.as_str();
        name.split_once(':').map_or(name, |(group, _)| group)
    }

    pub fn leaf(self) -> &'static str {
        let name = self.as_str();
        name.split_once(':').map_or(name, |(_, leaf)| leaf)
    }

    /// Whether re-entering this state must produce a new versioned key.
    pub fn is_repeatable(self) -> bool {
        matches!(self, Self::Edited)
    }

    pub fn is_forced_redirect_leaf(self) -> bool {
        matches!(self, Self::RedirectReview)
    }

    pub fn is_edit_menu(self) -> bool {
        matches!(self, Self::EditMenuFirst | Self::EditMenuContinuing)
    }

    pub fn is_filter_menu(self) -> bool {
        matches!(self, Self::FilterMenuFirst | Self::FilterMenuContinuing)
    }

    /// The first-time or continuing variant of a menu.
    pub fn menu(kind: MenuKind, continuing: bool) -> Self {
        match (kind, continuing) {
            (MenuKind::Edit, false) => Self::EditMenuFirst,
            (MenuKind::Edit, true) => Self::EditMenuContinuing,
            (MenuKind::Filters, false) => Self::FilterMenuFirst,
            (MenuKind::Filters, true) => Self::FilterMenuContinuing,
        }
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown state `{0}`")]
pub struct ParseStateError(pub String);

impl FromStr for StateName {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseStateError(s.to_owned()))
    }
}

impl TryFrom<String> for StateName {
    type Error = ParseStateError;

    fn try_from(value: String) -> Result<Self, ParseStateError> {
        value.parse()
    }
}

impl From<StateName> for String {
    fn from(value: StateName) -> Self {
        value.as_str().to_owned()
    }
}

/// A state name as recorded in history and used as a snapshot key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateKey {
    state: StateName,
    version: Option<u32>,
}

impl StateKey {
    pub fn plain(state: StateName) -> Self {
        Self { state, version: None }
    }

    pub fn versioned(state: StateName, version: u32) -> Self {
        Self { state, version: Some(version) }
    }

    pub fn state(&self) -> StateName {
        self.state
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }
}

impl From<StateName> for StateKey {
    fn from(state: StateName) -> Self {
        Self::plain(state)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(version) => write!(f, "{}{version}", self.state),
            None => f.write_str(self.state.as_str()),
        }
    }
}

impl FromStr for StateKey {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(state) = s.parse::<StateName>() {
            return Ok(Self::plain(state));
        }

        StateName::ALL
            .into_iter()
            .filter(|state| state.is_repeatable())
            .find_map(|state| {
                let digits = s.strip_prefix(state.as_str())?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse().ok().map(|version| Self::versioned(state, version))
            })
            .ok_or_else(|| ParseStateError(s.to_owned()))
    }
}

impl TryFrom<String> for StateKey {
    type Error = ParseStateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StateKey> for String {
    fn from(value: StateKey) -> Self {
        value.to_string()
    }
}
