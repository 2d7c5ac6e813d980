// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Content filters a user can apply from the filter submenu.
///
/// Each filter has a fixed canonical position; the filter menu always lists the remaining
/// ones in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContentFilter {
    Partial,
    Absolute,
    AnalIgnore,
}

/// Not-yet-applied filters, kept in canonical order without duplicates.
pub type FilterRecord = SmallVec<[ContentFilter; 3]>;

impl ContentFilter {
    pub const ALL: [ContentFilter; 3] = [Self::Partial, Self::Absolute, Self::AnalIgnore];

    pub fn canonical_index(self) -> usize {
        match self {
            Self::Partial => 0,
            Self::Absolute => 1,
            Self::AnalIgnore => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Absolute => "absolute",
            Self::AnalIgnore => "anal_ignore",
        }
    }

    /// Button label shown in the filter submenu.
    pub fn label(self) -> &'static str {
        match self {
            Self::Partial => "Partial ignore",
            Self::Absolute => "Full ignore",
            Self::AnalIgnore => "Anal ignore",
        }
    }

    pub fn ignores_restricted(self) -> bool {
        matches!(self, Self::Partial | Self::Absolute)
    }

    pub fn ignores_special(self) -> bool {
        matches!(self, Self::Absolute | Self::AnalIgnore)
    }
}

impl fmt::Display for ContentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown content filter `{0}`")]
pub struct UnknownFilter(pub String);

impl FromStr for ContentFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| UnknownFilter(s.to_owned()))
    }
}

impl TryFrom<String> for ContentFilter {
    type Error = UnknownFilter;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentFilter> for String {
    fn from(value: ContentFilter) -> Self {
        value.as_str().to_owned()
    }
}
