// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// What the search pipeline found for a submitted media item.
///
/// The lists are already categorised by the scraper. `restricted` and `special` hold the
/// tags that matched the content blacklists; `similar_tags` are the tags of the fallback
/// similar-image search and are only used by a forced redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvidence {
    pub media_id: String,
    #[serde(default)]
    pub fandom: Vec<String>,
    #[serde(default)]
    pub character: Vec<String>,
    #[serde(default)]
    pub artist: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub restricted: Vec<String>,
    #[serde(default)]
    pub special: Vec<String>,
    #[serde(default)]
    pub similar_tags: Vec<String>,
}

impl RawEvidence {
    pub fn new(media_id: impl Into<String>) -> Self {
        Self { media_id: media_id.into(), ..Self::default() }
    }
}
