// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Content rating tags, in the order they are looked up in user input.
pub const CONTENT_RATING_TAGS: [&str; 3] = ["#ecchi", "#nude", "#sfw"];

const DEFAULT_RATING_TAG: &str = "#ecchi";
const UNKNOWN_ARTIST: &str = "???";

/// The structured description proposed for a media item.
///
/// Every field is either null (never produced) or an ordered list of hashtags. The *null
/// capture* has all four fields null and stands in before the first real result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    fandom: Option<Vec<String>>,
    character: Option<Vec<String>>,
    artist: Option<Vec<String>>,
    tags: Option<Vec<String>>,
}

impl Capture {
    pub fn null() -> Self {
        Self::default()
    }

    pub fn new(
        fandom: Option<Vec<String>>,
        character: Option<Vec<String>>,
        artist: Option<Vec<String>>,
        tags: Option<Vec<String>>,
    ) -> Self {
        Self { fandom, character, artist, tags }
    }

    pub fn with_tags(tags: Vec<String>) -> Self {
        Self { tags: Some(tags), ..Self::default() }
    }

    pub fn is_null(&self) -> bool {
        self.fandom.is_none()
            && self.character.is_none()
            && self.artist.is_none()
            && self.tags.is_none()
    }

    pub fn fandom(&self) -> Option<&[String]> {
        self.fandom.as_deref()
    }

    pub fn character(&self) -> Option<&[String]> {
        self.character.as_deref()
    }

    pub fn artist(&self) -> Option<&[String]> {
        self.artist.as_deref()
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    /// Common tags as they appear in a caption.
    ///
    /// `#swimsuit` is dropped next to `#bikini`, and a content rating tag always leads
    /// (`#ecchi` when none is present).
    pub fn display_tags(&self) -> Vec<&str> {
        let tags = self.tags.as_deref().unwrap_or_default();
        let has_bikini = tags.iter().any(|tag| tag == "#bikini");

        let mut out = tags
            .iter()
            .map(String::as_str)
            .filter(|tag| !(has_bikini && *tag == "#swimsuit"))
            .collect::<Vec<_>>();

        if !out.iter().any(|tag| is_content_rating_tag(tag)) {
            out.insert(0, DEFAULT_RATING_TAG);
        }
        out.sort_by_key(|tag| !is_content_rating_tag(tag));
        out
    }

    /// Renders the capture as a post caption.
    pub fn caption(&self) -> String {
        let mut head = Vec::new();
        for field in [&self.fandom, &self.character] {
            if let Some(values) = field.as_deref().filter(|values| !values.is_empty()) {
                head.push(values.join(" "));
            }
        }
        head.push(self.display_tags().join(" "));

        let artist = match self.artist.as_deref() {
            Some(artists) if !artists.is_empty() => artists.join(" "),
            _ => UNKNOWN_ARTIST.to_owned(),
        };

        format!("{}\nBy: {artist}", head.join(" ").trim())
    }

    /// Applies a free-text user edit and returns the edited capture.
    ///
    /// Hashtags toggle: one already in the capture is removed, a new one is added
    /// (capitalised ones go to the fandom, lowercase ones to the common tags). Words after a
    /// `By:` marker toggle artists. A content rating tag replaces the current rating.
    pub fn apply_user_edit(&self, input: &str) -> Capture {
        let mut edited = self.clone();
        let mut rest = input.to_owned();

        if let Some(rating) = CONTENT_RATING_TAGS.into_iter().find(|tag| input.contains(tag)) {
            let tags = edited.tags.get_or_insert_with(Vec::new);
            tags.retain(|tag| !is_content_rating_tag(tag));
            tags.insert(0, rating.to_owned());
            rest = rest.replacen(rating, "", 1);
        }

        let mut after_marker = false;
        for word in rest.split_whitespace() {
            if is_artist_marker(word) {
                after_marker = true;
                continue;
            }
            if after_marker {
                toggle(&mut edited.artist, word);
                continue;
            }
            if !is_hashtag(word) {
                continue;
            }
            if word.chars().nth(1).is_some_and(char::is_lowercase) {
                toggle(&mut edited.tags, word);
            } else if contains(&edited.character, word) {
                toggle(&mut edited.character, word);
            } else {
                toggle(&mut edited.fandom, word);
            }
        }

        edited
    }
}

pub fn is_content_rating_tag(tag: &str) -> bool {
    CONTENT_RATING_TAGS.contains(&tag)
}

fn is_artist_marker(word: &str) -> bool {
    matches!(word, "By:" | "By" | "by:")
}

fn is_hashtag(word: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^#[\p{L}\p{N}_]+$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(word))
}

fn contains(field: &Option<Vec<String>>, value: &str) -> bool {
    field.as_deref().is_some_and(|values| values.iter().any(|v| v == value))
}

fn toggle(field: &mut Option<Vec<String>>, value: &str) {
    let values = field.get_or_insert_with(Vec::new);
    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
    } else {
        values.push(value.to_owned());
    }
}
