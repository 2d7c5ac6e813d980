// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Producing captures from search evidence.
//!
//! The scraping and reverse-image-search pipeline lives outside this crate; it hands over
//! [`RawEvidence`] and a [`CaptureSource`] turns that into a [`Capture`], applying the content
//! verdict for the active filter.

use thiserror::Error;
use tracing::debug;

use crate::model::{Capture, ContentFilter, RawEvidence};

/// Failures the user is told about. The conversation is parked in an error state; nothing
/// staged during the failing event is committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("media contains restricted tags: {}", tags.join(", "))]
    Restricted { tags: Vec<String> },
    #[error("search found nothing usable")]
    SearchFailed,
    #[error("media contains special content: {}", tags.join(", "))]
    SpecialContent { tags: Vec<String> },
    #[error("search results could not be parsed: {0}")]
    Unparsable(String),
}

impl DomainError {
    /// Whether the error belongs to the special-content branch of the workflow.
    pub fn is_special_content(&self) -> bool {
        matches!(self, Self::SpecialContent { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    #[default]
    Primary,
    /// Fallback search over similar images, used when the primary search finds nothing or the
    /// user forces a redirect.
    Redirect,
}

#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest<'a> {
    pub evidence: &'a RawEvidence,
    pub filter: Option<ContentFilter>,
    pub mode: SearchMode,
    pub sfw: bool,
}

impl<'a> CaptureRequest<'a> {
    pub fn new(evidence: &'a RawEvidence) -> Self {
        Self { evidence, filter: None, mode: SearchMode::Primary, sfw: false }
    }

    pub fn with_filter(mut self, filter: ContentFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_sfw(mut self, sfw: bool) -> Self {
        self.sfw = sfw;
        self
    }
}

pub trait CaptureSource: Send + Sync {
    fn produce_capture(&self, request: CaptureRequest<'_>) -> Result<Capture, DomainError>;
}

/// Builds captures straight from pre-categorised evidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceSource;

impl EvidenceSource {
    pub fn new() -> Self {
        Self
    }

    fn check_verdict(request: &CaptureRequest<'_>) -> Result<(), DomainError> {
        let evidence = request.evidence;
        let ignores_restricted = request.filter.is_some_and(ContentFilter::ignores_restricted);
        let ignores_special = request.filter.is_some_and(ContentFilter::ignores_special);

        if !evidence.restricted.is_empty() && !ignores_restricted {
            return Err(DomainError::Restricted { tags: hashtags(&evidence.restricted) });
        }
        if !evidence.special.is_empty() && !ignores_special {
            return Err(DomainError::SpecialContent { tags: hashtags(&evidence.special) });
        }
        Ok(())
    }
}

impl CaptureSource for EvidenceSource {
    fn produce_capture(&self, request: CaptureRequest<'_>) -> Result<Capture, DomainError> {
        Self::check_verdict(&request)?;
        let evidence = request.evidence;

        let mut capture = match request.mode {
            SearchMode::Primary => {
                if evidence.tags.is_empty() && evidence.fandom.is_empty() {
                    return Err(DomainError::SearchFailed);
                }
                Capture::new(
                    Some(hashtags(&evidence.fandom)),
                    Some(hashtags(&evidence.character)),
                    Some(evidence.artist.clone()),
                    Some(hashtags(&evidence.tags)),
                )
            }
            SearchMode::Redirect => {
                if evidence.similar_tags.is_empty() {
                    return Err(DomainError::SearchFailed);
                }
                Capture::with_tags(hashtags(&evidence.similar_tags))
            }
        };

        if request.sfw {
            capture = capture.apply_user_edit("#sfw");
        }

        debug!(
            media = %evidence.media_id,
            mode = ?request.mode,
            filter = ?request.filter,
            "capture produced"
        );
        Ok(capture)
    }
}

/// `Blue Archive` becomes `#Blue_Archive`; names already starting with `#` are kept.
pub fn hashtag(name: &str) -> String {
    let name = name.trim();
    let body = name.strip_prefix('#').unwrap_or(name);
    format!("#{}", body.replace(char::is_whitespace, "_"))
}

fn hashtags(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for tag in names.iter().map(|name| hashtag(name)) {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
