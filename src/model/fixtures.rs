// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::capture::Capture;
use super::evidence::RawEvidence;
use super::ids::SessionId;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

pub(crate) fn sid(value: &str) -> SessionId {
    SessionId::new(value).expect("session id")
}

/// A capture whose tags differ per `n`, so snapshots are easy to tell apart.
pub(crate) fn numbered_capture(n: usize) -> Capture {
    Capture::with_tags(vec![format!("#tag{n}")])
}

pub(crate) fn beach_evidence() -> RawEvidence {
    RawEvidence {
        media_id: "media-1".to_owned(),
        fandom: strings(&["Genshin Impact"]),
        character: strings(&["Lumine"]),
        artist: strings(&["some_artist"]),
        tags: strings(&["bikini", "beach"]),
        restricted: Vec::new(),
        special: Vec::new(),
        similar_tags: strings(&["sea", "sand"]),
    }
}

/// Evidence the default filter rejects; `partial` or `absolute` lets it through.
pub(crate) fn restricted_evidence() -> RawEvidence {
    RawEvidence { restricted: strings(&["blood"]), ..beach_evidence() }
}
