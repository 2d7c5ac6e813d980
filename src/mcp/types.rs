// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionSummary {
    pub session_id: String,
    pub state: String,
    pub completed_steps: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionParams {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpCapture {
    pub fandom: Option<Vec<String>>,
    pub character: Option<Vec<String>>,
    pub artist: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpFlags {
    pub sfw: bool,
    pub special_content: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionReadResponse {
    pub session_id: String,
    pub state: String,
    pub completed_steps: u64,
    /// Visited state keys, oldest first (e.g. `conversation.user_edit:edited1`).
    pub history: Vec<String>,
    pub capture: Option<McpCapture>,
    pub caption: Option<String>,
    /// Filters not yet applied this round, in menu order.
    pub available_filters: Vec<String>,
    pub flags: McpFlags,
    /// Op types the current state admits.
    pub allowed_ops: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionDeleteResponse {
    pub session_id: String,
    pub deleted: bool,
}

/// Search evidence for a submitted media item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct McpEvidence {
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

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum McpFlag {
    Sfw,
    SpecialContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum McpOp {
    Submit {
        evidence: McpEvidence,
    },
    OpenEditMenu,
    OpenFilterMenu,
    ApplyFilter {
        /// One of `partial`, `absolute`, `anal_ignore`.
        filter: String,
    },
    BeginEdit {
        message_id: i64,
    },
    SubmitEdit {
        text: String,
        message_id: i64,
    },
    ForceRedirect,
    Back,
    StepBack,
    Confirm,
    Post,
    Cancel,
    ToggleFlag {
        flag: McpFlag,
    },
    AcknowledgeError,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionApplyParams {
    pub session_id: String,
    pub op: McpOp,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionApplyResponse {
    pub state: String,
    pub completed_steps: u64,
    pub capture: Option<McpCapture>,
    pub caption: Option<String>,
    /// Chat message to update in place.
    pub message_id: Option<i64>,
    /// New value of a toggled flag.
    pub flag: Option<bool>,
    /// Set when the session was parked in an error state.
    pub notice: Option<String>,
}
