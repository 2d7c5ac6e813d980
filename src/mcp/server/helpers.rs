// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

fn parse_session_id(raw: String) -> Result<SessionId, ErrorData> {
    SessionId::new(raw.clone()).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid session_id: {err}"),
            Some(serde_json::json!({ "session_id": raw })),
        )
    })
}

fn store_error(err: StoreError) -> ErrorData {
    ErrorData::internal_error(format!("session store failed: {err}"), None)
}

fn op_error(err: OpError) -> ErrorData {
    let message = err.to_string();
    match err {
        OpError::InvalidTransition { op, state } => {
            let allowed = allowed_ops(state).into_iter().map(OpKind::as_str).collect::<Vec<_>>();
            ErrorData::invalid_request(
                message,
                Some(serde_json::json!({
                    "op": op.as_str(),
                    "state": state.as_str(),
                    "allowed_ops": allowed,
                })),
            )
        }
        OpError::FilterUnavailable { filter } => ErrorData::invalid_params(
            message,
            Some(serde_json::json!({ "filter": filter.as_str() })),
        ),
        OpError::Engine(EngineError::HistoryTooShort { len, required }) => {
            ErrorData::invalid_request(
                message,
                Some(serde_json::json!({ "history_len": len, "required": required })),
            )
        }
        OpError::Engine(_) => ErrorData::internal_error(message, None),
        OpError::Domain(_) => ErrorData::invalid_request(message, None),
    }
}

fn op_from_mcp(op: McpOp) -> Result<Op, ErrorData> {
    Ok(match op {
        McpOp::Submit { evidence } => Op::Submit { evidence: evidence_from_mcp(evidence) },
        McpOp::OpenEditMenu => Op::OpenEditMenu,
        McpOp::OpenFilterMenu => Op::OpenFilterMenu,
        McpOp::ApplyFilter { filter } => {
            let filter = filter.parse::<ContentFilter>().map_err(|err| {
                ErrorData::invalid_params(
                    err.to_string(),
                    Some(serde_json::json!({
                        "expected": ContentFilter::ALL.map(ContentFilter::as_str),
                    })),
                )
            })?;
            Op::ApplyFilter { filter }
        }
        McpOp::BeginEdit { message_id } => Op::BeginEdit { message_id },
        McpOp::SubmitEdit { text, message_id } => {
            if text.trim().is_empty() {
                return Err(ErrorData::invalid_params("edit text must not be empty", None));
            }
            Op::SubmitEdit { text, message_id }
        }
        McpOp::ForceRedirect => Op::ForceRedirect,
        McpOp::Back => Op::Back,
        McpOp::StepBack => Op::StepBack,
        McpOp::Confirm => Op::Confirm,
        McpOp::Post => Op::Post,
        McpOp::Cancel => Op::Cancel,
        McpOp::ToggleFlag { flag } => Op::ToggleFlag {
            flag: match flag {
                McpFlag::Sfw => SessionFlag::Sfw,
                McpFlag::SpecialContent => SessionFlag::SpecialContent,
            },
        },
        McpOp::AcknowledgeError => Op::AcknowledgeError,
    })
}

fn evidence_from_mcp(evidence: McpEvidence) -> RawEvidence {
    RawEvidence {
        media_id: evidence.media_id,
        fandom: evidence.fandom,
        character: evidence.character,
        artist: evidence.artist,
        tags: evidence.tags,
        restricted: evidence.restricted,
        special: evidence.special,
        similar_tags: evidence.similar_tags,
    }
}

fn capture_to_mcp(capture: &Capture) -> McpCapture {
    McpCapture {
        fandom: capture.fandom().map(<[String]>::to_vec),
        character: capture.character().map(<[String]>::to_vec),
        artist: capture.artist().map(<[String]>::to_vec),
        tags: capture.tags().map(<[String]>::to_vec),
    }
}

fn history_of(session: &Session) -> &[StateKey] {
    session.data().get(&StoreKey::History).and_then(StoreValue::as_history).unwrap_or_default()
}

fn read_response(session: &Session) -> SessionReadResponse {
    let data = session.data();
    let history = history_of(session);
    let capture = data.get(&StoreKey::CurrentCapture).and_then(StoreValue::as_capture);
    let available_filters = data
        .get(&StoreKey::AvailableFilters)
        .and_then(StoreValue::as_filters)
        .map(|record| record.iter().map(|filter| filter.as_str().to_owned()).collect())
        .unwrap_or_default();

    SessionReadResponse {
        session_id: session.session_id().as_str().to_owned(),
        state: session.state().to_string(),
        completed_steps: history.len() as u64,
        history: history.iter().map(ToString::to_string).collect(),
        capture: capture.map(capture_to_mcp),
        caption: capture.filter(|capture| !capture.is_null()).map(Capture::caption),
        available_filters,
        flags: McpFlags {
            sfw: session.flag(SessionFlag::Sfw),
            special_content: session.flag(SessionFlag::SpecialContent),
        },
        allowed_ops: allowed_ops(session.state())
            .into_iter()
            .map(|kind| kind.as_str().to_owned())
            .collect(),
    }
}

fn apply_response(outcome: OpOutcome) -> SessionApplyResponse {
    SessionApplyResponse {
        state: outcome.state.to_string(),
        completed_steps: outcome.completed_steps as u64,
        capture: outcome.capture.as_ref().map(capture_to_mcp),
        caption: outcome.caption,
        message_id: outcome.message_id,
        flag: outcome.flag,
        notice: outcome.notice,
    }
}
