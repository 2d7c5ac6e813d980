// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};

use crate::engine::EngineError;
use crate::model::{
    Capture, ContentFilter, RawEvidence, Session, SessionFlag, SessionId, StateKey, StoreKey,
    StoreValue,
};
use crate::ops::{allowed_ops, Op, OpError, OpKind, OpOutcome};
use crate::service::ConversationService;
use crate::store::StoreError;

use super::types::*;

#[derive(Clone)]
pub struct CaptureFlowMcp {
    service: Arc<ConversationService>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CaptureFlowMcp {
    pub fn new(service: Arc<ConversationService>) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// List stored sessions with their conversation state; start here, then call
    /// `session.read`.
    #[tool(name = "session.list")]
    async fn session_list(&self) -> Result<Json<ListSessionsResponse>, ErrorData> {
        let session_ids = self.service.list().map_err(store_error)?;

        let mut sessions = Vec::with_capacity(session_ids.len());
        for session_id in session_ids {
            let session = self.service.read(&session_id).await.map_err(store_error)?;
            sessions.push(SessionSummary {
                state: session.state().to_string(),
                completed_steps: history_of(&session).len() as u64,
                session_id: session_id.into_string(),
            });
        }

        Ok(Json(ListSessionsResponse { sessions }))
    }

    /// Read one session: state, history, current capture and caption, remaining filters,
    /// flags, and the op types its state admits. Unknown ids read as a fresh session.
    #[tool(name = "session.read")]
    async fn session_read(
        &self,
        params: Parameters<SessionParams>,
    ) -> Result<Json<SessionReadResponse>, ErrorData> {
        let session_id = parse_session_id(params.0.session_id)?;
        let session = self.service.read(&session_id).await.map_err(store_error)?;
        Ok(Json(read_response(&session)))
    }

    /// Apply one user event (`op.type`) to a session. Check `allowed_ops` from
    /// `session.read` first; search failures park the session and come back as `notice`.
    #[tool(name = "session.apply")]
    async fn session_apply(
        &self,
        params: Parameters<SessionApplyParams>,
    ) -> Result<Json<SessionApplyResponse>, ErrorData> {
        let SessionApplyParams { session_id, op } = params.0;
        let session_id = parse_session_id(session_id)?;
        let op = op_from_mcp(op)?;

        let outcome = self.service.apply(&session_id, &op).await.map_err(op_error)?;
        Ok(Json(apply_response(outcome)))
    }

    /// Delete a session record, flags included.
    #[tool(name = "session.delete")]
    async fn session_delete(
        &self,
        params: Parameters<SessionParams>,
    ) -> Result<Json<SessionDeleteResponse>, ErrorData> {
        let session_id = parse_session_id(params.0.session_id)?;
        let deleted = self.service.remove(&session_id).await.map_err(store_error)?;
        Ok(Json(SessionDeleteResponse { session_id: session_id.into_string(), deleted }))
    }
}

#[tool_handler]
impl ServerHandler for CaptureFlowMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "capture-flow conversation engine (tools: session.list, session.read, session.apply, session.delete)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Parameter parsing and response mapping.
include!("server/helpers.rs");
