// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Model Context Protocol (MCP) server surface.
//!
//! The MCP layer lets an agent or a chat front end list, inspect, and drive conversation
//! sessions through the same [`ConversationService`](crate::service::ConversationService) the
//! bot uses.

mod server;
mod types;

pub use server::CaptureFlowMcp;
