// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP control surface.
//!
//! Exposes the analysis batch, ingestion, ticket metric refresh and daily
//! snapshot jobs as POST endpoints, plus an unauthenticated health check.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, router, start_server};
