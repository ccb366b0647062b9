// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The GitHub webhook endpoint.
//!
//! A single POST route. Bad HMAC is 401, unparseable payloads are 400,
//! events we do not act on are acknowledged with 200. A successful insert
//! reaches the scanner through the `new_check_suites` channel.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use cino_github::{verify_signature, CheckSuiteEvent, CHECK_SUITE_EVENT};
use cino_queue::NewCheckSuite;
use sqlx::PgPool;
use tracing::{debug, error, warn};

#[derive(Clone)]
pub struct HookCtx {
    pub pool: PgPool,
    pub secret: String,
}

pub fn router(ctx: HookCtx) -> Router {
    Router::new()
        .route("/github-hook", post(github_hook))
        .with_state(ctx)
}

async fn github_hook(
    State(ctx): State<HookCtx>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get("x-hub-signature-256")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !verify_signature(&ctx.secret, &body, signature) {
        warn!("webhook delivery with invalid signature");
        return StatusCode::UNAUTHORIZED;
    }

    let event_type = headers
        .get("x-github-event")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if event_type != CHECK_SUITE_EVENT {
        debug!(event_type, "ignoring event type");
        return StatusCode::OK;
    }

    let event: CheckSuiteEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(error) => {
            warn!(%error, "could not parse webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };
    if !event.wants_dispatch() {
        debug!(action = %event.action, "ignoring check suite action");
        return StatusCode::OK;
    }

    let suite = NewCheckSuite {
        github_id: event.check_suite.id,
        installation_id: event.installation.id,
        repo_owner: event.repository.owner.login,
        repo_name: event.repository.name,
        clone_url: event.repository.clone_url,
        commit_ref: event.check_suite.head_sha,
    };
    match cino_queue::insert_check_suite(&ctx.pool, &suite).await {
        Ok(()) => StatusCode::OK,
        Err(error) => {
            error!(%error, "could not store check suite");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
