// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue change subscription.
//!
//! The loop is two nested waits: an outer reconnection loop with bounded
//! backoff, and an inner notification wait with a periodic idle drain that
//! doubles as a liveness check on the subscription. Every wake — connect,
//! notification, or idle timeout — runs the drain callback, which is
//! expected to process work until the queue offers nothing more.

use sqlx::postgres::PgListener;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Idle interval after which the loop drains once as a liveness check.
const IDLE_PING: Duration = Duration::from_secs(90);
/// Reconnection backoff bounds.
const MIN_RECONNECT: Duration = Duration::from_secs(10);
const MAX_RECONNECT: Duration = Duration::from_secs(60);

/// Next delay after a failed (re)connect: doubling, capped.
fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_RECONNECT)
}

/// Subscribe to `channel` and run `drain` on every wake.
///
/// Connection and subscription errors are retried forever with backoff;
/// the only way out is a `drain` error, which is returned for the caller
/// to abort on (queue faults are fatal and left to the process
/// supervisor).
pub async fn listen_channel<F, Fut, E>(pool: &PgPool, channel: &str, mut drain: F) -> E
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let mut backoff = MIN_RECONNECT;
    loop {
        let mut listener = match subscribe(pool, channel).await {
            Ok(listener) => listener,
            Err(error) => {
                warn!(channel, %error, delay = ?backoff, "subscribe failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff = next_backoff(backoff);
                continue;
            }
        };
        backoff = MIN_RECONNECT;
        debug!(channel, "listening");

        // Work may have queued while we were away.
        if let Err(error) = drain().await {
            return error;
        }

        loop {
            match tokio::time::timeout(IDLE_PING, listener.recv()).await {
                Ok(Ok(notification)) => {
                    debug!(channel, payload = notification.payload(), "notified");
                    if let Err(error) = drain().await {
                        return error;
                    }
                }
                Ok(Err(error)) => {
                    warn!(channel, %error, "subscription lost, reconnecting");
                    break;
                }
                Err(_elapsed) => {
                    // Quiet for a while; drain once in case a notification
                    // was dropped with the connection.
                    if let Err(error) = drain().await {
                        return error;
                    }
                }
            }
        }

        tokio::time::sleep(backoff).await;
        backoff = next_backoff(backoff);
    }
}

async fn subscribe(pool: &PgPool, channel: &str) -> Result<PgListener, sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(channel).await?;
    Ok(listener)
}

#[cfg(test)]
#[path = "listen_tests.rs"]
mod tests;
