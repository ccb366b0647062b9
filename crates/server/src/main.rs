// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cino-server: the coordinator. Receives check-suite webhooks, expands
//! test requirements into a job matrix, and reports runner results back
//! to GitHub.

mod config;
mod hook;
mod results;
mod scanner;

use clap::Parser;
use cino_github::StatusSink;
use config::ServerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cino-server",
    about = "Orchestrates CI jobs for microcontroller boards"
)]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CINO_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::load(&args.config)?;
    info!(runners = config.runners.len(), "configuration loaded");

    let pool = cino_queue::connect(&config.db.dsn).await?;
    let sink = Arc::new(StatusSink::from_key_file(
        config.github.app_id,
        &config.github.private_key_file,
    )?);

    let scanner = tokio::spawn(scanner::watch(
        pool.clone(),
        config.clone(),
        Arc::clone(&sink),
    ));
    let results = tokio::spawn(results::watch(
        pool.clone(),
        config.clone(),
        Arc::clone(&sink),
    ));

    let app = hook::router(hook::HookCtx {
        pool,
        secret: config.github.secret.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(bind = %config.bind, "starting the web service");
    let web = async move { axum::serve(listener, app).await };

    tokio::select! {
        served = web => served?,
        joined = scanner => joined??,
        joined = results => joined??,
    }
    Ok(())
}
