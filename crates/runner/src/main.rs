// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cino-runner: runs hardware tests on physically attached boards, either
//! one-shot from the command line or subscribed to a cino-server queue.

mod config;
mod devices;
mod exec;
mod run;
mod serial;
mod subscribe;

use anyhow::bail;
use clap::{Parser, Subcommand};
use config::RunnerConfig;
use devices::Device;
use exec::ArduinoCli;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cino-runner",
    about = "Runs tests on physical microcontroller boards"
)]
struct Args {
    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all the available tests in the supplied directories
    Run {
        /// Test directories
        #[arg(required = true, value_name = "TEST")]
        paths: Vec<PathBuf>,
        /// Fully Qualified Board Name, e.g.: arduino:avr:uno
        #[arg(short = 'b', long)]
        fqbn: Option<String>,
        /// Upload port, e.g.: COM10 or /dev/ttyACM0
        #[arg(short, long)]
        port: Option<String>,
    },
    /// Subscribe to a cino-server instance and wait for jobs
    Subscribe,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CINO_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match try_main().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<bool> {
    let args = Args::parse();
    let mut config = RunnerConfig::load(args.config.as_deref())?;
    let driver = ArduinoCli;

    match args.command {
        Command::Run { paths, fqbn, port } => {
            // A manually supplied device replaces the configured list.
            match (fqbn, port) {
                (Some(fqbn), Some(port)) => {
                    config.devices = vec![Device {
                        fqbn,
                        port,
                        features: Vec::new(),
                    }];
                }
                (None, None) => {}
                _ => bail!("cannot specify --fqbn without --port and vice versa"),
            }
            run::run(&config, &paths, &driver).await
        }
        Command::Subscribe => {
            subscribe::subscribe(&config, &driver).await?;
            Ok(true)
        }
    }
}
