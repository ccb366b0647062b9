// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test execution driver.
//!
//! For each sketch of a test: prepare an isolated arduino-cli environment,
//! install the device's core and the declared libraries, compile, and
//! upload — all sketches in parallel. Then read every device's serial
//! stream in parallel and aggregate the checks into one result. Compile
//! failures fail the test and let the job continue; upload and driver
//! failures are fatal to the runner loop.

use crate::devices::Device;
use crate::serial;
use async_trait::async_trait;
use cino_core::{SketchEntry, TestResult, TestStatus};
use cino_scan::{DiscoveredTest, PackageKind};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::debug;

/// How long to wait for a port to reappear around a board reset.
const PORT_RETRY: Duration = Duration::from_secs(30);
const PORT_POLL: Duration = Duration::from_millis(100);

/// Errors fatal to the current job (and, per the driver contract, to the
/// runner loop).
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("number of assigned devices ({devices}) does not match the number of sketches ({sketches})")]
    DeviceCountMismatch { devices: usize, sketches: usize },
    #[error("device {0} does not exist")]
    DeviceMissing(String),
    #[error("arduino-cli {command} failed")]
    Cli { command: String },
    #[error("serial port {port}: {source}")]
    Serial {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("malformed test message: {0}")]
    Protocol(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Funnel for driver output lines.
///
/// Every concurrent activity of a test run writes through a sink; a
/// collector task assembles the lines into the test's output buffer.
/// Multi-sketch tests get a `[dir]` prefix per line.
#[derive(Clone)]
pub struct OutputSink {
    tx: mpsc::UnboundedSender<String>,
    prefix: Option<String>,
}

impl OutputSink {
    fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx, prefix: None }
    }

    fn prefixed(tx: mpsc::UnboundedSender<String>, prefix: Option<String>) -> Self {
        Self { tx, prefix }
    }

    pub fn line(&self, text: impl Into<String>) {
        let text = text.into();
        let line = match &self.prefix {
            Some(prefix) => format!("[{prefix}] {text}"),
            None => text,
        };
        // Receiver only goes away when the whole run is being torn down.
        let _ = self.tx.send(line);
    }
}

/// Seam between the job loop and the hardware.
#[async_trait]
pub trait TestDriver: Send + Sync {
    /// Compile, flash, and read back one test on the given devices.
    /// `devices` is indexed by sketch position.
    async fn run_test(
        &self,
        test: &DiscoveredTest,
        devices: &[Device],
    ) -> Result<TestResult, ExecError>;
}

/// The real driver, shelling out to `arduino-cli`.
pub struct ArduinoCli;

#[async_trait]
impl TestDriver for ArduinoCli {
    async fn run_test(
        &self,
        test: &DiscoveredTest,
        devices: &[Device],
    ) -> Result<TestResult, ExecError> {
        run_test(test, devices).await
    }
}

async fn run_test(test: &DiscoveredTest, devices: &[Device]) -> Result<TestResult, ExecError> {
    let sketches = &test.manifest.sketches;
    if devices.len() != sketches.len() {
        return Err(ExecError::DeviceCountMismatch {
            devices: devices.len(),
            sketches: sketches.len(),
        });
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let collector = tokio::spawn(async move {
        let mut out = String::new();
        while let Some(line) = rx.recv().await {
            debug!(line = line.trim_end(), "driver");
            out.push_str(&line);
        }
        out
    });

    let multi = sketches.len() > 1;
    let sink = OutputSink::new(tx.clone());
    sink.line(format!("Test requires {} devices\n", sketches.len()));

    // Compile and upload every sketch in parallel.
    let mut set: JoinSet<Result<bool, ExecError>> = JoinSet::new();
    for (index, (sketch, device)) in sketches.iter().zip(devices).enumerate() {
        let sink = OutputSink::prefixed(tx.clone(), multi.then(|| sketch.dir.clone()));
        let task = FlashTask {
            index,
            sketch: sketch.clone(),
            device: device.clone(),
            test_dir: test.path.clone(),
            package_root: test.package_root.clone(),
            kind: test.kind,
        };
        set.spawn(async move { task.prepare_and_flash(&sink).await });
    }
    let mut compiled = true;
    while let Some(joined) = set.join_next().await {
        compiled &= joined??;
    }

    let mut failed = !compiled;
    if compiled {
        failed = read_serial_streams(sketches, devices, &tx, multi).await?;
    }

    drop(sink);
    drop(tx);
    let output = collector.await?;

    Ok(TestResult {
        path: test.rel_path(),
        status: if failed {
            TestStatus::Failure
        } else {
            TestStatus::Success
        },
        output,
        device_fqbns: devices.iter().map(|d| d.fqbn.clone()).collect(),
    })
}

/// Everything one sketch's compile/upload task needs, owned.
struct FlashTask {
    index: usize,
    sketch: SketchEntry,
    device: Device,
    test_dir: PathBuf,
    package_root: PathBuf,
    kind: PackageKind,
}

impl FlashTask {
    /// Returns whether the sketch compiled (a compile failure is a test
    /// failure, not an execution error).
    async fn prepare_and_flash(&self, sink: &OutputSink) -> Result<bool, ExecError> {
        sink.line(format!(
            "Device {}: {} on {}\n",
            self.index, self.device.fqbn, self.device.port
        ));
        if !Path::new(&self.device.port).exists() {
            return Err(ExecError::DeviceMissing(self.device.port.clone()));
        }

        let env_dir = tempfile::Builder::new().prefix(".arduino-cli").tempdir()?;
        let cli = Cli::init(env_dir.path(), sink).await?;

        // Install the core the device's FQBN belongs to (vendor:arch).
        if let Some((core, _board)) = self.device.fqbn.rsplit_once(':') {
            cli.run(&["core", "install", core]).await?;
        }

        // Libraries declared in the test manifest. An install failure is
        // surfaced but compilation is what actually decides the outcome.
        for library in &self.sketch.libraries {
            if cli.run(&["lib", "install", library]).await.is_err() {
                sink.line(format!("Error installing library: {library}\n"));
                return Ok(false);
            }
        }

        // A library repo is itself the code under test; stage it into the
        // environment's user libraries.
        if self.kind == PackageKind::Library {
            install_local_library(env_dir.path(), &self.package_root)?;
        }

        let helper_dir = write_test_header(env_dir.path())?;
        let helper = helper_dir.display().to_string();
        let sketch_path = self.test_dir.join(&self.sketch.dir).display().to_string();

        let compile = cli
            .run(&[
                "compile",
                "-b",
                &self.device.fqbn,
                "--libraries",
                &helper,
                &sketch_path,
            ])
            .await;
        if let Err(error) = compile {
            sink.line(format!("{error}\n"));
            return Ok(false);
        }

        cli.run(&[
            "upload",
            "-b",
            &self.device.fqbn,
            "-p",
            &self.device.port,
            &sketch_path,
        ])
        .await?;
        Ok(true)
    }
}

/// `arduino-cli` wrapper bound to one isolated configuration file.
struct Cli {
    config_file: PathBuf,
    sink: OutputSink,
}

impl Cli {
    /// Create a vanilla environment under `dir`: fresh config with all
    /// directories inside `dir`, unsafe library installs enabled, index
    /// updated.
    async fn init(dir: &Path, sink: &OutputSink) -> Result<Self, ExecError> {
        let config_file = dir.join("config.yml");
        let cli = Self {
            config_file,
            sink: sink.clone(),
        };
        let config = cli.config_file.display().to_string();
        let data = dir.join("data").display().to_string();
        let downloads = dir.join("downloads").display().to_string();
        let user = dir.join("user").display().to_string();

        cli.run_unconfigured(&["config", "init", "--dest-file", &config])
            .await?;
        cli.run(&["config", "set", "directories.data", &data]).await?;
        cli.run(&["config", "set", "directories.downloads", &downloads])
            .await?;
        cli.run(&["config", "set", "directories.user", &user]).await?;
        cli.run(&["config", "set", "library.enable_unsafe_install", "true"])
            .await?;
        cli.run(&["update"]).await?;
        Ok(cli)
    }

    async fn run(&self, args: &[&str]) -> Result<(), ExecError> {
        let config = self.config_file.display().to_string();
        let mut full: Vec<&str> = vec!["--config-file", config.as_str()];
        full.extend_from_slice(args);
        self.run_unconfigured(&full).await
    }

    async fn run_unconfigured(&self, args: &[&str]) -> Result<(), ExecError> {
        self.sink.line(format!("arduino-cli {}\n", args.join(" ")));
        let output = Command::new("arduino-cli").args(args).output().await?;
        if !output.status.success() {
            self.sink.line(String::from_utf8_lossy(&output.stdout).into_owned());
            self.sink.line(String::from_utf8_lossy(&output.stderr).into_owned());
            return Err(ExecError::Cli {
                command: args.join(" "),
            });
        }
        Ok(())
    }
}

/// Copy a library repository into the environment's user libraries, named
/// after the `name` key of its `library.properties`.
fn install_local_library(env_dir: &Path, package_root: &Path) -> Result<(), ExecError> {
    let raw = std::fs::read_to_string(package_root.join("library.properties"))?;
    let name = raw
        .lines()
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "name")
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_else(|| "library".to_string());

    let target = env_dir.join("user").join("libraries").join(name);
    copy_tree(package_root, &target)?;
    Ok(())
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Stage the `cino.h` test header as a library so sketches can include it.
fn write_test_header(env_dir: &Path) -> Result<PathBuf, ExecError> {
    let lib_dir = env_dir.join("cino");
    std::fs::create_dir_all(lib_dir.join("src"))?;
    std::fs::write(lib_dir.join("src").join("cino.h"), TEST_HEADER)?;
    Ok(lib_dir)
}

/// The on-device half of the protocol: macros printing the JSON messages
/// parsed by [`crate::serial::SketchStream`].
const TEST_HEADER: &str = r#"
#ifndef CINO_H
#define CINO_H

#define TEST_PLAN(n)            \
Serial.begin(9600);         \
while (!Serial) {} \
Serial.print("{\"plan\":"); \
Serial.print(n);            \
Serial.println("}")

#define TEST_NOPLAN() TEST_PLAN(-1)

#define TEST_DONE() \
Serial.println("{\"done\":true}")

void _cino_check(bool result, char *quoted_expr, char *file, int line, bool fatal)
{
Serial.print("{\"result\":");
Serial.print(result ? "true" : "false");
Serial.print(",\"expr\":");
Serial.print(quoted_expr);
Serial.print(",\"file\":\"");
String f(file);
f.replace("\"", "");
Serial.print(f.substring(f.lastIndexOf('/')+1));
Serial.print("\",\"line\":");
Serial.print(line);
if (!result)
{
  Serial.print(",\"fatal\":");
  Serial.print(fatal ? "true" : "false");
}
Serial.println("}");
if (fatal && !result)
  while (1)
  {
  }
}

#define _quote(x) #x
#define REQUIRE(expr) _cino_check((expr), _quote(#expr), __FILE__, __LINE__, 1)
#define CHECK(expr) _cino_check((expr), _quote(#expr), __FILE__, __LINE__, 0)

#endif
"#;

/// Wait for `port` to come back after the upload resets the board.
async fn wait_for_port(port: &str) -> Result<(), ExecError> {
    let deadline = tokio::time::Instant::now() + PORT_RETRY;
    while !Path::new(port).exists() {
        if tokio::time::Instant::now() >= deadline {
            return Err(ExecError::DeviceMissing(port.to_string()));
        }
        tokio::time::sleep(PORT_POLL).await;
    }
    Ok(())
}

/// Read every device's stream in parallel; true if any sketch failed.
async fn read_serial_streams(
    sketches: &[SketchEntry],
    devices: &[Device],
    tx: &mpsc::UnboundedSender<String>,
    multi: bool,
) -> Result<bool, ExecError> {
    for device in devices {
        wait_for_port(&device.port).await?;
    }

    let mut set: JoinSet<Result<bool, ExecError>> = JoinSet::new();
    for (sketch, device) in sketches.iter().zip(devices) {
        let sink = OutputSink::prefixed(tx.clone(), multi.then(|| sketch.dir.clone()));
        let port = device.port.clone();
        set.spawn_blocking(move || serial::read_stream(&port, &sink));
    }

    let mut failed = false;
    while let Some(joined) = set.join_next().await {
        failed |= joined??;
    }
    Ok(failed)
}
