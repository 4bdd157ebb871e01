// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;

use logscope::Level;
use logscope::Options;
use logscope::StdLogWriter;
use serde_json::Value;
use tempfile::TempDir;

static LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn options(path: &Path) -> Options {
    Options {
        output_paths: vec![path.display().to_string()],
        json_encoding: true,
        ..Options::default()
    }
}

fn read_lines(path: &Path) -> Vec<Value> {
    logscope::sync().unwrap();
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_log_crate_is_captured() {
    let _guard = lock();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.log");

    logscope::configure(&options(&path).with_log_callers("default")).unwrap();
    log::debug!(target: "dependency", "dropped by the default scope");
    log::info!(target: "dependency", "hello {}", 1);
    log::warn!(target: "dependency", attempt = 3; "retrying");
    logscope::default_scope().set_log_callers(false);

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["level"], "info");
    assert_eq!(lines[0]["scope"], "default");
    assert_eq!(lines[0]["target"], "dependency");
    assert_eq!(lines[0]["msg"], "hello 1");
    assert!(lines[0]["caller"].as_str().unwrap().starts_with("tests/capture.rs:"));
    assert_eq!(lines[1]["level"], "warn");
    assert_eq!(lines[1]["attempt"], "3");
}

#[test]
fn test_capture_follows_default_scope() {
    let _guard = lock();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.log");

    logscope::configure(&options(&path).with_output_levels("debug")).unwrap();
    assert!(log::log_enabled!(target: "dependency", log::Level::Debug));
    log::debug!(target: "dependency", "now visible");

    logscope::default_scope().set_output_level(Level::Error);
    log::warn!(target: "dependency", "dropped");
    logscope::default_scope().set_output_level(Level::Info);

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["msg"], "now visible");
}

#[test]
fn test_log_capture_can_be_disabled() {
    let _guard = lock();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.log");

    let mut options = options(&path);
    options.capture_log = false;
    logscope::configure(&options).unwrap();
    log::error!(target: "dependency", "dropped");
    assert!(read_lines(&path).is_empty());
}

#[test]
fn test_std_log_writer() {
    let _guard = lock();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.log");

    logscope::configure(&options(&path)).unwrap();
    {
        let mut writer = StdLogWriter::new();
        write!(writer, "line one\r\nline ").unwrap();
        write!(writer, "two\npartial").unwrap();
        let mut warnings = StdLogWriter::new().with_level(Level::Warn).with_target("legacy");
        writeln!(warnings, "careful").unwrap();
    }

    let lines = read_lines(&path);
    let msgs = lines.iter().map(|l| l["msg"].clone()).collect::<Vec<_>>();
    assert_eq!(msgs, ["line one", "line two", "careful", "partial"]);
    assert_eq!(lines[0]["target"], "stdlog");
    assert_eq!(lines[0]["level"], "info");
    assert_eq!(lines[2]["target"], "legacy");
    assert_eq!(lines[2]["level"], "warn");
}

#[test]
fn test_panics_are_captured() {
    let _guard = lock();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.log");

    logscope::configure(&options(&path)).unwrap();
    let result = std::thread::Builder::new()
        .name("worker".to_string())
        .spawn(|| panic!("boom {}", 42))
        .unwrap()
        .join();
    assert!(result.is_err());

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "error");
    assert_eq!(lines[0]["target"], "panic");
    assert_eq!(lines[0]["msg"], "boom 42");
    assert_eq!(lines[0]["thread"], "worker");
}

#[cfg(feature = "grpc")]
#[test]
fn test_grpc_events_are_captured() {
    let _guard = lock();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.log");

    let mut options = options(&path);
    options.log_grpc = true;
    logscope::configure(&options).unwrap();
    tracing::warn!(target: "tonic::transport", peer = "10.0.0.1", "connection reset");
    tracing::warn!(target: "my_app", "not part of the grpc stack");
    tracing::debug!(target: "h2::codec", "dropped by the default scope");

    options.log_grpc = false;
    logscope::configure(&options).unwrap();
    tracing::error!(target: "tonic::transport", "capture turned off");

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "warn");
    assert_eq!(lines[0]["target"], "tonic::transport");
    assert_eq!(lines[0]["msg"], "connection reset");
    assert_eq!(lines[0]["peer"], "10.0.0.1");
}
