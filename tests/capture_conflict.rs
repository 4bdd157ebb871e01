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

#![cfg(feature = "grpc")]

use std::fs;

use log::Log;
use log::Metadata;
use log::Record;
use logscope::ErrorKind;
use logscope::Options;
use serde_json::Value;
use tempfile::TempDir;

struct ForeignLogger;

impl Log for ForeignLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        false
    }

    fn log(&self, _: &Record) {}

    fn flush(&self) {}
}

static FOREIGN_LOGGER: ForeignLogger = ForeignLogger;

// Another library owns the `log` global logger for this whole binary.
#[test]
fn test_failed_capture_keeps_existing_adapters() {
    log::set_logger(&FOREIGN_LOGGER).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.log");
    let options = Options {
        output_paths: vec![path.display().to_string()],
        json_encoding: true,
        capture_log: false,
        log_grpc: true,
        ..Options::default()
    };
    logscope::configure(&options).unwrap();

    let other = temp_dir.path().join("other.log");
    let err = logscope::configure(&Options {
        output_paths: vec![other.display().to_string()],
        capture_log: true,
        log_grpc: false,
        ..options
    })
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Capture);

    tracing::warn!(target: "tonic::transport", "still captured");
    logscope::sync().unwrap();

    let lines = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["target"], "tonic::transport");
    assert_eq!(lines[0]["msg"], "still captured");
    assert_eq!(fs::metadata(&other).map(|m| m.len()).unwrap_or(0), 0);
}
