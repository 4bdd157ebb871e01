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

//! The configuration value consumed by [`configure`](crate::configure).

use std::path::PathBuf;

use crate::Level;
use crate::directive;
use crate::sink::RotationPolicy;
use crate::time::TimeFormat;

/// The default environment variable read by [`Options::output_levels_from_default_env`].
pub const DEFAULT_LEVELS_ENV: &str = "LOGSCOPE_LEVELS";

const DEFAULT_OUTPUT_LEVELS: &str = "default:info";
const DEFAULT_STACK_TRACE_LEVELS: &str = "default:none";
const DEFAULT_ROTATION_MAX_SIZE: u64 = 100;
const DEFAULT_ROTATION_MAX_AGE: u64 = 30;
const DEFAULT_ROTATION_MAX_BACKUPS: usize = 1000;

/// Everything [`configure`](crate::configure) needs to build a pipeline.
///
/// [`Options::default`] is the configuration applied at process start: console encoding to
/// stderr, the `default` scope at `info`, no stack traces, no callers, no rotation and no gRPC
/// capture.
///
/// Options can also be embedded in an application's configuration file:
///
/// ```
/// let options: logscope::Options = serde_json::from_str(
///     r#"{"output_paths": ["stdout"], "json_encoding": true, "output_levels": "info,ads:debug"}"#,
/// )
/// .unwrap();
/// assert_eq!(options.output_level("ads"), Some(logscope::Level::Debug));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct Options {
    /// Destinations in order; `stdout` and `stderr` name the process streams, anything else is
    /// a file opened for append.
    pub output_paths: Vec<String>,
    /// Destinations for the pipeline's own diagnostics.
    pub error_output_paths: Vec<String>,
    /// The active file of a rotating sink written in addition to `output_paths`.
    pub rotate_output_path: Option<PathBuf>,
    /// Megabytes per file before rotation.
    pub rotation_max_size: u64,
    /// Days to retain backups; zero keeps them forever.
    pub rotation_max_age: u64,
    /// Maximum number of backups; zero keeps all.
    pub rotation_max_backups: usize,
    /// Pass `rotation_max_age` as the backup count and `rotation_max_backups` as the age, the
    /// way older releases wired the rotator.
    pub legacy_rotation_wiring: bool,
    /// Encode JSON lines instead of console columns.
    pub json_encoding: bool,
    /// How the `time` field is rendered.
    pub time_format: TimeFormat,
    /// Redirect gRPC's internal logging.
    pub log_grpc: bool,
    /// Route records of the `log` crate through the pipeline.
    pub capture_log: bool,
    /// Route panic messages through the pipeline.
    pub capture_panics: bool,
    /// Comma-separated `[scope:]level` output level directives.
    pub output_levels: String,
    /// Comma-separated `[scope:]level` stack trace level directives.
    pub stack_trace_levels: String,
    /// Comma-separated names of the scopes that log their callers.
    pub log_callers: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output_paths: vec!["stderr".to_string()],
            error_output_paths: vec!["stderr".to_string()],
            rotate_output_path: None,
            rotation_max_size: DEFAULT_ROTATION_MAX_SIZE,
            rotation_max_age: DEFAULT_ROTATION_MAX_AGE,
            rotation_max_backups: DEFAULT_ROTATION_MAX_BACKUPS,
            legacy_rotation_wiring: false,
            json_encoding: false,
            time_format: TimeFormat::default(),
            log_grpc: false,
            capture_log: true,
            capture_panics: true,
            output_levels: DEFAULT_OUTPUT_LEVELS.to_string(),
            stack_trace_levels: DEFAULT_STACK_TRACE_LEVELS.to_string(),
            log_callers: String::new(),
        }
    }
}

impl Options {
    /// Replace the output level directives, a comma-separated list of `[scope:]level`.
    pub fn with_output_levels(mut self, directives: impl Into<String>) -> Self {
        self.output_levels = directives.into();
        self
    }

    /// Replace the stack trace level directives, a comma-separated list of `[scope:]level`.
    pub fn with_stack_trace_levels(mut self, directives: impl Into<String>) -> Self {
        self.stack_trace_levels = directives.into();
        self
    }

    /// Replace the comma-separated list of scopes that log their callers.
    pub fn with_log_callers(mut self, scopes: impl Into<String>) -> Self {
        self.log_callers = scopes.into();
        self
    }

    /// Read the output level directives from the environment variable `LOGSCOPE_LEVELS`, keeping
    /// the current ones if it is unset.
    ///
    /// # Examples
    ///
    /// ```
    /// let options = logscope::Options::default().output_levels_from_default_env();
    /// ```
    pub fn output_levels_from_default_env(self) -> Self {
        self.output_levels_from_env(DEFAULT_LEVELS_ENV)
    }

    /// Read the output level directives from the environment variable `name`, keeping the
    /// current ones if it is unset.
    ///
    /// # Examples
    ///
    /// ```
    /// let options = logscope::Options::default().output_levels_from_env("MY_LEVELS");
    /// ```
    pub fn output_levels_from_env(mut self, name: &str) -> Self {
        if let Ok(directives) = std::env::var(name) {
            self.output_levels = directives;
        }
        self
    }

    /// Set the output level of `scope`.
    pub fn set_output_level(&mut self, scope: &str, level: Level) {
        self.output_levels = directive::set_directive(&self.output_levels, scope, level);
    }

    /// The output level the directives assign to `scope`.
    pub fn output_level(&self, scope: &str) -> Option<Level> {
        directive::find_directive(&self.output_levels, scope)
    }

    /// Set the stack trace level of `scope`.
    pub fn set_stack_trace_level(&mut self, scope: &str, level: Level) {
        self.stack_trace_levels = directive::set_directive(&self.stack_trace_levels, scope, level);
    }

    /// The stack trace level the directives assign to `scope`.
    pub fn stack_trace_level(&self, scope: &str) -> Option<Level> {
        directive::find_directive(&self.stack_trace_levels, scope)
    }

    /// Enable or disable caller capture for `scope`.
    pub fn set_log_callers(&mut self, scope: &str, enabled: bool) {
        let mut scopes = directive::parse_scope_list(&self.log_callers);
        scopes.retain(|s| s != scope);
        if enabled {
            scopes.push(scope.to_string());
        }
        self.log_callers = scopes.join(",");
    }

    /// Whether caller capture is enabled for `scope`.
    pub fn log_callers(&self, scope: &str) -> bool {
        directive::parse_scope_list(&self.log_callers)
            .iter()
            .any(|s| s == scope)
    }

    /// The policy handed to the rotating sink.
    pub fn rotation_policy(&self) -> RotationPolicy {
        let (max_backups, max_age_days) = if self.legacy_rotation_wiring {
            (
                usize::try_from(self.rotation_max_age).unwrap_or(usize::MAX),
                self.rotation_max_backups as u64,
            )
        } else {
            (self.rotation_max_backups, self.rotation_max_age)
        };

        RotationPolicy {
            max_size_mb: self.rotation_max_size,
            max_backups,
            max_age_days,
            local_time: true,
        }
    }
}
