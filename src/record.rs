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

//! The record shape shared by both cores and every encoder.

use std::fmt;
use std::panic::Location;

use jiff::Timestamp;

use crate::Level;

/// A source location attached to a record when caller capture is enabled for its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller<'a> {
    file: &'a str,
    line: u32,
}

impl<'a> Caller<'a> {
    /// Create a caller from a file path and a line.
    pub fn new(file: &'a str, line: u32) -> Caller<'a> {
        Caller { file, line }
    }

    /// Create a caller from a [`Location`] obtained through `#[track_caller]`.
    pub fn from_location(location: &'static Location<'static>) -> Caller<'static> {
        Caller {
            file: location.file(),
            line: location.line(),
        }
    }

    /// The full file path.
    pub fn file(&self) -> &'a str {
        self.file
    }

    /// The line number.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The last two components of the file path, like `src/main.rs`.
    pub fn short_file(&self) -> &'a str {
        let file = self.file;
        let Some(last) = file.rfind(['/', '\\']) else {
            return file;
        };
        match file[..last].rfind(['/', '\\']) {
            Some(parent) => &file[parent + 1..],
            None => file,
        }
    }
}

impl fmt::Display for Caller<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.short_file(), self.line)
    }
}

/// Key-value fields attached to a record, in emission order.
pub type KeyValues<'a> = &'a [(&'a str, &'a dyn fmt::Display)];

/// A single log record on its way to the encoder.
#[derive(Clone, Copy)]
pub struct Record<'a> {
    time: Timestamp,
    level: Level,
    scope: &'a str,
    caller: Option<Caller<'a>>,
    message: &'a dyn fmt::Display,
    kvs: KeyValues<'a>,
    stack: Option<&'a str>,
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("time", &self.time)
            .field("level", &self.level)
            .field("scope", &self.scope)
            .field("caller", &self.caller)
            .field("message", &self.message.to_string())
            .field("kvs", &self.kvs.len())
            .field("stack", &self.stack.is_some())
            .finish()
    }
}

impl<'a> Record<'a> {
    /// Create a record stamped with the current time.
    pub fn new(level: Level, scope: &'a str, message: &'a dyn fmt::Display) -> Record<'a> {
        Record {
            time: Timestamp::now(),
            level,
            scope,
            caller: None,
            message,
            kvs: &[],
            stack: None,
        }
    }

    /// Override the timestamp.
    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = time;
        self
    }

    /// Attach a caller.
    pub fn with_caller(mut self, caller: Option<Caller<'a>>) -> Self {
        self.caller = caller;
        self
    }

    /// Attach a rendered stack trace.
    pub fn with_stack(mut self, stack: Option<&'a str>) -> Self {
        self.stack = stack;
        self
    }

    /// Attach key-value fields.
    pub fn with_kvs(mut self, kvs: KeyValues<'a>) -> Self {
        self.kvs = kvs;
        self
    }

    /// The instant the record was created.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The level of the record.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The name of the emitting scope.
    pub fn scope(&self) -> &'a str {
        self.scope
    }

    /// The caller, if captured.
    pub fn caller(&self) -> Option<Caller<'a>> {
        self.caller
    }

    /// The message.
    pub fn message(&self) -> &'a dyn fmt::Display {
        self.message
    }

    /// The key-value fields.
    pub fn kvs(&self) -> KeyValues<'a> {
        self.kvs
    }

    /// The rendered stack trace, if attached.
    pub fn stack(&self) -> Option<&'a str> {
        self.stack
    }
}
