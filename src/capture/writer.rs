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

use std::io;

use crate::Level;
use crate::pipeline;

/// An [`io::Write`] adapter that emits every complete line as a captured record.
///
/// Use it to route libraries that can only log to a writer into the pipeline. A trailing partial
/// line is emitted on [`flush`](io::Write::flush) or drop.
///
/// # Examples
///
/// ```
/// use std::io::Write;
///
/// let mut writer = logscope::StdLogWriter::new();
/// writeln!(writer, "listening on 0.0.0.0:8080").unwrap();
/// ```
#[derive(Debug)]
pub struct StdLogWriter {
    level: Level,
    target: String,
    buf: Vec<u8>,
}

impl Default for StdLogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl StdLogWriter {
    /// A writer emitting `info` records with target `stdlog`.
    pub fn new() -> StdLogWriter {
        StdLogWriter {
            level: Level::Info,
            target: "stdlog".to_string(),
            buf: Vec::new(),
        }
    }

    /// Emit at `level` instead.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Tag records with `target` instead.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    fn emit_line(&self, line: &[u8]) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let line = String::from_utf8_lossy(line);
        pipeline::capture(self.level, &line, &self.target, None, &[]);
    }
}

impl io::Write for StdLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line = self.buf.drain(..=pos).collect::<Vec<_>>();
            self.emit_line(&line[..pos]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let line = std::mem::take(&mut self.buf);
            self.emit_line(&line);
        }
        Ok(())
    }
}

impl Drop for StdLogWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}
