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

//! A size-bounded file sink that keeps a limited set of timestamped backups.
//!
//! The active file lives at the configured path. When a write would push it past the size limit,
//! it is renamed to `<stem>-<YYYY-MM-DDTHH-MM-SS.mmm><ext>` next to it and a fresh file is opened.
//! Backups beyond the count limit or older than the age limit are then removed.

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;

pub use self::rolling::RotatingWriter;
pub use self::rolling::RotatingWriterBuilder;

use crate::Error;
use crate::sink::Sink;

mod rolling;

const MEGABYTE: u64 = 1024 * 1024;

/// Size, age and backup-count bounds for a [`RotatingFile`].
///
/// A zero `max_backups` or `max_age_days` means unbounded. A zero `max_size_mb` means the
/// default of 100 MB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Megabytes per file before rotation.
    pub max_size_mb: u64,
    /// Maximum number of backups to keep.
    pub max_backups: usize,
    /// Days to keep backups.
    pub max_age_days: u64,
    /// Whether backup names use local time rather than UTC.
    pub local_time: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: 100,
            max_backups: 0,
            max_age_days: 0,
            local_time: true,
        }
    }
}

/// A sink writing to a rotating file.
#[derive(Debug)]
pub struct RotatingFile {
    writer: Mutex<RotatingWriter>,
}

impl RotatingFile {
    /// Open the active file at `path` with the given policy.
    pub fn new(path: impl AsRef<Path>, policy: RotationPolicy) -> Result<RotatingFile, Error> {
        let path = path.as_ref();
        let writer = RotatingWriterBuilder::new(path)
            .max_file_size(policy.max_size_mb.saturating_mul(MEGABYTE))
            .max_backups(policy.max_backups)
            .max_age_days(policy.max_age_days)
            .local_time(policy.local_time)
            .build()
            .map_err(|err| err.with_context("path", path.display()))?;

        Ok(RotatingFile {
            writer: Mutex::new(writer),
        })
    }

    fn writer(&self) -> MutexGuard<'_, RotatingWriter> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Sink for RotatingFile {
    fn write(&self, bytes: &[u8]) -> Result<(), Error> {
        self.writer().write_all(bytes).map_err(Error::sink_write)
    }

    fn sync(&self) -> Result<(), Error> {
        self.writer().flush().map_err(Error::flush)
    }
}
