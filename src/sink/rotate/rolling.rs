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
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use jiff::Span;
use jiff::Zoned;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;

use crate::Error;
use crate::ErrorKind;
const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;
const BACKUP_DATE_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// A writer for a size-bounded file with timestamped backups.
#[derive(Debug)]
pub struct RotatingWriter {
    state: State,
    writer: File,
}

impl Drop for RotatingWriter {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            let err = Error::new(ErrorKind::Flush, "failed to flush rotating file on drop")
                .with_source(err);
            trap(&err);
        }
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len() as u64;
        if len > self.state.max_size {
            return Err(io::Error::other(format!(
                "write length {len} exceeds maximum file size {}",
                self.state.max_size
            )));
        }

        if self.state.current_filesize + len > self.state.max_size {
            self.rotate()?;
        }

        self.writer
            .write(buf)
            .inspect(|&n| self.state.current_filesize += n as u64)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl RotatingWriter {
    fn rotate(&mut self) -> io::Result<()> {
        self.writer.flush()?;

        let now = self.state.now();
        let backup = self.state.backup_path(&now);
        match fs::rename(&self.state.path, &backup) {
            Ok(()) => {}
            // the active file was removed from under us; start a fresh one
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }

        self.writer = self.state.create_log_writer()?;
        self.state.current_filesize = 0;

        if let Err(err) = self.state.remove_stale_backups(&now) {
            let err = Error::new(ErrorKind::SinkWrite, "failed to remove stale backups")
                .with_source(err);
            trap(&err);
        }
        Ok(())
    }
}

/// A builder for configuring [`RotatingWriter`].
#[derive(Debug)]
pub struct RotatingWriterBuilder {
    // required
    path: PathBuf,

    // has default
    max_size: u64,
    max_backups: usize,
    max_age_days: u64,
    local_time: bool,
    #[cfg(test)]
    now: Option<Zoned>,
}

impl RotatingWriterBuilder {
    /// Creates a new [`RotatingWriterBuilder`] for the active file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: DEFAULT_MAX_SIZE,
            max_backups: 0,
            max_age_days: 0,
            local_time: true,
            #[cfg(test)]
            now: None,
        }
    }

    /// Set the maximum size of the active file in bytes; zero means the default of 100 MB.
    #[must_use]
    pub fn max_file_size(mut self, n: u64) -> Self {
        self.max_size = if n == 0 { DEFAULT_MAX_SIZE } else { n };
        self
    }

    /// Set the maximum number of backups to keep; zero keeps all.
    #[must_use]
    pub fn max_backups(mut self, n: usize) -> Self {
        self.max_backups = n;
        self
    }

    /// Set the maximum age of backups in days; zero keeps them forever.
    #[must_use]
    pub fn max_age_days(mut self, n: u64) -> Self {
        self.max_age_days = n;
        self
    }

    /// Set whether backup names use local time rather than UTC.
    #[must_use]
    pub fn local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    #[cfg(test)]
    fn now(mut self, now: Zoned) -> Self {
        self.now = Some(now);
        self
    }

    /// Builds the [`RotatingWriter`].
    ///
    /// # Errors
    ///
    /// Return an error if the path has no file name, or if the parent directory or the active
    /// file cannot be created.
    pub fn build(self) -> Result<RotatingWriter, Error> {
        let Self {
            path,
            max_size,
            max_backups,
            max_age_days,
            local_time,
            #[cfg(test)]
            now,
        } = self;

        let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
            return Err(Error::new(
                ErrorKind::SinkOpen,
                "rotating file path must end with a UTF-8 file name",
            ));
        };
        let (stem, ext) = match filename.rfind('.') {
            Some(pos) if pos > 0 => (filename[..pos].to_string(), filename[pos..].to_string()),
            _ => (filename.to_string(), String::new()),
        };

        let log_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&log_dir).map_err(|err| {
            Error::new(ErrorKind::SinkOpen, "failed to create log directory").with_source(err)
        })?;

        let mut state = State {
            path,
            log_dir,
            stem,
            ext,
            max_size,
            max_backups,
            max_age_days,
            local_time,
            current_filesize: 0,
            #[cfg(test)]
            now,
        };

        let writer = match fs::metadata(&state.path) {
            Ok(metadata) if metadata.is_file() => {
                // continue to use the existing active file
                state.current_filesize = metadata.len();
                OpenOptions::new()
                    .append(true)
                    .open(&state.path)
                    .map_err(|err| {
                        Error::new(ErrorKind::SinkOpen, "failed to open current log")
                            .with_source(err)
                    })?
            }
            _ => state.create_log_writer().map_err(|err| {
                Error::new(ErrorKind::SinkOpen, "failed to create log file").with_source(err)
            })?,
        };

        Ok(RotatingWriter { state, writer })
    }
}

#[derive(Debug)]
struct Backup {
    filepath: PathBuf,
    datetime: DateTime,
    millis: u32,
}

#[derive(Debug)]
struct State {
    path: PathBuf,
    log_dir: PathBuf,
    stem: String,
    ext: String,
    max_size: u64,
    max_backups: usize,
    max_age_days: u64,
    local_time: bool,
    current_filesize: u64,
    #[cfg(test)]
    now: Option<Zoned>,
}

impl State {
    fn now(&self) -> Zoned {
        #[cfg(test)]
        let now = self.now.clone().unwrap_or_else(Zoned::now);
        #[cfg(not(test))]
        let now = Zoned::now();
        if self.local_time {
            now
        } else {
            now.with_time_zone(TimeZone::UTC)
        }
    }

    fn create_log_writer(&self) -> io::Result<File> {
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
    }

    fn backup_path(&self, now: &Zoned) -> PathBuf {
        let millis = now.subsec_nanosecond() / 1_000_000;
        let filename = format!(
            "{}-{}.{millis:03}{}",
            self.stem,
            now.strftime(BACKUP_DATE_FORMAT),
            self.ext
        );
        self.log_dir.join(filename)
    }

    fn parse_backup(&self, filename: &str) -> Option<(DateTime, u32)> {
        let rest = filename.strip_prefix(self.stem.as_str())?.strip_prefix('-')?;
        let stamp = rest.strip_suffix(self.ext.as_str())?;
        let (datetime, millis) = stamp.rsplit_once('.')?;
        if millis.len() != 3 {
            return None;
        }
        let datetime = DateTime::strptime(BACKUP_DATE_FORMAT, datetime).ok()?;
        let millis = millis.parse().ok()?;
        Some((datetime, millis))
    }

    fn list_backups(&self) -> io::Result<Vec<Backup>> {
        let backups = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let metadata = entry.metadata().ok()?;

                // Only regular files are ever created as backups.
                if !metadata.is_file() {
                    return None;
                }

                let filename = entry.file_name();
                let filename = filename.to_str()?;
                let (datetime, millis) = self.parse_backup(filename)?;
                Some(Backup {
                    filepath: entry.path(),
                    datetime,
                    millis,
                })
            })
            .collect();

        Ok(backups)
    }

    fn remove_stale_backups(&self, now: &Zoned) -> io::Result<()> {
        if self.max_backups == 0 && self.max_age_days == 0 {
            return Ok(());
        }

        let mut backups = self.list_backups()?;
        // newest first
        backups.sort_by(|a, b| (b.datetime, b.millis).cmp(&(a.datetime, a.millis)));

        let mut stale = vec![];
        if self.max_backups > 0 && backups.len() > self.max_backups {
            stale.extend(backups.drain(self.max_backups..));
        }
        if self.max_age_days > 0 {
            let days = i64::try_from(self.max_age_days).unwrap_or(i64::MAX);
            let cutoff = Span::new()
                .try_days(days)
                .ok()
                .and_then(|age| now.datetime().checked_sub(age).ok());
            if let Some(cutoff) = cutoff {
                stale.extend(backups.into_iter().filter(|backup| backup.datetime < cutoff));
            }
        }

        for backup in stale {
            fs::remove_file(&backup.filepath)?;
        }
        Ok(())
    }
}

fn trap(err: &Error) {
    let _ = writeln!(io::stderr(), "{err}");
}
