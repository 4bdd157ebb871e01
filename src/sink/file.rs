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

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::sink::Sink;

/// A sink appending to a plain file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open `path` for append, creating it if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<FileSink, Error> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|err| Error::sink_open(&path.display().to_string(), err))?;

        Ok(FileSink {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// The path this sink appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Sink for FileSink {
    fn write(&self, bytes: &[u8]) -> Result<(), Error> {
        self.file()
            .write_all(bytes)
            .map_err(|err| Error::sink_write(err).with_context("path", self.path.display()))
    }

    fn sync(&self) -> Result<(), Error> {
        let mut file = self.file();
        file.flush()
            .and_then(|()| file.sync_data())
            .map_err(|err| Error::flush(err).with_context("path", self.path.display()))
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let file = self.file.get_mut().unwrap_or_else(|e| e.into_inner());
        let _ = file.flush();
    }
}
