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

//! Destinations for encoded records.

use std::fmt;

pub use self::file::FileSink;
pub use self::multi::MultiSink;
pub use self::rotate::RotatingFile;
pub use self::rotate::RotationPolicy;
pub use self::stdio::Stderr;
pub use self::stdio::Stdout;

use crate::Error;

mod file;
mod multi;
pub mod rotate;
mod stdio;

/// An append-only destination for encoded records.
///
/// A single call to [`Sink::write`] carries one complete record, and implementations must not
/// interleave it with concurrent writes.
pub trait Sink: fmt::Debug + Send + Sync + 'static {
    /// Write one encoded record.
    fn write(&self, bytes: &[u8]) -> Result<(), Error>;

    /// Hand any buffered bytes to the operating system.
    ///
    /// Default to a no-op.
    fn sync(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Sink> From<T> for Box<dyn Sink> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// A sink that drops everything.
#[derive(Debug, Default)]
pub struct Discard;

impl Sink for Discard {
    fn write(&self, _: &[u8]) -> Result<(), Error> {
        Ok(())
    }
}

/// Open every path, in order.
///
/// `stdout` and `stderr` map to the process streams; any other path is opened for append and
/// created if missing. If any path fails to open, the sinks opened so far are closed and the
/// error is returned.
pub fn open(paths: &[String]) -> Result<Option<Box<dyn Sink>>, Error> {
    let mut sinks = Vec::with_capacity(paths.len());
    for path in paths {
        let sink: Box<dyn Sink> = match path.as_str() {
            "stdout" => Stdout::default().into(),
            "stderr" => Stderr::default().into(),
            path => FileSink::open(path)?.into(),
        };
        sinks.push(sink);
    }

    Ok(match sinks.len() {
        0 => None,
        1 => sinks.pop(),
        _ => Some(MultiSink::new(sinks).into()),
    })
}

/// Combine the opened output paths with the rotating file, output paths first.
pub fn compose(
    outputs: Option<Box<dyn Sink>>,
    rotating: Option<RotatingFile>,
) -> Box<dyn Sink> {
    match (outputs, rotating) {
        (Some(outputs), Some(rotating)) => MultiSink::new(vec![outputs, rotating.into()]).into(),
        (None, Some(rotating)) => rotating.into(),
        (Some(outputs), None) => outputs,
        (None, None) => Discard.into(),
    }
}
