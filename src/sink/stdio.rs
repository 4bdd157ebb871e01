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

use std::io::Write;

use crate::Error;
use crate::sink::Sink;

/// A sink writing to the process stdout.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Stdout {}

impl Sink for Stdout {
    fn write(&self, bytes: &[u8]) -> Result<(), Error> {
        std::io::stdout()
            .lock()
            .write_all(bytes)
            .map_err(Error::sink_write)
    }

    fn sync(&self) -> Result<(), Error> {
        std::io::stdout().flush().map_err(Error::flush)
    }
}

/// A sink writing to the process stderr.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Stderr {}

impl Sink for Stderr {
    fn write(&self, bytes: &[u8]) -> Result<(), Error> {
        std::io::stderr()
            .lock()
            .write_all(bytes)
            .map_err(Error::sink_write)
    }

    fn sync(&self) -> Result<(), Error> {
        std::io::stderr().flush().map_err(Error::flush)
    }
}
