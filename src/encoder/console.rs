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
use crate::ErrorKind;
use crate::encoder::KvMap;
use crate::encoder::encode_error;
use crate::record::Record;
use crate::time::TimeFormat;

/// A console encoder writing tab-separated columns.
///
/// Output format:
///
/// ```text
/// 2024-08-11 22:44:57.172	info	default	hi
/// 2024-08-11 22:44:57.173	error	ads	src/main.rs:51	boom	{"attempt":"3"}
/// <stack trace lines>
/// ```
#[derive(Default, Debug, Clone)]
pub struct ConsoleEncoder {
    time_format: TimeFormat,
}

impl ConsoleEncoder {
    /// Set how the `time` column is rendered.
    pub fn time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    pub(crate) fn encode(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let mut bytes = Vec::with_capacity(128);
        self.write_line(&mut bytes, record).map_err(|err| {
            Error::new(ErrorKind::Encode, "failed to encode record").with_source(err)
        })?;

        if !record.kvs().is_empty() {
            bytes.push(b'\t');
            let kvs = KvMap {
                kvs: record.kvs(),
                escape_reserved: false,
            };
            serde_json::to_writer(&mut bytes, &kvs).map_err(encode_error)?;
        }
        if let Some(stack) = record.stack() {
            bytes.push(b'\n');
            bytes.extend_from_slice(stack.trim_end().as_bytes());
        }
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn write_line(&self, bytes: &mut Vec<u8>, record: &Record) -> std::io::Result<()> {
        let time = self.time_format.format(record.time());
        bytes.extend_from_slice(time.as_bytes());
        write!(bytes, "\t{}\t{}", record.level(), record.scope())?;
        if let Some(caller) = record.caller() {
            write!(bytes, "\t{caller}")?;
        }
        write!(bytes, "\t{}", record.message())
    }
}
