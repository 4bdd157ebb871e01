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

use std::fmt;

use serde::Serialize;

use crate::Error;
use crate::encoder::KvMap;
use crate::encoder::encode_error;
use crate::encoder::serialize_display;
use crate::record::Record;
use crate::time::TimeFormat;

/// A JSON encoder.
///
/// Output format:
///
/// ```json
/// {"time":"2024-08-11 22:44:57.172","level":"info","scope":"default","msg":"hi"}
/// {"time":"2024-08-11 22:44:57.173","level":"error","scope":"ads","caller":"src/main.rs:51","msg":"boom","attempt":"3","stack":"..."}
/// ```
#[derive(Default, Debug, Clone)]
pub struct JsonEncoder {
    time_format: TimeFormat,
}

impl JsonEncoder {
    /// Set how the `time` field is rendered.
    pub fn time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }
}

#[derive(Serialize)]
struct RecordLine<'a> {
    time: &'a str,
    level: &'a str,
    scope: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<String>,
    #[serde(serialize_with = "serialize_display")]
    msg: &'a dyn fmt::Display,
    #[serde(flatten)]
    kvs: KvMap<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<&'a str>,
}

impl JsonEncoder {
    pub(crate) fn encode(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let time = self.time_format.format(record.time());
        let line = RecordLine {
            time: time.as_str(),
            level: record.level().as_str(),
            scope: record.scope(),
            caller: record.caller().map(|caller| caller.to_string()),
            msg: record.message(),
            kvs: KvMap {
                kvs: record.kvs(),
                escape_reserved: true,
            },
            stack: record.stack(),
        };

        let mut bytes = serde_json::to_vec(&line).map_err(encode_error)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
