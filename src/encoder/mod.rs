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

//! Encoders turning a [`Record`] into one line of bytes.

use std::fmt;

pub use self::console::ConsoleEncoder;
pub use self::json::JsonEncoder;

use crate::Error;
use crate::ErrorKind;
use crate::record::Record;

mod console;
mod json;

/// The encoder used by both cores: JSON or console.
#[derive(Debug, Clone)]
pub enum Encoder {
    /// One JSON object per line.
    Json(JsonEncoder),
    /// Tab-separated columns per line.
    Console(ConsoleEncoder),
}

impl Encoder {
    /// Encode a record into a newline-terminated line.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, Error> {
        match self {
            Encoder::Json(encoder) => encoder.encode(record),
            Encoder::Console(encoder) => encoder.encode(record),
        }
    }
}

impl From<JsonEncoder> for Encoder {
    fn from(encoder: JsonEncoder) -> Self {
        Encoder::Json(encoder)
    }
}

impl From<ConsoleEncoder> for Encoder {
    fn from(encoder: ConsoleEncoder) -> Self {
        Encoder::Console(encoder)
    }
}

pub(crate) fn serialize_display<S>(
    value: &&dyn fmt::Display,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(*value)
}

/// Keys the JSON encoder writes itself.
const RESERVED_KEYS: [&str; 6] = ["time", "level", "scope", "caller", "msg", "stack"];

/// Key-value fields serialized as a JSON map with stringified values.
///
/// With `escape_reserved`, a field named like a record key is written with a leading `_` so that
/// every JSON line has unique keys.
pub(crate) struct KvMap<'a> {
    pub(crate) kvs: crate::record::KeyValues<'a>,
    pub(crate) escape_reserved: bool,
}

impl serde::Serialize for KvMap<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use std::borrow::Cow;

        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.kvs.len()))?;
        for (key, value) in self.kvs {
            let key = if self.escape_reserved && RESERVED_KEYS.contains(key) {
                Cow::Owned(format!("_{key}"))
            } else {
                Cow::Borrowed(*key)
            };
            map.serialize_entry(&key, &format_args!("{value}"))?;
        }
        map.end()
    }
}

fn encode_error(err: serde_json::Error) -> Error {
    Error::new(ErrorKind::Encode, "failed to encode record").with_source(err)
}
