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
use std::str::FromStr;

use crate::Error;
use crate::ErrorKind;

/// Logging levels, ordered from the most verbose to [`Level::None`].
///
/// `None` disables output when used as an output level, and disables stack
/// traces when used as a stack trace level.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum Level {
    /// Debug level.
    Debug = 0,
    /// Info level.
    Info = 1,
    /// Warn level.
    Warn = 2,
    /// Error level.
    Error = 3,
    /// Disables the gate it is applied to.
    None = 4,
}

impl Level {
    /// The lowercase token used in encoded records and directives.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::None => "none",
        }
    }

    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(v: u8) -> Level {
        match v {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            3 => Level::Error,
            _ => Level::None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const LEVELS: [Level; 5] = [
            Level::Debug,
            Level::Info,
            Level::Warn,
            Level::Error,
            Level::None,
        ];

        LEVELS
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::new(ErrorKind::ConfigParse, format!("invalid level '{s}'"))
            })
    }
}

impl TryFrom<String> for Level {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        value.parse()
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}

#[cfg(feature = "grpc")]
impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            _ => Level::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("Warn".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("error".parse::<Level>().unwrap(), Level::Error);
        assert_eq!("none".parse::<Level>().unwrap(), Level::None);

        let err = "verbose".parse::<Level>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigParse);
        assert_eq!(err.to_string(), "invalid level 'verbose'");
    }

    #[test]
    fn test_deserialize_from_string() {
        assert_eq!(Level::try_from("WARN".to_string()).unwrap(), Level::Warn);
        let level: Level = serde_json::from_str(r#""error""#).unwrap();
        assert_eq!(level, Level::Error);
        assert!(serde_json::from_str::<Level>(r#""loud""#).is_err());
    }

    #[test]
    fn test_level_order_and_round_trip_through_u8() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::None);

        for level in [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::None] {
            assert_eq!(Level::from_u8(level.as_u8()), level);
        }
    }

    #[test]
    fn test_log_crate_trace_maps_to_debug() {
        assert_eq!(Level::from(log::Level::Trace), Level::Debug);
        assert_eq!(Level::from(log::Level::Error), Level::Error);
    }
}
