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
use std::sync::OnceLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::pipeline;
use crate::record::Caller;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Forwards every `log` crate record to the capture core.
struct LogCrateLogger(());

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        ENABLED.load(Ordering::Acquire) && pipeline::capture_enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut visitor = KeyValueVisitor { kvs: Vec::new() };
        // The visitor never fails.
        let _ = record.key_values().visit(&mut visitor);
        let kvs = visitor
            .kvs
            .iter()
            .map(|(k, v)| (k.as_str(), v as &dyn fmt::Display))
            .collect::<Vec<_>>();

        let caller = match (record.file(), record.line()) {
            (Some(file), Some(line)) => Some(Caller::new(file, line)),
            _ => None,
        };

        pipeline::capture(
            Level::from(record.level()),
            record.args(),
            record.target(),
            caller,
            &kvs,
        );
    }

    fn flush(&self) {
        let _ = pipeline::sync();
    }
}

struct KeyValueVisitor<'kvs> {
    kvs: Vec<(log::kv::Key<'kvs>, log::kv::Value<'kvs>)>,
}

impl<'kvs> log::kv::VisitSource<'kvs> for KeyValueVisitor<'kvs> {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        self.kvs.push((key, value));
        Ok(())
    }
}

/// Register the `log` crate global logger once per process.
///
/// The global maximum level is set to `Trace`; the capture core applies the `default` scope's
/// gate itself.
pub(super) fn register() -> Result<(), Error> {
    static LOGGER: LogCrateLogger = LogCrateLogger(());
    static REGISTERED: OnceLock<bool> = OnceLock::new();

    let registered = *REGISTERED.get_or_init(|| {
        let registered = log::set_logger(&LOGGER).is_ok();
        if registered {
            log::set_max_level(log::LevelFilter::Trace);
        }
        registered
    });
    if !registered {
        return Err(Error::new(
            ErrorKind::Capture,
            "the log crate global logger has already been set by another library",
        ));
    }
    Ok(())
}

pub(super) fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Release);
}
