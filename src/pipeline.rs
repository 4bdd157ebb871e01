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

//! The published pipeline shared by every emitter.
//!
//! Two cores encode into the same sink. The emission core serves scopes and is always enabled,
//! since each scope gates its own records. The capture core serves redirected third-party
//! loggers, which have no scope of their own, and gates on the `default` scope.

use std::fmt;
use std::sync::Arc;
use std::sync::LazyLock;

use arc_swap::ArcSwap;
use arc_swap::Guard;
use jiff::Timestamp;

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::encoder::ConsoleEncoder;
use crate::encoder::Encoder;
use crate::record::Caller;
use crate::record::KeyValues;
use crate::record::Record;
use crate::scope::default_scope;
use crate::sink::Sink;
use crate::sink::Stderr;
use crate::time::TimeFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Always,
    DefaultScope,
}

#[derive(Debug)]
struct Core {
    gate: Gate,
    encoder: Encoder,
    time_format: TimeFormat,
    sink: Arc<dyn Sink>,
    error_sink: Arc<dyn Sink>,
}

impl Core {
    fn enabled(&self, level: Level) -> bool {
        match self.gate {
            Gate::Always => level != Level::None,
            Gate::DefaultScope => default_scope().enabled(level),
        }
    }

    fn log(&self, record: &Record) {
        let result = self
            .encoder
            .encode(record)
            .and_then(|bytes| self.sink.write(&bytes));

        if let Err(err) = result {
            self.report(&err);
        }
    }

    /// Write one diagnostic line to the error sink; its own failure is dropped.
    fn report(&self, err: &Error) {
        let time = self.time_format.format(Timestamp::now());
        let line = format!("{} logscope: {err}\n", time.as_str());
        let _ = self.error_sink.write(line.as_bytes());
    }
}

/// The encoder, sinks and cores of one configuration.
#[derive(Debug)]
pub(crate) struct Pipeline {
    emission: Core,
    capture: Core,
    sink: Arc<dyn Sink>,
    error_sink: Arc<dyn Sink>,
}

impl Pipeline {
    pub(crate) fn new(
        encoder: Encoder,
        time_format: TimeFormat,
        sink: Box<dyn Sink>,
        error_sink: Box<dyn Sink>,
    ) -> Pipeline {
        let sink: Arc<dyn Sink> = Arc::from(sink);
        let error_sink: Arc<dyn Sink> = Arc::from(error_sink);
        let core = |gate| Core {
            gate,
            encoder: encoder.clone(),
            time_format,
            sink: sink.clone(),
            error_sink: error_sink.clone(),
        };

        Pipeline {
            emission: core(Gate::Always),
            capture: core(Gate::DefaultScope),
            sink,
            error_sink,
        }
    }

    fn bootstrap() -> Pipeline {
        let time_format = TimeFormat::default();
        Pipeline::new(
            ConsoleEncoder::default().time_format(time_format).into(),
            time_format,
            Stderr::default().into(),
            Stderr::default().into(),
        )
    }

    /// The write sink every record is handed to.
    #[cfg(test)]
    pub(crate) fn sink(&self) -> &dyn Sink {
        self.sink.as_ref()
    }

    fn sync(&self) -> Result<(), Error> {
        let as_flush = |err: Error| match err.kind() {
            ErrorKind::Flush => err,
            _ => Error::new(ErrorKind::Flush, "failed to flush sink").with_source(err),
        };
        let synced = self.sink.sync().map_err(as_flush);
        let error_synced = self.error_sink.sync().map_err(as_flush);
        synced.and(error_synced)
    }
}

static PIPELINE: LazyLock<ArcSwap<Pipeline>> =
    LazyLock::new(|| ArcSwap::from_pointee(Pipeline::bootstrap()));

/// The currently published pipeline.
pub(crate) fn current() -> Guard<Arc<Pipeline>> {
    PIPELINE.load()
}

/// Replace the published pipeline. Emitters holding the previous one finish on it.
pub(crate) fn publish(pipeline: Pipeline) {
    PIPELINE.store(Arc::new(pipeline));
}

/// Hand a scope's record to the emission core.
pub(crate) fn emit(record: &Record) {
    let pipeline = current();
    if pipeline.emission.enabled(record.level()) {
        pipeline.emission.log(record);
    }
}

/// Whether the capture core accepts records at `level`.
pub(crate) fn capture_enabled(level: Level) -> bool {
    current().capture.enabled(level)
}

/// Hand a redirected third-party record to the capture core.
///
/// The record is attributed to the `default` scope and follows its stack trace and caller
/// policy. `source` names the originating logger and is added as the `target` field.
pub(crate) fn capture(
    level: Level,
    message: &dyn fmt::Display,
    source: &str,
    caller: Option<Caller<'_>>,
    kvs: KeyValues<'_>,
) {
    let pipeline = current();
    if !pipeline.capture.enabled(level) {
        return;
    }

    let scope = default_scope();
    let caller = caller.filter(|_| scope.log_callers());
    let stack = scope
        .stack_enabled(level)
        .then(|| std::backtrace::Backtrace::force_capture().to_string());

    let mut fields: Vec<(&str, &dyn fmt::Display)> = Vec::with_capacity(kvs.len() + 1);
    if !source.is_empty() {
        fields.push(("target", &source as &dyn fmt::Display));
    }
    fields.extend_from_slice(kvs);

    let record = Record::new(level, scope.name(), message)
        .with_caller(caller)
        .with_stack(stack.as_deref())
        .with_kvs(&fields);
    pipeline.capture.log(&record);
}

/// Flush the write sink, then the error sink, of the current pipeline.
///
/// The error sink is flushed even if the write sink fails.
///
/// Records handed to the pipeline before this call have reached the operating system once it
/// returns.
///
/// # Errors
///
/// Return an [`ErrorKind::Flush`] error carrying the first sink failure.
pub fn sync() -> Result<(), Error> {
    current().sync()
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::encoder::JsonEncoder;

    #[derive(Debug, Default, Clone)]
    struct Memory(Arc<Mutex<Vec<u8>>>);

    impl Memory {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Sink for Memory {
        fn write(&self, bytes: &[u8]) -> Result<(), Error> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl Sink for Broken {
        fn write(&self, _: &[u8]) -> Result<(), Error> {
            Err(Error::sink_write(io::Error::other("disk on fire")))
        }

        fn sync(&self) -> Result<(), Error> {
            Err(Error::new(ErrorKind::SinkWrite, "sync refused"))
        }
    }

    #[derive(Debug, Default, Clone)]
    struct CountSyncs(Arc<AtomicUsize>);

    impl Sink for CountSyncs {
        fn write(&self, _: &[u8]) -> Result<(), Error> {
            Ok(())
        }

        fn sync(&self) -> Result<(), Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn pipeline(sink: impl Sink, error_sink: impl Sink) -> Pipeline {
        Pipeline::new(
            JsonEncoder::default().into(),
            TimeFormat::UtcIso,
            sink.into(),
            error_sink.into(),
        )
    }

    #[test]
    fn test_emission_core_writes_encoded_record() {
        let out = Memory::default();
        let errors = Memory::default();
        let pipeline = pipeline(out.clone(), errors.clone());

        let record = Record::new(Level::Debug, "any", &"hello");
        pipeline.emission.log(&record);

        let text = out.text();
        assert!(text.ends_with("\"level\":\"debug\",\"scope\":\"any\",\"msg\":\"hello\"}\n"));
        assert!(errors.text().is_empty());
    }

    #[test]
    fn test_write_failure_reports_one_diagnostic() {
        let errors = Memory::default();
        let pipeline = pipeline(Broken, errors.clone());

        pipeline.emission.log(&Record::new(Level::Error, "any", &"lost"));

        let text = errors.text();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains(" logscope: failed to write to sink"), "{text}");
        assert!(text.contains("disk on fire"), "{text}");
    }

    #[test]
    fn test_failing_error_sink_is_ignored() {
        let pipeline = pipeline(Broken, Broken);
        pipeline.emission.log(&Record::new(Level::Info, "any", &"lost"));
    }

    #[test]
    fn test_emission_gate_is_always_open() {
        let pipeline = pipeline(Memory::default(), Memory::default());
        assert!(pipeline.emission.enabled(Level::Debug));
        assert!(!pipeline.emission.enabled(Level::None));
    }

    #[test]
    fn test_sync_reports_flush_kind() {
        let err = pipeline(Broken, Memory::default()).sync().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Flush);

        let err = pipeline(Memory::default(), Broken).sync().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Flush);

        pipeline(Memory::default(), Memory::default()).sync().unwrap();
    }

    #[test]
    fn test_sync_flushes_error_sink_after_write_sink_fails() {
        let errors = CountSyncs::default();
        let err = pipeline(Broken, errors.clone()).sync().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Flush);
        assert_eq!(errors.0.load(Ordering::SeqCst), 1);
    }
}
