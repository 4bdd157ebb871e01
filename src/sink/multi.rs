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

use crate::Error;
use crate::ErrorKind;
use crate::sink::Sink;

/// A sink fanning every record out to several sinks in declared order.
///
/// A failure in one sink does not stop the record from reaching the others.
#[derive(Debug)]
pub struct MultiSink {
    sinks: Vec<Box<dyn Sink>>,
}

impl MultiSink {
    /// Create a multi-sink over `sinks`.
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }

    fn for_each(
        &self,
        kind: ErrorKind,
        message: &'static str,
        f: impl Fn(&dyn Sink) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut failed: Option<Error> = None;
        for sink in &self.sinks {
            if let Err(err) = f(sink.as_ref()) {
                let combined = failed.unwrap_or_else(|| Error::new(kind, message));
                failed = Some(combined.with_source(err));
            }
        }
        failed.map_or(Ok(()), Err)
    }
}

impl Sink for MultiSink {
    fn write(&self, bytes: &[u8]) -> Result<(), Error> {
        self.for_each(ErrorKind::SinkWrite, "failed to write to sinks", |sink| {
            sink.write(bytes)
        })
    }

    fn sync(&self) -> Result<(), Error> {
        self.for_each(ErrorKind::Flush, "failed to flush sinks", |sink| sink.sync())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    struct Memory(Arc<Mutex<Vec<u8>>>);

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
            Err(Error::sink_write(io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_failure_does_not_stop_siblings() {
        let first = Arc::new(Mutex::new(vec![]));
        let last = Arc::new(Mutex::new(vec![]));
        let sink = MultiSink::new(vec![
            Memory(first.clone()).into(),
            Broken.into(),
            Memory(last.clone()).into(),
        ]);

        let err = sink.write(b"line\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkWrite);
        assert_eq!(err.sources().len(), 1);
        assert_eq!(first.lock().unwrap().as_slice(), b"line\n");
        assert_eq!(last.lock().unwrap().as_slice(), b"line\n");
    }
}
