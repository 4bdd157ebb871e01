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
use std::fmt::Write;
use std::sync::OnceLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tracing::Event;
use tracing::Metadata;
use tracing::Subscriber;
use tracing::field::Field;
use tracing::field::Visit;
use tracing::subscriber::Interest;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;

use crate::Error;
use crate::ErrorKind;
use crate::pipeline;
use crate::record::Caller;

/// Targets of the crates that make up the gRPC stack.
const GRPC_TARGETS: [&str; 5] = ["tonic", "h2", "tower", "hyper", "grpc"];

static ENABLED: AtomicBool = AtomicBool::new(false);

fn is_grpc_target(target: &str) -> bool {
    GRPC_TARGETS.iter().any(|prefix| {
        target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// A tracing layer forwarding gRPC events to the capture core.
#[derive(Debug, Default)]
pub(super) struct GrpcLayer {}

impl<S: Subscriber> Layer<S> for GrpcLayer {
    fn register_callsite(&self, metadata: &'static Metadata<'static>) -> Interest {
        if is_grpc_target(metadata.target()) {
            Interest::sometimes()
        } else {
            Interest::never()
        }
    }

    fn enabled(&self, metadata: &Metadata<'_>, _: Context<'_, S>) -> bool {
        ENABLED.load(Ordering::Acquire)
            && is_grpc_target(metadata.target())
            && pipeline::capture_enabled(metadata.level().into())
    }

    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let kvs = visitor
            .fields
            .iter()
            .map(|(k, v)| (*k, v as &dyn fmt::Display))
            .collect::<Vec<_>>();

        let caller = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => Some(Caller::new(file, line)),
            _ => None,
        };

        pipeline::capture(
            metadata.level().into(),
            &visitor.message,
            metadata.target(),
            caller,
            &kvs,
        );
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.fields.push((field.name(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.fields.push((field.name(), format!("{value:?}")));
        }
    }
}

/// Set the global tracing subscriber once per process.
pub(super) fn register() -> Result<(), Error> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();

    let registered = *REGISTERED.get_or_init(|| {
        let subscriber = Registry::default().with(GrpcLayer::default());
        tracing::subscriber::set_global_default(subscriber).is_ok()
    });
    if !registered {
        return Err(Error::new(
            ErrorKind::Capture,
            "the global tracing subscriber has already been set by another library",
        ));
    }
    Ok(())
}

pub(super) fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grpc_targets() {
        assert!(is_grpc_target("tonic"));
        assert!(is_grpc_target("tonic::transport::server"));
        assert!(is_grpc_target("h2::codec"));
        assert!(is_grpc_target("hyper"));
        assert!(!is_grpc_target("tonics"));
        assert!(!is_grpc_target("my_app::grpc"));
        assert!(!is_grpc_target("hyperlocal"));
    }
}
