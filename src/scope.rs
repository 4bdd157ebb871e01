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

//! Named logging domains with runtime-adjustable gates.

use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::pipeline;
use crate::record::Caller;
use crate::record::Record;

/// The name of the scope that always exists.
pub const DEFAULT_SCOPE_NAME: &str = "default";

/// A named channel of logs with its own output level, stack trace level and caller policy.
///
/// Every field is stored in an atomic, so a scope may be tuned from any thread while other
/// threads emit through it.
pub struct Scope {
    name: String,
    description: String,
    output_level: AtomicU8,
    stack_trace_level: AtomicU8,
    log_callers: AtomicBool,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("output_level", &self.output_level())
            .field("stack_trace_level", &self.stack_trace_level())
            .field("log_callers", &self.log_callers())
            .finish()
    }
}

impl Scope {
    fn new(
        name: &str,
        description: &str,
        output_level: Level,
        stack_trace_level: Level,
        log_callers: bool,
    ) -> Scope {
        Scope {
            name: name.to_string(),
            description: description.to_string(),
            output_level: AtomicU8::new(output_level.as_u8()),
            stack_trace_level: AtomicU8::new(stack_trace_level.as_u8()),
            log_callers: AtomicBool::new(log_callers),
        }
    }

    /// The unique name of this scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The description given when the scope was first registered.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Records below this level are dropped.
    pub fn output_level(&self) -> Level {
        Level::from_u8(self.output_level.load(Ordering::Acquire))
    }

    /// Change the output level.
    pub fn set_output_level(&self, level: Level) {
        self.output_level.store(level.as_u8(), Ordering::Release);
    }

    /// Records at or above this level carry a stack trace, unless it is [`Level::None`].
    pub fn stack_trace_level(&self) -> Level {
        Level::from_u8(self.stack_trace_level.load(Ordering::Acquire))
    }

    /// Change the stack trace level.
    pub fn set_stack_trace_level(&self, level: Level) {
        self.stack_trace_level.store(level.as_u8(), Ordering::Release);
    }

    /// Whether records carry the caller's `file:line`.
    pub fn log_callers(&self) -> bool {
        self.log_callers.load(Ordering::Acquire)
    }

    /// Change the caller capture flag.
    pub fn set_log_callers(&self, enabled: bool) {
        self.log_callers.store(enabled, Ordering::Release);
    }

    /// Whether records at `level` pass the output gate.
    pub fn enabled(&self, level: Level) -> bool {
        level != Level::None && level >= self.output_level()
    }

    /// Whether [`Level::Debug`] records pass the output gate.
    pub fn debug_enabled(&self) -> bool {
        self.enabled(Level::Debug)
    }

    /// Whether [`Level::Info`] records pass the output gate.
    pub fn info_enabled(&self) -> bool {
        self.enabled(Level::Info)
    }

    /// Whether [`Level::Warn`] records pass the output gate.
    pub fn warn_enabled(&self) -> bool {
        self.enabled(Level::Warn)
    }

    /// Whether [`Level::Error`] records pass the output gate.
    pub fn error_enabled(&self) -> bool {
        self.enabled(Level::Error)
    }

    pub(crate) fn stack_enabled(&self, level: Level) -> bool {
        let threshold = self.stack_trace_level();
        threshold != Level::None && level >= threshold
    }

    /// Emit a record through this scope.
    ///
    /// The record is dropped if `level` does not pass the scope's output gate. Write failures are
    /// reported to the configured error sink and never surface to the caller.
    #[track_caller]
    pub fn emit(
        &self,
        level: Level,
        message: fmt::Arguments<'_>,
        kvs: &[(&str, &dyn fmt::Display)],
    ) {
        if !self.enabled(level) {
            return;
        }

        let location = Location::caller();
        let caller = self
            .log_callers()
            .then(|| Caller::from_location(location));
        let stack = self
            .stack_enabled(level)
            .then(|| std::backtrace::Backtrace::force_capture().to_string());

        let record = Record::new(level, &self.name, &message)
            .with_caller(caller)
            .with_stack(stack.as_deref())
            .with_kvs(kvs);
        pipeline::emit(&record);
    }

    /// Emit `message` at [`Level::Debug`].
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        if self.debug_enabled() {
            self.emit(Level::Debug, format_args!("{message}"), &[]);
        }
    }

    /// Emit `message` at [`Level::Info`].
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        if self.info_enabled() {
            self.emit(Level::Info, format_args!("{message}"), &[]);
        }
    }

    /// Emit `message` at [`Level::Warn`].
    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        if self.warn_enabled() {
            self.emit(Level::Warn, format_args!("{message}"), &[]);
        }
    }

    /// Emit `message` at [`Level::Error`].
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        if self.error_enabled() {
            self.emit(Level::Error, format_args!("{message}"), &[]);
        }
    }
}

type Registry = RwLock<HashMap<String, Arc<Scope>>>;

static DEFAULT_SCOPE: LazyLock<Arc<Scope>> = LazyLock::new(|| {
    Arc::new(Scope::new(
        DEFAULT_SCOPE_NAME,
        "Unscoped logging messages.",
        Level::Info,
        Level::None,
        false,
    ))
});

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let default = DEFAULT_SCOPE.clone();
    RwLock::new(HashMap::from([(DEFAULT_SCOPE_NAME.to_string(), default)]))
});

/// The distinguished `default` scope.
pub fn default_scope() -> Arc<Scope> {
    DEFAULT_SCOPE.clone()
}

/// Register a scope, or return the existing one with the same name.
///
/// A new scope inherits the output level, stack trace level and caller flag of the `default`
/// scope at the time of the call.
///
/// # Errors
///
/// Return an error if the name is empty or contains `:` or `,`, which are reserved by the
/// directive syntax.
pub fn try_register_scope(name: &str, description: &str) -> Result<Arc<Scope>, Error> {
    if name.is_empty() || name.contains([':', ',']) {
        return Err(Error::new(
            ErrorKind::InvalidScopeName,
            format!("scope name '{name}' is invalid, it cannot be empty or contain colons or commas"),
        ));
    }

    if let Some(scope) = find_scope(name) {
        return Ok(scope);
    }

    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    let scope = registry.entry(name.to_string()).or_insert_with(|| {
        let default = &*DEFAULT_SCOPE;
        Arc::new(Scope::new(
            name,
            description,
            default.output_level(),
            default.stack_trace_level(),
            default.log_callers(),
        ))
    });
    Ok(scope.clone())
}

/// Register a scope, or return the existing one with the same name.
///
/// # Panics
///
/// Panic if the name is empty or contains `:` or `,`. See [`try_register_scope`].
pub fn register_scope(name: &str, description: &str) -> Arc<Scope> {
    try_register_scope(name, description)
        .expect("register_scope should be called with a name free of ':' and ','")
}

/// Look up a registered scope.
pub fn find_scope(name: &str) -> Option<Arc<Scope>> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry.get(name).cloned()
}

/// A snapshot of every registered scope.
pub fn scopes() -> HashMap<String, Arc<Scope>> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry.clone()
}
