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

use std::panic::PanicHookInfo;
use std::sync::Once;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::Level;
use crate::pipeline;
use crate::record::Caller;

static ENABLED: AtomicBool = AtomicBool::new(false);

fn payload_message<'a>(info: &'a PanicHookInfo<'_>) -> &'a str {
    let payload = info.payload();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "Box<dyn Any>"
    }
}

/// Chain a panic hook that logs the panic at `error` through the capture core, then runs the
/// previous hook.
pub(super) fn register() {
    static REGISTER: Once = Once::new();

    REGISTER.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if ENABLED.load(Ordering::Acquire) && pipeline::capture_enabled(Level::Error) {
                let thread = std::thread::current();
                let thread = thread.name().unwrap_or("<unnamed>");
                let caller = info
                    .location()
                    .map(|location| Caller::new(location.file(), location.line()));
                pipeline::capture(
                    Level::Error,
                    &payload_message(info),
                    "panic",
                    caller,
                    &[("thread", &thread as &dyn std::fmt::Display)],
                );
                let _ = pipeline::sync();
            }
            previous(info);
        }));
    });
}

pub(super) fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Release);
}
