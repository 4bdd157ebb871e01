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

//! Redirection of third-party loggers into the capture core.
//!
//! Each adapter is installed at most once per process and stays installed. A flag toggled by
//! every [`configure`](crate::configure) call decides whether it forwards records.

use crate::Error;
use crate::Options;

pub use self::writer::StdLogWriter;

#[cfg(feature = "grpc")]
mod grpc;
mod log_crate;
mod panic;
mod writer;

/// Register the adapters `options` asks for, then toggle all of them.
///
/// No toggle changes unless every registration succeeds.
pub(crate) fn install(options: &Options) -> Result<(), Error> {
    #[cfg(not(feature = "grpc"))]
    if options.log_grpc {
        return Err(Error::new(
            crate::ErrorKind::Capture,
            "capturing gRPC logs requires the 'grpc' feature",
        ));
    }
    #[cfg(feature = "grpc")]
    if options.log_grpc {
        grpc::register()?;
    }
    if options.capture_log {
        log_crate::register()?;
    }
    if options.capture_panics {
        panic::register();
    }

    #[cfg(feature = "grpc")]
    grpc::set_enabled(options.log_grpc);
    log_crate::set_enabled(options.capture_log);
    panic::set_enabled(options.capture_panics);
    Ok(())
}
