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

//! Logscope is a scoped logging facade. Application code logs through named scopes whose level,
//! stack trace and caller settings can be tuned at runtime from any thread, and records from the
//! `log` crate, panics and the gRPC stack are redirected into the same pipeline.
//!
//! # Overview
//!
//! Logging works before any configuration: records are written to stderr in console encoding and
//! the `default` scope emits at `info`. Call [`configure`] once at startup to replace the
//! pipeline, and [`sync`] before the process exits.
//!
//! # Examples
//!
//! ```
//! use logscope::Level;
//! use logscope::Options;
//!
//! let ads = logscope::register_scope("ads", "Aggregated discovery.");
//!
//! let options = Options {
//!     output_paths: vec!["stdout".to_string()],
//!     json_encoding: true,
//!     ..Options::default()
//! }
//! .with_output_levels("info,ads:debug")
//! .with_stack_trace_levels("error")
//! .with_log_callers("ads");
//! logscope::configure(&options).unwrap();
//!
//! logscope::info!("listening");
//! logscope::debug!(scope: ads, "pushed {} clusters", 12);
//! ads.emit(Level::Warn, format_args!("slow push"), &[("node", &"sidecar-1" as &dyn std::fmt::Display)]);
//! log::info!("records of the log crate land in the same sink");
//!
//! logscope::sync().unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod macros;

pub mod encoder;
pub mod record;
pub mod sink;
pub mod time;

mod capture;
mod configure;
mod directive;
mod error;
mod level;
mod options;
mod pipeline;
mod scope;

pub use self::capture::StdLogWriter;
pub use self::configure::configure;
pub use self::pipeline::sync;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::level::Level;
pub use self::options::DEFAULT_LEVELS_ENV;
pub use self::options::Options;
pub use self::scope::DEFAULT_SCOPE_NAME;
pub use self::scope::Scope;
pub use self::scope::default_scope;
pub use self::scope::find_scope;
pub use self::scope::register_scope;
pub use self::scope::scopes;
pub use self::scope::try_register_scope;
pub use self::time::TimeFormat;
