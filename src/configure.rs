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

use std::sync::Arc;

use crate::Error;
use crate::Level;
use crate::Options;
use crate::capture;
use crate::directive::parse_directives;
use crate::directive::parse_scope_list;
use crate::encoder::ConsoleEncoder;
use crate::encoder::Encoder;
use crate::encoder::JsonEncoder;
use crate::pipeline;
use crate::pipeline::Pipeline;
use crate::scope::Scope;
use crate::scope::find_scope;
use crate::sink;
use crate::sink::Discard;
use crate::sink::RotatingFile;

/// Validated scope settings, applied only once the pipeline is published.
struct ScopeUpdates {
    output_levels: Vec<(Arc<Scope>, Level)>,
    stack_trace_levels: Vec<(Arc<Scope>, Level)>,
    log_callers: Vec<Arc<Scope>>,
}

impl ScopeUpdates {
    fn resolve(options: &Options) -> Result<ScopeUpdates, Error> {
        let resolve_levels = |directives: &str| -> Result<Vec<(Arc<Scope>, Level)>, Error> {
            parse_directives(directives)?
                .into_iter()
                .map(|d| Ok((lookup(&d.scope)?, d.level)))
                .collect()
        };

        Ok(ScopeUpdates {
            output_levels: resolve_levels(&options.output_levels)?,
            stack_trace_levels: resolve_levels(&options.stack_trace_levels)?,
            log_callers: parse_scope_list(&options.log_callers)
                .iter()
                .map(|name| lookup(name))
                .collect::<Result<_, _>>()?,
        })
    }

    fn apply(self) {
        for (scope, level) in self.output_levels {
            scope.set_output_level(level);
        }
        for (scope, level) in self.stack_trace_levels {
            scope.set_stack_trace_level(level);
        }
        for scope in self.log_callers {
            scope.set_log_callers(true);
        }
    }
}

fn lookup(name: &str) -> Result<Arc<Scope>, Error> {
    find_scope(name).ok_or_else(|| Error::unknown_scope(name))
}

fn build_pipeline(options: &Options) -> Result<Pipeline, Error> {
    // Sinks opened here are closed on drop if a later step fails.
    let error_sink = sink::open(&options.error_output_paths)?.unwrap_or_else(|| Discard.into());
    let outputs = sink::open(&options.output_paths)?;
    let rotating = match &options.rotate_output_path {
        Some(path) if !path.as_os_str().is_empty() => {
            Some(RotatingFile::new(path, options.rotation_policy())?)
        }
        _ => None,
    };

    let encoder: Encoder = if options.json_encoding {
        JsonEncoder::default().time_format(options.time_format).into()
    } else {
        ConsoleEncoder::default().time_format(options.time_format).into()
    };

    Ok(Pipeline::new(
        encoder,
        options.time_format,
        sink::compose(outputs, rotating),
        error_sink,
    ))
}

/// Replace the logging pipeline with one built from `options`.
///
/// Directives are parsed and every scope they name is looked up first, then the sinks are
/// opened and the requested capture adapters installed. Only when all of that succeeds is the
/// new pipeline published and are the scope settings applied, in the order output levels, stack
/// trace levels, callers. On failure the previous pipeline and every scope stay as they were.
///
/// Emitters racing with this call finish their record on whichever pipeline they loaded.
///
/// # Errors
///
/// Return an error if a directive is malformed, names an unregistered scope, a sink cannot be
/// opened, or a capture adapter cannot be installed.
///
/// # Examples
///
/// ```
/// let ads = logscope::register_scope("ads", "Aggregated discovery.");
///
/// let mut options = logscope::Options::default();
/// options.output_paths = vec!["stdout".to_string()];
/// options.json_encoding = true;
/// options.set_output_level("ads", logscope::Level::Debug);
/// logscope::configure(&options).unwrap();
///
/// ads.debug("pushed");
/// logscope::sync().unwrap();
/// ```
pub fn configure(options: &Options) -> Result<(), Error> {
    let updates = ScopeUpdates::resolve(options)?;
    let next = build_pipeline(options)?;
    capture::install(options)?;

    pipeline::publish(next);
    updates.apply();
    Ok(())
}
