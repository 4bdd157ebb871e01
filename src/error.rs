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
use std::io;

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A level name or a directive could not be parsed.
    ConfigParse,
    /// A directive names a scope that is not registered.
    UnknownScope,
    /// A scope name is empty or contains a reserved character.
    InvalidScopeName,
    /// A sink path could not be opened.
    SinkOpen,
    /// A record could not be encoded.
    Encode,
    /// A sink failed while writing a record.
    SinkWrite,
    /// A sink failed while flushing.
    Flush,
    /// A third-party logger could not be redirected.
    Capture,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigParse => "ConfigParse",
            ErrorKind::UnknownScope => "UnknownScope",
            ErrorKind::InvalidScopeName => "InvalidScopeName",
            ErrorKind::SinkOpen => "SinkOpen",
            ErrorKind::Encode => "Encode",
            ErrorKind::SinkWrite => "SinkWrite",
            ErrorKind::Flush => "Flush",
            ErrorKind::Capture => "Capture",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error struct of logscope.
pub struct Error {
    kind: ErrorKind,
    message: String,
    sources: Vec<anyhow::Error>,
    context: Vec<(&'static str, String)>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.sources.is_empty() {
            write!(f, ", sources: [")?;
            for (i, source) in self.sources.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{source}")?;
            }
            write!(f, "]")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("sources", &self.sources);
            return de.finish();
        }

        write!(f, "{} ({})", self.message, self.kind)?;
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }
        if !self.sources.is_empty() {
            writeln!(f)?;
            writeln!(f, "Sources:")?;
            for source in self.sources.iter() {
                writeln!(f, "   {source:#}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.sources.first().map(|v| v.as_ref())
    }
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            sources: vec![],
            context: vec![],
        }
    }

    /// Return the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the message of this error, without context and sources.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Add one more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Add one more source in error.
    pub fn with_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        self.sources.push(src.into());
        self
    }

    /// Return an iterator over all sources of this error.
    pub fn sources(&self) -> impl ExactSizeIterator<Item = &(dyn std::error::Error + 'static)> {
        self.sources.iter().map(|v| v.as_ref())
    }

    pub(crate) fn unknown_scope(name: &str) -> Error {
        Error::new(
            ErrorKind::UnknownScope,
            format!("unknown scope '{name}' specified"),
        )
    }

    pub(crate) fn sink_open(path: &str, err: io::Error) -> Error {
        Error::new(ErrorKind::SinkOpen, "failed to open sink")
            .with_context("path", path)
            .with_source(err)
    }

    pub(crate) fn sink_write(err: io::Error) -> Error {
        Error::new(ErrorKind::SinkWrite, "failed to write to sink").with_source(err)
    }

    pub(crate) fn flush(err: io::Error) -> Error {
        Error::new(ErrorKind::Flush, "failed to flush sink").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context_and_sources() {
        let err = Error::new(ErrorKind::SinkOpen, "failed to open sink")
            .with_context("path", "/nonexistent/x.log")
            .with_source(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        assert_eq!(
            err.to_string(),
            "failed to open sink, context: { path: /nonexistent/x.log }, sources: [no such file]"
        );
        assert_eq!(err.kind(), ErrorKind::SinkOpen);
        assert_eq!(err.sources().len(), 1);
    }

    #[test]
    fn test_unknown_scope_message() {
        let err = Error::unknown_scope("ghost");
        assert_eq!(err.to_string(), "unknown scope 'ghost' specified");
        assert_eq!(err.kind(), ErrorKind::UnknownScope);
    }
}
