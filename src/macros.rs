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

//! Logging macros.
//!
//! Each macro formats its arguments lazily and records the call site as the caller. Without a
//! `scope:` argument the record goes to the `default` scope.
//!
//! ```
//! let ads = logscope::register_scope("ads", "Aggregated discovery.");
//!
//! logscope::info!("starting up");
//! logscope::warn!(scope: ads, "stream closed after {} pushes", 3);
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __emit {
    ($scope:expr, $level:expr, $($arg:tt)+) => {{
        let scope: &$crate::Scope = &$scope;
        let level = $level;
        if scope.enabled(level) {
            scope.emit(level, ::std::format_args!($($arg)+), &[]);
        }
    }};
}

/// Emit a record at [`Level::Debug`](crate::Level::Debug).
#[macro_export]
macro_rules! debug {
    (scope: $scope:expr, $($arg:tt)+) => {
        $crate::__emit!($scope, $crate::Level::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::default_scope(), $crate::Level::Debug, $($arg)+)
    };
}

/// Emit a record at [`Level::Info`](crate::Level::Info).
#[macro_export]
macro_rules! info {
    (scope: $scope:expr, $($arg:tt)+) => {
        $crate::__emit!($scope, $crate::Level::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::default_scope(), $crate::Level::Info, $($arg)+)
    };
}

/// Emit a record at [`Level::Warn`](crate::Level::Warn).
#[macro_export]
macro_rules! warn {
    (scope: $scope:expr, $($arg:tt)+) => {
        $crate::__emit!($scope, $crate::Level::Warn, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::default_scope(), $crate::Level::Warn, $($arg)+)
    };
}

/// Emit a record at [`Level::Error`](crate::Level::Error).
#[macro_export]
macro_rules! error {
    (scope: $scope:expr, $($arg:tt)+) => {
        $crate::__emit!($scope, $crate::Level::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::default_scope(), $crate::Level::Error, $($arg)+)
    };
}
