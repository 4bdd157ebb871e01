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

use std::str::FromStr;

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::scope::DEFAULT_SCOPE_NAME;

/// One `scope:level` element of a directive string. A bare `level` names the `default` scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Directive {
    pub(crate) scope: String,
    pub(crate) level: Level,
}

/// Parse a comma-separated list of `[scope:]level` items, in order.
///
/// Empty items are skipped. A later directive for the same scope overrides an earlier one once
/// applied.
pub(crate) fn parse_directives(input: &str) -> Result<Vec<Directive>, Error> {
    let mut directives = vec![];
    for item in input.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let (scope, level) = match item.split_once(':') {
            Some((scope, level)) => (scope.trim(), level.trim()),
            None => (DEFAULT_SCOPE_NAME, item),
        };
        if scope.is_empty() {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                format!("malformed directive '{item}'"),
            ));
        }

        let level = Level::from_str(level)
            .map_err(|err| err.with_context("directive", item))?;
        directives.push(Directive {
            scope: scope.to_string(),
            level,
        });
    }
    Ok(directives)
}

/// Parse a comma-separated list of scope names, skipping empty items.
pub(crate) fn parse_scope_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn item_scope(item: &str) -> &str {
    match item.split_once(':') {
        Some((scope, _)) => scope.trim(),
        None => DEFAULT_SCOPE_NAME,
    }
}

/// Set the level of `scope` in a directive string.
///
/// The first item for `scope` is replaced and any later ones are removed, so the new level wins
/// once applied. Without an item for `scope`, one is appended.
pub(crate) fn set_directive(input: &str, scope: &str, level: Level) -> String {
    let replacement = format!("{scope}:{level}");
    let mut replaced = false;
    let mut items = vec![];
    for item in input.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        if item_scope(item) != scope {
            items.push(item.to_string());
        } else if !replaced {
            items.push(replacement.clone());
            replaced = true;
        }
    }
    if !replaced {
        items.push(replacement);
    }
    items.join(",")
}

/// The level a directive string assigns to `scope`, if any. Malformed items are ignored.
pub(crate) fn find_directive(input: &str, scope: &str) -> Option<Level> {
    input
        .split(',')
        .filter_map(|item| parse_directives(item).ok())
        .flatten()
        .filter(|directive| directive.scope == scope)
        .map(|directive| directive.level)
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(scope: &str, level: Level) -> Directive {
        Directive {
            scope: scope.to_string(),
            level,
        }
    }

    #[test]
    fn test_parse_valid() {
        let dirs = parse_directives("info,ads:debug, ,mcp:none,").unwrap();
        assert_eq!(
            dirs,
            vec![
                directive("default", Level::Info),
                directive("ads", Level::Debug),
                directive("mcp", Level::None),
            ]
        );
        assert!(parse_directives("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_keeps_order_of_repeats() {
        let dirs = parse_directives("ads:debug,ads:error").unwrap();
        assert_eq!(
            dirs,
            vec![directive("ads", Level::Debug), directive("ads", Level::Error)]
        );
    }

    #[test]
    fn test_parse_invalid_level() {
        let err = parse_directives("ads:loud").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigParse);
        assert!(err.to_string().contains("invalid level 'loud'"), "{err}");

        let err = parse_directives("ads:warn:info").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigParse);
    }

    #[test]
    fn test_parse_missing_scope() {
        let err = parse_directives(":debug").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigParse);
        assert_eq!(err.message(), "malformed directive ':debug'");
    }

    #[test]
    fn test_scope_list() {
        assert_eq!(parse_scope_list("default, ads,,"), vec!["default", "ads"]);
        assert!(parse_scope_list("").is_empty());
    }

    #[test]
    fn test_set_directive() {
        assert_eq!(set_directive("", "ads", Level::Debug), "ads:debug");
        assert_eq!(
            set_directive("info,ads:warn", "default", Level::Error),
            "default:error,ads:warn"
        );
        assert_eq!(
            set_directive("info,ads:warn", "ads", Level::Debug),
            "info,ads:debug"
        );
        assert_eq!(
            set_directive("info", "mcp", Level::None),
            "info,mcp:none"
        );
    }

    #[test]
    fn test_set_directive_overrides_repeats() {
        let input = set_directive("ads:warn,info,ads:error", "ads", Level::Debug);
        assert_eq!(input, "ads:debug,info");
        assert_eq!(find_directive(&input, "ads"), Some(Level::Debug));

        let input = set_directive("warn,default:error", "default", Level::Info);
        assert_eq!(input, "default:info");
    }

    #[test]
    fn test_find_directive() {
        let input = "info,ads:warn,bogus,ads:error";
        assert_eq!(find_directive(input, "default"), Some(Level::Info));
        assert_eq!(find_directive(input, "ads"), Some(Level::Error));
        assert_eq!(find_directive(input, "mcp"), None);
    }
}
