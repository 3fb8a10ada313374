// Copyright 2024 The DocAssert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

use regex::Regex;

use crate::error::{ContextError, Result};

pub(crate) const JSON_PATH_REGEX: &str = r"^\$\.?(([a-zA-Z_][a-zA-Z0-9_]*)*(\[\d+\]|\[\d*:\d*\]|(\[\*\]))?)(\.((([a-zA-Z_][a-zA-Z0-9_]*)(\[\d+\]|\[\d*:\d*\]|(\[\*\]))?)|\*))*$";

/// Location of a node inside a JSON document.
///
/// Paths produced by the comparator only hold [`Key::Field`] and
/// [`Key::Idx`]. Paths parsed from JSONPath expressions may also hold
/// wildcards and ranges and are used to ignore parts of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Path<'a> {
    Root,
    Keys(Vec<Key<'a>>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key<'a> {
    Idx(usize),
    IdxRange(usize, usize),
    IdxRangeStart(usize),
    IdxRangeEnd(usize),
    Wildcard,
    WildcardArray,
    Field(&'a str),
}

// FromStr can't hand out a Path borrowing from the input string.
pub trait JSONPath {
    fn jsonpath(&self) -> Result<Path<'_>>;
}

impl JSONPath for str {
    fn jsonpath(&self) -> Result<Path<'_>> {
        Path::from_jsonpath(self)
    }
}

impl<'a> fmt::Display for Key<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Idx(idx) => write!(f, "[{}]", idx),
            Key::Field(key) => write!(f, "[{}]", key),
            Key::IdxRange(start, end) => write!(f, "[{}:{}]", start, end),
            Key::IdxRangeStart(start) => write!(f, "[{}:]", start),
            Key::IdxRangeEnd(end) => write!(f, "[:{}]", end),
            Key::Wildcard => write!(f, "*"),
            Key::WildcardArray => write!(f, "[*]"),
        }
    }
}

impl<'a> Path<'a> {
    pub(crate) fn append(&self, next: Key<'a>) -> Path<'a> {
        match self {
            Path::Root => Path::Keys(vec![next]),
            Path::Keys(list) => {
                let mut copy = list.clone();
                copy.push(next);
                Path::Keys(copy)
            }
        }
    }

    /// Keys from the root, empty for the root itself.
    pub fn keys(&self) -> &[Key<'a>] {
        match self {
            Path::Root => &[],
            Path::Keys(keys) => keys,
        }
    }

    /// Returns true when `self`, read as a pattern, covers `other`.
    pub(crate) fn prefixes(&self, other: &Path) -> bool {
        match (self, other) {
            (Path::Root, _) => true,
            (Path::Keys(_), Path::Root) => false,
            (Path::Keys(pattern), Path::Keys(concrete)) => {
                if pattern.len() > concrete.len() {
                    return false;
                }

                pattern
                    .iter()
                    .zip(concrete.iter())
                    .all(|(pattern, concrete)| {
                        if pattern == concrete {
                            return true;
                        }

                        match (pattern, concrete) {
                            (Key::Wildcard, Key::Field(_)) => true,
                            (Key::WildcardArray, Key::Idx(_)) => true,
                            (Key::IdxRange(a, b), Key::Idx(c)) => a <= c && c < b,
                            (Key::IdxRangeStart(a), Key::Idx(b)) => a <= b,
                            (Key::IdxRangeEnd(a), Key::Idx(b)) => b < a,
                            _ => false,
                        }
                    })
            }
        }
    }

    /// Parses a JSONPath expression such as `$.items[*].id`.
    pub fn from_jsonpath(jsonpath: &'a str) -> Result<Self> {
        let re = Regex::new(JSON_PATH_REGEX)?;

        if !re.is_match(jsonpath) {
            return Err(ContextError::Configuration(format!(
                "invalid JSONPath {}",
                jsonpath
            )));
        }

        if jsonpath == "$" {
            return Ok(Path::Root);
        }

        let mut keys = Vec::new();

        for segment in jsonpath
            .trim_start_matches('$')
            .split(|c| c == '.' || c == '[')
            .skip(1)
        {
            keys.push(Self::parse_token(segment)?);
        }

        Ok(Path::Keys(keys))
    }

    fn parse_token(token: &'a str) -> Result<Key<'a>> {
        let invalid = |token: &str| {
            ContextError::Configuration(format!("invalid JSONPath segment {}", token))
        };

        let mut token = token;
        let mut from_array = false;

        if let Some(stripped) = token.strip_suffix(']') {
            from_array = true;
            token = stripped;
        }

        if token == "*" || token == ":" {
            return match from_array {
                true => Ok(Key::WildcardArray),
                false => Ok(Key::Wildcard),
            };
        }

        if let Some(start) = token.strip_suffix(':') {
            let start = start.parse().map_err(|_| invalid(token))?;
            return Ok(Key::IdxRangeStart(start));
        }

        if let Some(end) = token.strip_prefix(':') {
            let end = end.parse().map_err(|_| invalid(token))?;
            return Ok(Key::IdxRangeEnd(end));
        }

        if let Some((start, end)) = token.split_once(':') {
            let start = start.parse().map_err(|_| invalid(token))?;
            let end = end.parse().map_err(|_| invalid(token))?;
            return Ok(Key::IdxRange(start, end));
        }

        match (from_array, token.parse::<usize>()) {
            (true, Ok(idx)) => Ok(Key::Idx(idx)),
            _ => Ok(Key::Field(token)),
        }
    }
}

impl<'a> fmt::Display for Path<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Path::Root => write!(f, "(root)"),
            Path::Keys(keys) => {
                for key in keys {
                    write!(f, "{}", key)?;
                }
                Ok(())
            }
        }
    }
}
