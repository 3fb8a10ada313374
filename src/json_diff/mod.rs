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

//! Structural comparison of JSON documents.
//!
//! [`compare`] walks an actual document against an expected one and collects
//! every [`Difference`] into a [`DiffReport`]. Arrays are compared as
//! multisets by default, so a response listing the same elements in another
//! order is still a match.

pub(crate) mod misc;
pub mod path;

use std::collections::HashMap;
use std::fmt;

use misc::{inline, Bulleted};
use path::{Key, Path};
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::{ContextError, Result};

/// How arrays should be compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ArrayMode {
    /// Elements are paired regardless of their position.
    #[default]
    Rearrange,
    /// Elements are compared index by index.
    Ordered,
}

/// Configuration for how JSON values should be compared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config<'a> {
    pub(crate) array_mode: ArrayMode,
    pub(crate) ignore_paths: Vec<Path<'a>>,
}

impl<'a> Config<'a> {
    /// Create a new [`Config`] that rearranges arrays and ignores nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the config's array mode.
    pub fn array_mode(mut self, array_mode: ArrayMode) -> Self {
        self.array_mode = array_mode;
        self
    }

    /// Add a path to the list of paths to ignore.
    pub fn ignore_path(mut self, path: Path<'a>) -> Self {
        self.ignore_paths.push(path);
        self
    }

    /// Checks if the given path should be ignored.
    pub fn to_ignore(&self, path: &Path<'a>) -> bool {
        self.ignore_paths.iter().any(|p| p.prefixes(path))
    }
}

/// What kind of change was found at a path.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffKind<'a> {
    /// Present in the actual document only.
    Added(&'a Value),
    /// Present in the expected document only.
    Removed(&'a Value),
    /// Present in both with different values.
    Modified {
        actual: &'a Value,
        expected: &'a Value,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Difference<'a> {
    path: Path<'a>,
    kind: DiffKind<'a>,
}

impl<'a> Difference<'a> {
    pub fn path(&self) -> &Path<'a> {
        &self.path
    }

    pub fn kind(&self) -> &DiffKind<'a> {
        &self.kind
    }
}

impl<'a> fmt::Display for Difference<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            DiffKind::Added(_) | DiffKind::Removed(_) => write!(f, "{}", self.path),
            DiffKind::Modified { actual, expected } => write!(
                f,
                "{} value is {} instead of {}",
                self.path,
                inline(actual),
                inline(expected)
            ),
        }
    }
}

/// Every difference found by a single comparison, in discovery order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiffReport<'a> {
    differences: Vec<Difference<'a>>,
}

impl<'a> DiffReport<'a> {
    pub fn len(&self) -> usize {
        self.differences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Difference<'a>> {
        self.differences.iter()
    }

    pub fn added(&self) -> impl Iterator<Item = &Difference<'a>> {
        self.iter()
            .filter(|d| matches!(d.kind, DiffKind::Added(_)))
    }

    pub fn removed(&self) -> impl Iterator<Item = &Difference<'a>> {
        self.iter()
            .filter(|d| matches!(d.kind, DiffKind::Removed(_)))
    }

    pub fn modified(&self) -> impl Iterator<Item = &Difference<'a>> {
        self.iter()
            .filter(|d| matches!(d.kind, DiffKind::Modified { .. }))
    }

    pub fn added_count(&self) -> usize {
        self.added().count()
    }

    pub fn removed_count(&self) -> usize {
        self.removed().count()
    }

    pub fn modified_count(&self) -> usize {
        self.modified().count()
    }
}

impl<'a> fmt::Display for DiffReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let groups = [
            ("Missing field(s):", self.removed().collect::<Vec<_>>()),
            ("Not expected extra field(s):", self.added().collect()),
            ("Not expected value(s):", self.modified().collect()),
        ];

        let sections = groups
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(title, entries)| format!("{}\n{}", title, entries.bulleted()))
            .collect::<Vec<_>>();

        write!(f, "{}", sections.join("\n"))
    }
}

/// Compares `actual` against `expected`, rearranging arrays.
pub fn compare<'a>(actual: &'a Value, expected: &'a Value) -> DiffReport<'a> {
    compare_with(actual, expected, &Config::new())
}

pub fn compare_with<'a>(
    actual: &'a Value,
    expected: &'a Value,
    config: &Config<'a>,
) -> DiffReport<'a> {
    let mut acc = vec![];
    diff_with(actual, expected, config, Path::Root, &mut acc);
    debug!(differences = acc.len(), "compared json documents");
    DiffReport { differences: acc }
}

/// Parses a JSON document, failing with `MalformedInput` and the given message.
pub fn parse_document(text: &str, malformed: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|err| {
        debug!(error = %err, "rejected malformed json document");
        ContextError::MalformedInput(malformed.to_string())
    })
}

fn diff_with<'a>(
    actual: &'a Value,
    expected: &'a Value,
    config: &Config<'a>,
    path: Path<'a>,
    acc: &mut Vec<Difference<'a>>,
) {
    let mut folder = DiffFolder {
        expected,
        path,
        acc,
        config,
    };

    fold_json(actual, &mut folder);
}

/// Whether comparing `actual` with `expected` at `path` would report nothing.
fn equivalent<'a>(
    actual: &'a Value,
    expected: &'a Value,
    config: &Config<'a>,
    path: &Path<'a>,
) -> bool {
    if config.ignore_paths.is_empty() {
        return equal_values(actual, expected, config.array_mode);
    }

    if config.to_ignore(path) {
        return true;
    }

    match (actual, expected) {
        (Value::Number(lhs), Value::Number(rhs)) => numbers_equal(lhs, rhs),
        (Value::Array(actual_items), Value::Array(expected_items)) => match config.array_mode {
            ArrayMode::Ordered => (0..actual_items.len().max(expected_items.len())).all(|idx| {
                let path = path.append(Key::Idx(idx));
                match (actual_items.get(idx), expected_items.get(idx)) {
                    (Some(actual), Some(expected)) => equivalent(actual, expected, config, &path),
                    _ => config.to_ignore(&path),
                }
            }),
            ArrayMode::Rearrange => {
                let pairing = pair_items(actual_items, expected_items, |actual, expected, idx| {
                    equivalent(actual, expected, config, &path.append(Key::Idx(idx)))
                });
                let all_ignored = pairing
                    .unpaired_expected()
                    .chain(pairing.unpaired_actual())
                    .all(|idx| config.to_ignore(&path.append(Key::Idx(idx))));
                all_ignored
            }
        },
        (Value::Object(actual_fields), Value::Object(expected_fields)) => {
            expected_fields.iter().all(|(key, expected)| {
                let path = path.append(Key::Field(key));
                match actual_fields.get(key) {
                    Some(actual) => equivalent(actual, expected, config, &path),
                    None => config.to_ignore(&path),
                }
            }) && actual_fields
                .keys()
                .filter(|key| !expected_fields.contains_key(*key))
                .all(|key| config.to_ignore(&path.append(Key::Field(key))))
        }
        _ => actual == expected,
    }
}

/// Deep equality with numeric comparison of numbers and, unless `array_mode`
/// is ordered, arrays compared as multisets. Stops at the first difference.
fn equal_values(actual: &Value, expected: &Value, array_mode: ArrayMode) -> bool {
    match (actual, expected) {
        (Value::Number(lhs), Value::Number(rhs)) => numbers_equal(lhs, rhs),
        (Value::Array(actual_items), Value::Array(expected_items)) => {
            if actual_items.len() != expected_items.len() {
                return false;
            }

            match array_mode {
                ArrayMode::Ordered => actual_items
                    .iter()
                    .zip(expected_items)
                    .all(|(actual, expected)| equal_values(actual, expected, array_mode)),
                ArrayMode::Rearrange => pair_items(actual_items, expected_items, |actual, expected, _| {
                    equal_values(actual, expected, array_mode)
                })
                .is_complete(),
            }
        }
        (Value::Object(actual_fields), Value::Object(expected_fields)) => {
            actual_fields.len() == expected_fields.len()
                && expected_fields.iter().all(|(key, expected)| {
                    actual_fields
                        .get(key)
                        .is_some_and(|actual| equal_values(actual, expected, array_mode))
                })
        }
        _ => actual == expected,
    }
}

/// Result of pairing the elements of two arrays.
struct Pairing {
    /// Actual position paired with each expected element.
    expected: Vec<Option<usize>>,
    paired: Vec<bool>,
}

impl Pairing {
    fn is_complete(&self) -> bool {
        self.expected.iter().all(Option::is_some) && self.paired.iter().all(|paired| *paired)
    }

    fn unpaired_expected(&self) -> impl Iterator<Item = usize> + '_ {
        self.expected
            .iter()
            .enumerate()
            .filter_map(|(idx, pos)| pos.is_none().then_some(idx))
    }

    fn unpaired_actual(&self) -> impl Iterator<Item = usize> + '_ {
        self.paired
            .iter()
            .enumerate()
            .filter_map(|(pos, paired)| (!paired).then_some(pos))
    }
}

/// Pairs each expected element with the first unpaired actual element
/// `equivalent` accepts. Identical elements are paired up front, so only the
/// leftovers go through the pairwise search.
fn pair_items<'v, F>(actual_items: &'v [Value], expected_items: &'v [Value], mut equivalent: F) -> Pairing
where
    F: FnMut(&'v Value, &'v Value, usize) -> bool,
{
    let mut paired = vec![false; actual_items.len()];
    let mut expected = vec![None; expected_items.len()];

    let mut identical: HashMap<String, Vec<usize>> = HashMap::new();
    for (pos, actual) in actual_items.iter().enumerate().rev() {
        identical.entry(actual.to_string()).or_default().push(pos);
    }
    for (idx, item) in expected_items.iter().enumerate() {
        if let Some(pos) = identical.get_mut(&item.to_string()).and_then(Vec::pop) {
            paired[pos] = true;
            expected[idx] = Some(pos);
        }
    }

    for (idx, item) in expected_items.iter().enumerate() {
        if expected[idx].is_some() {
            continue;
        }

        let candidate = actual_items
            .iter()
            .enumerate()
            .position(|(pos, actual)| !paired[pos] && equivalent(actual, item, idx));
        if let Some(pos) = candidate {
            paired[pos] = true;
            expected[idx] = Some(pos);
        }
    }

    Pairing { expected, paired }
}

fn integer(number: &Number) -> Option<i128> {
    number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from))
}

// Only integral floats inside the integer range can equal an integer.
fn float_equals_integer(float: &Number, int: i128) -> bool {
    match float.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 2f64.powi(64) => float as i128 == int,
        _ => false,
    }
}

fn numbers_equal(lhs: &Number, rhs: &Number) -> bool {
    match (integer(lhs), integer(rhs)) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        (Some(int), None) => float_equals_integer(rhs, int),
        (None, Some(int)) => float_equals_integer(lhs, int),
        (None, None) => lhs.as_f64() == rhs.as_f64(),
    }
}

#[derive(Debug)]
struct DiffFolder<'a, 'b> {
    expected: &'a Value,
    path: Path<'a>,
    acc: &'b mut Vec<Difference<'a>>,
    config: &'b Config<'a>,
}

macro_rules! direct_compare {
    ($name:ident) => {
        fn $name(&mut self, actual: &'a Value) {
            if self.expected != actual {
                self.modified(actual);
            }
        }
    };
}

impl<'a, 'b> DiffFolder<'a, 'b> {
    direct_compare!(on_null);
    direct_compare!(on_bool);
    direct_compare!(on_string);

    fn push(&mut self, path: Path<'a>, kind: DiffKind<'a>) {
        if self.config.to_ignore(&path) {
            return;
        }

        self.acc.push(Difference { path, kind });
    }

    fn modified(&mut self, actual: &'a Value) {
        let kind = DiffKind::Modified {
            actual,
            expected: self.expected,
        };
        self.push(self.path.clone(), kind);
    }

    fn on_number(&mut self, actual: &'a Value) {
        match (actual, self.expected) {
            (Value::Number(lhs), Value::Number(rhs)) if numbers_equal(lhs, rhs) => {}
            _ => self.modified(actual),
        }
    }

    fn on_array(&mut self, actual: &'a Value) {
        let (Some(actual_items), Some(expected_items)) =
            (actual.as_array(), self.expected.as_array())
        else {
            return self.modified(actual);
        };

        match self.config.array_mode {
            ArrayMode::Ordered => self.ordered_items(actual_items, expected_items),
            ArrayMode::Rearrange => self.rearranged_items(actual_items, expected_items),
        }
    }

    fn ordered_items(&mut self, actual_items: &'a [Value], expected_items: &'a [Value]) {
        for idx in 0..actual_items.len().max(expected_items.len()) {
            let path = self.path.append(Key::Idx(idx));

            match (actual_items.get(idx), expected_items.get(idx)) {
                (Some(actual), Some(expected)) => {
                    diff_with(actual, expected, self.config, path, self.acc);
                }
                (Some(actual), None) => self.push(path, DiffKind::Added(actual)),
                (None, Some(expected)) => self.push(path, DiffKind::Removed(expected)),
                (None, None) => unreachable!("index is below the longest length"),
            }
        }
    }

    fn rearranged_items(&mut self, actual_items: &'a [Value], expected_items: &'a [Value]) {
        let config = self.config;
        let pairing = if config.ignore_paths.is_empty() {
            pair_items(actual_items, expected_items, |actual, expected, _| {
                equal_values(actual, expected, config.array_mode)
            })
        } else {
            let path = &self.path;
            pair_items(actual_items, expected_items, |actual, expected, idx| {
                equivalent(actual, expected, config, &path.append(Key::Idx(idx)))
            })
        };

        for idx in pairing.unpaired_expected() {
            let path = self.path.append(Key::Idx(idx));
            self.push(path, DiffKind::Removed(&expected_items[idx]));
        }

        for pos in pairing.unpaired_actual() {
            let path = self.path.append(Key::Idx(pos));
            self.push(path, DiffKind::Added(&actual_items[pos]));
        }
    }

    fn on_object(&mut self, actual: &'a Value) {
        let (Some(actual_fields), Some(expected_fields)) =
            (actual.as_object(), self.expected.as_object())
        else {
            return self.modified(actual);
        };

        for (key, expected) in expected_fields {
            let path = self.path.append(Key::Field(key));

            match actual_fields.get(key) {
                Some(actual) => diff_with(actual, expected, self.config, path, self.acc),
                None => self.push(path, DiffKind::Removed(expected)),
            }
        }

        for (key, actual) in actual_fields {
            if !expected_fields.contains_key(key) {
                let path = self.path.append(Key::Field(key));
                self.push(path, DiffKind::Added(actual));
            }
        }
    }
}

fn fold_json<'a>(json: &'a Value, folder: &mut DiffFolder<'a, '_>) {
    match json {
        Value::Null => folder.on_null(json),
        Value::Bool(_) => folder.on_bool(json),
        Value::Number(_) => folder.on_number(json),
        Value::String(_) => folder.on_string(json),
        Value::Array(_) => folder.on_array(json),
        Value::Object(_) => folder.on_object(json),
    }
}
