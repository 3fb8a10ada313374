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

mod amqp;
mod api;
mod file;
mod fixtures;
mod http_mock;
mod swagger;

use std::fmt::Debug;

use cucumber::gherkin::Step;

/// Unwraps a context result, failing the step with the context message.
pub(crate) fn succeed<T>(result: api_contexts::Result<T>) -> T {
    result.unwrap_or_else(|err| panic!("{}", err))
}

/// Asserts a context call failed with the message in the step doc string.
pub(crate) fn fail_with<T: Debug>(result: api_contexts::Result<T>, step: &Step) {
    match result {
        Err(err) => assert_eq!(normalize(&err.to_string()), normalize(docstring(step))),
        Ok(value) => panic!("step unexpectedly succeeded with {:?}", value),
    }
}

pub(crate) fn docstring(step: &Step) -> &str {
    step.docstring
        .as_deref()
        .map(str::trim)
        .unwrap_or_else(|| panic!("step \"{}\" needs a doc string", step.value))
}

/// First cell of every row of the step table.
pub(crate) fn table_column(step: &Step) -> Vec<String> {
    step.table
        .as_ref()
        .map(|table| {
            table
                .rows
                .iter()
                .filter_map(|row| row.first().cloned())
                .collect()
        })
        .unwrap_or_default()
}

/// Named cells of the step table, one map per row.
pub(crate) fn table_records(step: &Step) -> Vec<Vec<(String, String)>> {
    let Some(table) = step.table.as_ref() else {
        return vec![];
    };
    let Some((header, rows)) = table.rows.split_first() else {
        return vec![];
    };

    rows.iter()
        .map(|row| header.iter().cloned().zip(row.iter().cloned()).collect())
        .collect()
}

fn normalize(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
