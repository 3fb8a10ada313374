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

use thiserror::Error;

/// Failure of a step.
///
/// `AssertionMismatch` is the ordinary "the scenario is red" outcome; every
/// other variant means the step could not be evaluated at all.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A document that should be JSON could not be parsed.
    #[error("{0}")]
    MalformedInput(String),
    /// The observed state differs from the expected one.
    #[error("{0}")]
    AssertionMismatch(String),
    /// The context was set up or called incorrectly.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// An external collaborator (queue, fixture loader) reported an error.
    #[error("adapter error: {0}")]
    Adapter(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, ContextError>;

/// Shorthand for failing a step with a formatted message.
macro_rules! mismatch {
    ($($arg:tt)*) => {
        Err($crate::error::ContextError::AssertionMismatch(format!($($arg)*)))
    };
}

pub(crate) use mismatch;
