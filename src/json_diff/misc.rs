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

use serde_json::Value;

/// Renders items as an indented dash list, one item per line.
pub(crate) trait Bulleted {
    fn bulleted(&self) -> String;
}

impl<T> Bulleted for [T]
where
    T: ToString,
{
    fn bulleted(&self) -> String {
        self.iter()
            .map(|item| format!("  - {}", item.to_string()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Compact single-line rendering of a JSON value for failure messages.
pub(crate) fn inline(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bulleted() {
        assert_eq!(["[a]", "[b][0]"].bulleted(), "  - [a]\n  - [b][0]");

        let empty: [&str; 0] = [];
        assert_eq!(empty.bulleted(), "");
    }

    #[test]
    fn test_inline() {
        assert_eq!(inline(&json!(null)), "null");
        assert_eq!(inline(&json!("text")), "\"text\"");
        assert_eq!(inline(&json!(1.5)), "1.5");
        assert_eq!(inline(&json!({"a": [1, 2]})), "{\"a\":[1,2]}");
    }
}
