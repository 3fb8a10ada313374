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

use std::fs;
use std::path::Path;

use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::ContextConfig;
use crate::domain::Response;
use crate::error::{mismatch, ContextError, Result};
use crate::json_diff::misc::Bulleted;
use crate::json_diff::parse_document;

const MALFORMED_BODY: &str = "The response body given is not a valid Json string.";

/// Validates responses against the contract of an OpenAPI 3 or Swagger 2 document.
///
/// The document is read on the first validation and kept for the next ones.
#[derive(Debug)]
pub struct SwaggerContext {
    config: ContextConfig,
    document: Option<Value>,
}

impl SwaggerContext {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            config: config.clone(),
            document: None,
        }
    }

    /// `Then I validate Swagger response on :path with :method method and statusCode :statusCode`
    pub fn validate_response(
        &mut self,
        response: &Response,
        path: &str,
        method: &str,
        status_code: u16,
    ) -> Result<()> {
        let document = self.document()?;

        if response.status != status_code {
            return mismatch!(
                "Response status code {} does not match the expected {}.",
                response.status,
                status_code
            );
        }

        let Some(declared) = declared_response(document, path, method, status_code)? else {
            return mismatch!(
                "No response {} is documented for {} {}.",
                status_code,
                method.to_uppercase(),
                path
            );
        };

        let Some(schema) = response_schema(declared) else {
            debug!(path, method, status_code, "documented response has no schema");
            return Ok(());
        };

        let body = parse_document(&response.body, MALFORMED_BODY)?;
        let errors = validate_schema(document, schema, &body)?;
        if errors.is_empty() {
            Ok(())
        } else {
            mismatch!(
                "Response body of {} {} does not match its schema:\n{}",
                method.to_uppercase(),
                path,
                errors.bulleted()
            )
        }
    }

    fn document(&mut self) -> Result<&Value> {
        let document = match self.document.take() {
            Some(document) => document,
            None => {
                let file = self.config.openapi_file.as_ref().ok_or_else(|| {
                    ContextError::Configuration("No OpenAPI document configured.".to_string())
                })?;
                load_document(&self.config.project_dir.join(file))?
            }
        };
        Ok(self.document.insert(document))
    }
}

/// Reads an OpenAPI document written in YAML or JSON.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), "loading openapi document");

    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
    let document: Value = if is_json {
        serde_json::from_str(&content)
            .map_err(|err| ContextError::Configuration(format!("{}: {}", path.display(), err)))?
    } else {
        serde_yaml::from_str(&content)
            .map_err(|err| ContextError::Configuration(format!("{}: {}", path.display(), err)))?
    };

    if document.get("paths").map_or(true, |paths| !paths.is_object()) {
        return Err(ContextError::Configuration(format!(
            "{}: no paths are documented",
            path.display()
        )));
    }
    Ok(document)
}

fn declared_response<'d>(
    document: &'d Value,
    path: &str,
    method: &str,
    status_code: u16,
) -> Result<Option<&'d Value>> {
    let paths = document
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| ContextError::Configuration("no paths are documented".to_string()))?;

    let Some(item) = find_path_item(paths, path) else {
        return mismatch!("Path {} is not documented.", path);
    };
    let Some(operation) = item.get(method.to_lowercase()) else {
        return mismatch!(
            "Method {} is not documented for path {}.",
            method.to_uppercase(),
            path
        );
    };

    let responses = operation.get("responses");
    Ok(responses
        .and_then(|responses| responses.get(status_code.to_string()))
        .or_else(|| responses.and_then(|responses| responses.get("default"))))
}

/// Looks a path item up by its exact key, then by matching templated keys.
fn find_path_item<'d>(paths: &'d Map<String, Value>, path: &str) -> Option<&'d Value> {
    let path = path.split('?').next().unwrap_or_default();
    paths.get(path).or_else(|| {
        paths
            .iter()
            .find(|(template, _)| matches_template(template, path))
            .map(|(_, item)| item)
    })
}

fn matches_template(template: &str, path: &str) -> bool {
    let template_segments: Vec<&str> = template.trim_end_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();

    template_segments.len() == path_segments.len()
        && template_segments
            .iter()
            .zip(path_segments.iter())
            .all(|(expected, actual)| {
                let is_parameter = expected.starts_with('{') && expected.ends_with('}');
                (is_parameter && !actual.is_empty()) || expected == actual
            })
}

fn response_schema(declared: &Value) -> Option<&Value> {
    if let Some(schema) = declared.get("schema") {
        return Some(schema);
    }

    let content = declared.get("content")?.as_object()?;
    content
        .get("application/json")
        .or_else(|| content.values().next())
        .and_then(|media| media.get("schema"))
}

/// Validates an instance, resolving local references against the whole document.
fn validate_schema(document: &Value, schema: &Value, instance: &Value) -> Result<Vec<String>> {
    let mut root = json!({ "allOf": [schema] });
    for section in ["components", "definitions"] {
        if let (Some(value), Some(root)) = (document.get(section), root.as_object_mut()) {
            root.insert(section.to_string(), value.clone());
        }
    }

    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&root)
        .map_err(|err| ContextError::Configuration(format!("Invalid response schema: {}", err)))?;

    let errors = match compiled.validate(instance) {
        Ok(()) => vec![],
        Err(errors) => errors
            .map(|error| {
                let location = error.instance_path.to_string();
                if location.is_empty() {
                    format!("(root): {}", error)
                } else {
                    format!("{}: {}", location, error)
                }
            })
            .collect(),
    };
    Ok(errors)
}
