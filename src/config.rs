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

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ContextError, Result};

/// Settings shared by every context.
///
/// Each context receives the configuration at construction time; nothing
/// is looked up from a global registry.
///
/// # Examples
///
/// ```
/// use api_contexts::ContextConfig;
///
/// let config = ContextConfig::new()
///     .with_project_dir("/srv/app")
///     .with_transport("orders", "env(ORDERS_DSN)");
/// assert_eq!(
///     config.resolve(&config.response_fixtures, "user.json"),
///     std::path::PathBuf::from("/srv/app/tests/functional/fixtures/response/user.json"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Directory every other path is relative to.
    pub project_dir: PathBuf,
    /// Request bodies sent by the API context.
    pub request_fixtures: PathBuf,
    /// Expected response bodies, also served by mock servers.
    pub response_fixtures: PathBuf,
    /// Reference files for the file context.
    pub file_fixtures: PathBuf,
    /// Data sets handed to the fixture loader.
    pub data_fixtures: PathBuf,
    /// OpenAPI or Swagger document used for contract validation.
    pub openapi_file: Option<PathBuf>,
    /// Queue transports by name, values are DSNs or `env(VAR)`.
    pub transports: BTreeMap<String, String>,
    pub setup_queues_automatically: bool,
    pub mock_servers: Vec<MockServerConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MockServerConfig {
    pub server_name: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub base_path: Option<String>,
}

impl MockServerConfig {
    pub fn new(server_name: &str) -> Self {
        Self {
            server_name: server_name.to_string(),
            port: None,
            base_path: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = Some(base_path.to_string());
        self
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            request_fixtures: PathBuf::from("tests/functional/fixtures/request"),
            response_fixtures: PathBuf::from("tests/functional/fixtures/response"),
            file_fixtures: PathBuf::from("tests/functional/fixtures/file"),
            data_fixtures: PathBuf::from("tests/fixtures"),
            openapi_file: None,
            transports: BTreeMap::new(),
            setup_queues_automatically: true,
            mock_servers: vec![],
        }
    }
}

impl ContextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the configuration from a JSON or YAML file, chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading context configuration");

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            serde_yaml::from_str(&content).map_err(|err| {
                ContextError::Configuration(format!("{}: {}", path.display(), err))
            })
        } else {
            serde_json::from_str(&content).map_err(|err| {
                ContextError::Configuration(format!("{}: {}", path.display(), err))
            })
        }
    }

    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = project_dir.into();
        self
    }

    pub fn with_request_fixtures(mut self, dir: impl Into<PathBuf>) -> Self {
        self.request_fixtures = dir.into();
        self
    }

    pub fn with_response_fixtures(mut self, dir: impl Into<PathBuf>) -> Self {
        self.response_fixtures = dir.into();
        self
    }

    pub fn with_file_fixtures(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file_fixtures = dir.into();
        self
    }

    pub fn with_data_fixtures(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_fixtures = dir.into();
        self
    }

    pub fn with_openapi_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.openapi_file = Some(file.into());
        self
    }

    pub fn with_transport(mut self, name: &str, dsn: &str) -> Self {
        self.transports.insert(name.to_string(), dsn.to_string());
        self
    }

    pub fn with_setup_queues_automatically(mut self, enabled: bool) -> Self {
        self.setup_queues_automatically = enabled;
        self
    }

    pub fn with_mock_server(mut self, server: MockServerConfig) -> Self {
        self.mock_servers.push(server);
        self
    }

    /// Path of a file inside a project-relative directory.
    pub fn resolve(&self, dir: &Path, name: &str) -> PathBuf {
        self.project_dir.join(dir).join(name)
    }

    /// Path of a project-relative file or directory.
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_dir.join(relative.trim_start_matches('/'))
    }
}
