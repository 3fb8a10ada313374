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
use std::fmt;
use std::fs;
use std::ops::{Deref, DerefMut};

use mockito::{Matcher, Mock, Server, ServerGuard, ServerOpts};
use regex::Regex;
use tracing::{debug, info};

use crate::api::strip_delimiters;
use crate::config::{ContextConfig, MockServerConfig};
use crate::domain::HttpMethod;
use crate::error::{ContextError, Result};

// Servers on a random port come from mockito's pool, fixed ports get their own.
enum ServerHandle {
    Pooled(ServerGuard),
    Owned(Server),
}

impl Deref for ServerHandle {
    type Target = Server;

    fn deref(&self) -> &Server {
        match self {
            ServerHandle::Pooled(guard) => guard,
            ServerHandle::Owned(server) => server,
        }
    }
}

impl DerefMut for ServerHandle {
    fn deref_mut(&mut self) -> &mut Server {
        match self {
            ServerHandle::Pooled(guard) => guard,
            ServerHandle::Owned(server) => server,
        }
    }
}

struct MockServer {
    server: ServerHandle,
    base_path: String,
}

/// Steps standing up HTTP servers that answer with canned responses.
///
/// Servers are named so scenarios can mock several upstream services.
pub struct HttpMockContext {
    config: ContextConfig,
    servers: BTreeMap<String, MockServer>,
    mocks: Vec<Mock>,
}

impl fmt::Debug for HttpMockContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMockContext")
            .field("servers", &self.servers.keys().collect::<Vec<_>>())
            .field("mocks", &self.mocks.len())
            .finish()
    }
}

enum PathMatch<'a> {
    Exact(&'a str),
    Regex(&'a str),
}

impl HttpMockContext {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            config: config.clone(),
            servers: BTreeMap::new(),
            mocks: vec![],
        }
    }

    /// `Given I set up mock servers:`, also run before `@mockable` scenarios
    /// with the servers from the configuration.
    pub async fn set_up_mock_servers(&mut self, servers: Option<&[MockServerConfig]>) -> Result<()> {
        let servers = match servers {
            Some(servers) => servers.to_vec(),
            None => self.config.mock_servers.clone(),
        };

        for server_config in servers {
            let server = match server_config.port {
                Some(port) => ServerHandle::Owned(
                    Server::new_with_opts_async(ServerOpts {
                        port,
                        ..Default::default()
                    })
                    .await,
                ),
                None => ServerHandle::Pooled(Server::new_async().await),
            };

            info!(
                server = %server_config.server_name,
                url = %server.url(),
                "mock server started"
            );

            let base_path = server_config
                .base_path
                .as_deref()
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string();
            self.servers
                .insert(server_config.server_name, MockServer { server, base_path });
        }
        Ok(())
    }

    /// `Then I tear down mock servers`, also run after `@mockable` scenarios.
    pub fn tear_down_mock_servers(&mut self) {
        debug!(servers = self.servers.len(), "tearing down mock servers");
        self.mocks.clear();
        self.servers.clear();
    }

    /// Base URL of a running mock server.
    pub fn server_url(&self, server_name: &str) -> Result<String> {
        let mock_server = self.server(server_name)?;
        Ok(format!("{}{}", mock_server.server.url(), mock_server.base_path))
    }

    /// `Given A :method request on :path to the mock server :serverName must be return a :responseCode response`
    /// and its `with content :body` variant.
    pub async fn mock_request(
        &mut self,
        server_name: &str,
        path: &str,
        method: &str,
        response_code: u16,
        body: Option<&str>,
    ) -> Result<()> {
        self.register(server_name, PathMatch::Exact(path), method, response_code, body)
            .await
    }

    /// `... must be return a :responseCode response with file :bodyFileName as content`
    pub async fn mock_request_with_file(
        &mut self,
        server_name: &str,
        path: &str,
        method: &str,
        response_code: u16,
        body_file_name: &str,
    ) -> Result<()> {
        let body = self.response_fixture(body_file_name)?;
        self.register(server_name, PathMatch::Exact(path), method, response_code, Some(&body))
            .await
    }

    /// `Given A :method request on path matching :regex to the mock server :serverName must be return a :responseCode response`
    /// and its `with content :body` variant.
    pub async fn mock_request_matching(
        &mut self,
        server_name: &str,
        regex: &str,
        method: &str,
        response_code: u16,
        body: Option<&str>,
    ) -> Result<()> {
        self.register(server_name, PathMatch::Regex(regex), method, response_code, body)
            .await
    }

    /// `... on path matching :regex ... with file :bodyFileName as content`
    pub async fn mock_request_matching_with_file(
        &mut self,
        server_name: &str,
        regex: &str,
        method: &str,
        response_code: u16,
        body_file_name: &str,
    ) -> Result<()> {
        let body = self.response_fixture(body_file_name)?;
        self.register(server_name, PathMatch::Regex(regex), method, response_code, Some(&body))
            .await
    }

    async fn register(
        &mut self,
        server_name: &str,
        path: PathMatch<'_>,
        method: &str,
        response_code: u16,
        body: Option<&str>,
    ) -> Result<()> {
        let http_method = method.parse::<HttpMethod>()?;
        let mock_server = self.servers.get_mut(server_name).ok_or_else(|| unknown_server(server_name))?;

        let matcher = match path {
            PathMatch::Exact(path) => {
                Matcher::Exact(format!("{}{}", mock_server.base_path, path))
            }
            PathMatch::Regex(pattern) => {
                let regex = Regex::new(strip_delimiters(pattern))?;
                Matcher::Regex(regex.as_str().to_string())
            }
        };
        debug!(server = server_name, method = %http_method, matcher = ?matcher, response_code, "registering mock");

        let mock = mock_server
            .server
            .mock(http_method.as_str(), matcher)
            .with_status(usize::from(response_code))
            .with_body(body.unwrap_or_default())
            .create_async()
            .await;
        self.mocks.push(mock);
        Ok(())
    }

    fn server(&self, server_name: &str) -> Result<&MockServer> {
        self.servers
            .get(server_name)
            .ok_or_else(|| unknown_server(server_name))
    }

    fn response_fixture(&self, file_name: &str) -> Result<String> {
        let path = self
            .config
            .resolve(&self.config.response_fixtures, file_name);
        Ok(fs::read_to_string(path)?)
    }
}

fn unknown_server(server_name: &str) -> ContextError {
    ContextError::Configuration(format!("Mock server {} is not set up.", server_name))
}
