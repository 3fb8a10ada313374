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

use api_contexts::MockServerConfig;
use cucumber::gherkin::Step;
use cucumber::{given, then};

use super::{succeed, table_records};
use crate::world::ContextWorld;

#[given("I set up mock servers:")]
async fn set_up_mock_servers(world: &mut ContextWorld, step: &Step) {
    let servers = table_records(step)
        .into_iter()
        .map(|record| {
            let mut server = MockServerConfig::new("");
            for (column, value) in record {
                match column.as_str() {
                    "serverName" => server.server_name = value,
                    "port" if !value.is_empty() => {
                        server = server.with_port(value.parse().expect("invalid port"))
                    }
                    "basePath" if !value.is_empty() => server = server.with_base_path(&value),
                    _ => {}
                }
            }
            server
        })
        .collect::<Vec<_>>();

    succeed(world.mocks.set_up_mock_servers(Some(&servers)).await);
}

#[then("I tear down mock servers")]
fn tear_down_mock_servers(world: &mut ContextWorld) {
    world.mocks.tear_down_mock_servers();
}

#[then(expr = "the mock server {string} is not running")]
fn mock_server_not_running(world: &mut ContextWorld, server_name: String) {
    assert!(world.mocks.server_url(&server_name).is_err());
}

#[given(expr = "A {word} request on {string} to the mock server {string} must be return a {int} response")]
async fn mock(world: &mut ContextWorld, method: String, path: String, server_name: String, code: u16) {
    succeed(
        world
            .mocks
            .mock_request(&server_name, &path, &method, code, None)
            .await,
    );
}

#[given(
    expr = "A {word} request on {string} to the mock server {string} must be return a {int} response with content {string}"
)]
async fn mock_with_content(
    world: &mut ContextWorld,
    method: String,
    path: String,
    server_name: String,
    code: u16,
    body: String,
) {
    succeed(
        world
            .mocks
            .mock_request(&server_name, &path, &method, code, Some(&body))
            .await,
    );
}

#[given(
    expr = "A {word} request on {string} to the mock server {string} must be return a {int} response with file {string} as content"
)]
async fn mock_with_file(
    world: &mut ContextWorld,
    method: String,
    path: String,
    server_name: String,
    code: u16,
    body_file_name: String,
) {
    succeed(
        world
            .mocks
            .mock_request_with_file(&server_name, &path, &method, code, &body_file_name)
            .await,
    );
}

#[given(
    expr = "A {word} request on path matching {string} to the mock server {string} must be return a {int} response"
)]
async fn mock_matching(world: &mut ContextWorld, method: String, regex: String, server_name: String, code: u16) {
    succeed(
        world
            .mocks
            .mock_request_matching(&server_name, &regex, &method, code, None)
            .await,
    );
}

#[given(
    expr = "A {word} request on path matching {string} to the mock server {string} must be return a {int} response with content {string}"
)]
async fn mock_matching_with_content(
    world: &mut ContextWorld,
    method: String,
    regex: String,
    server_name: String,
    code: u16,
    body: String,
) {
    succeed(
        world
            .mocks
            .mock_request_matching(&server_name, &regex, &method, code, Some(&body))
            .await,
    );
}

#[given(
    expr = "A {word} request on path matching {string} to the mock server {string} must be return a {int} response with file {string} as content"
)]
async fn mock_matching_with_file(
    world: &mut ContextWorld,
    method: String,
    regex: String,
    server_name: String,
    code: u16,
    body_file_name: String,
) {
    succeed(
        world
            .mocks
            .mock_request_matching_with_file(&server_name, &regex, &method, code, &body_file_name)
            .await,
    );
}
