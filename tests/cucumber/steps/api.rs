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

//! Steps of `ApiContext`.

use cucumber::gherkin::Step;
use cucumber::{given, then, when};

use super::{docstring, fail_with, succeed};
use crate::world::ContextWorld;

#[given(expr = "I use the mock server {string} as API")]
fn use_mock_server(world: &mut ContextWorld, server_name: String) {
    world.use_mock_server_as_api(&server_name);
}

#[given(expr = "I set header {string} with value {string}")]
fn set_header(world: &mut ContextWorld, name: String, value: String) {
    world.api.set_header(&name, &value);
}

#[when(expr = "I send a {word} request to {string}")]
async fn send_request(world: &mut ContextWorld, method: String, url: String) {
    succeed(world.api.send_request(&method, &url, None).await);
}

#[when(expr = "I send a {word} request to {string} with body:")]
async fn send_request_with_body(world: &mut ContextWorld, method: String, url: String, step: &Step) {
    let body = docstring(step).to_string();
    succeed(world.api.send_request(&method, &url, Some(body)).await);
}

#[when(expr = "I send a {word} request to {string} with content from file {string} as body")]
async fn send_request_with_file(
    world: &mut ContextWorld,
    method: String,
    url: String,
    body_file_name: String,
) {
    succeed(
        world
            .api
            .send_request_with_body_from_file(&method, &url, &body_file_name)
            .await,
    );
}

#[then(expr = "the response status code should be {int}")]
fn response_status(world: &mut ContextWorld, code: u16) {
    succeed(world.api.response_status_should_be(code));
}

#[then(expr = "The response header {string} should be equal to {string}")]
fn response_header_equal(world: &mut ContextWorld, header: String, value: String) {
    succeed(world.api.response_header_should_be_equal_to(&header, &value));
}

#[then(expr = "the response header {string} should be match with pattern {string}")]
fn response_header_match(world: &mut ContextWorld, header: String, regex: String) {
    succeed(world.api.response_header_should_match(&header, &regex));
}

#[then(expr = "checking that the response header {string} is equal to {string} fails with:")]
fn response_header_equal_fails(world: &mut ContextWorld, header: String, value: String, step: &Step) {
    fail_with(world.api.response_header_should_be_equal_to(&header, &value), step);
}

#[then(expr = "The JSON response body should be equal to content from {string}")]
fn json_body_equal_to_file(world: &mut ContextWorld, response_file_name: String) {
    succeed(world.api.json_response_should_be_equal_to_file(&response_file_name));
}

#[then(expr = "The JSON response body should be equal to content from {string} ignoring {string}")]
fn json_body_equal_to_file_ignoring(world: &mut ContextWorld, response_file_name: String, ignored: String) {
    let ignored = ignored.split(',').map(str::trim).collect::<Vec<_>>();
    succeed(
        world
            .api
            .json_response_should_be_equal_to_file_ignoring(&response_file_name, &ignored),
    );
}

#[then(expr = "the JSON response body should be equal to:")]
fn json_body_equal_to(world: &mut ContextWorld, step: &Step) {
    succeed(world.api.json_response_should_be_equal_to(docstring(step)));
}

#[then(expr = "comparing the JSON response body with content from {string} fails with:")]
fn json_body_comparison_fails(world: &mut ContextWorld, response_file_name: String, step: &Step) {
    fail_with(
        world.api.json_response_should_be_equal_to_file(&response_file_name),
        step,
    );
}
