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

use cucumber::gherkin::Step;
use cucumber::then;

use super::{fail_with, succeed};
use crate::world::ContextWorld;

#[then(expr = "I validate Swagger response on {string} with {word} method and statusCode {int}")]
fn validate_response(world: &mut ContextWorld, path: String, method: String, status_code: u16) {
    let response = succeed(world.api.response());
    succeed(
        world
            .swagger
            .validate_response(response, &path, &method, status_code),
    );
}

#[then(expr = "validating Swagger response on {string} with {word} method and statusCode {int} fails with:")]
fn validate_response_fails(
    world: &mut ContextWorld,
    path: String,
    method: String,
    status_code: u16,
    step: &Step,
) {
    let response = succeed(world.api.response());
    fail_with(
        world
            .swagger
            .validate_response(response, &path, &method, status_code),
        step,
    );
}
