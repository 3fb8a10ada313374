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

use cucumber::{given, then};

use super::succeed;
use crate::world::ContextWorld;

#[given(expr = "I use fixture file {string}")]
async fn use_fixture_file(world: &mut ContextWorld, file_name: String) {
    succeed(world.fixtures.use_fixture_file(&file_name).await);
}

#[then(expr = "using fixture file {string} fails")]
async fn use_fixture_file_fails(world: &mut ContextWorld, file_name: String) {
    assert!(world.fixtures.use_fixture_file(&file_name).await.is_err());
}

#[then(expr = "{int} fixture documents are loaded")]
fn fixture_documents_loaded(world: &mut ContextWorld, count: usize) {
    assert_eq!(world.fixtures.loader().documents().len(), count);
}

#[then(expr = "the fixture {string} holds {int} {word}")]
fn fixture_holds(world: &mut ContextWorld, file_name: String, count: usize, collection: String) {
    let documents = world.fixtures.loader().documents();
    let (_, document) = documents
        .iter()
        .find(|(path, _)| path.ends_with(&file_name))
        .unwrap_or_else(|| panic!("fixture {} was not loaded", file_name));

    let items = document[collection.as_str()]
        .as_array()
        .map_or(0, Vec::len);
    assert_eq!(items, count);
}
