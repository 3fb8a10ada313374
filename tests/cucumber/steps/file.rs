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
use cucumber::{given, then};

use super::{fail_with, succeed, table_column};
use crate::world::ContextWorld;

#[given(expr = "I create file in {string} from {string}")]
fn create_file(world: &mut ContextWorld, path: String, file: String) {
    succeed(world.files.create_file_from(&path, &file));
}

#[then(expr = "The file {string} must be a copy of {string}")]
fn file_is_copy(world: &mut ContextWorld, file: String, file_expected: String) {
    succeed(world.files.file_must_be_copy_of(&file, &file_expected));
}

#[then(expr = "One of file present in {string} must be a copy of {string}")]
fn one_file_is_copy(world: &mut ContextWorld, path: String, file_expected: String) {
    succeed(world.files.one_of_files_must_be_copy_of(&path, &file_expected));
}

#[then(expr = "The file {string} size is less or equal to {int} octet")]
fn file_size_at_most(world: &mut ContextWorld, file: String, size: u64) {
    succeed(world.files.file_size_should_be_at_most(&file, size));
}

#[then(expr = "The file {string} size is equal to {int} octet")]
fn file_size(world: &mut ContextWorld, file: String, size: u64) {
    succeed(world.files.file_size_should_be(&file, size));
}

#[then(expr = "checking that the file {string} size is equal to {int} octet fails with:")]
fn file_size_fails(world: &mut ContextWorld, file: String, size: u64, step: &Step) {
    fail_with(world.files.file_size_should_be(&file, size), step);
}

#[then(expr = "The file {string} mime type must be equal to {string}")]
fn mime_type_equals(world: &mut ContextWorld, file: String, mime_type: String) {
    succeed(world.files.mime_type_should_be(&file, &mime_type));
}

#[then(expr = "The file {string} mime type must be equal to one of following:")]
fn mime_type_one_of(world: &mut ContextWorld, file: String, step: &Step) {
    let mime_types = table_column(step);
    let mime_types = mime_types.iter().map(String::as_str).collect::<Vec<_>>();
    succeed(world.files.mime_type_should_be_one_of(&file, &mime_types));
}

#[then(expr = "I clean all files from folder {string}")]
fn clean_folder(world: &mut ContextWorld, folder: String) {
    succeed(world.files.clean_folder(&folder));
}

#[then(expr = "{int} files must be present in folder {string}")]
fn files_in_folder(world: &mut ContextWorld, number: usize, path: String) {
    succeed(world.files.files_in_folder_should_be(&path, number));
}

#[then(expr = "The file with name {string} must be present in {string}")]
fn file_present(world: &mut ContextWorld, file_name: String, path: String) {
    succeed(world.files.file_must_exist(&file_name, &path));
}

#[then(expr = "checking that the file with name {string} is present in {string} fails with:")]
fn file_present_fails(world: &mut ContextWorld, file_name: String, path: String, step: &Step) {
    let result = world.files.file_must_exist(&file_name, &path);
    let project = world.project.path().display().to_string();
    match result {
        Err(err) => {
            let message = err.to_string().replace(&project, "<project>");
            fail_with::<()>(Err(api_contexts::ContextError::AssertionMismatch(message)), step);
        }
        Ok(()) => panic!("file {} unexpectedly found in {}", file_name, path),
    }
}

#[then("I clean generated files")]
fn clean_generated_files(world: &mut ContextWorld) {
    succeed(world.files.clean_generated_files());
}
