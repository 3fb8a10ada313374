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
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::ContextConfig;
use crate::error::{mismatch, ContextError, Result};
use crate::json_diff::misc::Bulleted;

/// Steps checking files produced by the application.
///
/// Paths given to steps are relative to the project directory; reference
/// files are read from the file fixtures directory.
#[derive(Debug)]
pub struct FileContext {
    config: ContextConfig,
    clean_queue: Vec<PathBuf>,
}

impl FileContext {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            config: config.clone(),
            clean_queue: vec![],
        }
    }

    /// `Given I create file in :path from :file`
    pub fn create_file_from(&mut self, path: &str, file: &str) -> Result<()> {
        let (_, file_name) = split_file(file)?;
        let dir = self.config.project_path(path);
        fs::create_dir_all(&dir)?;

        let new_file = dir.join(file_name);
        fs::copy(self.fixture(file), &new_file)?;
        info!(file = %new_file.display(), "created file from fixture");
        self.clean_queue.push(new_file);
        Ok(())
    }

    /// `Then The file :file must be a copy of :fileExpected`
    pub fn file_must_be_copy_of(&self, file: &str, file_expected: &str) -> Result<()> {
        let target = self.existing_file(file)?;

        if fs::read(&target)? != fs::read(self.fixture(file_expected))? {
            return mismatch!(
                "File {} is not identical to {}",
                target.display(),
                file_expected
            );
        }
        Ok(())
    }

    /// `Then One of file present in :path must be a copy of :fileExpected`
    pub fn one_of_files_must_be_copy_of(&self, path: &str, file_expected: &str) -> Result<()> {
        let folder = self.existing_folder(path)?;
        let expected = fs::read(self.fixture(file_expected))?;

        let mut found = 0;
        for file in folder_entries(&folder)? {
            if file.is_file() && fs::read(&file)? == expected {
                found += 1;
            }
        }

        match found {
            0 => mismatch!("A copy of file {} not found in {}", file_expected, path),
            1 => Ok(()),
            _ => mismatch!(
                "More than one file identical to {} found in {}",
                file_expected,
                path
            ),
        }
    }

    /// `Then The file :file size is less or equal to :size octet`
    pub fn file_size_should_be_at_most(&self, file: &str, size: u64) -> Result<()> {
        let actual = fs::metadata(self.existing_file(file)?)?.len();

        if actual > size {
            return mismatch!("File size is {} octet too big.", actual - size);
        }
        Ok(())
    }

    /// `Then The file :file size is equal to :size octet`
    pub fn file_size_should_be(&self, file: &str, size: u64) -> Result<()> {
        let actual = fs::metadata(self.existing_file(file)?)?.len();

        if actual != size {
            return mismatch!("File size expected: {}, given : {}", size, actual);
        }
        Ok(())
    }

    /// `Then The file :file mime type must be equal to :mimeType`
    pub fn mime_type_should_be(&self, file: &str, mime_type: &str) -> Result<()> {
        let actual = detect_mime_type(&self.existing_file(file)?)?;

        if actual != mime_type {
            return mismatch!(
                "File mime type expected: {}, given : {}",
                mime_type,
                actual
            );
        }
        Ok(())
    }

    /// `Then The file :file mime type must be equal to one of following:`
    pub fn mime_type_should_be_one_of(&self, file: &str, mime_types: &[&str]) -> Result<()> {
        let actual = detect_mime_type(&self.existing_file(file)?)?;

        if !mime_types.contains(&actual.as_str()) {
            return mismatch!(
                "File mime type expected: {}, given : {}",
                mime_types.join(", "),
                actual
            );
        }
        Ok(())
    }

    /// `Then I clean all files from folder :folder`
    pub fn clean_folder(&self, folder: &str) -> Result<()> {
        let folder = self.existing_folder(folder)?;

        for file in folder_entries(&folder)? {
            if file.is_file() {
                fs::remove_file(&file)?;
            }
        }
        info!(folder = %folder.display(), "cleaned folder");
        Ok(())
    }

    /// `Then :number files must be present in folder :path`
    pub fn files_in_folder_should_be(&self, path: &str, number: usize) -> Result<()> {
        let folder = self.existing_folder(path)?;
        let file_number = folder_entries(&folder)?.len();

        if file_number != number {
            return mismatch!(
                "{} files found in \"{}\". {} expected.",
                file_number,
                path,
                number
            );
        }
        Ok(())
    }

    /// `Then The file with name :fileName must be present in :path`
    pub fn file_must_exist(&self, file_name: &str, path: &str) -> Result<()> {
        let folder = self.existing_folder(path)?;
        let file = folder.join(file_name);

        if !file.is_file() {
            let files_found = folder_entries(&folder)?
                .iter()
                .map(|entry| entry.display().to_string())
                .collect::<Vec<_>>();

            let listing = match files_found.is_empty() {
                true => String::new(),
                false => format!("\n\nFiles found :\n{}", files_found.bulleted()),
            };

            return mismatch!("File \"{}\" don't exist.{}", file.display(), listing);
        }
        Ok(())
    }

    /// `Then I clean generated files`, also run after `@clean-files-after`
    /// scenarios.
    pub fn clean_generated_files(&mut self) -> Result<()> {
        for file in self.clean_queue.drain(..) {
            match fs::remove_file(&file) {
                Ok(()) => debug!(file = %file.display(), "removed generated file"),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    warn!(file = %file.display(), "generated file already removed")
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn fixture(&self, file_name: &str) -> PathBuf {
        self.config.resolve(&self.config.file_fixtures, file_name)
    }

    fn existing_folder(&self, path: &str) -> Result<PathBuf> {
        let folder = self.config.project_path(path);
        if !folder.is_dir() {
            return mismatch!("Folder \"{}\" not found.", folder.display());
        }
        Ok(folder)
    }

    fn existing_file(&self, file: &str) -> Result<PathBuf> {
        let (dir, file_name) = split_file(file)?;
        self.file_must_exist(file_name, dir)?;
        Ok(self.config.project_path(file))
    }
}

/// Splits `some/dir/name.ext` into `("some/dir", "name.ext")`.
fn split_file(file: &str) -> Result<(&str, &str)> {
    let trimmed = file.trim_end_matches('/');
    let (dir, name) = match trimmed.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", trimmed),
    };

    if name.is_empty() {
        return Err(ContextError::Configuration(format!(
            "{} does not name a file",
            file
        )));
    }
    Ok((dir, name))
}

/// Visible entries of a folder, sorted.
fn folder_entries(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(folder)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()?;

    entries.retain(|path| {
        !path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'))
    });
    entries.sort();
    Ok(entries)
}

/// Mime type from the file content, with text fallbacks for what magic
/// numbers can't tell apart.
pub fn detect_mime_type(path: &Path) -> Result<String> {
    if let Some(kind) = infer::get_from_path(path)? {
        return Ok(kind.mime_type().to_string());
    }

    let content = fs::read(path)?;
    let mime_type = match std::str::from_utf8(&content) {
        _ if content.is_empty() => "application/x-empty",
        Ok(text) if looks_like_json(text) => "application/json",
        Ok(_) => "text/plain",
        Err(_) => "application/octet-stream",
    };
    Ok(mime_type.to_string())
}

fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim_start();
    (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(text).is_ok()
}
