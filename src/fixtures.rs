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
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::config::ContextConfig;
use crate::error::{ContextError, Result};

/// Persists data fixture files into the system under test.
#[async_trait]
pub trait FixtureLoader: Send + Sync {
    async fn load(&self, files: &[PathBuf]) -> Result<()>;
}

/// Loader keeping the parsed fixture documents in memory.
#[derive(Debug, Default)]
pub struct DocumentLoader {
    documents: Mutex<Vec<(PathBuf, Value)>>,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents loaded so far, in loading order.
    pub fn documents(&self) -> Vec<(PathBuf, Value)> {
        self.documents
            .lock()
            .map(|documents| documents.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FixtureLoader for DocumentLoader {
    async fn load(&self, files: &[PathBuf]) -> Result<()> {
        let mut parsed = Vec::with_capacity(files.len());
        for file in files {
            let content = fs::read_to_string(file)?;
            let document: Value = serde_yaml::from_str(&content).map_err(|err| {
                ContextError::Adapter(format!("{}: {}", file.display(), err))
            })?;
            parsed.push((file.clone(), document));
        }

        let mut documents = self
            .documents
            .lock()
            .map_err(|_| ContextError::Adapter("fixture store poisoned".to_string()))?;
        documents.extend(parsed);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FixturesContext<L> {
    loader: L,
    config: ContextConfig,
}

impl<L: FixtureLoader> FixturesContext<L> {
    pub fn new(loader: L, config: &ContextConfig) -> Self {
        Self {
            loader,
            config: config.clone(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// `Given I use fixture file :filename`
    pub async fn use_fixture_file(&self, file_name: &str) -> Result<()> {
        let path = self.config.resolve(&self.config.data_fixtures, file_name);
        if !path.is_file() {
            return Err(ContextError::Configuration(format!(
                "Fixture file {} does not exist.",
                path.display()
            )));
        }

        info!(fixture = %path.display(), "loading fixture file");
        self.loader.load(&[path]).await
    }
}
