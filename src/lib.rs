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

#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

pub mod amqp;
pub mod api;
#[cfg(feature = "broker")]
pub mod broker;
pub mod browser;
pub mod config;
pub mod domain;
pub mod error;
pub mod file;
pub mod fixtures;
pub mod http_mock;
pub mod json_diff;
pub mod swagger;

pub use amqp::{AmqpContext, MemoryAdapter, Message, QueueAdapter, Transports};
pub use api::ApiContext;
#[cfg(feature = "broker")]
pub use broker::BrokerAdapter;
pub use browser::{ReqwestBrowser, RestBrowser};
pub use config::{ContextConfig, MockServerConfig};
pub use domain::{HttpMethod, Request, Response};
pub use error::{ContextError, Result};
pub use file::FileContext;
pub use fixtures::{DocumentLoader, FixtureLoader, FixturesContext};
pub use http_mock::HttpMockContext;
pub use json_diff::{
    compare, compare_with, parse_document, ArrayMode, Config, DiffKind, DiffReport, Difference,
};
pub use swagger::SwaggerContext;
