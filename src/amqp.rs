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

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::env;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ContextConfig;
use crate::error::{mismatch, ContextError, Result};
use crate::json_diff::{compare, parse_document};

/// A message as published to a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub body: String,
    pub content_type: String,
    /// Message type header, usually the command name.
    pub kind: Option<String>,
}

/// Queue operations the AMQP steps rely on.
///
/// [`MemoryAdapter`] keeps everything in-process. With the `broker` feature,
/// `BrokerAdapter` talks to a RabbitMQ-compatible broker.
#[async_trait]
pub trait QueueAdapter: Send + Sync {
    async fn publish(&self, transport: &str, content: &str, command: Option<&str>) -> Result<()>;

    async fn count_messages(&self, transport: &str) -> Result<usize>;

    async fn purge(&self, transport: &str) -> Result<()>;

    async fn purge_all(&self) -> Result<()>;

    /// Declares the queue of every known transport.
    async fn setup_queues(&self) -> Result<()>;

    /// Removes the next message from the queue, `None` when it is empty.
    async fn acknowledge_next(&self, transport: &str) -> Result<Option<Message>>;
}

/// Transport names mapped to broker DSNs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transports {
    dsns: BTreeMap<String, String>,
}

impl Transports {
    pub fn new(dsns: BTreeMap<String, String>) -> Self {
        Self { dsns }
    }

    pub fn from_config(config: &ContextConfig) -> Self {
        Self::new(config.transports.clone())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dsns.keys().map(String::as_str)
    }

    /// DSN of the transport, reading `env(VAR)` values from the environment.
    pub fn resolve_dsn(&self, transport: &str) -> Result<String> {
        let dsn = self.dsns.get(transport).ok_or_else(|| {
            ContextError::Configuration(format!(
                "AMQP connection with name {} does not exist.",
                transport
            ))
        })?;

        let env_var = dsn
            .strip_prefix("env(")
            .and_then(|rest| rest.strip_suffix(')'));
        match env_var {
            Some(env_var) => env::var(env_var).map_err(|_| {
                ContextError::Configuration(format!(
                    "environment variable {} used by transport {} is not set",
                    env_var, transport
                ))
            }),
            None => Ok(dsn.clone()),
        }
    }
}

/// In-process [`QueueAdapter`]. Queues exist once set up or published to.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    transports: Transports,
    queues: Mutex<HashMap<String, VecDeque<Message>>>,
}

impl MemoryAdapter {
    pub fn new(transports: Transports) -> Self {
        Self {
            transports,
            queues: Mutex::new(HashMap::new()),
        }
    }

    fn queues(&self) -> Result<MutexGuard<'_, HashMap<String, VecDeque<Message>>>> {
        self.queues
            .lock()
            .map_err(|_| ContextError::Adapter("queue storage is poisoned".to_string()))
    }
}

#[async_trait]
impl QueueAdapter for MemoryAdapter {
    async fn publish(&self, transport: &str, content: &str, command: Option<&str>) -> Result<()> {
        self.transports.resolve_dsn(transport)?;
        self.queues()?
            .entry(transport.to_string())
            .or_default()
            .push_back(Message {
                body: content.to_string(),
                content_type: "text/plain".to_string(),
                kind: command.map(str::to_string),
            });
        Ok(())
    }

    async fn count_messages(&self, transport: &str) -> Result<usize> {
        self.transports.resolve_dsn(transport)?;
        Ok(self.queues()?.get(transport).map_or(0, VecDeque::len))
    }

    async fn purge(&self, transport: &str) -> Result<()> {
        self.transports.resolve_dsn(transport)?;
        if let Some(queue) = self.queues()?.get_mut(transport) {
            queue.clear();
        }
        Ok(())
    }

    async fn purge_all(&self) -> Result<()> {
        for name in self.transports.names() {
            self.purge(name).await?;
        }
        Ok(())
    }

    async fn setup_queues(&self) -> Result<()> {
        let mut queues = self.queues()?;
        for name in self.transports.names() {
            let dsn = self.transports.resolve_dsn(name)?;
            debug!(transport = name, dsn = %dsn, "declaring queue");
            queues.entry(name.to_string()).or_default();
        }
        Ok(())
    }

    async fn acknowledge_next(&self, transport: &str) -> Result<Option<Message>> {
        self.transports.resolve_dsn(transport)?;
        Ok(self
            .queues()?
            .get_mut(transport)
            .and_then(VecDeque::pop_front))
    }
}

/// Steps publishing to and inspecting message queues.
#[derive(Debug)]
pub struct AmqpContext<A> {
    adapter: A,
    setup_queues_automatically: bool,
}

impl<A: QueueAdapter> AmqpContext<A> {
    pub fn new(adapter: A, config: &ContextConfig) -> Self {
        Self {
            adapter,
            setup_queues_automatically: config.setup_queues_automatically,
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Hook for scenarios tagged `@amqp`: declares queues when enabled,
    /// then empties them.
    pub async fn before_scenario(&self) -> Result<()> {
        if self.setup_queues_automatically {
            self.adapter.setup_queues().await?;
        }
        self.clear_messages_in_all_queues().await
    }

    /// `Given I have :count messages in amqp :transport queue`
    pub async fn messages_in_queue_should_be(&self, count_expected: usize, transport: &str) -> Result<()> {
        let count = self.adapter.count_messages(transport).await?;

        if count != count_expected {
            return mismatch!(
                "There is {} message(s) in the queue at this moment.",
                count
            );
        }
        Ok(())
    }

    /// `Given I clear messages in all amqp queues`
    pub async fn clear_messages_in_all_queues(&self) -> Result<()> {
        info!("purging all queues");
        self.adapter.purge_all().await
    }

    /// `Given I clear messages in amqp :transport queue`
    pub async fn clear_messages_in_queue(&self, transport: &str) -> Result<()> {
        info!(transport, "purging queue");
        self.adapter.purge(transport).await
    }

    /// `Given I publish in amqp queue :transport message :command with content:`
    pub async fn publish_message(&self, transport: &str, command: &str, content: &str) -> Result<()> {
        info!(transport, command, "publishing message");
        self.adapter.publish(transport, content, Some(command)).await
    }

    /// `Then I acknowledge the content of next message in amqp queue :transport and its content is:`
    pub async fn acknowledge_next_message_with_content(&self, transport: &str, expected: &str) -> Result<()> {
        let Some(message) = self.adapter.acknowledge_next(transport).await? else {
            return mismatch!("There is no message in the queue {}.", transport);
        };

        let actual = parse_document(
            &message.body,
            &format!("Retrieved message from the queue {} is not a valid Json string.", transport),
        )?;
        let expected_json = parse_document(expected, "The message expected given is not a valid Json string.")?;

        let report = compare(&actual, &expected_json);
        if !report.is_empty() {
            return mismatch!(
                "Retrieved message {} from the queue {} is not equal to expected message {}\n{}",
                message.body,
                transport,
                expected,
                report
            );
        }
        Ok(())
    }
}
