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

use super::{docstring, fail_with, succeed};
use crate::world::ContextWorld;

#[given("the amqp queues are set up")]
async fn set_up_queues(world: &mut ContextWorld) {
    succeed(world.amqp.before_scenario().await);
}

#[given(expr = "I have {int} messages in amqp {string} queue")]
async fn messages_in_queue(world: &mut ContextWorld, count: usize, transport: String) {
    succeed(world.amqp.messages_in_queue_should_be(count, &transport).await);
}

#[then(expr = "there are {int} messages in amqp {string} queue")]
async fn then_messages_in_queue(world: &mut ContextWorld, count: usize, transport: String) {
    succeed(world.amqp.messages_in_queue_should_be(count, &transport).await);
}

#[then(expr = "checking that there are {int} messages in amqp {string} queue fails with:")]
async fn messages_in_queue_fails(world: &mut ContextWorld, count: usize, transport: String, step: &Step) {
    fail_with(world.amqp.messages_in_queue_should_be(count, &transport).await, step);
}

#[given("I clear messages in all amqp queues")]
async fn clear_all_queues(world: &mut ContextWorld) {
    succeed(world.amqp.clear_messages_in_all_queues().await);
}

#[given(expr = "I clear messages in amqp {string} queue")]
async fn clear_queue(world: &mut ContextWorld, transport: String) {
    succeed(world.amqp.clear_messages_in_queue(&transport).await);
}

#[given(expr = "I publish in amqp queue {string} message {string} with content:")]
async fn publish_message(world: &mut ContextWorld, transport: String, command: String, step: &Step) {
    succeed(
        world
            .amqp
            .publish_message(&transport, &command, docstring(step))
            .await,
    );
}

#[then(expr = "I acknowledge the content of next message in amqp queue {string} and its content is:")]
async fn acknowledge_next_message(world: &mut ContextWorld, transport: String, step: &Step) {
    succeed(
        world
            .amqp
            .acknowledge_next_message_with_content(&transport, docstring(step))
            .await,
    );
}

#[then(expr = "acknowledging the next message in amqp queue {string} as {string} fails with:")]
async fn acknowledge_next_message_fails(world: &mut ContextWorld, transport: String, expected: String, step: &Step) {
    fail_with(
        world
            .amqp
            .acknowledge_next_message_with_content(&transport, &expected)
            .await,
        step,
    );
}
