//! Test doubles for the provider and registry boundaries.
//!
//! Enabled with the `test-utils` feature.

use crate::descriptor::{InputModality, ModelCost, ModelDescriptor};
use crate::handler::ModelHandler;
use crate::llm::{EventStream, GenerationError, StreamContext, StreamEvent, StreamingProvider};
use crate::registry::ModelRegistrar;
use crate::tier::ModelTier;
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds a well-formed descriptor with the given model id.
#[must_use]
pub fn descriptor(id: &str) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        name: id.to_string(),
        api: "scripted".to_string(),
        provider: "test".to_string(),
        base_url: "http://localhost:0".to_string(),
        reasoning: false,
        input: vec![InputModality::Text],
        cost: ModelCost::default(),
        context_window: 8_192,
        max_tokens: 1_024,
        headers: BTreeMap::new(),
    }
}

/// A session recorded by [`ScriptedProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedSession {
    /// Id of the model the session was opened for.
    pub model: String,
    /// Context the session was opened with.
    pub context: StreamContext,
}

enum Script {
    Events(Vec<StreamEvent>),
    FailAfter(Vec<StreamEvent>, String),
    RefuseOpen(String),
}

/// Provider that replays a fixed event script for every session.
pub struct ScriptedProvider {
    script: Script,
    opened: Mutex<Vec<OpenedSession>>,
}

impl ScriptedProvider {
    /// Yields `events` and then ends normally.
    #[must_use]
    pub fn new(events: Vec<StreamEvent>) -> Self {
        Self::with_script(Script::Events(events))
    }

    /// Yields `events`, then fails the stream with `message`.
    #[must_use]
    pub fn failing_after(events: Vec<StreamEvent>, message: impl Into<String>) -> Self {
        Self::with_script(Script::FailAfter(events, message.into()))
    }

    /// Refuses to open a session.
    #[must_use]
    pub fn refusing(message: impl Into<String>) -> Self {
        Self::with_script(Script::RefuseOpen(message.into()))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Returns every session opened so far.
    #[must_use]
    pub fn opened(&self) -> Vec<OpenedSession> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl StreamingProvider for ScriptedProvider {
    async fn open_stream(
        &self,
        model: &ModelDescriptor,
        context: StreamContext,
    ) -> Result<EventStream, GenerationError> {
        let (events, failure) = match &self.script {
            Script::RefuseOpen(message) => {
                return Err(GenerationError::Provider {
                    status: None,
                    message: message.clone(),
                    source: None,
                });
            }
            Script::Events(events) => (events.clone(), None),
            Script::FailAfter(events, message) => (events.clone(), Some(message.clone())),
        };

        self.opened.lock().push(OpenedSession {
            model: model.id.clone(),
            context,
        });

        let items = events
            .into_iter()
            .map(Ok)
            .chain(failure.map(|message| Err(GenerationError::Stream(message))));
        Ok(futures::stream::iter(items).boxed())
    }
}

/// Registry double that records every `register` call.
#[derive(Default)]
pub struct RecordingRegistrar {
    /// Calls in the order they were made.
    pub calls: Vec<(ModelTier, String, Arc<dyn ModelHandler>)>,
}

impl ModelRegistrar for RecordingRegistrar {
    fn register(&mut self, tier: ModelTier, provider: &str, handler: Arc<dyn ModelHandler>) {
        self.calls.push((tier, provider.to_string(), handler));
    }
}
