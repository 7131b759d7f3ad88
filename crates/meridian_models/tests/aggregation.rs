//! End-to-end invocation through registered tier handlers.

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use meridian_models::llm::{
    EventStream, GenerationError, InvocationRequest, SinkError, StopReason, StreamContext,
    StreamEvent, StreamingProvider, Usage,
};
use meridian_models::testing::{ScriptedProvider, descriptor};
use meridian_models::{
    ModelDescriptor, ModelRegistry, ModelTier, TierConfig, TierModel, TierRegistrar,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn small_model(provider: Arc<dyn StreamingProvider>) -> TierModel {
    let mut registry = ModelRegistry::new();
    TierRegistrar::new(provider, TierConfig::new(descriptor("big"), descriptor("little")))
        .register(&mut registry)
        .unwrap();
    registry.model(ModelTier::Small).unwrap()
}

fn recording_sink() -> (
    Arc<Mutex<Vec<String>>>,
    impl FnMut(&str) -> Result<(), SinkError> + Send + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let sink = move |chunk: &str| -> Result<(), SinkError> {
        sink_seen.lock().unwrap().push(chunk.to_string());
        Ok(())
    };
    (seen, sink)
}

#[tokio::test]
async fn resolves_to_concatenated_response_without_sink() {
    let model = small_model(Arc::new(ScriptedProvider::new(vec![
        StreamEvent::text("<response>"),
        StreamEvent::text("ok"),
        StreamEvent::text("</response>"),
    ])));

    let text = model.generate(InvocationRequest::new("hi")).await.unwrap();
    assert_eq!(text, "<response>ok</response>");
}

#[tokio::test]
async fn recording_sink_sees_each_delta() {
    let model = small_model(Arc::new(ScriptedProvider::new(vec![
        StreamEvent::Start,
        StreamEvent::text("a"),
        StreamEvent::other("ping"),
        StreamEvent::text("b"),
        StreamEvent::Done {
            stop_reason: Some(StopReason::EndTurn),
            usage: Usage {
                input_tokens: Some(3),
                output_tokens: Some(2),
                ..Usage::default()
            },
        },
    ])));
    let (seen, sink) = recording_sink();

    let text = model
        .generate_streaming(InvocationRequest::new("hi"), sink)
        .await
        .unwrap();

    assert_eq!(text, "ab");
    assert_eq!(*seen.lock().unwrap(), ["a", "b"]);
}

#[tokio::test]
async fn sink_attached_to_request_is_honoured() {
    let model = small_model(Arc::new(ScriptedProvider::new(vec![
        StreamEvent::text("x"),
        StreamEvent::text("y"),
    ])));
    let (seen, sink) = recording_sink();

    let text = model
        .generate(InvocationRequest::new("hi").chunk_sink(sink))
        .await
        .unwrap();

    assert_eq!(text, "xy");
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn channel_sink_streams_to_another_task() {
    let model = small_model(Arc::new(ScriptedProvider::new(vec![
        StreamEvent::text("live "),
        StreamEvent::text("output"),
    ])));
    let (tx, rx) = mpsc::unbounded::<String>();

    let display = tokio::spawn(rx.collect::<Vec<String>>());
    let text = model
        .generate_streaming(InvocationRequest::new("hi"), tx)
        .await
        .unwrap();

    assert_eq!(text, "live output");
    assert_eq!(display.await.unwrap(), ["live ", "output"]);
}

#[tokio::test]
async fn session_open_failure_propagates() {
    let model = small_model(Arc::new(ScriptedProvider::refusing("credentials rejected")));

    let err = model.generate(InvocationRequest::new("hi")).await.unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Provider { message, .. } if message == "credentials rejected"
    ));
}

#[tokio::test]
async fn mid_stream_failure_rejects_even_after_deltas() {
    let model = small_model(Arc::new(ScriptedProvider::failing_after(
        vec![StreamEvent::text("half an ans")],
        "connection reset",
    )));
    let (seen, sink) = recording_sink();

    let err = model
        .generate_streaming(InvocationRequest::new("hi"), sink)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Stream(_)));
    assert_eq!(*seen.lock().unwrap(), ["half an ans"]);
}

#[tokio::test]
async fn closed_channel_sink_fails_the_call() {
    let model = small_model(Arc::new(ScriptedProvider::new(vec![StreamEvent::text("a")])));
    let (tx, rx) = mpsc::unbounded::<String>();
    drop(rx);

    let err = model
        .generate_streaming(InvocationRequest::new("hi"), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Sink(SinkError::Closed)));
}

#[tokio::test]
async fn prompt_and_params_reach_the_provider_unmodified() {
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let model = small_model(provider.clone());

    let text = model
        .generate(
            InvocationRequest::with_system("sys", "prompt")
                .param("temperature", 0.7)
                .param("top_k", 5),
        )
        .await
        .unwrap();

    assert_eq!(text, "");
    let opened = provider.opened();
    assert_eq!(opened.len(), 1);
    let context = &opened[0].context;
    assert_eq!(context.system.as_deref(), Some("sys"));
    assert_eq!(context.messages.last().unwrap().text(), "prompt");
    assert_eq!(context.params["temperature"], serde_json::json!(0.7));
    assert_eq!(context.params["top_k"], serde_json::json!(5));
}

/// Yields deltas one at a time, suspending between each.
struct Slow {
    deltas: Vec<&'static str>,
    delay: Duration,
}

#[async_trait]
impl StreamingProvider for Slow {
    async fn open_stream(
        &self,
        _model: &ModelDescriptor,
        context: StreamContext,
    ) -> Result<EventStream, GenerationError> {
        let tag = context
            .messages
            .last()
            .map(|message| message.text().to_string())
            .unwrap_or_default();
        let delay = self.delay;
        let deltas = self.deltas.clone();
        Ok(futures::stream::iter(deltas)
            .then(move |delta| {
                let tag = tag.clone();
                async move {
                    tokio::time::sleep(delay).await;
                    Ok::<_, GenerationError>(StreamEvent::text(format!("{tag}{delta}")))
                }
            })
            .boxed())
    }
}

#[tokio::test]
async fn concurrent_invocations_do_not_interleave() {
    let model = small_model(Arc::new(Slow {
        deltas: vec!["1", "2", "3"],
        delay: Duration::from_millis(5),
    }));

    let (a, b) = tokio::join!(
        model.generate(InvocationRequest::new("a")),
        model.generate(InvocationRequest::new("b")),
    );

    assert_eq!(a.unwrap(), "a1a2a3");
    assert_eq!(b.unwrap(), "b1b2b3");
}

/// Yields one delta, then never produces another event.
struct Stalls;

#[async_trait]
impl StreamingProvider for Stalls {
    async fn open_stream(
        &self,
        _model: &ModelDescriptor,
        _context: StreamContext,
    ) -> Result<EventStream, GenerationError> {
        let first = futures::stream::iter([Ok(StreamEvent::text("t1"))]);
        Ok(first.chain(futures::stream::pending()).boxed())
    }
}

#[tokio::test]
async fn cancelled_invocation_stops_reading() {
    let model = small_model(Arc::new(Stalls));
    let (seen, sink) = recording_sink();

    let result = tokio::time::timeout(
        Duration::from_millis(50),
        model.generate_streaming(InvocationRequest::new("t"), sink),
    )
    .await;

    assert!(result.is_err(), "invocation should have been cancelled");
    assert_eq!(*seen.lock().unwrap(), ["t1"]);
}
