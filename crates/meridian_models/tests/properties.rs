//! Property tests for text aggregation.

use futures::StreamExt;
use futures::executor::block_on;
use meridian_models::llm::{
    GenerationError, InvocationRequest, SinkError, StreamEvent, aggregate_text,
};
use meridian_models::testing::{ScriptedProvider, descriptor};
use meridian_models::{ModelRegistry, ModelTier, TierConfig, TierRegistrar};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

fn non_text_event() -> impl Strategy<Value = StreamEvent> {
    prop_oneof![
        Just(StreamEvent::Start),
        Just(StreamEvent::BlockStop),
        ".{0,8}".prop_map(StreamEvent::ThinkingDelta),
        ".{0,8}".prop_map(StreamEvent::ToolCallDelta),
        "[a-z_]{1,12}".prop_map(|kind| StreamEvent::Other { kind }),
    ]
}

/// Text payloads interleaved with arbitrary non-text events.
fn script() -> impl Strategy<Value = (Vec<String>, Vec<StreamEvent>)> {
    prop::collection::vec(
        (".{0,6}", prop::collection::vec(non_text_event(), 0..3)),
        0..16,
    )
    .prop_map(|segments| {
        let mut payloads = Vec::new();
        let mut events = Vec::new();
        for (payload, noise) in segments {
            events.extend(noise);
            events.push(StreamEvent::TextDelta(payload.clone()));
            payloads.push(payload);
        }
        (payloads, events)
    })
}

fn run(events: Vec<StreamEvent>, with_sink: bool) -> (String, Vec<String>) {
    let provider = Arc::new(ScriptedProvider::new(events));
    let mut registry = ModelRegistry::new();
    TierRegistrar::new(provider, TierConfig::new(descriptor("l"), descriptor("s")))
        .register(&mut registry)
        .unwrap();
    let model = registry.model(ModelTier::Large).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut request = InvocationRequest::new("prompt");
    if with_sink {
        let sink_seen = Arc::clone(&seen);
        request = request.chunk_sink(move |chunk: &str| -> Result<(), SinkError> {
            sink_seen.lock().unwrap().push(chunk.to_string());
            Ok(())
        });
    }

    let text = block_on(model.generate(request)).unwrap();
    let seen = seen.lock().unwrap().clone();
    (text, seen)
}

proptest! {
    #[test]
    fn result_is_ordered_concatenation_of_text_deltas((payloads, events) in script()) {
        let (text, _) = run(events, false);
        prop_assert_eq!(text, payloads.concat());
    }

    #[test]
    fn sink_never_changes_the_result((payloads, events) in script()) {
        let (without, _) = run(events.clone(), false);
        let (with, seen) = run(events, true);
        prop_assert_eq!(&with, &without);
        prop_assert_eq!(seen, payloads);
    }

    #[test]
    fn failure_after_any_prefix_yields_no_text((_, events) in script(), cut in 0usize..32) {
        let cut = cut.min(events.len());
        let items: Vec<Result<StreamEvent, GenerationError>> = events
            .into_iter()
            .take(cut)
            .map(Ok)
            .chain([Err(GenerationError::Stream("dropped".to_string()))])
            .collect();

        let result = block_on(aggregate_text(futures::stream::iter(items).boxed(), None));
        prop_assert!(matches!(result, Err(GenerationError::Stream(_))));
    }
}
