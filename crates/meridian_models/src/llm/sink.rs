//! Caller-supplied receivers for live text deltas.

use super::error::SinkError;
use futures::channel::mpsc::UnboundedSender;

/// Receives each text delta of an invocation as it arrives.
///
/// A sink is called once per text delta, in arrival order, before the next
/// event is read. Returning an error stops the invocation.
///
/// Closures implement this trait directly:
///
/// ```
/// use meridian_models::llm::{ChunkSink, SinkError};
///
/// let mut seen = Vec::new();
/// let mut sink = |chunk: &str| -> Result<(), SinkError> {
///     seen.push(chunk.to_string());
///     Ok(())
/// };
/// sink.on_chunk("a").unwrap();
/// ```
pub trait ChunkSink: Send {
    /// Handles one text delta.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the chunk could not be delivered.
    fn on_chunk(&mut self, chunk: &str) -> Result<(), SinkError>;
}

impl<F> ChunkSink for F
where
    F: FnMut(&str) -> Result<(), SinkError> + Send,
{
    fn on_chunk(&mut self, chunk: &str) -> Result<(), SinkError> {
        self(chunk)
    }
}

/// Forwards chunks over a channel, e.g. to a UI task rendering live output.
impl ChunkSink for UnboundedSender<String> {
    fn on_chunk(&mut self, chunk: &str) -> Result<(), SinkError> {
        self.unbounded_send(chunk.to_string())
            .map_err(|_| SinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures::channel::mpsc;

    #[test]
    fn channel_sink_forwards_in_order() {
        let (mut tx, rx) = mpsc::unbounded::<String>();
        tx.on_chunk("a").unwrap();
        tx.on_chunk("b").unwrap();
        drop(tx);

        let received: Vec<String> = futures::executor::block_on(rx.collect());
        assert_eq!(received, ["a", "b"]);
    }

    #[test]
    fn channel_sink_reports_closed_receiver() {
        let (mut tx, rx) = mpsc::unbounded::<String>();
        drop(rx);
        assert_eq!(tx.on_chunk("a"), Err(SinkError::Closed));
    }
}
