//! Adapts the orchestrator's event channel into a form suitable for an HTTP
//! response (spec §4 item 7). The actual SSE byte framing — `event:` /
//! `data:` lines — is the HTTP collaborator's job; this module only hands
//! out a `Stream` of already-typed events plus the one pure function that
//! knows the event-to-frame-name mapping from spec §6, so the HTTP layer
//! doesn't have to re-derive it from the `AgentEvent` variant names.

use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;

use crate::events::AgentEvent;

/// Wrap the raw `mpsc::Receiver` an [`crate::orchestrator::Orchestrator::run`]
/// call returns into a `Stream`, for callers that want combinators
/// (`map`/`take_while`/etc.) rather than a bare channel.
pub fn event_stream(rx: tokio::sync::mpsc::Receiver<AgentEvent>) -> impl Stream<Item = AgentEvent> {
    ReceiverStream::new(rx)
}

/// The SSE `event:` field for a given `AgentEvent` (spec §6). Kept alongside
/// the event type itself so the two can never drift out of sync; the actual
/// `data:` payload is just the event's own JSON serialization.
pub fn sse_event_name(event: &AgentEvent) -> &'static str {
    match event {
        AgentEvent::Thought { .. } => "thought",
        AgentEvent::Action { .. } => "action",
        AgentEvent::Observation { .. } => "observation",
        AgentEvent::Token { .. } => "token",
        AgentEvent::Error { .. } => "error",
        AgentEvent::Done { .. } => "done",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use tokio::sync::mpsc;

    #[test]
    fn event_names_match_spec_wire_vocabulary() {
        assert_eq!(sse_event_name(&AgentEvent::Token { text: "x".into() }), "token");
        assert_eq!(sse_event_name(&AgentEvent::Done { session_id: "s".into() }), "done");
    }

    #[tokio::test]
    async fn wraps_a_channel_into_a_pollable_stream() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(AgentEvent::Token { text: "hi".into() }).await.unwrap();
        drop(tx);

        let mut stream = Box::pin(event_stream(rx));
        let first = stream.next().await;
        assert!(matches!(first, Some(AgentEvent::Token { .. })));
        assert!(stream.next().await.is_none());
    }
}
