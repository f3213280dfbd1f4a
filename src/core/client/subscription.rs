//! Event stream handle for realtime subscriptions.

use crate::core::error::Result;
use crate::core::protocol::SseEvent;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Server-sent events from one hub connection.
///
/// Dropping the stream closes the underlying connection.
pub struct EventStream {
    receiver: Pin<Box<async_channel::Receiver<Result<SseEvent>>>>,
}

impl EventStream {
    pub fn new(receiver: async_channel::Receiver<Result<SseEvent>>) -> Self {
        EventStream {
            receiver: Box::pin(receiver),
        }
    }

    /// Next event, `None` once the connection has ended.
    pub async fn next(&mut self) -> Option<Result<SseEvent>> {
        self.receiver.recv().await.ok()
    }

    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}

impl Stream for EventStream {
    type Item = Result<SseEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.as_mut().poll_next(cx)
    }
}
