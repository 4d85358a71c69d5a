//! Channel-backed streams for token and answer delivery.
//!
//! Generation providers push tokens into a bounded channel consumed by the
//! query pipeline; the pipeline relays answer fragments into a second
//! channel consumed by the transport layer. Dropping a receiving half makes
//! the paired sender's `send` fail, which producers treat as the signal to
//! stop pulling from upstream.

use crate::error::{Error, Result};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio::sync::mpsc;
use tracing::debug;

/// Fragments buffered per channel before senders wait.
const CHANNEL_CAPACITY: usize = 32;

/// Stream of raw generation tokens produced by a generation provider.
pub struct TokenStream {
    /// Receiving half of the token channel.
    receiver: mpsc::Receiver<Result<String>>,
}

impl TokenStream {
    /// Creates a connected sender/stream pair.
    #[must_use]
    pub fn channel() -> (TokenSender, Self) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        (TokenSender { sender }, Self { receiver })
    }

    /// Receives the next token, or `None` once the producer is done.
    pub async fn next_token(&mut self) -> Option<Result<String>> {
        self.receiver.recv().await
    }
}

impl Stream for TokenStream {
    type Item = Result<String>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        task_cx: &mut TaskContext<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(task_cx)
    }
}

/// Producing half of a token channel.
pub struct TokenSender {
    /// Sending half of the token channel.
    sender: mpsc::Sender<Result<String>>,
}

impl TokenSender {
    /// Sends one token, returning `false` when the consumer is gone.
    pub async fn send(&self, token: impl Into<String>) -> bool {
        if self.sender.send(Ok(token.into())).await.is_err() {
            debug!("token stream consumer disconnected");
            return false;
        }
        true
    }

    /// Sends a terminal error, returning `false` when the consumer is gone.
    ///
    /// Producers send at most one error and stop afterwards.
    pub async fn fail(&self, error: Error) -> bool {
        if self.sender.send(Err(error)).await.is_err() {
            debug!("token stream consumer disconnected before error delivery");
            return false;
        }
        true
    }
}

/// Stream of answer fragments delivered to the transport layer.
///
/// Fragment boundaries carry no meaning; concatenating every fragment
/// yields the full response text, which always terminates with the
/// citation marker.
pub struct AnswerStream {
    /// Receiving half of the answer channel.
    receiver: mpsc::Receiver<String>,
}

impl AnswerStream {
    /// Creates a connected sender/stream pair.
    #[must_use]
    pub fn channel() -> (AnswerSender, Self) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        (AnswerSender { sender }, Self { receiver })
    }

    /// Receives the next fragment, or `None` once the producer is done.
    pub async fn next_fragment(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Drains the stream and concatenates every fragment.
    pub async fn collect_text(mut self) -> String {
        let mut text = String::new();
        while let Some(fragment) = self.receiver.recv().await {
            text.push_str(&fragment);
        }
        text
    }
}

impl Stream for AnswerStream {
    type Item = String;

    fn poll_next(
        mut self: Pin<&mut Self>,
        task_cx: &mut TaskContext<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(task_cx)
    }
}

/// Producing half of an answer channel.
#[derive(Clone)]
pub struct AnswerSender {
    /// Sending half of the answer channel.
    sender: mpsc::Sender<String>,
}

impl AnswerSender {
    /// Sends one fragment, returning `false` when the consumer has dropped
    /// the stream. Producers stop on the first failed send.
    pub async fn send(&self, fragment: impl Into<String>) -> bool {
        if self.sender.send(fragment.into()).await.is_err() {
            debug!("answer stream consumer disconnected");
            return false;
        }
        true
    }
}
