//! Live progress events for one dream, decoded from a text-event stream.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt};
use tokio::sync::watch;

use crate::error::{ApiError, ApiResult};
use crate::model::ProgressEvent;

mod lines;
use self::lines::{LineFramer, decode_line};

/// Raw body chunks as delivered by the transport.
pub type ByteStream = BoxStream<'static, ApiResult<Vec<u8>>>;

/// Ordered, non-restartable sequence of progress events.
///
/// Ends after the connection closes cleanly, after the first error item, or
/// once cancelled. Dropping it closes the underlying connection.
pub struct ProgressStream {
    inner: Option<BoxStream<'static, ApiResult<ProgressEvent>>>,
    cancel: Arc<watch::Sender<bool>>,
}

/// Detached handle that stops a [`ProgressStream`] from another task.
#[derive(Clone)]
pub struct StreamCancel(Arc<watch::Sender<bool>>);

impl StreamCancel {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

impl ProgressStream {
    /// Run `connect` on first poll, then decode the body it yields.
    pub fn connect<F>(connect: F, read_timeout: Duration) -> Self
    where
        F: Future<Output = ApiResult<ByteStream>> + Send + 'static,
    {
        let events = stream::once(connect)
            .flat_map(move |res| match res {
                Ok(body) => decode_events(body, read_timeout),
                Err(err) => stream::once(async move { Err(err) }).boxed(),
            })
            .boxed();
        Self::from_events(events)
    }

    /// Decode an already-open body.
    pub fn from_body(body: ByteStream, read_timeout: Duration) -> Self {
        Self::from_events(decode_events(body, read_timeout))
    }

    pub fn from_events(events: BoxStream<'static, ApiResult<ProgressEvent>>) -> Self {
        let (tx, mut rx) = watch::channel(false);
        let cancelled = async move {
            let closed = rx.wait_for(|c| *c).await.is_err();
            if closed {
                std::future::pending::<()>().await;
            }
        };
        Self {
            inner: Some(events.take_until(cancelled).boxed()),
            cancel: Arc::new(tx),
        }
    }

    pub fn cancel(&mut self) {
        self.cancel.send_replace(true);
        self.inner = None;
    }

    pub fn cancel_handle(&self) -> StreamCancel {
        StreamCancel(self.cancel.clone())
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

impl Stream for ProgressStream {
    type Item = ApiResult<ProgressEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.is_cancelled() {
            self.inner = None;
            return Poll::Ready(None);
        }
        let Some(inner) = self.inner.as_mut() else {
            return Poll::Ready(None);
        };
        match inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(event))) => Poll::Ready(Some(Ok(event))),
            Poll::Ready(Some(Err(err))) => {
                self.inner = None;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.inner = None;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

struct DecodeState {
    body: ByteStream,
    framer: LineFramer,
    ready: VecDeque<ProgressEvent>,
    eof: bool,
}

fn decode_events(
    body: ByteStream,
    read_timeout: Duration,
) -> BoxStream<'static, ApiResult<ProgressEvent>> {
    let start = DecodeState {
        body,
        framer: LineFramer::default(),
        ready: VecDeque::new(),
        eof: false,
    };
    stream::unfold(Some(start), move |state| async move {
        let mut st = state?;
        loop {
            if let Some(event) = st.ready.pop_front() {
                return Some((Ok(event), Some(st)));
            }
            if st.eof {
                return None;
            }
            match tokio::time::timeout(read_timeout, st.body.next()).await {
                Err(_) => {
                    let err = ApiError::Transport("progress stream read timed out".to_string());
                    return Some((Err(err), None));
                }
                Ok(Some(Err(err))) => return Some((Err(err), None)),
                Ok(Some(Ok(chunk))) => {
                    for line in st.framer.push(&chunk) {
                        st.ready.extend(decode_line(&line));
                    }
                }
                Ok(None) => {
                    st.eof = true;
                    if let Some(line) = st.framer.finish() {
                        st.ready.extend(decode_line(&line));
                    }
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
#[path = "tests/stream_tests.rs"]
mod tests;
