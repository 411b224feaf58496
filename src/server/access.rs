// Access log body module
// Counts the body bytes actually handed to the connection and reports them
// once the body ends or is dropped

use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::http::ServeBody;

type OnComplete = Box<dyn FnOnce(u64) + Send>;

/// Response body wrapper reporting the number of data bytes sent.
///
/// The callback runs exactly once: at end of stream, on a body error, or when
/// hyper drops the body early because the client disconnected.
pub struct CountingBody {
    inner: ServeBody,
    sent: u64,
    on_complete: Option<OnComplete>,
}

impl CountingBody {
    pub fn new(inner: ServeBody, on_complete: impl FnOnce(u64) + Send + 'static) -> Self {
        Self {
            inner,
            sent: 0,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    fn finish(&mut self) {
        if let Some(callback) = self.on_complete.take() {
            callback(self.sent);
        }
    }
}

impl Body for CountingBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.sent += u64::try_from(data.len()).unwrap_or(u64::MAX);
                }
            }
            Poll::Ready(Some(Err(_)) | None) => this.finish(),
            Poll::Pending => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CountingBody {
    fn drop(&mut self) {
        self.finish();
    }
}
