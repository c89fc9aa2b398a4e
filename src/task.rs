//! Schedulable fetch results and the ordered join combinator.
//!
//! A [`FetchHandle`] is the lazily-started unit of work returned by
//! [`fetch`](crate::fetch): nothing runs until the caller drives it, by
//! awaiting it, by blocking on [`FetchHandle::wait`], or by registering
//! completion callbacks.

use crate::error::RequestError;
use crate::response::Response;
use futures_lite::future::block_on;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Result of a driven fetch: one response for a single target, an
/// order-preserving collection for concurrent fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutput {
    /// Response of a single-target fetch.
    Single(Response),
    /// Responses of a multi-target fetch, in input order.
    Batch(Vec<Response>),
}

impl FetchOutput {
    /// The single response, when this was a single-target fetch.
    #[must_use]
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Single(response) => Some(response),
            Self::Batch(_) => None,
        }
    }

    /// All responses; a single-target result yields one element.
    #[must_use]
    pub fn into_responses(self) -> Vec<Response> {
        match self {
            Self::Single(response) => vec![response],
            Self::Batch(responses) => responses,
        }
    }
}

/// A lazily-started fetch. No I/O begins until the handle is driven.
///
/// Supports three consumption styles: `.await` (the handle is a
/// [`Future`]), blocking [`wait`](Self::wait), and callback registration
/// via [`on_complete`](Self::on_complete).
pub struct FetchHandle {
    future: BoxFuture<Result<FetchOutput, RequestError>>,
}

impl FetchHandle {
    pub(crate) fn new(
        future: impl Future<Output = Result<FetchOutput, RequestError>> + Send + 'static,
    ) -> Self {
        Self {
            future: Box::pin(future),
        }
    }

    /// Drives the fetch on the current thread and returns its result.
    pub fn wait(self) -> Result<FetchOutput, RequestError> {
        block_on(self.future)
    }

    /// Drives the fetch and dispatches to exactly one of the callbacks.
    pub fn on_complete(
        self,
        on_ok: impl FnOnce(FetchOutput),
        on_err: impl FnOnce(RequestError),
    ) {
        match self.wait() {
            Ok(output) => on_ok(output),
            Err(error) => on_err(error),
        }
    }
}

impl Future for FetchHandle {
    type Output = Result<FetchOutput, RequestError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchHandle").finish_non_exhaustive()
    }
}

enum Slot {
    Pending(BoxFuture<Result<Response, RequestError>>),
    Done(Option<Response>),
    Failed,
}

/// Joins request futures concurrently, collecting results in input order.
///
/// There is no cancellation: after a member fails, the remaining members
/// are still driven to completion, and the aggregate then reports the
/// first failure encountered (in completion order).
pub(crate) struct JoinOrdered {
    slots: Vec<Slot>,
    first_error: Option<RequestError>,
    remaining: usize,
}

pub(crate) fn join_ordered(
    futures: Vec<BoxFuture<Result<Response, RequestError>>>,
) -> JoinOrdered {
    let remaining = futures.len();
    JoinOrdered {
        slots: futures.into_iter().map(Slot::Pending).collect(),
        first_error: None,
        remaining,
    }
}

impl Future for JoinOrdered {
    type Output = Result<Vec<Response>, RequestError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        for slot in &mut this.slots {
            if let Slot::Pending(future) = slot {
                match future.as_mut().poll(cx) {
                    Poll::Pending => {}
                    Poll::Ready(Ok(response)) => {
                        *slot = Slot::Done(Some(response));
                        this.remaining -= 1;
                    }
                    Poll::Ready(Err(error)) => {
                        if this.first_error.is_none() {
                            this.first_error = Some(error);
                        }
                        *slot = Slot::Failed;
                        this.remaining -= 1;
                    }
                }
            }
        }

        if this.remaining > 0 {
            return Poll::Pending;
        }
        if let Some(error) = this.first_error.take() {
            return Poll::Ready(Err(error));
        }
        let responses = this
            .slots
            .iter_mut()
            .map(|slot| match slot {
                Slot::Done(response) => response.take().expect("join polled after completion"),
                _ => unreachable!("no failures recorded"),
            })
            .collect();
        Poll::Ready(Ok(responses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Headers;
    use crate::net::yield_now;

    fn response(status: u16) -> Response {
        Response::new("", status, Headers::new(), "OK")
    }

    fn after_yields(
        yields: usize,
        result: Result<Response, RequestError>,
    ) -> BoxFuture<Result<Response, RequestError>> {
        Box::pin(async move {
            for _ in 0..yields {
                yield_now().await;
            }
            result
        })
    }

    #[test]
    fn results_preserve_input_order() {
        // The middle member completes last; order must still hold.
        let joined = join_ordered(vec![
            after_yields(1, Ok(response(201))),
            after_yields(10, Ok(response(202))),
            after_yields(2, Ok(response(203))),
        ]);
        let responses = block_on(joined).unwrap();
        let codes: Vec<_> = responses.iter().map(Response::status_code).collect();
        assert_eq!(codes, [201, 202, 203]);
    }

    #[test]
    fn first_failure_wins_after_all_complete() {
        let joined = join_ordered(vec![
            after_yields(5, Err(RequestError::new("late failure"))),
            after_yields(1, Err(RequestError::new("early failure"))),
            after_yields(3, Ok(response(200))),
        ]);
        let error = block_on(joined).unwrap_err();
        assert_eq!(error.message(), "early failure");
    }

    #[test]
    fn empty_join_completes_immediately() {
        let responses = block_on(join_ordered(Vec::new())).unwrap();
        assert!(responses.is_empty());
    }

    #[test]
    fn handle_is_lazy_until_driven() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let started = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&started);
        let handle = FetchHandle::new(async move {
            flag.store(true, Ordering::SeqCst);
            Ok(FetchOutput::Single(response(200)))
        });

        assert!(!started.load(Ordering::SeqCst));
        let output = handle.wait().unwrap();
        assert!(started.load(Ordering::SeqCst));
        assert_eq!(output.into_response().map(|r| r.status_code()), Some(200));
    }

    #[test]
    fn callbacks_dispatch_exactly_once() {
        let ok_handle = FetchHandle::new(async { Ok(FetchOutput::Single(response(200))) });
        let mut seen_ok = false;
        ok_handle.on_complete(
            |_| seen_ok = true,
            |_| panic!("error callback must not run"),
        );
        assert!(seen_ok);

        let err_handle =
            FetchHandle::new(async { Err(RequestError::new("boom")) });
        let mut seen_err = false;
        err_handle.on_complete(
            |_| panic!("success callback must not run"),
            |error| {
                seen_err = true;
                assert_eq!(error.message(), "boom");
            },
        );
        assert!(seen_err);
    }

    #[test]
    fn output_accessors() {
        let single = FetchOutput::Single(response(200));
        assert_eq!(single.clone().into_responses().len(), 1);
        assert!(single.into_response().is_some());

        let batch = FetchOutput::Batch(vec![response(200), response(201)]);
        assert!(batch.clone().into_response().is_none());
        assert_eq!(batch.into_responses().len(), 2);
    }
}
