//! Execution of coordinator actions against a search index.
//!
//! [`IndexWorker`] turns each posted [`Action`] into a future over the
//! injected [`SearchIndex`] and keeps every one of them in flight at once.
//! Completions are handed back in the order the index finishes them, which
//! is exactly the situation the query coordinator's staleness guard exists
//! for.

use crate::app::Action;
use crate::index::SearchIndex;
use crate::worker::messages::{IndexResponse, Outcome};
use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use tracing::Instrument;

/// Runs remote calls and yields their completions.
pub struct IndexWorker {
    index: Arc<dyn SearchIndex>,
    in_flight: FuturesUnordered<BoxFuture<'static, IndexResponse>>,
}

impl IndexWorker {
    #[must_use]
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self {
            index,
            in_flight: FuturesUnordered::new(),
        }
    }

    /// Starts executing an action.
    ///
    /// The call returns immediately; the completion is delivered by a later
    /// [`next_response`](Self::next_response).
    pub fn post(&mut self, action: Action) {
        let span = tracing::debug_span!("index_call", kind = action.kind());
        let index = &self.index;

        let future = span.in_scope(|| -> BoxFuture<'static, IndexResponse> {
            match action {
                Action::Search(ticket) => {
                    tracing::debug!(seq = ticket.seq, term = %ticket.params.term, "search posted");
                    let call = index.search(ticket.params.clone());
                    Box::pin(async move {
                        let outcome = render("search", call.await);
                        IndexResponse::SearchCompleted { ticket, outcome }
                    })
                }
                Action::Save {
                    ticket,
                    objects,
                    options,
                } => {
                    tracing::debug!(ticket, count = objects.len(), "save posted");
                    let call = index.save_objects(objects, options);
                    Box::pin(async move {
                        let outcome = render("save", call.await);
                        IndexResponse::SaveCompleted { ticket, outcome }
                    })
                }
                Action::Delete { id } => {
                    tracing::debug!(%id, "delete posted");
                    let call = index.delete_object(id.clone());
                    Box::pin(async move {
                        let outcome = render("delete", call.await);
                        IndexResponse::DeleteCompleted { id, outcome }
                    })
                }
            }
        });

        self.in_flight.push(Box::pin(future.instrument(span)));
    }

    /// Starts every action in order.
    pub fn post_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.post(action);
        }
    }

    /// Waits for the next call to finish.
    ///
    /// Returns `None` once nothing is in flight.
    pub async fn next_response(&mut self) -> Option<IndexResponse> {
        let response = self.in_flight.next().await?;
        tracing::debug!(
            kind = response.kind(),
            success = response.is_success(),
            remaining = self.in_flight.len(),
            "index call completed"
        );
        Some(response)
    }

    /// Number of calls still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }
}

fn render<T, E: Display>(operation: &str, result: std::result::Result<T, E>) -> Outcome<T> {
    result.map_err(|e| {
        tracing::debug!(operation, error = %e, "index call failed");
        e.to_string()
    })
}
