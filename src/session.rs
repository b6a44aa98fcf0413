//! The single logical thread tying state and index together.
//!
//! A [`Session`] owns the [`AppState`] and an [`IndexWorker`]. User events
//! are dispatched synchronously; completions are pulled in one at a time
//! with [`Session::pump`], in whatever order the index finishes them.
//! Coordinator logic therefore never runs concurrently with itself, and the
//! staleness tags are the only ordering discipline needed.

use crate::app::{handle_event, AppState, Event};
use crate::domain::error::Result;
use crate::index::SearchIndex;
use crate::ui::TableView;
use crate::worker::IndexWorker;
use std::sync::Arc;

/// An admin page bound to a search index.
pub struct Session {
    state: AppState,
    worker: IndexWorker,
}

impl Session {
    #[must_use]
    pub fn new(state: AppState, index: Arc<dyn SearchIndex>) -> Self {
        Self {
            state,
            worker: IndexWorker::new(index),
        }
    }

    /// Handles an event and starts any remote calls it asks for.
    ///
    /// Returns whether the view changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle_event`]; the state is unchanged in
    /// that case.
    pub fn dispatch(&mut self, event: &Event) -> Result<bool> {
        let (render, actions) = handle_event(&mut self.state, event)?;
        if !actions.is_empty() {
            tracing::debug!(count = actions.len(), "posting actions");
        }
        self.worker.post_all(actions);
        Ok(render)
    }

    /// Waits for the next remote call to finish and applies it.
    ///
    /// Returns `None` when nothing is in flight, otherwise whether the view
    /// changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle_event`].
    pub async fn pump(&mut self) -> Result<Option<bool>> {
        let Some(response) = self.worker.next_response().await else {
            return Ok(None);
        };
        self.dispatch(&Event::IndexResponse(response)).map(Some)
    }

    /// Pumps until no remote call is left, including follow-up calls.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle_event`].
    pub async fn settle(&mut self) -> Result<()> {
        while self.pump().await?.is_some() {}
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Computes the current view model.
    #[must_use]
    pub fn view(&self) -> TableView {
        self.state.compute_viewmodel()
    }

    /// Number of remote calls still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.worker.in_flight()
    }
}
