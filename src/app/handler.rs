//! Event handling and state transition logic.
//!
//! Every user intent and every index completion arrives as an [`Event`].
//! [`handle_event`] routes it to the right coordinator, turns failures into
//! notices, and returns the remote calls to start.
//!
//! # Architecture
//!
//! ```text
//! Event → handle_event → coordinator → (render?, Vec<Action>)
//!                ↑                             ↓
//!                └──── IndexResponse ←── IndexWorker
//! ```
//!
//! # Example
//!
//! ```rust
//! use restaurant_admin::app::{handle_event, Action, AppState, Event};
//!
//! let mut state = AppState::default();
//! let (render, actions) = handle_event(&mut state, &Event::Mount)?;
//! assert!(render);
//! assert!(matches!(actions.as_slice(), [Action::Search(_)]));
//! # Ok::<(), restaurant_admin::AdminError>(())
//! ```

use crate::app::notice::{CREATED_MESSAGE, DELETED_MESSAGE};
use crate::app::query::QueryUpdate;
use crate::app::{Action, AppState};
use crate::domain::error::Result;
use crate::domain::{RecordId, Restaurant};
use crate::worker::IndexResponse;

/// Events triggered by the user or by the index worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The page was opened; issues the first search.
    Mount,
    /// Re-runs the current search.
    Refresh,

    /// The search box changed.
    SetSearchTerm(String),
    /// The food type filter box changed.
    SetFoodTypeFilter(String),
    /// Another page was picked.
    SetPage(usize),
    /// Another page size was picked.
    SetPageSize(usize),

    /// The create form was submitted.
    SubmitCreate(Restaurant),
    /// The delete button of a row was pressed.
    RequestDelete(RecordId),
    /// "Yes, Delete" was pressed.
    ConfirmDelete,
    /// "Cancel" was pressed or the dialog was closed.
    CancelDelete,

    /// A notice was closed.
    DismissNotice(u64),

    /// A remote call finished.
    IndexResponse(IndexResponse),
}

/// Processes an event, mutates application state, and returns actions to execute.
///
/// The returned flag tells whether the view model changed and should be
/// recomputed.
///
/// # Errors
///
/// Returns [`AdminError::InvalidPageSize`](crate::AdminError::InvalidPageSize)
/// for page sizes outside the configured options. Remote failures never
/// surface here; they become notices.
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::Mount => {
            if state.mounted {
                tracing::debug!("already mounted");
                return Ok((false, vec![]));
            }
            state.mounted = true;
            Ok((true, vec![state.query.refresh()]))
        }
        Event::Refresh => Ok((true, vec![state.query.refresh()])),
        Event::SetSearchTerm(text) => {
            let action = state.query.set_search_term(text.clone());
            Ok((action.is_some(), action.into_iter().collect()))
        }
        Event::SetFoodTypeFilter(text) => {
            if &state.query.state().food_type_filter == text {
                return Ok((false, vec![]));
            }
            state.query.set_food_type_filter(text.clone());
            Ok((true, vec![]))
        }
        Event::SetPage(page) => {
            let action = state.query.set_page(*page);
            Ok((action.is_some(), action.into_iter().collect()))
        }
        Event::SetPageSize(size) => {
            let action = state.query.set_page_size(*size)?;
            Ok((action.is_some(), action.into_iter().collect()))
        }
        Event::SubmitCreate(restaurant) => match state.mutations.create(restaurant.clone()) {
            Ok(action) => Ok((true, vec![action])),
            Err(failure) => {
                state.notices.failure(failure);
                Ok((true, vec![]))
            }
        },
        Event::RequestDelete(id) => {
            let accepted = state.mutations.request_delete(id.clone());
            Ok((accepted, vec![]))
        }
        Event::ConfirmDelete => match state.mutations.confirm_delete() {
            Ok(action) => Ok((true, vec![action])),
            Err(failure) => {
                state.notices.failure(failure);
                Ok((true, vec![]))
            }
        },
        Event::CancelDelete => Ok((state.mutations.cancel_delete(), vec![])),
        Event::DismissNotice(id) => Ok((state.notices.dismiss(*id), vec![])),
        Event::IndexResponse(response) => Ok(handle_response(state, response)),
    }
}

fn handle_response(state: &mut AppState, response: &IndexResponse) -> (bool, Vec<Action>) {
    match response {
        IndexResponse::SearchCompleted { ticket, outcome } => {
            match state.query.apply_response(ticket, outcome.clone()) {
                QueryUpdate::Applied => (true, vec![]),
                QueryUpdate::Stale => (false, vec![]),
                QueryUpdate::Failed(failure) => {
                    state.notices.failure(failure);
                    (true, vec![])
                }
            }
        }
        IndexResponse::SaveCompleted { ticket, outcome } => {
            match state
                .mutations
                .save_completed(*ticket, outcome.clone(), &mut state.query)
            {
                Some(Ok(refresh)) => {
                    state.notices.success(CREATED_MESSAGE);
                    (true, vec![refresh])
                }
                Some(Err(failure)) => {
                    state.notices.failure(failure);
                    (true, vec![])
                }
                None => (false, vec![]),
            }
        }
        IndexResponse::DeleteCompleted { id, outcome } => {
            match state
                .mutations
                .delete_completed(id, outcome.clone(), &mut state.query)
            {
                Some(Ok(())) => {
                    state.notices.success(DELETED_MESSAGE);
                    (true, vec![])
                }
                Some(Err(failure)) => {
                    state.notices.failure(failure);
                    (true, vec![])
                }
                None => (false, vec![]),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::notice::NoticeLevel;
    use crate::domain::{Field, SearchHits, SyncFailure, ValidationProfile};
    use crate::index::SaveReceipt;

    fn search(actions: &[Action]) -> crate::worker::QueryTicket {
        match actions {
            [Action::Search(ticket)] => ticket.clone(),
            other => panic!("expected one search, got {other:?}"),
        }
    }

    #[test]
    fn mount_issues_first_search_once() {
        let mut state = AppState::default();

        let (_, first) = handle_event(&mut state, &Event::Mount).unwrap();
        let (render, second) = handle_event(&mut state, &Event::Mount).unwrap();

        assert_eq!(search(&first).params.hits_per_page, 5);
        assert!(!render);
        assert!(second.is_empty());
    }

    #[test]
    fn invalid_page_size_is_an_error() {
        let mut state = AppState::default();
        assert!(handle_event(&mut state, &Event::SetPageSize(3)).is_err());
    }

    #[test]
    fn validation_failure_becomes_a_notice() {
        let mut state = AppState::default();

        let (render, actions) =
            handle_event(&mut state, &Event::SubmitCreate(Restaurant::new("", "Thai"))).unwrap();

        assert!(render);
        assert!(actions.is_empty());
        let notice = state.notices.iter().next().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(matches!(
            notice.failure,
            Some(SyncFailure::ValidationFailed { .. })
        ));
    }

    #[test]
    fn successful_save_raises_notice_and_refreshes() {
        let mut state = AppState::new(
            crate::app::QueryCoordinator::new(Default::default(), false),
            crate::app::MutationCoordinator::new(ValidationProfile::Minimal),
        );
        let (_, actions) = handle_event(
            &mut state,
            &Event::SubmitCreate(Restaurant::new("Nopa", "Californian").with(Field::City, "SF")),
        )
        .unwrap();
        let [Action::Save { ticket, .. }] = actions.as_slice() else {
            panic!("expected save")
        };

        let (_, follow_up) = handle_event(
            &mut state,
            &Event::IndexResponse(IndexResponse::SaveCompleted {
                ticket: *ticket,
                outcome: Ok(SaveReceipt::default()),
            }),
        )
        .unwrap();

        search(&follow_up);
        assert_eq!(state.notices.iter().next().unwrap().message, CREATED_MESSAGE);
    }

    #[test]
    fn stale_search_does_not_render() {
        let mut state = AppState::default();
        let (_, first) = handle_event(&mut state, &Event::SetSearchTerm("a".into())).unwrap();
        handle_event(&mut state, &Event::SetSearchTerm("ab".into())).unwrap();

        let (render, _) = handle_event(
            &mut state,
            &Event::IndexResponse(IndexResponse::SearchCompleted {
                ticket: search(&first),
                outcome: Ok(SearchHits::default()),
            }),
        )
        .unwrap();

        assert!(!render);
    }

    #[test]
    fn confirm_without_request_raises_notice() {
        let mut state = AppState::default();

        let (_, actions) = handle_event(&mut state, &Event::ConfirmDelete).unwrap();

        assert!(actions.is_empty());
        assert_eq!(
            state.notices.latest_failure(),
            Some(&SyncFailure::NoPendingMutation)
        );
    }

    #[test]
    fn dismiss_only_renders_when_something_closed() {
        let mut state = AppState::default();
        let id = state.notices.success(DELETED_MESSAGE);

        assert!(handle_event(&mut state, &Event::DismissNotice(id)).unwrap().0);
        assert!(!handle_event(&mut state, &Event::DismissNotice(id)).unwrap().0);
    }
}
