//! The mutation coordinator.
//!
//! Creates and deletes restaurants through the index and keeps the query
//! side in step: a successful create triggers exactly one refresh of the
//! current query, a successful delete removes the row from the cached page
//! without re-querying. Failures leave local state as it was before the
//! mutation.

use crate::app::modes::DeleteFlow;
use crate::app::query::QueryCoordinator;
use crate::app::Action;
use crate::domain::{MutationKind, RecordId, Restaurant, SyncFailure, ValidationProfile};
use crate::index::{SaveObject, SaveOptions, SaveReceipt};
use crate::worker::Outcome;

/// Attribute a client-chosen id would travel in.
const ID_ATTRIBUTE: &str = "objectID";

/// Coordinates creates, the deletion flow and their completions.
#[derive(Debug, Clone)]
pub struct MutationCoordinator {
    profile: ValidationProfile,
    flow: DeleteFlow,
    next_ticket: u64,
    pending_saves: Vec<u64>,
}

impl MutationCoordinator {
    #[must_use]
    pub fn new(profile: ValidationProfile) -> Self {
        Self {
            profile,
            flow: DeleteFlow::Idle,
            next_ticket: 1,
            pending_saves: Vec::new(),
        }
    }

    #[must_use]
    pub const fn profile(&self) -> ValidationProfile {
        self.profile
    }

    #[must_use]
    pub const fn delete_flow(&self) -> &DeleteFlow {
        &self.flow
    }

    /// Creates still waiting for the index.
    #[must_use]
    pub fn pending_saves(&self) -> usize {
        self.pending_saves.len()
    }

    /// Validates a new restaurant and returns the save to issue.
    ///
    /// The index assigns the id; any id-like attribute on the draft is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`SyncFailure::ValidationFailed`] listing every missing
    /// required field. Nothing is sent in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use restaurant_admin::app::MutationCoordinator;
    /// use restaurant_admin::domain::{Field, Restaurant, SyncFailure, ValidationProfile};
    ///
    /// let mut mutations = MutationCoordinator::new(ValidationProfile::Minimal);
    /// let err = mutations.create(Restaurant::new("", "Thai")).unwrap_err();
    /// assert_eq!(err, SyncFailure::ValidationFailed { missing: vec![Field::Name] });
    /// ```
    pub fn create(&mut self, restaurant: Restaurant) -> Result<Action, SyncFailure> {
        let _span = tracing::debug_span!("create", profile = ?self.profile).entered();

        if let Err(failure) = restaurant.validate(self.profile) {
            tracing::debug!(%failure, "create rejected before sending");
            return Err(failure);
        }

        let mut restaurant = restaurant.normalized();
        if restaurant.extra.remove(ID_ATTRIBUTE).is_some() {
            tracing::debug!("discarded client-supplied id");
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending_saves.push(ticket);

        tracing::debug!(ticket, "create issued");
        Ok(Action::Save {
            ticket,
            objects: vec![SaveObject::from(restaurant)],
            options: SaveOptions::auto_id(),
        })
    }

    /// Settles a create.
    ///
    /// On success returns the refresh that makes the new record visible
    /// under the current query. Returns `None` for tickets this coordinator
    /// did not issue.
    pub fn save_completed(
        &mut self,
        ticket: u64,
        outcome: Outcome<SaveReceipt>,
        query: &mut QueryCoordinator,
    ) -> Option<Result<Action, SyncFailure>> {
        let Some(at) = self.pending_saves.iter().position(|t| *t == ticket) else {
            tracing::warn!(ticket, "completion for unknown save ignored");
            return None;
        };
        self.pending_saves.remove(at);

        match outcome {
            Ok(receipt) => {
                tracing::debug!(ticket, object_ids = ?receipt.object_ids, "create succeeded");
                Some(Ok(query.refresh()))
            }
            Err(cause) => Some(Err(SyncFailure::MutationFailed {
                operation: MutationKind::Create,
                cause,
            })),
        }
    }

    /// Proposes a record for deletion, replacing any unconfirmed proposal.
    ///
    /// Ignored while a deletion is running; returns whether it was accepted.
    pub fn request_delete(&mut self, id: RecordId) -> bool {
        if let DeleteFlow::Deleting { target } = &self.flow {
            tracing::debug!(%id, running = %target, "delete request ignored while deleting");
            return false;
        }

        tracing::debug!(%id, replaced = ?self.flow.target(), "delete requested");
        self.flow = DeleteFlow::AwaitingConfirmation { target: id };
        true
    }

    /// Confirms the pending deletion and returns the call to issue.
    ///
    /// # Errors
    ///
    /// Returns [`SyncFailure::NoPendingMutation`] if nothing awaits
    /// confirmation, including while a deletion is already running.
    pub fn confirm_delete(&mut self) -> Result<Action, SyncFailure> {
        let DeleteFlow::AwaitingConfirmation { target } = &self.flow else {
            tracing::debug!(state = self.flow.name(), "nothing to confirm");
            return Err(SyncFailure::NoPendingMutation);
        };

        let id = target.clone();
        tracing::debug!(%id, "delete confirmed");
        self.flow = DeleteFlow::Deleting { target: id.clone() };
        Ok(Action::Delete { id })
    }

    /// Drops an unconfirmed deletion.
    ///
    /// A running deletion cannot be cancelled; returns whether anything
    /// was dropped.
    pub fn cancel_delete(&mut self) -> bool {
        if matches!(self.flow, DeleteFlow::AwaitingConfirmation { .. }) {
            tracing::debug!("delete cancelled");
            self.flow = DeleteFlow::Idle;
            true
        } else {
            false
        }
    }

    /// Settles the running deletion.
    ///
    /// On success the record leaves the cached page. Either way the flow
    /// returns to idle; there is no retry. Returns `None` if `id` is not the
    /// record being deleted.
    pub fn delete_completed(
        &mut self,
        id: &RecordId,
        outcome: Outcome<()>,
        query: &mut QueryCoordinator,
    ) -> Option<Result<(), SyncFailure>> {
        if self.flow != (DeleteFlow::Deleting { target: id.clone() }) {
            tracing::warn!(%id, state = self.flow.name(), "completion for unknown delete ignored");
            return None;
        }
        self.flow = DeleteFlow::Idle;

        match outcome {
            Ok(()) => {
                query.remove_local(id);
                Some(Ok(()))
            }
            Err(cause) => Some(Err(SyncFailure::MutationFailed {
                operation: MutationKind::Delete,
                cause,
            })),
        }
    }
}

impl Default for MutationCoordinator {
    fn default() -> Self {
        Self::new(ValidationProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, PageSizeOptions, RestaurantRecord, SearchHits};
    use crate::worker::QueryTicket;

    fn loaded_query(ids: &[&str]) -> QueryCoordinator {
        let mut query = QueryCoordinator::new(PageSizeOptions::default(), false);
        let Action::Search(ticket) = query.refresh() else {
            panic!("expected search")
        };
        let hits = SearchHits {
            hits: ids
                .iter()
                .map(|id| RestaurantRecord::new(*id, Restaurant::new("R", "Thai")))
                .collect(),
            nb_hits: ids.len(),
        };
        query.apply_response(&ticket, Ok(hits));
        query
    }

    fn full_restaurant() -> Restaurant {
        Restaurant::new("Nopa", "Californian")
            .with(Field::City, "San Francisco")
            .with(Field::Address, "560 Divisadero St")
            .with(Field::PhoneNumber, "415-864-8643")
    }

    #[test]
    fn create_with_blank_name_is_rejected_without_a_call() {
        let mut mutations = MutationCoordinator::new(ValidationProfile::Minimal);

        let result = mutations.create(Restaurant::new("", "x"));

        match result {
            Err(SyncFailure::ValidationFailed { missing }) => assert!(missing.contains(&Field::Name)),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(mutations.pending_saves(), 0);
    }

    #[test]
    fn create_requests_auto_assigned_id() {
        let mut mutations = MutationCoordinator::default();
        let draft = full_restaurant().with_extra(ID_ATTRIBUTE, serde_json::json!("2024-01-01T00:00:00Z"));

        let Ok(Action::Save { objects, options, .. }) = mutations.create(draft) else {
            panic!("expected save")
        };

        assert!(options.auto_generate_object_id_if_not_exist);
        assert_eq!(objects.len(), 1);
        assert!(objects[0].id.is_none());
        assert!(!objects[0].restaurant.extra.contains_key(ID_ATTRIBUTE));
    }

    #[test]
    fn successful_create_refreshes_current_query_once() {
        let mut mutations = MutationCoordinator::default();
        let mut query = loaded_query(&["1"]);
        query.set_food_type_filter("cal");
        let Ok(Action::Save { ticket, .. }) = mutations.create(full_restaurant()) else {
            panic!("expected save")
        };

        let refresh = mutations.save_completed(ticket, Ok(SaveReceipt::default()), &mut query);

        let Some(Ok(Action::Search(QueryTicket { params, .. }))) = refresh else {
            panic!("expected refresh")
        };
        assert_eq!(params, query.state().search_params());
        assert!(mutations
            .save_completed(ticket, Ok(SaveReceipt::default()), &mut query)
            .is_none());
    }

    #[test]
    fn failed_create_reports_and_issues_nothing() {
        let mut mutations = MutationCoordinator::default();
        let mut query = loaded_query(&["1"]);
        let Ok(Action::Save { ticket, .. }) = mutations.create(full_restaurant()) else {
            panic!("expected save")
        };

        let result = mutations.save_completed(ticket, Err("quota".to_string()), &mut query);

        assert_eq!(
            result,
            Some(Err(SyncFailure::MutationFailed {
                operation: MutationKind::Create,
                cause: "quota".to_string(),
            }))
        );
        assert!(!query.is_loading());
    }

    #[test]
    fn second_request_replaces_first() {
        let mut mutations = MutationCoordinator::default();

        mutations.request_delete(RecordId::from("r1"));
        mutations.request_delete(RecordId::from("r2"));

        assert_eq!(
            mutations.confirm_delete(),
            Ok(Action::Delete {
                id: RecordId::from("r2")
            })
        );
    }

    #[test]
    fn confirm_without_request_reports_no_pending_mutation() {
        let mut mutations = MutationCoordinator::default();
        assert_eq!(mutations.confirm_delete(), Err(SyncFailure::NoPendingMutation));
    }

    #[test]
    fn running_deletion_blocks_confirm_and_request() {
        let mut mutations = MutationCoordinator::default();
        mutations.request_delete(RecordId::from("r1"));
        mutations.confirm_delete().unwrap();

        assert_eq!(mutations.confirm_delete(), Err(SyncFailure::NoPendingMutation));
        assert!(!mutations.request_delete(RecordId::from("r2")));
        assert!(!mutations.cancel_delete());
        assert!(mutations.delete_flow().is_deleting());
    }

    #[test]
    fn successful_delete_removes_row_and_returns_to_idle() {
        let mut mutations = MutationCoordinator::default();
        let mut query = loaded_query(&["r1", "r2"]);
        mutations.request_delete(RecordId::from("r1"));
        mutations.confirm_delete().unwrap();

        let result = mutations.delete_completed(&RecordId::from("r1"), Ok(()), &mut query);

        assert_eq!(result, Some(Ok(())));
        assert!(mutations.delete_flow().is_idle());
        let remaining: Vec<_> = query.displayed().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(remaining, vec!["r2"]);
        assert_eq!(query.total_count(), 2);
    }

    #[test]
    fn failed_delete_keeps_row_and_returns_to_idle() {
        let mut mutations = MutationCoordinator::default();
        let mut query = loaded_query(&["r1"]);
        mutations.request_delete(RecordId::from("r1"));
        mutations.confirm_delete().unwrap();

        let result = mutations.delete_completed(&RecordId::from("r1"), Err("500".to_string()), &mut query);

        assert!(matches!(
            result,
            Some(Err(SyncFailure::MutationFailed {
                operation: MutationKind::Delete,
                ..
            }))
        ));
        assert!(mutations.delete_flow().is_idle());
        assert_eq!(query.displayed().len(), 1);
    }

    #[test]
    fn cancel_returns_to_idle_without_a_call() {
        let mut mutations = MutationCoordinator::default();
        mutations.request_delete(RecordId::from("r1"));

        assert!(mutations.cancel_delete());
        assert!(mutations.delete_flow().is_idle());
        assert_eq!(mutations.confirm_delete(), Err(SyncFailure::NoPendingMutation));
    }
}
