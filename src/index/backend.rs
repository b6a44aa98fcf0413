//! Search index abstraction.
//!
//! This module defines the [`SearchIndex`] trait the coordinators are driven
//! against. It is the only seam between the admin and the hosted search
//! service, so tests and offline use substitute it without touching the
//! network.
//!
//! The trait is minimal: the three calls the admin needs, each returning a
//! boxed `'static` future so many requests can be in flight at once and
//! complete in any order.

use crate::domain::error::Result;
use crate::domain::{RecordId, Restaurant, RestaurantRecord, SearchHits, SearchParams};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// A record submitted to [`SearchIndex::save_objects`].
///
/// Without an id the record is new; with one it replaces the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveObject {
    #[serde(rename = "objectID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(flatten)]
    pub restaurant: Restaurant,
}

impl From<Restaurant> for SaveObject {
    fn from(restaurant: Restaurant) -> Self {
        Self {
            id: None,
            restaurant,
        }
    }
}

impl From<RestaurantRecord> for SaveObject {
    fn from(record: RestaurantRecord) -> Self {
        Self {
            id: Some(record.id),
            restaurant: record.restaurant,
        }
    }
}

/// Options for [`SearchIndex::save_objects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveOptions {
    /// Let the index assign ids to objects that have none.
    ///
    /// When unset, an object without an id is rejected.
    pub auto_generate_object_id_if_not_exist: bool,
}

impl SaveOptions {
    #[must_use]
    pub const fn auto_id() -> Self {
        Self {
            auto_generate_object_id_if_not_exist: true,
        }
    }
}

/// Acknowledgement of a save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    /// Ids of the saved objects, in submission order.
    #[serde(rename = "objectIDs", default)]
    pub object_ids: Vec<RecordId>,

    /// Indexing task handle, for indexes that apply writes asynchronously.
    #[serde(rename = "taskID", default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<u64>,
}

/// Client of the remote restaurant index.
///
/// Implementations must be cheap to call concurrently: each method is
/// expected to clone whatever handles it needs into the returned future.
///
/// # Implementations
///
/// - [`JsonIndex`](crate::index::JsonIndex): in-process index, optionally
///   persisted to a JSON file
/// - [`AlgoliaIndex`](crate::index::AlgoliaIndex): hosted index over REST
pub trait SearchIndex: Send + Sync {
    /// Returns one page of records matching `params.term`, plus the total
    /// number of matches for that term.
    ///
    /// # Errors
    ///
    /// Resolves to an error if the index cannot answer.
    fn search(&self, params: SearchParams) -> BoxFuture<'static, Result<SearchHits>>;

    /// Upserts records.
    ///
    /// Ids assigned by the index are reported in the receipt but are not
    /// otherwise known to the caller until a later search returns them.
    ///
    /// # Errors
    ///
    /// Resolves to an error if any object is rejected; implementations either
    /// apply the whole batch or none of it.
    fn save_objects(
        &self,
        objects: Vec<SaveObject>,
        options: SaveOptions,
    ) -> BoxFuture<'static, Result<SaveReceipt>>;

    /// Removes a single record.
    ///
    /// # Errors
    ///
    /// Resolves to an error if the index cannot apply the deletion.
    fn delete_object(&self, id: RecordId) -> BoxFuture<'static, Result<()>>;
}
