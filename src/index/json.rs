//! In-process search index with optional JSON file persistence.
//!
//! [`JsonIndex`] answers the same three calls as the hosted index, entirely
//! in memory, ranking hits with [`ranking`](crate::index::ranking). When
//! opened on a file it persists every write with an atomic write (temp file +
//! rename), so a crash never leaves a half-written snapshot.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "next_id": 3,
//!   "records": [
//!     { "objectID": "1", "name": "Nopa", "food_type": "Californian" },
//!     { "objectID": "2", "name": "Delfina", "food_type": "Italian" }
//!   ]
//! }
//! ```

use crate::domain::error::{AdminError, Result};
use crate::domain::{RecordId, RestaurantRecord, SearchHits, SearchParams};
use crate::index::backend::{SaveObject, SaveOptions, SaveReceipt, SearchIndex};
use crate::index::ranking;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const FORMAT_VERSION: u32 = 1;

/// Snapshot container written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexData {
    version: u32,

    /// Counter behind auto-assigned ids.
    #[serde(default = "first_id")]
    next_id: u64,

    /// Records in indexing order.
    #[serde(default)]
    records: Vec<RestaurantRecord>,
}

const fn first_id() -> u64 {
    1
}

impl Default for IndexData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            next_id: first_id(),
            records: Vec::new(),
        }
    }
}

impl IndexData {
    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|record| &record.id == id)
    }

    fn allocate_id(&mut self) -> RecordId {
        loop {
            let candidate = RecordId::new(self.next_id.to_string());
            self.next_id = self.next_id.saturating_add(1);
            if self.position(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

struct Inner {
    file_path: Option<PathBuf>,
    data: IndexData,
}

/// Search index kept in process memory.
///
/// Cloning is cheap and clones share the same records.
#[derive(Clone)]
pub struct JsonIndex {
    inner: Arc<Mutex<Inner>>,
}

impl JsonIndex {
    /// Creates an empty index that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_parts(None, IndexData::default())
    }

    /// Creates an in-memory index pre-populated with records.
    ///
    /// Duplicate ids keep the last record given.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = RestaurantRecord>) -> Self {
        let mut data = IndexData::default();
        for record in records {
            match data.position(&record.id) {
                Some(at) => data.records[at] = record,
                None => data.records.push(record),
            }
        }
        Self::from_parts(None, data)
    }

    /// Opens or creates an index persisted at `file_path`.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the file cannot
    /// be read, or it does not contain a snapshot.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restaurant_admin::index::JsonIndex;
    /// use std::path::PathBuf;
    ///
    /// let index = JsonIndex::open(PathBuf::from("/tmp/restaurants.json"))?;
    /// # Ok::<(), restaurant_admin::AdminError>(())
    /// ```
    pub fn open(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "opening JSON index");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty index");
            IndexData::default()
        };

        tracing::debug!(record_count = data.records.len(), "JSON index ready");
        Ok(Self::from_parts(Some(file_path), data))
    }

    fn from_parts(file_path: Option<PathBuf>, data: IndexData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { file_path, data })),
        }
    }

    fn load_from_file(path: &Path) -> Result<IndexData> {
        let contents = std::fs::read_to_string(path)?;
        let data: IndexData = serde_json::from_str(&contents)
            .map_err(|e| AdminError::Storage(format!("failed to parse index snapshot: {e}")))?;

        if data.version != FORMAT_VERSION {
            return Err(AdminError::Storage(format!(
                "unsupported index snapshot version {}",
                data.version
            )));
        }
        Ok(data)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| AdminError::Storage("index lock poisoned".to_string()))
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the index lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.data.records.len())
    }

    /// Whether the index holds no records.
    ///
    /// # Errors
    ///
    /// Returns an error if the index lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Copy of every stored record in indexing order.
    ///
    /// # Errors
    ///
    /// Returns an error if the index lock is poisoned.
    pub fn records(&self) -> Result<Vec<RestaurantRecord>> {
        Ok(self.lock()?.data.records.clone())
    }

    fn run_search(&self, params: &SearchParams) -> Result<SearchHits> {
        let _span = tracing::debug_span!("json_search",
            term = %params.term,
            page = params.page,
            hits_per_page = params.hits_per_page
        )
        .entered();

        let inner = self.lock()?;
        let matches = ranking::rank(&params.term, &inner.data.records);
        let nb_hits = matches.len();

        let hits: Vec<RestaurantRecord> = matches
            .into_iter()
            .skip(params.page.saturating_mul(params.hits_per_page))
            .take(params.hits_per_page)
            .cloned()
            .collect();

        tracing::debug!(nb_hits, returned = hits.len(), "search answered");
        Ok(SearchHits { hits, nb_hits })
    }

    fn run_save(&self, objects: Vec<SaveObject>, options: SaveOptions) -> Result<SaveReceipt> {
        let _span = tracing::debug_span!("json_save_objects", count = objects.len()).entered();

        if !options.auto_generate_object_id_if_not_exist && objects.iter().any(|o| o.id.is_none()) {
            return Err(AdminError::Index(
                "objectID is required when auto-generation is disabled".to_string(),
            ));
        }

        let mut inner = self.lock()?;
        let mut staged = inner.data.clone();
        let mut object_ids = Vec::with_capacity(objects.len());

        for object in objects {
            let id = object.id.unwrap_or_else(|| staged.allocate_id());
            let record = RestaurantRecord::new(id.clone(), object.restaurant);
            match staged.position(&id) {
                Some(at) => staged.records[at] = record,
                None => staged.records.push(record),
            }
            object_ids.push(id);
        }

        inner.commit(staged)?;

        tracing::debug!(saved = object_ids.len(), "objects saved");
        Ok(SaveReceipt {
            object_ids,
            task_id: None,
        })
    }

    fn run_delete(&self, id: &RecordId) -> Result<()> {
        let _span = tracing::debug_span!("json_delete_object", id = %id).entered();

        let mut inner = self.lock()?;
        let mut staged = inner.data.clone();
        let Some(at) = staged.position(id) else {
            // Deleting an unknown id succeeds, like the hosted index.
            tracing::debug!("record already absent");
            return Ok(());
        };
        staged.records.remove(at);

        inner.commit(staged)
    }
}

impl Inner {
    /// Persists `staged` if file-backed, then makes it current.
    fn commit(&mut self, staged: IndexData) -> Result<()> {
        if let Some(path) = &self.file_path {
            let json = serde_json::to_string_pretty(&staged)?;
            let tmp_path = path.with_extension("tmp");

            tracing::trace!(tmp_path = ?tmp_path, "writing index snapshot");
            std::fs::write(&tmp_path, json)?;
            std::fs::rename(&tmp_path, path)?;
        }
        self.data = staged;
        Ok(())
    }
}

impl SearchIndex for JsonIndex {
    fn search(&self, params: SearchParams) -> BoxFuture<'static, Result<SearchHits>> {
        Box::pin(std::future::ready(self.run_search(&params)))
    }

    fn save_objects(
        &self,
        objects: Vec<SaveObject>,
        options: SaveOptions,
    ) -> BoxFuture<'static, Result<SaveReceipt>> {
        Box::pin(std::future::ready(self.run_save(objects, options)))
    }

    fn delete_object(&self, id: RecordId) -> BoxFuture<'static, Result<()>> {
        Box::pin(std::future::ready(self.run_delete(&id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Field, Restaurant};
    use futures::executor::block_on;

    fn params(term: &str, page: usize, hits_per_page: usize) -> SearchParams {
        SearchParams {
            term: term.to_string(),
            page,
            hits_per_page,
        }
    }

    fn seeded() -> JsonIndex {
        JsonIndex::with_records((1..=7).map(|n| {
            RestaurantRecord::new(
                n.to_string(),
                Restaurant::new(format!("Taqueria {n}"), "Mexican").with(Field::City, "Oakland"),
            )
        }))
    }

    #[test]
    fn search_pages_through_matches() {
        let index = seeded();

        let first = block_on(index.search(params("taqueria", 0, 5))).unwrap();
        let second = block_on(index.search(params("taqueria", 1, 5))).unwrap();

        assert_eq!(first.nb_hits, 7);
        assert_eq!(first.hits.len(), 5);
        assert_eq!(second.hits.len(), 2);
        assert_eq!(second.nb_hits, 7);
    }

    #[test]
    fn save_assigns_ids_when_asked() {
        let index = JsonIndex::in_memory();

        let receipt = block_on(index.save_objects(
            vec![Restaurant::new("Nopa", "Californian").into()],
            SaveOptions::auto_id(),
        ))
        .unwrap();

        assert_eq!(receipt.object_ids.len(), 1);
        let stored = index.records().unwrap();
        assert_eq!(stored[0].id, receipt.object_ids[0]);
    }

    #[test]
    fn save_without_ids_is_rejected_unless_auto_generated() {
        let index = JsonIndex::in_memory();

        let result = block_on(index.save_objects(
            vec![Restaurant::new("Nopa", "Californian").into()],
            SaveOptions::default(),
        ));

        assert!(matches!(result, Err(AdminError::Index(_))));
        assert!(index.is_empty().unwrap());
    }

    #[test]
    fn auto_ids_skip_ids_already_in_use() {
        let index = JsonIndex::with_records([RestaurantRecord::new(
            "1",
            Restaurant::new("Existing", "Diner"),
        )]);

        let receipt = block_on(index.save_objects(
            vec![Restaurant::new("New", "Diner").into()],
            SaveOptions::auto_id(),
        ))
        .unwrap();

        assert_eq!(receipt.object_ids, vec![RecordId::from("2")]);
    }

    #[test]
    fn delete_removes_record_and_tolerates_unknown_ids() {
        let index = seeded();

        block_on(index.delete_object(RecordId::from("3"))).unwrap();
        block_on(index.delete_object(RecordId::from("nope"))).unwrap();

        assert_eq!(index.len().unwrap(), 6);
    }

    #[test]
    fn file_backed_index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("restaurants.json");

        {
            let index = JsonIndex::open(path.clone()).unwrap();
            block_on(index.save_objects(
                vec![Restaurant::new("Delfina", "Italian").into()],
                SaveOptions::auto_id(),
            ))
            .unwrap();
        }

        let reopened = JsonIndex::open(path).unwrap();
        let records = reopened.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field(Field::Name), Some("Delfina"));
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restaurants.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(JsonIndex::open(path), Err(AdminError::Storage(_))));
    }

    #[test]
    fn snapshot_from_newer_format_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restaurants.json");
        std::fs::write(&path, r#"{ "version": 2, "next_id": 1, "records": [] }"#).unwrap();

        match JsonIndex::open(path) {
            Err(AdminError::Storage(msg)) => assert!(msg.contains("version 2")),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("version 2 snapshot was accepted"),
        }
    }
}
