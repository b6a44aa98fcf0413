//! A search index whose calls resolve only when the test says so.

#![allow(dead_code)]

use futures::channel::oneshot;
use futures_util::future::BoxFuture;
use restaurant_admin::domain::{RecordId, Restaurant, RestaurantRecord, SearchHits, SearchParams};
use restaurant_admin::index::{SaveObject, SaveOptions, SaveReceipt, SearchIndex};
use restaurant_admin::{AdminError, Result};
use std::sync::{Arc, Mutex};

/// A call the session made, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(SearchParams),
    Save(Vec<SaveObject>, SaveOptions),
    Delete(RecordId),
}

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    searches: Vec<Option<oneshot::Sender<Result<SearchHits>>>>,
    saves: Vec<Option<oneshot::Sender<Result<SaveReceipt>>>>,
    deletes: Vec<Option<oneshot::Sender<Result<()>>>>,
}

#[derive(Clone, Default)]
pub struct ScriptedIndex {
    script: Arc<Mutex<Script>>,
}

fn pending<T: Send + 'static>(rx: oneshot::Receiver<Result<T>>) -> BoxFuture<'static, Result<T>> {
    Box::pin(async move {
        rx.await
            .unwrap_or_else(|_| Err(AdminError::Index("call abandoned".to_string())))
    })
}

fn release<T>(slots: &mut [Option<oneshot::Sender<Result<T>>>], n: usize, value: Result<T>) {
    let tx = slots[n].take().expect("call already released");
    let _ = tx.send(value);
}

impl ScriptedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn searches(&self) -> Vec<SearchParams> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search(params) => Some(params),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<RecordId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Resolves the `n`th search issued.
    pub fn release_search(&self, n: usize, value: Result<SearchHits>) {
        release(&mut self.script.lock().unwrap().searches, n, value);
    }

    pub fn release_save(&self, n: usize, value: Result<SaveReceipt>) {
        release(&mut self.script.lock().unwrap().saves, n, value);
    }

    pub fn release_delete(&self, n: usize, value: Result<()>) {
        release(&mut self.script.lock().unwrap().deletes, n, value);
    }
}

impl SearchIndex for ScriptedIndex {
    fn search(&self, params: SearchParams) -> BoxFuture<'static, Result<SearchHits>> {
        let (tx, rx) = oneshot::channel();
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Search(params));
        script.searches.push(Some(tx));
        pending(rx)
    }

    fn save_objects(
        &self,
        objects: Vec<SaveObject>,
        options: SaveOptions,
    ) -> BoxFuture<'static, Result<SaveReceipt>> {
        let (tx, rx) = oneshot::channel();
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Save(objects, options));
        script.saves.push(Some(tx));
        pending(rx)
    }

    fn delete_object(&self, id: RecordId) -> BoxFuture<'static, Result<()>> {
        let (tx, rx) = oneshot::channel();
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Delete(id));
        script.deletes.push(Some(tx));
        pending(rx)
    }
}

pub fn record(id: &str, name: &str, food_type: &str) -> RestaurantRecord {
    RestaurantRecord::new(id, Restaurant::new(name, food_type))
}

pub fn hits(records: &[RestaurantRecord], nb_hits: usize) -> Result<SearchHits> {
    Ok(SearchHits {
        hits: records.to_vec(),
        nb_hits,
    })
}

pub fn complete_restaurant(name: &str) -> Restaurant {
    use restaurant_admin::domain::Field;

    Restaurant::new(name, "Seafood")
        .with(Field::Address, "1 Pier St")
        .with(Field::PhoneNumber, "555-0100")
        .with(Field::City, "Monterey")
}
