//! Scripted in-memory backend for component tests.

use async_trait::async_trait;
use kennel_client::{Backend, ClientError, ClientResult};
use kennel_core::{Dog, DogId, ResultPage, SearchCursor, SearchFilter};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Breeds,
    Search(Option<String>),
    Next(String),
    Dogs(Vec<DogId>),
    Match(Vec<DogId>),
    Login(String),
    Logout,
}

pub fn dog(id: &str) -> Dog {
    Dog {
        id: DogId::new(id),
        img: format!("https://img.example/{}.jpg", id),
        name: format!("Dog {}", id),
        age: 4,
        zip_code: "10001".to_string(),
        breed: "Poodle".to_string(),
    }
}

pub fn ids(raw: &[&str]) -> Vec<DogId> {
    raw.iter().map(|id| DogId::new(*id)).collect()
}

pub fn numbered_ids(prefix: &str, range: std::ops::Range<usize>) -> Vec<DogId> {
    range.map(|i| DogId::new(format!("{}{}", prefix, i))).collect()
}

pub fn page(ids: Vec<DogId>, total: u64, next: Option<&str>) -> ResultPage {
    ResultPage::new(ids, total, next.map(SearchCursor::new))
}

/// Backend whose responses are set up by the test.
///
/// Hydration synthesizes a record for every requested id except those
/// starting with `missing`. A hold registered for a key parks the matching
/// call until the test releases it; keys are `search:<breed>` (`*` for no
/// breed), `next:<cursor>` and `dogs:<first id>`.
#[derive(Default)]
pub struct ScriptedBackend {
    breeds: Mutex<Vec<String>>,
    first_pages: Mutex<HashMap<Option<String>, ResultPage>>,
    next_pages: Mutex<HashMap<String, ResultPage>>,
    match_id: Mutex<Option<DogId>>,
    unauthorized: Mutex<HashSet<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    reverse_hydration: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_breeds(&self, breeds: &[&str]) {
        *self.breeds.lock() = breeds.iter().map(|b| b.to_string()).collect();
    }

    pub fn set_first_page(&self, breed: Option<&str>, page: ResultPage) {
        self.first_pages
            .lock()
            .insert(breed.map(str::to_string), page);
    }

    pub fn set_next_page(&self, cursor: &str, page: ResultPage) {
        self.next_pages.lock().insert(cursor.to_string(), page);
    }

    pub fn set_match(&self, id: Option<&str>) {
        *self.match_id.lock() = id.map(DogId::new);
    }

    /// Answer `op` with a 401.
    pub fn unauthorize(&self, op: &'static str) {
        self.unauthorized.lock().insert(op);
    }

    /// Answer `op` with a 500.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().remove(op);
    }

    /// Return hydrated records in reverse request order.
    pub fn reverse_hydration(&self) {
        self.reverse_hydration.store(true, Ordering::SeqCst);
    }

    /// Park the next call matching `key` until the returned handle is
    /// notified.
    pub fn hold(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds.lock().insert(key.to_string(), notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    async fn enter(&self, op: &'static str, call: Call, hold_key: String) -> ClientResult<()> {
        self.calls.lock().push(call);

        let hold = self.holds.lock().remove(&hold_key);
        if let Some(notify) = hold {
            notify.notified().await;
        }

        if self.unauthorized.lock().contains(op) {
            return Err(ClientError::Unauthorized {
                path: op.to_string(),
            });
        }
        if self.failing.lock().contains(op) {
            return Err(ClientError::Status {
                status: 500,
                path: op.to_string(),
                body: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn breeds(&self) -> ClientResult<Vec<String>> {
        self.enter("breeds", Call::Breeds, "breeds".to_string())
            .await?;
        Ok(self.breeds.lock().clone())
    }

    async fn search(&self, filter: &SearchFilter) -> ClientResult<ResultPage> {
        let key = format!("search:{}", filter.breed.as_deref().unwrap_or("*"));
        self.enter("search", Call::Search(filter.breed.clone()), key)
            .await?;
        Ok(self
            .first_pages
            .lock()
            .get(&filter.breed)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_next(&self, cursor: &SearchCursor) -> ClientResult<ResultPage> {
        let key = format!("next:{}", cursor);
        self.enter("next", Call::Next(cursor.to_string()), key)
            .await?;
        Ok(self
            .next_pages
            .lock()
            .get(cursor.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn dogs(&self, ids: &[DogId]) -> ClientResult<Vec<Dog>> {
        let key = format!(
            "dogs:{}",
            ids.first().map(DogId::as_str).unwrap_or_default()
        );
        self.enter("dogs", Call::Dogs(ids.to_vec()), key).await?;

        let mut records: Vec<Dog> = ids
            .iter()
            .filter(|id| !id.as_str().starts_with("missing"))
            .map(|id| dog(id.as_str()))
            .collect();
        if self.reverse_hydration.load(Ordering::SeqCst) {
            records.reverse();
        }
        Ok(records)
    }

    async fn match_dog(&self, ids: &[DogId]) -> ClientResult<Option<DogId>> {
        self.enter("match", Call::Match(ids.to_vec()), "match".to_string())
            .await?;
        Ok(self.match_id.lock().clone())
    }

    async fn login(&self, name: &str, _email: &str) -> ClientResult<()> {
        self.enter("login", Call::Login(name.to_string()), "login".to_string())
            .await
    }

    async fn logout(&self) -> ClientResult<()> {
        self.enter("logout", Call::Logout, "logout".to_string())
            .await
    }
}
