#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use pywhiz::config::Fetch;
use pywhiz::model::entity::{
    Catalog, Module, ProfilePatch, ProgressPatch, Quiz, UserLastOpened, UserModuleProgress,
    UserProfile,
};
use pywhiz::model::{DocumentStore, MemoryStore, StoreError, StoreResult};
use pywhiz::service::CourseService;

pub const USER: &str = "8hzRnSqWVZXH1zEIvm2Ayrps9442";

/// The catalog shipped in `data/catalog.json`.
pub fn python_catalog() -> Catalog {
    Catalog::from_json(include_bytes!("../data/catalog.json")).expect("Invalid catalog format")
}

pub fn fast_fetch(max_concurrency: usize, retry_attempts: u32) -> Fetch {
    Fetch::new(max_concurrency, retry_attempts, Duration::from_millis(1))
}

pub async fn seeded_service() -> CourseService<Arc<MemoryStore>> {
    seeded_service_with(Arc::new(MemoryStore::new()), fast_fetch(4, 3)).await
}

pub async fn seeded_service_with<S: DocumentStore>(store: S, fetch: Fetch) -> CourseService<S> {
    let service = CourseService::new(store, fetch);
    service
        .import_catalog(python_catalog())
        .await
        .expect("Unable to import catalog");
    service
}

/// Store wrapper counting and slowing down progress reads, and failing the
/// first `failures` of them with a transient error.
#[derive(Debug, Default)]
pub struct InstrumentedStore {
    inner: MemoryStore,
    delay: Duration,
    failures_left: AtomicU32,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    progress_reads: AtomicUsize,
}

impl InstrumentedStore {
    pub fn new(delay: Duration, failures: u32) -> Self {
        Self {
            delay,
            failures_left: AtomicU32::new(failures),
            ..Self::default()
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn progress_reads(&self) -> usize {
        self.progress_reads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DocumentStore for InstrumentedStore {
    async fn list_modules(&self) -> StoreResult<Vec<Module>> {
        self.inner.list_modules().await
    }

    async fn get_module(&self, module_id: &str) -> StoreResult<Option<Module>> {
        self.inner.get_module(module_id).await
    }

    async fn get_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
    ) -> StoreResult<Option<UserModuleProgress>> {
        self.progress_reads.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }

        self.inner.get_user_module_progress(user_id, module_id).await
    }

    async fn set_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
        patch: ProgressPatch,
    ) -> StoreResult<UserModuleProgress> {
        self.inner
            .set_user_module_progress(user_id, module_id, patch)
            .await
    }

    async fn get_last_opened_module(&self, user_id: &str) -> StoreResult<Option<UserLastOpened>> {
        self.inner.get_last_opened_module(user_id).await
    }

    async fn set_last_opened_module(&self, user_id: &str, module_id: &str) -> StoreResult<()> {
        self.inner.set_last_opened_module(user_id, module_id).await
    }

    async fn get_quiz(&self, module_id: &str) -> StoreResult<Option<Quiz>> {
        self.inner.get_quiz(module_id).await
    }

    async fn put_module(&self, module: &Module) -> StoreResult<()> {
        self.inner.put_module(module).await
    }

    async fn put_quiz(&self, module_id: &str, quiz: &Quiz) -> StoreResult<()> {
        self.inner.put_quiz(module_id, quiz).await
    }

    async fn get_user_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        self.inner.get_user_profile(user_id).await
    }

    async fn upsert_user_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> StoreResult<UserProfile> {
        self.inner.upsert_user_profile(user_id, patch).await
    }
}
