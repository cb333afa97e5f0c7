use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::model::entity::{
    Module, ProfilePatch, ProgressPatch, Quiz, UserLastOpened, UserModuleProgress, UserProfile,
};
use crate::model::{DocumentStore, StoreResult};

type ProgressKey = (String, String);

/// Process-local store, used by tests and offline demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    modules: RwLock<Vec<Module>>,
    quizzes: RwLock<HashMap<String, Quiz>>,
    progress: RwLock<HashMap<ProgressKey, UserModuleProgress>>,
    last_opened: RwLock<HashMap<String, UserLastOpened>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modules(modules: Vec<Module>) -> Self {
        Self {
            modules: RwLock::new(modules),
            ..Self::default()
        }
    }

    /// Number of stored progress records, across all users.
    pub async fn progress_records(&self) -> usize {
        self.progress.read().await.len()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn list_modules(&self) -> StoreResult<Vec<Module>> {
        Ok(self.modules.read().await.clone())
    }

    async fn get_module(&self, module_id: &str) -> StoreResult<Option<Module>> {
        let modules = self.modules.read().await;
        Ok(modules.iter().find(|m| m.id() == module_id).cloned())
    }

    async fn get_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
    ) -> StoreResult<Option<UserModuleProgress>> {
        let key = (user_id.to_string(), module_id.to_string());
        Ok(self.progress.read().await.get(&key).cloned())
    }

    async fn set_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
        patch: ProgressPatch,
    ) -> StoreResult<UserModuleProgress> {
        let mut progress = self.progress.write().await;
        let record = progress
            .entry((user_id.to_string(), module_id.to_string()))
            .or_default();

        if record.apply(patch) || record.updated_at().is_none() {
            *record = record.clone().with_updated_at(Utc::now());
        }

        Ok(record.clone())
    }

    async fn get_last_opened_module(&self, user_id: &str) -> StoreResult<Option<UserLastOpened>> {
        Ok(self.last_opened.read().await.get(user_id).cloned())
    }

    async fn set_last_opened_module(&self, user_id: &str, module_id: &str) -> StoreResult<()> {
        self.last_opened.write().await.insert(
            user_id.to_string(),
            UserLastOpened::new(module_id, Some(Utc::now())),
        );
        Ok(())
    }

    async fn get_quiz(&self, module_id: &str) -> StoreResult<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(module_id).cloned())
    }

    async fn put_module(&self, module: &Module) -> StoreResult<()> {
        let mut modules = self.modules.write().await;
        match modules.iter_mut().find(|m| m.id() == module.id()) {
            Some(existing) => *existing = module.clone(),
            None => modules.push(module.clone()),
        }
        Ok(())
    }

    async fn put_quiz(&self, module_id: &str, quiz: &Quiz) -> StoreResult<()> {
        self.quizzes
            .write()
            .await
            .insert(module_id.to_string(), quiz.clone());
        Ok(())
    }

    async fn get_user_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn upsert_user_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> StoreResult<UserProfile> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::empty(user_id).with_created_at(Utc::now()));
        profile.apply(patch);
        Ok(profile.clone())
    }
}
