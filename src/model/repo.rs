use crate::model::entity::{
    Module, ProfilePatch, ProgressPatch, Quiz, UserLastOpened, UserModuleProgress, UserProfile,
};
use crate::model::error::StoreResult;

/// Remote document store holding the catalog and per-user records.
///
/// User records are keyed by the caller-provided user id; the store never
/// looks up the current user on its own.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// The whole catalog in catalog order.
    async fn list_modules(&self) -> StoreResult<Vec<Module>>;

    async fn get_module(&self, module_id: &str) -> StoreResult<Option<Module>>;

    /// `None` if the user never opened the module.
    async fn get_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
    ) -> StoreResult<Option<UserModuleProgress>>;

    /// Merges `patch` into the record, creating it if absent, and returns
    /// the stored result.
    async fn set_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
        patch: ProgressPatch,
    ) -> StoreResult<UserModuleProgress>;

    async fn get_last_opened_module(&self, user_id: &str) -> StoreResult<Option<UserLastOpened>>;

    async fn set_last_opened_module(&self, user_id: &str, module_id: &str) -> StoreResult<()>;

    async fn get_quiz(&self, module_id: &str) -> StoreResult<Option<Quiz>>;

    /// Inserts or replaces a module together with its videos.
    async fn put_module(&self, module: &Module) -> StoreResult<()>;

    async fn put_quiz(&self, module_id: &str, quiz: &Quiz) -> StoreResult<()>;

    async fn get_user_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    /// Merges `patch` into the profile, creating it if absent, and returns
    /// the stored result.
    async fn upsert_user_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> StoreResult<UserProfile>;
}

#[async_trait::async_trait]
impl<T> DocumentStore for std::sync::Arc<T>
where
    T: DocumentStore + ?Sized,
{
    async fn list_modules(&self) -> StoreResult<Vec<Module>> {
        (**self).list_modules().await
    }

    async fn get_module(&self, module_id: &str) -> StoreResult<Option<Module>> {
        (**self).get_module(module_id).await
    }

    async fn get_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
    ) -> StoreResult<Option<UserModuleProgress>> {
        (**self).get_user_module_progress(user_id, module_id).await
    }

    async fn set_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
        patch: ProgressPatch,
    ) -> StoreResult<UserModuleProgress> {
        (**self)
            .set_user_module_progress(user_id, module_id, patch)
            .await
    }

    async fn get_last_opened_module(&self, user_id: &str) -> StoreResult<Option<UserLastOpened>> {
        (**self).get_last_opened_module(user_id).await
    }

    async fn set_last_opened_module(&self, user_id: &str, module_id: &str) -> StoreResult<()> {
        (**self).set_last_opened_module(user_id, module_id).await
    }

    async fn get_quiz(&self, module_id: &str) -> StoreResult<Option<Quiz>> {
        (**self).get_quiz(module_id).await
    }

    async fn put_module(&self, module: &Module) -> StoreResult<()> {
        (**self).put_module(module).await
    }

    async fn put_quiz(&self, module_id: &str, quiz: &Quiz) -> StoreResult<()> {
        (**self).put_quiz(module_id, quiz).await
    }

    async fn get_user_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        (**self).get_user_profile(user_id).await
    }

    async fn upsert_user_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> StoreResult<UserProfile> {
        (**self).upsert_user_profile(user_id, patch).await
    }
}
