use std::future::Future;

use futures::{StreamExt, TryStreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::auth::AuthProvider;
use crate::config::Fetch;
use crate::model::DocumentStore;
use crate::model::entity::{
    Catalog, CategoryFilter, Module, ProfilePatch, ProgressPatch, Quiz, UserModuleProgress,
    UserProfile, VideoId,
};
use crate::progress::{
    CourseProgressView, compute_progress, featured_for_category, filter_by_category,
    search_by_title,
};
use crate::service::{ModuleDetail, Overview, QuizOutcome, ServiceError, ServiceResult};
use crate::utils::retry::retry_with_backoff;

/// Everything the screens need, on top of a [`DocumentStore`].
///
/// Every user-facing operation takes the caller's [`AuthProvider`] and fails
/// with [`ServiceError::Unauthenticated`] before touching the store when
/// nobody is signed in.
#[derive(Debug, Clone)]
pub struct CourseService<S> {
    store: S,
    fetch: Fetch,
}

fn require_user<A: AuthProvider + ?Sized>(session: &A) -> ServiceResult<&str> {
    session.current_user_id().ok_or(ServiceError::Unauthenticated)
}

async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("fetch cancelled");
            Err(ServiceError::Cancelled)
        }
        result = fut => result,
    }
}

impl<S: DocumentStore> CourseService<S> {
    pub fn new(store: S, fetch: Fetch) -> Self {
        Self { store, fetch }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn modules(&self) -> ServiceResult<Vec<Module>> {
        let modules = retry_with_backoff(
            self.fetch.retry_attempts(),
            self.fetch.retry_base_delay(),
            "list modules",
            || self.store.list_modules(),
        )
        .await?;
        Ok(modules)
    }

    async fn module(&self, module_id: &str) -> ServiceResult<Module> {
        retry_with_backoff(
            self.fetch.retry_attempts(),
            self.fetch.retry_base_delay(),
            "get module",
            || self.store.get_module(module_id),
        )
        .await?
        .ok_or_else(|| ServiceError::ModuleNotFound(module_id.to_string()))
    }

    /// Stored progress, or the empty record if the user never opened the
    /// module.
    async fn progress_of(&self, user_id: &str, module_id: &str) -> ServiceResult<UserModuleProgress> {
        let progress = retry_with_backoff(
            self.fetch.retry_attempts(),
            self.fetch.retry_base_delay(),
            "get progress",
            || self.store.get_user_module_progress(user_id, module_id),
        )
        .await?;

        Ok(progress.unwrap_or_else(|| {
            tracing::debug!("no progress of user {} in module {}", user_id, module_id);
            UserModuleProgress::empty()
        }))
    }

    async fn view_of(&self, user_id: &str, module: &Module) -> ServiceResult<CourseProgressView> {
        let progress = self.progress_of(user_id, module.id()).await?;
        Ok(CourseProgressView::build(module, &progress))
    }

    async fn patch(
        &self,
        user_id: &str,
        module: &Module,
        patch: ProgressPatch,
    ) -> ServiceResult<u8> {
        let record = self
            .store
            .set_user_module_progress(user_id, module.id(), patch)
            .await?;

        Ok(compute_progress(
            module.total_videos(),
            record.watched_count_in(module),
            record.quiz_completed(),
        ))
    }

    /// Opens a module: remembers it as the latest learned one and creates the
    /// user's progress record on first visit.
    #[tracing::instrument(skip(self, session))]
    pub async fn open_module<A: AuthProvider + ?Sized>(
        &self,
        session: &A,
        module_id: &str,
    ) -> ServiceResult<ModuleDetail> {
        let user_id = require_user(session)?;
        let module = self.module(module_id).await?;

        self.store.set_last_opened_module(user_id, module_id).await?;
        let progress = self
            .store
            .set_user_module_progress(user_id, module_id, ProgressPatch::touch())
            .await?;

        tracing::info!("user {} opened module {}", user_id, module_id);
        Ok(ModuleDetail::new(module, progress))
    }

    /// Adds `video_id` to the watched set. Watching twice changes nothing.
    #[tracing::instrument(skip(self, session))]
    pub async fn mark_video_watched<A: AuthProvider + ?Sized>(
        &self,
        session: &A,
        module_id: &str,
        video_id: VideoId,
    ) -> ServiceResult<u8> {
        let user_id = require_user(session)?;
        let module = self.module(module_id).await?;

        if !module.contains_video(video_id) {
            return Err(ServiceError::UnknownVideo {
                module_id: module_id.to_string(),
                video_id,
            });
        }

        self.patch(user_id, &module, ProgressPatch::watch_video(video_id))
            .await
    }

    #[tracing::instrument(skip(self, session))]
    pub async fn mark_quiz_completed<A: AuthProvider + ?Sized>(
        &self,
        session: &A,
        module_id: &str,
    ) -> ServiceResult<u8> {
        let user_id = require_user(session)?;
        let module = self.module(module_id).await?;
        self.patch(user_id, &module, ProgressPatch::complete_quiz())
            .await
    }

    pub async fn quiz<A: AuthProvider + ?Sized>(
        &self,
        session: &A,
        module_id: &str,
    ) -> ServiceResult<Quiz> {
        require_user(session)?;
        retry_with_backoff(
            self.fetch.retry_attempts(),
            self.fetch.retry_base_delay(),
            "get quiz",
            || self.store.get_quiz(module_id),
        )
        .await?
        .ok_or_else(|| ServiceError::QuizNotFound(module_id.to_string()))
    }

    /// Checks an answer; a correct one completes the quiz. A wrong one leaves
    /// progress untouched so the user can try again.
    #[tracing::instrument(skip(self, session))]
    pub async fn submit_quiz_answer<A: AuthProvider + ?Sized>(
        &self,
        session: &A,
        module_id: &str,
        answer_index: usize,
    ) -> ServiceResult<QuizOutcome> {
        let user_id = require_user(session)?;
        let quiz = self.quiz(session, module_id).await?;

        let correct = quiz
            .check(answer_index)
            .ok_or_else(|| ServiceError::InvalidAnswer {
                module_id: module_id.to_string(),
                answer_index,
            })?;

        let module = self.module(module_id).await?;
        let progress = if correct {
            self.patch(user_id, &module, ProgressPatch::complete_quiz())
                .await?
        } else {
            self.view_of(user_id, &module).await?.progress()
        };

        Ok(QuizOutcome::new(correct, progress))
    }

    /// Progress of every module in `filter`, in catalog order, plus the
    /// latest learned module.
    ///
    /// At most `max_concurrency` progress reads are in flight. Firing
    /// `cancel` drops the outstanding reads and returns
    /// [`ServiceError::Cancelled`].
    #[tracing::instrument(skip(self, session, cancel))]
    pub async fn course_overview<A: AuthProvider + ?Sized>(
        &self,
        session: &A,
        filter: &CategoryFilter,
        cancel: &CancellationToken,
    ) -> ServiceResult<Overview> {
        let user_id = require_user(session)?;
        let modules = until_cancelled(cancel, self.modules()).await?;
        let selected = filter_by_category(&modules, filter);

        tracing::debug!(
            "fetching progress of {} modules, {} at a time",
            selected.len(),
            self.fetch.max_concurrency()
        );

        let courses = stream::iter(selected)
            .map(|module| self.view_of(user_id, module))
            .buffered(self.fetch.max_concurrency())
            .try_collect::<Vec<_>>();
        let courses = until_cancelled(cancel, courses).await?;

        let last_opened = until_cancelled(cancel, self.last_opened(user_id, &modules)).await?;

        Ok(Overview::new(courses, last_opened))
    }

    async fn last_opened(
        &self,
        user_id: &str,
        modules: &[Module],
    ) -> ServiceResult<Option<CourseProgressView>> {
        let last = retry_with_backoff(
            self.fetch.retry_attempts(),
            self.fetch.retry_base_delay(),
            "get last opened module",
            || self.store.get_last_opened_module(user_id),
        )
        .await?;

        let Some(last) = last else {
            return Ok(None);
        };

        match modules.iter().find(|m| m.id() == last.module_id()) {
            Some(module) => Ok(Some(self.view_of(user_id, module).await?)),
            None => {
                tracing::warn!(
                    "last opened module {} of user {} is no longer in the catalog",
                    last.module_id(),
                    user_id
                );
                Ok(None)
            }
        }
    }

    /// The most popular module of a category, for the home screen.
    pub async fn featured<A: AuthProvider + ?Sized>(
        &self,
        session: &A,
        filter: &CategoryFilter,
    ) -> ServiceResult<Option<Module>> {
        require_user(session)?;
        let modules = self.modules().await?;
        Ok(featured_for_category(modules, filter))
    }

    pub async fn search<A: AuthProvider + ?Sized>(
        &self,
        session: &A,
        query: &str,
    ) -> ServiceResult<Vec<Module>> {
        require_user(session)?;
        let modules = self.modules().await?;
        Ok(search_by_title(modules, query))
    }

    /// Profile of the signed-in user, empty if it was never saved.
    pub async fn profile<A: AuthProvider + ?Sized>(&self, session: &A) -> ServiceResult<UserProfile> {
        let user_id = require_user(session)?;
        let profile = retry_with_backoff(
            self.fetch.retry_attempts(),
            self.fetch.retry_base_delay(),
            "get profile",
            || self.store.get_user_profile(user_id),
        )
        .await?;

        Ok(profile.unwrap_or_else(|| {
            tracing::debug!("no profile for user {}", user_id);
            UserProfile::empty(user_id)
        }))
    }

    /// Saves the fields set in `patch`, creating the profile on first save.
    /// A blank display name is rejected.
    #[tracing::instrument(skip(self, session))]
    pub async fn update_profile<A: AuthProvider + ?Sized>(
        &self,
        session: &A,
        patch: ProfilePatch,
    ) -> ServiceResult<UserProfile> {
        let user_id = require_user(session)?;
        if patch.new_display_name().is_some_and(|name| name.trim().is_empty()) {
            return Err(ServiceError::EmptyDisplayName);
        }

        let profile = self.store.upsert_user_profile(user_id, patch).await?;
        tracing::info!("user {} updated their profile", user_id);
        Ok(profile)
    }

    /// Creates the empty progress record of `user_id` for every module that
    /// lacks one. Returns how many were created.
    #[tracing::instrument(skip(self))]
    pub async fn initialize_progress(&self, user_id: &str) -> ServiceResult<usize> {
        let modules = self.modules().await?;
        let mut created = 0;

        for module in &modules {
            let existing = self
                .store
                .get_user_module_progress(user_id, module.id())
                .await?;
            if existing.is_some() {
                tracing::debug!("progress of {} in {} already exists", user_id, module.id());
                continue;
            }

            self.store
                .set_user_module_progress(user_id, module.id(), ProgressPatch::touch())
                .await?;
            created += 1;
        }

        tracing::info!("initialized {} progress records for {}", created, user_id);
        Ok(created)
    }

    /// Upserts every module of `catalog` with its videos and quiz. Returns the
    /// number of modules written.
    #[tracing::instrument(skip_all)]
    pub async fn import_catalog(&self, catalog: Catalog) -> ServiceResult<usize> {
        let mut written = 0;

        for entry in catalog.into_entries() {
            let (module, quiz) = entry.into_parts();
            if module.has_drift() {
                tracing::warn!(
                    "module {} declares {:?} videos but lists {}, storing {}",
                    module.id(),
                    module.declared_total_videos(),
                    module.total_videos(),
                    module.total_videos()
                );
            }

            self.store.put_module(&module).await?;
            if let Some(quiz) = quiz {
                self.store.put_quiz(module.id(), &quiz).await?;
            }
            written += 1;
        }

        tracing::info!("imported {} modules", written);
        Ok(written)
    }
}
