use serde::Serialize;

use crate::model::entity::{Category, Module, UserModuleProgress};
use crate::progress::{compute_progress, videos_duration_minutes};

/// What a course card shows: the module joined with one user's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressView {
    id: String,
    title: String,
    description: String,
    category: Category,
    total_videos: u32,
    watched_videos: u32,
    quiz_completed: bool,
    progress: u8,
    /// `None` when a lesson duration could not be parsed.
    duration_minutes: Option<u32>,
}

impl CourseProgressView {
    pub fn build(module: &Module, progress: &UserModuleProgress) -> Self {
        if module.has_drift() {
            tracing::warn!(
                "module {} declares {:?} videos but lists {}",
                module.id(),
                module.declared_total_videos(),
                module.total_videos()
            );
        }

        let total_videos = module.total_videos();
        let watched_videos = progress.watched_count_in(module);

        let duration_minutes = match videos_duration_minutes(module.videos()) {
            Ok(minutes) => Some(minutes),
            Err(e) => {
                tracing::warn!("module {}: {}", module.id(), e);
                None
            }
        };

        Self {
            id: module.id().to_string(),
            title: module.title().to_string(),
            description: module.description().to_string(),
            category: module.category().clone(),
            total_videos,
            watched_videos,
            quiz_completed: progress.quiz_completed(),
            progress: compute_progress(total_videos, watched_videos, progress.quiz_completed()),
            duration_minutes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn total_videos(&self) -> u32 {
        self.total_videos
    }

    pub fn watched_videos(&self) -> u32 {
        self.watched_videos
    }

    pub fn quiz_completed(&self) -> bool {
        self.quiz_completed
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    pub fn is_finished(&self) -> bool {
        self.progress == 100
    }
}
