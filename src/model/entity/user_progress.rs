use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::entity::{Module, VideoId};

/// Per (user, module) learning record.
///
/// Progress only ever grows: videos are added to the watched set and the
/// quiz flag can only be raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModuleProgress {
    #[serde(default)]
    watched_videos: BTreeSet<VideoId>,
    #[serde(default)]
    quiz_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// A merge applied to a progress record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    watch_video: Option<VideoId>,
    complete_quiz: bool,
}

impl ProgressPatch {
    /// Leaves the record as is. Used to create the record lazily.
    pub fn touch() -> Self {
        Self::default()
    }

    pub fn watch_video(id: VideoId) -> Self {
        Self {
            watch_video: Some(id),
            complete_quiz: false,
        }
    }

    pub fn complete_quiz() -> Self {
        Self {
            watch_video: None,
            complete_quiz: true,
        }
    }

    pub fn watched_video(&self) -> Option<VideoId> {
        self.watch_video
    }

    pub fn completes_quiz(&self) -> bool {
        self.complete_quiz
    }
}

impl UserModuleProgress {
    /// The record of a user who never opened the module.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(watched_videos: impl IntoIterator<Item = VideoId>, quiz_completed: bool) -> Self {
        Self {
            watched_videos: watched_videos.into_iter().collect(),
            quiz_completed,
            updated_at: None,
        }
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn watched_videos(&self) -> &BTreeSet<VideoId> {
        &self.watched_videos
    }

    pub fn quiz_completed(&self) -> bool {
        self.quiz_completed
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn has_watched(&self, id: VideoId) -> bool {
        self.watched_videos.contains(&id)
    }

    /// Merges `patch` into the record. Returns `true` if anything changed.
    pub fn apply(&mut self, patch: ProgressPatch) -> bool {
        let mut changed = false;
        if let Some(id) = patch.watch_video {
            changed |= self.watched_videos.insert(id);
        }
        if patch.complete_quiz && !self.quiz_completed {
            self.quiz_completed = true;
            changed = true;
        }
        changed
    }

    /// Watched videos that still exist in `module`.
    pub fn watched_count_in(&self, module: &Module) -> u32 {
        let count = self
            .watched_videos
            .iter()
            .filter(|id| module.contains_video(**id))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Most recently opened module of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLastOpened {
    last_opened_module_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    opened_at: Option<DateTime<Utc>>,
}

impl UserLastOpened {
    pub fn new(module_id: impl Into<String>, opened_at: Option<DateTime<Utc>>) -> Self {
        Self {
            last_opened_module_id: module_id.into(),
            opened_at,
        }
    }

    pub fn module_id(&self) -> &str {
        &self.last_opened_module_id
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }
}
