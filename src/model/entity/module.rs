use serde::{Deserialize, Serialize};

use crate::model::entity::{Category, Video, VideoId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    category: Category,
    /// Lesson order.
    #[serde(default)]
    videos: Vec<Video>,
    /// Count maintained next to `videos` by older catalogs. Never used for
    /// progress, see [`Module::total_videos`].
    #[serde(
        rename = "totalVideos",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    declared_total_videos: Option<u32>,
    #[serde(default)]
    users: u32,
}

impl Module {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        videos: Vec<Video>,
        users: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            category,
            videos,
            declared_total_videos: None,
            users,
        }
    }

    pub fn with_declared_total_videos(mut self, total: u32) -> Self {
        self.declared_total_videos = Some(total);
        self
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

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn users(&self) -> u32 {
        self.users
    }

    pub fn declared_total_videos(&self) -> Option<u32> {
        self.declared_total_videos
    }

    /// Number of lessons, always derived from the video list.
    pub fn total_videos(&self) -> u32 {
        u32::try_from(self.videos.len()).unwrap_or(u32::MAX)
    }

    /// `true` if a stored `totalVideos` disagrees with the video list.
    pub fn has_drift(&self) -> bool {
        self.declared_total_videos
            .is_some_and(|declared| declared != self.total_videos())
    }

    pub fn video(&self, id: VideoId) -> Option<&Video> {
        self.videos.iter().find(|v| v.id() == id)
    }

    pub fn contains_video(&self, id: VideoId) -> bool {
        self.video(id).is_some()
    }
}
