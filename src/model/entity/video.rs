use serde::{Deserialize, Serialize};

pub type VideoId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    id: VideoId,
    title: String,
    #[serde(default)]
    description: String,
    /// Asset key, e.g. `"WhatIsPython.mp4"`.
    url: String,
    /// `M:SS` or `MM:SS`.
    duration: String,
}

impl Video {
    pub fn new(
        id: VideoId,
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            url: url.into(),
            duration: duration.into(),
        }
    }

    pub fn id(&self) -> VideoId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }
}
