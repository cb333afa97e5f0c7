use thiserror::Error;

use crate::model::StoreError;
use crate::model::entity::VideoId;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("module {0} not found")]
    ModuleNotFound(String),
    #[error("module {module_id} has no video {video_id}")]
    UnknownVideo { module_id: String, video_id: VideoId },
    #[error("module {0} has no quiz")]
    QuizNotFound(String),
    #[error("answer #{answer_index} is not an option of quiz {module_id}")]
    InvalidAnswer { module_id: String, answer_index: usize },
    #[error("Name cannot be empty")]
    EmptyDisplayName,
    #[error("request cancelled")]
    Cancelled,
    #[error("couldn't load courses: {0}")]
    Store(#[from] StoreError),
}
