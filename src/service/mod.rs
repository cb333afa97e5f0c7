//! Screen-facing operations: store access, auth checks and aggregation
//! wired together.

mod course;
pub use course::CourseService;

mod dto;
pub use dto::{ModuleDetail, Overview, QuizOutcome};

mod error;
pub use error::{ServiceError, ServiceResult};
