//! Course progress aggregation.
//!
//! Pure functions over already fetched data: progress percentage, category
//! filtering and lesson durations. Every screen goes through these instead of
//! deriving numbers on its own.

mod calculator;
pub use calculator::{QUIZ_WEIGHT, VIDEO_WEIGHT, compute_progress};

mod catalog;
pub use catalog::{featured_for_category, filter_by_category, search_by_title};

mod duration;
pub use duration::{
    ParseError, ParseErrorKind, duration_minutes, total_duration_minutes, videos_duration_minutes,
};

mod view;
pub use view::CourseProgressView;
