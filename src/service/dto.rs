use serde::Serialize;

use crate::model::entity::{Module, UserModuleProgress};
use crate::progress::CourseProgressView;

/// A module as shown on its lesson screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDetail {
    module: Module,
    progress: UserModuleProgress,
    view: CourseProgressView,
}

impl ModuleDetail {
    pub fn new(module: Module, progress: UserModuleProgress) -> Self {
        let view = CourseProgressView::build(&module, &progress);
        Self {
            module,
            progress,
            view,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn progress(&self) -> &UserModuleProgress {
        &self.progress
    }

    pub fn view(&self) -> &CourseProgressView {
        &self.view
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    correct: bool,
    progress: u8,
}

impl QuizOutcome {
    pub fn new(correct: bool, progress: u8) -> Self {
        Self { correct, progress }
    }

    pub fn correct(&self) -> bool {
        self.correct
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }
}

/// The "My Courses" screen.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    courses: Vec<CourseProgressView>,
    /// Latest learned module, regardless of the category filter.
    last_opened: Option<CourseProgressView>,
}

impl Overview {
    pub fn new(courses: Vec<CourseProgressView>, last_opened: Option<CourseProgressView>) -> Self {
        Self {
            courses,
            last_opened,
        }
    }

    pub fn courses(&self) -> &[CourseProgressView] {
        &self.courses
    }

    pub fn last_opened(&self) -> Option<&CourseProgressView> {
        self.last_opened.as_ref()
    }
}
