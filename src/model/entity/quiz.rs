use serde::{Deserialize, Serialize};

/// Single-question quiz closing a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    question: String,
    options: Vec<String>,
    correct_answer_index: usize,
}

impl Quiz {
    pub fn new(question: impl Into<String>, options: Vec<String>, correct_answer_index: usize) -> Self {
        Self {
            question: question.into(),
            options,
            correct_answer_index,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answer_index(&self) -> usize {
        self.correct_answer_index
    }

    /// `None` if `answer_index` is not one of the options.
    pub fn check(&self, answer_index: usize) -> Option<bool> {
        (answer_index < self.options.len()).then_some(answer_index == self.correct_answer_index)
    }
}
