use serde::{Deserialize, Serialize};

use crate::model::entity::{Module, Quiz};

/// Importable catalog document: every module with its videos and quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    modules: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    module: Module,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quiz: Option<Quiz>,
}

impl Catalog {
    pub fn new(modules: Vec<CatalogEntry>) -> Self {
        Self { modules }
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.modules
    }

    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.modules
    }
}

impl CatalogEntry {
    pub fn new(module: Module, quiz: Option<Quiz>) -> Self {
        Self { module, quiz }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn into_parts(self) -> (Module, Option<Quiz>) {
        (self.module, self.quiz)
    }
}
