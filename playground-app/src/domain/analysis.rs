use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Challenge,
    Kpi,
    Website,
    Retrospective,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPresence {
    pub name: String,
    pub present: bool,
}

/// A model response together with the bookkeeping the service adds to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: uuid::Uuid,
    pub kind: AnalysisKind,
    pub text: String,
    pub themes: Vec<String>,
    pub sections: Vec<SectionPresence>,
    pub website_context_used: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Analysis {
    pub fn new(kind: AnalysisKind, text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            kind,
            text,
            themes: Vec::new(),
            sections: Vec::new(),
            website_context_used: false,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn with_themes(mut self, themes: Vec<String>) -> Self {
        self.themes = themes;
        self
    }

    pub fn with_sections(mut self, sections: Vec<SectionPresence>) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_website_context(mut self, used: bool) -> Self {
        self.website_context_used = used;
        self
    }

    pub fn missing_sections(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .filter(|s| !s.present)
            .map(|s| s.name.as_str())
    }
}
