#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("unexpected query result: {0}")]
    Decode(String),

    #[error("probe panicked")]
    Panicked,
}

/// Texts come back whitespace-normalised like `innerText`.
pub trait PageView {
    fn title(&self) -> Result<String, ProbeError>;

    fn markup(&self) -> Result<String, ProbeError>;

    fn body_text(&self) -> Result<String, ProbeError>;

    /// Texts of the first `limit` elements matching `selector`, in document order.
    fn inner_texts(&self, selector: &str, limit: usize) -> Result<Vec<String>, ProbeError>;

    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ProbeError>;

    fn count(&self, selector: &str) -> Result<usize, ProbeError>;

    fn first_inner_text(&self, selector: &str) -> Result<Option<String>, ProbeError> {
        Ok(self.inner_texts(selector, 1)?.into_iter().next())
    }
}

pub(crate) fn normalize_text(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_collapses_runs_and_blank_lines() {
        let raw = "  Start   free\ttrial \n\n\n   today  ";
        assert_eq!(normalize_text(raw), "Start free trial\ntoday");
    }
}
