use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionRetrospective {
    pub decision: String,
    pub expected: String,
    pub actual: String,
}

impl DecisionRetrospective {
    pub fn new(decision: String, expected: String, actual: String) -> Self {
        Self {
            decision,
            expected,
            actual,
        }
    }
}
