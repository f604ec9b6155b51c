use serde::{Deserialize, Serialize};

/// Placeholder used wherever the model omitted a narrative field.
pub const NOT_AVAILABLE: &str = "N/A";

/// The author's case description, as submitted.
///
/// Field names follow the CATTO form so a saved form payload deserializes
/// directly. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseInput {
    pub submitter_email: String,
    pub main_event_1line: String,
    pub condition_event: String,
    pub anatomy: String,
    pub trigger_exposure: String,
    pub timing: String,
    pub host_factors: String,
    pub key_findings: String,
    pub management_outcome: String,
    pub novelty_differences: String,
}

impl CaseInput {
    /// Clinical attributes in form order, with their display labels.
    pub fn attributes(&self) -> [(&'static str, &str); 9] {
        [
            ("Main Event", &self.main_event_1line),
            ("Condition/Event", &self.condition_event),
            ("Anatomy", &self.anatomy),
            ("Trigger/Exposure", &self.trigger_exposure),
            ("Timing", &self.timing),
            ("Host Factors", &self.host_factors),
            ("Key Findings", &self.key_findings),
            ("Management/Outcome", &self.management_outcome),
            ("Novelty/Differences", &self.novelty_differences),
        ]
    }

    /// True when no clinical attribute carries any text.
    pub fn is_blank(&self) -> bool {
        self.attributes().iter().all(|(_, v)| v.trim().is_empty())
    }

    /// Contact address, if one that looks like an email was given.
    pub fn contact_email(&self) -> Option<&str> {
        let email = self.submitter_email.trim();
        (!email.is_empty() && email.contains('@')).then_some(email)
    }
}

/// The model's standardized restatement of the case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CattoReconstruction {
    pub condition_event: String,
    pub anatomy: String,
    pub trigger_exposure: String,
    pub timing: String,
    pub host_factors: String,
    pub key_findings: String,
    pub management_outcome: String,
}

impl Default for CattoReconstruction {
    fn default() -> Self {
        Self {
            condition_event: NOT_AVAILABLE.into(),
            anatomy: NOT_AVAILABLE.into(),
            trigger_exposure: NOT_AVAILABLE.into(),
            timing: NOT_AVAILABLE.into(),
            host_factors: NOT_AVAILABLE.into(),
            key_findings: NOT_AVAILABLE.into(),
            management_outcome: NOT_AVAILABLE.into(),
        }
    }
}

/// Four-part summary of the case used to drive searching and evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCore {
    pub mandatory: String,
    pub structural: String,
    pub contextual: String,
    pub modifier: String,
}

impl Default for SearchCore {
    fn default() -> Self {
        Self {
            mandatory: NOT_AVAILABLE.into(),
            structural: NOT_AVAILABLE.into(),
            contextual: NOT_AVAILABLE.into(),
            modifier: NOT_AVAILABLE.into(),
        }
    }
}
