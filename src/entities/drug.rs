use serde::{Deserialize, Serialize};

/// A known drug for the disease, merged across rows sharing `(drug_name, max_phase)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugRecord {
    pub drug_name: String,
    /// Highest clinical trial phase reached (0-4); `None` when upstream does not know.
    pub max_phase: Option<u8>,
    /// Sorted, de-duplicated target symbols.
    pub targets: Vec<String>,
}

impl DrugRecord {
    pub fn targets_label(&self) -> String {
        self.targets.join(", ")
    }
}
