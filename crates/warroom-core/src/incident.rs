//! Incident input data.
//!
//! Read-only input from the driver. Beyond the named fields the mapping is
//! opaque to the core; unknown keys are preserved in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Incident {
    pub id: Option<String>,
    pub symptom: Option<String>,
    pub severity: Option<String>,
    pub service: Option<String>,
    pub impact: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Incident {
    /// Parse from a driver-supplied mapping; missing fields stay `None`.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// True when no incident data was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.symptom.is_none()
            && self.severity.is_none()
            && self.service.is_none()
            && self.impact.is_none()
            && self.extra.is_empty()
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("unknown")
    }

    pub fn symptom(&self) -> &str {
        self.symptom.as_deref().unwrap_or("Unknown issue")
    }

    pub fn severity(&self) -> &str {
        self.severity.as_deref().unwrap_or("unknown")
    }

    pub fn service(&self) -> &str {
        self.service.as_deref().unwrap_or("unknown")
    }

    pub fn impact(&self) -> &str {
        self.impact.as_deref().unwrap_or("unknown")
    }
}
