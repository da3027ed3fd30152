use serde::{Deserialize, Serialize};

/// Configuration for the composite merge engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// When `true`, an update whose condition is structurally equal to the
    /// one already stored returns the existing composite handle.
    pub compare_update: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            compare_update: true,
        }
    }
}

impl MergeConfig {
    /// Always rebuild the composite, even for equal conditions.
    pub fn always_replace() -> Self {
        Self {
            compare_update: false,
        }
    }
}
