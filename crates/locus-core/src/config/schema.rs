use serde::{Deserialize, Serialize};

/// Runtime options a selector instance compiles against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Also match fields, links and buttons by `aria-label`.
    #[serde(default)]
    pub enable_aria_label: bool,
    /// Treat `role="button"` elements as buttons.
    #[serde(default)]
    pub enable_aria_role: bool,
    /// Attribute holding test identifiers, e.g. `data-testid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
}

impl SelectorConfig {
    pub fn with_aria_label(mut self, enabled: bool) -> Self {
        self.enable_aria_label = enabled;
        self
    }

    pub fn with_aria_role(mut self, enabled: bool) -> Self {
        self.enable_aria_role = enabled;
        self
    }

    pub fn with_test_id(mut self, attribute: impl Into<String>) -> Self {
        self.test_id = Some(attribute.into());
        self
    }
}

/// Top level of a `locus.yaml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocusConfig {
    #[serde(default)]
    pub selectors: SelectorConfig,
    /// Format used when a selector is compiled without an explicit one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_format: Option<crate::format::Format>,
}
