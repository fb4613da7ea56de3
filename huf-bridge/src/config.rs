use serde::{Deserialize, Serialize};

pub const DEFAULT_ROOT_CONTAINER_ID: &str = "huf-app-container";
pub const DEFAULT_BODY_ID: &str = "body";
pub const DEFAULT_STYLE_SHEET_PREFIX: &str = "style_";
pub const DEFAULT_VISIBILITY_ATTRIBUTE: &str = "data-visible";

/// Naming conventions shared with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Parent id that resolves to the application root container.
    pub root_container_id: String,
    /// Parent id that resolves to the document body, compared case-insensitively.
    pub body_id: String,
    /// A style sheet named `<prefix><widget id>` belongs to that widget.
    pub style_sheet_prefix: String,
    /// Attribute carrying `"true"`/`"false"` across attach/detach.
    pub visibility_attribute: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            root_container_id: DEFAULT_ROOT_CONTAINER_ID.to_string(),
            body_id: DEFAULT_BODY_ID.to_string(),
            style_sheet_prefix: DEFAULT_STYLE_SHEET_PREFIX.to_string(),
            visibility_attribute: DEFAULT_VISIBILITY_ATTRIBUTE.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn is_root_container(&self, id: &str) -> bool {
        id == self.root_container_id
    }

    pub fn is_body(&self, id: &str) -> bool {
        id.eq_ignore_ascii_case(&self.body_id)
    }

    pub fn style_sheet_id(&self, widget_id: &str) -> String {
        format!("{}{}", self.style_sheet_prefix, widget_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BridgeConfig::from_json(r#"{ "style_sheet_prefix": "css-" }"#).unwrap();

        assert_eq!(config.style_sheet_prefix, "css-");
        assert_eq!(config.root_container_id, DEFAULT_ROOT_CONTAINER_ID);
        assert_eq!(config.style_sheet_id("w1"), "css-w1");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(BridgeConfig::from_json(r#"{ "root": "x" }"#).is_err());
    }

    #[test]
    fn test_body_is_case_insensitive() {
        let config = BridgeConfig::default();
        assert!(config.is_body("BODY"));
        assert!(config.is_body("Body"));
        assert!(!config.is_body("bodyx"));
    }
}
