//! Render settings.
//!
//! Plain data with sensible defaults. Settings belong to an
//! [`EngineContext`](crate::pipeline::EngineContext); there are no global
//! setters.
//!
//! # Example
//!
//! ```ignore
//! let settings = RenderSettings::from_toml_str(r#"
//!     strip_namespace_tags = false
//!     output_markup_container_class_name = true
//! "#)?;
//! ```

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Namespace prefix of framework tags (`spark:panel`, `spark:body`, ...).
    pub namespace: String,
    /// Drop namespace tags from the output.
    pub strip_namespace_tags: bool,
    /// Boundary tag a panel's associated markup must contain exactly once.
    pub panel_boundary: String,
    /// Boundary tag a border's associated markup must contain exactly once.
    pub border_boundary: String,
    /// Tag form of the body slot. Preview content inside it is discarded.
    pub body_tag: String,
    /// Tag form of an enclosure.
    pub enclosure_tag: String,
    /// Attribute of the enclosure tag naming the controlling component.
    pub enclosure_child_attribute: String,
    /// Tag that receives header contributions.
    pub head_tag: String,
    /// Tag whose whole span is dropped from the output.
    pub remove_tag: String,
    /// Wrap associated markup in `<!-- MARKUP FOR ... -->` comments.
    pub output_markup_container_class_name: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            namespace: "spark".to_string(),
            strip_namespace_tags: true,
            panel_boundary: "spark:panel".to_string(),
            border_boundary: "spark:border".to_string(),
            body_tag: "spark:body".to_string(),
            enclosure_tag: "spark:enclosure".to_string(),
            enclosure_child_attribute: "child".to_string(),
            head_tag: "head".to_string(),
            remove_tag: "spark:remove".to_string(),
            output_markup_container_class_name: false,
        }
    }
}

impl RenderSettings {
    /// Parse settings from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// True for tags in the framework namespace (`spark:*`).
    pub fn is_namespace_tag(&self, name: &str) -> bool {
        name.split_once(':')
            .is_some_and(|(prefix, _)| prefix == self.namespace)
    }

    /// True if a tag with this name should be written to the output.
    pub fn emits_tag(&self, name: &str) -> bool {
        !(self.strip_namespace_tags && self.is_namespace_tag(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert!(settings.strip_namespace_tags);
        assert_eq!(settings.panel_boundary, "spark:panel");
        assert!(settings.is_namespace_tag("spark:body"));
        assert!(!settings.is_namespace_tag("div"));
        assert!(!settings.emits_tag("spark:enclosure"));
        assert!(settings.emits_tag("span"));
    }

    #[test]
    fn test_partial_toml_override() {
        let settings = RenderSettings::from_toml_str(
            "strip_namespace_tags = false\nnamespace = \"wk\"\n",
        )
        .unwrap();
        assert!(!settings.strip_namespace_tags);
        assert_eq!(settings.namespace, "wk");
        assert_eq!(settings.head_tag, "head");
        assert!(settings.emits_tag("wk:body"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = RenderSettings::from_toml_str("strip_namespace_tags = \"yes\"").unwrap_err();
        assert!(err.to_string().starts_with("invalid render settings"));
    }
}
