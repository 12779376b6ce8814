//! Math view configuration.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ConfigError;
use crate::mark::MarkType;

/// Presentation settings for math previews.
///
/// Every field has a default, so hosts only supply what they change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MathViewConfig {
    /// Name of the mark that tags math.
    pub mark: SmolStr,
    /// Class on every preview container.
    pub preview_class: SmolStr,
    /// Style that hides raw math source while the preview shows.
    pub hidden_style: SmolStr,
    /// Tag of the preview container.
    pub container_tag: SmolStr,
}

impl Default for MathViewConfig {
    fn default() -> Self {
        Self {
            mark: SmolStr::new_static("math"),
            preview_class: SmolStr::new_static("pm-math-mathjax"),
            hidden_style: SmolStr::new_static("display: none;"),
            container_tag: SmolStr::new_static("div"),
        }
    }
}

impl MathViewConfig {
    /// Parse and validate host-supplied JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mark.is_empty() {
            return Err(ConfigError::EmptyField("mark"));
        }
        if self.container_tag.is_empty() {
            return Err(ConfigError::EmptyField("container_tag"));
        }
        Ok(())
    }

    pub fn mark_type(&self) -> MarkType {
        MarkType::new(self.mark.clone())
    }
}
